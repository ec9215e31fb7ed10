// src/concurrency.rs
//
// Cancellation primitive shared by every blocking call in the store,
// mirror, and status pipeline (§5: "every blocking call accepts a
// cancellation context"). This is the synchronous analogue of a context
// deadline: cheap to clone, cheap to check, and safe to share across
// threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A token that never cancels, for call sites that don't yet have one to
/// thread through (e.g. direct library use outside the CLI).
pub fn uncancellable() -> CancellationToken {
    CancellationToken::new()
}

/// Installs a process-wide Ctrl-C handler (§6/§7): marks `token`
/// cancelled so any in-flight blocking call can wind down its
/// transaction cooperatively, then exits `130`. External drivers that
/// embed this crate as a library rather than through `main.rs` can call
/// this themselves with their own token.
pub fn install_interrupt_handler(token: CancellationToken) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        warn!("interrupted, closing open stores");
        token.cancel();
        std::process::exit(130);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled_and_propagates_via_clone() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
