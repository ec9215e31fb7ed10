// src/error_tracker.rs
//
// First-error-wins latch for fan-out workers (§4.H). A failing worker
// records its error and keeps going; peers are not interrupted mid-flight.
// The aggregate caller checks the tracker after the join/barrier and
// surfaces whatever was latched first.

use std::sync::Mutex;

use crate::domain::error::DomainError;

#[derive(Default)]
pub struct ErrorTracker {
    first: Mutex<Option<DomainError>>,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `err` only if no prior error has been latched.
    pub fn set(&self, err: DomainError) {
        let mut guard = self.first.lock().expect("error tracker mutex poisoned");
        if guard.is_none() {
            *guard = Some(err);
        }
    }

    /// Take the latched error, if any, leaving the tracker empty.
    pub fn take(&self) -> Option<DomainError> {
        self.first.lock().expect("error tracker mutex poisoned").take()
    }

    pub fn has_error(&self) -> bool {
        self.first.lock().expect("error tracker mutex poisoned").is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn first_error_wins_across_threads() {
        let tracker = Arc::new(ErrorTracker::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let tracker = Arc::clone(&tracker);
            handles.push(thread::spawn(move || {
                tracker.set(DomainError::Other(format!("err-{i}")));
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert!(tracker.has_error());
        // exactly one error survives; which one is non-deterministic, but
        // a second take() must come back empty.
        assert!(tracker.take().is_some());
        assert!(tracker.take().is_none());
    }

    #[test]
    fn empty_tracker_has_no_error() {
        let tracker = ErrorTracker::new();
        assert!(!tracker.has_error());
        assert!(tracker.take().is_none());
    }
}
