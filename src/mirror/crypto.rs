// src/mirror/crypto.rs
use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, instrument};

use super::error::{MirrorError, MirrorResult};

/// Shells out to the system `gpg` binary. Mirrors the clipboard
/// adapter's spawn/pipe-stdin/wait discipline; GPG itself is not an
/// external collaborator in the sense of §6 (the mirror owns
/// encryption), so this lives alongside the rest of the component.
#[instrument(skip_all, level = "debug")]
pub fn encrypt(plaintext: &[u8], recipient: &str) -> MirrorResult<Vec<u8>> {
    run_gpg(&["--batch", "--yes", "--encrypt", "--recipient", recipient], plaintext)
}

#[instrument(skip_all, level = "debug")]
pub fn decrypt(ciphertext: &[u8]) -> MirrorResult<Vec<u8>> {
    run_gpg(&["--batch", "--yes", "--decrypt"], ciphertext)
}

fn run_gpg(args: &[&str], input: &[u8]) -> MirrorResult<Vec<u8>> {
    let mut child = Command::new("gpg")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|_| MirrorError::GpgNotFound)?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| MirrorError::GpgFailed("failed to open stdin".to_string()))?;
    stdin
        .write_all(input)
        .map_err(|e| MirrorError::GpgFailed(format!("failed to write to gpg: {e}")))?;
    drop(stdin);

    let output = child
        .wait_with_output()
        .map_err(|e| MirrorError::GpgFailed(format!("failed to wait for gpg: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(%stderr, "gpg invocation failed");
        return Err(MirrorError::GpgFailed(stderr.trim().to_string()));
    }

    Ok(output.stdout)
}
