// src/collaborators/editor.rs
use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ports::collaborators::Editor;

const FALLBACK_EDITORS: [&str; 5] = ["vim", "nvim", "nano", "emacs", "helix"];

/// Opens `$GOMARKS_EDITOR`/`$EDITOR`/the fallback list against a scoped
/// temp file, same discipline as the template service's editor
/// round-trip: write, invoke, detect whether the mtime moved, read back.
#[derive(Debug, Default)]
pub struct SystemEditor;

impl SystemEditor {
    fn resolve_editor() -> String {
        if let Ok(e) = std::env::var("GOMARKS_EDITOR") {
            return e;
        }
        if let Ok(e) = std::env::var("EDITOR") {
            return e;
        }
        FALLBACK_EDITORS
            .into_iter()
            .find(|candidate| Self::is_on_path(candidate))
            .unwrap_or(FALLBACK_EDITORS[0])
            .to_string()
    }

    /// Probes `candidate --version` with output discarded; a clean exit
    /// means the binary resolved on `PATH`.
    fn is_on_path(candidate: &str) -> bool {
        Command::new(candidate)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl Editor for SystemEditor {
    #[instrument(skip_all, level = "debug")]
    fn edit_bytes(&self, buf: &[u8]) -> DomainResult<Option<Vec<u8>>> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(buf)?;
        temp_file.flush()?;

        let path = temp_file.path().to_path_buf();
        let modified_before = fs::metadata(&path)?.modified()?;

        let editor = Self::resolve_editor();
        debug!(editor, "opening editor");
        let status = Command::new(&editor).arg(&path).status().map_err(|_| {
            DomainError::Other(format!("editor not found: {editor}"))
        })?;

        if !status.success() {
            return Err(DomainError::Other(format!("editor exited with error: {editor}")));
        }

        let modified_after = fs::metadata(&path)?.modified()?;
        if modified_after == modified_before {
            return Ok(None);
        }

        Ok(Some(fs::read(&path)?))
    }
}
