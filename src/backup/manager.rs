// src/backup/manager.rs
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info, instrument};

use super::error::{BackupError, BackupResult};

/// Copies a store file into its backup directory and prunes old copies
/// past a retention limit (§4.F). Mirrors the date-suffixed copy the
/// connection pool makes before running a migration, generalized into a
/// standalone component with listing and pruning.
#[derive(Clone, Debug)]
pub struct BackupManager {
    backup_dir: PathBuf,
    retention_limit: i64,
}

impl BackupManager {
    pub fn new(backup_dir: impl Into<PathBuf>, retention_limit: i64) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            retention_limit,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.retention_limit <= 0
    }

    /// `<backup_dir>/<YYYY-MM-DD_HH-MM>_<basename>`.
    fn backup_path(&self, db_path: &Path) -> BackupResult<PathBuf> {
        let basename = db_path
            .file_name()
            .ok_or_else(|| BackupError::PathNotSet)?
            .to_string_lossy()
            .into_owned();
        let stamp = Local::now().format("%Y-%m-%d_%H-%M").to_string();
        Ok(self.backup_dir.join(format!("{stamp}_{basename}")))
    }

    #[instrument(skip_all, level = "debug")]
    pub fn create(&self, db_path: &Path, force: bool) -> BackupResult<PathBuf> {
        if self.is_disabled() {
            return Err(BackupError::Disabled);
        }

        if !self.backup_dir.exists() {
            fs::create_dir_all(&self.backup_dir)?;
        }

        let target = self.backup_path(db_path)?;
        if target.exists() && !force {
            return Err(BackupError::Exists(target.display().to_string()));
        }

        fs::copy(db_path, &target)?;
        info!(path = %target.display(), "backup created");
        Ok(target)
    }

    /// Files in `backup_dir` whose name contains `basename`, sorted by
    /// their `YYYY-MM-DD_HH-MM` date prefix ascending (oldest first).
    #[instrument(skip_all, level = "debug")]
    pub fn list(&self, basename: &str) -> BackupResult<Vec<PathBuf>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&self.backup_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().contains(basename))
                    .unwrap_or(false)
            })
            .collect();

        entries.sort();
        Ok(entries)
    }

    /// Removes the oldest backups beyond `retention_limit`, by filename
    /// date prefix. No-op (not an error) if nothing is over the limit.
    #[instrument(skip_all, level = "info")]
    pub fn prune(&self, basename: &str) -> BackupResult<Vec<PathBuf>> {
        if self.is_disabled() {
            return Err(BackupError::Disabled);
        }

        let all = self.list(basename)?;
        let limit = self.retention_limit as usize;
        if all.len() <= limit {
            debug!(count = all.len(), limit, "nothing to prune");
            return Ok(Vec::new());
        }

        let to_remove = &all[..all.len() - limit];
        let mut removed = Vec::with_capacity(to_remove.len());
        for path in to_remove {
            fs::remove_file(path)?;
            removed.push(path.clone());
        }
        Ok(removed)
    }

    pub fn find(&self, basename: &str, name: &str) -> BackupResult<PathBuf> {
        self.list(basename)?
            .into_iter()
            .find(|p| p.file_name().map(|n| n.to_string_lossy() == name).unwrap_or(false))
            .ok_or_else(|| BackupError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::write(path, b"data").unwrap();
    }

    #[test]
    fn disabled_when_limit_not_positive() {
        let mgr = BackupManager::new("/tmp/x", 0);
        assert!(mgr.is_disabled());
        assert!(matches!(mgr.create(Path::new("/tmp/db.sqlite"), false), Err(BackupError::Disabled)));
    }

    #[test]
    fn create_fails_on_existing_target_without_force() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("gomarks.sqlite");
        touch(&db);
        let backup_dir = dir.path().join("backups");
        fs::create_dir_all(&backup_dir).unwrap();

        // Pre-create the exact target `create` will compute, so the
        // collision doesn't depend on two calls landing in the same
        // minute-resolution stamp.
        let stamp = Local::now().format("%Y-%m-%d_%H-%M").to_string();
        let target = backup_dir.join(format!("{stamp}_gomarks.sqlite"));
        touch(&target);

        let mgr = BackupManager::new(&backup_dir, 5);
        let result = mgr.create(&db, false);
        assert!(matches!(result, Err(BackupError::Exists(ref p)) if p == &target.display().to_string()));

        let forced = mgr.create(&db, true).unwrap();
        assert_eq!(forced, target);
    }

    #[test]
    fn prune_keeps_only_most_recent_under_limit() {
        let dir = tempdir().unwrap();
        let backup_dir = dir.path().join("backups");
        fs::create_dir_all(&backup_dir).unwrap();
        for stamp in ["2024-01-01_00-00", "2024-01-02_00-00", "2024-01-03_00-00"] {
            touch(&backup_dir.join(format!("{stamp}_gomarks.sqlite")));
        }

        let mgr = BackupManager::new(&backup_dir, 2);
        let removed = mgr.prune("gomarks.sqlite").unwrap();
        assert_eq!(removed.len(), 1);
        assert!(removed[0].to_string_lossy().contains("2024-01-01"));

        let remaining = mgr.list("gomarks.sqlite").unwrap();
        assert_eq!(remaining.len(), 2);
    }
}
