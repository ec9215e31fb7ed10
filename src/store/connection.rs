// src/store/connection.rs
use std::fs;
use std::path::Path;

use chrono::Local;
use diesel::r2d2::{self, ConnectionManager};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::MigrationHarness;
use tracing::{debug, info, instrument};

use super::error::{StoreError, StoreResult};
use super::migration::MIGRATIONS;

pub type ConnectionPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type PooledConnection = r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

/// Build a pool for `database_url` and bring the schema up to date.
///
/// Pending migrations trigger a date-suffixed copy of the existing file
/// before `run_pending_migrations` runs, mirroring the backup component's
/// naming convention (see `backup::manager`) without depending on it.
#[instrument(level = "info", skip_all, fields(database_url))]
pub fn init_pool(database_url: &str) -> StoreResult<ConnectionPool> {
    debug!("initializing connection pool for {}", database_url);

    if let Some(parent) = Path::new(database_url).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Other(e.to_string()))?;
        }
    }

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(15)
        .build(manager)
        .map_err(StoreError::Pool)?;

    run_pending_migrations(&pool, database_url)?;

    info!("connection pool initialized");
    Ok(pool)
}

#[instrument(level = "info", skip(pool))]
fn run_pending_migrations(pool: &ConnectionPool, database_url: &str) -> StoreResult<()> {
    let mut conn = pool.get().map_err(StoreError::Pool)?;

    let pending = conn
        .pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Migration(format!("failed to check pending migrations: {e}")))?;

    if pending.is_empty() {
        debug!("no pending migrations");
        return Ok(());
    }

    for migration in &pending {
        debug!(name = %migration.name(), "pending migration");
    }

    let db_path = Path::new(database_url);
    if db_path.exists() {
        backup_before_migration(db_path)?;
    }

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Migration(format!("failed to run migrations: {e}")))?;

    info!("migrations completed");
    Ok(())
}

fn backup_before_migration(db_path: &Path) -> StoreResult<()> {
    let date_suffix = Local::now().format("%Y%m%d").to_string();

    let file_name = db_path
        .file_name()
        .ok_or_else(|| StoreError::Other("could not determine database filename".into()))?
        .to_string_lossy()
        .into_owned();

    let backup_name = match file_name.rfind('.') {
        Some(pos) => {
            let (name, ext) = file_name.split_at(pos);
            format!("{name}_premigration_{date_suffix}{ext}")
        }
        None => format!("{file_name}_premigration_{date_suffix}"),
    };

    let backup_path = db_path.with_file_name(backup_name);
    fs::copy(db_path, &backup_path).map_err(|e| StoreError::Other(e.to_string()))?;
    debug!(path = %backup_path.display(), "pre-migration backup created");
    Ok(())
}
