//! Embedded schema migrations.
//!
//! `diesel-async` does not drive migrations, so the runner uses a plain
//! synchronous connection; callers run it inside `spawn_blocking` before the
//! server starts accepting traffic.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

pub(crate) const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying pending migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Establishing the migration connection failed.
    #[error("failed to connect for migrations: {0}")]
    Connection(String),
    /// Applying a migration failed.
    #[error("failed to run migrations: {0}")]
    Apply(String),
}

/// Apply all pending migrations against the given database.
pub fn run_pending_migrations(database_url: &str) -> Result<(), MigrationError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| MigrationError::Connection(err.to_string()))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply(err.to_string()))?;
    for migration in &applied {
        info!(migration = %migration, "applied migration");
    }
    Ok(())
}
