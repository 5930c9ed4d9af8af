//! Schema migrations for the `accounts` and `licenses` tables.
//!
//! The SQL files under `zima_core/migrations/` are compiled into the binary,
//! so the server and the CLI always agree on the schema they expect.

use sqlx::PgPool;
use sqlx::migrate::{MigrateError, Migrator};
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply every embedded migration that the database has not seen yet.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    info!(embedded = MIGRATOR.iter().count(), "applying migrations");
    MIGRATOR.run(pool).await
}
