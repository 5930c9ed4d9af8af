//! Subcommands that talk to the database.

pub mod account;
pub mod license;

use std::future::Future;
use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use zima_core::store::{CredentialStore, PgStore};

use crate::Result;
use crate::cli::DbArgs;

/// Drive `fut` to completion on a single-threaded runtime.
pub fn block_on<F>(fut: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(fut)
}

async fn connect(db: &DbArgs) -> Result<PgPool> {
    log::debug!("connecting to database");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect(&db.database_url)
        .await?;
    Ok(pool)
}

/// Connect and wrap the pool in a credential store.
async fn store(db: &DbArgs) -> Result<Arc<dyn CredentialStore>> {
    Ok(Arc::new(PgStore::new(connect(db).await?)))
}

pub async fn migrate(db: &DbArgs) -> Result<()> {
    let pool = connect(db).await?;
    zima_core::migrate::migrate(&pool).await?;
    log::info!("migrations applied");
    Ok(())
}
