use std::sync::Arc;

use zima_core::models::account::{Account, normalize_email};
use zima_core::store::{CredentialStore, StoreError};

use crate::cli::AccountCommand;
use crate::{Error, Result};

async fn find(store: &Arc<dyn CredentialStore>, email: &str) -> Result<Account> {
    let email = normalize_email(email)
        .ok_or_else(|| Error::Custom(format!("invalid email address '{email}'")))?;
    store
        .find_account_by_email(&email)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("account {email}")).into())
}

pub async fn run(cmd: AccountCommand) -> Result<()> {
    match cmd {
        AccountCommand::SetRole { db, email, role } => {
            let store = super::store(&db).await?;
            let account = find(&store, &email).await?;
            let account = store.set_role(&account.id, role).await?;
            log::info!("{} is now {}", account.email, account.role);
        }
        AccountCommand::SetPlan { db, email, plan } => {
            let store = super::store(&db).await?;
            let account = find(&store, &email).await?;
            let account = store.set_plan(&account.id, plan).await?;
            log::info!("{} is now on plan {}", account.email, account.plan);
        }
        AccountCommand::Disable { db, email } => {
            let store = super::store(&db).await?;
            let account = find(&store, &email).await?;
            store.set_disabled(&account.id, true).await?;
            log::info!("{} disabled", account.email);
        }
    }
    Ok(())
}
