use chrono::Utc;
use zima_core::licenses::{LicenseManager, LicensePolicy};

use crate::Result;
use crate::cli::LicenseCommand;

pub async fn run(cmd: LicenseCommand) -> Result<()> {
    match cmd {
        LicenseCommand::Create {
            db,
            owner,
            scopes,
            plan,
            days,
            exclusive,
        } => {
            let policy = LicensePolicy {
                one_active_per_owner: exclusive,
                ..LicensePolicy::default()
            };
            let licenses = LicenseManager::new(super::store(&db).await?, policy);
            let issued = licenses.create(&owner, &scopes, plan, days).await?;
            let expires = issued
                .record
                .expires_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".into());
            println!("id:      {}", issued.record.id);
            println!("owner:   {}", issued.record.owner);
            println!("plan:    {}", issued.record.plan);
            println!("scopes:  {}", issued.record.scopes.join(","));
            println!("expires: {expires}");
            println!("secret:  {}", issued.secret);
            log::warn!("store the secret now; it cannot be shown again");
        }
        LicenseCommand::List { db } => {
            let licenses = LicenseManager::new(super::store(&db).await?, LicensePolicy::default());
            let now = Utc::now();
            for record in licenses.list().await? {
                println!(
                    "{}  {:<8}  {:<13}  {}  [{}]",
                    record.id,
                    record.status_at(now),
                    record.plan,
                    record.owner,
                    record.scopes.join(",")
                );
            }
        }
        LicenseCommand::Validate { db, secret } => {
            let licenses = LicenseManager::new(super::store(&db).await?, LicensePolicy::default());
            let grant = licenses.validate(&secret).await?;
            println!(
                "valid: {} ({}) plan {} scopes [{}]",
                grant.license_id,
                grant.owner,
                grant.plan,
                grant.scopes.join(",")
            );
        }
        LicenseCommand::Revoke { db, license_id } => {
            let licenses = LicenseManager::new(super::store(&db).await?, LicensePolicy::default());
            let record = licenses.revoke(&license_id).await?;
            log::info!("license {} revoked", record.id);
        }
    }
    Ok(())
}
