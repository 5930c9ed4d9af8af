use clap::{Args, Parser, Subcommand};
use zima_core::models::account::{Plan, Role};

#[derive(Parser, Debug)]
#[command(name = "zima", version, about = "ZIMA administration CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print version information
    Version,

    /// Apply pending database migrations
    Migrate(DbArgs),

    /// Issue, inspect and revoke licenses
    #[command(subcommand)]
    License(LicenseCommand),

    /// Change account role, plan or status
    #[command(subcommand)]
    Account(AccountCommand),
}

#[derive(Args, Debug)]
pub struct DbArgs {
    /// PostgreSQL connection URL
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/zima"
    )]
    pub database_url: String,
}

#[derive(Subcommand, Debug)]
pub enum LicenseCommand {
    /// Issue a license and print its secret (shown only once)
    Create {
        #[command(flatten)]
        db: DbArgs,

        /// License owner (usually an email)
        #[arg(long)]
        owner: String,

        /// Granted scope; repeat for several
        #[arg(long = "scope")]
        scopes: Vec<String>,

        #[arg(long, default_value_t = Plan::Freemium)]
        plan: Plan,

        /// Days until expiry; 0 for none. Defaults to the server's license TTL
        #[arg(long, env = "LICENSE_DEFAULT_TTL_DAYS")]
        days: Option<i64>,

        /// Refuse if the owner already holds an active license
        #[arg(long, default_value_t = false)]
        exclusive: bool,
    },

    /// List all licenses, newest first
    List {
        #[command(flatten)]
        db: DbArgs,
    },

    /// Check a license secret
    Validate {
        #[command(flatten)]
        db: DbArgs,

        secret: String,
    },

    /// Revoke a license by id
    Revoke {
        #[command(flatten)]
        db: DbArgs,

        license_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Set an account's role
    SetRole {
        #[command(flatten)]
        db: DbArgs,

        email: String,
        role: Role,
    },

    /// Set an account's plan
    SetPlan {
        #[command(flatten)]
        db: DbArgs,

        email: String,
        plan: Plan,
    },

    /// Soft-disable an account
    Disable {
        #[command(flatten)]
        db: DbArgs,

        email: String,
    },
}
