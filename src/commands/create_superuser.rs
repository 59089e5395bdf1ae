//! Create-superuser command - Administrative account creation.

use std::sync::Arc;

use crate::cli::args::CreateSuperuserArgs;
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Database, UserStore};
use crate::services::{AccountManager, AccountService};

/// Execute the create-superuser command
pub async fn execute(args: CreateSuperuserArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let accounts = AccountManager::new(Arc::new(UserStore::new(db.get_connection())));

    let user = accounts
        .create_superuser(args.email, args.password, args.name)
        .await?;

    println!("Superuser created: {} ({})", user.email, user.id);
    Ok(())
}
