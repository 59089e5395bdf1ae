//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Accounts API - registration, login, profiles and password reset
#[derive(Parser, Debug)]
#[command(name = "accounts-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Create an administrative account
    CreateSuperuser(CreateSuperuserArgs),

    /// Block until the database accepts connections
    WaitForDb(WaitForDbArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "SERVER_PORT")]
    pub port: u16,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the create-superuser command
#[derive(Parser, Debug)]
pub struct CreateSuperuserArgs {
    /// Login email
    #[arg(long)]
    pub email: String,

    /// Password (minimum 8 characters)
    #[arg(long, env = "SUPERUSER_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Display name (defaults to the email's local part)
    #[arg(long)]
    pub name: Option<String>,
}

/// Arguments for the wait-for-db command
#[derive(Parser, Debug)]
pub struct WaitForDbArgs {
    /// Seconds between attempts
    #[arg(long, default_value = "1")]
    pub interval_secs: u64,

    /// Give up after this many attempts (0 = retry forever)
    #[arg(long, default_value = "0")]
    pub max_attempts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_superuser() {
        let cli = Cli::parse_from([
            "accounts-api",
            "create-superuser",
            "--email",
            "root@example.com",
            "--password",
            "Adminpass1",
        ]);

        match cli.command {
            Commands::CreateSuperuser(args) => {
                assert_eq!(args.email, "root@example.com");
                assert_eq!(args.name, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_wait_for_db_defaults() {
        let cli = Cli::parse_from(["accounts-api", "--verbose", "wait-for-db"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::WaitForDb(args) => {
                assert_eq!(args.interval_secs, 1);
                assert_eq!(args.max_attempts, 0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
