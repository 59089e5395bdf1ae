//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `create-superuser` - Administrative account creation
//! - `wait-for-db` - Wait for the database to come up

pub mod args;

pub use args::{Cli, Commands};
