//! Accounts API - user accounts over HTTP
//!
//! Registration with age and gender checks, bearer-token login, own-profile
//! read/update, a staff-only account listing, and an email password-reset
//! flow.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core entities, identity rules and password policy
//! - **services**: Application use cases
//! - **infra**: Database, repositories and outbound email
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared response types
//! - **utils**: Email templates
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Create an administrative account
//! cargo run -- create-superuser --email root@example.com --password 'Adminpass1'
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User};
pub use errors::{AppError, AppResult};
