//! # User Service
//!
//! REST service for user records: create, read, replace and delete, with
//! field validation, email uniqueness and an age derived at read time.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: the user entity, validation rules and the repository port
//! - **application**: use-case orchestration (`UserService`)
//! - **infrastructure**: SeaORM/SQLite and in-memory repositories
//! - **interfaces**: HTTP handlers, router and Swagger documentation
//! - **shared**: errors, clock injection and shutdown plumbing
//! - **server**: lifecycle shared by the CLI binary and tests

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::create_api_router;
