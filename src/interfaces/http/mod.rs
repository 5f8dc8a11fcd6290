//! HTTP REST API interfaces
//!
//! - `common`: error envelope and extractors
//! - `modules`: handlers for users, health and metrics
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc, ApiState};
