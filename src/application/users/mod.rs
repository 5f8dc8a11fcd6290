//! Users module: request orchestration for the user resource
//!
//! Contains the `UserService` which runs validation, the email uniqueness
//! check and the persistence calls for every user use-case.

pub mod service;

pub use service::{SharedUserService, UserService};
