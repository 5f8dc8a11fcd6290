//! Application layer: use-case orchestration

pub mod users;

pub use users::{SharedUserService, UserService};
