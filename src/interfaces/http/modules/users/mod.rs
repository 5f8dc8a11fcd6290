//! Users module: CRUD over user records

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
