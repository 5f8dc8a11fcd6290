//! Shared HTTP building blocks

pub mod api_response;
pub mod extract;

pub use api_response::{domain_error_response, ApiError, ErrorResponse, ViolationDto};
pub use extract::{IdPath, JsonBody};
