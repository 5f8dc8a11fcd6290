//! User aggregate
//!
//! Contains the User entity, the write-side draft, validation rules and the
//! repository interface.

pub mod model;
pub mod repository;
pub mod validation;

// Re-export model types
pub use model::{age_on, NewUser, User, UserDraft};

// Re-export validation
pub use validation::{is_adult_on, validate_user, Rule, Violation};

// Re-export repository trait
pub use repository::UserRepositoryInterface;
