//! Domain layer: the user entity, its rules and the persistence port.

pub mod user;

pub use user::{
    age_on, is_adult_on, validate_user, NewUser, Rule, User, UserDraft,
    UserRepositoryInterface, Violation,
};

pub use crate::shared::{DomainError, DomainResult};
