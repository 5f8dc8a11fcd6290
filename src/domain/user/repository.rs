use async_trait::async_trait;

use super::{NewUser, User};
use crate::shared::DomainResult;

/// Durable storage of users keyed by integer id.
#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// Every stored user, ordered by id.
    async fn list_users(&self) -> DomainResult<Vec<User>>;

    async fn get_user_by_id(&self, id: i32) -> DomainResult<Option<User>>;

    /// Store `user` under a freshly assigned id and return the stored record.
    async fn create_user(&self, user: NewUser) -> DomainResult<User>;

    /// Overwrite the record with `user.id`.
    ///
    /// Fails with `DomainError::ConcurrencyConflict` when no such record
    /// exists at write time.
    async fn update_user(&self, user: User) -> DomainResult<()>;

    /// Remove the record with `id`. Removing an unknown id is a no-op.
    async fn delete_user(&self, id: i32) -> DomainResult<()>;

    /// Cheap round-trip to the backing store, used by health checks.
    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}
