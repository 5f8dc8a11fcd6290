//! User management use-cases
//!
//! All user-related business logic lives here.
//! HTTP handlers should be thin wrappers that delegate to this service.
//!
//! Email uniqueness is checked by reading every stored user before the
//! write. Two concurrent creates with the same email can both pass that
//! check; the store does not enforce uniqueness.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::{DomainError, DomainResult, NewUser, User, UserDraft, UserRepositoryInterface};
use crate::shared::{today, SharedClock};

pub const DUPLICATE_EMAIL_MESSAGE: &str = "Email must be unique.";

/// Service shared by the HTTP layer, independent of the storage backend.
pub type SharedUserService = Arc<UserService<dyn UserRepositoryInterface>>;

/// Orchestrates every user-management use-case.
///
/// Generic over `R: UserRepositoryInterface` so it stays decoupled from
/// the concrete persistence layer.
pub struct UserService<R: UserRepositoryInterface + ?Sized> {
    repo: Arc<R>,
    clock: SharedClock,
}

impl<R: UserRepositoryInterface + ?Sized> UserService<R> {
    pub fn new(repo: Arc<R>, clock: SharedClock) -> Self {
        Self { repo, clock }
    }

    /// Current date according to the injected clock.
    pub fn today(&self) -> NaiveDate {
        today(self.clock.as_ref())
    }

    // ── Queries ─────────────────────────────────────────────────

    /// All stored users. An empty store yields an empty list.
    pub async fn list_users(&self) -> DomainResult<Vec<User>> {
        self.repo.list_users().await
    }

    pub async fn get_user(&self, id: i32) -> DomainResult<User> {
        match self.repo.get_user_by_id(id).await? {
            Some(user) => Ok(user),
            None => {
                warn!(user_id = id, "User not found");
                Err(DomainError::user_not_found(id))
            }
        }
    }

    /// Check the store's liveness.
    pub async fn ping(&self) -> DomainResult<()> {
        self.repo.ping().await
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Validate `draft`, enforce email uniqueness and store it.
    ///
    /// Any id carried by the draft is ignored; the store assigns one.
    pub async fn create_user(&self, draft: UserDraft) -> DomainResult<User> {
        let new_user = self.validate(draft)?;
        self.ensure_unique_email(&new_user, None).await?;

        let user = self.repo.create_user(new_user).await?;
        info!(user_id = user.id, email = %user.email, "User created");
        Ok(user)
    }

    /// Replace the user at `id` with `draft`.
    ///
    /// `id` must match the id inside the draft; the check runs before
    /// validation and before any store access.
    pub async fn update_user(&self, id: i32, draft: UserDraft) -> DomainResult<()> {
        if draft.id != id {
            warn!(path_id = id, body_id = draft.id, "User id mismatch on update");
            return Err(DomainError::IdentifierMismatch {
                path: id,
                body: draft.id,
            });
        }

        let new_user = self.validate(draft)?;
        self.ensure_unique_email(&new_user, Some(id)).await?;

        match self.repo.update_user(new_user.with_id(id)).await {
            Ok(()) => {
                info!(user_id = id, "User updated");
                Ok(())
            }
            Err(conflict @ DomainError::ConcurrencyConflict { .. }) => {
                if self.repo.get_user_by_id(id).await?.is_none() {
                    warn!(user_id = id, "User not found");
                    return Err(DomainError::user_not_found(id));
                }
                warn!(user_id = id, "Update failed: {}", conflict);
                Err(conflict)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete the user at `id`, reporting unknown ids as not found.
    pub async fn delete_user(&self, id: i32) -> DomainResult<()> {
        self.get_user(id).await?;
        self.repo.delete_user(id).await?;
        info!(user_id = id, "User deleted");
        Ok(())
    }

    // ── Helpers ─────────────────────────────────────────────────

    fn validate(&self, draft: UserDraft) -> DomainResult<NewUser> {
        draft.validate(self.today()).inspect_err(|e| {
            warn!(error = %e, "Validation failed for user");
        })
    }

    /// Reject `candidate` when another stored user already has its email.
    /// Comparison is exact and case-sensitive.
    async fn ensure_unique_email(
        &self,
        candidate: &NewUser,
        current_id: Option<i32>,
    ) -> DomainResult<()> {
        let taken = self
            .repo
            .list_users()
            .await?
            .iter()
            .any(|u| u.email == candidate.email && Some(u.id) != current_id);

        if taken {
            warn!(email = %candidate.email, "Duplicate email");
            return Err(DomainError::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string()));
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────
