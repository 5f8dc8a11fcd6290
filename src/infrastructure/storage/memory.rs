//! In-memory storage implementation

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{DomainError, DomainResult, NewUser, User, UserRepositoryInterface};

/// In-memory user store for development and testing.
///
/// Ids start at 1 and are never reused, even after a delete.
pub struct InMemoryUserRepository {
    users: DashMap<i32, User>,
    id_counter: AtomicI32,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            id_counter: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn list_users(&self) -> DomainResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn get_user_by_id(&self, id: i32) -> DomainResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn create_user(&self, user: NewUser) -> DomainResult<User> {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        let user = user.with_id(id);
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: User) -> DomainResult<()> {
        match self.users.get_mut(&user.id) {
            Some(mut stored) => {
                *stored = user;
                Ok(())
            }
            None => Err(DomainError::ConcurrencyConflict {
                entity: "User",
                id: user.id,
            }),
        }
    }

    async fn delete_user(&self, id: i32) -> DomainResult<()> {
        self.users.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: email.into(),
            date_of_birth: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            phone_number: "1234567890".into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();
        let a = repo.create_user(new_user("a@x.com")).await.unwrap();
        let b = repo.create_user(new_user("b@x.com")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let ids: Vec<i32> = repo.list_users().await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repo = InMemoryUserRepository::new();
        let a = repo.create_user(new_user("a@x.com")).await.unwrap();
        repo.delete_user(a.id).await.unwrap();
        let b = repo.create_user(new_user("b@x.com")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn update_of_missing_record_is_conflict() {
        let repo = InMemoryUserRepository::new();
        let ghost = new_user("a@x.com").with_id(99);
        assert!(matches!(
            repo.update_user(ghost).await,
            Err(DomainError::ConcurrencyConflict { id: 99, .. })
        ));
    }

    #[tokio::test]
    async fn delete_of_missing_record_is_noop() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.delete_user(5).await.is_ok());
    }
}
