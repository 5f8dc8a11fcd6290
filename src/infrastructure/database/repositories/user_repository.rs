use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{DomainError, DomainResult, NewUser, User, UserRepositoryInterface};
use crate::infrastructure::database::entities::user;

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        date_of_birth: model.date_of_birth,
        phone_number: model.phone_number,
    }
}

/// Active model with every data column set and the id left untouched.
fn active_fields(
    first_name: String,
    last_name: String,
    email: String,
    date_of_birth: chrono::NaiveDate,
    phone_number: String,
) -> user::ActiveModel {
    user::ActiveModel {
        id: NotSet,
        first_name: Set(first_name),
        last_name: Set(last_name),
        email: Set(email),
        date_of_birth: Set(date_of_birth),
        phone_number: Set(phone_number),
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn list_users(&self) -> DomainResult<Vec<User>> {
        let models = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(user_model_to_domain).collect())
    }

    async fn get_user_by_id(&self, id: i32) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn create_user(&self, dto: NewUser) -> DomainResult<User> {
        let new_user = active_fields(
            dto.first_name,
            dto.last_name,
            dto.email,
            dto.date_of_birth,
            dto.phone_number,
        );

        let model = new_user.insert(&self.db).await.map_err(db_err)?;
        Ok(user_model_to_domain(model))
    }

    async fn update_user(&self, dto: User) -> DomainResult<()> {
        let id = dto.id;
        let fields = active_fields(
            dto.first_name,
            dto.last_name,
            dto.email,
            dto.date_of_birth,
            dto.phone_number,
        );

        // A zero row count means the record vanished after it was read.
        let result = user::Entity::update_many()
            .set(fields)
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::ConcurrencyConflict { entity: "User", id });
        }

        Ok(())
    }

    async fn delete_user(&self, id: i32) -> DomainResult<()> {
        user::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn ping(&self) -> DomainResult<()> {
        self.db
            .execute_unprepared("SELECT 1")
            .await
            .map(|_| ())
            .map_err(db_err)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sea_orm_migration::MigratorTrait;

    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::{init_database, DatabaseConfig};

    async fn repo() -> UserRepository {
        let db = init_database(&DatabaseConfig::sqlite_in_memory())
            .await
            .unwrap();
        Migrator::up(&db, None).await.unwrap();
        UserRepository::new(db)
    }

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
    async fn create_assigns_id_and_persists() {
        let repo = repo().await;
        let created = repo.create_user(new_user("john.doe@example.com")).await.unwrap();
        assert!(created.id > 0);

        let fetched = repo.get_user_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn list_returns_all_in_id_order() {
        let repo = repo().await;
        repo.create_user(new_user("john.doe@example.com")).await.unwrap();
        repo.create_user(new_user("jane.doe@example.com")).await.unwrap();

        let users = repo.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users[0].id < users[1].id);
    }

    #[tokio::test]
    async fn duplicate_emails_are_accepted_by_the_store() {
        let repo = repo().await;
        repo.create_user(new_user("a@x.com")).await.unwrap();
        assert!(repo.create_user(new_user("a@x.com")).await.is_ok());
    }

    #[tokio::test]
    async fn update_overwrites_record() {
        let repo = repo().await;
        let mut user = repo.create_user(new_user("a@x.com")).await.unwrap();
        user.first_name = "Jane".into();
        user.date_of_birth = NaiveDate::from_ymd_opt(1990, 6, 15).unwrap();

        repo.update_user(user.clone()).await.unwrap();
        assert_eq!(repo.get_user_by_id(user.id).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn update_of_deleted_record_is_conflict() {
        let repo = repo().await;
        let user = repo.create_user(new_user("a@x.com")).await.unwrap();
        repo.delete_user(user.id).await.unwrap();

        assert!(matches!(
            repo.update_user(user).await,
            Err(DomainError::ConcurrencyConflict { .. })
        ));
    }

    #[tokio::test]
    async fn delete_removes_record_and_tolerates_unknown_ids() {
        let repo = repo().await;
        let user = repo.create_user(new_user("a@x.com")).await.unwrap();

        repo.delete_user(user.id).await.unwrap();
        assert!(repo.get_user_by_id(user.id).await.unwrap().is_none());
        assert!(repo.delete_user(user.id).await.is_ok());
    }

    #[tokio::test]
    async fn ping_succeeds_on_open_connection() {
        assert!(repo().await.ping().await.is_ok());
    }
}
