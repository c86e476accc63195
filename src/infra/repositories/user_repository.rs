//! User repository: persistence contract and SeaORM implementation.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::User;
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// All query methods exclude soft-deleted records; a soft-deleted row is
/// invisible to this contract except through [`UserRepository::update`],
/// which addresses rows by id regardless of state so that the delete
/// itself can be persisted.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user. Fails with a conflict when another active user
    /// already holds the email.
    async fn create(&self, user: &User) -> AppResult<()>;

    /// Find active user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<User>;

    /// Find active user by email address
    async fn find_by_email(&self, email: &str) -> AppResult<User>;

    /// List active users ordered by creation time, newest first.
    /// The returned total counts all active rows, independent of paging.
    async fn list(&self, limit: u64, offset: u64) -> AppResult<(Vec<User>, u64)>;

    /// Replace the mutable fields (email, username, updated_at, deleted_at)
    /// of the stored row. Zero rows affected reports not-found.
    async fn update(&self, user: &User) -> AppResult<()>;

    /// Check whether an active user holds the email
    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;
}

/// Concrete implementation of UserRepository backed by Postgres.
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, user: &User) -> AppResult<()> {
        let active_model = ActiveModel {
            id: Set(user.id()),
            email: Set(user.email().to_owned()),
            username: Set(user.username().to_owned()),
            password_hash: Set(user.password_hash().to_owned()),
            created_at: Set(user.created_at()),
            updated_at: Set(user.updated_at()),
            deleted_at: Set(user.deleted_at()),
        };

        match active_model.insert(&self.db).await {
            Ok(_) => Ok(()),
            // The partial unique index is the authoritative, race-safe
            // duplicate signal; the pre-check in the service layer only
            // narrows the common case.
            Err(err) if is_unique_violation(&err) => Err(AppError::conflict("User")),
            Err(err) => Err(AppError::from(err)),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::NotFound)?;

        Ok(User::from(model))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<User> {
        let model = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::NotFound)?;

        Ok(User::from(model))
    }

    async fn list(&self, limit: u64, offset: u64) -> AppResult<(Vec<User>, u64)> {
        let total = UserEntity::find()
            .filter(user::Column::DeletedAt.is_null())
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        let models = UserEntity::find()
            .filter(user::Column::DeletedAt.is_null())
            .order_by_desc(user::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok((models.into_iter().map(User::from).collect(), total))
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        // Full replace of the mutable fields, addressed by id only: this
        // is the path that persists a soft delete, so it must reach rows
        // whose deleted_at is being set.
        let result = UserEntity::update_many()
            .col_expr(user::Column::Email, Expr::value(user.email().to_owned()))
            .col_expr(
                user::Column::Username,
                Expr::value(user.username().to_owned()),
            )
            .col_expr(user::Column::UpdatedAt, Expr::value(user.updated_at()))
            .col_expr(user::Column::DeletedAt, Expr::value(user.deleted_at()))
            .filter(user::Column::Id.eq(user.id()))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::DeletedAt.is_null())
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }
}

/// Detect a unique constraint violation on insert.
///
/// The structured error kind from the driver is authoritative; matching
/// on the raw error text is a compatibility shim for backends that do
/// not surface it.
fn is_unique_violation(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }
    err.to_string()
        .contains("duplicate key value violates unique constraint")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_text_shim() {
        let err = DbErr::Custom(
            "pq: duplicate key value violates unique constraint \
             \"users_email_unique_not_deleted\""
                .to_string(),
        );
        assert!(is_unique_violation(&err));

        let other = DbErr::Custom("connection reset by peer".to_string());
        assert!(!is_unique_violation(&other));
    }
}
