//! User service - Orchestrates user account use cases.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::User;
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a new user account.
    ///
    /// Validation happens inside entity construction; the email existence
    /// pre-check narrows the common duplicate case but the storage layer's
    /// uniqueness constraint is what makes the operation race-safe.
    async fn create_user(
        &self,
        email: String,
        username: String,
        password: String,
    ) -> AppResult<User>;

    /// List active users, newest first, with the total active count.
    async fn list_users(&self, limit: u64, offset: u64) -> AppResult<(Vec<User>, u64)>;

    /// Soft delete a user by id.
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserService using the repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(
        &self,
        email: String,
        username: String,
        password: String,
    ) -> AppResult<User> {
        // Best-effort pre-check. Two concurrent requests can both pass it;
        // the insert below then surfaces the same conflict signal.
        if self.repo.exists_by_email(&email).await? {
            return Err(AppError::conflict("User"));
        }

        let user = User::new(&email, &username, &password)?;

        self.repo.create(&user).await?;

        Ok(user)
    }

    async fn list_users(&self, limit: u64, offset: u64) -> AppResult<(Vec<User>, u64)> {
        self.repo.list(limit, offset).await
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        let mut user = self.repo.find_by_id(id).await?;

        user.delete();

        self.repo.update(&user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::infra::MockUserRepository;
    use mockall::Sequence;

    fn make_user() -> User {
        User::new("a@b.com", "alice123", "pass1234").unwrap()
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_email()
            .withf(|email| email == "a@b.com")
            .times(1)
            .returning(|_| Ok(false));
        repo.expect_create()
            .withf(|user: &User| {
                user.email() == "a@b.com" && user.username() == "alice123" && !user.is_deleted()
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = UserManager::new(Arc::new(repo));
        let user = service
            .create_user(
                "a@b.com".to_string(),
                "alice123".to_string(),
                "pass1234".to_string(),
            )
            .await
            .unwrap();

        assert!(user.verify_password("pass1234"));
    }

    #[tokio::test]
    async fn test_create_user_conflict_from_pre_check() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_email()
            .times(1)
            .returning(|_| Ok(true));
        // No create expectation: reaching the insert would fail the test.

        let service = UserManager::new(Arc::new(repo));
        let err = service
            .create_user(
                "a@b.com".to_string(),
                "alice123".to_string(),
                "pass1234".to_string(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "USER_ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_create_user_conflict_from_storage_race() {
        // Both concurrent requests passed the pre-check; the storage
        // constraint rejects the second insert and the caller must see
        // the same signal as the pre-check path.
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_email()
            .times(1)
            .returning(|_| Ok(false));
        repo.expect_create()
            .times(1)
            .returning(|_| Err(AppError::conflict("User")));

        let service = UserManager::new(Arc::new(repo));
        let err = service
            .create_user(
                "a@b.com".to_string(),
                "alice123".to_string(),
                "pass1234".to_string(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "USER_ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_create_user_validation_failure_skips_insert() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_email()
            .times(1)
            .returning(|_| Ok(false));

        let service = UserManager::new(Arc::new(repo));
        let err = service
            .create_user(
                "not-an-email".to_string(),
                "alice123".to_string(),
                "pass1234".to_string(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Domain(DomainError::InvalidEmail)
        ));
    }

    #[tokio::test]
    async fn test_list_users_passes_through() {
        let mut repo = MockUserRepository::new();
        repo.expect_list()
            .withf(|&limit, &offset| limit == 10 && offset == 0)
            .times(1)
            .returning(|_, _| Ok((vec![make_user(), make_user(), make_user()], 3)));

        let service = UserManager::new(Arc::new(repo));
        let (users, total) = service.list_users(10, 0).await.unwrap();

        assert_eq!(users.len(), 3);
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_delete_user_marks_and_persists() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .times(1)
            .returning(|_| Ok(make_user()));
        repo.expect_update()
            .withf(|user: &User| {
                user.is_deleted() && user.deleted_at() == Some(user.updated_at())
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = UserManager::new(Arc::new(repo));
        service.delete_user(Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .times(1)
            .returning(|_| Err(AppError::NotFound));

        let service = UserManager::new(Arc::new(repo));
        let err = service.delete_user(Uuid::new_v4()).await.unwrap_err();

        assert_eq!(err.code(), "USER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_user_twice_reports_not_found() {
        let mut repo = MockUserRepository::new();
        let mut seq = Sequence::new();
        repo.expect_find_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(make_user()));
        repo.expect_update()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        // Once deleted the row is invisible to the lookup path.
        repo.expect_find_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::NotFound));

        let service = UserManager::new(Arc::new(repo));
        let id = Uuid::new_v4();

        service.delete_user(id).await.unwrap();
        let err = service.delete_user(id).await.unwrap_err();
        assert_eq!(err.code(), "USER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let mut repo = MockUserRepository::new();
        repo.expect_list()
            .times(1)
            .returning(|_, _| Err(AppError::internal("connection lost")));

        let service = UserManager::new(Arc::new(repo));
        let err = service.list_users(10, 0).await.unwrap_err();

        assert_eq!(err.code(), "INTERNAL_ERROR");
    }
}
