use std::sync::Arc;

use crate::{
    domain::{
        RepoRetrieveError,
        user::{User, UserRepository, normalize_email},
    },
    ports::password::PasswordHasher,
};

#[async_trait::async_trait]
pub trait LoginUseCase {
    async fn login(&self, email: &str, password: &str) -> Result<User, LoginError>;
}

#[derive(Debug)]
pub enum LoginError {
    InvalidCredentials,
    RepositoryError,
}

pub struct LoginUseCaseImpl<U: UserRepository, P: PasswordHasher> {
    user_repository: Arc<U>,
    password_hasher: Arc<P>,
}

impl<U: UserRepository, P: PasswordHasher> LoginUseCaseImpl<U, P> {
    pub fn new(user_repository: Arc<U>, password_hasher: Arc<P>) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }
}

#[async_trait::async_trait]
impl<U: UserRepository + Send + Sync + 'static, P: PasswordHasher + Send + Sync + 'static>
    LoginUseCase for LoginUseCaseImpl<U, P>
{
    async fn login(&self, email: &str, password: &str) -> Result<User, LoginError> {
        let email = normalize_email(email);
        let user = match self.user_repository.get_user_by_email(&email).await {
            Ok(user) => user,
            Err(RepoRetrieveError::NotFound) => return Err(LoginError::InvalidCredentials),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to load user {} for login: {}", email, e);
                return Err(LoginError::RepositoryError);
            }
        };
        if !user.is_active || !self.password_hasher.verify_password(password, &user.password_hash)
        {
            return Err(LoginError::InvalidCredentials);
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePasswordHasher, InMemoryStore};

    #[tokio::test]
    async fn test_login() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("sara", "tr1cky-booster", false).await;
        let use_case = LoginUseCaseImpl::new(store.clone(), Arc::new(FakePasswordHasher));

        let logged_in = use_case
            .login(" sara@EXAMPLE.com", "tr1cky-booster")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);

        let result = use_case.login("sara@example.com", "wrong").await;
        assert!(matches!(result, Err(LoginError::InvalidCredentials)));

        let result = use_case.login("nobody@example.com", "tr1cky-booster").await;
        assert!(matches!(result, Err(LoginError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_log_in() {
        let store = Arc::new(InMemoryStore::new());
        let mut user = store.seed_user("sara", "tr1cky-booster", false).await;
        user.is_active = false;
        store.update_user(&user).await.unwrap();
        let use_case = LoginUseCaseImpl::new(store.clone(), Arc::new(FakePasswordHasher));

        let result = use_case.login("sara@example.com", "tr1cky-booster").await;
        assert!(matches!(result, Err(LoginError::InvalidCredentials)));
    }
}
