use std::sync::Arc;

use chrono::Utc;

use crate::{
    domain::{
        RepoCreateError, RepoRetrieveError,
        user::{NewUser, Registration, User, UserRepository, normalize_email},
    },
    ports::password::PasswordHasher,
};

#[async_trait::async_trait]
pub trait RegisterUseCase {
    async fn register(&self, registration: Registration) -> Result<User, RegisterError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("A user with this email already exists")]
    EmailTaken,
    #[error("A user with this user name already exists")]
    UserNameTaken,
    #[error("Could not complete the registration")]
    RepositoryError,
}

pub struct RegisterUseCaseImpl<U: UserRepository, P: PasswordHasher> {
    user_repository: Arc<U>,
    password_hasher: Arc<P>,
}

impl<U: UserRepository, P: PasswordHasher> RegisterUseCaseImpl<U, P> {
    pub fn new(user_repository: Arc<U>, password_hasher: Arc<P>) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }
}

#[async_trait::async_trait]
impl<U: UserRepository + Send + Sync + 'static, P: PasswordHasher + Send + Sync + 'static>
    RegisterUseCase for RegisterUseCaseImpl<U, P>
{
    async fn register(&self, mut registration: Registration) -> Result<User, RegisterError> {
        registration.email = normalize_email(&registration.email);
        registration.user_name = registration.user_name.trim().to_string();
        registration.check().map_err(RegisterError::InvalidInput)?;

        match self
            .user_repository
            .get_user_by_email(&registration.email)
            .await
        {
            Ok(_) => return Err(RegisterError::EmailTaken),
            Err(RepoRetrieveError::NotFound) => {}
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to look up email {}: {}", registration.email, e);
                return Err(RegisterError::RepositoryError);
            }
        }
        match self
            .user_repository
            .get_user_by_name(&registration.user_name)
            .await
        {
            Ok(_) => return Err(RegisterError::UserNameTaken),
            Err(RepoRetrieveError::NotFound) => {}
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to look up user {}: {}", registration.user_name, e);
                return Err(RegisterError::RepositoryError);
            }
        }

        let password_hash = match self.password_hasher.hash_password(&registration.password) {
            Ok(hash) => hash,
            Err(e) => {
                log::error!("{}", e);
                return Err(RegisterError::RepositoryError);
            }
        };

        let new_user = NewUser {
            email: registration.email,
            user_name: registration.user_name,
            password_hash,
            joining_date: Utc::now(),
            is_staff: false,
            is_superuser: false,
        };
        match self.user_repository.create_user(new_user).await {
            Ok(user) => {
                log::info!("Registered user {} ({})", user.user_name, user.id);
                Ok(user)
            }
            // lost a race against a concurrent registration
            Err(RepoCreateError::Conflict) => Err(RegisterError::EmailTaken),
            Err(RepoCreateError::StorageError(e)) => {
                log::error!("Failed to create user: {}", e);
                Err(RegisterError::RepositoryError)
            }
        }
    }
}
