use std::sync::Arc;

use crate::domain::{
    RepoRetrieveError, UserId,
    user::{User, UserRepository},
};

#[async_trait::async_trait]
pub trait GetOwnProfileUseCase {
    async fn get_own_profile(&self, user_id: UserId) -> Result<User, GetProfileError>;
}

#[derive(Debug)]
pub enum GetProfileError {
    NotFound,
    RepositoryError,
}

pub struct GetOwnProfileUseCaseImpl<U: UserRepository> {
    user_repository: Arc<U>,
}

impl<U: UserRepository> GetOwnProfileUseCaseImpl<U> {
    pub fn new(user_repository: Arc<U>) -> Self {
        Self { user_repository }
    }
}

#[async_trait::async_trait]
impl<U: UserRepository + Send + Sync + 'static> GetOwnProfileUseCase
    for GetOwnProfileUseCaseImpl<U>
{
    async fn get_own_profile(&self, user_id: UserId) -> Result<User, GetProfileError> {
        match self.user_repository.get_user(user_id).await {
            Ok(user) => Ok(user),
            Err(RepoRetrieveError::NotFound) => Err(GetProfileError::NotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve user {}: {}", user_id, e);
                Err(GetProfileError::RepositoryError)
            }
        }
    }
}
