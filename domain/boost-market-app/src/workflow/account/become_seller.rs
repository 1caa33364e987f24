use std::sync::Arc;

use crate::domain::{
    RepoError, RepoRetrieveError, UserId,
    seller::{Seller, SellerRepository},
    user::UserRepository,
};

#[async_trait::async_trait]
pub trait BecomeSellerUseCase {
    /// Returns the existing seller role if the user already has one.
    async fn become_seller(&self, user_id: UserId) -> Result<Seller, BecomeSellerError>;
}

#[derive(Debug)]
pub enum BecomeSellerError {
    UserNotFound,
    RepositoryError,
}

pub struct BecomeSellerUseCaseImpl<U: UserRepository, S: SellerRepository> {
    user_repository: Arc<U>,
    seller_repository: Arc<S>,
}

impl<U: UserRepository, S: SellerRepository> BecomeSellerUseCaseImpl<U, S> {
    pub fn new(user_repository: Arc<U>, seller_repository: Arc<S>) -> Self {
        Self {
            user_repository,
            seller_repository,
        }
    }
}

#[async_trait::async_trait]
impl<U: UserRepository + Send + Sync + 'static, S: SellerRepository + Send + Sync + 'static>
    BecomeSellerUseCase for BecomeSellerUseCaseImpl<U, S>
{
    async fn become_seller(&self, user_id: UserId) -> Result<Seller, BecomeSellerError> {
        match self.user_repository.get_user(user_id).await {
            Ok(_) => {}
            Err(RepoRetrieveError::NotFound) => return Err(BecomeSellerError::UserNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve user {}: {}", user_id, e);
                return Err(BecomeSellerError::RepositoryError);
            }
        }
        match self.seller_repository.get_or_create_seller(user_id).await {
            Ok(seller) => Ok(seller),
            Err(RepoError::StorageError(e)) => {
                log::error!("Failed to create seller role for user {}: {}", user_id, e);
                Err(BecomeSellerError::RepositoryError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;

    #[tokio::test]
    async fn test_become_seller_is_idempotent() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("booster", "pw-pw-pw-pw", false).await;
        let use_case = BecomeSellerUseCaseImpl::new(store.clone(), store.clone());

        let first = use_case.become_seller(user.id).await.unwrap();
        let second = use_case.become_seller(user.id).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.user_id, user.id);
        assert_eq!(store.get_seller_by_user(user.id).await.unwrap().id, first.id);

        let result = use_case.become_seller(UserId(404)).await;
        assert!(matches!(result, Err(BecomeSellerError::UserNotFound)));
    }
}
