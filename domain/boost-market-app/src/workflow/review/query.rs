use std::sync::Arc;

use crate::domain::{
    OrderId, RepoError, RepoRetrieveError,
    review::{Review, ReviewRepository},
};

#[async_trait::async_trait]
pub trait ReviewQueryUseCase {
    async fn list_reviews(&self) -> Result<Vec<Review>, ReviewQueryError>;
    async fn get_review(&self, order_id: OrderId) -> Result<Review, ReviewQueryError>;
}

#[derive(Debug)]
pub enum ReviewQueryError {
    NotFound,
    RepositoryError,
}

pub struct ReviewQueryUseCaseImpl<V: ReviewRepository> {
    review_repository: Arc<V>,
}

impl<V: ReviewRepository> ReviewQueryUseCaseImpl<V> {
    pub fn new(review_repository: Arc<V>) -> Self {
        Self { review_repository }
    }
}

#[async_trait::async_trait]
impl<V: ReviewRepository + Send + Sync + 'static> ReviewQueryUseCase for ReviewQueryUseCaseImpl<V> {
    async fn list_reviews(&self) -> Result<Vec<Review>, ReviewQueryError> {
        match self.review_repository.list_reviews().await {
            Ok(reviews) => Ok(reviews),
            Err(RepoError::StorageError(e)) => {
                log::error!("Failed to list reviews: {}", e);
                Err(ReviewQueryError::RepositoryError)
            }
        }
    }

    async fn get_review(&self, order_id: OrderId) -> Result<Review, ReviewQueryError> {
        match self.review_repository.get_review_by_order(order_id).await {
            Ok(review) => Ok(review),
            Err(RepoRetrieveError::NotFound) => Err(ReviewQueryError::NotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve review of order {}: {}", order_id, e);
                Err(ReviewQueryError::RepositoryError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::testing::InMemoryStore;

    #[tokio::test]
    async fn test_list_and_get() {
        let store = Arc::new(InMemoryStore::new());
        let offer = store.seed_offer().await;
        let order = store.seed_order(&offer, Utc::now()).await;
        let use_case = ReviewQueryUseCaseImpl::new(store.clone());

        assert!(use_case.list_reviews().await.unwrap().is_empty());
        assert!(matches!(
            use_case.get_review(order.id).await,
            Err(ReviewQueryError::NotFound)
        ));

        let review = store.upsert_review(order.id, 4.5, "Quick").await.unwrap();
        assert_eq!(use_case.list_reviews().await.unwrap(), vec![review.clone()]);
        assert_eq!(use_case.get_review(order.id).await.unwrap(), review);
    }
}
