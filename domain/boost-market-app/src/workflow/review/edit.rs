use std::sync::Arc;

use crate::{
    domain::{
        OrderId, RepoError, RepoRetrieveError, RepoUpdateError, UserId,
        buyer::BuyerRepository,
        order::{Order, OrderRepository, OrderStatus},
        rating::{MAX_RATING, MIN_RATING, is_valid_rating},
        review::{ContentPolicy, MAX_COMMENT_LENGTH, Review, ReviewRepository},
    },
    workflow::review::recompute::RecomputeRatingsWorkflow,
};

pub const NOT_COMPLETED_MESSAGE: &str = "Current Buyer has not completed this order";

/// A failed recompute never undoes the stored review.
const RECOMPUTE_ATTEMPTS: usize = 2;

/// Review changes by the buyer of a completed order. Every save or removal
/// recomputes the seller and game ratings.
#[async_trait::async_trait]
pub trait EditReviewUseCase {
    /// Creates the order's review or replaces it.
    async fn put_review(
        &self,
        user_id: UserId,
        order_id: OrderId,
        rating: f64,
        comment: Option<String>,
    ) -> Result<Review, EditReviewError>;
    async fn patch_review(
        &self,
        user_id: UserId,
        order_id: OrderId,
        rating: Option<f64>,
        comment: Option<String>,
    ) -> Result<Review, EditReviewError>;
    async fn delete_review(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<(), EditReviewError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EditReviewError {
    #[error("Not found")]
    NotFound,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Could not store the review")]
    RepositoryError,
}

impl From<RepoError> for EditReviewError {
    fn from(RepoError::StorageError(e): RepoError) -> Self {
        log::error!("Review storage failed: {}", e);
        EditReviewError::RepositoryError
    }
}

pub struct EditReviewUseCaseImpl<
    B: BuyerRepository,
    R: OrderRepository,
    V: ReviewRepository,
    CP: ContentPolicy,
    W: RecomputeRatingsWorkflow,
> {
    buyer_repository: Arc<B>,
    order_repository: Arc<R>,
    review_repository: Arc<V>,
    content_policy: Arc<CP>,
    recompute_workflow: Arc<W>,
}

impl<
    B: BuyerRepository + Send + Sync + 'static,
    R: OrderRepository + Send + Sync + 'static,
    V: ReviewRepository + Send + Sync + 'static,
    CP: ContentPolicy + Send + Sync + 'static,
    W: RecomputeRatingsWorkflow + Send + Sync + 'static,
> EditReviewUseCaseImpl<B, R, V, CP, W>
{
    pub fn new(
        buyer_repository: Arc<B>,
        order_repository: Arc<R>,
        review_repository: Arc<V>,
        content_policy: Arc<CP>,
        recompute_workflow: Arc<W>,
    ) -> Self {
        Self {
            buyer_repository,
            order_repository,
            review_repository,
            content_policy,
            recompute_workflow,
        }
    }

    /// The order, if the user bought it and it is completed.
    async fn reviewable_order(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Order, EditReviewError> {
        let order = match self.order_repository.get_order(order_id).await {
            Ok(order) => order,
            Err(RepoRetrieveError::NotFound) => return Err(EditReviewError::NotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve order {}: {}", order_id, e);
                return Err(EditReviewError::RepositoryError);
            }
        };
        let is_buyer = match self.buyer_repository.get_buyer_by_user(user_id).await {
            Ok(buyer) => buyer.id == order.buyer_id,
            Err(RepoRetrieveError::NotFound) => false,
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve buyer role of user {}: {}", user_id, e);
                return Err(EditReviewError::RepositoryError);
            }
        };
        if !is_buyer || order.status != OrderStatus::Completed {
            return Err(EditReviewError::Forbidden(NOT_COMPLETED_MESSAGE.to_string()));
        }
        Ok(order)
    }

    async fn existing_review(&self, order_id: OrderId) -> Result<Review, EditReviewError> {
        match self.review_repository.get_review_by_order(order_id).await {
            Ok(review) => Ok(review),
            Err(RepoRetrieveError::NotFound) => Err(EditReviewError::NotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve review of order {}: {}", order_id, e);
                Err(EditReviewError::RepositoryError)
            }
        }
    }

    async fn save(
        &self,
        order: &Order,
        rating: f64,
        comment: &str,
    ) -> Result<Review, EditReviewError> {
        if !is_valid_rating(rating) {
            return Err(EditReviewError::InvalidInput(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }
        if comment.chars().count() > MAX_COMMENT_LENGTH {
            return Err(EditReviewError::InvalidInput(format!(
                "Comment cannot exceed {} characters",
                MAX_COMMENT_LENGTH
            )));
        }
        let comment = self.content_policy.filter_comment(comment);

        let review = self
            .review_repository
            .upsert_review(order.id, rating, &comment)
            .await?;
        for _ in 0..RECOMPUTE_ATTEMPTS {
            if self
                .recompute_workflow
                .after_review_saved(order, review.rating)
                .await
                .is_ok()
            {
                return Ok(review);
            }
        }
        log::error!(
            "Review {} of order {} is stored but ratings of seller {} and game {} are stale",
            review.id,
            order.id,
            order.seller_id,
            order.game_id
        );
        Ok(review)
    }
}

#[async_trait::async_trait]
impl<
    B: BuyerRepository + Send + Sync + 'static,
    R: OrderRepository + Send + Sync + 'static,
    V: ReviewRepository + Send + Sync + 'static,
    CP: ContentPolicy + Send + Sync + 'static,
    W: RecomputeRatingsWorkflow + Send + Sync + 'static,
> EditReviewUseCase for EditReviewUseCaseImpl<B, R, V, CP, W>
{
    async fn put_review(
        &self,
        user_id: UserId,
        order_id: OrderId,
        rating: f64,
        comment: Option<String>,
    ) -> Result<Review, EditReviewError> {
        let order = self.reviewable_order(user_id, order_id).await?;
        let review = self
            .save(&order, rating, comment.as_deref().unwrap_or_default())
            .await?;
        log::info!("Order {} reviewed with {}", order_id, review.rating);
        Ok(review)
    }

    async fn patch_review(
        &self,
        user_id: UserId,
        order_id: OrderId,
        rating: Option<f64>,
        comment: Option<String>,
    ) -> Result<Review, EditReviewError> {
        let order = self.reviewable_order(user_id, order_id).await?;
        let existing = self.existing_review(order_id).await?;
        let rating = rating.unwrap_or(existing.rating);
        let comment = comment.unwrap_or(existing.comment);
        self.save(&order, rating, &comment).await
    }

    async fn delete_review(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<(), EditReviewError> {
        let order = self.reviewable_order(user_id, order_id).await?;
        self.existing_review(order_id).await?;
        match self.review_repository.delete_review_by_order(order_id).await {
            Ok(()) => {}
            Err(RepoUpdateError::NotFound) => return Err(EditReviewError::NotFound),
            Err(e) => {
                log::error!("Failed to delete review of order {}: {}", order_id, e);
                return Err(EditReviewError::RepositoryError);
            }
        }
        for _ in 0..RECOMPUTE_ATTEMPTS {
            if self.recompute_workflow.after_review_removed(&order).await.is_ok() {
                return Ok(());
            }
        }
        log::error!(
            "Review of order {} is deleted but ratings of seller {} and game {} are stale",
            order_id,
            order.seller_id,
            order.game_id
        );
        Ok(())
    }
}
