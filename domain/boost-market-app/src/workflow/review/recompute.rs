use std::sync::Arc;

use crate::domain::{
    RepoError,
    game::GameRepository,
    order::Order,
    rating::RatingService,
    review::ReviewRepository,
    seller::SellerRepository,
};

/// Keeps the seller and game aggregates in line with the stored reviews.
#[async_trait::async_trait]
pub trait RecomputeRatingsWorkflow {
    async fn after_review_saved(
        &self,
        order: &Order,
        saved_rating: f64,
    ) -> Result<(), RecomputeError>;
    async fn after_review_removed(&self, order: &Order) -> Result<(), RecomputeError>;
}

#[derive(Debug)]
pub enum RecomputeError {
    RepositoryError,
}

pub struct RecomputeRatingsWorkflowImpl<
    S: SellerRepository,
    G: GameRepository,
    V: ReviewRepository,
    RS: RatingService,
> {
    seller_repository: Arc<S>,
    game_repository: Arc<G>,
    review_repository: Arc<V>,
    rating_service: Arc<RS>,
}

impl<
    S: SellerRepository + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
    V: ReviewRepository + Send + Sync + 'static,
    RS: RatingService + Send + Sync + 'static,
> RecomputeRatingsWorkflowImpl<S, G, V, RS>
{
    pub fn new(
        seller_repository: Arc<S>,
        game_repository: Arc<G>,
        review_repository: Arc<V>,
        rating_service: Arc<RS>,
    ) -> Self {
        Self {
            seller_repository,
            game_repository,
            review_repository,
            rating_service,
        }
    }

    async fn store(
        &self,
        order: &Order,
        aggregate: impl Fn(&[f64]) -> f64 + Send + Sync,
    ) -> Result<(), RecomputeError> {
        let seller_ratings = self
            .review_repository
            .ratings_for_seller(order.seller_id)
            .await
            .map_err(storage_error)?;
        let seller_rating = aggregate(&seller_ratings);
        if let Err(e) = self
            .seller_repository
            .set_rating(order.seller_id, seller_rating)
            .await
        {
            log::error!("Failed to store rating of seller {}: {}", order.seller_id, e);
            return Err(RecomputeError::RepositoryError);
        }

        let game_ratings = self
            .review_repository
            .ratings_for_game(order.game_id)
            .await
            .map_err(storage_error)?;
        let game_rating = aggregate(&game_ratings);
        if let Err(e) = self
            .game_repository
            .set_rating(order.game_id, game_rating)
            .await
        {
            log::error!("Failed to store rating of game {}: {}", order.game_id, e);
            return Err(RecomputeError::RepositoryError);
        }

        log::debug!(
            "Seller {} rated {:.2}, game {} rated {:.2}",
            order.seller_id,
            seller_rating,
            order.game_id,
            game_rating
        );
        Ok(())
    }
}

fn storage_error(RepoError::StorageError(e): RepoError) -> RecomputeError {
    log::error!("Failed to collect review ratings: {}", e);
    RecomputeError::RepositoryError
}

#[async_trait::async_trait]
impl<
    S: SellerRepository + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
    V: ReviewRepository + Send + Sync + 'static,
    RS: RatingService + Send + Sync + 'static,
> RecomputeRatingsWorkflow for RecomputeRatingsWorkflowImpl<S, G, V, RS>
{
    async fn after_review_saved(
        &self,
        order: &Order,
        saved_rating: f64,
    ) -> Result<(), RecomputeError> {
        let service = self.rating_service.clone();
        self.store(order, move |ratings| {
            service.aggregate_after_save(ratings, saved_rating)
        })
        .await
    }

    async fn after_review_removed(&self, order: &Order) -> Result<(), RecomputeError> {
        let service = self.rating_service.clone();
        self.store(order, move |ratings| service.aggregate_after_removal(ratings))
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        domain::rating::{AverageRatingService, DEFAULT_RATING},
        testing::InMemoryStore,
    };

    #[tokio::test]
    async fn test_recompute_after_save_and_removal() {
        let store = Arc::new(InMemoryStore::new());
        let offer = store.seed_offer().await;
        let first = store.seed_order(&offer, Utc::now()).await;
        let second = store.seed_order(&offer, Utc::now()).await;
        let workflow = RecomputeRatingsWorkflowImpl::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(AverageRatingService::new()),
        );

        store.upsert_review(first.id, 4.0, "").await.unwrap();
        workflow.after_review_saved(&first, 4.0).await.unwrap();
        assert_eq!(store.get_seller(offer.seller.id).await.unwrap().rating, 4.0);
        assert_eq!(store.get_game(offer.game.id).await.unwrap().rating, 4.0);

        store.upsert_review(second.id, 1.0, "").await.unwrap();
        workflow.after_review_saved(&second, 1.0).await.unwrap();
        assert_eq!(store.get_seller(offer.seller.id).await.unwrap().rating, 2.5);
        assert_eq!(store.get_game(offer.game.id).await.unwrap().rating, 2.5);

        store.delete_review_by_order(first.id).await.unwrap();
        workflow.after_review_removed(&first).await.unwrap();
        assert_eq!(store.get_seller(offer.seller.id).await.unwrap().rating, 1.0);

        store.delete_review_by_order(second.id).await.unwrap();
        workflow.after_review_removed(&second).await.unwrap();
        assert_eq!(
            store.get_seller(offer.seller.id).await.unwrap().rating,
            DEFAULT_RATING
        );
        assert_eq!(store.get_game(offer.game.id).await.unwrap().rating, DEFAULT_RATING);
    }

    #[tokio::test]
    async fn test_saved_rating_is_used_when_no_aggregate_exists() {
        let store = Arc::new(InMemoryStore::new());
        let offer = store.seed_offer().await;
        let order = store.seed_order(&offer, Utc::now()).await;
        let workflow = RecomputeRatingsWorkflowImpl::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(AverageRatingService::new()),
        );

        workflow.after_review_saved(&order, 3.5).await.unwrap();
        assert_eq!(store.get_seller(offer.seller.id).await.unwrap().rating, 3.5);
        assert_eq!(store.get_game(offer.game.id).await.unwrap().rating, 3.5);
    }
}
