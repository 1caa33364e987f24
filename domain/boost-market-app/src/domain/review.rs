use rustrict::{Censor, Type};

use crate::domain::{
    GameId, OrderId, RepoError, RepoRetrieveError, RepoUpdateError, ReviewId, SellerId,
};

pub const MAX_COMMENT_LENGTH: usize = 500;

#[derive(Clone, Debug, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub order_id: OrderId,
    pub rating: f64,
    pub comment: String,
}

#[async_trait::async_trait]
pub trait ReviewRepository {
    /// Creates the order's review or replaces the existing one.
    async fn upsert_review(
        &self,
        order_id: OrderId,
        rating: f64,
        comment: &str,
    ) -> Result<Review, RepoError>;
    async fn get_review_by_order(&self, order_id: OrderId) -> Result<Review, RepoRetrieveError>;
    async fn list_reviews(&self) -> Result<Vec<Review>, RepoError>;
    async fn delete_review_by_order(&self, order_id: OrderId) -> Result<(), RepoUpdateError>;
    /// Ratings of every review on an order of this seller.
    async fn ratings_for_seller(&self, seller_id: SellerId) -> Result<Vec<f64>, RepoError>;
    /// Ratings of every review on an order for this game.
    async fn ratings_for_game(&self, game_id: GameId) -> Result<Vec<f64>, RepoError>;
}

pub trait ContentPolicy {
    fn filter_comment(&self, comment: &str) -> String;
}

pub struct RustrictContentPolicy;

impl RustrictContentPolicy {
    pub fn new() -> Self {
        Self {}
    }
}

impl ContentPolicy for RustrictContentPolicy {
    fn filter_comment(&self, comment: &str) -> String {
        let (censored, censor_type) = Censor::from_str(comment)
            .with_censor_threshold(Type::INAPPROPRIATE)
            .censor_and_analyze();
        if censor_type.is(Type::INAPPROPRIATE) {
            censored
        } else {
            comment.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_comment_is_unchanged() {
        let policy = RustrictContentPolicy::new();
        let comment = "Fast delivery, reached Diamond in two days.";
        assert_eq!(policy.filter_comment(comment), comment);
    }

    #[test]
    fn test_profane_comment_is_censored() {
        let policy = RustrictContentPolicy::new();
        let filtered = policy.filter_comment("this booster is a piece of shit");
        assert!(!filtered.contains("shit"));
    }
}
