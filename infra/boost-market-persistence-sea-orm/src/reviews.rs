use boost_market_app::domain::{
    GameId, OrderId, RepoError, RepoRetrieveError, RepoUpdateError, ReviewId, SellerId,
    review::{Review, ReviewRepository},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::{
    entity::{order, review},
    repo_error, retrieve_error, update_error,
};

pub struct ReviewRepositoryImpl {
    db: DatabaseConnection,
}

impl ReviewRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_review(model: review::Model) -> Review {
        Review {
            id: ReviewId(model.id),
            order_id: OrderId(model.order_id),
            rating: model.rating,
            comment: model.comment,
        }
    }

    /// Ratings of the reviews on every order matching `column = id`.
    async fn ratings_for_orders(&self, column: order::Column, id: i64) -> Result<Vec<f64>, RepoError> {
        let order_ids: Vec<i64> = order::Entity::find()
            .select_only()
            .column(order::Column::Id)
            .filter(column.eq(id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(repo_error)?;
        let models = review::Entity::find()
            .filter(review::Column::OrderId.is_in(order_ids))
            .order_by_asc(review::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_error)?;
        Ok(models.into_iter().map(|m| m.rating).collect())
    }
}

#[async_trait::async_trait]
impl ReviewRepository for ReviewRepositoryImpl {
    async fn upsert_review(
        &self,
        order_id: OrderId,
        rating: f64,
        comment: &str,
    ) -> Result<Review, RepoError> {
        let existing = review::Entity::find()
            .filter(review::Column::OrderId.eq(order_id.0))
            .one(&self.db)
            .await
            .map_err(repo_error)?;
        let model = match existing {
            Some(model) => {
                let mut active_model: review::ActiveModel = model.into();
                active_model.rating = Set(rating);
                active_model.comment = Set(comment.to_string());
                active_model.update(&self.db).await.map_err(repo_error)?
            }
            None => review::ActiveModel {
                id: NotSet,
                order_id: Set(order_id.0),
                rating: Set(rating),
                comment: Set(comment.to_string()),
            }
            .insert(&self.db)
            .await
            .map_err(repo_error)?,
        };
        Ok(Self::model_to_review(model))
    }

    async fn get_review_by_order(&self, order_id: OrderId) -> Result<Review, RepoRetrieveError> {
        review::Entity::find()
            .filter(review::Column::OrderId.eq(order_id.0))
            .one(&self.db)
            .await
            .map_err(retrieve_error)?
            .map(Self::model_to_review)
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn list_reviews(&self) -> Result<Vec<Review>, RepoError> {
        let models = review::Entity::find()
            .order_by_asc(review::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_error)?;
        Ok(models.into_iter().map(Self::model_to_review).collect())
    }

    async fn delete_review_by_order(&self, order_id: OrderId) -> Result<(), RepoUpdateError> {
        let res = review::Entity::delete_many()
            .filter(review::Column::OrderId.eq(order_id.0))
            .exec(&self.db)
            .await
            .map_err(update_error)?;
        if res.rows_affected == 0 {
            return Err(RepoUpdateError::NotFound);
        }
        Ok(())
    }

    async fn ratings_for_seller(&self, seller_id: SellerId) -> Result<Vec<f64>, RepoError> {
        self.ratings_for_orders(order::Column::SellerId, seller_id.0)
            .await
    }

    async fn ratings_for_game(&self, game_id: GameId) -> Result<Vec<f64>, RepoError> {
        self.ratings_for_orders(order::Column::GameId, game_id.0)
            .await
    }
}

#[cfg(test)]
mod tests {
    use boost_market_app::domain::{
        BuyerId,
        order::{NewOrder, OrderRepository, OrderRequirements},
    };
    use chrono::Utc;

    use super::*;
    use crate::{orders::OrderRepositoryImpl, test_db};

    async fn seed_order(orders: &OrderRepositoryImpl, seller: i64, game: i64) -> OrderId {
        orders
            .create_order(NewOrder {
                buyer_id: BuyerId(1),
                seller_id: SellerId(seller),
                game_id: GameId(game),
                requirements: OrderRequirements {
                    gaming_account_id: "gamer".to_string(),
                    gaming_account_password: "secret".to_string(),
                    price: 20,
                    description: String::new(),
                    days_to_complete: 2,
                },
                start_time: Utc::now(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_upsert_replaces_review() {
        let db = test_db().await;
        let orders = OrderRepositoryImpl::new(db.clone());
        let repo = ReviewRepositoryImpl::new(db);
        let order_id = seed_order(&orders, 1, 10).await;

        let first = repo.upsert_review(order_id, 4.0, "Fast").await.unwrap();
        let second = repo.upsert_review(order_id, 2.0, "Slow").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(repo.get_review_by_order(order_id).await.unwrap(), second);
        assert_eq!(repo.list_reviews().await.unwrap(), vec![second]);

        repo.delete_review_by_order(order_id).await.unwrap();
        assert!(matches!(
            repo.delete_review_by_order(order_id).await,
            Err(RepoUpdateError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_ratings_by_seller_and_game() {
        let db = test_db().await;
        let orders = OrderRepositoryImpl::new(db.clone());
        let repo = ReviewRepositoryImpl::new(db);
        let a = seed_order(&orders, 1, 10).await;
        let b = seed_order(&orders, 1, 11).await;
        let c = seed_order(&orders, 2, 10).await;
        seed_order(&orders, 2, 11).await;

        repo.upsert_review(a, 5.0, "").await.unwrap();
        repo.upsert_review(b, 3.0, "").await.unwrap();
        repo.upsert_review(c, 1.0, "").await.unwrap();

        assert_eq!(repo.ratings_for_seller(SellerId(1)).await.unwrap(), vec![5.0, 3.0]);
        assert_eq!(repo.ratings_for_seller(SellerId(2)).await.unwrap(), vec![1.0]);
        assert_eq!(repo.ratings_for_game(GameId(10)).await.unwrap(), vec![5.0, 1.0]);
        assert!(repo.ratings_for_game(GameId(99)).await.unwrap().is_empty());
    }
}
