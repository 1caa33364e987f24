use std::sync::Arc;

use crate::{
    domain::{
        RepoError, RepoRetrieveError, UserId, buyer::BuyerRepository, game::GameRepository,
        order::OrderRepository,
    },
    workflow::order::OrderView,
};

#[async_trait::async_trait]
pub trait MyOrdersUseCase {
    /// Orders the user placed as a buyer, newest first.
    async fn my_orders(&self, user_id: UserId) -> Result<Vec<OrderView>, MyOrdersError>;
}

#[derive(Debug)]
pub enum MyOrdersError {
    RepositoryError,
}

pub struct MyOrdersUseCaseImpl<B: BuyerRepository, R: OrderRepository, G: GameRepository> {
    buyer_repository: Arc<B>,
    order_repository: Arc<R>,
    game_repository: Arc<G>,
}

impl<B: BuyerRepository, R: OrderRepository, G: GameRepository> MyOrdersUseCaseImpl<B, R, G> {
    pub fn new(
        buyer_repository: Arc<B>,
        order_repository: Arc<R>,
        game_repository: Arc<G>,
    ) -> Self {
        Self {
            buyer_repository,
            order_repository,
            game_repository,
        }
    }
}

#[async_trait::async_trait]
impl<
    B: BuyerRepository + Send + Sync + 'static,
    R: OrderRepository + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
> MyOrdersUseCase for MyOrdersUseCaseImpl<B, R, G>
{
    async fn my_orders(&self, user_id: UserId) -> Result<Vec<OrderView>, MyOrdersError> {
        let buyer = match self.buyer_repository.get_buyer_by_user(user_id).await {
            Ok(buyer) => buyer,
            Err(RepoRetrieveError::NotFound) => return Ok(Vec::new()),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve buyer role of user {}: {}", user_id, e);
                return Err(MyOrdersError::RepositoryError);
            }
        };

        let mut orders = match self.order_repository.list_by_buyer(buyer.id).await {
            Ok(orders) => orders,
            Err(RepoError::StorageError(e)) => {
                log::error!("Failed to list orders of buyer {}: {}", buyer.id, e);
                return Err(MyOrdersError::RepositoryError);
            }
        };
        orders.sort_by(|a, b| b.start_time.cmp(&a.start_time));

        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            let game_name = match self.game_repository.get_game(order.game_id).await {
                Ok(game) => game.name,
                Err(e) => {
                    log::warn!("Game of order {} unavailable: {}", order.id, e);
                    String::new()
                }
            };
            views.push(OrderView { order, game_name });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};

    use super::*;
    use crate::testing::InMemoryStore;

    #[tokio::test]
    async fn test_my_orders_newest_first() {
        let store = Arc::new(InMemoryStore::new());
        let offer = store.seed_offer().await;
        let use_case = MyOrdersUseCaseImpl::new(store.clone(), store.clone(), store.clone());

        assert!(use_case.my_orders(offer.buyer_user.id).await.unwrap().is_empty());

        let now = Utc::now();
        let older = store.seed_order(&offer, now - TimeDelta::days(2)).await;
        let newer = store.seed_order(&offer, now - TimeDelta::hours(1)).await;

        let orders = use_case.my_orders(offer.buyer_user.id).await.unwrap();
        let ids: Vec<_> = orders.iter().map(|o| o.order.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert_eq!(orders[0].game_name, "Valorant");

        assert!(use_case.my_orders(offer.seller_user.id).await.unwrap().is_empty());
    }
}
