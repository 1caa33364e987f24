use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::domain::{
    GameId, RepoCreateError, RepoError, RepoRetrieveError, SellerId, UserId,
    buyer::BuyerRepository,
    game::GameRepository,
    offering::OfferingRepository,
    order::{NewOrder, Order, OrderRepository, OrderRequirements},
    seller::SellerRepository,
};

#[derive(Clone, Debug)]
pub struct PlaceOrder {
    pub seller_id: SellerId,
    pub game_id: GameId,
    pub requirements: OrderRequirements,
}

#[async_trait::async_trait]
pub trait PlaceOrderUseCase {
    async fn place_order(
        &self,
        user_id: UserId,
        order: PlaceOrder,
    ) -> Result<Order, PlaceOrderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PlaceOrderError {
    #[error("Seller not found")]
    SellerNotFound,
    #[error("Game not found")]
    GameNotFound,
    #[error("The seller does not offer this game")]
    NotOffered,
    #[error("You cannot order from yourself")]
    SelfOrder,
    #[error("{0}")]
    InvalidInput(String),
    #[error("Could not place the order")]
    RepositoryError,
}

pub struct PlaceOrderUseCaseImpl<
    B: BuyerRepository,
    S: SellerRepository,
    G: GameRepository,
    O: OfferingRepository,
    R: OrderRepository,
> {
    buyer_repository: Arc<B>,
    seller_repository: Arc<S>,
    game_repository: Arc<G>,
    offering_repository: Arc<O>,
    order_repository: Arc<R>,
}

impl<
    B: BuyerRepository,
    S: SellerRepository,
    G: GameRepository,
    O: OfferingRepository,
    R: OrderRepository,
> PlaceOrderUseCaseImpl<B, S, G, O, R>
{
    pub fn new(
        buyer_repository: Arc<B>,
        seller_repository: Arc<S>,
        game_repository: Arc<G>,
        offering_repository: Arc<O>,
        order_repository: Arc<R>,
    ) -> Self {
        Self {
            buyer_repository,
            seller_repository,
            game_repository,
            offering_repository,
            order_repository,
        }
    }
}

fn storage_error(context: &str, e: impl std::fmt::Display) -> PlaceOrderError {
    log::error!("{}: {}", context, e);
    PlaceOrderError::RepositoryError
}

#[async_trait::async_trait]
impl<
    B: BuyerRepository + Send + Sync + 'static,
    S: SellerRepository + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
    O: OfferingRepository + Send + Sync + 'static,
    R: OrderRepository + Send + Sync + 'static,
> PlaceOrderUseCase for PlaceOrderUseCaseImpl<B, S, G, O, R>
{
    async fn place_order(
        &self,
        user_id: UserId,
        order: PlaceOrder,
    ) -> Result<Order, PlaceOrderError> {
        order
            .requirements
            .validate()
            .map_err(|e| PlaceOrderError::InvalidInput(e.to_string()))?;

        let seller = match self.seller_repository.get_seller(order.seller_id).await {
            Ok(seller) => seller,
            Err(RepoRetrieveError::NotFound) => return Err(PlaceOrderError::SellerNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                return Err(storage_error("Failed to retrieve seller", e));
            }
        };
        if seller.user_id == user_id {
            return Err(PlaceOrderError::SelfOrder);
        }
        match self.game_repository.get_game(order.game_id).await {
            Ok(_) => {}
            Err(RepoRetrieveError::NotFound) => return Err(PlaceOrderError::GameNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                return Err(storage_error("Failed to retrieve game", e));
            }
        }
        match self
            .offering_repository
            .get_offering(seller.id, order.game_id)
            .await
        {
            Ok(_) => {}
            Err(RepoRetrieveError::NotFound) => return Err(PlaceOrderError::NotOffered),
            Err(RepoRetrieveError::StorageError(e)) => {
                return Err(storage_error("Failed to retrieve offering", e));
            }
        }

        let buyer = self
            .buyer_repository
            .get_or_create_buyer(user_id)
            .await
            .map_err(|RepoError::StorageError(e)| storage_error("Failed to get buyer role", e))?;

        let new_order = NewOrder {
            buyer_id: buyer.id,
            seller_id: seller.id,
            game_id: order.game_id,
            requirements: order.requirements,
            start_time: Utc::now(),
        };
        match self.order_repository.create_order(new_order).await {
            Ok(order) => {
                log::info!(
                    "Buyer {} placed order {} with seller {}",
                    order.buyer_id,
                    order.id,
                    order.seller_id
                );
                Ok(order)
            }
            Err(RepoCreateError::Conflict) => Err(PlaceOrderError::InvalidInput(
                "Order conflicts with an existing order".to_string(),
            )),
            Err(RepoCreateError::StorageError(e)) => {
                Err(storage_error("Failed to create order", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::order::OrderStatus,
        testing::{InMemoryStore, sample_requirements},
    };

    type UseCase = PlaceOrderUseCaseImpl<
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
    >;

    fn use_case(store: &Arc<InMemoryStore>) -> UseCase {
        PlaceOrderUseCaseImpl::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        )
    }

    #[tokio::test]
    async fn test_place_order() {
        let store = Arc::new(InMemoryStore::new());
        let offer = store.seed_offer().await;
        let request = PlaceOrder {
            seller_id: offer.seller.id,
            game_id: offer.game.id,
            requirements: sample_requirements(),
        };

        let order = use_case(&store)
            .place_order(offer.buyer_user.id, request)
            .await
            .unwrap();
        let buyer = store.get_buyer_by_user(offer.buyer_user.id).await.unwrap();
        assert_eq!(order.buyer_id, buyer.id);
        assert_eq!(order.status, OrderStatus::Active);
        assert_eq!(store.get_order(order.id).await.unwrap(), order);
    }

    #[tokio::test]
    async fn test_place_order_rejections() {
        let store = Arc::new(InMemoryStore::new());
        let offer = store.seed_offer().await;
        let use_case = use_case(&store);
        let request = PlaceOrder {
            seller_id: offer.seller.id,
            game_id: offer.game.id,
            requirements: sample_requirements(),
        };

        let result = use_case.place_order(offer.seller_user.id, request.clone()).await;
        assert!(matches!(result, Err(PlaceOrderError::SelfOrder)));

        let unknown_seller = PlaceOrder {
            seller_id: SellerId(999),
            ..request.clone()
        };
        let result = use_case.place_order(offer.buyer_user.id, unknown_seller).await;
        assert!(matches!(result, Err(PlaceOrderError::SellerNotFound)));

        let unknown_game = PlaceOrder {
            game_id: GameId(999),
            ..request.clone()
        };
        let result = use_case.place_order(offer.buyer_user.id, unknown_game).await;
        assert!(matches!(result, Err(PlaceOrderError::GameNotFound)));

        let other_game = store
            .create_game(crate::domain::game::NewGame {
                name: "Dota 2".to_string(),
                description: String::new(),
                image: None,
                category_ids: vec![],
            })
            .await
            .unwrap();
        let not_offered = PlaceOrder {
            game_id: other_game.id,
            ..request.clone()
        };
        let result = use_case.place_order(offer.buyer_user.id, not_offered).await;
        assert!(matches!(result, Err(PlaceOrderError::NotOffered)));

        let mut invalid = request.clone();
        invalid.requirements.days_to_complete = 0;
        let result = use_case.place_order(offer.buyer_user.id, invalid).await;
        assert!(matches!(result, Err(PlaceOrderError::InvalidInput(_))));

        let mut endless = request;
        endless.requirements.days_to_complete = 4_000_000_000;
        let result = use_case.place_order(offer.buyer_user.id, endless).await;
        assert!(matches!(result, Err(PlaceOrderError::InvalidInput(_))));

        assert!(store.get_buyer_by_user(offer.buyer_user.id).await.is_err());
    }
}
