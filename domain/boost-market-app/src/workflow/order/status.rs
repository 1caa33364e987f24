use std::sync::Arc;

use crate::domain::{
    OrderId, RepoRetrieveError, RepoUpdateError, UserId,
    buyer::BuyerRepository,
    order::{Order, OrderRepository, OrderStatus},
    seller::SellerRepository,
};

#[async_trait::async_trait]
pub trait UpdateStatusUseCase {
    async fn update_status(
        &self,
        user_id: UserId,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, UpdateStatusError>;
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateStatusError {
    #[error("Order not found")]
    NotFound,
    #[error("You are not a party to this order")]
    Forbidden,
    #[error("An order cannot go from {} to {}", from.label(), to.label())]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Could not update the order status")]
    RepositoryError,
}

pub struct UpdateStatusUseCaseImpl<B: BuyerRepository, S: SellerRepository, R: OrderRepository> {
    buyer_repository: Arc<B>,
    seller_repository: Arc<S>,
    order_repository: Arc<R>,
}

impl<B: BuyerRepository, S: SellerRepository, R: OrderRepository> UpdateStatusUseCaseImpl<B, S, R> {
    pub fn new(
        buyer_repository: Arc<B>,
        seller_repository: Arc<S>,
        order_repository: Arc<R>,
    ) -> Self {
        Self {
            buyer_repository,
            seller_repository,
            order_repository,
        }
    }

    async fn load(&self, order_id: OrderId) -> Result<Order, UpdateStatusError> {
        match self.order_repository.get_order(order_id).await {
            Ok(order) => Ok(order),
            Err(RepoRetrieveError::NotFound) => Err(UpdateStatusError::NotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve order {}: {}", order_id, e);
                Err(UpdateStatusError::RepositoryError)
            }
        }
    }
}

/// Status writes race with other parties and the late-order sweep.
const MAX_ATTEMPTS: usize = 3;

fn role<T>(result: Result<T, RepoRetrieveError>) -> Result<Option<T>, UpdateStatusError> {
    match result {
        Ok(role) => Ok(Some(role)),
        Err(RepoRetrieveError::NotFound) => Ok(None),
        Err(RepoRetrieveError::StorageError(e)) => {
            log::error!("Failed to retrieve role: {}", e);
            Err(UpdateStatusError::RepositoryError)
        }
    }
}

#[async_trait::async_trait]
impl<
    B: BuyerRepository + Send + Sync + 'static,
    S: SellerRepository + Send + Sync + 'static,
    R: OrderRepository + Send + Sync + 'static,
> UpdateStatusUseCase for UpdateStatusUseCaseImpl<B, S, R>
{
    async fn update_status(
        &self,
        user_id: UserId,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, UpdateStatusError> {
        let buyer = role(self.buyer_repository.get_buyer_by_user(user_id).await)?;
        let seller = role(self.seller_repository.get_seller_by_user(user_id).await)?;

        for _ in 0..MAX_ATTEMPTS {
            let mut order = self.load(order_id).await?;
            let buyer_id = buyer.as_ref().map(|b| b.id);
            let seller_id = seller.as_ref().map(|s| s.id);
            let Some(party) = order.party(buyer_id, seller_id) else {
                return Err(UpdateStatusError::Forbidden);
            };
            if !order.status.can_transition(status, party) {
                return Err(UpdateStatusError::InvalidTransition {
                    from: order.status,
                    to: status,
                });
            }

            match self
                .order_repository
                .update_status(order_id, order.status, status)
                .await
            {
                Ok(true) => {
                    log::info!("Order {} is now {}", order_id, status.label());
                    order.status = status;
                    return Ok(order);
                }
                Ok(false) => log::debug!("Order {} changed status concurrently, retrying", order_id),
                Err(RepoUpdateError::NotFound) => return Err(UpdateStatusError::NotFound),
                Err(e) => {
                    log::error!("Failed to update status of order {}: {}", order_id, e);
                    return Err(UpdateStatusError::RepositoryError);
                }
            }
        }
        log::error!(
            "Gave up updating status of order {} after {} attempts",
            order_id,
            MAX_ATTEMPTS
        );
        Err(UpdateStatusError::RepositoryError)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::testing::{InMemoryStore, InterleavedOrders};

    #[tokio::test]
    async fn test_lifecycle_through_completion() {
        let store = Arc::new(InMemoryStore::new());
        let offer = store.seed_offer().await;
        let order = store.seed_order(&offer, Utc::now()).await;
        let use_case = UpdateStatusUseCaseImpl::new(store.clone(), store.clone(), store.clone());

        let result = use_case
            .update_status(offer.buyer_user.id, order.id, OrderStatus::Completed)
            .await;
        assert!(matches!(
            result,
            Err(UpdateStatusError::InvalidTransition {
                from: OrderStatus::Active,
                to: OrderStatus::Completed
            })
        ));

        let delivered = use_case
            .update_status(offer.seller_user.id, order.id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);

        let completed = use_case
            .update_status(offer.buyer_user.id, order.id, OrderStatus::Completed)
            .await
            .unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);
        assert_eq!(
            store.get_order(order.id).await.unwrap().status,
            OrderStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_outsiders_are_forbidden() {
        let store = Arc::new(InMemoryStore::new());
        let offer = store.seed_offer().await;
        let order = store.seed_order(&offer, Utc::now()).await;
        let outsider = store.seed_user("lurker", "pw-pw-pw-pw", false).await;
        let use_case = UpdateStatusUseCaseImpl::new(store.clone(), store.clone(), store.clone());

        let result = use_case
            .update_status(outsider.id, order.id, OrderStatus::Canceled)
            .await;
        assert!(matches!(result, Err(UpdateStatusError::Forbidden)));

        let result = use_case
            .update_status(offer.buyer_user.id, OrderId(999), OrderStatus::Canceled)
            .await;
        assert!(matches!(result, Err(UpdateStatusError::NotFound)));

        let canceled = use_case
            .update_status(offer.buyer_user.id, order.id, OrderStatus::Canceled)
            .await
            .unwrap();
        assert_eq!(canceled.status, OrderStatus::Canceled);
    }

    #[tokio::test]
    async fn test_rechecks_status_written_concurrently() {
        let store = Arc::new(InMemoryStore::new());
        let offer = store.seed_offer().await;
        let order = store.seed_order(&offer, Utc::now()).await;
        let orders = Arc::new(InterleavedOrders::new(store.clone()));
        let use_case = UpdateStatusUseCaseImpl::new(store.clone(), store.clone(), orders.clone());

        // the sweep marks the order late while the buyer cancels
        orders.before_next_write(order.id, OrderStatus::Late);
        let result = use_case
            .update_status(offer.buyer_user.id, order.id, OrderStatus::Canceled)
            .await;
        assert!(matches!(
            result,
            Err(UpdateStatusError::InvalidTransition {
                from: OrderStatus::Late,
                to: OrderStatus::Canceled
            })
        ));
        assert_eq!(store.get_order(order.id).await.unwrap().status, OrderStatus::Late);

        // delivery is still allowed from Late
        let other = store.seed_order(&offer, Utc::now()).await;
        orders.before_next_write(other.id, OrderStatus::Late);
        let delivered = use_case
            .update_status(offer.seller_user.id, other.id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert_eq!(
            store.get_order(other.id).await.unwrap().status,
            OrderStatus::Delivered
        );
    }
}
