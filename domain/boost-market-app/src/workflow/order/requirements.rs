use std::sync::Arc;

use chrono::Utc;

use crate::{
    domain::{
        OrderId, RepoRetrieveError, RepoUpdateError, UserId,
        buyer::BuyerRepository,
        offering::OfferingRepository,
        order::{Order, OrderRepository, RequirementsUpdate},
        review::ReviewRepository,
        seller::SellerRepository,
    },
    workflow::review::recompute::RecomputeRatingsWorkflow,
};

pub const TOO_LATE_MESSAGE: &str = "Its too late, can not change requirements";

/// Changes a buyer may make to an order shortly after placing it.
#[async_trait::async_trait]
pub trait ChangeRequirementsUseCase {
    async fn update_requirements(
        &self,
        user_id: UserId,
        order_id: OrderId,
        update: RequirementsUpdate,
    ) -> Result<Order, ChangeRequirementsError>;
    async fn delete_order(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<(), ChangeRequirementsError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ChangeRequirementsError {
    #[error("Order not found")]
    NotFound,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Could not change the order")]
    RepositoryError,
}

pub struct ChangeRequirementsUseCaseImpl<
    B: BuyerRepository,
    S: SellerRepository,
    O: OfferingRepository,
    R: OrderRepository,
    V: ReviewRepository,
    W: RecomputeRatingsWorkflow,
> {
    buyer_repository: Arc<B>,
    seller_repository: Arc<S>,
    offering_repository: Arc<O>,
    order_repository: Arc<R>,
    review_repository: Arc<V>,
    recompute_workflow: Arc<W>,
}

impl<
    B: BuyerRepository + Send + Sync + 'static,
    S: SellerRepository + Send + Sync + 'static,
    O: OfferingRepository + Send + Sync + 'static,
    R: OrderRepository + Send + Sync + 'static,
    V: ReviewRepository + Send + Sync + 'static,
    W: RecomputeRatingsWorkflow + Send + Sync + 'static,
> ChangeRequirementsUseCaseImpl<B, S, O, R, V, W>
{
    pub fn new(
        buyer_repository: Arc<B>,
        seller_repository: Arc<S>,
        offering_repository: Arc<O>,
        order_repository: Arc<R>,
        review_repository: Arc<V>,
        recompute_workflow: Arc<W>,
    ) -> Self {
        Self {
            buyer_repository,
            seller_repository,
            offering_repository,
            order_repository,
            review_repository,
            recompute_workflow,
        }
    }

    async fn is_reviewed(&self, order_id: OrderId) -> Result<bool, ChangeRequirementsError> {
        match self.review_repository.get_review_by_order(order_id).await {
            Ok(_) => Ok(true),
            Err(RepoRetrieveError::NotFound) => Ok(false),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve review of order {}: {}", order_id, e);
                Err(ChangeRequirementsError::RepositoryError)
            }
        }
    }

    /// Recomputes the seller and game of `order` from the reviews now stored.
    /// The order change itself has already been written.
    async fn refresh_ratings(&self, order: &Order) {
        if self
            .recompute_workflow
            .after_review_removed(order)
            .await
            .is_err()
        {
            log::error!(
                "Order {} changed but ratings of seller {} and game {} are stale",
                order.id,
                order.seller_id,
                order.game_id
            );
        }
    }

    /// Loads the order if the user is its buyer and the seller's change
    /// window is still open.
    async fn editable_order(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Order, ChangeRequirementsError> {
        let order = match self.order_repository.get_order(order_id).await {
            Ok(order) => order,
            Err(RepoRetrieveError::NotFound) => return Err(ChangeRequirementsError::NotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve order {}: {}", order_id, e);
                return Err(ChangeRequirementsError::RepositoryError);
            }
        };

        let not_owner = || {
            ChangeRequirementsError::Forbidden("Only the buyer can change this order".to_string())
        };
        match self.buyer_repository.get_buyer_by_user(user_id).await {
            Ok(buyer) if buyer.id == order.buyer_id => {}
            Ok(_) | Err(RepoRetrieveError::NotFound) => return Err(not_owner()),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve buyer role of user {}: {}", user_id, e);
                return Err(ChangeRequirementsError::RepositoryError);
            }
        }

        let seller = match self.seller_repository.get_seller(order.seller_id).await {
            Ok(seller) => seller,
            Err(e) => {
                log::error!("Failed to retrieve seller of order {}: {}", order_id, e);
                return Err(ChangeRequirementsError::RepositoryError);
            }
        };
        if !order.can_change_requirements(seller.requirements_change_window_hours, Utc::now()) {
            return Err(ChangeRequirementsError::Forbidden(TOO_LATE_MESSAGE.to_string()));
        }
        Ok(order)
    }
}

#[async_trait::async_trait]
impl<
    B: BuyerRepository + Send + Sync + 'static,
    S: SellerRepository + Send + Sync + 'static,
    O: OfferingRepository + Send + Sync + 'static,
    R: OrderRepository + Send + Sync + 'static,
    V: ReviewRepository + Send + Sync + 'static,
    W: RecomputeRatingsWorkflow + Send + Sync + 'static,
> ChangeRequirementsUseCase for ChangeRequirementsUseCaseImpl<B, S, O, R, V, W>
{
    async fn update_requirements(
        &self,
        user_id: UserId,
        order_id: OrderId,
        update: RequirementsUpdate,
    ) -> Result<Order, ChangeRequirementsError> {
        let mut order = self.editable_order(user_id, order_id).await?;
        let previous = order.clone();

        if let Some(game_id) = update.game_id {
            match self
                .offering_repository
                .get_offering(order.seller_id, game_id)
                .await
            {
                Ok(_) => {}
                Err(RepoRetrieveError::NotFound) => {
                    return Err(ChangeRequirementsError::InvalidInput(
                        "The seller does not offer this game".to_string(),
                    ));
                }
                Err(RepoRetrieveError::StorageError(e)) => {
                    log::error!("Failed to retrieve offering: {}", e);
                    return Err(ChangeRequirementsError::RepositoryError);
                }
            }
        }

        order
            .apply_update(update)
            .map_err(ChangeRequirementsError::InvalidInput)?;

        let game_changed = order.game_id != previous.game_id;
        let reviewed = game_changed && self.is_reviewed(order_id).await?;

        match self.order_repository.update_requirements(&order).await {
            Ok(()) => {}
            Err(RepoUpdateError::NotFound) => return Err(ChangeRequirementsError::NotFound),
            Err(e) => {
                log::error!("Failed to update order {}: {}", order_id, e);
                return Err(ChangeRequirementsError::RepositoryError);
            }
        }

        if reviewed {
            self.refresh_ratings(&previous).await;
            self.refresh_ratings(&order).await;
        }
        Ok(order)
    }

    async fn delete_order(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<(), ChangeRequirementsError> {
        let order = self.editable_order(user_id, order_id).await?;
        let reviewed = self.is_reviewed(order_id).await?;
        match self.order_repository.delete_order(order_id).await {
            Ok(()) => {
                log::info!("Order {} deleted by its buyer", order_id);
                if reviewed {
                    self.refresh_ratings(&order).await;
                }
                Ok(())
            }
            Err(RepoUpdateError::NotFound) => Err(ChangeRequirementsError::NotFound),
            Err(e) => {
                log::error!("Failed to delete order {}: {}", order_id, e);
                Err(ChangeRequirementsError::RepositoryError)
            }
        }
    }
}
