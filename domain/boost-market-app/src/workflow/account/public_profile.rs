use std::sync::Arc;

use crate::{
    domain::{
        RepoError, RepoRetrieveError,
        buyer::BuyerRepository,
        click::ClickEvent,
        offering::{OfferingRepository, starting_price},
        order::{OrderRepository, recent_buyers},
        seller::{Seller, SellerRepository},
        user::UserRepository,
    },
    ports::click::ClickSignalPort,
    workflow::account::{PublicProfile, RECENT_BUYERS_SHOWN, SellerProfile},
};

#[async_trait::async_trait]
pub trait PublicProfileUseCase {
    /// Counts as a profile visit when the user is a seller.
    async fn display_public_profile(
        &self,
        user_name: &str,
    ) -> Result<PublicProfile, PublicProfileError>;
}

#[derive(Debug)]
pub enum PublicProfileError {
    NotFound,
    RepositoryError,
}

impl From<RepoError> for PublicProfileError {
    fn from(RepoError::StorageError(e): RepoError) -> Self {
        log::error!("Failed to assemble public profile: {}", e);
        PublicProfileError::RepositoryError
    }
}

pub struct PublicProfileUseCaseImpl<
    U: UserRepository,
    S: SellerRepository,
    B: BuyerRepository,
    O: OfferingRepository,
    R: OrderRepository,
    C: ClickSignalPort,
> {
    user_repository: Arc<U>,
    seller_repository: Arc<S>,
    buyer_repository: Arc<B>,
    offering_repository: Arc<O>,
    order_repository: Arc<R>,
    click_signal: Arc<C>,
}

impl<
    U: UserRepository + Send + Sync + 'static,
    S: SellerRepository + Send + Sync + 'static,
    B: BuyerRepository + Send + Sync + 'static,
    O: OfferingRepository + Send + Sync + 'static,
    R: OrderRepository + Send + Sync + 'static,
    C: ClickSignalPort + Send + Sync + 'static,
> PublicProfileUseCaseImpl<U, S, B, O, R, C>
{
    pub fn new(
        user_repository: Arc<U>,
        seller_repository: Arc<S>,
        buyer_repository: Arc<B>,
        offering_repository: Arc<O>,
        order_repository: Arc<R>,
        click_signal: Arc<C>,
    ) -> Self {
        Self {
            user_repository,
            seller_repository,
            buyer_repository,
            offering_repository,
            order_repository,
            click_signal,
        }
    }

    async fn seller_profile(&self, seller: Seller) -> Result<SellerProfile, PublicProfileError> {
        let offerings = self.offering_repository.list_by_seller(seller.id).await?;
        let orders = self.order_repository.list_by_seller(seller.id).await?;

        let mut buyer_names = Vec::new();
        for buyer_id in recent_buyers(&orders, RECENT_BUYERS_SHOWN) {
            let user = match self.buyer_repository.get_buyer(buyer_id).await {
                Ok(buyer) => self.user_repository.get_user(buyer.user_id).await,
                Err(e) => Err(e),
            };
            match user {
                Ok(user) => buyer_names.push(user.user_name),
                Err(e) => log::warn!("Skipping buyer {} of seller {}: {}", buyer_id, seller.id, e),
            }
        }

        Ok(SellerProfile {
            starting_price: starting_price(&offerings),
            total_orders: orders.len(),
            recent_buyers: buyer_names,
            seller,
        })
    }
}

#[async_trait::async_trait]
impl<
    U: UserRepository + Send + Sync + 'static,
    S: SellerRepository + Send + Sync + 'static,
    B: BuyerRepository + Send + Sync + 'static,
    O: OfferingRepository + Send + Sync + 'static,
    R: OrderRepository + Send + Sync + 'static,
    C: ClickSignalPort + Send + Sync + 'static,
> PublicProfileUseCase for PublicProfileUseCaseImpl<U, S, B, O, R, C>
{
    async fn display_public_profile(
        &self,
        user_name: &str,
    ) -> Result<PublicProfile, PublicProfileError> {
        let user = match self.user_repository.get_user_by_name(user_name).await {
            Ok(user) => user,
            Err(RepoRetrieveError::NotFound) => return Err(PublicProfileError::NotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve user {}: {}", user_name, e);
                return Err(PublicProfileError::RepositoryError);
            }
        };

        let seller = match self.seller_repository.get_seller_by_user(user.id).await {
            Ok(seller) => Some(seller),
            Err(RepoRetrieveError::NotFound) => None,
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve seller role of {}: {}", user_name, e);
                return Err(PublicProfileError::RepositoryError);
            }
        };

        let seller_profile = match seller {
            Some(seller) => {
                self.click_signal
                    .emit(ClickEvent::SellerProfileViewed(seller.id));
                Some(self.seller_profile(seller).await?)
            }
            None => None,
        };

        Ok(PublicProfile::new(&user, seller_profile))
    }
}
