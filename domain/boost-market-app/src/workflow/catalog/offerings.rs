use std::sync::Arc;

use crate::{
    domain::{
        GameId, RepoCreateError, RepoError, RepoRetrieveError, UserId,
        game::GameRepository,
        offering::{NewOffering, Offering, OfferingRepository},
        seller::{Seller, SellerRepository},
    },
    workflow::catalog::OfferedGame,
};

pub const MAX_OFFERING_DESCRIPTION_LENGTH: usize = 999;

#[derive(Clone, Debug)]
pub struct AddOffering {
    pub game_id: GameId,
    pub price: Option<u32>,
    pub description: Option<String>,
}

#[async_trait::async_trait]
pub trait OfferingsUseCase {
    /// Offerings of the caller's seller role, which is created on demand.
    async fn my_offerings(&self, user_id: UserId) -> Result<Vec<OfferedGame>, OfferingsError>;
    async fn add_offering(
        &self,
        user_id: UserId,
        offering: AddOffering,
    ) -> Result<Offering, OfferingsError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OfferingsError {
    #[error("Game not found")]
    GameNotFound,
    #[error("You already offer this game")]
    AlreadyOffered,
    #[error("{0}")]
    InvalidInput(String),
    #[error("Could not store the offering")]
    RepositoryError,
}

impl From<RepoError> for OfferingsError {
    fn from(RepoError::StorageError(e): RepoError) -> Self {
        log::error!("Offering storage failed: {}", e);
        OfferingsError::RepositoryError
    }
}

pub struct OfferingsUseCaseImpl<S: SellerRepository, O: OfferingRepository, G: GameRepository> {
    seller_repository: Arc<S>,
    offering_repository: Arc<O>,
    game_repository: Arc<G>,
}

impl<
    S: SellerRepository + Send + Sync + 'static,
    O: OfferingRepository + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
> OfferingsUseCaseImpl<S, O, G>
{
    pub fn new(
        seller_repository: Arc<S>,
        offering_repository: Arc<O>,
        game_repository: Arc<G>,
    ) -> Self {
        Self {
            seller_repository,
            offering_repository,
            game_repository,
        }
    }

    async fn refresh_number_of_games(&self, seller: &Seller) -> Result<(), OfferingsError> {
        let count = self.offering_repository.list_by_seller(seller.id).await?.len();
        if let Err(e) = self
            .seller_repository
            .set_number_of_games(seller.id, count as u32)
            .await
        {
            log::error!("Failed to refresh game count of seller {}: {}", seller.id, e);
            return Err(OfferingsError::RepositoryError);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<
    S: SellerRepository + Send + Sync + 'static,
    O: OfferingRepository + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
> OfferingsUseCase for OfferingsUseCaseImpl<S, O, G>
{
    async fn my_offerings(&self, user_id: UserId) -> Result<Vec<OfferedGame>, OfferingsError> {
        let seller = self.seller_repository.get_or_create_seller(user_id).await?;
        let offerings = self.offering_repository.list_by_seller(seller.id).await?;
        let mut games = Vec::with_capacity(offerings.len());
        for offering in offerings {
            match self.game_repository.get_game(offering.game_id).await {
                Ok(game) => games.push(OfferedGame { offering, game }),
                Err(e) => log::warn!("Skipping offering {}: {}", offering.id, e),
            }
        }
        Ok(games)
    }

    async fn add_offering(
        &self,
        user_id: UserId,
        offering: AddOffering,
    ) -> Result<Offering, OfferingsError> {
        let description = offering
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if description
            .as_ref()
            .is_some_and(|d| d.chars().count() > MAX_OFFERING_DESCRIPTION_LENGTH)
        {
            return Err(OfferingsError::InvalidInput(format!(
                "Description cannot exceed {} characters",
                MAX_OFFERING_DESCRIPTION_LENGTH
            )));
        }

        match self.game_repository.get_game(offering.game_id).await {
            Ok(_) => {}
            Err(RepoRetrieveError::NotFound) => return Err(OfferingsError::GameNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve game {}: {}", offering.game_id, e);
                return Err(OfferingsError::RepositoryError);
            }
        }

        let seller = self.seller_repository.get_or_create_seller(user_id).await?;
        let created = match self
            .offering_repository
            .create_offering(NewOffering {
                seller_id: seller.id,
                game_id: offering.game_id,
                price: offering.price,
                description,
            })
            .await
        {
            Ok(created) => created,
            Err(RepoCreateError::Conflict) => return Err(OfferingsError::AlreadyOffered),
            Err(RepoCreateError::StorageError(e)) => {
                log::error!("Failed to create offering: {}", e);
                return Err(OfferingsError::RepositoryError);
            }
        };
        self.refresh_number_of_games(&seller).await?;

        log::info!("Seller {} now offers game {}", seller.id, created.game_id);
        Ok(created)
    }
}
