use std::sync::Arc;

use crate::domain::{
    CategoryId, RepoCreateError, RepoRetrieveError, RepoUpdateError, SellerId, UserId,
    game::{Category, Game, GameRepository, NewGame, validate_name},
    seller::{BadgeRank, SellerRepository},
    user::UserRepository,
};

#[derive(Clone, Debug)]
pub struct CreateGame {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub category_ids: Vec<CategoryId>,
}

/// Catalog maintenance reserved to staff users.
#[async_trait::async_trait]
pub trait ManageCatalogUseCase {
    async fn create_category(
        &self,
        user_id: UserId,
        name: &str,
    ) -> Result<Category, ManageCatalogError>;
    async fn create_game(
        &self,
        user_id: UserId,
        game: CreateGame,
    ) -> Result<Game, ManageCatalogError>;
    async fn set_badge(
        &self,
        user_id: UserId,
        seller_id: SellerId,
        badge: BadgeRank,
    ) -> Result<(), ManageCatalogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ManageCatalogError {
    #[error("Only staff members can change the catalog")]
    Forbidden,
    #[error("{0}")]
    InvalidInput(String),
    #[error("Unknown category")]
    UnknownCategory,
    #[error("Seller not found")]
    SellerNotFound,
    #[error("Could not update the catalog")]
    RepositoryError,
}

pub struct ManageCatalogUseCaseImpl<U: UserRepository, G: GameRepository, S: SellerRepository> {
    user_repository: Arc<U>,
    game_repository: Arc<G>,
    seller_repository: Arc<S>,
}

impl<
    U: UserRepository + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
    S: SellerRepository + Send + Sync + 'static,
> ManageCatalogUseCaseImpl<U, G, S>
{
    pub fn new(
        user_repository: Arc<U>,
        game_repository: Arc<G>,
        seller_repository: Arc<S>,
    ) -> Self {
        Self {
            user_repository,
            game_repository,
            seller_repository,
        }
    }

    async fn require_staff(&self, user_id: UserId) -> Result<(), ManageCatalogError> {
        match self.user_repository.get_user(user_id).await {
            Ok(user) if user.is_staff && user.is_active => Ok(()),
            Ok(_) | Err(RepoRetrieveError::NotFound) => {
                log::warn!("User {} attempted a staff-only catalog change", user_id);
                Err(ManageCatalogError::Forbidden)
            }
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve user {}: {}", user_id, e);
                Err(ManageCatalogError::RepositoryError)
            }
        }
    }
}

#[async_trait::async_trait]
impl<
    U: UserRepository + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
    S: SellerRepository + Send + Sync + 'static,
> ManageCatalogUseCase for ManageCatalogUseCaseImpl<U, G, S>
{
    async fn create_category(
        &self,
        user_id: UserId,
        name: &str,
    ) -> Result<Category, ManageCatalogError> {
        self.require_staff(user_id).await?;
        let name = validate_name(name).map_err(ManageCatalogError::InvalidInput)?;
        match self.game_repository.create_category(&name).await {
            Ok(category) => {
                log::info!("Created category {} ({})", category.name, category.id);
                Ok(category)
            }
            Err(RepoCreateError::Conflict) => Err(ManageCatalogError::InvalidInput(format!(
                "Category {} already exists",
                name
            ))),
            Err(RepoCreateError::StorageError(e)) => {
                log::error!("Failed to create category {}: {}", name, e);
                Err(ManageCatalogError::RepositoryError)
            }
        }
    }

    async fn create_game(
        &self,
        user_id: UserId,
        game: CreateGame,
    ) -> Result<Game, ManageCatalogError> {
        self.require_staff(user_id).await?;
        let name = validate_name(&game.name).map_err(ManageCatalogError::InvalidInput)?;
        let new_game = NewGame {
            name,
            description: game.description.trim().to_string(),
            image: game.image.filter(|i| !i.trim().is_empty()),
            category_ids: game.category_ids,
        };
        match self.game_repository.create_game(new_game).await {
            Ok(game) => {
                log::info!("Created game {} ({})", game.name, game.id);
                Ok(game)
            }
            Err(RepoCreateError::Conflict) => Err(ManageCatalogError::UnknownCategory),
            Err(RepoCreateError::StorageError(e)) => {
                log::error!("Failed to create game: {}", e);
                Err(ManageCatalogError::RepositoryError)
            }
        }
    }

    async fn set_badge(
        &self,
        user_id: UserId,
        seller_id: SellerId,
        badge: BadgeRank,
    ) -> Result<(), ManageCatalogError> {
        self.require_staff(user_id).await?;
        match self.seller_repository.set_badge(seller_id, badge).await {
            Ok(()) => {
                log::info!("Seller {} now holds badge {}", seller_id, badge.label());
                Ok(())
            }
            Err(RepoUpdateError::NotFound) => Err(ManageCatalogError::SellerNotFound),
            Err(e) => {
                log::error!("Failed to set badge of seller {}: {}", seller_id, e);
                Err(ManageCatalogError::RepositoryError)
            }
        }
    }
}
