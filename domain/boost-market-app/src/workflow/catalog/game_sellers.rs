use std::sync::Arc;

use crate::{
    domain::{
        GameId, RepoError, RepoRetrieveError,
        click::ClickEvent,
        game::{Game, GameRepository},
        offering::OfferingRepository,
        seller::{SellerRepository, SellerSummary, compare_sellers},
        user::UserRepository,
    },
    ports::click::ClickSignalPort,
    workflow::catalog::GameOffer,
};

#[derive(Clone, Debug, PartialEq)]
pub struct GameSellers {
    pub game: Game,
    /// Best rated sellers first.
    pub offers: Vec<GameOffer>,
}

#[async_trait::async_trait]
pub trait GameSellersUseCase {
    /// Counts as a view of the game.
    async fn sellers_for_game(&self, game_id: GameId) -> Result<GameSellers, GameSellersError>;
}

#[derive(Debug)]
pub enum GameSellersError {
    GameNotFound,
    RepositoryError,
}

pub struct GameSellersUseCaseImpl<
    G: GameRepository,
    O: OfferingRepository,
    S: SellerRepository,
    U: UserRepository,
    C: ClickSignalPort,
> {
    game_repository: Arc<G>,
    offering_repository: Arc<O>,
    seller_repository: Arc<S>,
    user_repository: Arc<U>,
    click_signal: Arc<C>,
}

impl<
    G: GameRepository,
    O: OfferingRepository,
    S: SellerRepository,
    U: UserRepository,
    C: ClickSignalPort,
> GameSellersUseCaseImpl<G, O, S, U, C>
{
    pub fn new(
        game_repository: Arc<G>,
        offering_repository: Arc<O>,
        seller_repository: Arc<S>,
        user_repository: Arc<U>,
        click_signal: Arc<C>,
    ) -> Self {
        Self {
            game_repository,
            offering_repository,
            seller_repository,
            user_repository,
            click_signal,
        }
    }
}

#[async_trait::async_trait]
impl<
    G: GameRepository + Send + Sync + 'static,
    O: OfferingRepository + Send + Sync + 'static,
    S: SellerRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: ClickSignalPort + Send + Sync + 'static,
> GameSellersUseCase for GameSellersUseCaseImpl<G, O, S, U, C>
{
    async fn sellers_for_game(&self, game_id: GameId) -> Result<GameSellers, GameSellersError> {
        let game = match self.game_repository.get_game(game_id).await {
            Ok(game) => game,
            Err(RepoRetrieveError::NotFound) => return Err(GameSellersError::GameNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve game {}: {}", game_id, e);
                return Err(GameSellersError::RepositoryError);
            }
        };
        self.click_signal.emit(ClickEvent::GameViewed(game_id));

        let offerings = match self.offering_repository.list_by_game(game_id).await {
            Ok(offerings) => offerings,
            Err(RepoError::StorageError(e)) => {
                log::error!("Failed to list offerings of game {}: {}", game_id, e);
                return Err(GameSellersError::RepositoryError);
            }
        };

        let mut offers = Vec::with_capacity(offerings.len());
        for offering in offerings {
            let seller = match self.seller_repository.get_seller(offering.seller_id).await {
                Ok(seller) => seller,
                Err(e) => {
                    log::warn!("Skipping offering {}: {}", offering.id, e);
                    continue;
                }
            };
            let user_name = match self.user_repository.get_user(seller.user_id).await {
                Ok(user) => user.user_name,
                Err(e) => {
                    log::warn!("Skipping offering {}: {}", offering.id, e);
                    continue;
                }
            };
            offers.push(GameOffer {
                offering,
                seller: SellerSummary { seller, user_name },
            });
        }
        offers.sort_by(|a, b| compare_sellers(&a.seller.seller, &b.seller.seller));

        Ok(GameSellers { game, offers })
    }
}
