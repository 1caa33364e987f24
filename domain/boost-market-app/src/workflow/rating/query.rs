use std::sync::Arc;

use crate::domain::{
    GameId, RepoError, RepoRetrieveError, SellerId,
    game::GameRepository,
    offering::OfferingRepository,
    rating::RatingEntry,
    seller::SellerRepository,
};

#[async_trait::async_trait]
pub trait RatingQueryUseCase {
    async fn seller_ratings(&self) -> Result<Vec<RatingEntry>, RatingQueryError>;
    async fn game_ratings(&self) -> Result<Vec<RatingEntry>, RatingQueryError>;
    async fn seller_rating(&self, seller_id: SellerId) -> Result<RatingEntry, RatingQueryError>;
    async fn game_rating(&self, game_id: GameId) -> Result<RatingEntry, RatingQueryError>;
    /// Ratings of every game the seller offers.
    async fn seller_game_ratings(
        &self,
        seller_id: SellerId,
    ) -> Result<Vec<RatingEntry>, RatingQueryError>;
    /// Ratings of every seller offering the game.
    async fn game_seller_ratings(
        &self,
        game_id: GameId,
    ) -> Result<Vec<RatingEntry>, RatingQueryError>;
    /// The game's rating if the seller offers it, otherwise nothing.
    async fn seller_game_rating(
        &self,
        seller_id: SellerId,
        game_id: GameId,
    ) -> Result<Vec<RatingEntry>, RatingQueryError>;
    /// The seller's rating if they offer the game, otherwise nothing.
    async fn game_seller_rating(
        &self,
        game_id: GameId,
        seller_id: SellerId,
    ) -> Result<Vec<RatingEntry>, RatingQueryError>;
}

#[derive(Debug)]
pub enum RatingQueryError {
    NotFound,
    RepositoryError,
}

impl From<RepoError> for RatingQueryError {
    fn from(RepoError::StorageError(e): RepoError) -> Self {
        log::error!("Rating query failed: {}", e);
        RatingQueryError::RepositoryError
    }
}

impl From<RepoRetrieveError> for RatingQueryError {
    fn from(e: RepoRetrieveError) -> Self {
        match e {
            RepoRetrieveError::NotFound => RatingQueryError::NotFound,
            RepoRetrieveError::StorageError(e) => {
                log::error!("Rating query failed: {}", e);
                RatingQueryError::RepositoryError
            }
        }
    }
}

pub struct RatingQueryUseCaseImpl<S: SellerRepository, G: GameRepository, O: OfferingRepository> {
    seller_repository: Arc<S>,
    game_repository: Arc<G>,
    offering_repository: Arc<O>,
}

impl<S: SellerRepository, G: GameRepository, O: OfferingRepository>
    RatingQueryUseCaseImpl<S, G, O>
{
    pub fn new(
        seller_repository: Arc<S>,
        game_repository: Arc<G>,
        offering_repository: Arc<O>,
    ) -> Self {
        Self {
            seller_repository,
            game_repository,
            offering_repository,
        }
    }
}

/// Entities offered but missing from storage are skipped.
fn present(
    result: Result<RatingEntry, RatingQueryError>,
) -> Result<Option<RatingEntry>, RatingQueryError> {
    match result {
        Ok(entry) => Ok(Some(entry)),
        Err(RatingQueryError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait::async_trait]
impl<
    S: SellerRepository + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
    O: OfferingRepository + Send + Sync + 'static,
> RatingQueryUseCase for RatingQueryUseCaseImpl<S, G, O>
{
    async fn seller_ratings(&self) -> Result<Vec<RatingEntry>, RatingQueryError> {
        let sellers = self.seller_repository.list_sellers(None).await?;
        Ok(sellers
            .into_iter()
            .map(|s| RatingEntry {
                id: s.seller.id.0,
                rating: s.seller.rating,
            })
            .collect())
    }

    async fn game_ratings(&self) -> Result<Vec<RatingEntry>, RatingQueryError> {
        let games = self.game_repository.list_games(None).await?;
        Ok(games
            .into_iter()
            .map(|g| RatingEntry {
                id: g.id.0,
                rating: g.rating,
            })
            .collect())
    }

    async fn seller_rating(&self, seller_id: SellerId) -> Result<RatingEntry, RatingQueryError> {
        let seller = self.seller_repository.get_seller(seller_id).await?;
        Ok(RatingEntry {
            id: seller.id.0,
            rating: seller.rating,
        })
    }

    async fn game_rating(&self, game_id: GameId) -> Result<RatingEntry, RatingQueryError> {
        let game = self.game_repository.get_game(game_id).await?;
        Ok(RatingEntry {
            id: game.id.0,
            rating: game.rating,
        })
    }

    async fn seller_game_ratings(
        &self,
        seller_id: SellerId,
    ) -> Result<Vec<RatingEntry>, RatingQueryError> {
        let offerings = self.offering_repository.list_by_seller(seller_id).await?;
        let mut entries = Vec::with_capacity(offerings.len());
        for offering in offerings {
            entries.extend(present(self.game_rating(offering.game_id).await)?);
        }
        Ok(entries)
    }

    async fn game_seller_ratings(
        &self,
        game_id: GameId,
    ) -> Result<Vec<RatingEntry>, RatingQueryError> {
        let offerings = self.offering_repository.list_by_game(game_id).await?;
        let mut entries = Vec::with_capacity(offerings.len());
        for offering in offerings {
            entries.extend(present(self.seller_rating(offering.seller_id).await)?);
        }
        Ok(entries)
    }

    async fn seller_game_rating(
        &self,
        seller_id: SellerId,
        game_id: GameId,
    ) -> Result<Vec<RatingEntry>, RatingQueryError> {
        match self.offering_repository.get_offering(seller_id, game_id).await {
            Ok(_) => Ok(present(self.game_rating(game_id).await)?.into_iter().collect()),
            Err(RepoRetrieveError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn game_seller_rating(
        &self,
        game_id: GameId,
        seller_id: SellerId,
    ) -> Result<Vec<RatingEntry>, RatingQueryError> {
        match self.offering_repository.get_offering(seller_id, game_id).await {
            Ok(_) => Ok(present(self.seller_rating(seller_id).await)?.into_iter().collect()),
            Err(RepoRetrieveError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::game::NewGame,
        testing::{InMemoryStore, SeededOffer},
    };

    async fn setup() -> (
        Arc<InMemoryStore>,
        SeededOffer,
        GameId,
        RatingQueryUseCaseImpl<InMemoryStore, InMemoryStore, InMemoryStore>,
    ) {
        let store = Arc::new(InMemoryStore::new());
        let offer = store.seed_offer().await;
        SellerRepository::set_rating(store.as_ref(), offer.seller.id, 4.2)
            .await
            .unwrap();
        GameRepository::set_rating(store.as_ref(), offer.game.id, 3.1)
            .await
            .unwrap();
        let unoffered = store
            .create_game(NewGame {
                name: "Dota 2".to_string(),
                description: String::new(),
                image: None,
                category_ids: vec![],
            })
            .await
            .unwrap();
        let use_case = RatingQueryUseCaseImpl::new(store.clone(), store.clone(), store.clone());
        (store, offer, unoffered.id, use_case)
    }

    #[tokio::test]
    async fn test_rating_lists_and_single_ratings() {
        let (_, offer, unoffered, use_case) = setup().await;

        let sellers = use_case.seller_ratings().await.unwrap();
        assert_eq!(
            sellers,
            vec![RatingEntry {
                id: offer.seller.id.0,
                rating: 4.2
            }]
        );
        let games = use_case.game_ratings().await.unwrap();
        assert_eq!(games.len(), 2);
        assert!(games.contains(&RatingEntry {
            id: unoffered.0,
            rating: 2.5
        }));

        assert_eq!(use_case.game_rating(offer.game.id).await.unwrap().rating, 3.1);
        assert!(matches!(
            use_case.seller_rating(SellerId(999)).await,
            Err(RatingQueryError::NotFound)
        ));
        assert!(matches!(
            use_case.game_rating(GameId(999)).await,
            Err(RatingQueryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_cross_ratings() {
        let (_, offer, unoffered, use_case) = setup().await;
        let game_entry = RatingEntry {
            id: offer.game.id.0,
            rating: 3.1,
        };
        let seller_entry = RatingEntry {
            id: offer.seller.id.0,
            rating: 4.2,
        };

        assert_eq!(
            use_case.seller_game_ratings(offer.seller.id).await.unwrap(),
            vec![game_entry]
        );
        assert_eq!(
            use_case.game_seller_ratings(offer.game.id).await.unwrap(),
            vec![seller_entry]
        );
        assert!(use_case.game_seller_ratings(unoffered).await.unwrap().is_empty());

        assert_eq!(
            use_case
                .seller_game_rating(offer.seller.id, offer.game.id)
                .await
                .unwrap(),
            vec![game_entry]
        );
        assert!(use_case
            .seller_game_rating(offer.seller.id, unoffered)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            use_case
                .game_seller_rating(offer.game.id, offer.seller.id)
                .await
                .unwrap(),
            vec![seller_entry]
        );
        assert!(use_case
            .game_seller_rating(unoffered, offer.seller.id)
            .await
            .unwrap()
            .is_empty());
    }
}
