use std::sync::Arc;

use crate::{
    domain::{
        RepoError, RepoRetrieveError, SellerId,
        game::GameRepository,
        offering::OfferingRepository,
        seller::{SellerRepository, SellerSummary, sort_sellers},
    },
    workflow::catalog::OfferedGame,
};

#[async_trait::async_trait]
pub trait SellerDirectoryUseCase {
    /// Sellers whose user name contains `search`, best rated first.
    async fn list_sellers(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<SellerSummary>, SellerDirectoryError>;
    async fn games_for_seller(
        &self,
        seller_id: SellerId,
    ) -> Result<Vec<OfferedGame>, SellerDirectoryError>;
}

#[derive(Debug)]
pub enum SellerDirectoryError {
    SellerNotFound,
    RepositoryError,
}

impl From<RepoError> for SellerDirectoryError {
    fn from(RepoError::StorageError(e): RepoError) -> Self {
        log::error!("Seller directory query failed: {}", e);
        SellerDirectoryError::RepositoryError
    }
}

pub struct SellerDirectoryUseCaseImpl<S: SellerRepository, O: OfferingRepository, G: GameRepository>
{
    seller_repository: Arc<S>,
    offering_repository: Arc<O>,
    game_repository: Arc<G>,
}

impl<S: SellerRepository, O: OfferingRepository, G: GameRepository>
    SellerDirectoryUseCaseImpl<S, O, G>
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
}

#[async_trait::async_trait]
impl<
    S: SellerRepository + Send + Sync + 'static,
    O: OfferingRepository + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
> SellerDirectoryUseCase for SellerDirectoryUseCaseImpl<S, O, G>
{
    async fn list_sellers(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<SellerSummary>, SellerDirectoryError> {
        let mut sellers = self.seller_repository.list_sellers(search).await?;
        sort_sellers(&mut sellers);
        Ok(sellers)
    }

    async fn games_for_seller(
        &self,
        seller_id: SellerId,
    ) -> Result<Vec<OfferedGame>, SellerDirectoryError> {
        match self.seller_repository.get_seller(seller_id).await {
            Ok(_) => {}
            Err(RepoRetrieveError::NotFound) => return Err(SellerDirectoryError::SellerNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve seller {}: {}", seller_id, e);
                return Err(SellerDirectoryError::RepositoryError);
            }
        }

        let offerings = self.offering_repository.list_by_seller(seller_id).await?;
        let mut games = Vec::with_capacity(offerings.len());
        for offering in offerings {
            match self.game_repository.get_game(offering.game_id).await {
                Ok(game) => games.push(OfferedGame { offering, game }),
                Err(e) => log::warn!(
                    "Skipping offering {} of seller {}: {}",
                    offering.id,
                    seller_id,
                    e
                ),
            }
        }
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{game::NewGame, offering::NewOffering},
        testing::InMemoryStore,
    };

    fn use_case(
        store: &Arc<InMemoryStore>,
    ) -> SellerDirectoryUseCaseImpl<InMemoryStore, InMemoryStore, InMemoryStore> {
        SellerDirectoryUseCaseImpl::new(store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_list_sellers_filters_and_orders() {
        let store = Arc::new(InMemoryStore::new());
        for (name, rating) in [("AceBooster", 3.0), ("slowpoke", 4.0), ("boostqueen", 4.5)] {
            let user = store.seed_user(name, "pw-pw-pw-pw", false).await;
            let seller = store.get_or_create_seller(user.id).await.unwrap();
            SellerRepository::set_rating(store.as_ref(), seller.id, rating)
                .await
                .unwrap();
        }

        let all = use_case(&store).list_sellers(None).await.unwrap();
        let names: Vec<&str> = all.iter().map(|s| s.user_name.as_str()).collect();
        assert_eq!(names, vec!["boostqueen", "slowpoke", "AceBooster"]);

        let boosters = use_case(&store).list_sellers(Some("BOOST")).await.unwrap();
        let names: Vec<&str> = boosters.iter().map(|s| s.user_name.as_str()).collect();
        assert_eq!(names, vec!["boostqueen", "AceBooster"]);
    }

    #[tokio::test]
    async fn test_games_for_seller() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("booster", "pw-pw-pw-pw", false).await;
        let seller = store.get_or_create_seller(user.id).await.unwrap();
        let game = store
            .create_game(NewGame {
                name: "Valorant".to_string(),
                description: String::new(),
                image: None,
                category_ids: vec![],
            })
            .await
            .unwrap();
        store
            .create_offering(NewOffering {
                seller_id: seller.id,
                game_id: game.id,
                price: Some(20),
                description: Some("Iron to Gold".to_string()),
            })
            .await
            .unwrap();

        let games = use_case(&store).games_for_seller(seller.id).await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].game.name, "Valorant");
        assert_eq!(games[0].offering.price, Some(20));

        let result = use_case(&store).games_for_seller(SellerId(999)).await;
        assert!(matches!(result, Err(SellerDirectoryError::SellerNotFound)));
    }
}
