use std::sync::Arc;

use crate::domain::{
    RepoError,
    game::{Category, Game, GameRepository, sort_games},
};

#[async_trait::async_trait]
pub trait ListGamesUseCase {
    /// Games whose name contains `search`, best rated first.
    async fn list_games(&self, search: Option<&str>) -> Result<Vec<Game>, ListGamesError>;
    async fn list_categories(&self) -> Result<Vec<Category>, ListGamesError>;
}

#[derive(Debug)]
pub enum ListGamesError {
    RepositoryError,
}

pub struct ListGamesUseCaseImpl<G: GameRepository> {
    game_repository: Arc<G>,
}

impl<G: GameRepository> ListGamesUseCaseImpl<G> {
    pub fn new(game_repository: Arc<G>) -> Self {
        Self { game_repository }
    }
}

#[async_trait::async_trait]
impl<G: GameRepository + Send + Sync + 'static> ListGamesUseCase for ListGamesUseCaseImpl<G> {
    async fn list_games(&self, search: Option<&str>) -> Result<Vec<Game>, ListGamesError> {
        match self.game_repository.list_games(search).await {
            Ok(mut games) => {
                sort_games(&mut games);
                Ok(games)
            }
            Err(RepoError::StorageError(e)) => {
                log::error!("Failed to list games: {}", e);
                Err(ListGamesError::RepositoryError)
            }
        }
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ListGamesError> {
        self.game_repository
            .list_categories()
            .await
            .map_err(|RepoError::StorageError(e)| {
                log::error!("Failed to list categories: {}", e);
                ListGamesError::RepositoryError
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::game::NewGame, testing::InMemoryStore};

    #[tokio::test]
    async fn test_list_games_with_search_and_categories() {
        let store = Arc::new(InMemoryStore::new());
        let shooter = store.create_category("Shooter").await.unwrap();
        let moba = store.create_category("MOBA").await.unwrap();
        let mut ids = Vec::new();
        for (name, categories, rating) in [
            ("Valorant", vec![shooter.id], 3.0),
            ("League of Legends", vec![moba.id], 4.0),
            ("Overwatch", vec![shooter.id], 4.5),
        ] {
            let game = store
                .create_game(NewGame {
                    name: name.to_string(),
                    description: String::new(),
                    image: None,
                    category_ids: categories,
                })
                .await
                .unwrap();
            GameRepository::set_rating(store.as_ref(), game.id, rating)
                .await
                .unwrap();
            ids.push(game.id);
        }
        let use_case = ListGamesUseCaseImpl::new(store.clone());

        let games = use_case.list_games(None).await.unwrap();
        let names: Vec<&str> = games.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Overwatch", "League of Legends", "Valorant"]);
        assert_eq!(games[0].categories, vec![shooter.clone()]);

        let games = use_case.list_games(Some("lEgEnD")).await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, ids[1]);

        let categories = use_case.list_categories().await.unwrap();
        assert_eq!(categories, vec![shooter, moba]);
    }
}
