use crate::domain::{
    CategoryId, GameId, RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError,
    rating::DEFAULT_RATING,
};

pub const MAX_NAME_LENGTH: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub categories: Vec<Category>,
    pub rating: f64,
    pub clicks: u64,
}

#[derive(Clone, Debug)]
pub struct NewGame {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub category_ids: Vec<CategoryId>,
}

impl NewGame {
    pub fn into_game(self, id: GameId, categories: Vec<Category>) -> Game {
        Game {
            id,
            name: self.name,
            description: self.description,
            image: self.image,
            categories,
            rating: DEFAULT_RATING,
            clicks: 0,
        }
    }
}

#[async_trait::async_trait]
pub trait GameRepository {
    async fn create_category(&self, name: &str) -> Result<Category, RepoCreateError>;
    async fn list_categories(&self) -> Result<Vec<Category>, RepoError>;
    /// Fails with `Conflict` when one of the category ids does not exist.
    async fn create_game(&self, game: NewGame) -> Result<Game, RepoCreateError>;
    async fn get_game(&self, id: GameId) -> Result<Game, RepoRetrieveError>;
    async fn list_games(&self, name_filter: Option<&str>) -> Result<Vec<Game>, RepoError>;
    async fn set_rating(&self, id: GameId, rating: f64) -> Result<(), RepoUpdateError>;
    async fn increment_clicks(&self, id: GameId) -> Result<(), RepoUpdateError>;
}

pub fn sort_games(games: &mut [Game]) {
    games.sort_by(|a, b| b.rating.total_cmp(&a.rating));
}

pub fn validate_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!("Name cannot exceed {} characters", MAX_NAME_LENGTH));
    }
    Ok(name.to_string())
}
