use std::collections::{BTreeSet, HashMap};

use boost_market_app::domain::{
    CategoryId, GameId, RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError,
    game::{Category, Game, GameRepository, NewGame},
    rating::DEFAULT_RATING,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, ExprTrait, QueryFilter, QueryOrder, Set, TransactionError,
    TransactionTrait, prelude::Expr,
};

use crate::{
    create_error,
    entity::{category, game, game_category},
    repo_error, retrieve_error, update_error,
};

pub struct GameRepositoryImpl {
    db: DatabaseConnection,
}

impl GameRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_category(model: category::Model) -> Category {
        Category {
            id: CategoryId(model.id),
            name: model.name,
        }
    }

    fn model_to_game(model: game::Model, categories: Vec<Category>) -> Game {
        Game {
            id: GameId(model.id),
            name: model.name,
            description: model.description,
            image: model.image,
            categories,
            rating: model.rating,
            clicks: model.clicks as u64,
        }
    }

    /// Categories of every given game, ordered by category id.
    async fn load_categories<C: ConnectionTrait>(
        c: &C,
        game_ids: Vec<i64>,
    ) -> Result<HashMap<i64, Vec<Category>>, DbErr> {
        let links = game_category::Entity::find()
            .filter(game_category::Column::GameId.is_in(game_ids))
            .all(c)
            .await?;
        let category_ids: BTreeSet<i64> = links.iter().map(|l| l.category_id).collect();
        let categories: HashMap<i64, Category> = category::Entity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(c)
            .await?
            .into_iter()
            .map(|m| (m.id, Self::model_to_category(m)))
            .collect();

        let mut by_game: HashMap<i64, Vec<Category>> = HashMap::new();
        for link in links {
            if let Some(category) = categories.get(&link.category_id) {
                by_game
                    .entry(link.game_id)
                    .or_default()
                    .push(category.clone());
            }
        }
        for list in by_game.values_mut() {
            list.sort_by_key(|c| c.id);
        }
        Ok(by_game)
    }

    async fn update_column(
        &self,
        id: GameId,
        column: game::Column,
        value: Expr,
    ) -> Result<(), RepoUpdateError> {
        let result = game::Entity::update_many()
            .col_expr(column, value)
            .filter(game::Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .map_err(update_error)?;
        if result.rows_affected == 0 {
            return Err(RepoUpdateError::NotFound);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl GameRepository for GameRepositoryImpl {
    async fn create_category(&self, name: &str) -> Result<Category, RepoCreateError> {
        let active_model = category::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
        };
        let model = active_model.insert(&self.db).await.map_err(create_error)?;
        Ok(Self::model_to_category(model))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepoError> {
        let models = category::Entity::find()
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_error)?;
        Ok(models.into_iter().map(Self::model_to_category).collect())
    }

    async fn create_game(&self, new_game: NewGame) -> Result<Game, RepoCreateError> {
        let category_ids: BTreeSet<i64> = new_game.category_ids.iter().map(|c| c.0).collect();
        let res = self
            .db
            .transaction::<_, Game, RepoCreateError>(|c| {
                Box::pin(async move {
                    let known = category::Entity::find()
                        .filter(category::Column::Id.is_in(category_ids.iter().copied()))
                        .order_by_asc(category::Column::Id)
                        .all(c)
                        .await
                        .map_err(create_error)?;
                    if known.len() != category_ids.len() {
                        return Err(RepoCreateError::Conflict);
                    }

                    let game_model = game::ActiveModel {
                        id: NotSet,
                        name: Set(new_game.name.clone()),
                        description: Set(new_game.description.clone()),
                        image: Set(new_game.image.clone()),
                        rating: Set(DEFAULT_RATING),
                        clicks: Set(0),
                    }
                    .insert(c)
                    .await
                    .map_err(create_error)?;

                    for category_id in &category_ids {
                        game_category::ActiveModel {
                            game_id: Set(game_model.id),
                            category_id: Set(*category_id),
                        }
                        .insert(c)
                        .await
                        .map_err(create_error)?;
                    }

                    let categories = known.into_iter().map(Self::model_to_category).collect();
                    Ok(new_game.into_game(GameId(game_model.id), categories))
                })
            })
            .await;
        match res {
            Ok(game) => Ok(game),
            Err(TransactionError::Transaction(e)) => Err(e),
            Err(TransactionError::Connection(e)) => Err(create_error(e)),
        }
    }

    async fn get_game(&self, id: GameId) -> Result<Game, RepoRetrieveError> {
        let model = game::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(retrieve_error)?
            .ok_or(RepoRetrieveError::NotFound)?;
        let mut categories = Self::load_categories(&self.db, vec![model.id])
            .await
            .map_err(retrieve_error)?;
        let categories = categories.remove(&model.id).unwrap_or_default();
        Ok(Self::model_to_game(model, categories))
    }

    async fn list_games(&self, name_filter: Option<&str>) -> Result<Vec<Game>, RepoError> {
        let mut query = game::Entity::find().order_by_asc(game::Column::Id);
        if let Some(name) = name_filter.map(str::trim).filter(|n| !n.is_empty()) {
            query = query.filter(game::Column::Name.contains(name));
        }
        let models = query.all(&self.db).await.map_err(repo_error)?;
        let mut categories =
            Self::load_categories(&self.db, models.iter().map(|m| m.id).collect())
                .await
                .map_err(repo_error)?;
        Ok(models
            .into_iter()
            .map(|model| {
                let game_categories = categories.remove(&model.id).unwrap_or_default();
                Self::model_to_game(model, game_categories)
            })
            .collect())
    }

    async fn set_rating(&self, id: GameId, rating: f64) -> Result<(), RepoUpdateError> {
        self.update_column(id, game::Column::Rating, Expr::value(rating))
            .await
    }

    async fn increment_clicks(&self, id: GameId) -> Result<(), RepoUpdateError> {
        self.update_column(id, game::Column::Clicks, Expr::col(game::Column::Clicks).add(1))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_db;

    fn new_game(name: &str, category_ids: Vec<CategoryId>) -> NewGame {
        NewGame {
            name: name.to_string(),
            description: format!("{} boosting", name),
            image: None,
            category_ids,
        }
    }

    #[tokio::test]
    async fn test_categories_are_unique() {
        let repo = GameRepositoryImpl::new(test_db().await);
        let fps = repo.create_category("FPS").await.unwrap();
        assert!(matches!(
            repo.create_category("FPS").await,
            Err(RepoCreateError::Conflict)
        ));
        assert_eq!(repo.list_categories().await.unwrap(), vec![fps]);
    }

    #[tokio::test]
    async fn test_create_game_with_categories() {
        let repo = GameRepositoryImpl::new(test_db().await);
        let fps = repo.create_category("FPS").await.unwrap();
        let tactical = repo.create_category("Tactical").await.unwrap();

        let game = repo
            .create_game(new_game("Valorant", vec![tactical.id, fps.id]))
            .await
            .unwrap();
        assert_eq!(game.categories, vec![fps.clone(), tactical.clone()]);
        assert_eq!(game.rating, 2.5);
        assert_eq!(repo.get_game(game.id).await.unwrap(), game);

        assert!(matches!(
            repo.create_game(new_game("Dota 2", vec![CategoryId(999)]))
                .await,
            Err(RepoCreateError::Conflict)
        ));
        assert_eq!(repo.list_games(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_games_and_updates() {
        let repo = GameRepositoryImpl::new(test_db().await);
        let valorant = repo.create_game(new_game("Valorant", vec![])).await.unwrap();
        repo.create_game(new_game("Dota 2", vec![])).await.unwrap();

        assert_eq!(repo.list_games(None).await.unwrap().len(), 2);
        let found = repo.list_games(Some(" valo ")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, valorant.id);

        repo.set_rating(valorant.id, 4.25).await.unwrap();
        repo.increment_clicks(valorant.id).await.unwrap();
        let valorant = repo.get_game(valorant.id).await.unwrap();
        assert_eq!(valorant.rating, 4.25);
        assert_eq!(valorant.clicks, 1);

        assert!(matches!(
            repo.get_game(GameId(999)).await,
            Err(RepoRetrieveError::NotFound)
        ));
    }
}
