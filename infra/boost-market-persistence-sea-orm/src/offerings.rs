use boost_market_app::domain::{
    GameId, OfferingId, RepoCreateError, RepoError, RepoRetrieveError, SellerId,
    offering::{NewOffering, Offering, OfferingRepository},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::{create_error, entity::seller_game, repo_error, retrieve_error};

pub struct OfferingRepositoryImpl {
    db: DatabaseConnection,
}

impl OfferingRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_offering(model: seller_game::Model) -> Offering {
        Offering {
            id: OfferingId(model.id),
            seller_id: SellerId(model.seller_id),
            game_id: GameId(model.game_id),
            price: model.price.map(|p| p as u32),
            description: model.description,
        }
    }

    async fn list_where(&self, column: seller_game::Column, id: i64) -> Result<Vec<Offering>, RepoError> {
        let models = seller_game::Entity::find()
            .filter(column.eq(id))
            .order_by_asc(seller_game::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_error)?;
        Ok(models.into_iter().map(Self::model_to_offering).collect())
    }
}

#[async_trait::async_trait]
impl OfferingRepository for OfferingRepositoryImpl {
    async fn create_offering(&self, offering: NewOffering) -> Result<Offering, RepoCreateError> {
        let existing = seller_game::Entity::find()
            .filter(seller_game::Column::SellerId.eq(offering.seller_id.0))
            .filter(seller_game::Column::GameId.eq(offering.game_id.0))
            .one(&self.db)
            .await
            .map_err(create_error)?;
        if existing.is_some() {
            return Err(RepoCreateError::Conflict);
        }
        let active_model = seller_game::ActiveModel {
            id: NotSet,
            seller_id: Set(offering.seller_id.0),
            game_id: Set(offering.game_id.0),
            price: Set(offering.price.map(|p| p as i32)),
            description: Set(offering.description),
        };
        let model = active_model.insert(&self.db).await.map_err(create_error)?;
        Ok(Self::model_to_offering(model))
    }

    async fn get_offering(
        &self,
        seller_id: SellerId,
        game_id: GameId,
    ) -> Result<Offering, RepoRetrieveError> {
        seller_game::Entity::find()
            .filter(seller_game::Column::SellerId.eq(seller_id.0))
            .filter(seller_game::Column::GameId.eq(game_id.0))
            .one(&self.db)
            .await
            .map_err(retrieve_error)?
            .map(Self::model_to_offering)
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn list_by_seller(&self, seller_id: SellerId) -> Result<Vec<Offering>, RepoError> {
        self.list_where(seller_game::Column::SellerId, seller_id.0)
            .await
    }

    async fn list_by_game(&self, game_id: GameId) -> Result<Vec<Offering>, RepoError> {
        self.list_where(seller_game::Column::GameId, game_id.0)
            .await
    }
}
