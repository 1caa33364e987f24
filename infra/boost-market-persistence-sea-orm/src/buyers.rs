use boost_market_app::domain::{
    BuyerId, RepoError, RepoRetrieveError, UserId,
    buyer::{Buyer, BuyerRepository},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};

use crate::{entity::buyer, is_unique_violation, repo_error, retrieve_error};

pub struct BuyerRepositoryImpl {
    db: DatabaseConnection,
}

impl BuyerRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_buyer(model: buyer::Model) -> Buyer {
        Buyer {
            id: BuyerId(model.id),
            user_id: UserId(model.user_id),
        }
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Buyer>, sea_orm::DbErr> {
        let model = buyer::Entity::find()
            .filter(buyer::Column::UserId.eq(user_id.0))
            .one(&self.db)
            .await?;
        Ok(model.map(Self::model_to_buyer))
    }
}

#[async_trait::async_trait]
impl BuyerRepository for BuyerRepositoryImpl {
    async fn get_or_create_buyer(&self, user_id: UserId) -> Result<Buyer, RepoError> {
        if let Some(buyer) = self.find_by_user(user_id).await.map_err(repo_error)? {
            return Ok(buyer);
        }
        let active_model = buyer::ActiveModel {
            id: NotSet,
            user_id: Set(user_id.0),
        };
        match active_model.insert(&self.db).await {
            Ok(model) => Ok(Self::model_to_buyer(model)),
            Err(e) if is_unique_violation(&e) => self
                .find_by_user(user_id)
                .await
                .map_err(repo_error)?
                .ok_or_else(|| repo_error(e)),
            Err(e) => Err(repo_error(e)),
        }
    }

    async fn get_buyer(&self, id: BuyerId) -> Result<Buyer, RepoRetrieveError> {
        buyer::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(retrieve_error)?
            .map(Self::model_to_buyer)
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn get_buyer_by_user(&self, user_id: UserId) -> Result<Buyer, RepoRetrieveError> {
        self.find_by_user(user_id)
            .await
            .map_err(retrieve_error)?
            .ok_or(RepoRetrieveError::NotFound)
    }
}
