use std::collections::HashMap;

use boost_market_app::domain::{
    RepoError, RepoRetrieveError, RepoUpdateError, SellerId, UserId,
    seller::{BadgeRank, Seller, SellerRepository, SellerSummary},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ExprTrait, QueryFilter,
    QueryOrder, Set, prelude::Expr,
};

use crate::{
    entity::{seller, user},
    is_unique_violation, repo_error, retrieve_error, update_error,
};

pub struct SellerRepositoryImpl {
    db: DatabaseConnection,
}

impl SellerRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_seller(model: seller::Model) -> Seller {
        Seller {
            id: SellerId(model.id),
            user_id: UserId(model.user_id),
            rating: model.rating,
            clicks: model.clicks as u64,
            number_of_games: model.number_of_games as u32,
            requirements_change_window_hours: model.requirements_change_window_hours as u32,
            badge: BadgeRank::from_ordinal(model.badge).unwrap_or_default(),
        }
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Seller>, RepoError> {
        let model = seller::Entity::find()
            .filter(seller::Column::UserId.eq(user_id.0))
            .one(&self.db)
            .await
            .map_err(repo_error)?;
        Ok(model.map(Self::model_to_seller))
    }

    async fn update_column(
        &self,
        id: SellerId,
        column: seller::Column,
        value: Expr,
    ) -> Result<(), RepoUpdateError> {
        let result = seller::Entity::update_many()
            .col_expr(column, value)
            .filter(seller::Column::Id.eq(id.0))
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
impl SellerRepository for SellerRepositoryImpl {
    async fn get_or_create_seller(&self, user_id: UserId) -> Result<Seller, RepoError> {
        if let Some(seller) = self.find_by_user(user_id).await? {
            return Ok(seller);
        }
        let defaults = Seller::new(SellerId(0), user_id);
        let active_model = seller::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            user_id: Set(user_id.0),
            rating: Set(defaults.rating),
            clicks: Set(0),
            number_of_games: Set(0),
            requirements_change_window_hours: Set(defaults.requirements_change_window_hours as i32),
            badge: Set(defaults.badge.ordinal()),
        };
        match active_model.insert(&self.db).await {
            Ok(model) => Ok(Self::model_to_seller(model)),
            // created concurrently
            Err(e) if is_unique_violation(&e) => self
                .find_by_user(user_id)
                .await?
                .ok_or_else(|| RepoError::StorageError(e.to_string())),
            Err(e) => Err(repo_error(e)),
        }
    }

    async fn get_seller(&self, id: SellerId) -> Result<Seller, RepoRetrieveError> {
        seller::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(retrieve_error)?
            .map(Self::model_to_seller)
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn get_seller_by_user(&self, user_id: UserId) -> Result<Seller, RepoRetrieveError> {
        match self.find_by_user(user_id).await {
            Ok(Some(seller)) => Ok(seller),
            Ok(None) => Err(RepoRetrieveError::NotFound),
            Err(RepoError::StorageError(e)) => Err(RepoRetrieveError::StorageError(e)),
        }
    }

    async fn list_sellers(&self, name_filter: Option<&str>) -> Result<Vec<SellerSummary>, RepoError> {
        let mut user_query = user::Entity::find();
        if let Some(name) = name_filter.map(str::trim).filter(|n| !n.is_empty()) {
            user_query = user_query.filter(user::Column::UserName.contains(name));
        }
        let sellers = seller::Entity::find()
            .order_by_asc(seller::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_error)?;
        let user_names: HashMap<i64, String> = user_query
            .filter(user::Column::Id.is_in(sellers.iter().map(|s| s.user_id)))
            .all(&self.db)
            .await
            .map_err(repo_error)?
            .into_iter()
            .map(|u| (u.id, u.user_name))
            .collect();

        Ok(sellers
            .into_iter()
            .filter_map(|model| {
                let user_name = user_names.get(&model.user_id)?.clone();
                Some(SellerSummary {
                    seller: Self::model_to_seller(model),
                    user_name,
                })
            })
            .collect())
    }

    async fn set_rating(&self, id: SellerId, rating: f64) -> Result<(), RepoUpdateError> {
        self.update_column(id, seller::Column::Rating, Expr::value(rating))
            .await
    }

    async fn set_number_of_games(&self, id: SellerId, count: u32) -> Result<(), RepoUpdateError> {
        self.update_column(id, seller::Column::NumberOfGames, Expr::value(count as i32))
            .await
    }

    async fn set_badge(&self, id: SellerId, badge: BadgeRank) -> Result<(), RepoUpdateError> {
        self.update_column(id, seller::Column::Badge, Expr::value(badge.ordinal()))
            .await
    }

    async fn increment_clicks(&self, id: SellerId) -> Result<(), RepoUpdateError> {
        self.update_column(
            id,
            seller::Column::Clicks,
            Expr::col(seller::Column::Clicks).add(1),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use boost_market_app::domain::{
        rating::DEFAULT_RATING,
        user::{NewUser, UserRepository},
    };
    use chrono::Utc;

    use super::*;
    use crate::{test_db, users::UserRepositoryImpl};

    async fn seed_user(db: &DatabaseConnection, user_name: &str) -> UserId {
        let users = UserRepositoryImpl::new(db.clone());
        let user = users
            .create_user(NewUser {
                email: format!("{}@example.com", user_name),
                user_name: user_name.to_string(),
                password_hash: "hash".to_string(),
                joining_date: Utc::now(),
                is_staff: false,
                is_superuser: false,
            })
            .await
            .unwrap();
        user.id
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let db = test_db().await;
        let user_id = seed_user(&db, "booster").await;
        let repo = SellerRepositoryImpl::new(db);

        let seller = repo.get_or_create_seller(user_id).await.unwrap();
        assert_eq!(seller.rating, DEFAULT_RATING);
        assert_eq!(seller.badge, BadgeRank::Bronze);
        assert_eq!(repo.get_or_create_seller(user_id).await.unwrap(), seller);
        assert_eq!(repo.get_seller_by_user(user_id).await.unwrap(), seller);
    }

    #[tokio::test]
    async fn test_column_updates() {
        let db = test_db().await;
        let user_id = seed_user(&db, "booster").await;
        let repo = SellerRepositoryImpl::new(db);
        let seller = repo.get_or_create_seller(user_id).await.unwrap();

        repo.set_rating(seller.id, 4.5).await.unwrap();
        repo.set_badge(seller.id, BadgeRank::Master).await.unwrap();
        repo.set_number_of_games(seller.id, 3).await.unwrap();
        repo.increment_clicks(seller.id).await.unwrap();
        repo.increment_clicks(seller.id).await.unwrap();

        let seller = repo.get_seller(seller.id).await.unwrap();
        assert_eq!(seller.rating, 4.5);
        assert_eq!(seller.badge, BadgeRank::Master);
        assert_eq!(seller.number_of_games, 3);
        assert_eq!(seller.clicks, 2);

        assert!(matches!(
            repo.increment_clicks(SellerId(999)).await,
            Err(RepoUpdateError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_sellers_by_name() {
        let db = test_db().await;
        let repo = SellerRepositoryImpl::new(db.clone());
        for name in ["AceBooster", "slowpoke", "boostqueen"] {
            let user_id = seed_user(&db, name).await;
            repo.get_or_create_seller(user_id).await.unwrap();
        }
        seed_user(&db, "not-a-seller-boost").await;

        let all = repo.list_sellers(None).await.unwrap();
        assert_eq!(all.len(), 3);
        let boosters: Vec<String> = repo
            .list_sellers(Some("boost"))
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.user_name)
            .collect();
        assert_eq!(boosters, vec!["AceBooster", "boostqueen"]);
    }
}
