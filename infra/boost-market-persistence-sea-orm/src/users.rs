use std::{sync::Arc, time::Duration};

use boost_market_app::domain::{
    RepoCreateError, RepoRetrieveError, RepoUpdateError, UserId,
    user::{NewUser, User, UserRepository},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};

use crate::{create_error, entity::user, retrieve_error, update_error};

pub struct UserRepositoryImpl {
    db: DatabaseConnection,
    user_cache: Arc<moka::sync::Cache<UserId, User>>,
}

impl UserRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        let user_cache = Arc::new(
            moka::sync::Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(60 * 60))
                .build(),
        );
        Self { db, user_cache }
    }

    fn model_to_user(model: user::Model) -> User {
        User {
            id: UserId(model.id),
            email: model.email,
            user_name: model.user_name,
            password_hash: model.password_hash,
            full_name: model.full_name,
            joining_date: model.joining_date,
            age: model.age.map(|a| a as u32),
            date_of_birth: model.date_of_birth,
            about_info: model.about_info,
            cnic: model.cnic,
            credit_card_number: model.credit_card_number,
            profile_image: model.profile_image,
            hide_email: model.hide_email,
            is_staff: model.is_staff,
            is_active: model.is_active,
            is_superuser: model.is_superuser,
        }
    }

    fn user_to_model(user: &User) -> user::ActiveModel {
        user::ActiveModel {
            id: Set(user.id.0),
            email: Set(user.email.clone()),
            user_name: Set(user.user_name.clone()),
            password_hash: Set(user.password_hash.clone()),
            full_name: Set(user.full_name.clone()),
            joining_date: Set(user.joining_date),
            age: Set(user.age.map(|a| a as i32)),
            date_of_birth: Set(user.date_of_birth),
            about_info: Set(user.about_info.clone()),
            cnic: Set(user.cnic.clone()),
            credit_card_number: Set(user.credit_card_number.clone()),
            profile_image: Set(user.profile_image.clone()),
            hide_email: Set(user.hide_email),
            is_staff: Set(user.is_staff),
            is_active: Set(user.is_active),
            is_superuser: Set(user.is_superuser),
        }
    }

    async fn find_one(&self, column: user::Column, value: &str) -> Result<User, RepoRetrieveError> {
        let model = user::Entity::find()
            .filter(column.eq(value))
            .one(&self.db)
            .await
            .map_err(retrieve_error)?
            .ok_or(RepoRetrieveError::NotFound)?;
        let user = Self::model_to_user(model);
        self.user_cache.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create_user(&self, new_user: NewUser) -> Result<User, RepoCreateError> {
        // fill in the defaults the domain assigns to fresh accounts
        let mut active_model = Self::user_to_model(&new_user.into_user(UserId(0)));
        active_model.id = NotSet;
        let model = active_model.insert(&self.db).await.map_err(create_error)?;
        let user = Self::model_to_user(model);
        self.user_cache.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<User, RepoRetrieveError> {
        if let Some(cached) = self.user_cache.get(&id) {
            return Ok(cached);
        }
        let model = user::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(retrieve_error)?
            .ok_or(RepoRetrieveError::NotFound)?;
        let user = Self::model_to_user(model);
        self.user_cache.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, RepoRetrieveError> {
        self.find_one(user::Column::Email, email).await
    }

    async fn get_user_by_name(&self, user_name: &str) -> Result<User, RepoRetrieveError> {
        self.find_one(user::Column::UserName, user_name).await
    }

    async fn update_user(&self, user: &User) -> Result<(), RepoUpdateError> {
        self.user_cache.invalidate(&user.id);
        let exists = user::Entity::find_by_id(user.id.0)
            .one(&self.db)
            .await
            .map_err(update_error)?
            .is_some();
        if !exists {
            return Err(RepoUpdateError::NotFound);
        }
        Self::user_to_model(user)
            .update(&self.db)
            .await
            .map_err(update_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::test_db;

    fn new_user(email: &str, user_name: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            user_name: user_name.to_string(),
            password_hash: "hash".to_string(),
            joining_date: Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap(),
            is_staff: false,
            is_superuser: false,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = UserRepositoryImpl::new(test_db().await);
        let user = repo
            .create_user(new_user("sara@example.com", "sara"))
            .await
            .unwrap();
        assert_eq!(user.cnic, "XXXXX-XXXXXXX-X");
        assert!(user.hide_email);

        assert_eq!(repo.get_user(user.id).await.unwrap(), user);
        assert_eq!(repo.get_user_by_email("sara@example.com").await.unwrap(), user);
        assert_eq!(repo.get_user_by_name("sara").await.unwrap(), user);
        assert!(matches!(
            repo.get_user_by_name("ghost").await,
            Err(RepoRetrieveError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_unique_email_and_name() {
        let repo = UserRepositoryImpl::new(test_db().await);
        repo.create_user(new_user("sara@example.com", "sara"))
            .await
            .unwrap();
        assert!(matches!(
            repo.create_user(new_user("sara@example.com", "other")).await,
            Err(RepoCreateError::Conflict)
        ));
        assert!(matches!(
            repo.create_user(new_user("other@example.com", "sara")).await,
            Err(RepoCreateError::Conflict)
        ));
    }

    #[tokio::test]
    async fn test_update_refreshes_cache() {
        let repo = UserRepositoryImpl::new(test_db().await);
        let mut user = repo
            .create_user(new_user("sara@example.com", "sara"))
            .await
            .unwrap();
        repo.get_user(user.id).await.unwrap();

        user.full_name = "Sara Khan".to_string();
        user.age = Some(30);
        repo.update_user(&user).await.unwrap();
        assert_eq!(repo.get_user(user.id).await.unwrap().full_name, "Sara Khan");

        let mut ghost = user.clone();
        ghost.id = UserId(999);
        assert!(matches!(
            repo.update_user(&ghost).await,
            Err(RepoUpdateError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_superuser_found_by_login_email() {
        let repo = UserRepositoryImpl::new(test_db().await);
        let joined = Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap();
        let admin = repo
            .create_user(NewUser::superuser(
                "Admin@Example.COM",
                "admin",
                "hash".to_string(),
                joined,
            ))
            .await
            .unwrap();
        let login_email = boost_market_app::domain::user::normalize_email(" Admin@example.com");
        assert_eq!(repo.get_user_by_email(&login_email).await.unwrap(), admin);
        assert!(admin.is_staff && admin.is_superuser);
    }
}
