use std::sync::Arc;

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    domain::{
        RepoRetrieveError, RepoUpdateError, UserId,
        user::{MIN_PASSWORD_LENGTH, User, UserRepository},
    },
    ports::password::PasswordHasher,
};

/// Requested profile changes. Absent or blank fields keep their stored value.
#[derive(Clone, Debug, Default, Validate)]
pub struct ProfileChanges {
    #[validate(length(max = 50, message = "Full name cannot exceed 50 characters"))]
    pub full_name: Option<String>,
    #[validate(length(max = 15, message = "CNIC cannot exceed 15 characters"))]
    pub cnic: Option<String>,
    #[validate(length(max = 24, message = "Credit card number cannot exceed 24 characters"))]
    pub credit_card_number: Option<String>,
    #[validate(range(max = 120, message = "Age cannot exceed 120"))]
    pub age: Option<u32>,
    pub date_of_birth: Option<DateTime<Utc>>,
    #[validate(length(max = 500, message = "About info cannot exceed 500 characters"))]
    pub about_info: Option<String>,
    pub profile_image: Option<String>,
    pub hide_email: Option<bool>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

#[async_trait::async_trait]
pub trait UpdateProfileUseCase {
    async fn update_profile(
        &self,
        user_id: UserId,
        changes: ProfileChanges,
    ) -> Result<User, UpdateProfileError>;
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateProfileError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Your old password was entered incorrectly")]
    IncorrectPassword,
    #[error("User not found")]
    NotFound,
    #[error("Could not update the profile")]
    RepositoryError,
}

pub struct UpdateProfileUseCaseImpl<U: UserRepository, P: PasswordHasher> {
    user_repository: Arc<U>,
    password_hasher: Arc<P>,
}

impl<U: UserRepository, P: PasswordHasher> UpdateProfileUseCaseImpl<U, P> {
    pub fn new(user_repository: Arc<U>, password_hasher: Arc<P>) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    fn change_password(&self, user: &mut User, changes: &ProfileChanges) -> Result<(), UpdateProfileError> {
        let new_password = non_blank(&changes.new_password);
        let confirm_password = non_blank(&changes.confirm_password);
        if new_password != confirm_password {
            return Err(UpdateProfileError::InvalidInput(
                "Passwords did not match".to_string(),
            ));
        }
        let Some(current_password) = non_blank(&changes.current_password) else {
            if new_password.is_some() {
                return Err(UpdateProfileError::InvalidInput(
                    "Current password is required to set a new password".to_string(),
                ));
            }
            return Ok(());
        };
        if !self
            .password_hasher
            .verify_password(current_password, &user.password_hash)
        {
            return Err(UpdateProfileError::IncorrectPassword);
        }
        let new_password = new_password.unwrap_or_default();
        if new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(UpdateProfileError::InvalidInput(format!(
                "Password must contain at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        user.password_hash = self.password_hasher.hash_password(new_password).map_err(|e| {
            log::error!("{}", e);
            UpdateProfileError::RepositoryError
        })?;
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn overwrite(target: &mut String, value: &Option<String>) {
    if let Some(value) = non_blank(value) {
        *target = value.to_string();
    }
}

#[async_trait::async_trait]
impl<U: UserRepository + Send + Sync + 'static, P: PasswordHasher + Send + Sync + 'static>
    UpdateProfileUseCase for UpdateProfileUseCaseImpl<U, P>
{
    async fn update_profile(
        &self,
        user_id: UserId,
        changes: ProfileChanges,
    ) -> Result<User, UpdateProfileError> {
        changes
            .validate()
            .map_err(|e| UpdateProfileError::InvalidInput(e.to_string()))?;

        let mut user = match self.user_repository.get_user(user_id).await {
            Ok(user) => user,
            Err(RepoRetrieveError::NotFound) => return Err(UpdateProfileError::NotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve user {}: {}", user_id, e);
                return Err(UpdateProfileError::RepositoryError);
            }
        };

        overwrite(&mut user.full_name, &changes.full_name);
        overwrite(&mut user.cnic, &changes.cnic);
        overwrite(&mut user.credit_card_number, &changes.credit_card_number);
        overwrite(&mut user.about_info, &changes.about_info);
        overwrite(&mut user.profile_image, &changes.profile_image);
        if let Some(age) = changes.age {
            user.age = Some(age);
        }
        if let Some(date_of_birth) = changes.date_of_birth {
            user.date_of_birth = Some(date_of_birth);
        }
        if let Some(hide_email) = changes.hide_email {
            user.hide_email = hide_email;
        }
        self.change_password(&mut user, &changes)?;
        user.refresh_age(Utc::now());

        match self.user_repository.update_user(&user).await {
            Ok(()) => Ok(user),
            Err(RepoUpdateError::NotFound) => Err(UpdateProfileError::NotFound),
            Err(RepoUpdateError::Conflict) | Err(RepoUpdateError::StorageError(_)) => {
                log::error!("Failed to update profile of user {}", user_id);
                Err(UpdateProfileError::RepositoryError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::testing::{FakePasswordHasher, InMemoryStore};

    async fn setup() -> (
        Arc<InMemoryStore>,
        User,
        UpdateProfileUseCaseImpl<InMemoryStore, FakePasswordHasher>,
    ) {
        let store = Arc::new(InMemoryStore::new());
        let user = store.seed_user("sara", "old-password", false).await;
        let use_case = UpdateProfileUseCaseImpl::new(store.clone(), Arc::new(FakePasswordHasher));
        (store, user, use_case)
    }

    #[tokio::test]
    async fn test_non_empty_fields_overwrite() {
        let (store, user, use_case) = setup().await;
        let changes = ProfileChanges {
            full_name: Some("Sara Khan".to_string()),
            about_info: Some("   ".to_string()),
            cnic: Some(String::new()),
            hide_email: Some(false),
            age: Some(31),
            ..Default::default()
        };
        let updated = use_case.update_profile(user.id, changes).await.unwrap();

        assert_eq!(updated.full_name, "Sara Khan");
        assert_eq!(updated.about_info, "");
        assert_eq!(updated.cnic, "XXXXX-XXXXXXX-X");
        assert!(!updated.hide_email);
        assert_eq!(updated.age, Some(31));
        assert_eq!(store.get_user(user.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_date_of_birth_derives_age() {
        let (_, user, use_case) = setup().await;
        let dob = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
        let changes = ProfileChanges {
            age: Some(3),
            date_of_birth: Some(dob),
            ..Default::default()
        };
        let updated = use_case.update_profile(user.id, changes).await.unwrap();
        assert!(updated.age.unwrap() >= 34);
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_values() {
        let (_, user, use_case) = setup().await;
        let changes = ProfileChanges {
            age: Some(121),
            ..Default::default()
        };
        let result = use_case.update_profile(user.id, changes).await;
        assert!(matches!(result, Err(UpdateProfileError::InvalidInput(_))));

        let changes = ProfileChanges {
            full_name: Some("x".repeat(51)),
            ..Default::default()
        };
        let result = use_case.update_profile(user.id, changes).await;
        assert!(matches!(result, Err(UpdateProfileError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_password_change() {
        let (store, user, use_case) = setup().await;

        let wrong_current = ProfileChanges {
            current_password: Some("not-it".to_string()),
            new_password: Some("brand-new-pw".to_string()),
            confirm_password: Some("brand-new-pw".to_string()),
            ..Default::default()
        };
        let result = use_case.update_profile(user.id, wrong_current).await;
        assert!(matches!(result, Err(UpdateProfileError::IncorrectPassword)));

        let too_short = ProfileChanges {
            current_password: Some("old-password".to_string()),
            new_password: Some("short".to_string()),
            confirm_password: Some("short".to_string()),
            ..Default::default()
        };
        let result = use_case.update_profile(user.id, too_short).await;
        assert!(matches!(result, Err(UpdateProfileError::InvalidInput(_))));

        let valid = ProfileChanges {
            current_password: Some("old-password".to_string()),
            new_password: Some("brand-new-pw".to_string()),
            confirm_password: Some("brand-new-pw".to_string()),
            ..Default::default()
        };
        use_case.update_profile(user.id, valid).await.unwrap();
        let stored = store.get_user(user.id).await.unwrap();
        assert_eq!(stored.password_hash, "plain:brand-new-pw");
    }

    #[tokio::test]
    async fn test_mismatched_confirmation_rejected_without_current_password() {
        let (store, user, use_case) = setup().await;
        let changes = ProfileChanges {
            full_name: Some("Sara Khan".to_string()),
            new_password: Some("brand-new-pw".to_string()),
            confirm_password: Some("brand-new-px".to_string()),
            ..Default::default()
        };
        let result = use_case.update_profile(user.id, changes).await;
        assert!(matches!(result, Err(UpdateProfileError::InvalidInput(_))));
        assert_eq!(store.get_user(user.id).await.unwrap().full_name, "");
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let (_, _, use_case) = setup().await;
        let result = use_case
            .update_profile(UserId(999), ProfileChanges::default())
            .await;
        assert!(matches!(result, Err(UpdateProfileError::NotFound)));
    }
}
