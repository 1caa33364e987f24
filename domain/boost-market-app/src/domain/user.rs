use chrono::{DateTime, Utc};
use validator::Validate;

use crate::domain::{RepoCreateError, RepoRetrieveError, RepoUpdateError, UserId};

pub const DEFAULT_PROFILE_IMAGE: &str = "avatar.png";
pub const DEFAULT_CNIC: &str = "XXXXX-XXXXXXX-X";

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_AGE: u32 = 120;

#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub user_name: String,
    pub password_hash: String,
    pub full_name: String,
    pub joining_date: DateTime<Utc>,
    pub age: Option<u32>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub about_info: String,
    pub cnic: String,
    pub credit_card_number: String,
    pub profile_image: String,
    pub hide_email: bool,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_superuser: bool,
}

impl User {
    /// Re-derives `age` from the date of birth, if one is set.
    pub fn refresh_age(&mut self, now: DateTime<Utc>) {
        if let Some(date_of_birth) = self.date_of_birth {
            self.age = Some(age_from_date_of_birth(date_of_birth, now));
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub user_name: String,
    pub password_hash: String,
    pub joining_date: DateTime<Utc>,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewUser {
    /// A staff superuser account, with the e-mail normalized the way login
    /// looks it up.
    pub fn superuser(
        email: &str,
        user_name: &str,
        password_hash: String,
        joining_date: DateTime<Utc>,
    ) -> Self {
        Self {
            email: normalize_email(email),
            user_name: user_name.trim().to_string(),
            password_hash,
            joining_date,
            is_staff: true,
            is_superuser: true,
        }
    }

    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            email: self.email,
            user_name: self.user_name,
            password_hash: self.password_hash,
            full_name: String::new(),
            joining_date: self.joining_date,
            age: None,
            date_of_birth: None,
            about_info: String::new(),
            cnic: DEFAULT_CNIC.to_string(),
            credit_card_number: String::new(),
            profile_image: DEFAULT_PROFILE_IMAGE.to_string(),
            hide_email: true,
            is_staff: self.is_staff,
            is_active: true,
            is_superuser: self.is_superuser,
        }
    }
}

#[async_trait::async_trait]
pub trait UserRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, RepoCreateError>;
    async fn get_user(&self, id: UserId) -> Result<User, RepoRetrieveError>;
    async fn get_user_by_email(&self, email: &str) -> Result<User, RepoRetrieveError>;
    async fn get_user_by_name(&self, user_name: &str) -> Result<User, RepoRetrieveError>;
    async fn update_user(&self, user: &User) -> Result<(), RepoUpdateError>;
}

/// Whole calendar years between the date of birth and `now`.
pub fn age_from_date_of_birth(date_of_birth: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    now.date_naive()
        .years_since(date_of_birth.date_naive())
        .unwrap_or(0)
}

/// Trims the address and lower-cases the domain part.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[derive(Validate)]
pub struct Registration {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(
        min = 1,
        max = 50,
        message = "User name must be between 1 and 50 characters"
    ))]
    pub user_name: String,
    #[validate(length(min = 8, message = "Password must contain at least 8 characters"))]
    pub password: String,
    pub password_confirmation: String,
}

impl Registration {
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())?;
        if self.password != self.password_confirmation {
            return Err("Passwords did not match".to_string());
        }
        check_password_strength(&self.password, &self.user_name, &self.email)
    }
}

/// Rejects passwords that are entirely numeric or that contain the user name
/// or the local part of the email address.
pub fn check_password_strength(password: &str, user_name: &str, email: &str) -> Result<(), String> {
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("Password cannot be entirely numeric".to_string());
    }
    let lowered = password.to_lowercase();
    let user_name = user_name.trim().to_lowercase();
    if user_name.len() >= 3 && lowered.contains(&user_name) {
        return Err("Password is too similar to the user name".to_string());
    }
    let local_part = email.split('@').next().unwrap_or_default().to_lowercase();
    if local_part.len() >= 3 && lowered.contains(&local_part) {
        return Err("Password is too similar to the email address".to_string());
    }
    Ok(())
}
