use chrono::{DateTime, Utc};

use crate::domain::{seller::Seller, user::User};

pub mod become_seller;
pub mod get_profile;
pub mod sellers;
pub mod login;
pub mod public_profile;
pub mod register;
pub mod update_profile;

pub const RECENT_BUYERS_SHOWN: usize = 3;

/// What anyone may see about a user.
#[derive(Clone, Debug, PartialEq)]
pub struct PublicProfile {
    pub user_name: String,
    pub full_name: String,
    /// `None` when the user hides their email.
    pub email: Option<String>,
    pub joining_date: DateTime<Utc>,
    pub age: Option<u32>,
    pub about_info: String,
    pub profile_image: String,
    pub seller: Option<SellerProfile>,
}

impl PublicProfile {
    pub fn new(user: &User, seller: Option<SellerProfile>) -> Self {
        Self {
            user_name: user.user_name.clone(),
            full_name: user.full_name.clone(),
            email: (!user.hide_email).then(|| user.email.clone()),
            joining_date: user.joining_date,
            age: user.age,
            about_info: user.about_info.clone(),
            profile_image: user.profile_image.clone(),
            seller,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SellerProfile {
    pub seller: Seller,
    pub starting_price: Option<u32>,
    pub total_orders: usize,
    /// User names of the most recent distinct buyers.
    pub recent_buyers: Vec<String>,
}
