use std::cmp::Ordering;

use crate::domain::{
    RepoError, RepoRetrieveError, RepoUpdateError, SellerId, UserId, rating::DEFAULT_RATING,
};

pub const DEFAULT_REQUIREMENTS_CHANGE_WINDOW_HOURS: u32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum BadgeRank {
    #[default]
    Bronze,
    Silver,
    Gold,
    Master,
}

impl BadgeRank {
    pub const ALL: [BadgeRank; 4] = [
        BadgeRank::Bronze,
        BadgeRank::Silver,
        BadgeRank::Gold,
        BadgeRank::Master,
    ];

    pub fn ordinal(self) -> i32 {
        match self {
            BadgeRank::Bronze => 0,
            BadgeRank::Silver => 1,
            BadgeRank::Gold => 2,
            BadgeRank::Master => 3,
        }
    }

    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.ordinal() == ordinal)
    }

    pub fn label(self) -> &'static str {
        match self {
            BadgeRank::Bronze => "Bronze",
            BadgeRank::Silver => "Silver",
            BadgeRank::Gold => "Gold",
            BadgeRank::Master => "Master",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.label().eq_ignore_ascii_case(label.trim()))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Seller {
    pub id: SellerId,
    pub user_id: UserId,
    pub rating: f64,
    pub clicks: u64,
    pub number_of_games: u32,
    pub requirements_change_window_hours: u32,
    pub badge: BadgeRank,
}

impl Seller {
    pub fn new(id: SellerId, user_id: UserId) -> Self {
        Self {
            id,
            user_id,
            rating: DEFAULT_RATING,
            clicks: 0,
            number_of_games: 0,
            requirements_change_window_hours: DEFAULT_REQUIREMENTS_CHANGE_WINDOW_HOURS,
            badge: BadgeRank::default(),
        }
    }
}

/// A seller together with the public name of the user it wraps.
#[derive(Clone, Debug, PartialEq)]
pub struct SellerSummary {
    pub seller: Seller,
    pub user_name: String,
}

#[async_trait::async_trait]
pub trait SellerRepository {
    async fn get_or_create_seller(&self, user_id: UserId) -> Result<Seller, RepoError>;
    async fn get_seller(&self, id: SellerId) -> Result<Seller, RepoRetrieveError>;
    async fn get_seller_by_user(&self, user_id: UserId) -> Result<Seller, RepoRetrieveError>;
    async fn list_sellers(&self, name_filter: Option<&str>) -> Result<Vec<SellerSummary>, RepoError>;
    async fn set_rating(&self, id: SellerId, rating: f64) -> Result<(), RepoUpdateError>;
    async fn set_number_of_games(&self, id: SellerId, count: u32) -> Result<(), RepoUpdateError>;
    async fn set_badge(&self, id: SellerId, badge: BadgeRank) -> Result<(), RepoUpdateError>;
    async fn increment_clicks(&self, id: SellerId) -> Result<(), RepoUpdateError>;
}

/// Highest rated first, ties broken by the number of games offered.
pub fn compare_sellers(a: &Seller, b: &Seller) -> Ordering {
    b.rating
        .total_cmp(&a.rating)
        .then_with(|| b.number_of_games.cmp(&a.number_of_games))
}

pub fn sort_sellers(sellers: &mut [SellerSummary]) {
    sellers.sort_by(|a, b| compare_sellers(&a.seller, &b.seller));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: i64, rating: f64, number_of_games: u32) -> SellerSummary {
        let mut seller = Seller::new(SellerId(id), UserId(id));
        seller.rating = rating;
        seller.number_of_games = number_of_games;
        SellerSummary {
            seller,
            user_name: format!("seller{}", id),
        }
    }

    #[test]
    fn test_new_seller_defaults() {
        let seller = Seller::new(SellerId(1), UserId(7));
        assert_eq!(seller.rating, DEFAULT_RATING);
        assert_eq!(seller.badge, BadgeRank::Bronze);
        assert_eq!(seller.requirements_change_window_hours, 8);
        assert_eq!(seller.clicks, 0);
    }

    #[test]
    fn test_badge_ordinals() {
        for badge in BadgeRank::ALL {
            assert_eq!(BadgeRank::from_ordinal(badge.ordinal()), Some(badge));
            assert_eq!(BadgeRank::from_label(badge.label()), Some(badge));
        }
        assert_eq!(BadgeRank::from_ordinal(4), None);
        assert_eq!(BadgeRank::from_label(" gold "), Some(BadgeRank::Gold));
        assert!(BadgeRank::Master > BadgeRank::Bronze);
    }

    #[test]
    fn test_sort_sellers() {
        let mut sellers = vec![summary(1, 3.0, 1), summary(2, 4.5, 0), summary(3, 3.0, 4)];
        sort_sellers(&mut sellers);
        let ids: Vec<i64> = sellers.iter().map(|s| s.seller.id.0).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
