/// Rating given to sellers and games before any review exists: the midpoint
/// of the `MIN_RATING..=MAX_RATING` scale.
pub const DEFAULT_RATING: f64 = 2.5;
pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

/// Id and rating of a rated entity, as exposed by the rating API.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatingEntry {
    pub id: i64,
    pub rating: f64,
}

pub trait RatingService {
    /// Aggregate after a review with `saved_rating` was stored. `ratings`
    /// holds every review rating of the seller or game, including the saved
    /// one.
    fn aggregate_after_save(&self, ratings: &[f64], saved_rating: f64) -> f64;
    /// Aggregate after a review was removed.
    fn aggregate_after_removal(&self, remaining: &[f64]) -> f64;
}

pub struct AverageRatingService;

impl AverageRatingService {
    pub fn new() -> Self {
        Self
    }
}

impl RatingService for AverageRatingService {
    fn aggregate_after_save(&self, ratings: &[f64], saved_rating: f64) -> f64 {
        average(ratings).unwrap_or(saved_rating)
    }

    fn aggregate_after_removal(&self, remaining: &[f64]) -> f64 {
        average(remaining).unwrap_or(DEFAULT_RATING)
    }
}

pub fn average(ratings: &[f64]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
}

pub fn is_valid_rating(rating: f64) -> bool {
    rating.is_finite() && (MIN_RATING..=MAX_RATING).contains(&rating)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average() {
        assert_eq!(average(&[]), None);
        assert_eq!(average(&[4.0]), Some(4.0));
        assert_eq!(average(&[1.0, 2.0, 4.5]), Some(2.5));
    }

    #[test]
    fn test_aggregate_after_save_falls_back_to_saved_rating() {
        let service = AverageRatingService::new();
        assert_eq!(service.aggregate_after_save(&[], 4.0), 4.0);
        assert_eq!(service.aggregate_after_save(&[4.0, 2.0], 4.0), 3.0);
    }

    #[test]
    fn test_aggregate_after_removal_resets_to_default() {
        let service = AverageRatingService::new();
        assert_eq!(service.aggregate_after_removal(&[]), DEFAULT_RATING);
        assert_eq!(service.aggregate_after_removal(&[5.0, 4.0]), 4.5);
    }

    #[test]
    fn test_rating_bounds() {
        assert!(is_valid_rating(0.0));
        assert!(is_valid_rating(5.0));
        assert!(is_valid_rating(3.5));
        assert!(!is_valid_rating(5.01));
        assert!(!is_valid_rating(-1.0));
        assert!(!is_valid_rating(f64::NAN));
    }
}
