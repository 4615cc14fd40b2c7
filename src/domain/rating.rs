//! Feedback rating value object and the derived average-rating aggregate.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_DISPLAY_RATING, MAX_RATING, MIN_RATING};
use crate::errors::{AppError, AppResult};

/// A rating guaranteed to lie in `MIN_RATING..=MAX_RATING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(i32);

impl Rating {
    pub fn new(value: i32) -> AppResult<Self> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AppError::validation(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )))
        }
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Rating {
    type Error = AppError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Mean of the given ratings, `None` for an empty set.
pub fn average_rating(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let total: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    Some(total as f64 / ratings.len() as f64)
}

/// Presentation value: the average, or the display default when nothing was received.
pub fn display_rating(average: Option<f64>) -> f64 {
    average.unwrap_or(DEFAULT_DISPLAY_RATING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(5).is_ok());
        assert!(matches!(Rating::new(0), Err(AppError::Validation(_))));
        assert!(matches!(Rating::new(6), Err(AppError::Validation(_))));
        assert!(Rating::new(-3).is_err());
    }

    #[test]
    fn test_average_of_empty_set_is_undefined() {
        assert_eq!(average_rating(&[]), None);
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[4, 5, 3]), Some(4.0));
        assert_eq!(average_rating(&[1, 2]), Some(1.5));
    }

    #[test]
    fn test_display_default() {
        assert_eq!(display_rating(None), 5.0);
        assert_eq!(display_rating(Some(2.5)), 2.5);
    }

    #[test]
    fn test_rating_deserialization_is_checked() {
        assert!(serde_json::from_str::<Rating>("3").is_ok());
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }
}
