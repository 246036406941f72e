//! Running average of the star ratings a profile has received.

use crate::profile::{CandidateProfile, MAX_RATING, MIN_STARS};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingError {
    /// A star value outside 1..=5 was submitted.
    #[error("rating must be between 1 and 5 stars, got {0}")]
    StarsOutOfRange(u8),
    #[error("rating count is already at its maximum")]
    CountOverflow,
}

/// Average rating and the number of ratings behind it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub rating: f64,
    pub rating_count: u32,
}

impl RatingSummary {
    /// Summary for a profile nobody has rated yet.
    pub fn unrated() -> Self {
        Self::default()
    }

    /// Read the summary stored on a profile.
    pub fn of(profile: &CandidateProfile) -> Self {
        Self {
            rating: profile.rating,
            rating_count: profile.rating_count,
        }
    }

    /// Fold one more star rating into the average.
    pub fn record(self, stars: u8) -> Result<Self, RatingError> {
        if !(1..=5).contains(&stars) {
            return Err(RatingError::StarsOutOfRange(stars));
        }
        let count = self
            .rating_count
            .checked_add(1)
            .ok_or(RatingError::CountOverflow)?;
        let total = self.rating * f64::from(self.rating_count) + f64::from(stars);
        let rating = (total / f64::from(count)).clamp(MIN_STARS, MAX_RATING);
        Ok(Self {
            rating,
            rating_count: count,
        })
    }

    /// Write the summary back onto a profile.
    pub fn apply_to(self, profile: &mut CandidateProfile) {
        profile.rating = self.rating;
        profile.rating_count = self.rating_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_rating_sets_average() {
        let summary = RatingSummary::unrated().record(4).unwrap();
        assert_eq!(summary.rating, 4.0);
        assert_eq!(summary.rating_count, 1);
    }

    #[test]
    fn averages_across_ratings() {
        let summary = RatingSummary::unrated()
            .record(5)
            .and_then(|s| s.record(3))
            .and_then(|s| s.record(4))
            .unwrap();
        assert!((summary.rating - 4.0).abs() < 1e-9);
        assert_eq!(summary.rating_count, 3);
    }

    #[test]
    fn rejects_out_of_range_stars() {
        assert_eq!(
            RatingSummary::unrated().record(0),
            Err(RatingError::StarsOutOfRange(0))
        );
        assert_eq!(
            RatingSummary::unrated().record(6),
            Err(RatingError::StarsOutOfRange(6))
        );
    }

    #[test]
    fn saturated_count_is_an_error() {
        let summary = RatingSummary {
            rating: 4.0,
            rating_count: u32::MAX,
        };
        assert_eq!(summary.record(5), Err(RatingError::CountOverflow));
    }

    #[test]
    fn applied_summary_keeps_profile_valid() {
        let mut profile = CandidateProfile::new("u1", vec!["Chess".into()]);
        RatingSummary::of(&profile)
            .record(2)
            .unwrap()
            .apply_to(&mut profile);
        assert_eq!(profile.rating_count, 1);
        assert!(profile.validate().is_ok());
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: any sequence of valid ratings keeps the average within 1..=5.
        #[test]
        fn average_stays_in_star_range(stars in prop::collection::vec(1u8..=5, 1..40)) {
            let mut summary = RatingSummary::unrated();
            for s in &stars {
                summary = summary.record(*s).unwrap();
            }
            prop_assert_eq!(summary.rating_count as usize, stars.len());
            prop_assert!((MIN_STARS..=MAX_RATING).contains(&summary.rating));
        }
    }
}
