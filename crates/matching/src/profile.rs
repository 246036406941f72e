//! Candidate profile data model and pool-entry validation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest average rating a profile can carry.
pub const MAX_RATING: f64 = 5.0;
/// Lowest star value a single rating can contribute.
pub const MIN_STARS: f64 = 1.0;

/// Stable, opaque identifier of a user profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub String);

impl ProfileId {
    /// Create an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProfileId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProfileId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Reasons a raw pool entry cannot take part in ranking.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("profile entry has no id")]
    MissingId,
    #[error("profile {0} has neither skills nor rating")]
    MissingRankingFields(ProfileId),
    #[error("profile {id} has rating {rating} outside 0.0..=5.0")]
    RatingOutOfRange { id: ProfileId, rating: f64 },
    #[error("profile {id} has rating {rating} with {count} ratings")]
    InconsistentRating {
        id: ProfileId,
        rating: f64,
        count: u32,
    },
}

/// A profile document exactly as the backend hands it over.
///
/// Every field is optional because documents written by older app versions
/// may lack any of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCandidate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "fullName")]
    pub name: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub rating_count: Option<u32>,
}

/// A validated profile eligible for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    /// Stable identifier.
    pub id: ProfileId,
    /// Display name; may be empty.
    #[serde(default)]
    pub name: String,
    /// Skills this user offers, in the order they listed them.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Average rating in `0.0..=5.0`; `0.0` when unrated.
    #[serde(default)]
    pub rating: f64,
    /// Number of ratings behind `rating`.
    #[serde(default)]
    pub rating_count: u32,
}

impl CandidateProfile {
    /// Build an unrated profile.
    pub fn new(id: impl Into<ProfileId>, skills: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            skills,
            rating: 0.0,
            rating_count: 0,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the rating aggregate.
    pub fn with_rating(mut self, rating: f64, rating_count: u32) -> Self {
        self.rating = rating;
        self.rating_count = rating_count;
        self
    }

    /// Check the rating invariant: unrated profiles sit at exactly zero and
    /// rated ones hold an average of 1..=5 star contributions.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.id.as_str().trim().is_empty() {
            return Err(ProfileError::MissingId);
        }
        if !self.rating.is_finite() || !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(ProfileError::RatingOutOfRange {
                id: self.id.clone(),
                rating: self.rating,
            });
        }
        let consistent = match self.rating_count {
            0 => self.rating == 0.0,
            _ => self.rating >= MIN_STARS,
        };
        if !consistent {
            return Err(ProfileError::InconsistentRating {
                id: self.id.clone(),
                rating: self.rating,
                count: self.rating_count,
            });
        }
        Ok(())
    }
}

impl TryFrom<RawCandidate> for CandidateProfile {
    type Error = ProfileError;

    fn try_from(raw: RawCandidate) -> Result<Self, Self::Error> {
        let id = match raw.id {
            Some(id) if !id.trim().is_empty() => ProfileId(id),
            _ => return Err(ProfileError::MissingId),
        };
        if raw.skills.is_none() && raw.rating.is_none() {
            return Err(ProfileError::MissingRankingFields(id));
        }
        let profile = CandidateProfile {
            id,
            name: raw.name.unwrap_or_default(),
            skills: raw.skills.unwrap_or_default(),
            rating: raw.rating.unwrap_or(0.0),
            rating_count: raw.rating_count.unwrap_or(0),
        };
        profile.validate()?;
        Ok(profile)
    }
}

/// The user running discovery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
    pub id: ProfileId,
    /// Skills the viewer wants to learn.
    #[serde(default)]
    pub interested_skills: Vec<String>,
}

impl Viewer {
    pub fn new(id: impl Into<ProfileId>, interested_skills: Vec<String>) -> Self {
        Self {
            id: id.into(),
            interested_skills,
        }
    }
}

/// Convert a batch of raw entries, splitting valid profiles from rejects.
///
/// Order of the valid profiles follows the input.
pub fn sanitize_pool(
    raw: impl IntoIterator<Item = RawCandidate>,
) -> (Vec<CandidateProfile>, Vec<ProfileError>) {
    let mut valid = Vec::new();
    let mut rejected = Vec::new();
    for entry in raw {
        match CandidateProfile::try_from(entry) {
            Ok(profile) => valid.push(profile),
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed candidate");
                rejected.push(err);
            }
        }
    }
    (valid, rejected)
}
