//! Filtering places by rating.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::UnknownValue;
use crate::place::Place;

/// The minimum rating a place needs to be shown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RatingThreshold {
    /// No threshold: every place is admitted, including unrated ones.
    Unset,
    /// Only places rated strictly above the value are admitted.
    Above(f64),
}

impl Default for RatingThreshold {
    fn default() -> Self {
        RatingThreshold::Unset
    }
}

impl RatingThreshold {
    pub fn is_set(&self) -> bool {
        matches!(*self, RatingThreshold::Above(_))
    }

    /// Returns `true` if a place with `rating` passes the threshold.
    pub fn admits(&self, rating: Option<f64>) -> bool {
        match *self {
            RatingThreshold::Unset => true,
            RatingThreshold::Above(min) => rating.map_or(false, |r| r > min),
        }
    }
}

impl From<Option<f64>> for RatingThreshold {
    fn from(min: Option<f64>) -> Self {
        min.map_or(RatingThreshold::Unset, RatingThreshold::Above)
    }
}

/// Parses the value of a rating control. An empty string unsets the threshold.
impl FromStr for RatingThreshold {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(RatingThreshold::Unset);
        }
        match s.parse::<f64>() {
            Ok(min) if !min.is_nan() => Ok(RatingThreshold::Above(min)),
            _ => Err(UnknownValue::new("RatingThreshold", s)),
        }
    }
}

impl Display for RatingThreshold {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            RatingThreshold::Unset => Ok(()),
            RatingThreshold::Above(min) => Display::fmt(&min, f),
        }
    }
}

/// Returns the places of `places` that pass `threshold`, in their original order.
pub fn filter(places: &[Place], threshold: RatingThreshold) -> Vec<Place> {
    places
        .iter()
        .filter(|p| threshold.admits(p.rating))
        .cloned()
        .collect()
}
