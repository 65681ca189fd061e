//! Place records as returned by the search API.

use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::types::{Category, Coordinate};

/// Image shown for places that come without a photo.
pub const PLACEHOLDER_PHOTO: &str = "https://jooinn.com/images/blur-restaurant-1.png";

/// A point of interest.
///
/// The search API is loosely typed, so every field except `name` is optional.
#[derive(Clone, Debug, PartialEq)]
pub struct Place {
    pub id: Option<String>,
    pub name: String,
    pub category: Category,
    /// Rating between 0 and 5, if the place has a usable one.
    pub rating: Option<f64>,
    /// Location of the place. `None` if either component was missing or unparsable.
    pub coordinate: Option<Coordinate>,
    /// URL of a photo of the place.
    pub photo: Option<String>,
}

/// Where to draw a place on the map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    /// Index of the place in the displayed collection.
    pub index: usize,
    pub coordinate: Coordinate,
}

#[derive(Deserialize)]
struct Listing {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawPlace {
    #[serde(default)]
    location_id: Option<Loose>,
    name: String,
    #[serde(default)]
    rating: Option<Loose>,
    #[serde(default)]
    latitude: Option<Loose>,
    #[serde(default)]
    longitude: Option<Loose>,
    #[serde(default)]
    photo: Option<Photo>,
}

#[derive(Deserialize)]
struct Photo {
    images: Option<Images>,
}

#[derive(Deserialize)]
struct Images {
    large: Option<Image>,
}

#[derive(Deserialize)]
struct Image {
    url: Option<String>,
}

/// A scalar that may come as a number or as a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    String(String),
    Other(IgnoredAny),
}

impl Place {
    /// Returns `true` if the place can be drawn on the map.
    pub fn has_marker(&self) -> bool {
        self.coordinate.map_or(false, |c| c.is_valid())
    }

    /// URL of the photo to show for this place.
    pub fn photo_url(&self) -> &str {
        self.photo.as_deref().unwrap_or(PLACEHOLDER_PHOTO)
    }
}

impl Loose {
    fn as_f64(&self) -> Option<f64> {
        match *self {
            Loose::Number(n) => Some(n),
            Loose::String(ref s) => s.trim().parse().ok(),
            Loose::Other(_) => None,
        }
    }

    fn into_string(self) -> Option<String> {
        match self {
            Loose::Number(n) => Some(n.to_string()),
            Loose::String(s) => Some(s),
            Loose::Other(_) => None,
        }
    }
}

impl RawPlace {
    fn into_place(self, category: Category) -> Place {
        let rating = self
            .rating
            .as_ref()
            .and_then(Loose::as_f64)
            .filter(|r| r.is_finite());
        let coordinate = match (
            self.latitude.as_ref().and_then(Loose::as_f64),
            self.longitude.as_ref().and_then(Loose::as_f64),
        ) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        };
        let photo = self
            .photo
            .and_then(|p| p.images)
            .and_then(|i| i.large)
            .and_then(|i| i.url);

        Place {
            id: self.location_id.and_then(Loose::into_string),
            name: self.name,
            category,
            rating,
            coordinate,
            photo,
        }
    }
}

/// Decodes a listing of the search API, in the order the API returned it.
///
/// Entries that are not places (the API mixes in ad slots without a name) are skipped.
pub fn decode(body: &[u8], category: Category) -> serde_json::Result<Vec<Place>> {
    let listing: Listing = serde_json::from_slice(body)?;
    let places = listing
        .data
        .into_iter()
        .filter_map(|value| match RawPlace::deserialize(value) {
            Ok(raw) => Some(raw.into_place(category)),
            Err(e) => {
                tracing::trace!(error = %e, "skipping a listing entry");
                None
            }
        })
        .collect();
    Ok(places)
}

/// Markers for the places of `displayed` that have a usable coordinate.
pub fn markers(displayed: &[Place]) -> Vec<Marker> {
    displayed
        .iter()
        .enumerate()
        .filter_map(|(index, place)| {
            place
                .coordinate
                .filter(Coordinate::is_valid)
                .map(|coordinate| Marker { index, coordinate })
        })
        .collect()
}
