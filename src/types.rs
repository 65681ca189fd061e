//! Common types used across the crate.

pub use http::StatusCode;
pub use http::Uri;

use std::fmt::{self, Display, Formatter};

use serde::Deserialize;

str_enum! {
    /// The kind of places to search for.
    #[derive(Clone, Copy, Debug, PartialEq, Hash, Eq, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Category {
        Restaurants = "restaurants",
        Hotels = "hotels",
        Attractions = "attractions",
    }
}

str_enum! {
    /// Light or dark map tiles.
    #[derive(Clone, Copy, Debug, PartialEq, Hash, Eq, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Theme {
        Light = "light",
        Dark = "dark",
    }
}

/// A point on the globe in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A `BoundingBox` is a rectangular area on the globe specified by coordinates of
/// the southwest and northeast edges in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Longitude of the west side of the bounding box.
    pub west_longitude: f64,
    /// Latitude of the south side of the bounding box.
    pub south_latitude: f64,
    /// Longitude of the east side of the bounding box.
    pub east_longitude: f64,
    /// Latitude of the north side of the bounding box.
    pub north_latitude: f64,
}

impl Default for Category {
    fn default() -> Self {
        Category::Restaurants
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}

impl Theme {
    /// The other theme.
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// URL of the map tile style to render with this theme.
    pub fn map_style(self) -> &'static str {
        match self {
            Theme::Light => "mapbox://styles/mapbox/streets-v11",
            Theme::Dark => "mapbox://styles/mapbox/dark-v10",
        }
    }
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }

    /// Returns `true` if both components are finite and within range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl BoundingBox {
    /// Creates a `BoundingBox` from its southwest and northeast corners.
    ///
    /// # Example
    ///
    /// ```rust
    /// use places_explorer::types::{BoundingBox, Coordinate};
    ///
    /// let yangon = BoundingBox::new(Coordinate::new(16.75, 96.1), Coordinate::new(16.86, 96.21));
    /// assert_eq!(yangon.northeast(), Coordinate::new(16.86, 96.21));
    /// ```
    pub const fn new(southwest: Coordinate, northeast: Coordinate) -> Self {
        BoundingBox {
            west_longitude: southwest.longitude,
            south_latitude: southwest.latitude,
            east_longitude: northeast.longitude,
            north_latitude: northeast.latitude,
        }
    }

    pub fn northeast(&self) -> Coordinate {
        Coordinate::new(self.north_latitude, self.east_longitude)
    }

    pub fn southwest(&self) -> Coordinate {
        Coordinate::new(self.south_latitude, self.west_longitude)
    }

    /// Returns `true` if both corners are valid coordinates and the north side
    /// is not below the south side.
    ///
    /// The east side may be west of the west side when the box crosses the antimeridian.
    pub fn is_well_formed(&self) -> bool {
        self.northeast().is_valid()
            && self.southwest().is_valid()
            && self.north_latitude >= self.south_latitude
    }
}

impl From<[f64; 4]> for BoundingBox {
    /// Creates a `BoundingBox` from
    /// `[west_longitude, south_latitude, east_longitude, north_latitude]`.
    fn from([west_longitude, south_latitude, east_longitude, north_latitude]: [f64; 4]) -> Self {
        BoundingBox {
            west_longitude,
            south_latitude,
            east_longitude,
            north_latitude,
        }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [
            bbox.west_longitude,
            bbox.south_latitude,
            bbox.east_longitude,
            bbox.north_latitude,
        ]
    }
}

impl Display for BoundingBox {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sw({}, {}) ne({}, {})",
            self.south_latitude, self.west_longitude, self.north_latitude, self.east_longitude,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names() {
        for &c in Category::ALL {
            assert_eq!(c.as_ref().parse::<Category>(), Ok(c));
        }
        assert!("bars".parse::<Category>().is_err());
        assert_eq!(Category::Hotels.to_string(), "hotels");
    }

    #[test]
    fn well_formed() {
        let bbox = BoundingBox::new(Coordinate::new(0., 0.), Coordinate::new(1., 1.));
        assert!(bbox.is_well_formed());
        assert_eq!(<[f64; 4]>::from(bbox), [0., 0., 1., 1.]);
        assert_eq!(BoundingBox::from([0., 0., 1., 1.]), bbox);

        let flipped = BoundingBox::new(Coordinate::new(1., 0.), Coordinate::new(0., 1.));
        assert!(!flipped.is_well_formed());

        let nan = BoundingBox::new(Coordinate::new(0., f64::NAN), Coordinate::new(1., 1.));
        assert!(!nan.is_well_formed());

        let antimeridian = BoundingBox::from([179., -1., -179., 1.]);
        assert!(antimeridian.is_well_formed());
    }

    #[test]
    fn theme() {
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle().map_style(), "mapbox://styles/mapbox/streets-v11");
    }
}
