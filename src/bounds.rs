//! Tracking of the map viewport and the region it shows.

use std::f64::consts::PI;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{BoundingBox, Coordinate};

/// How long the map animates towards a place picked in the geocoder.
pub const GEOCODER_TRANSITION: Duration = Duration::from_millis(1000);

/// Size in pixels of a map tile at zoom level 0.
const TILE_SIZE: f64 = 512.;

/// Latitude beyond which Web Mercator is undefined.
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// The camera of the map.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Viewport {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    /// Duration of the animated transition towards this viewport, if any.
    #[serde(skip)]
    pub transition: Option<Duration>,
}

/// A handle to the map renderer.
pub trait MapHandle {
    /// The region the map renders for `viewport`, or `None` while the map is not
    /// initialized yet.
    fn visible_bounds(&self, viewport: &Viewport) -> Option<BoundingBox>;
}

/// A `MapHandle` that computes the visible region of a Web Mercator map of a given size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WebMercator {
    pub width: f64,
    pub height: f64,
}

/// Owns the viewport and derives the bounding box to fetch places for whenever
/// the map settles.
#[derive(Clone, Debug)]
pub struct BoundsTracker {
    viewport: Viewport,
    bounds: Option<BoundingBox>,
}

impl Default for Viewport {
    /// Downtown Yangon.
    fn default() -> Self {
        Viewport::new(16.806513845650294, 96.15593339811613, 12.303149558712713)
    }
}

impl Viewport {
    pub const fn new(latitude: f64, longitude: f64, zoom: f64) -> Self {
        Viewport {
            latitude,
            longitude,
            zoom,
            transition: None,
        }
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

impl WebMercator {
    pub const fn new(width: f64, height: f64) -> Self {
        WebMercator { width, height }
    }
}

impl MapHandle for WebMercator {
    fn visible_bounds(&self, viewport: &Viewport) -> Option<BoundingBox> {
        if !(self.width > 0. && self.height > 0.) || !viewport.center().is_valid() {
            return None;
        }

        let scale = TILE_SIZE * viewport.zoom.exp2();
        let (x, y) = project(viewport.center(), scale);
        let (half_w, half_h) = (self.width / 2., self.height / 2.);

        let mut southwest = unproject(x - half_w, (y + half_h).min(scale), scale);
        let mut northeast = unproject(x + half_w, (y - half_h).max(0.), scale);
        if self.width >= scale {
            // The whole world fits horizontally.
            southwest.longitude = -180.;
            northeast.longitude = 180.;
        }
        Some(BoundingBox::new(southwest, northeast))
    }
}

/// World pixel coordinates of `c` at `scale`.
fn project(c: Coordinate, scale: f64) -> (f64, f64) {
    let lat = c.latitude.max(-MAX_LATITUDE).min(MAX_LATITUDE).to_radians();
    let x = (c.longitude + 180.) / 360. * scale;
    let y = (1. - (lat.tan() + 1. / lat.cos()).ln() / PI) / 2. * scale;
    (x, y)
}

fn unproject(x: f64, y: f64, scale: f64) -> Coordinate {
    let longitude = wrap_longitude(x / scale * 360. - 180.);
    let latitude = (PI * (1. - 2. * y / scale)).sinh().atan().to_degrees();
    Coordinate::new(latitude, longitude)
}

fn wrap_longitude(longitude: f64) -> f64 {
    if (-180. ..=180.).contains(&longitude) {
        longitude
    } else {
        (longitude + 180.).rem_euclid(360.) - 180.
    }
}

impl BoundsTracker {
    /// Creates a tracker starting at `initial`. No bounds are known until the
    /// map settles for the first time.
    pub fn new(initial: Viewport) -> Self {
        BoundsTracker {
            viewport: initial,
            bounds: None,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The bounds derived from the last settle, if any.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    /// Follows a pan or zoom in progress. The map has not settled yet.
    pub fn on_viewport_change(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Moves the camera to a place picked in the geocoder, animating the transition.
    pub fn on_geocoder_result(&mut self, viewport: Viewport) {
        self.viewport = Viewport {
            transition: Some(GEOCODER_TRANSITION),
            ..viewport
        };
    }

    /// Recentres the camera on the user's location, keeping the zoom level.
    ///
    /// Positions that are not valid coordinates are ignored.
    pub fn on_geolocated(&mut self, position: Coordinate) {
        if !position.is_valid() {
            tracing::debug!(?position, "ignoring invalid user location");
            return;
        }
        self.viewport = Viewport {
            latitude: position.latitude,
            longitude: position.longitude,
            transition: Some(GEOCODER_TRANSITION),
            ..self.viewport
        };
    }

    /// Called when the map has finished moving, including once when it is mounted.
    ///
    /// Returns the region `map` now renders, or `None` if the map cannot tell yet.
    pub fn on_settle<H: MapHandle + ?Sized>(&mut self, map: &H) -> Option<BoundingBox> {
        self.viewport.transition = None;
        let bounds = map.visible_bounds(&self.viewport)?;
        tracing::trace!(%bounds, zoom = self.viewport.zoom, "map settled");
        self.bounds = Some(bounds);
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn extent_is_centered() {
        let map = WebMercator::new(1024., 768.);
        let viewport = Viewport::new(0., 0., 2.);
        let bbox = map.visible_bounds(&viewport).unwrap();
        assert!(bbox.is_well_formed());
        assert!(close(bbox.west_longitude, -bbox.east_longitude));
        assert!(close(bbox.south_latitude, -bbox.north_latitude));
        // 1024 px out of a 2048 px wide world.
        assert!(close(bbox.east_longitude - bbox.west_longitude, 180.));
    }

    #[test]
    fn zooming_in_shrinks_extent() {
        let map = WebMercator::new(800., 600.);
        let wide = map.visible_bounds(&Viewport::default()).unwrap();
        let viewport = Viewport {
            zoom: Viewport::default().zoom + 1.,
            ..Viewport::default()
        };
        let narrow = map.visible_bounds(&viewport).unwrap();
        assert!(narrow.north_latitude < wide.north_latitude);
        assert!(narrow.east_longitude < wide.east_longitude);
        assert!(narrow.west_longitude > wide.west_longitude);
    }

    #[test]
    fn uninitialized_map() {
        let mut tracker = BoundsTracker::new(Viewport::default());
        assert_eq!(tracker.on_settle(&WebMercator::new(0., 0.)), None);
        assert_eq!(tracker.bounds(), None);

        let bbox = tracker.on_settle(&WebMercator::new(800., 600.)).unwrap();
        assert_eq!(tracker.bounds(), Some(bbox));
    }

    #[test]
    fn geocoder_transition() {
        let mut tracker = BoundsTracker::new(Viewport::default());
        tracker.on_geocoder_result(Viewport::new(13.75, 100.5, 11.));
        assert_eq!(tracker.viewport().transition, Some(GEOCODER_TRANSITION));
        assert_eq!(tracker.viewport().center(), Coordinate::new(13.75, 100.5));

        let bbox = tracker.on_settle(&WebMercator::new(800., 600.)).unwrap();
        assert_eq!(tracker.viewport().transition, None);
        assert!(bbox.south_latitude < 13.75 && 13.75 < bbox.north_latitude);
        assert!(bbox.west_longitude < 100.5 && 100.5 < bbox.east_longitude);
    }

    #[test]
    fn wider_than_world() {
        let map = WebMercator::new(1280., 800.);
        let bbox = map.visible_bounds(&Viewport::new(0., 0., 0.)).unwrap();
        assert_eq!(bbox.west_longitude, -180.);
        assert_eq!(bbox.east_longitude, 180.);
        assert!(close(bbox.north_latitude, MAX_LATITUDE));
        assert!(close(bbox.south_latitude, -MAX_LATITUDE));
        assert!(bbox.is_well_formed());

        // Off-center, the full span is still reported.
        let bbox = map.visible_bounds(&Viewport::new(0., 120., 0.)).unwrap();
        assert_eq!(<[f64; 4]>::from(bbox)[0], -180.);
        assert_eq!(<[f64; 4]>::from(bbox)[2], 180.);
    }

    #[test]
    fn geolocated() {
        let mut tracker = BoundsTracker::new(Viewport::default());
        tracker.on_geolocated(Coordinate::new(21.9588, 96.0891));
        assert_eq!(tracker.viewport().center(), Coordinate::new(21.9588, 96.0891));
        assert_eq!(tracker.viewport().zoom, Viewport::default().zoom);
        assert_eq!(tracker.viewport().transition, Some(GEOCODER_TRANSITION));

        tracker.on_geolocated(Coordinate::new(f64::NAN, 0.));
        assert_eq!(tracker.viewport().center(), Coordinate::new(21.9588, 96.0891));
    }

    #[test]
    fn wraps_across_antimeridian() {
        let map = WebMercator::new(800., 600.);
        let bbox = map.visible_bounds(&Viewport::new(0., 179.9, 8.)).unwrap();
        assert!(bbox.east_longitude < bbox.west_longitude);
        assert!(bbox.is_well_formed());
    }
}
