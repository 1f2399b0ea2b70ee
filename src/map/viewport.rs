use std::f64::consts::PI;

use geo::Rect;
use serde::{Deserialize, Serialize};

/// Edge length of a map tile in pixels.
pub const TILE_SIZE: f64 = 256.0;
/// Latitude limit of the spherical Web Mercator projection.
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Size of the map container in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLon,
    pub zoom: f64,
}

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

/// Spherical Web Mercator, in pixels at `zoom` with the origin at the north-west corner.
pub fn project(position: LatLon, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = position.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (position.lon + 180.0) / 360.0 * size;
    let y = (0.5 - ((1.0 + lat.sin()) / (1.0 - lat.sin())).ln() / (4.0 * PI)) * size;
    (x, y)
}

pub fn unproject(x: f64, y: f64, zoom: f64) -> LatLon {
    let size = world_size(zoom);
    let n = PI - 2.0 * PI * y / size;
    LatLon {
        lat: n.sinh().atan().to_degrees(),
        lon: x / size * 360.0 - 180.0,
    }
}

/// Viewport showing all of `bounds` with `padding` pixels free on every side.
///
/// The zoom is the largest whole level at which the bounds still fit, clamped to
/// `min_zoom..=max_zoom`. Bounds that collapse to a point get `max_zoom`.
pub fn fit_bounds(
    bounds: &Rect,
    size: ViewportSize,
    padding: f64,
    min_zoom: f64,
    max_zoom: f64,
) -> Viewport {
    let south_west = LatLon::new(bounds.min().y, bounds.min().x);
    let north_east = LatLon::new(bounds.max().y, bounds.max().x);
    let (west, south) = project(south_west, 0.0);
    let (east, north) = project(north_east, 0.0);
    let bounds_width = east - west;
    let bounds_height = south - north;

    let available_width = (size.width as f64 - 2.0 * padding).max(1.0);
    let available_height = (size.height as f64 - 2.0 * padding).max(1.0);

    let zoom = if bounds_width <= 0.0 && bounds_height <= 0.0 {
        max_zoom
    } else {
        let scale = (available_width / bounds_width).min(available_height / bounds_height);
        // Round away float noise before snapping down to a whole level.
        let zoom = (scale.log2() * 100.0).round() / 100.0;
        zoom.floor().clamp(min_zoom, max_zoom)
    };

    let center = unproject((west + east) / 2.0, (north + south) / 2.0, 0.0);
    Viewport { center, zoom }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use geo::{coord, Rect};
    use rstest::rstest;

    use super::{fit_bounds, project, unproject, LatLon, ViewportSize};

    #[rstest]
    #[case(LatLon::new(0.0, 0.0), 0.0, (128.0, 128.0))]
    #[case(LatLon::new(0.0, -180.0), 1.0, (0.0, 256.0))]
    #[case(LatLon::new(85.0511287798, 180.0), 0.0, (256.0, 0.0))]
    #[case(LatLon::new(-89.0, 0.0), 0.0, (128.0, 256.0))] // Clamped to the projection limit.
    fn test_project(#[case] position: LatLon, #[case] zoom: f64, #[case] expected: (f64, f64)) {
        let (x, y) = project(position, zoom);
        assert_abs_diff_eq!(expected.0, x, epsilon = 1e-6);
        assert_abs_diff_eq!(expected.1, y, epsilon = 1e-6);
    }

    #[rstest]
    #[case(LatLon::new(64.5, 26.0))]
    #[case(LatLon::new(-33.9, 151.2))]
    #[case(LatLon::new(0.0, 0.0))]
    fn test_unproject_inverts_project(#[case] position: LatLon) {
        let (x, y) = project(position, 10.0);
        let back = unproject(x, y, 10.0);
        assert_abs_diff_eq!(position.lat, back.lat, epsilon = 1e-9);
        assert_abs_diff_eq!(position.lon, back.lon, epsilon = 1e-9);
    }

    #[test]
    fn test_fit_bounds_near_equator() {
        let bounds = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });
        let viewport = fit_bounds(&bounds, ViewportSize::default(), 50.0, 0.0, 19.0);

        // 700 px of height for one degree: 2^9 fits, 2^10 does not.
        assert_eq!(9.0, viewport.zoom);
        assert_abs_diff_eq!(0.5, viewport.center.lon, epsilon = 1e-9);
        assert_abs_diff_eq!(0.5, viewport.center.lat, epsilon = 1e-3);
    }

    #[test]
    fn test_fit_bounds_is_largest_fitting_zoom() {
        // Roughly the extent of Etelä-Pohjanmaa.
        let bounds = Rect::new(coord! { x: 21.3, y: 62.2 }, coord! { x: 24.5, y: 63.7 });
        let size = ViewportSize {
            width: 1024,
            height: 768,
        };
        let padding = 50.0;
        let viewport = fit_bounds(&bounds, size, padding, 0.0, 19.0);

        let extent_at = |zoom: f64| {
            let (west, south) = project(LatLon::new(62.2, 21.3), zoom);
            let (east, north) = project(LatLon::new(63.7, 24.5), zoom);
            (east - west, south - north)
        };
        let (width, height) = extent_at(viewport.zoom);
        assert!(width <= 1024.0 - 2.0 * padding);
        assert!(height <= 768.0 - 2.0 * padding);
        let (width, height) = extent_at(viewport.zoom + 1.0);
        assert!(width > 1024.0 - 2.0 * padding || height > 768.0 - 2.0 * padding);

        assert!(viewport.center.lat > 62.2 && viewport.center.lat < 63.7);
        assert_abs_diff_eq!(22.9, viewport.center.lon, epsilon = 1e-9);
    }

    #[rstest]
    #[case(Rect::new(coord! { x: 26.0, y: 64.5 }, coord! { x: 26.0, y: 64.5 }), 18.0)]
    #[case(Rect::new(coord! { x: -180.0, y: -85.0 }, coord! { x: 180.0, y: 85.0 }), 2.0)]
    fn test_fit_bounds_clamps_zoom(#[case] bounds: Rect, #[case] expected_zoom: f64) {
        let viewport = fit_bounds(&bounds, ViewportSize::default(), 50.0, 2.0, 18.0);
        assert_eq!(expected_zoom, viewport.zoom);
    }

    #[test]
    fn test_fit_bounds_padding_larger_than_viewport() {
        let bounds = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });
        let size = ViewportSize {
            width: 80,
            height: 80,
        };
        let viewport = fit_bounds(&bounds, size, 50.0, 0.0, 19.0);
        assert_eq!(0.0, viewport.zoom);
    }
}
