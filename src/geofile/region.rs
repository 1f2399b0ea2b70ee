use std::{fs, path::Path, str::FromStr};

use anyhow::Context;
use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect};
use geojson::{GeoJson, Value};
use thiserror::Error;

/// Corners of the rectangle covering the whole WGS84 coordinate range, closed.
pub const WORLD_RING: [(f64, f64); 5] = [
    (-180.0, -90.0),
    (-180.0, 90.0),
    (180.0, 90.0),
    (180.0, -90.0),
    (-180.0, -90.0),
];

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(#[from] geojson::Error),
    #[error("Expected exactly one feature, found {0}")]
    FeatureCount(usize),
    #[error("Boundary feature has no geometry")]
    MissingGeometry,
    #[error("Unsupported geometry type {0}, expected Polygon or MultiPolygon")]
    UnsupportedGeometry(&'static str),
    #[error("Ring {ring} has {positions} positions, at least 4 are required")]
    RingTooShort { ring: usize, positions: usize },
    #[error("Ring {0} is not closed")]
    RingNotClosed(usize),
    #[error("A position in ring {0} has fewer than two coordinates")]
    InvalidPosition(usize),
    #[error("Boundary contains no polygons")]
    Empty,
}

/// Boundary of a region, read from a single-feature GeoJSON document.
///
/// Every ring is closed and has at least four positions. Self-intersection is not checked.
#[derive(Debug, Clone)]
pub struct RegionBoundary {
    name: Option<String>,
    polygons: MultiPolygon,
    bounds: Rect,
}

impl RegionBoundary {
    pub fn parse(contents: &str) -> Result<Self, BoundaryError> {
        let geojson = GeoJson::from_str(contents)?;
        let (geometry, properties) = match geojson {
            GeoJson::FeatureCollection(collection) => {
                let count = collection.features.len();
                let mut features = collection.features.into_iter();
                match (features.next(), count) {
                    (Some(feature), 1) => (feature.geometry, feature.properties),
                    _ => return Err(BoundaryError::FeatureCount(count)),
                }
            }
            GeoJson::Feature(feature) => (feature.geometry, feature.properties),
            GeoJson::Geometry(geometry) => (Some(geometry), None),
        };
        let geometry = geometry.ok_or(BoundaryError::MissingGeometry)?;

        let polygon_coordinates = match geometry.value {
            Value::Polygon(rings) => vec![rings],
            Value::MultiPolygon(polygons) => polygons,
            other => return Err(BoundaryError::UnsupportedGeometry(geometry_type_name(&other))),
        };

        let mut ring_index = 0;
        let mut polygons = Vec::with_capacity(polygon_coordinates.len());
        for rings in polygon_coordinates {
            let mut rings = rings.into_iter().map(|ring| {
                let line = ring_to_linestring(ring, ring_index);
                ring_index += 1;
                line
            });
            let exterior = match rings.next() {
                Some(exterior) => exterior?,
                None => continue,
            };
            let interiors = rings.collect::<Result<Vec<LineString>, BoundaryError>>()?;
            polygons.push(Polygon::new(exterior, interiors));
        }

        let polygons = MultiPolygon::new(polygons);
        let bounds = polygons.bounding_rect().ok_or(BoundaryError::Empty)?;
        let name = properties
            .as_ref()
            .and_then(|properties| properties.get("name"))
            .and_then(|name| name.as_str())
            .map(str::to_owned);

        Ok(Self {
            name,
            polygons,
            bounds,
        })
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Reading region border from {:?}", path))?;
        Self::parse(&contents).with_context(|| format!("Parsing region border {:?}", path))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn polygons(&self) -> &MultiPolygon {
        &self.polygons
    }

    /// All rings of all polygons, each exterior followed by its interiors.
    pub fn rings(&self) -> impl Iterator<Item = &LineString> {
        self.polygons
            .0
            .iter()
            .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Polygon covering the world with every ring of the region cut out as a hole.
    ///
    /// Meant to be filled with the even-odd rule, which keeps enclaves of the region dimmed.
    pub fn mask_polygon(&self) -> Polygon {
        let world: LineString = WORLD_RING.iter().copied().collect();
        Polygon::new(world, self.rings().cloned().collect())
    }
}

impl FromStr for RegionBoundary {
    type Err = BoundaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn ring_to_linestring(ring: Vec<Vec<f64>>, ring_index: usize) -> Result<LineString, BoundaryError> {
    if ring.len() < 4 {
        return Err(BoundaryError::RingTooShort {
            ring: ring_index,
            positions: ring.len(),
        });
    }
    let coords = ring
        .into_iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(BoundaryError::InvalidPosition(ring_index)),
        })
        .collect::<Result<Vec<Coord>, BoundaryError>>()?;
    let line = LineString::new(coords);
    if !line.is_closed() {
        return Err(BoundaryError::RingNotClosed(ring_index));
    }
    Ok(line)
}

fn geometry_type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use geo::{coord, Rect};
    use rstest::rstest;

    use super::{BoundaryError, RegionBoundary, WORLD_RING};

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"name": "Square"},
            "geometry": {"type": "Polygon", "coordinates": [[[0,0],[0,1],[1,1],[1,0],[0,0]]]}
        }]
    }"#;

    #[test]
    fn test_parse_single_polygon() {
        let region = RegionBoundary::parse(SQUARE).unwrap();
        assert_eq!(Some("Square"), region.name());
        assert_eq!(1, region.polygons().0.len());
        assert_eq!(1, region.rings().count());
        assert_eq!(
            Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }),
            region.bounds()
        );
    }

    #[test]
    fn test_parse_multipolygon_with_hole() {
        let contents = r#"{
            "type": "Feature",
            "properties": {},
            "geometry": {"type": "MultiPolygon", "coordinates": [
                [[[0,0],[0,10],[10,10],[10,0],[0,0]], [[2,2],[2,3],[3,3],[3,2],[2,2]]],
                [[[20,0],[20,1],[21,1],[21,0],[20,0]]]
            ]}
        }"#;
        let region = RegionBoundary::parse(contents).unwrap();
        assert_eq!(None, region.name());
        assert_eq!(2, region.polygons().0.len());
        assert_eq!(3, region.rings().count());
        assert_eq!(
            Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 21.0, y: 10.0 }),
            region.bounds()
        );
    }

    #[test]
    fn test_mask_polygon_cuts_out_all_rings() {
        let region = RegionBoundary::parse(SQUARE).unwrap();
        let mask = region.mask_polygon();

        let exterior: Vec<(f64, f64)> = mask.exterior().coords().map(|c| (c.x, c.y)).collect();
        assert_eq!(WORLD_RING.to_vec(), exterior);
        assert_eq!(1, mask.interiors().len());
        assert_eq!(region.polygons().0[0].exterior(), &mask.interiors()[0]);
    }

    #[test]
    fn test_multiple_features_are_rejected() {
        let contents = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon", "coordinates": [[[0,0],[0,1],[1,1],[0,0]]]}},
            {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon", "coordinates": [[[0,0],[0,1],[1,1],[0,0]]]}}
        ]}"#;
        assert!(matches!(
            RegionBoundary::parse(contents),
            Err(BoundaryError::FeatureCount(2))
        ));
    }

    #[rstest]
    #[case(r#"{"type": "FeatureCollection", "features": []}"#)]
    #[case(r#"{"type": "Point", "coordinates": [1, 2]}"#)]
    #[case(r#"{"type": "Polygon", "coordinates": [[[0,0],[0,1],[0,0]]]}"#)]
    #[case(r#"{"type": "Polygon", "coordinates": [[[0,0],[0,1],[1,1],[1,0]]]}"#)]
    #[case(r#"{"type": "Feature", "properties": {}, "geometry": null}"#)]
    #[case(r#"{"stations": []}"#)]
    #[case("not json")]
    fn test_malformed_boundaries_are_rejected(#[case] contents: &str) {
        assert!(RegionBoundary::parse(contents).is_err());
    }
}
