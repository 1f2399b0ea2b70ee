use std::collections::HashMap;

use anyhow::anyhow;
use geo::{Coord, Intersects, LineString, MultiPolygon, Point, Polygon, Simplify};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
struct OverpassResponse {
    elements: Vec<Element>,
}

#[derive(Deserialize, Debug)]
struct Element {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    members: Vec<Member>,
}

#[derive(Deserialize, Debug)]
struct Member {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    role: String,
    /// Node positions of a way member. Nodes missing from the response come back as `null`.
    #[serde(default)]
    geometry: Vec<Option<NodePosition>>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
struct NodePosition {
    lat: f64,
    lon: f64,
}

/// A boundary relation converted into polygons.
#[derive(Debug, Clone)]
pub struct BoundaryRelation {
    pub id: u64,
    pub tags: HashMap<String, String>,
    pub polygons: MultiPolygon,
}

impl BoundaryRelation {
    pub fn name(&self) -> Option<&str> {
        self.tags.get("name").map(String::as_str)
    }
}

/// Convert every relation in an Overpass `out geom` JSON response into a multipolygon.
pub fn read_boundary_relations(overpass_json: &str) -> anyhow::Result<Vec<BoundaryRelation>> {
    let response: OverpassResponse = serde_json::from_str(overpass_json)?;
    response
        .elements
        .into_iter()
        .filter(|element| element.kind == "relation")
        .map(relation_to_boundary)
        .collect()
}

fn relation_to_boundary(relation: Element) -> anyhow::Result<BoundaryRelation> {
    let mut outer = Vec::new();
    let mut inner = Vec::new();
    for member in relation.members.into_iter().filter(|member| member.kind == "way") {
        let coords: Vec<Coord> = member
            .geometry
            .iter()
            .flatten()
            .map(|node| Coord {
                x: node.lon,
                y: node.lat,
            })
            .collect();
        match member.role.as_str() {
            "inner" => inner.push(coords),
            // Untagged members of boundary relations are outer ways.
            "outer" | "" => outer.push(coords),
            _ => {}
        }
    }

    let outer_rings = assemble_rings(outer)
        .map_err(|err| anyhow!("Relation {}: outer ways: {}", relation.id, err))?;
    let inner_rings = assemble_rings(inner)
        .map_err(|err| anyhow!("Relation {}: inner ways: {}", relation.id, err))?;
    log::debug!(
        "Relation {} has {} outer and {} inner rings",
        relation.id,
        outer_rings.len(),
        inner_rings.len()
    );

    let mut polygons: Vec<Polygon> = outer_rings
        .into_iter()
        .map(|ring| Polygon::new(ring, vec![]))
        .collect();
    for ring in inner_rings {
        let first = Point::from(ring.0[0]);
        match polygons.iter_mut().find(|polygon| polygon.intersects(&first)) {
            Some(polygon) => polygon.interiors_push(ring),
            None => log::warn!(
                "Relation {}: dropping inner ring outside of all outer rings",
                relation.id
            ),
        }
    }

    Ok(BoundaryRelation {
        id: relation.id,
        tags: relation.tags,
        polygons: MultiPolygon::new(polygons),
    })
}

/// Join way segments end to end into closed rings, reversing segments where needed.
///
/// Segments shorter than two points are ignored. Every resulting ring has at least four points.
pub fn assemble_rings(segments: Vec<Vec<Coord>>) -> anyhow::Result<Vec<LineString>> {
    let mut segments: Vec<Vec<Coord>> = segments
        .into_iter()
        .filter(|segment| segment.len() >= 2)
        .rev()
        .collect();

    let mut rings = Vec::new();
    while let Some(mut ring) = segments.pop() {
        loop {
            let (start, end) = (ring[0], ring[ring.len() - 1]);
            if start == end {
                break;
            }
            let position = segments
                .iter()
                .position(|segment| segment[0] == end || segment[segment.len() - 1] == end)
                .ok_or_else(|| {
                    anyhow!(
                        "Ring starting at ({}, {}) cannot be closed, open end at ({}, {})",
                        start.x,
                        start.y,
                        end.x,
                        end.y
                    )
                })?;
            let mut next = segments.remove(position);
            if next[0] != end {
                next.reverse();
            }
            ring.extend(next.into_iter().skip(1));
        }
        if ring.len() < 4 {
            return Err(anyhow!("Degenerate ring with {} points", ring.len()));
        }
        rings.push(LineString::new(ring));
    }
    Ok(rings)
}

/// Ramer–Douglas–Peucker simplification of every ring. Rings that collapse below four
/// points are dropped, and so are polygons whose exterior collapses.
pub fn simplify_polygons(polygons: &MultiPolygon, tolerance: f64) -> MultiPolygon {
    let simplified = polygons
        .0
        .iter()
        .filter_map(|polygon| {
            let exterior = polygon.exterior().simplify(&tolerance);
            if exterior.0.len() < 4 {
                return None;
            }
            let interiors = polygon
                .interiors()
                .iter()
                .map(|ring| ring.simplify(&tolerance))
                .filter(|ring| ring.0.len() >= 4)
                .collect();
            Some(Polygon::new(exterior, interiors))
        })
        .collect();
    MultiPolygon::new(simplified)
}

pub fn boundaries_to_feature_collection(
    boundaries: &[BoundaryRelation],
) -> geojson::FeatureCollection {
    boundaries
        .iter()
        .map(|boundary| {
            let mut properties = geojson::JsonObject::new();
            properties.insert("type".to_owned(), "relation".into());
            properties.insert("id".to_owned(), boundary.id.into());
            if let Some(name) = boundary.name() {
                properties.insert("name".to_owned(), name.into());
            }
            properties.insert(
                "tags".to_owned(),
                serde_json::to_value(&boundary.tags).unwrap_or_default(),
            );
            crate::geofile::geojson::feature_from_geometry(
                geojson::Value::from(&boundary.polygons),
                properties,
            )
        })
        .collect()
}
