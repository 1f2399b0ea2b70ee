use geo::{LineString, Polygon};
use serde::{Deserialize, Serialize};

use super::{outline::PathOutline, viewport::LatLon};

/// Path styling, named after the Leaflet path options so it can be handed to the page as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeStyle {
    pub stroke: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub weight: f64,
    pub opacity: f64,
    pub fill: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    pub fill_opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_rule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_offset: Option<String>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke: true,
            color: None,
            weight: 3.0,
            opacity: 1.0,
            fill: true,
            fill_color: None,
            fill_opacity: 0.2,
            fill_rule: None,
            dash_array: None,
            dash_offset: None,
        }
    }
}

/// Progressive stroke reveal of an outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawAnimation {
    pub duration_secs: f64,
}

/// Styles of every overlay kind the map draws. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapStyles {
    pub region: ShapeStyle,
    pub region_animation: Option<DrawAnimation>,
    pub mask: ShapeStyle,
    pub coverage: ShapeStyle,
    /// Coverage circle radius in meters.
    pub coverage_radius: f64,
    pub point: ShapeStyle,
    /// Station marker radius in meters.
    pub point_radius: f64,
}

impl Default for MapStyles {
    fn default() -> Self {
        Self {
            region: ShapeStyle {
                color: Some("red".to_owned()),
                weight: 10.0,
                fill: false,
                fill_opacity: 0.0,
                dash_array: Some("10000".to_owned()),
                dash_offset: Some("10000".to_owned()),
                ..ShapeStyle::default()
            },
            region_animation: Some(DrawAnimation {
                duration_secs: 10.0,
            }),
            mask: ShapeStyle {
                stroke: false,
                weight: 0.0,
                fill_color: Some("black".to_owned()),
                fill_opacity: 0.3,
                fill_rule: Some("evenodd".to_owned()),
                ..ShapeStyle::default()
            },
            coverage: ShapeStyle {
                stroke: false,
                fill_opacity: 0.15,
                ..ShapeStyle::default()
            },
            coverage_radius: 20000.0,
            point: ShapeStyle {
                stroke: false,
                color: Some("black".to_owned()),
                fill_color: Some("#fff".to_owned()),
                fill_opacity: 1.0,
                ..ShapeStyle::default()
            },
            point_radius: 1000.0,
        }
    }
}

/// A layer drawn on top of the base tiles.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Region border, drawn as a stroked path without fill.
    Outline {
        rings: Vec<LineString>,
        path: PathOutline,
        style: ShapeStyle,
        animation: Option<DrawAnimation>,
    },
    /// Everything outside the region, for dimming.
    Mask { polygon: Polygon, style: ShapeStyle },
    Circle {
        center: LatLon,
        /// Radius in meters.
        radius: f64,
        style: ShapeStyle,
        popup: Option<String>,
    },
}

impl Overlay {
    pub fn kind(&self) -> &'static str {
        match self {
            Overlay::Outline { .. } => "outline",
            Overlay::Mask { .. } => "mask",
            Overlay::Circle { .. } => "circle",
        }
    }

    pub fn style(&self) -> &ShapeStyle {
        match self {
            Overlay::Outline { style, .. } => style,
            Overlay::Mask { style, .. } => style,
            Overlay::Circle { style, .. } => style,
        }
    }

    pub fn popup(&self) -> Option<&str> {
        match self {
            Overlay::Circle { popup, .. } => popup.as_deref(),
            _ => None,
        }
    }
}
