use std::{fs, path::Path};

use anyhow::Context;
use serde_json::json;

use crate::geofile::geojson::{feature_from_geometry, write_feature_collection};

use super::{overlay::Overlay, view::MapView};

pub const SCENE_FILENAME: &str = "scene.geojson";
pub const PAGE_FILENAME: &str = "basestations.html";

const PAGE_TEMPLATE: &str = include_str!("../../assets/basestations.html");

fn overlay_to_feature(overlay: &Overlay) -> anyhow::Result<geojson::Feature> {
    let mut properties = geojson::JsonObject::new();
    properties.insert("overlay".to_owned(), overlay.kind().into());
    properties.insert("style".to_owned(), serde_json::to_value(overlay.style())?);

    let geometry = match overlay {
        Overlay::Outline {
            rings,
            path,
            animation,
            ..
        } => {
            properties.insert("path".to_owned(), path.to_string().into());
            if let Some(animation) = animation {
                properties.insert("animation".to_owned(), serde_json::to_value(animation)?);
            }
            geojson::Value::from(&geo::MultiLineString::new(rings.clone()))
        }
        Overlay::Mask { polygon, .. } => geojson::Value::from(polygon),
        Overlay::Circle {
            center,
            radius,
            popup,
            ..
        } => {
            properties.insert("radius".to_owned(), (*radius).into());
            if let Some(popup) = popup {
                properties.insert("popup".to_owned(), popup.as_str().into());
            }
            geojson::Value::Point(vec![center.lon, center.lat])
        }
    };
    Ok(feature_from_geometry(geometry, properties))
}

/// All overlays of the view as features, in drawing order.
pub fn scene_to_feature_collection(view: &MapView) -> anyhow::Result<geojson::FeatureCollection> {
    view.overlays().iter().map(overlay_to_feature).collect()
}

/// Self-contained Leaflet page drawing the scene over the base tiles.
pub fn render_page(view: &MapView) -> anyhow::Result<String> {
    let scene = geojson::GeoJson::from(scene_to_feature_collection(view)?);
    let viewport = view.viewport();
    // The browser refits to the region itself since only it knows the container size.
    let bounds = view.region_bounds().map(|bounds| {
        json!([
            [bounds.min().y, bounds.min().x],
            [bounds.max().y, bounds.max().x]
        ])
    });
    let settings = json!({
        "center": [viewport.center.lat, viewport.center.lon],
        "zoom": viewport.zoom,
        "bounds": bounds,
        "padding": view.options().padding,
        "tiles": view.tiles(),
    });
    Ok(PAGE_TEMPLATE
        .replace("{{settings}}", &script_safe(&settings.to_string()))
        .replace("{{scene}}", &script_safe(&scene.to_string())))
}

/// JSON may end up inside a `<script>` element, so no closing tags may appear in it.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Write the scene GeoJSON and the page into `output_dir`, creating it when missing.
pub fn write_scene(view: &MapView, output_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Creating output directory {:?}", output_dir))?;

    let scene_path = output_dir.join(SCENE_FILENAME);
    log::info!(
        "Writing {} overlays to {:?}",
        view.overlays().len(),
        scene_path
    );
    write_feature_collection(scene_to_feature_collection(view)?, &scene_path)?;

    let page_path = output_dir.join(PAGE_FILENAME);
    log::info!("Writing map page to {:?}", page_path);
    fs::write(&page_path, render_page(view)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use testdir::testdir;

    use super::{
        render_page, scene_to_feature_collection, write_scene, PAGE_FILENAME, PAGE_TEMPLATE,
        SCENE_FILENAME,
    };
    use crate::map::{
        error::DataFetchError,
        source::DataSource,
        view::{load_map, MapOptions, MapView},
    };

    struct StaticSource;

    impl DataSource for StaticSource {
        fn fetch(&self, location: &str) -> Result<String, DataFetchError> {
            match location {
                "region" => Ok(r#"{"type": "Polygon", "coordinates": [[[0,0],[0,1],[1,1],[1,0],[0,0]]]}"#.to_owned()),
                "stations" => Ok(r#"{"stations": [{"id": "</script>", "lat": 0.5, "lon": 0.5, "caster": "EMLID"}]}"#.to_owned()),
                _ => Err(DataFetchError::parse(location, "unknown")),
            }
        }
    }

    fn view() -> MapView {
        load_map(
            MapOptions::new(Some("region".to_owned()), "stations".to_owned()),
            &StaticSource,
        )
        .unwrap()
    }

    #[test]
    fn test_scene_features_follow_overlays() {
        let scene = scene_to_feature_collection(&view()).unwrap();
        let kinds: Vec<&str> = scene
            .features
            .iter()
            .map(|feature| feature.property("overlay").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(vec!["outline", "mask", "circle", "circle"], kinds);

        let outline = &scene.features[0];
        assert_eq!(
            Some(&serde_json::json!("M0,0L0,1L1,1L1,0L0,0Z")),
            outline.property("path")
        );
        assert_eq!(
            Some(&serde_json::json!(10.0)),
            outline.property("animation").and_then(|a| a.get("duration_secs"))
        );

        let coverage = &scene.features[2];
        assert_eq!(Some(&serde_json::json!(20000.0)), coverage.property("radius"));
        assert_eq!(
            Some(&serde_json::json!("red")),
            coverage.property("style").and_then(|style| style.get("fillColor"))
        );
        assert_eq!(
            Some(&serde_json::json!("</script>")),
            scene.features[3].property("popup")
        );
    }

    fn page_settings(page: &str) -> serde_json::Value {
        let start = page.find("const settings = ").unwrap() + "const settings = ".len();
        let end = start + page[start..].find(";\n").unwrap();
        serde_json::from_str(&page[start..end]).unwrap()
    }

    #[test]
    fn test_page_fits_region_in_browser() {
        let page = render_page(&view()).unwrap();
        let settings = page_settings(&page);
        assert_eq!(serde_json::json!([[0.0, 0.0], [1.0, 1.0]]), settings["bounds"]);
        assert_eq!(serde_json::json!(50.0), settings["padding"]);
        assert!(page.contains("map.fitBounds(settings.bounds"));
    }

    #[test]
    fn test_page_without_region_keeps_initial_view() {
        let view = load_map(MapOptions::new(None, "stations".to_owned()), &StaticSource).unwrap();
        let settings = page_settings(&render_page(&view).unwrap());
        assert!(settings["bounds"].is_null());
        assert_eq!(serde_json::json!([64.5, 26.0]), settings["center"]);
        assert_eq!(serde_json::json!(10.0), settings["zoom"]);
    }

    #[test]
    fn test_popup_text_is_not_html() {
        let page = render_page(&view()).unwrap();
        assert!(page.contains("label.textContent = props.popup"));
        assert!(!page.contains("bindPopup(props.popup)"));
    }

    #[test]
    fn test_page_embeds_scene_safely() {
        let page = render_page(&view()).unwrap();
        assert!(!page.contains("{{scene}}"));
        assert!(!page.contains("{{settings}}"));
        assert!(page.contains("tile.openstreetmap.org"));
        // The station id "</script>" must not close any element early.
        assert_eq!(
            PAGE_TEMPLATE.matches("</script>").count(),
            page.matches("</script>").count()
        );
        assert!(page.contains("<\\/script>"));
    }

    #[test]
    fn test_write_scene() {
        let dir = testdir!().join("web");
        write_scene(&view(), &dir).unwrap();
        assert!(dir.join(SCENE_FILENAME).is_file());
        assert!(dir.join(PAGE_FILENAME).is_file());
    }
}
