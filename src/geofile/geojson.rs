use std::{fs, io, path::Path};

pub fn feature_from_geometry(
    geometry: geojson::Value,
    properties: geojson::JsonObject,
) -> geojson::Feature {
    geojson::Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geometry)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn write_feature_collection(
    feature_collection: geojson::FeatureCollection,
    output_filepath: &Path,
) -> io::Result<()> {
    let geojson_contents = geojson::GeoJson::from(feature_collection);
    fs::write(output_filepath, geojson_contents.to_string())
}
