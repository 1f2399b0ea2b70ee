use geo::{Closest, ClosestPoint, Contains, GeodesicDistance, Point};
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;

use crate::{geofile::region::RegionBoundary, stations::Station};

use super::sourcetable::StreamRecord;

/// Which stream records make it into the station list.
#[derive(Debug)]
pub enum StationFilter {
    Everything,
    /// Three-letter country code the caster lists the stream under.
    Country(String),
    /// Inside the region, or at most `buffer_km` kilometers outside of it.
    Region {
        boundary: RegionBoundary,
        buffer_km: f64,
    },
}

impl StationFilter {
    pub fn accepts(&self, record: &StreamRecord) -> bool {
        match self {
            StationFilter::Everything => true,
            StationFilter::Country(country) => record.country == *country,
            StationFilter::Region {
                boundary,
                buffer_km,
            } => is_in_or_near_region(boundary, record.lat, record.lon, *buffer_km),
        }
    }
}

/// Geodesic distance in kilometers from a point outside the region to the nearest point of
/// its boundary. The nearest point is searched in plain lon/lat space.
pub fn distance_to_boundary_km(boundary: &RegionBoundary, point: &Point) -> Option<f64> {
    boundary
        .rings()
        .filter_map(|ring| match ring.closest_point(point) {
            Closest::Intersection(nearest) | Closest::SinglePoint(nearest) => {
                Some(point.geodesic_distance(&nearest) / 1000.0)
            }
            Closest::Indeterminate => None,
        })
        .min_by(f64::total_cmp)
}

pub fn is_in_or_near_region(boundary: &RegionBoundary, lat: f64, lon: f64, buffer_km: f64) -> bool {
    let point = Point::new(lon, lat);
    if boundary.polygons().contains(&point) {
        return true;
    }
    distance_to_boundary_km(boundary, &point).map_or(false, |distance| distance <= buffer_km)
}

/// Stations of all accepted records, in source table order, tagged with `caster`.
pub fn filter_stations(records: &[StreamRecord], filter: &StationFilter, caster: &str) -> Vec<Station> {
    let stations: Vec<Station> = records
        .par_iter()
        .progress_count(records.len() as u64)
        .filter(|record| filter.accepts(record))
        .map(|record| Station {
            id: record.mountpoint.clone(),
            lat: record.lat,
            lon: record.lon,
            caster: caster.to_owned(),
        })
        .collect();
    log::info!(
        "Filtered source table from {} to {} stations",
        records.len(),
        stations.len()
    );
    stations
}
