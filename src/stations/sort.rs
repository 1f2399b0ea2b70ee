use super::Station;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortOrder {
    /// Alphabetically by station id.
    Id,
    /// West to east starting from the antimeridian, then south to north.
    Coordinates,
}

/// Longitude shifted into 0..360 so that sorting wraps at the antimeridian.
fn normalize_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0)
}

/// Stable sort, stations with equal keys keep their relative order.
pub fn sort_stations(stations: &mut [Station], order: SortOrder) {
    log::info!("Sorting {} stations by {:?}", stations.len(), order);
    match order {
        SortOrder::Id => stations.sort_by(|a, b| a.id.cmp(&b.id)),
        SortOrder::Coordinates => stations.sort_by(|a, b| {
            normalize_longitude(a.lon)
                .total_cmp(&normalize_longitude(b.lon))
                .then(a.lat.total_cmp(&b.lat))
        }),
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{normalize_longitude, sort_stations, SortOrder};
    use crate::stations::Station;

    fn station(id: &str, lat: f64, lon: f64) -> Station {
        Station {
            id: id.to_owned(),
            lat,
            lon,
            caster: "RTK2GO".to_owned(),
        }
    }

    #[fixture]
    fn stations() -> Vec<Station> {
        vec![
            station("C", 60.0, 25.0),
            station("A", 65.0, 25.0),
            station("D", 40.0, -170.0),
            station("B", 10.0, 179.0),
        ]
    }

    #[rstest]
    #[case(-180.0, 0.0)]
    #[case(0.0, 180.0)]
    #[case(180.0, 0.0)]
    #[case(-170.5, 9.5)]
    fn test_normalize_longitude(#[case] lon: f64, #[case] expected: f64) {
        assert_eq!(expected, normalize_longitude(lon));
    }

    #[rstest]
    #[case(SortOrder::Id, vec!["A", "B", "C", "D"])]
    #[case(SortOrder::Coordinates, vec!["D", "C", "A", "B"])]
    fn test_sort_stations(
        mut stations: Vec<Station>,
        #[case] order: SortOrder,
        #[case] expected_ids: Vec<&str>,
    ) {
        sort_stations(&mut stations, order);
        let ids: Vec<&str> = stations.iter().map(|station| station.id.as_str()).collect();
        assert_eq!(expected_ids, ids);
    }
}
