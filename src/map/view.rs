use anyhow::anyhow;
use geo::Rect;
use serde::{Deserialize, Serialize};

use crate::{geofile::region::RegionBoundary, stations::StationList};

use super::{
    error::DataFetchError,
    outline::PathOutline,
    overlay::{MapStyles, Overlay, ShapeStyle},
    palette::CasterPalette,
    source::DataSource,
    viewport::{fit_bounds, LatLon, Viewport, ViewportSize},
};

/// Base raster tile layer of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_owned(),
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_owned(),
        }
    }
}

/// Everything a map view is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    /// Location of the region border document. `None` disables the border.
    pub region_source: Option<String>,
    pub station_source: String,
    pub center: LatLon,
    pub zoom: f64,
    /// Pixels kept free around the region when fitting the viewport.
    pub padding: f64,
    pub viewport_size: ViewportSize,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub tiles: TileLayer,
    pub styles: MapStyles,
    pub palette: CasterPalette,
}

impl MapOptions {
    pub fn new(region_source: Option<String>, station_source: String) -> Self {
        Self {
            region_source,
            station_source,
            center: LatLon::new(64.5, 26.0),
            zoom: 10.0,
            padding: 50.0,
            viewport_size: ViewportSize::default(),
            min_zoom: 0.0,
            max_zoom: 19.0,
            tiles: TileLayer::default(),
            styles: MapStyles::default(),
            palette: CasterPalette::default(),
        }
    }
}

/// A basestation map: a viewport over base tiles plus the overlays drawn on it.
///
/// Overlays are only ever appended.
#[derive(Debug)]
pub struct MapView {
    options: MapOptions,
    viewport: Viewport,
    region_bounds: Option<Rect>,
    overlays: Vec<Overlay>,
}

impl MapView {
    pub fn new(options: MapOptions) -> anyhow::Result<Self> {
        let size = options.viewport_size;
        if size.width == 0 || size.height == 0 {
            return Err(anyhow!(
                "Map viewport must not be empty, got {}x{}",
                size.width,
                size.height
            ));
        }
        if !options.center.is_valid() {
            return Err(anyhow!("Invalid map center {:?}", options.center));
        }
        if options.min_zoom > options.max_zoom
            || !(options.min_zoom..=options.max_zoom).contains(&options.zoom)
        {
            return Err(anyhow!(
                "Zoom {} outside of the allowed range {}..={}",
                options.zoom,
                options.min_zoom,
                options.max_zoom
            ));
        }

        let viewport = Viewport {
            center: options.center,
            zoom: options.zoom,
        };
        Ok(Self {
            options,
            viewport,
            region_bounds: None,
            overlays: Vec::new(),
        })
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Bounds the viewport was last fitted to, if a region border was drawn.
    pub fn region_bounds(&self) -> Option<Rect> {
        self.region_bounds
    }

    pub fn tiles(&self) -> &TileLayer {
        &self.options.tiles
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    /// Draw the region border, fit the viewport to it and dim everything outside.
    ///
    /// Without a region source nothing is fetched and the view is left as is. The view is
    /// only touched once the whole document has been fetched and validated.
    pub fn render_region_border(&mut self, source: &dyn DataSource) -> Result<(), DataFetchError> {
        let location = match &self.options.region_source {
            Some(location) => location.clone(),
            None => return Ok(()),
        };

        let contents = source.fetch(&location)?;
        let region = RegionBoundary::parse(&contents)
            .map_err(|err| DataFetchError::parse(&location, err))?;
        log::info!(
            "Rendering border of {} with {} rings",
            region.name().unwrap_or("region"),
            region.rings().count()
        );

        let rings: Vec<_> = region.rings().cloned().collect();
        let path = PathOutline::from_rings(&rings);
        self.overlays.push(Overlay::Outline {
            rings,
            path,
            style: self.options.styles.region.clone(),
            animation: self.options.styles.region_animation,
        });

        self.viewport = fit_bounds(
            &region.bounds(),
            self.options.viewport_size,
            self.options.padding,
            self.options.min_zoom,
            self.options.max_zoom,
        );
        self.region_bounds = Some(region.bounds());
        log::debug!("Fitted viewport to region: {:?}", self.viewport);

        self.overlays.push(Overlay::Mask {
            polygon: region.mask_polygon(),
            style: self.options.styles.mask.clone(),
        });
        Ok(())
    }

    /// Draw a coverage circle and a labelled marker for every station in the list.
    ///
    /// All coverage circles come before all markers so that markers stay on top. Returns
    /// the number of stations drawn. Calling this again draws every station again.
    pub fn render_stations(&mut self, source: &dyn DataSource) -> Result<usize, DataFetchError> {
        let location = self.options.station_source.clone();
        let contents = source.fetch(&location)?;
        let list =
            StationList::from_json(&contents).map_err(|err| DataFetchError::parse(&location, err))?;

        let styles = &self.options.styles;
        let palette = &self.options.palette;
        let mut unknown_casters = 0;

        let coverage = list.stations.iter().map(|station| {
            if !palette.is_known(&station.caster) {
                unknown_casters += 1;
            }
            Overlay::Circle {
                center: LatLon::new(station.lat, station.lon),
                radius: styles.coverage_radius,
                style: ShapeStyle {
                    fill_color: Some(palette.color_for(&station.caster).to_owned()),
                    ..styles.coverage.clone()
                },
                popup: None,
            }
        });
        let points = list.stations.iter().map(|station| Overlay::Circle {
            center: LatLon::new(station.lat, station.lon),
            radius: styles.point_radius,
            style: styles.point.clone(),
            popup: Some(station.id.clone()),
        });
        let layers: Vec<Overlay> = coverage.chain(points).collect();

        if unknown_casters > 0 {
            log::warn!(
                "{} stations have a caster without a configured color, drawing them in {}",
                unknown_casters,
                palette.fallback
            );
        }
        log::info!("Rendering {} stations from {}", list.len(), location);
        self.overlays.extend(layers);
        Ok(list.len())
    }
}

/// Build the map the way a page load does: border first, then stations.
///
/// A failing border stops the stations from being fetched at all.
pub fn load_map(options: MapOptions, source: &dyn DataSource) -> anyhow::Result<MapView> {
    let mut view = MapView::new(options)?;
    view.render_region_border(source)?;
    view.render_stations(source)?;
    Ok(view)
}
