extern crate log;
pub mod config;
pub mod geofile;
pub mod map;
pub mod ntrip;
pub mod osm;
pub mod stations;
pub mod web;
use crate::config::Config;
use crate::geofile::geojson::write_feature_collection;
use crate::geofile::region::RegionBoundary;
use crate::map::export::write_scene;
use crate::map::source::DefaultSource;
use crate::ntrip::filter::StationFilter;
use crate::ntrip::update::{update_station_list, UpdateOptions};
use crate::osm::conversion::{
    boundaries_to_feature_collection, read_boundary_relations, simplify_polygons,
};
use crate::osm::download::{run_overpass_query, DEFAULT_BORDER_QUERY, OVERPASS_URL};
use crate::stations::sort::SortOrder;
use anyhow::anyhow;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Maps NTRIP base stations and the region they serve.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output, twice for debug messages.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Retrieve a region border from the Overpass API as GeoJSON.
    Border(BorderArgs),
    /// Update a station list from the source table of an NTRIP caster.
    Stations(StationsArgs),
    /// Build the map from a region border and a station list and write it as a web page.
    Render(RenderArgs),
    /// Serve a directory containing the map page over HTTP.
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug)]
struct BorderArgs {
    /// Skip simplification.
    #[arg(long)]
    no_simplification: bool,

    /// Tolerance used for simplification, in degrees.
    #[arg(short, long, default_value_t = 0.001)]
    tolerance: f64,

    /// Output GeoJSON file, use - for stdout.
    #[arg(short, long)]
    output: String,

    #[arg(long, default_value = OVERPASS_URL)]
    overpass_url: String,

    /// Overpass query to use.
    #[arg(default_value = DEFAULT_BORDER_QUERY)]
    query: String,
}

#[derive(clap::Args, Debug)]
#[command(group(
    clap::ArgGroup::new("area")
        .required(true)
        .args(["everything", "country", "region"])
))]
struct StationsArgs {
    /// Really fetch the source table instead of using the cached one.
    #[arg(short, long)]
    fetch: bool,

    /// Overwrite a previously fetched source table.
    #[arg(short, long)]
    overwrite: bool,

    /// Append stations to an existing list.
    #[arg(short, long)]
    append: bool,

    /// From how far outside the region, in kilometers, stations are counted in.
    #[arg(short, long, default_value_t = 20.0)]
    buffer: f64,

    /// Everything without filtering.
    #[arg(short, long)]
    everything: bool,

    /// Three-letter country code for all base stations in a country.
    #[arg(short, long)]
    country: Option<String>,

    /// GeoJSON file containing the region border.
    #[arg(short, long)]
    region: Option<PathBuf>,

    /// How to sort the stations.
    #[arg(short, long, value_enum, default_value_t = SortOrder::Coordinates)]
    sort: SortOrder,

    /// Which configured caster to poll stations from.
    caster: String,

    /// Output JSON filename.
    output: PathBuf,
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// URL or path of the region border GeoJSON. Without it no border is drawn.
    #[arg(long)]
    region: Option<String>,

    /// URL or path of the station list.
    #[arg(long)]
    stations: String,

    /// Directory the page and scene are written to.
    #[arg(short, long, default_value = "web")]
    output_dir: PathBuf,
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Directory to serve.
    #[arg(short, long, default_value = "./web/")]
    dir: PathBuf,

    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    #[arg(long, default_value = "0.0.0.0")]
    host: String,
}

fn retrieve_border(args: &BorderArgs) -> anyhow::Result<()> {
    let response = run_overpass_query(&args.overpass_url, &args.query)?;

    log::info!("Converting OSM data to GeoJSON");
    let mut boundaries = read_boundary_relations(&response)?;
    if boundaries.is_empty() {
        return Err(anyhow!("The Overpass query returned no relations"));
    }
    if boundaries.len() > 1 {
        log::warn!(
            "The query returned {} relations, the map only draws single-feature borders",
            boundaries.len()
        );
    }

    if !args.no_simplification {
        log::info!("Simplifying borders with tolerance {}", args.tolerance);
        for boundary in boundaries.iter_mut() {
            boundary.polygons = simplify_polygons(&boundary.polygons, args.tolerance);
        }
    }

    let feature_collection = boundaries_to_feature_collection(&boundaries);
    if args.output == "-" {
        println!("{}", geojson::GeoJson::from(feature_collection));
    } else {
        log::info!("Writing output to {}", args.output);
        write_feature_collection(feature_collection, Path::new(&args.output))?;
    }
    Ok(())
}

fn update_stations(args: StationsArgs, config: &Config) -> anyhow::Result<()> {
    let caster = config.caster(&args.caster)?;

    let filter = match (args.everything, args.country, args.region) {
        (true, _, _) => StationFilter::Everything,
        (_, Some(country), _) => StationFilter::Country(country),
        (_, _, Some(region)) => StationFilter::Region {
            boundary: RegionBoundary::load(&region)?,
            buffer_km: args.buffer,
        },
        _ => return Err(anyhow!("One of --everything, --country or --region is required")),
    };

    let options = UpdateOptions {
        caster: args.caster,
        fetch: args.fetch,
        overwrite: args.overwrite,
        append: args.append,
        filter,
        sort: args.sort,
        output: args.output,
    };
    log::debug!("Station update options: {:?}", options);
    update_station_list(&options, caster)?;
    Ok(())
}

fn render_map(args: RenderArgs, config: &Config) -> anyhow::Result<()> {
    let options = config.map.to_options(args.region, args.stations);
    let source = DefaultSource::new()?;
    let view = map::load_map(options, &source)?;
    log::info!(
        "Map centered at {:?} with zoom {} and {} overlays",
        view.viewport().center,
        view.viewport().zoom,
        view.overlays().len()
    );
    write_scene(&view, &args.output_dir)
}

fn try_main() -> anyhow::Result<()> {
    let args = Args::parse();

    if std::env::var("RUST_LOG").is_err() {
        let level = match args.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        std::env::set_var("RUST_LOG", level)
    }
    env_logger::init();
    log::debug!("CLI arguments: {:?}", args);

    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Border(border_args) => retrieve_border(&border_args),
        Command::Stations(stations_args) => update_stations(stations_args, &config),
        Command::Render(render_args) => render_map(render_args, &config),
        Command::Serve(serve_args) => {
            let addr: SocketAddr = format!("{}:{}", serve_args.host, serve_args.port).parse()?;
            web::serve(serve_args.dir, addr)
        }
    }
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1)
    }
}
