use std::{fs, path::PathBuf};

use anyhow::{anyhow, Context};

use crate::{
    config::CasterConfig,
    stations::{
        sort::{sort_stations, SortOrder},
        StationList,
    },
};

use super::{
    client::fetch_source_table,
    filter::{filter_stations, StationFilter},
    sourcetable::parse_source_table,
};

#[derive(Debug)]
pub struct UpdateOptions {
    /// Tag written into every station, also the name of the caster in the config.
    pub caster: String,
    /// Download a fresh source table instead of only using the cached one.
    pub fetch: bool,
    /// Allow replacing an existing cached source table.
    pub overwrite: bool,
    /// Add to the stations already in `output` instead of replacing them.
    pub append: bool,
    pub filter: StationFilter,
    pub sort: SortOrder,
    pub output: PathBuf,
}

/// Refresh the cached source table if asked to, then write the filtered, sorted station list.
pub fn update_station_list(
    options: &UpdateOptions,
    caster: &CasterConfig,
) -> anyhow::Result<StationList> {
    let cachefile = &caster.cachefile;
    if !cachefile.exists() && !options.fetch {
        return Err(anyhow!(
            "Cache file {:?} does not exist. Need to retrieve source table list with --fetch.",
            cachefile
        ));
    }

    if options.fetch {
        if cachefile.exists() && !options.overwrite {
            return Err(anyhow!(
                "Data already exists in cache file {:?}. Use --overwrite to overwrite.",
                cachefile
            ));
        }
        let source_table = fetch_source_table(caster)?;
        log::debug!("Caching source table to {:?}", cachefile);
        fs::write(cachefile, source_table)
            .with_context(|| format!("Writing source table cache {:?}", cachefile))?;
    }

    log::info!("Filtering source table from {:?}", cachefile);
    let source_table = fs::read_to_string(cachefile)
        .with_context(|| format!("Reading source table cache {:?}", cachefile))?;
    let records = parse_source_table(&source_table);
    let stations = filter_stations(&records, &options.filter, &options.caster);

    let mut list = if options.append && options.output.exists() {
        let mut existing = StationList::read_from_file(&options.output)?;
        log::info!(
            "Appending {} stations to {} in {:?}",
            stations.len(),
            existing.len(),
            options.output
        );
        existing.stations.extend(stations);
        existing
    } else {
        StationList {
            stations,
            timestamp: None,
        }
    };

    sort_stations(&mut list.stations, options.sort);
    list.touch();

    log::info!(
        "Saving filtered station list of {} stations to {:?}",
        list.len(),
        options.output
    );
    list.write_to_file(&options.output)?;
    Ok(list)
}
