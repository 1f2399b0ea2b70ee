/// A `STR` record of an NTRIP source table: one mountpoint streaming corrections.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRecord {
    pub mountpoint: String,
    pub identifier: String,
    /// Three-letter country code as listed by the caster, e.g. `FIN`.
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

const MOUNTPOINT_FIELD: usize = 1;
const IDENTIFIER_FIELD: usize = 2;
const COUNTRY_FIELD: usize = 8;
const LAT_FIELD: usize = 9;
const LON_FIELD: usize = 10;

fn parse_stream_record(line: &str) -> Option<StreamRecord> {
    let fields: Vec<&str> = line.split(';').map(str::trim).collect();
    if fields.len() <= LON_FIELD {
        return None;
    }
    // Casters write "none" or leave the field empty for stations without a position.
    let lat = fields[LAT_FIELD].parse::<f64>().ok()?;
    let lon = fields[LON_FIELD].parse::<f64>().ok()?;
    if !lat.is_finite() || !lon.is_finite() {
        return None;
    }
    Some(StreamRecord {
        mountpoint: fields[MOUNTPOINT_FIELD].to_owned(),
        identifier: fields[IDENTIFIER_FIELD].to_owned(),
        country: fields[COUNTRY_FIELD].to_owned(),
        lat,
        lon,
    })
}

/// Stream records of a source table, up to `ENDSOURCETABLE`. `CAS` and `NET` records are
/// ignored, as are streams without a usable position.
pub fn parse_source_table(contents: &str) -> Vec<StreamRecord> {
    let mut records = Vec::new();
    let mut skipped = 0;
    for line in contents.lines() {
        if line.starts_with("ENDSOURCETABLE") {
            break;
        }
        if !line.starts_with("STR") {
            continue;
        }
        match parse_stream_record(line) {
            Some(record) => records.push(record),
            None => {
                skipped += 1;
                log::debug!("Skipping stream record without position: {}", line);
            }
        }
    }
    log::info!(
        "Read {} stream records, skipped {} without a position",
        records.len(),
        skipped
    );
    records
}
