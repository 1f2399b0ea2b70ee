use anyhow::anyhow;

pub const OVERPASS_URL: &str = "http://overpass-api.de/api/interpreter";

/// Administrative boundary of Etelä-Pohjanmaa, Finland.
pub const DEFAULT_BORDER_QUERY: &str = r#"[out:json];
( area["ISO3166-1"="FI"][admin_level=2]; )->.a;
rel["name"="Etelä-Pohjanmaa"][admin_level=4](area.a);
out geom;
"#;

/// Run an Overpass QL query and return the raw JSON response.
pub fn run_overpass_query(url: &str, query: &str) -> anyhow::Result<String> {
    log::info!("Fetching region border from Overpass API at {}", url);
    log::debug!("Overpass query:\n{}", query);
    let client = reqwest::blocking::Client::builder()
        .user_agent("ntrip-basestation-mapper")
        .build()?;
    let response = client.post(url).body(query.to_owned()).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("Overpass API responded with {}", status));
    }
    response.text().or(Err(anyhow!("No response text")))
}
