use std::fs;

use super::error::DataFetchError;

/// Something that can hand out the raw text of a map input document.
pub trait DataSource {
    fn fetch(&self, location: &str) -> Result<String, DataFetchError>;
}

/// Fetches `http://` and `https://` locations over HTTP and reads everything else from disk.
pub struct DefaultSource {
    client: reqwest::blocking::Client,
}

impl DefaultSource {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("basestation-map/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    fn fetch_http(&self, url: &str) -> Result<String, DataFetchError> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| DataFetchError::fetch(url, err))?;
        response
            .text()
            .map_err(|err| DataFetchError::fetch(url, err))
    }
}

pub fn is_http_location(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

impl DataSource for DefaultSource {
    fn fetch(&self, location: &str) -> Result<String, DataFetchError> {
        if is_http_location(location) {
            self.fetch_http(location)
        } else {
            log::debug!("Reading {}", location);
            fs::read_to_string(location).map_err(|err| DataFetchError::fetch(location, err))
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use testdir::testdir;

    use super::{is_http_location, DataSource, DefaultSource};
    use crate::map::error::DataFetchError;

    #[rstest]
    #[case("http://localhost:8000/stations.json", true)]
    #[case("https://example.org/region.geojson", true)]
    #[case("data/stations.json", false)]
    #[case("/tmp/http.json", false)]
    fn test_is_http_location(#[case] location: &str, #[case] expected: bool) {
        assert_eq!(expected, is_http_location(location));
    }

    #[test]
    fn test_default_source_reads_files() {
        let dir = testdir!();
        let path = dir.join("stations.json");
        std::fs::write(&path, r#"{"stations": []}"#).unwrap();

        let source = DefaultSource::new().unwrap();
        let contents = source.fetch(path.to_str().unwrap()).unwrap();
        assert_eq!(r#"{"stations": []}"#, contents);
    }

    #[test]
    fn test_default_source_missing_file_is_fetch_error() {
        let dir = testdir!();
        let path = dir.join("missing.json");
        let location = path.to_str().unwrap();

        let source = DefaultSource::new().unwrap();
        let err = source.fetch(location).unwrap_err();
        assert!(matches!(err, DataFetchError::Fetch { .. }));
        assert_eq!(location, err.location());
    }
}
