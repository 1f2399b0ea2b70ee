use thiserror::Error;

/// Failure to obtain one of the map's input documents.
#[derive(Debug, Error)]
pub enum DataFetchError {
    /// The network request or file read failed.
    #[error("Could not fetch {location}: {source}")]
    Fetch {
        location: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The document was fetched but is not valid JSON or has an unexpected shape.
    #[error("Could not parse {location}: {message}")]
    Parse { location: String, message: String },
}

impl DataFetchError {
    pub fn fetch<E>(location: &str, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Fetch {
            location: location.to_owned(),
            source: source.into(),
        }
    }

    pub fn parse(location: &str, message: impl ToString) -> Self {
        Self::Parse {
            location: location.to_owned(),
            message: message.to_string(),
        }
    }

    pub fn location(&self) -> &str {
        match self {
            DataFetchError::Fetch { location, .. } => location,
            DataFetchError::Parse { location, .. } => location,
        }
    }
}
