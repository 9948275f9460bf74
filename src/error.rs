use std::path::PathBuf;

use thiserror::Error;

use crate::records::DatasetKey;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Data corruption in {}: {reason}", path.display())]
    DataCorruption { path: PathBuf, reason: String },

    #[error("Render error: {0}")]
    Render(String),

    #[error("No dataset at {}", .0.display())]
    MissingDataset(PathBuf),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("{key}: {source}")]
    Entity {
        key: DatasetKey,
        #[source]
        source: Box<Error>,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Attach the dataset key an error belongs to. Already keyed errors are
    /// returned unchanged.
    pub fn for_key(self, key: &DatasetKey) -> Self {
        match self {
            Error::Entity { .. } => self,
            other => Error::Entity {
                key: key.clone(),
                source: Box::new(other),
            },
        }
    }

    pub fn key(&self) -> Option<&DatasetKey> {
        match self {
            Error::Entity { key, .. } => Some(key),
            _ => None,
        }
    }

    /// The error without its key wrapper.
    pub fn root(&self) -> &Error {
        match self {
            Error::Entity { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self.root(), Error::DataCorruption { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Fetch(e.to_string())
    }
}
