//! Unified error type.

use std::path::PathBuf;

/// Boxed error carried by streaming request bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error type returned by shelf's fallible operations.
///
/// Application-level errors (404, 500, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// startup and infrastructure failures: loading the catalog, reading config,
/// binding a port, draining a request body.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read catalog {}: {source}", .path.display())]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {}: {source}", .path.display())]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("failed to read request body: {0}")]
    Body(BoxError),
}

impl From<figment::Error> for Error {
    fn from(e: figment::Error) -> Self {
        Self::Config(Box::new(e))
    }
}
