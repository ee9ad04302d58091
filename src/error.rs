use std::path::PathBuf;

/// Error type for metadata lookup, extraction and rendering.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The package's `metadata.xml` could not be read or parsed.
    #[error("no metadata available at {}: {reason}", path.display())]
    MetadataUnavailable {
        /// Location of the metadata document.
        path: PathBuf,
        /// Underlying I/O or XML error, rendered as text.
        reason: String,
    },

    /// The herds registry could not be read or parsed.
    #[error("herds registry unavailable at {}: {reason}", path.display())]
    RegistryUnavailable {
        /// Location of the registry document.
        path: PathBuf,
        /// Underlying I/O or XML error, rendered as text.
        reason: String,
    },

    /// The query matched no package directory in any repository.
    #[error("no matches found for \"{0}\"")]
    NoSuchPackage(String),

    /// A bare package name matched several categories.
    #[error("ambiguous package name \"{query}\", candidates: {}", candidates.join(" "))]
    AmbiguousPackage {
        /// The query as given on the command line.
        query: String,
        /// Every `category/name` the query could refer to.
        candidates: Vec<String>,
    },

    /// Invalid package query string.
    #[error("invalid package query: {0}")]
    InvalidQuery(String),

    /// Malformed `make.conf` style configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed or missing command-line arguments.
    #[error("{0}")]
    Usage(String),

    /// Failure writing to an output stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for portage-meta operations.
pub type Result<T> = std::result::Result<T, Error>;
