use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pack operations
pub type Result<T> = std::result::Result<T, PackError>;

/// Unified error type for all pack operations
#[derive(Debug, Error)]
pub enum PackError {
    // Usage errors
    #[error("Usage error: {0}")]
    Usage(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // Format errors
    #[error("Source {name} shrank during packing: expected {expected} bytes, found {actual}")]
    SourceTruncated {
        name: String,
        expected: u64,
        actual: u64,
    },

    #[error("Source {name} carries a trailer magic but is only {size} bytes (trailer needs {needed})")]
    TrailerTooShort { name: String, size: u64, needed: u64 },

    #[error("Model {name} has a non-finite extent in its trailer")]
    NonFiniteExtent { name: String },

    #[error("Invalid entry name: {0}")]
    InvalidName(String),

    #[error("Duplicate entry in build: {0}")]
    DuplicateEntry(String),

    #[error("Entry {name} written at payload offset {actual}, planned for {planned}")]
    PlanMismatch {
        name: String,
        planned: u64,
        actual: u64,
    },

    #[error("Manifest too large for header: {0} bytes")]
    ManifestTooLarge(usize),

    // Reader errors
    #[error("Invalid pack magic: expected {expected:#010x}, found {found:#010x}")]
    InvalidMagic { expected: u32, found: u32 },

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Entry not found in pack: {0}")]
    EntryNotFound(String),

    #[error("Entry {name} lies outside the payload section ({offset} + {size} > {payload_len})")]
    EntryOutOfBounds {
        name: String,
        offset: u64,
        size: u64,
        payload_len: u64,
    },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PackError {
    /// Wrap an I/O error with the path it happened on
    pub fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PackError::File {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by the shape of the input rather than the filesystem
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            PackError::SourceTruncated { .. }
                | PackError::TrailerTooShort { .. }
                | PackError::NonFiniteExtent { .. }
                | PackError::InvalidName(_)
                | PackError::DuplicateEntry(_)
                | PackError::PlanMismatch { .. }
                | PackError::ManifestTooLarge(_)
        )
    }
}

impl From<toml::de::Error> for PackError {
    fn from(err: toml::de::Error) -> Self {
        PackError::Config(err.to_string())
    }
}

impl From<roxmltree::Error> for PackError {
    fn from(err: roxmltree::Error) -> Self {
        PackError::InvalidManifest(err.to_string())
    }
}
