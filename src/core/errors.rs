//! Error types for the seqsketch-rs library.
//!
//! Every fallible library operation returns [`SketchError`]. Per-file and
//! per-record failures are surfaced as values so that callers can report them
//! item by item instead of aborting a whole batch.

use std::io;
use std::num::ParseIntError;

use thiserror::Error;

use crate::sketch::MoleculeType;

/// Main result type for seqsketch operations.
pub type Result<T> = std::result::Result<T, SketchError>;

/// Error type for all sketching, comparison and search operations.
#[derive(Error, Debug)]
pub enum SketchError {
    /// I/O related errors (file operations, pipes, etc.)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Contradictory or empty requests (no moltypes, k out of range, ...)
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Merge or comparison across sketches with different parameters
    #[error("Incompatible sketches: {message}")]
    IncompatibleSketch {
        /// Error description
        message: String,
        /// Parameters of the left-hand sketch
        left: Option<String>,
        /// Parameters of the right-hand sketch
        right: Option<String>,
    },

    /// A search query has no sketch for the requested parameters
    #[error("Incompatible query: {message}")]
    IncompatibleQuery {
        /// Error description
        message: String,
        /// Requested k-mer size
        ksize: u32,
        /// Requested molecule type
        moltype: MoleculeType,
    },

    /// Unparseable sequence data or corrupt serialized signature
    #[error("Malformed input{}: {message}", source_name.as_ref().map(|s| format!(" in {s}")).unwrap_or_default())]
    MalformedInput {
        /// Error description
        message: String,
        /// File or stream the input came from
        source_name: Option<String>,
        /// Record index inside the source (if available)
        record: Option<usize>,
    },

    /// Both sketches were empty and a real score was required
    #[error("Degenerate comparison: {message}")]
    DegenerateComparison {
        /// Error description
        message: String,
    },

    /// Nothing in a comparison request carries a usable sketch
    #[error("No compatible sketches for k={ksize} ({moltype})")]
    NoCompatibleSketches {
        /// Requested k-mer size
        ksize: u32,
        /// Requested molecule type
        moltype: MoleculeType,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data type being serialized
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The cooperative wall-clock deadline expired
    #[error("Timed out: {message}")]
    Timeout {
        /// Error description
        message: String,
    },
}

impl SketchError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new incompatible-sketch error
    pub fn incompatible(
        message: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self::IncompatibleSketch {
            message: message.into(),
            left: Some(left.into()),
            right: Some(right.into()),
        }
    }

    /// Create a new incompatible-query error
    pub fn incompatible_query(message: impl Into<String>, ksize: u32, moltype: MoleculeType) -> Self {
        Self::IncompatibleQuery {
            message: message.into(),
            ksize,
            moltype,
        }
    }

    /// Create a new malformed-input error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
            source_name: None,
            record: None,
        }
    }

    /// Create a new malformed-input error tied to a source and record
    pub fn malformed_record(
        message: impl Into<String>,
        source_name: impl Into<String>,
        record: Option<usize>,
    ) -> Self {
        Self::MalformedInput {
            message: message.into(),
            source_name: Some(source_name.into()),
            record,
        }
    }

    /// Create a new degenerate-comparison error
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateComparison {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Attach the originating file to malformed-input and I/O errors
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        match &mut self {
            Self::MalformedInput { source_name, .. } => {
                if source_name.is_none() {
                    *source_name = Some(name.into());
                }
            }
            Self::Io { message, .. } => {
                *message = format!("{message} ({})", name.into());
            }
            _ => {}
        }
        self
    }

    /// Whether this error should fail a run outright rather than one item
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

impl From<io::Error> for SketchError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for SketchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for SketchError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<csv::Error> for SketchError {
    fn from(err: csv::Error) -> Self {
        Self::Serialization {
            message: format!("CSV processing failed: {err}"),
            data_type: Some("CSV".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<ParseIntError> for SketchError {
    fn from(err: ParseIntError) -> Self {
        Self::malformed(format!("Invalid integer: {err}"))
    }
}
