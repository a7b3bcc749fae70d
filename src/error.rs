use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading, decomposing and assembling web templates
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Filesystem access failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Selector text could not be parsed
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// Manifest text is not valid JSON, even after sanitizing
    #[error("Manifest is not valid JSON ({reason}). {hint}")]
    ManifestUnparseable { reason: String, hint: String },

    /// A document required by the run is not present
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// The requested run directory does not exist
    #[error("Run not found: {0}")]
    RunNotFound(String),

    /// Run names are single path components
    #[error("Invalid run name: {0}")]
    InvalidRunName(String),

    /// Artifact is not part of the download allow-list
    #[error("Artifact not allowed: {0}")]
    ArtifactNotAllowed(String),

    /// Building the zip archive failed
    #[error("Archive creation failed: {0}")]
    ArchiveFailed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TemplateError {
    /// Wrap an I/O error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TemplateError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;
