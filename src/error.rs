//! Error types for tomcat-home
//!
//! All modules use `TomcatResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tomcat-home operations
pub type TomcatResult<T> = Result<T, TomcatError>;

/// All errors that can occur while contributing the Tomcat layer
#[derive(Error, Debug)]
pub enum TomcatError {
    // Resolution errors
    #[error("No dependency satisfies {id} {constraint} on stack {stack}")]
    ResolutionFailed {
        id: String,
        constraint: String,
        stack: String,
    },

    #[error("Build plan has no entry for {0}")]
    PlanEntryMissing(String),

    #[error("Invalid version constraint for {id}: {constraint}")]
    VersionConstraint { id: String, constraint: String },

    // Fetch errors
    #[error("Failed to fetch {uri}: {reason}")]
    Fetch { uri: String, reason: String },

    #[error("Checksum mismatch for {uri}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        uri: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid sha256 {digest:?} for {uri}: expected 64 hex characters")]
    InvalidDigest { uri: String, digest: String },

    // Extraction errors
    #[error("Failed to extract {archive}: {source}")]
    Extraction {
        archive: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to extract {entry} from {archive}: path escapes destination")]
    UnsafeArchiveEntry { archive: PathBuf, entry: String },

    // Startup script errors
    #[error("Failed to patch startup script {path}: {source}")]
    PatchIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TomcatError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an extraction error for an archive
    pub fn extraction(archive: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Extraction {
            archive: archive.into(),
            source,
        }
    }

    /// Create a startup script patch error
    pub fn patch_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PatchIo {
            path: path.into(),
            source,
        }
    }

    /// Create a fetch error
    pub fn fetch(uri: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ResolutionFailed { .. } => {
                Some("Check the version requested in the build plan against buildpack.toml")
            }
            Self::PlanEntryMissing(_) => Some("Run detect first to write a build plan"),
            Self::ChecksumMismatch { .. } => {
                Some("The archive changed upstream; update sha256 in buildpack.toml")
            }
            Self::InvalidDigest { .. } => Some("Fix the sha256 entry in buildpack.toml"),
            Self::PatchIo { .. } => Some("The archive must contain bin/catalina.sh"),
            _ => None,
        }
    }
}
