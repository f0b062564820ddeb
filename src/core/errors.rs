/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of any virtual filesystem operation
///
/// # Must Use
/// Filesystem operations can fail and the adaptor must translate the failure
#[must_use = "nxfs operations can fail and must be handled"]
pub type NxfsResult<T> = Result<T, NxfsError>;

/// Errors raised while building or serving the virtual tree
///
/// Configuration and shape errors are recoverable: the builder logs them and
/// keeps the best rule it has. Everything crossing the adaptor boundary is
/// reduced to an errno via [`NxfsError::errno`].
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum NxfsError {
    #[error("Not found: {0}")]
    #[diagnostic(
        code(nxfs::not_found),
        help("The path is not part of the virtual tree. List the parent folder to see what exists.")
    )]
    NotFound(String),

    #[error("Already exists: {0}")]
    #[diagnostic(
        code(nxfs::already_exists),
        help("Two source entries map to the same virtual path. Check extension options for collisions.")
    )]
    AlreadyExists(String),

    #[error("Invalid path: {0}")]
    #[diagnostic(code(nxfs::invalid_path))]
    InvalidPath(String),

    #[error("Not a file: {0}")]
    #[diagnostic(code(nxfs::not_a_file), help("Folders have no content to read."))]
    NotAFile(String),

    #[error("Invalid configuration for {path}: {reason}")]
    #[diagnostic(
        code(nxfs::invalid_configuration),
        help("A matched rule is missing required options. The previous rule stays in effect.")
    )]
    InvalidConfiguration { path: String, reason: String },

    #[error("Unsupported shape for {path}: {reason}")]
    #[diagnostic(
        code(nxfs::unsupported_shape),
        help("Image expansion needs a rank-3 field ([frames, rows, columns]).")
    )]
    UnsupportedShape { path: String, reason: String },

    #[error("Source unavailable: {0}")]
    #[diagnostic(
        code(nxfs::source_unavailable),
        help("The data container is closed or could not be opened. Check the file path and permissions.")
    )]
    SourceUnavailable(String),

    #[error("Unknown element type {element_type} in {path}")]
    #[diagnostic(code(nxfs::unknown_element_type))]
    UnknownElementType { path: String, element_type: String },

    #[error("Image encoding failed: {0}")]
    #[diagnostic(code(nxfs::codec))]
    Codec(String),

    #[error("Rules document error: {0}")]
    #[diagnostic(
        code(nxfs::config_parse),
        help("The rules document must be well-formed XML with a <filters> root element.")
    )]
    ConfigParse(String),

    #[error("I/O error: {0}")]
    #[diagnostic(code(nxfs::io))]
    Io(String),
}

impl NxfsError {
    /// Shorthand for a missing virtual or source path
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// POSIX error code reported to the filesystem adaptor
    pub fn errno(&self) -> i32 {
        match self {
            Self::NotFound(_) | Self::InvalidPath(_) => ENOENT,
            Self::AlreadyExists(_) => EEXIST,
            Self::NotAFile(_) => EISDIR,
            Self::InvalidConfiguration { .. } | Self::UnsupportedShape { .. } => EINVAL,
            Self::SourceUnavailable(_)
            | Self::UnknownElementType { .. }
            | Self::Codec(_)
            | Self::ConfigParse(_)
            | Self::Io(_) => EIO,
        }
    }
}

impl From<std::io::Error> for NxfsError {
    fn from(err: std::io::Error) -> Self {
        NxfsError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for NxfsError {
    fn from(err: serde_json::Error) -> Self {
        NxfsError::SourceUnavailable(format!("invalid container description: {}", err))
    }
}

// errno values are fixed by POSIX; kept local so the library does not need libc
const ENOENT: i32 = 2;
const EIO: i32 = 5;
const EEXIST: i32 = 17;
const EISDIR: i32 = 21;
const EINVAL: i32 = 22;
