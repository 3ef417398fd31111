//! Error types for the Animus render pipeline
//!
//! Every fallible operation in the crate returns [`Result`]. The variants
//! follow the pipeline's failure taxonomy: construction and resize errors
//! abort the operation that raised them, per-frame errors abort the frame.

use std::fmt;

/// Result type for Animus operations
pub type Result<T> = std::result::Result<T, Error>;

/// Animus render pipeline errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The graphics device refused to allocate a GPU object
    DeviceResourceError(String),

    /// A shader/geometry key could not be resolved by the asset collaborator
    AssetNotFound(String),

    /// A result was requested under a name that has no live entry
    UnknownResultKey(String),

    /// The device reported an incomplete attachment set after binding
    FramebufferIncomplete(String),

    /// A resource was assembled from incompatible parts
    InvalidResource(String),

    /// A lifecycle contract was violated (wrong pass state, destroyed target, ...)
    UsageError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DeviceResourceError(msg) => write!(f, "Device resource error: {}", msg),
            Error::AssetNotFound(key) => write!(f, "Asset not found: {}", key),
            Error::UnknownResultKey(name) => write!(f, "Unknown result key: {}", name),
            Error::FramebufferIncomplete(msg) => write!(f, "Framebuffer incomplete: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::UsageError(msg) => write!(f, "Usage error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Prefix a device error's message with what was being built.
    ///
    /// Other variants pass through unchanged so a refused allocation is
    /// reported once, not wrapped in a second `DeviceResourceError`.
    pub fn context(self, what: &str) -> Error {
        match self {
            Error::DeviceResourceError(msg) => {
                Error::DeviceResourceError(format!("{}: {}", what, msg))
            }
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
