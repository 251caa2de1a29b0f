//! Error types for autoplay construction and configuration
//!
//! The running engine has no recoverable errors. Everything here is raised
//! while building an instance and is handled by skipping that instance.

use thiserror::Error;

use crate::Direction;

/// Core autoplay errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AutoplayError {
    // Construction errors
    #[error("Carousel root not found for selector {selector:?}")]
    RootNotFound { selector: String },

    #[error("Carousel has no navigation controls")]
    NoNavigationControls,

    #[error("No navigation control at index {index} for direction {direction}")]
    MissingControl { direction: Direction, index: usize },

    // Configuration errors
    #[error("Invalid cycle duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid root margin: {0}")]
    InvalidRootMargin(String),

    // Host errors
    #[error("Driver error: {0}")]
    Driver(String),
}

/// Result type for autoplay operations
pub type AutoplayResult<T> = Result<T, AutoplayError>;
