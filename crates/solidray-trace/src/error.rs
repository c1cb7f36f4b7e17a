//! Error types for tracing.

use thiserror::Error;

/// Errors that can stop a trace before any pixel is written.
#[derive(Error, Debug)]
pub enum TraceError {
    /// Camera parameters that cannot form a view.
    #[error("invalid view: {0}")]
    InvalidView(String),

    /// Image dimensions that are zero or too large to allocate.
    #[error("invalid image size {width}x{height}")]
    ImageSize {
        /// Requested width in pixels.
        width: usize,
        /// Requested height in pixels.
        height: usize,
    },

    /// The worker pool could not be started.
    #[error("thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Engine or scene configuration that failed to parse.
    #[error("config: {0}")]
    Config(String),
}

/// Result type for tracing operations.
pub type Result<T> = std::result::Result<T, TraceError>;
