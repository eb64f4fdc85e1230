//! Render error types
//!
//! Every failure surfaced by the device layer is unrecoverable: device
//! loss requires full reinitialization, which is out of scope, so the
//! frame loop propagates these errors outward and the process ends
//! after logging a diagnostic. There is deliberately no retry path.

use thiserror::Error;

/// Result alias for render operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Fatal rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Device resource creation failed
    #[error("device resource creation failed: {0}")]
    ResourceCreation(String),

    /// Command submission to the GPU queue failed
    #[error("command submission failed: {0}")]
    Submission(String),

    /// Fence signal or wait failed
    #[error("fence operation failed: {0}")]
    Fence(String),

    /// Swapchain presentation failed
    #[error("presentation failed: {0}")]
    Presentation(String),
}
