//! Common error types for SonoMap

use thiserror::Error;

/// Common result type for SonoMap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across SonoMap crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
