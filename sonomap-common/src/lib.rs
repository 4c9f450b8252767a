//! # SonoMap Common Library
//!
//! Shared code for the SonoMap embedding explorer:
//! - Event types (PanelEvent enum) and the EventBus
//! - Shared vocabulary types (analysis kinds, selection modes, projection settings)
//! - Configuration loading
//! - SSE helpers

pub mod config;
pub mod error;
pub mod events;
pub mod sse;

pub use error::{Error, Result};
