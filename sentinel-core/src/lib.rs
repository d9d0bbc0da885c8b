//! Sentinel Core - Core data structures and trait definitions
//!
//! This module defines the shared abstractions for the whole recon-sentinel
//! system: investigation domain types, the enrichment and search contracts,
//! and the ambient error, configuration and logging stack.

pub mod config;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use error::*;
pub use logging::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio;
pub use tracing;
