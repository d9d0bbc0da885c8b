//! Type definitions for handlers
//!
//! This module contains all the request/response types used by the handlers.

pub mod common;
pub mod investigation;

// Re-export all types for convenience
pub use common::*;
pub use investigation::*;
