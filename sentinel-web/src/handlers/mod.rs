//! HTTP request handlers for the Sentinel web server
//!
//! This module contains all the HTTP request handlers organized by functionality.

pub mod error;
pub mod health;
pub mod investigation;
pub mod pages;
pub mod types;

pub use error::ApiError;
pub use health::*;
pub use investigation::*;
pub use pages::*;

// Re-export all types for convenience
pub use types::*;
