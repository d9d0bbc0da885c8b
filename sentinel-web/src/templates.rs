//! Template system for server-side rendering
//!
//! This module provides templates for server-side rendering using Askama.

use askama::Template;

/// Dashboard page template
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub version: String,
    pub dev_mode: bool,
    /// Model behind the enrichment gateway, if known
    pub model: Option<String>,
    pub subject_max_len: usize,
}

impl IndexTemplate {
    pub fn new(dev_mode: bool, model: Option<String>, subject_max_len: usize) -> Self {
        Self {
            title: "Recon Sentinel".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            dev_mode,
            model,
            subject_max_len,
        }
    }
}
