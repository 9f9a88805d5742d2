//! Configuration module for Weft.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{GeneralSettings, PipelineSettings, Settings};
