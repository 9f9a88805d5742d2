//! CLI command implementations.

mod align;
mod config;

pub use align::run_align;
pub use config::run_config;
