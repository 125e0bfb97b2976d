//! CLI command handlers, one per file.

mod clone;
mod completions;
mod config;

pub use clone::run_clone;
pub use completions::run_completions;
pub use config::run_config;
