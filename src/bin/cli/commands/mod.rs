//! CLI Command Implementations
//!
//! - compute: sketch sequence files into signatures
//! - compare: similarity matrix over signature files
//! - search: rank a collection against a query
//! - plot: external dendrogram and heatmap rendering
//! - import: CSV hash dumps from other tools
//! - config: configuration management commands

pub mod compare;
pub mod compute;
pub mod config;
pub mod import;
pub mod plot;
pub mod search;

pub use compare::compare_command;
pub use compute::compute_command;
pub use config::{init_config, print_default_config, validate_config};
pub use import::import_csv_command;
pub use plot::plot_command;
pub use search::search_command;
