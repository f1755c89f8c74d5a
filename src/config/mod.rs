/// Configuration system for lendmetrics
///
/// - `macros`: the `config_struct!` macro (structs with embedded defaults)
/// - `schemas`: every configuration section
/// - `utils`: TOML loading and saving
pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{ BatchConfig, Config, MetricsConfig, OutputConfig };
pub use utils::{ load_config_from_path, save_config, CONFIG_FILE_PATH };
