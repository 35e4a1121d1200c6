//! Configuration file loading for chatnest
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CHATNEST_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./chatnest.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/chatnest/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAuthScheme, FileClientConfig, FileConfig, FileLoggingConfig,
    FileModelConfig, FileServerConfig,
};
pub use loader::ConfigLoader;
