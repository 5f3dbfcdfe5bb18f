//! Configuration file loading for investa
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. `INVESTA_*` environment variables (`INVESTA_VOTING__STOP_RULE=60%`)
//! 3. Project root: `./investa.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/investa/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileLoggingConfig, FileOutputConfig, FilePricingConfig, FileRoomsConfig,
    FileVotingConfig,
};
pub use loader::ConfigLoader;
