//! Configuration: config file plus command-line overrides

mod config;

pub use config::{
    config_dir, default_config_file, ClientConfig, FileDefaults, CONFIG_DIR_ENV, DEFAULT_HOST,
    DEFAULT_PORT,
};
