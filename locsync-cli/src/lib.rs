//! CLI library for testing purposes

pub mod bilingual;
pub mod config;
pub mod convert;
pub mod keys;
pub mod path_glob;
pub mod validation;

pub use config::CliConfig;
pub use convert::{ConvertOptions, run_convert_command};
pub use path_glob::expand_input_globs;
