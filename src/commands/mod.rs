//! Command-line interface for daily-reporter
//!
//! Parses the configuration from arguments and environment, wires the GitHub, Gemini
//! and Discord clients together, and runs the report once.

mod config;
mod host;
mod logging;
mod run;

pub use config::{Args, Config, load_env_file};
pub use host::Host;
pub use logging::{LogLevel, init_logging};
pub use run::run;
