pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{cli::LocalStreams, CliConfig};

pub use crate::config::json_config::AnonConfig;
pub use crate::core::actions::Action;
pub use crate::core::engine::{anonymise_stream, AnonEngine};
pub use crate::utils::error::{AnonError, Result};
