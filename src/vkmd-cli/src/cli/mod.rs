//! CLI argument definitions for vkmd
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod core;
mod dump;
mod source;

pub use self::core::{Cli, Commands};
pub use self::source::SourceArgs;
