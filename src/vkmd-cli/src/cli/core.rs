//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::dump::DumpArgs;
use super::source::SourceArgs;

#[derive(Parser)]
#[command(name = "vkmd")]
#[command(about = "Dump kernel virtual memory from /proc/kcore", long_about = None)]
#[command(version, subcommand_negates_reqs = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub dump: DumpArgs,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the program headers of the core image
    #[command(visible_alias = "ls")]
    Segments {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Configure default settings
    Configure {
        /// Set default core image path
        #[arg(long, value_name = "PATH")]
        set_source: Option<PathBuf>,

        /// Set default chunk size
        #[arg(long, value_name = "BYTES")]
        set_chunk_size: Option<usize>,

        /// Set whether lookups are restricted to PT_LOAD headers by default
        #[arg(long, value_name = "BOOL")]
        set_load_only: Option<bool>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
