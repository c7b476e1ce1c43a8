//! Core image source argument definitions

use clap::builder::RangedU64ValueParser;
use clap::Args;
use std::path::PathBuf;

/// Options that select and tune the core image being read
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Core image to read (defaults to /proc/kcore or the configured source)
    #[arg(long, env = "VKMD_SOURCE")]
    pub source: Option<PathBuf>,

    /// Bytes per read/write chunk
    #[arg(long, value_name = "BYTES", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub chunk_size: Option<usize>,

    /// Only resolve addresses against PT_LOAD program headers
    #[arg(long, overrides_with = "no_load_only")]
    pub load_only: bool,

    /// Resolve against every program header even if the config says otherwise
    #[arg(long, overrides_with = "load_only")]
    pub no_load_only: bool,
}

impl SourceArgs {
    /// The load-only choice made on the command line, if any
    pub fn load_only(&self) -> Option<bool> {
        if self.load_only {
            Some(true)
        } else if self.no_load_only {
            Some(false)
        } else {
            None
        }
    }
}
