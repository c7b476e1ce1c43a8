//! Command handlers for vkmd CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod configure;
pub mod dump;
pub mod segments;

#[cfg(test)]
mod fixtures;

use crate::config::Config;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::PathBuf;
use vkmd::{CoreImage, DEFAULT_CHUNK_SIZE, DEFAULT_SOURCE};

/// Where to read from and how, after merging flags with the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    pub path: PathBuf,
    pub chunk_size: usize,
    pub load_only: bool,
}

impl SourceOptions {
    /// Command-line values win over the config file, which wins over defaults
    pub fn resolve(
        source: Option<PathBuf>,
        chunk_size: Option<usize>,
        load_only: Option<bool>,
        config: &Config,
    ) -> Self {
        Self {
            path: source
                .or_else(|| config.source.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE)),
            chunk_size: chunk_size
                .or(config.chunk_size)
                .unwrap_or(DEFAULT_CHUNK_SIZE),
            load_only: load_only.or(config.load_only).unwrap_or(false),
        }
    }

    /// Open the core image with these options applied
    pub fn open(&self) -> Result<CoreImage<File>> {
        let image = CoreImage::open(&self.path).with_context(|| {
            format!(
                "Unable to load core image {} (reading /proc/kcore requires root)",
                self.path.display()
            )
        })?;

        let image = image.with_chunk_size(self.chunk_size);
        Ok(if self.load_only {
            image.loadable_only()
        } else {
            image
        })
    }
}
