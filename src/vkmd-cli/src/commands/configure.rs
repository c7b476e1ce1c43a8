//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up vkmd CLI defaults.

use crate::config::Config;
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Requested changes to the stored defaults
#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub source: Option<PathBuf>,
    pub chunk_size: Option<usize>,
    pub load_only: Option<bool>,
}

impl ConfigUpdate {
    fn is_empty(&self) -> bool {
        self.source.is_none() && self.chunk_size.is_none() && self.load_only.is_none()
    }
}

/// Handle the configure command
///
/// # Arguments
/// * `update` - Values to store as defaults
/// * `show` - If true, show current configuration
pub fn handle(update: ConfigUpdate, show: bool) -> Result<()> {
    let path = Config::config_path()?;
    let mut config = Config::load_from(&path)?;

    if show {
        show_config(&config, &path);
        return Ok(());
    }

    if update.is_empty() {
        show_usage();
        return Ok(());
    }

    apply(&mut config, update)?;
    config.save_to(&path)?;
    println!("Config saved to: {}", path.display());

    Ok(())
}

/// Merge `update` into `config`
fn apply(config: &mut Config, update: ConfigUpdate) -> Result<()> {
    if let Some(chunk_size) = update.chunk_size {
        if chunk_size == 0 {
            bail!("Chunk size must be at least 1 byte");
        }
        config.chunk_size = Some(chunk_size);
    }

    if let Some(source) = update.source {
        config.source = Some(source);
    }

    if let Some(load_only) = update.load_only {
        config.load_only = Some(load_only);
    }

    Ok(())
}

/// Display current configuration
fn show_config(config: &Config, path: &Path) {
    match &config.source {
        Some(source) => println!("Source: {}", source.display()),
        None => println!("Source: {} (default)", vkmd::DEFAULT_SOURCE),
    }

    match config.chunk_size {
        Some(size) => println!("Chunk size: {}", size),
        None => println!("Chunk size: {} (default)", vkmd::DEFAULT_CHUNK_SIZE),
    }

    println!("Load only: {}", config.load_only.unwrap_or(false));
    println!("Config file: {}", path.display());
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: vkmd configure --set-source PATH");
    println!("   or: vkmd configure --set-chunk-size BYTES");
    println!("   or: vkmd configure --set-load-only true|false");
    println!("   or: vkmd configure --show");
}
