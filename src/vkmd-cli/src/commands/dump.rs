//! Dump command handler
//!
//! Streams a virtual address range out of the core image.

use super::SourceOptions;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Read, Seek, Write};
use std::path::Path;
use vkmd::{CoreImage, DigestReport, DigestSink};

/// Handle the default dump invocation
///
/// # Arguments
/// * `address` - First virtual address to dump
/// * `length` - Number of bytes to dump
/// * `output` - File to write to; stdout when `None`
/// * `hash` - Report size and digests of the dumped bytes on stderr
pub fn handle(
    opts: &SourceOptions,
    address: u64,
    length: u64,
    output: Option<&Path>,
    hash: bool,
) -> Result<()> {
    let mut image = opts.open()?;

    let report = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            dump(&mut image, address, length, file, hash)?
        }
        None => dump(&mut image, address, length, io::stdout().lock(), hash)?,
    };

    if let Some(report) = report {
        eprintln!("{}", report);
    }

    Ok(())
}

/// Extract `[address, address + length)` into `sink`, hashing it if asked
pub fn dump<R, W>(
    image: &mut CoreImage<R>,
    address: u64,
    length: u64,
    sink: W,
    hash: bool,
) -> Result<Option<DigestReport>>
where
    R: Read + Seek,
    W: Write,
{
    if hash {
        let mut sink = DigestSink::new(sink);
        extract_into(image, address, length, &mut sink)?;
        let (_, report) = sink.finish();
        Ok(Some(report))
    } else {
        let mut sink = sink;
        extract_into(image, address, length, &mut sink)?;
        Ok(None)
    }
}

fn extract_into<R, W>(
    image: &mut CoreImage<R>,
    address: u64,
    length: u64,
    sink: &mut W,
) -> Result<()>
where
    R: Read + Seek,
    W: Write,
{
    let summary = image
        .extract(address, length, sink)
        .with_context(|| format!("Failed to dump {:#x} bytes at {:#x}", length, address))?;

    sink.flush().context("Failed to flush output")?;

    tracing::info!(
        address = format_args!("{:#x}", address),
        bytes = summary.bytes,
        steps = summary.steps,
        "dump complete"
    );

    Ok(())
}
