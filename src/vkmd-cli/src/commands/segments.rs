//! Segments command handler
//!
//! Prints the program header table of the core image.

use super::SourceOptions;
use anyhow::{Context, Result};
use std::io::{self, Write};
use vkmd::SegmentIndex;

/// Handle the segments command
pub fn handle(opts: &SourceOptions) -> Result<()> {
    let image = opts.open()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    list(image.segments(), &mut out).context("Failed to write segment listing")?;

    Ok(())
}

/// Write one line per program header
pub fn list<W: Write>(segments: &SegmentIndex, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "{:>4}  {:<7} {:<4} {:>18}  {:>18}  {:>18}  {:>18}  {:>18}",
        "IDX", "TYPE", "PERM", "VADDR", "END", "OFFSET", "FILESZ", "MEMSZ"
    )?;

    for seg in segments {
        writeln!(
            out,
            "{:>4}  {:<7} {:<4} {:#018x}  {:#018x}  {:#018x}  {:#18x}  {:#18x}",
            seg.index,
            seg.type_name(),
            seg.perms(),
            seg.vaddr,
            seg.vaddr.wrapping_add(seg.memsz),
            seg.offset,
            seg.filesz,
            seg.memsz,
        )?;
    }

    writeln!(out, "{} program headers", segments.len())
}
