//! Extraction Loop
//!
//! Resolves and copies one segment-bounded step at a time until the whole
//! virtual range has been written or a step fails.

use crate::copy::StreamCopier;
use crate::resolve::ExtractionRequest;
use crate::segment::SegmentIndex;
use crate::Result;

use std::io::{Read, Seek, Write};

/// Outcome of a completed extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Bytes written to the sink
    pub bytes: u64,
    /// Resolve+copy steps taken (one per segment touched)
    pub steps: usize,
}

/// Copy `len` bytes of virtual memory starting at `address` into `sink`.
///
/// The first failing step ends the extraction and its error is returned
/// unchanged. Bytes from earlier steps have already reached the sink.
pub fn extract<R, W>(
    source: &mut R,
    segments: &SegmentIndex,
    copier: &mut StreamCopier,
    address: u64,
    len: u64,
    sink: &mut W,
) -> Result<ExtractionSummary>
where
    R: Read + Seek + ?Sized,
    W: Write + ?Sized,
{
    let mut request = ExtractionRequest::new(address, len);
    let mut summary = ExtractionSummary::default();

    while !request.is_done() {
        let resolution = segments.resolve(&request)?;

        tracing::debug!(
            step = summary.steps,
            address = format_args!("{:#x}", request.address),
            segment = resolution.segment,
            file_offset = format_args!("{:#x}", resolution.file_offset),
            len = format_args!("{:#x}", resolution.copy_len),
            "resolved"
        );

        copier.copy(source, resolution.file_offset, resolution.copy_len, sink)?;

        request.advance(&resolution);
        summary.bytes += resolution.copy_len;
        summary.steps += 1;
    }

    Ok(summary)
}
