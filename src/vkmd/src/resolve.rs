//! Address Resolution
//!
//! Maps the extraction cursor onto the file region of the segment covering
//! it, clipped to that segment's end.

use crate::segment::SegmentIndex;
use crate::{Error, Result};

/// Cursor over the virtual range still to be extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// Next virtual address to copy
    pub address: u64,
    /// Bytes left to copy
    pub remaining: u64,
}

/// Where one step of an extraction reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Program header the cursor resolved into
    pub segment: usize,
    /// Absolute offset in the core image
    pub file_offset: u64,
    /// Bytes to copy before leaving the segment or finishing the request
    pub copy_len: u64,
}

impl ExtractionRequest {
    pub fn new(address: u64, len: u64) -> Self {
        Self {
            address,
            remaining: len,
        }
    }

    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }

    /// Move the cursor past a copied resolution.
    pub fn advance(&mut self, resolution: &Resolution) {
        self.address = self.address.wrapping_add(resolution.copy_len);
        self.remaining -= resolution.copy_len;
    }
}

impl SegmentIndex {
    /// Resolve the cursor into a file offset and a clipped copy length.
    ///
    /// The first segment in table order containing the cursor address is
    /// used. Segments whose file size differs from their memory size cannot
    /// be copied and are rejected.
    pub fn resolve(&self, request: &ExtractionRequest) -> Result<Resolution> {
        let address = request.address;
        let segment = self.find(address).ok_or(Error::NotFound { address })?;

        let seg_off = address - segment.vaddr;
        let copy_len = request.remaining.min(segment.memsz - seg_off);

        if segment.filesz != segment.memsz {
            return Err(Error::InconsistentSegment {
                index: segment.index,
                filesz: segment.filesz,
                memsz: segment.memsz,
            });
        }

        let file_offset = segment
            .offset
            .checked_add(seg_off)
            .ok_or(Error::SegmentOverflow {
                index: segment.index,
                address,
            })?;

        Ok(Resolution {
            segment: segment.index,
            file_offset,
            copy_len,
        })
    }
}
