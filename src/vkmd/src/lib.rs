//! # vkmd
//!
//! Kernel virtual memory extraction from ELF core images.
//!
//! Linux exposes kernel memory through `/proc/kcore`, an ELF core dump whose
//! program headers map kernel virtual address ranges onto file offsets. This
//! library parses that header table and copies an arbitrary virtual range
//! out of the image, splitting the copy at segment boundaries.
//!
//! ## Example
//!
//! ```no_run
//! use std::io;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut image = vkmd::CoreImage::open(vkmd::DEFAULT_SOURCE)?;
//!
//! let stdout = io::stdout();
//! let summary = image.extract(0xffffffff81000000, 0x1000, &mut stdout.lock())?;
//! eprintln!("{} bytes in {} steps", summary.bytes, summary.steps);
//! # Ok(())
//! # }
//! ```

pub mod copy;
pub mod digest;
pub mod extract;
pub mod header;
pub mod image;
pub mod resolve;
pub mod segment;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

use std::path::PathBuf;

#[doc(inline)]
pub use copy::{StreamCopier, DEFAULT_CHUNK_SIZE};
#[doc(inline)]
pub use digest::{DigestReport, DigestSink};
#[doc(inline)]
pub use extract::{extract, ExtractionSummary};
#[doc(inline)]
pub use header::{Endian, FileHeader};
#[doc(inline)]
pub use image::CoreImage;
#[doc(inline)]
pub use resolve::{ExtractionRequest, Resolution};
#[doc(inline)]
pub use segment::{SegmentDescriptor, SegmentIndex};

/// Kernel core image exposed by Linux
pub const DEFAULT_SOURCE: &str = "/proc/kcore";

/// Errors from header parsing and extraction
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed ELF header: {0}")]
    MalformedHeader(String),

    #[error("Truncated program header table: expected {expected} records, got {actual}")]
    TruncatedInput { expected: usize, actual: usize },

    #[error("No program header covers address {address:#x}")]
    NotFound { address: u64 },

    #[error("Program header {index} has p_filesz {filesz:#x} != p_memsz {memsz:#x}")]
    InconsistentSegment { index: usize, filesz: u64, memsz: u64 },

    #[error("Program header {index} maps address {address:#x} past the end of the file offset space")]
    SegmentOverflow { index: usize, address: u64 },

    #[error("Unable to seek to file offset {offset:#x}: {source}")]
    SeekFailed {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to read {len:#x} bytes at file offset {offset:#x}: {source}")]
    ReadFailed {
        offset: u64,
        len: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to write {len:#x} bytes read from file offset {offset:#x}: {source}")]
    WriteFailed {
        offset: u64,
        len: usize,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let err = Error::MalformedHeader("e_phnum is zero".to_string());
        assert!(err.to_string().contains("Malformed ELF header"));

        let err = Error::TruncatedInput {
            expected: 4,
            actual: 2,
        };
        assert!(err.to_string().contains("expected 4 records, got 2"));

        let err = Error::NotFound { address: 0x1000 };
        assert!(err.to_string().contains("0x1000"));

        let err = Error::InconsistentSegment {
            index: 3,
            filesz: 0x10,
            memsz: 0x20,
        };
        assert!(err.to_string().contains("Program header 3"));

        let err = Error::SeekFailed {
            offset: 0x2000,
            source: io::Error::new(io::ErrorKind::InvalidInput, "bad seek"),
        };
        assert!(err.to_string().contains("0x2000"));
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error as _;

        let err = Error::ReadFailed {
            offset: 0,
            len: 512,
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "short"),
        };
        assert!(err.source().is_some());

        let err = Error::NotFound { address: 0 };
        assert!(err.source().is_none());
    }

    #[test]
    fn test_default_source() {
        assert_eq!(DEFAULT_SOURCE, "/proc/kcore");
    }
}
