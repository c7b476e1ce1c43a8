//! Core Image Source
//!
//! Owns an open core image together with its parsed program header table.
//! The source handle is released when the image is dropped.

use crate::copy::StreamCopier;
use crate::extract::{extract, ExtractionSummary};
use crate::header::FileHeader;
use crate::segment::SegmentIndex;
use crate::{Error, Result};

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

/// An ELF64 core image opened for extraction
#[derive(Debug)]
pub struct CoreImage<R> {
    source: R,
    header: FileHeader,
    segments: SegmentIndex,
    copier: StreamCopier,
    /// Path the image was opened from, if any
    pub path: Option<PathBuf>,
}

impl CoreImage<File> {
    /// Open a core image file and read its program header table
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;

        let mut image = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            segments = image.segments.len(),
            "opened core image"
        );
        image.path = Some(path);
        Ok(image)
    }
}

impl<R: Read + Seek> CoreImage<R> {
    /// Parse the header and program header table from any seekable source
    pub fn from_reader(mut source: R) -> Result<Self> {
        let header = FileHeader::parse(&mut source)?;
        let segments = SegmentIndex::read(&mut source, &header)?;

        Ok(CoreImage {
            source,
            header,
            segments,
            copier: StreamCopier::new(),
            path: None,
        })
    }

    /// Use a different chunk size for copies
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.copier = StreamCopier::with_chunk_size(chunk_size);
        self
    }

    /// Only resolve addresses against PT_LOAD headers
    pub fn loadable_only(mut self) -> Self {
        self.segments = self.segments.loadable_only();
        self
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn segments(&self) -> &SegmentIndex {
        &self.segments
    }

    pub fn chunk_size(&self) -> usize {
        self.copier.chunk_size()
    }

    /// Copy `len` bytes of virtual memory starting at `address` into `sink`
    pub fn extract<W: Write + ?Sized>(
        &mut self,
        address: u64,
        len: u64,
        sink: &mut W,
    ) -> Result<ExtractionSummary> {
        extract(
            &mut self.source,
            &self.segments,
            &mut self.copier,
            address,
            len,
            sink,
        )
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}
