//! Chunked Stream Copy
//!
//! Copies a file range from the core image to the output sink through a
//! bounded buffer that is reused across chunks.

use crate::{Error, Result};

use std::io::{Read, Seek, SeekFrom, Write};

/// Default chunk size for source reads and sink writes
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Bounded-buffer copier from a seekable source to a sink
#[derive(Debug)]
pub struct StreamCopier {
    buf: Vec<u8>,
}

impl Default for StreamCopier {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamCopier {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Create a copier with a custom chunk size (clamped to at least 1 byte)
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            buf: vec![0u8; chunk_size.max(1)],
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.buf.len()
    }

    /// Copy `len` bytes starting at absolute `file_offset` into `sink`.
    ///
    /// A chunk that cannot be read in full fails the copy; nothing from that
    /// chunk reaches the sink. Chunks already written stay written.
    pub fn copy<R, W>(
        &mut self,
        source: &mut R,
        file_offset: u64,
        len: u64,
        sink: &mut W,
    ) -> Result<u64>
    where
        R: Read + Seek + ?Sized,
        W: Write + ?Sized,
    {
        source
            .seek(SeekFrom::Start(file_offset))
            .map_err(|source| Error::SeekFailed {
                offset: file_offset,
                source,
            })?;

        let mut offset = file_offset;
        let mut remaining = len;

        while remaining > 0 {
            let chunk_len = remaining.min(self.buf.len() as u64) as usize;
            let chunk = &mut self.buf[..chunk_len];

            source
                .read_exact(chunk)
                .map_err(|source| Error::ReadFailed {
                    offset,
                    len: chunk_len,
                    source,
                })?;

            sink.write_all(chunk).map_err(|source| Error::WriteFailed {
                offset,
                len: chunk_len,
                source,
            })?;

            offset += chunk_len as u64;
            remaining -= chunk_len as u64;
        }

        tracing::trace!(
            offset = format_args!("{:#x}", file_offset),
            len = format_args!("{:#x}", len),
            "copied file range"
        );

        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{expected_bytes, pattern_byte};
    use std::io::{self, Cursor};

    fn source(len: u64) -> Cursor<Vec<u8>> {
        Cursor::new((0..len).map(pattern_byte).collect())
    }

    /// Sink that records the size of every write call
    #[derive(Default)]
    struct RecordingSink {
        data: Vec<u8>,
        writes: Vec<usize>,
    }

    impl Write for RecordingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.data.extend_from_slice(buf);
            self.writes.push(buf.len());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Sink that accepts `limit` bytes and then fails
    struct FailingSink {
        accepted: Vec<u8>,
        limit: usize,
    }

    impl Write for FailingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.accepted.len() + buf.len() > self.limit {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
            }
            self.accepted.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Source that refuses every seek
    struct Unseekable;

    impl Read for Unseekable {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl Seek for Unseekable {
        fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
            Err(io::Error::new(io::ErrorKind::InvalidInput, "not seekable"))
        }
    }

    #[test]
    fn test_copy_exact_bytes() {
        let mut src = source(0x4000);
        let mut out = Vec::new();

        let copied = StreamCopier::new()
            .copy(&mut src, 0x1234, 0x777, &mut out)
            .unwrap();

        assert_eq!(copied, 0x777);
        assert_eq!(out, expected_bytes(0x1234, 0x777));
    }

    #[test]
    fn test_copy_in_bounded_chunks() {
        let mut src = source(0x4000);
        let mut sink = RecordingSink::default();

        StreamCopier::new()
            .copy(&mut src, 0x100, 1300, &mut sink)
            .unwrap();

        assert_eq!(sink.writes, vec![512, 512, 276]);
        assert_eq!(sink.data, expected_bytes(0x100, 1300));
    }

    #[test]
    fn test_copy_custom_chunk_size() {
        let mut src = source(0x100);
        let mut sink = RecordingSink::default();
        let mut copier = StreamCopier::with_chunk_size(16);
        assert_eq!(copier.chunk_size(), 16);

        copier.copy(&mut src, 0, 40, &mut sink).unwrap();
        assert_eq!(sink.writes, vec![16, 16, 8]);
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        assert_eq!(StreamCopier::with_chunk_size(0).chunk_size(), 1);
    }

    #[test]
    fn test_copy_zero_length() {
        let mut src = source(0x10);
        let mut sink = RecordingSink::default();

        let copied = StreamCopier::new().copy(&mut src, 0, 0, &mut sink).unwrap();
        assert_eq!(copied, 0);
        assert!(sink.writes.is_empty());
    }

    #[test]
    fn test_short_read_fails_without_partial_chunk() {
        let mut src = source(0x300);
        let mut sink = RecordingSink::default();

        // 0x100..0x300 holds one full chunk and a short one
        let err = StreamCopier::new()
            .copy(&mut src, 0x100, 0x400, &mut sink)
            .unwrap_err();

        match err {
            Error::ReadFailed { offset, len, .. } => {
                assert_eq!(offset, 0x300);
                assert_eq!(len, 512);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(sink.writes, vec![512]);
        assert_eq!(sink.data, expected_bytes(0x100, 512));
    }

    #[test]
    fn test_write_failure() {
        let mut src = source(0x1000);
        let mut sink = FailingSink {
            accepted: Vec::new(),
            limit: 600,
        };

        let err = StreamCopier::new()
            .copy(&mut src, 0, 0x800, &mut sink)
            .unwrap_err();

        assert!(matches!(err, Error::WriteFailed { offset: 512, .. }));
        assert_eq!(sink.accepted, expected_bytes(0, 512));
    }

    #[test]
    fn test_seek_failure() {
        let mut out = Vec::new();
        let err = StreamCopier::new()
            .copy(&mut Unseekable, 0x2000, 0x10, &mut out)
            .unwrap_err();

        assert!(matches!(err, Error::SeekFailed { offset: 0x2000, .. }));
        assert!(out.is_empty());
    }
}
