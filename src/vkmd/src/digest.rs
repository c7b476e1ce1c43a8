//! Output Digest
//!
//! Sink wrapper that hashes everything passing through it, so a dump can be
//! fingerprinted without reading it back.

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::{self, Write};

/// Size and digests of the bytes written through a [`DigestSink`]
///
/// Digests are lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestReport {
    pub size: u64,
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
}

impl fmt::Display for DigestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Size    {}", self.size)?;
        writeln!(f, "MD5     {}", self.md5)?;
        writeln!(f, "SHA-1   {}", self.sha1)?;
        write!(f, "SHA-256 {}", self.sha256)
    }
}

/// Writer that forwards to `inner` and hashes the bytes it accepted
pub struct DigestSink<W> {
    inner: W,
    md5: Md5,
    sha1: Sha1,
    sha256: Sha256,
    size: u64,
}

impl<W: Write> DigestSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            md5: Md5::new(),
            sha1: Sha1::new(),
            sha256: Sha256::new(),
            size: 0,
        }
    }

    /// Bytes accepted so far
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Consume the sink, returning the inner writer and the digest
    pub fn finish(self) -> (W, DigestReport) {
        let report = DigestReport {
            size: self.size,
            md5: hex::encode(self.md5.finalize()),
            sha1: hex::encode(self.sha1.finalize()),
            sha256: hex::encode(self.sha256.finalize()),
        };
        (self.inner, report)
    }
}

impl<W: Write> Write for DigestSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        let accepted = &buf[..written];
        self.md5.update(accepted);
        self.sha1.update(accepted);
        self.sha256.update(accepted);
        self.size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
