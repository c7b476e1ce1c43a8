//! Program Header Table
//!
//! Segment descriptors decoded from the program header table, and the
//! immutable index the resolver scans.

use crate::header::{read_full, Endian, FileHeader, PHDR_SIZE};
use crate::{Error, Result};

use std::io::{Read, Seek, SeekFrom};

/// One program header: a virtual address range backed by a file range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentDescriptor {
    /// Position in the program header table
    pub index: usize,
    pub p_type: u32,
    pub p_flags: u32,
    pub vaddr: u64,
    pub memsz: u64,
    pub offset: u64,
    pub filesz: u64,
}

impl SegmentDescriptor {
    pub const PT_NULL: u32 = 0;
    pub const PT_LOAD: u32 = 1;
    pub const PT_DYNAMIC: u32 = 2;
    pub const PT_INTERP: u32 = 3;
    pub const PT_NOTE: u32 = 4;
    pub const PT_SHLIB: u32 = 5;
    pub const PT_PHDR: u32 = 6;
    pub const PT_TLS: u32 = 7;

    pub const PF_X: u32 = 0x1;
    pub const PF_W: u32 = 0x2;
    pub const PF_R: u32 = 0x4;

    /// Decode one program header record.
    ///
    /// `buf` must hold at least [`PHDR_SIZE`] bytes.
    pub fn read(index: usize, buf: &[u8], endian: Endian) -> Self {
        Self {
            index,
            p_type: endian.read_u32(&buf[0..4]),
            p_flags: endian.read_u32(&buf[4..8]),
            offset: endian.read_u64(&buf[8..16]),
            vaddr: endian.read_u64(&buf[16..24]),
            filesz: endian.read_u64(&buf[32..40]),
            memsz: endian.read_u64(&buf[40..48]),
        }
    }

    /// Whether `address` lies in `[vaddr, vaddr + memsz)`.
    ///
    /// Computed as a distance from `vaddr` so ranges touching the top of the
    /// address space do not wrap.
    pub fn contains(&self, address: u64) -> bool {
        address >= self.vaddr && address - self.vaddr < self.memsz
    }

    pub fn is_loadable(&self) -> bool {
        self.p_type == Self::PT_LOAD
    }

    /// Last virtual address covered, inclusive. `None` for empty segments.
    pub fn vaddr_last(&self) -> Option<u64> {
        self.memsz
            .checked_sub(1)
            .map(|span| self.vaddr.wrapping_add(span))
    }

    pub fn type_name(&self) -> &'static str {
        match self.p_type {
            Self::PT_NULL => "NULL",
            Self::PT_LOAD => "LOAD",
            Self::PT_DYNAMIC => "DYNAMIC",
            Self::PT_INTERP => "INTERP",
            Self::PT_NOTE => "NOTE",
            Self::PT_SHLIB => "SHLIB",
            Self::PT_PHDR => "PHDR",
            Self::PT_TLS => "TLS",
            _ => "OTHER",
        }
    }

    /// Permission string in `rwx` form
    pub fn perms(&self) -> String {
        let flag = |bit: u32, c: char| if self.p_flags & bit != 0 { c } else { '-' };
        [
            flag(Self::PF_R, 'r'),
            flag(Self::PF_W, 'w'),
            flag(Self::PF_X, 'x'),
        ]
        .iter()
        .collect()
    }
}

/// Immutable collection of program headers, in table order
#[derive(Debug, Clone, Default)]
pub struct SegmentIndex {
    segments: Vec<SegmentDescriptor>,
}

impl SegmentIndex {
    /// Read the program header table described by `header`.
    ///
    /// The table is read as one block of exactly `e_phnum` records. Headers
    /// of every type are kept.
    pub fn read<R: Read + Seek>(source: &mut R, header: &FileHeader) -> Result<Self> {
        let expected = header.e_phnum as usize;

        source
            .seek(SeekFrom::Start(header.e_phoff))
            .map_err(|source| Error::SeekFailed {
                offset: header.e_phoff,
                source,
            })?;

        let mut table = vec![0u8; header.phdr_table_size()];
        let read = read_full(source, &mut table).map_err(|source| Error::ReadFailed {
            offset: header.e_phoff,
            len: table.len(),
            source,
        })?;

        let actual = read / PHDR_SIZE;
        if actual < expected {
            return Err(Error::TruncatedInput { expected, actual });
        }

        let segments = table
            .chunks_exact(PHDR_SIZE)
            .enumerate()
            .map(|(index, record)| SegmentDescriptor::read(index, record, header.endian))
            .collect::<Vec<_>>();

        tracing::debug!(
            count = segments.len(),
            phoff = format_args!("{:#x}", header.e_phoff),
            "read program header table"
        );

        Ok(Self { segments })
    }

    pub fn from_descriptors(segments: Vec<SegmentDescriptor>) -> Self {
        Self { segments }
    }

    /// Restrict the index to PT_LOAD headers, keeping table order.
    pub fn loadable_only(&self) -> Self {
        Self {
            segments: self
                .segments
                .iter()
                .filter(|s| s.is_loadable())
                .copied()
                .collect(),
        }
    }

    /// First segment, in table order, whose virtual range contains `address`
    pub fn find(&self, address: u64) -> Option<&SegmentDescriptor> {
        self.segments.iter().find(|s| s.contains(address))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SegmentDescriptor> {
        self.segments.iter()
    }

    pub fn as_slice(&self) -> &[SegmentDescriptor] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl<'a> IntoIterator for &'a SegmentIndex {
    type Item = &'a SegmentDescriptor;
    type IntoIter = std::slice::Iter<'a, SegmentDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
