//! ELF64 File Header
//!
//! Parsing and validation of the fixed-size header at offset 0 of a core
//! image. Only the fields needed to locate the program header table are kept.

use crate::{Error, Result};

use byteorder::{ByteOrder, BE, LE};
use std::io::{self, Read, Seek, SeekFrom};

/// Size of an ELF64 file header
pub const EHDR_SIZE: usize = 64;

/// Size of an ELF64 program header record
pub const PHDR_SIZE: usize = 56;

const ELFMAG: [u8; 4] = [0x7f, b'E', b'L', b'F'];
const EI_CLASS: usize = 4;
const EI_DATA: usize = 5;
const ELFCLASS64: u8 = 2;
const ELFDATA2LSB: u8 = 1;
const ELFDATA2MSB: u8 = 2;

/// Byte order declared by `e_ident[EI_DATA]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    pub fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            Endian::Little => LE::read_u16(buf),
            Endian::Big => BE::read_u16(buf),
        }
    }

    pub fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Endian::Little => LE::read_u32(buf),
            Endian::Big => BE::read_u32(buf),
        }
    }

    pub fn read_u64(self, buf: &[u8]) -> u64 {
        match self {
            Endian::Little => LE::read_u64(buf),
            Endian::Big => BE::read_u64(buf),
        }
    }
}

/// Validated ELF64 file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Byte order of every multi-byte field in the image
    pub endian: Endian,
    /// Object file type (ET_CORE for kcore)
    pub e_type: u16,
    /// Declared size of this header
    pub e_ehsize: u16,
    /// File offset of the program header table
    pub e_phoff: u64,
    /// Size of one program header record
    pub e_phentsize: u16,
    /// Number of program header records
    pub e_phnum: u16,
}

impl FileHeader {
    /// ELF core file type
    pub const ET_CORE: u16 = 4;

    /// Read and validate the file header at offset 0 of `source`.
    pub fn parse<R: Read + Seek>(source: &mut R) -> Result<Self> {
        source
            .seek(SeekFrom::Start(0))
            .map_err(|source| Error::SeekFailed { offset: 0, source })?;

        let mut buf = [0u8; EHDR_SIZE];
        let read = read_full(source, &mut buf).map_err(|source| Error::ReadFailed {
            offset: 0,
            len: EHDR_SIZE,
            source,
        })?;

        if read < EHDR_SIZE {
            return Err(Error::MalformedHeader(format!(
                "short read: {} of {} header bytes",
                read, EHDR_SIZE
            )));
        }

        Self::from_bytes(&buf)
    }

    /// Decode and validate a header from its raw bytes.
    ///
    /// Only the header size, record size and record count are enforced. The
    /// identification bytes are advisory: a big-endian `EI_DATA` selects
    /// big-endian decoding and anything else is read as little-endian.
    pub fn from_bytes(buf: &[u8; EHDR_SIZE]) -> Result<Self> {
        let endian = match buf[EI_DATA] {
            ELFDATA2MSB => Endian::Big,
            _ => Endian::Little,
        };

        let header = FileHeader {
            endian,
            e_type: endian.read_u16(&buf[16..18]),
            e_phoff: endian.read_u64(&buf[32..40]),
            e_ehsize: endian.read_u16(&buf[52..54]),
            e_phentsize: endian.read_u16(&buf[54..56]),
            e_phnum: endian.read_u16(&buf[56..58]),
        };

        header.validate()?;

        if !has_elf64_ident(buf) {
            tracing::warn!(
                ident = %hex::encode(&buf[..EI_DATA + 1]),
                "core image lacks an ELF64 identification, decoding as {:?}-endian",
                endian
            );
        }

        Ok(header)
    }

    fn validate(&self) -> Result<()> {
        if self.e_ehsize as usize != EHDR_SIZE {
            return Err(Error::MalformedHeader(format!(
                "e_ehsize is {}, expected {}",
                self.e_ehsize, EHDR_SIZE
            )));
        }

        if self.e_phentsize as usize != PHDR_SIZE {
            return Err(Error::MalformedHeader(format!(
                "e_phentsize is {}, expected {}",
                self.e_phentsize, PHDR_SIZE
            )));
        }

        if self.e_phnum == 0 {
            return Err(Error::MalformedHeader("e_phnum is zero".to_string()));
        }

        Ok(())
    }

    /// Size in bytes of the whole program header table
    pub fn phdr_table_size(&self) -> usize {
        self.e_phnum as usize * PHDR_SIZE
    }
}

/// Whether `e_ident` carries the ELF magic, the 64-bit class and a known encoding
pub fn has_elf64_ident(buf: &[u8]) -> bool {
    buf.len() > EI_DATA
        && buf[0..4] == ELFMAG
        && buf[EI_CLASS] == ELFCLASS64
        && matches!(buf[EI_DATA], ELFDATA2LSB | ELFDATA2MSB)
}

/// Read until `buf` is full or the source hits EOF, returning the byte count.
pub(crate) fn read_full<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::CoreImageBuilder;
    use std::io::Cursor;

    fn header_bytes() -> [u8; EHDR_SIZE] {
        let image = CoreImageBuilder::new()
            .segment(0x1000, 0x100, 0x1000, 0x100)
            .build();
        let mut buf = [0u8; EHDR_SIZE];
        buf.copy_from_slice(&image[..EHDR_SIZE]);
        buf
    }

    #[test]
    fn test_parse_valid_header() {
        let image = CoreImageBuilder::new()
            .segment(0x1000, 0x100, 0x1000, 0x100)
            .segment(0x2000, 0x100, 0x1100, 0x100)
            .build();

        let header = FileHeader::parse(&mut Cursor::new(image)).unwrap();
        assert_eq!(header.endian, Endian::Little);
        assert_eq!(header.e_type, FileHeader::ET_CORE);
        assert_eq!(header.e_phoff, EHDR_SIZE as u64);
        assert_eq!(header.e_phnum, 2);
        assert_eq!(header.phdr_table_size(), 2 * PHDR_SIZE);
    }

    #[test]
    fn test_parse_big_endian_header() {
        let image = CoreImageBuilder::new()
            .big_endian()
            .segment(0x1000, 0x100, 0x1000, 0x100)
            .build();

        let header = FileHeader::parse(&mut Cursor::new(image)).unwrap();
        assert_eq!(header.endian, Endian::Big);
        assert_eq!(header.e_phnum, 1);
        assert_eq!(header.e_phentsize as usize, PHDR_SIZE);
    }

    #[test]
    fn test_short_header_is_malformed() {
        let image = header_bytes()[..40].to_vec();
        let err = FileHeader::parse(&mut Cursor::new(image)).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn test_empty_source_is_malformed() {
        let err = FileHeader::parse(&mut Cursor::new(Vec::new())).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn test_zero_phnum_is_malformed() {
        let image = CoreImageBuilder::new().build();
        let err = FileHeader::parse(&mut Cursor::new(image)).unwrap_err();
        match err {
            Error::MalformedHeader(reason) => assert!(reason.contains("e_phnum")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_ehsize_is_malformed() {
        let mut buf = header_bytes();
        LE::write_u16(&mut buf[52..54], 52);
        let err = FileHeader::from_bytes(&buf).unwrap_err();
        match err {
            Error::MalformedHeader(reason) => assert!(reason.contains("e_ehsize")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_phentsize_is_malformed() {
        let mut buf = header_bytes();
        LE::write_u16(&mut buf[54..56], 32);
        let err = FileHeader::from_bytes(&buf).unwrap_err();
        match err {
            Error::MalformedHeader(reason) => assert!(reason.contains("e_phentsize")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_elf64_ident_detection() {
        let buf = header_bytes();
        assert!(has_elf64_ident(&buf));

        let mut bad_magic = buf;
        bad_magic[1] = b'X';
        assert!(!has_elf64_ident(&bad_magic));

        let mut class32 = buf;
        class32[EI_CLASS] = 1;
        assert!(!has_elf64_ident(&class32));

        assert!(!has_elf64_ident(&buf[..4]));
    }

    #[test]
    fn test_zeroed_ident_is_accepted() {
        let mut buf = header_bytes();
        buf[..16].fill(0);

        let header = FileHeader::from_bytes(&buf).unwrap();
        assert_eq!(header.endian, Endian::Little);
        assert_eq!(header.e_phnum, 1);
        assert_eq!(header.e_phoff, EHDR_SIZE as u64);
    }

    #[test]
    fn test_32bit_class_still_parses_by_field_sizes() {
        let mut buf = header_bytes();
        buf[EI_CLASS] = 1;
        assert!(FileHeader::from_bytes(&buf).is_ok());
    }

    #[test]
    fn test_unknown_encoding_decodes_little_endian() {
        let mut buf = header_bytes();
        buf[EI_DATA] = 7;
        let header = FileHeader::from_bytes(&buf).unwrap();
        assert_eq!(header.endian, Endian::Little);
        assert_eq!(header.e_phentsize as usize, PHDR_SIZE);
    }

    #[test]
    fn test_bad_ident_with_bad_sizes_is_malformed() {
        let mut buf = header_bytes();
        buf[..16].fill(0);
        LE::write_u16(&mut buf[56..58], 0);
        assert!(matches!(
            FileHeader::from_bytes(&buf),
            Err(Error::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_read_full_stops_at_eof() {
        let mut source = Cursor::new(vec![1u8, 2, 3]);
        let mut buf = [0u8; 8];
        assert_eq!(read_full(&mut source, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }
}
