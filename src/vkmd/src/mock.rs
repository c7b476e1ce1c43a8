//! Synthetic Core Images
//!
//! Builds in-memory ELF64 core images for tests. Every byte outside the
//! header and program header table holds `pattern_byte(file_offset)` so
//! extracted ranges can be checked against the file layout.

use crate::header::{Endian, EHDR_SIZE, PHDR_SIZE};
use crate::segment::SegmentDescriptor;

use byteorder::{ByteOrder, BE, LE};

/// Fill byte stored at `offset` in a built image
pub fn pattern_byte(offset: u64) -> u8 {
    (offset % 251) as u8
}

struct Phdr {
    p_type: u32,
    vaddr: u64,
    memsz: u64,
    offset: u64,
    filesz: u64,
}

/// Builder for synthetic ELF64 core images
pub struct CoreImageBuilder {
    endian: Endian,
    phdrs: Vec<Phdr>,
    min_len: u64,
}

impl Default for CoreImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreImageBuilder {
    pub fn new() -> Self {
        Self {
            endian: Endian::Little,
            phdrs: Vec::new(),
            min_len: 0,
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.endian = Endian::Big;
        self
    }

    /// Add a PT_LOAD program header
    pub fn segment(self, vaddr: u64, memsz: u64, offset: u64, filesz: u64) -> Self {
        self.phdr(SegmentDescriptor::PT_LOAD, vaddr, memsz, offset, filesz)
    }

    /// Add a program header of any type
    pub fn phdr(mut self, p_type: u32, vaddr: u64, memsz: u64, offset: u64, filesz: u64) -> Self {
        self.phdrs.push(Phdr {
            p_type,
            vaddr,
            memsz,
            offset,
            filesz,
        });
        self
    }

    /// Pad the image to at least `len` bytes
    pub fn min_len(mut self, len: u64) -> Self {
        self.min_len = len;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let table_end = (EHDR_SIZE + self.phdrs.len() * PHDR_SIZE) as u64;
        let data_end = self
            .phdrs
            .iter()
            .map(|p| p.offset.saturating_add(p.filesz))
            .max()
            .unwrap_or(0);
        let len = table_end.max(data_end).max(self.min_len) as usize;

        let mut image: Vec<u8> = (0..len as u64).map(pattern_byte).collect();

        self.write_ehdr(&mut image[..EHDR_SIZE]);
        for (i, phdr) in self.phdrs.iter().enumerate() {
            let start = EHDR_SIZE + i * PHDR_SIZE;
            self.write_phdr(&mut image[start..start + PHDR_SIZE], phdr);
        }

        image
    }

    fn write_ehdr(&self, buf: &mut [u8]) {
        buf.fill(0);
        buf[0..4].copy_from_slice(&[0x7f, b'E', b'L', b'F']);
        buf[4] = 2; // ELFCLASS64
        buf[5] = match self.endian {
            Endian::Little => 1,
            Endian::Big => 2,
        };
        buf[6] = 1; // EV_CURRENT

        self.put_u16(&mut buf[16..18], 4); // ET_CORE
        self.put_u16(&mut buf[18..20], 62); // EM_X86_64
        self.put_u32(&mut buf[20..24], 1);
        self.put_u64(&mut buf[32..40], EHDR_SIZE as u64);
        self.put_u16(&mut buf[52..54], EHDR_SIZE as u16);
        self.put_u16(&mut buf[54..56], PHDR_SIZE as u16);
        self.put_u16(&mut buf[56..58], self.phdrs.len() as u16);
    }

    fn write_phdr(&self, buf: &mut [u8], phdr: &Phdr) {
        buf.fill(0);
        self.put_u32(&mut buf[0..4], phdr.p_type);
        self.put_u32(&mut buf[4..8], 0x7); // RWX
        self.put_u64(&mut buf[8..16], phdr.offset);
        self.put_u64(&mut buf[16..24], phdr.vaddr);
        self.put_u64(&mut buf[24..32], phdr.vaddr);
        self.put_u64(&mut buf[32..40], phdr.filesz);
        self.put_u64(&mut buf[40..48], phdr.memsz);
        self.put_u64(&mut buf[48..56], 0x1000);
    }

    fn put_u16(&self, buf: &mut [u8], value: u16) {
        match self.endian {
            Endian::Little => LE::write_u16(buf, value),
            Endian::Big => BE::write_u16(buf, value),
        }
    }

    fn put_u32(&self, buf: &mut [u8], value: u32) {
        match self.endian {
            Endian::Little => LE::write_u32(buf, value),
            Endian::Big => BE::write_u32(buf, value),
        }
    }

    fn put_u64(&self, buf: &mut [u8], value: u64) {
        match self.endian {
            Endian::Little => LE::write_u64(buf, value),
            Endian::Big => BE::write_u64(buf, value),
        }
    }
}

/// Bytes a correct extraction of `[offset, offset + len)` must produce
pub fn expected_bytes(offset: u64, len: u64) -> Vec<u8> {
    (offset..offset + len).map(pattern_byte).collect()
}
