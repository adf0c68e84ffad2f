use std::fmt::{self, Debug};

use crate::debug::{self, DebugHexByte};
use crate::rom::RomError;

#[derive(Clone)]
pub struct Mem {
    bytes: Box<[u8; Self::LEN as usize]>,
}

impl Mem {
    pub const LEN: u16 = 4 * 1024;
    pub const ROM_START: u16 = 0x0200;
    pub const FONT_START: u16 = 0x0050;
    /// Program space runs from 0x200 to the end of memory.
    pub const MAX_ROM_LEN: usize = (Self::LEN - Self::ROM_START) as usize;

    /// Fresh memory with the built-in font glyphs at 0x050 and everything
    /// else zeroed.
    pub fn new() -> Self {
        let mut bytes = Box::new([0u8; Self::LEN as usize]);

        let font: Vec<_> = FONT.into_iter().flatten().collect();
        bytes[Self::FONT_START as usize..][..font.len()].copy_from_slice(&font);

        Self { bytes }
    }

    /// Copy a ROM into program space, starting at 0x200. Memory is left
    /// untouched when the ROM does not fit. A zero-length ROM is legal.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), RomError> {
        if rom.len() > Self::MAX_ROM_LEN {
            return Err(RomError::TooLarge { len: rom.len() });
        }
        self.bytes[Self::ROM_START as usize..][..rom.len()].copy_from_slice(rom);
        Ok(())
    }

    /// Out-of-range reads see zero. The address space is 12 bits wide, but a
    /// program can still push I past it (say, via `ADD I, Vx`); such accesses
    /// are rejected rather than wrapped, and must never abort emulation.
    pub fn read(&self, addr: u16) -> u8 {
        self.bytes.get(addr as usize).copied().unwrap_or(0)
    }

    /// Out-of-range writes are dropped.
    pub fn write(&mut self, addr: u16, value: u8) {
        if let Some(byte) = self.bytes.get_mut(addr as usize) {
            *byte = value;
        }
    }

    /// Address of the 5-byte font glyph for the hex digit `d`.
    pub fn glyph_addr(d: u8) -> u16 {
        Self::FONT_START + d as u16 * 5
    }
}

/// Bitmaps for the built-in hex digit glyphs, 0 through F.
const FONT: [[u8; 5]; 16] = [
    [0xF0, 0x90, 0x90, 0x90, 0xF0],
    [0x20, 0x60, 0x20, 0x20, 0x70],
    [0xF0, 0x10, 0xF0, 0x80, 0xF0],
    [0xF0, 0x10, 0xF0, 0x10, 0xF0],
    [0x90, 0x90, 0xF0, 0x10, 0x10],
    [0xF0, 0x80, 0xF0, 0x10, 0xF0],
    [0xF0, 0x80, 0xF0, 0x90, 0xF0],
    [0xF0, 0x10, 0x20, 0x40, 0x40],
    [0xF0, 0x90, 0xF0, 0x90, 0xF0],
    [0xF0, 0x90, 0xF0, 0x10, 0xF0],
    [0xF0, 0x90, 0xF0, 0x90, 0x90],
    [0xE0, 0x90, 0xE0, 0x90, 0xE0],
    [0xF0, 0x80, 0x80, 0x80, 0xF0],
    [0xE0, 0x90, 0x90, 0x90, 0xE0],
    [0xF0, 0x80, 0xF0, 0x80, 0xF0],
    [0xF0, 0x80, 0xF0, 0x80, 0x80],
];

impl Default for Mem {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Mem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !f.alternate() {
            return self.debug_compact(f);
        }

        // Similar to unix `hexdump`: print rows of bytes.

        writeln!(f)?;

        let mut prev_blank = false;
        for (i, line) in self.bytes.chunks(16).enumerate() {
            // Skip large blocks of zeros.
            if line == [0; 16] {
                // Print an indication at the start of the block.
                if !prev_blank {
                    writeln!(f, "...")?;
                }
                prev_blank = true;
                continue;
            }
            prev_blank = false;

            write!(f, "{i:02x}0: ")?;
            debug::write_row(f, line.try_into().unwrap())?;
            writeln!(f)?;
        }

        Ok(())
    }
}

impl Mem {
    /// Helper for <Mem as Debug>::fmt
    fn debug_compact(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Show up to and including the last non-zero value.
        // I.e., skip the suffix of all zeros.
        let last_nonzero = self.bytes.iter().enumerate().rev().find(|&(_i, &x)| x != 0);
        let end_idx = last_nonzero.map(|(i, _x)| i + 1).unwrap_or(0);
        let entries = self.bytes[..end_idx].iter().copied().map(DebugHexByte);

        f.debug_list().entries(entries).finish()
    }
}
