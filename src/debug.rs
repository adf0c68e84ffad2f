//! Formatting helpers shared by the `Debug` impls and the debug overlay.

use std::fmt::{self, Debug};

pub(crate) struct DebugHexByte(pub u8);

impl Debug for DebugHexByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}", self.0)
    }
}

/// Write a row of 16 hex-formatted bytes, split into two groups of eight.
pub(crate) fn write_row(f: &mut fmt::Formatter<'_>, line: [u8; 16]) -> fmt::Result {
    write!(f, "{:02x}", line[0])?;
    for byte in &line[1..8] {
        write!(f, " {byte:02x}")?;
    }
    write!(f, " ")?;
    for byte in &line[8..] {
        write!(f, " {byte:02x}")?;
    }
    Ok(())
}

/// One hexdump-style line: address, hex bytes, ASCII column.
pub(crate) fn dump_line(addr: u16, bytes: &[u8]) -> String {
    let mut line = format!("{addr:04X}: ");
    for byte in bytes {
        line.push_str(&format!("{byte:02X} "));
    }
    line.push(' ');
    for &byte in bytes {
        let c = if (0x20..=0x7e).contains(&byte) {
            byte as char
        } else {
            '.'
        };
        line.push(c);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_line_shows_hex_and_ascii() {
        let line = dump_line(0x0200, &[0x41, 0x42, 0x00, 0xff]);
        assert_eq!(line, "0200: 41 42 00 FF  AB..");
    }
}
