use std::fmt::{self, Display};

/// One decoded CHIP-8 instruction.
///
/// Field names follow the classic opcode reference: `nnn` is a 12-bit
/// address, `kk` an 8-bit immediate, `x` and `y` register indices, `n` a
/// nibble. Decoding is total: every 16-bit word maps to a variant, with
/// [`Instr::Unknown`] catching the unassigned encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    /// 00E0: clear the screen.
    Cls,
    /// 00EE: return from subroutine.
    Ret,
    /// 0nnn: machine-code call on the original hardware; ignored here.
    Sys { nnn: u16 },
    /// 1nnn: jump.
    Jp { nnn: u16 },
    /// 2nnn: call subroutine.
    Call { nnn: u16 },
    /// 3xkk: skip next instruction if Vx == kk.
    SeByte { x: u8, kk: u8 },
    /// 4xkk: skip next instruction if Vx != kk.
    SneByte { x: u8, kk: u8 },
    /// 5xy0: skip next instruction if Vx == Vy.
    SeReg { x: u8, y: u8 },
    /// 6xkk: Vx = kk.
    LdByte { x: u8, kk: u8 },
    /// 7xkk: Vx += kk, wrapping, no flag.
    AddByte { x: u8, kk: u8 },
    /// 8xy0: Vx = Vy.
    LdReg { x: u8, y: u8 },
    /// 8xy1: Vx |= Vy.
    Or { x: u8, y: u8 },
    /// 8xy2: Vx &= Vy.
    And { x: u8, y: u8 },
    /// 8xy3: Vx ^= Vy.
    Xor { x: u8, y: u8 },
    /// 8xy4: Vx += Vy, VF = carry.
    Add { x: u8, y: u8 },
    /// 8xy5: Vx -= Vy, VF = not-borrow.
    Sub { x: u8, y: u8 },
    /// 8xy6: VF = pre-shift LSB of Vx, Vx >>= 1.
    Shr { x: u8 },
    /// 8xy7: Vx = Vy - Vx, VF = not-borrow.
    Subn { x: u8, y: u8 },
    /// 8xyE: VF = pre-shift MSB of Vx, Vx <<= 1.
    Shl { x: u8 },
    /// 9xy0: skip next instruction if Vx != Vy.
    SneReg { x: u8, y: u8 },
    /// Annn: I = nnn.
    LdI { nnn: u16 },
    /// Bnnn: jump to nnn + V0.
    JpV0 { nnn: u16 },
    /// Cxkk: Vx = random byte & kk.
    Rnd { x: u8, kk: u8 },
    /// Dxyn: draw n-row sprite from memory[I] at (Vx, Vy), VF = collision.
    Drw { x: u8, y: u8, n: u8 },
    /// Ex9E: skip next instruction if key Vx is pressed.
    Skp { x: u8 },
    /// ExA1: skip next instruction if key Vx is not pressed.
    Sknp { x: u8 },
    /// Fx07: Vx = delay timer.
    LdFromDt { x: u8 },
    /// Fx0A: block until any key is pressed, Vx = that key.
    LdKey { x: u8 },
    /// Fx15: delay timer = Vx.
    LdDt { x: u8 },
    /// Fx18: sound timer = Vx.
    LdSt { x: u8 },
    /// Fx1E: I += Vx, no flag.
    AddI { x: u8 },
    /// Fx29: I = address of the font glyph for digit Vx.
    LdGlyph { x: u8 },
    /// Fx33: BCD of Vx into memory[I..I+3].
    Bcd { x: u8 },
    /// Fx55: V0..=Vx into memory starting at I.
    Store { x: u8 },
    /// Fx65: memory starting at I into V0..=Vx.
    Load { x: u8 },
    /// Any encoding with no assigned meaning.
    Unknown(u16),
}

impl Instr {
    pub fn decode(op: u16) -> Self {
        let nnn = op & 0x0fff;
        let kk = (op & 0x00ff) as u8;
        let n = (op & 0x000f) as u8;
        let x = ((op & 0x0f00) >> 8) as u8;
        let y = ((op & 0x00f0) >> 4) as u8;

        match (op & 0xf000) >> 12 {
            0x0 => match op {
                0x00e0 => Instr::Cls,
                0x00ee => Instr::Ret,
                _ => Instr::Sys { nnn },
            },
            0x1 => Instr::Jp { nnn },
            0x2 => Instr::Call { nnn },
            0x3 => Instr::SeByte { x, kk },
            0x4 => Instr::SneByte { x, kk },
            0x5 if n == 0 => Instr::SeReg { x, y },
            0x6 => Instr::LdByte { x, kk },
            0x7 => Instr::AddByte { x, kk },
            0x8 => match n {
                0x0 => Instr::LdReg { x, y },
                0x1 => Instr::Or { x, y },
                0x2 => Instr::And { x, y },
                0x3 => Instr::Xor { x, y },
                0x4 => Instr::Add { x, y },
                0x5 => Instr::Sub { x, y },
                0x6 => Instr::Shr { x },
                0x7 => Instr::Subn { x, y },
                0xe => Instr::Shl { x },
                _ => Instr::Unknown(op),
            },
            0x9 if n == 0 => Instr::SneReg { x, y },
            0xa => Instr::LdI { nnn },
            0xb => Instr::JpV0 { nnn },
            0xc => Instr::Rnd { x, kk },
            0xd => Instr::Drw { x, y, n },
            0xe => match kk {
                0x9e => Instr::Skp { x },
                0xa1 => Instr::Sknp { x },
                _ => Instr::Unknown(op),
            },
            0xf => match kk {
                0x07 => Instr::LdFromDt { x },
                0x0a => Instr::LdKey { x },
                0x15 => Instr::LdDt { x },
                0x18 => Instr::LdSt { x },
                0x1e => Instr::AddI { x },
                0x29 => Instr::LdGlyph { x },
                0x33 => Instr::Bcd { x },
                0x55 => Instr::Store { x },
                0x65 => Instr::Load { x },
                _ => Instr::Unknown(op),
            },
            _ => Instr::Unknown(op),
        }
    }
}

/// The disassembly mnemonic, one per opcode family.
impl Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instr::Cls => write!(f, "CLS"),
            Instr::Ret => write!(f, "RET"),
            Instr::Sys { nnn } => write!(f, "SYS {nnn:03X}"),
            Instr::Jp { nnn } => write!(f, "JP {nnn:03X}"),
            Instr::Call { nnn } => write!(f, "CALL {nnn:03X}"),
            Instr::SeByte { x, kk } => write!(f, "SE V{x:X}, {kk:02X}"),
            Instr::SneByte { x, kk } => write!(f, "SNE V{x:X}, {kk:02X}"),
            Instr::SeReg { x, y } => write!(f, "SE V{x:X}, V{y:X}"),
            Instr::LdByte { x, kk } => write!(f, "LD V{x:X}, {kk:02X}"),
            Instr::AddByte { x, kk } => write!(f, "ADD V{x:X}, {kk:02X}"),
            Instr::LdReg { x, y } => write!(f, "LD V{x:X}, V{y:X}"),
            Instr::Or { x, y } => write!(f, "OR V{x:X}, V{y:X}"),
            Instr::And { x, y } => write!(f, "AND V{x:X}, V{y:X}"),
            Instr::Xor { x, y } => write!(f, "XOR V{x:X}, V{y:X}"),
            Instr::Add { x, y } => write!(f, "ADD V{x:X}, V{y:X}"),
            Instr::Sub { x, y } => write!(f, "SUB V{x:X}, V{y:X}"),
            Instr::Shr { x } => write!(f, "SHR V{x:X}"),
            Instr::Subn { x, y } => write!(f, "SUBN V{x:X}, V{y:X}"),
            Instr::Shl { x } => write!(f, "SHL V{x:X}"),
            Instr::SneReg { x, y } => write!(f, "SNE V{x:X}, V{y:X}"),
            Instr::LdI { nnn } => write!(f, "LD I, {nnn:03X}"),
            Instr::JpV0 { nnn } => write!(f, "JP V0, {nnn:03X}"),
            Instr::Rnd { x, kk } => write!(f, "RND V{x:X}, {kk:02X}"),
            Instr::Drw { x, y, n } => write!(f, "DRW V{x:X}, V{y:X}, {n:X}"),
            Instr::Skp { x } => write!(f, "SKP V{x:X}"),
            Instr::Sknp { x } => write!(f, "SKNP V{x:X}"),
            Instr::LdFromDt { x } => write!(f, "LD V{x:X}, DT"),
            Instr::LdKey { x } => write!(f, "LD V{x:X}, K"),
            Instr::LdDt { x } => write!(f, "LD DT, V{x:X}"),
            Instr::LdSt { x } => write!(f, "LD ST, V{x:X}"),
            Instr::AddI { x } => write!(f, "ADD I, V{x:X}"),
            Instr::LdGlyph { x } => write!(f, "LD F, V{x:X}"),
            Instr::Bcd { x } => write!(f, "LD B, V{x:X}"),
            Instr::Store { x } => write!(f, "LD [I], V{x:X}"),
            Instr::Load { x } => write!(f, "LD V{x:X}, [I]"),
            Instr::Unknown(_) => write!(f, "UNKNOWN"),
        }
    }
}
