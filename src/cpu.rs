//! The CHIP-8 virtual machine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use instr::Instr;
pub use mem::Mem;
pub use regs::Regs;
pub use screen::{Flip, Screen};
pub use stack::Stack;

use crate::rom::RomError;

pub mod instr;
pub mod mem;
pub mod regs;
pub mod screen;
pub mod stack;

/// What the buzzer should do after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Silent,
    Beep,
}

/// The whole machine state: memory, registers, timers, screen, keypad.
///
/// Drive it by calling [`Machine::step`] once per emulated cycle, feeding
/// in keypad state via [`Machine::set_keypad`] between cycles.
pub struct Machine {
    mem: Mem,
    v: Regs,
    i: u16,
    pc: u16,
    stack: Stack,
    dt: u8,
    st: u8,
    screen: Screen,
    keypad: [bool; 16],
    opcode: u16,
    rng: StdRng,
}

impl Machine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A machine whose RND instruction is deterministic. Two machines built
    /// with the same seed run identical instruction streams identically.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            mem: Mem::new(),
            v: Regs::new(),
            i: 0,
            pc: Mem::ROM_START,
            stack: Stack::new(),
            dt: 0,
            st: 0,
            screen: Screen::new(),
            keypad: [false; 16],
            opcode: 0,
            rng,
        }
    }

    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), RomError> {
        self.mem.load_rom(rom)
    }

    /// Run one fetch/decode/execute cycle, then tick both timers.
    ///
    /// Returns [`Tone::Beep`] for any cycle the sound timer was still
    /// running at the start of the tick.
    pub fn step(&mut self) -> Tone {
        let hi = self.mem.read(self.pc);
        let lo = self.mem.read(self.pc.wrapping_add(1));
        self.opcode = u16::from_be_bytes([hi, lo]);
        self.pc = self.pc.wrapping_add(2);

        self.exec(Instr::decode(self.opcode));

        if self.dt > 0 {
            self.dt -= 1;
        }
        if self.st > 0 {
            self.st -= 1;
            Tone::Beep
        } else {
            Tone::Silent
        }
    }

    fn exec(&mut self, instr: Instr) {
        match instr {
            Instr::Cls => self.screen.clear(),
            Instr::Ret => {
                // Popping an empty stack leaves pc where it is.
                if let Some(addr) = self.stack.pop() {
                    self.pc = addr;
                }
            }
            Instr::Sys { .. } => {}
            Instr::Jp { nnn } => self.pc = nnn,
            Instr::Call { nnn } => {
                // A full stack swallows the call instead of corrupting it.
                if self.stack.push(self.pc) {
                    self.pc = nnn;
                }
            }
            Instr::SeByte { x, kk } => {
                if self.v[x] == kk {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Instr::SneByte { x, kk } => {
                if self.v[x] != kk {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Instr::SeReg { x, y } => {
                if self.v[x] == self.v[y] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Instr::LdByte { x, kk } => self.v[x] = kk,
            Instr::AddByte { x, kk } => self.v[x] = self.v[x].wrapping_add(kk),
            Instr::LdReg { x, y } => self.v[x] = self.v[y],
            Instr::Or { x, y } => self.v[x] |= self.v[y],
            Instr::And { x, y } => self.v[x] &= self.v[y],
            Instr::Xor { x, y } => self.v[x] ^= self.v[y],
            Instr::Add { x, y } => {
                let sum = self.v[x] as u16 + self.v[y] as u16;
                // Flag first, then value, so Vx == VF keeps the sum.
                self.v[0xf] = (sum > 0xff) as u8;
                self.v[x] = sum as u8;
            }
            Instr::Sub { x, y } => {
                let diff = self.v[x].wrapping_sub(self.v[y]);
                self.v[0xf] = (self.v[x] >= self.v[y]) as u8;
                self.v[x] = diff;
            }
            Instr::Shr { x } => {
                let shifted = self.v[x] >> 1;
                self.v[0xf] = self.v[x] & 0x01;
                self.v[x] = shifted;
            }
            Instr::Subn { x, y } => {
                let diff = self.v[y].wrapping_sub(self.v[x]);
                self.v[0xf] = (self.v[y] >= self.v[x]) as u8;
                self.v[x] = diff;
            }
            Instr::Shl { x } => {
                let shifted = self.v[x] << 1;
                self.v[0xf] = (self.v[x] & 0x80) >> 7;
                self.v[x] = shifted;
            }
            Instr::SneReg { x, y } => {
                if self.v[x] != self.v[y] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Instr::LdI { nnn } => self.i = nnn,
            Instr::JpV0 { nnn } => self.pc = nnn.wrapping_add(self.v[0] as u16),
            Instr::Rnd { x, kk } => self.v[x] = self.rng.gen::<u8>() & kk,
            Instr::Drw { x, y, n } => self.draw_sprite(x, y, n),
            Instr::Skp { x } => {
                if self.key_pressed(self.v[x]) {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Instr::Sknp { x } => {
                if !self.key_pressed(self.v[x]) {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Instr::LdFromDt { x } => self.v[x] = self.dt,
            Instr::LdKey { x } => {
                match self.keypad.iter().position(|&down| down) {
                    Some(key) => self.v[x] = key as u8,
                    // Nothing pressed; re-run this instruction next cycle.
                    None => self.pc = self.pc.wrapping_sub(2),
                }
            }
            Instr::LdDt { x } => self.dt = self.v[x],
            Instr::LdSt { x } => self.st = self.v[x],
            Instr::AddI { x } => self.i = self.i.wrapping_add(self.v[x] as u16),
            Instr::LdGlyph { x } => self.i = Mem::glyph_addr(self.v[x]),
            Instr::Bcd { x } => {
                let value = self.v[x];
                self.mem.write(self.i, value / 100);
                self.mem.write(self.i.wrapping_add(1), (value / 10) % 10);
                self.mem.write(self.i.wrapping_add(2), value % 10);
            }
            Instr::Store { x } => {
                for r in 0..=x {
                    self.mem.write(self.i.wrapping_add(r as u16), self.v[r]);
                }
            }
            Instr::Load { x } => {
                for r in 0..=x {
                    self.v[r] = self.mem.read(self.i.wrapping_add(r as u16));
                }
            }
            Instr::Unknown(op) => {
                log::warn!("unknown opcode {op:#06x} at {:#05x}", self.pc.wrapping_sub(2));
            }
        }
    }

    /// XOR an `n`-row sprite from `memory[I]` onto the screen at (Vx, Vy).
    /// VF records whether any pixel was erased.
    fn draw_sprite(&mut self, x: u8, y: u8, n: u8) {
        let left = self.v[x] as usize;
        let top = self.v[y] as usize;

        self.v[0xf] = 0;
        for row in 0..n as usize {
            let sprite = self.mem.read(self.i.wrapping_add(row as u16));
            for col in 0..8 {
                if sprite & (0x80 >> col) != 0 {
                    if self.screen.flip(left + col, top + row) == Flip::Collision {
                        self.v[0xf] = 1;
                    }
                }
            }
        }
    }

    fn key_pressed(&self, key: u8) -> bool {
        self.keypad.get(key as usize).copied().unwrap_or(false)
    }

    pub fn set_keypad(&mut self, keypad: [bool; 16]) {
        self.keypad = keypad;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn sp(&self) -> u8 {
        self.stack.sp()
    }

    /// The last opcode fetched by [`Machine::step`].
    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    pub fn delay_timer(&self) -> u8 {
        self.dt
    }

    pub fn sound_timer(&self) -> u8 {
        self.st
    }

    pub fn v(&self) -> [u8; 16] {
        self.v.as_array()
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn mem(&self) -> &Mem {
        &self.mem
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn keypad(&self) -> &[bool; 16] {
        &self.keypad
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A machine booted with the given ROM and a fixed RNG seed.
    fn boot(rom: &[u8]) -> Machine {
        let mut m = Machine::with_seed(0);
        m.load_rom(rom).unwrap();
        m
    }

    #[test]
    fn ld_then_add_immediate() {
        let mut m = boot(&[0x60, 0x05, 0x70, 0x03]);
        m.step();
        m.step();
        assert_eq!(m.v()[0], 8);
        assert_eq!(m.pc(), 0x204);
    }

    #[test]
    fn add_immediate_wraps_without_flag() {
        let mut m = boot(&[0x60, 0xff, 0x70, 0x02]);
        m.step();
        m.step();
        assert_eq!(m.v()[0], 0x01);
        assert_eq!(m.v()[0xf], 0);
    }

    #[test]
    fn add_registers_sets_carry() {
        // V0 = 0xf0, V1 = 0x20, V0 += V1.
        let mut m = boot(&[0x60, 0xf0, 0x61, 0x20, 0x80, 0x14]);
        for _ in 0..3 {
            m.step();
        }
        assert_eq!(m.v()[0], 0x10);
        assert_eq!(m.v()[0xf], 1);
    }

    #[test]
    fn sub_sets_not_borrow() {
        // V0 = 10, V1 = 3, V0 -= V1.
        let mut m = boot(&[0x60, 0x0a, 0x61, 0x03, 0x80, 0x15]);
        for _ in 0..3 {
            m.step();
        }
        assert_eq!(m.v()[0], 7);
        assert_eq!(m.v()[0xf], 1);
    }

    #[test]
    fn sub_clears_flag_on_borrow() {
        let mut m = boot(&[0x60, 0x03, 0x61, 0x0a, 0x80, 0x15]);
        for _ in 0..3 {
            m.step();
        }
        assert_eq!(m.v()[0], 0xf9);
        assert_eq!(m.v()[0xf], 0);
    }

    #[test]
    fn subn_subtracts_the_other_way() {
        // V0 = 3, V1 = 10, V0 = V1 - V0.
        let mut m = boot(&[0x60, 0x03, 0x61, 0x0a, 0x80, 0x17]);
        for _ in 0..3 {
            m.step();
        }
        assert_eq!(m.v()[0], 7);
        assert_eq!(m.v()[0xf], 1);
    }

    #[test]
    fn shifts_capture_the_ejected_bit() {
        let mut m = boot(&[0x60, 0x81, 0x80, 0x06]);
        m.step();
        m.step();
        assert_eq!(m.v()[0], 0x40);
        assert_eq!(m.v()[0xf], 1);

        let mut m = boot(&[0x60, 0x81, 0x80, 0x0e]);
        m.step();
        m.step();
        assert_eq!(m.v()[0], 0x02);
        assert_eq!(m.v()[0xf], 1);
    }

    #[test]
    fn skip_instructions_advance_by_four() {
        // V0 = 5, then SE V0, 05 skips; SNE V0, 05 does not.
        let mut m = boot(&[0x60, 0x05, 0x30, 0x05, 0x00, 0x00, 0x40, 0x05]);
        m.step();
        m.step();
        assert_eq!(m.pc(), 0x206);
        m.step();
        assert_eq!(m.pc(), 0x208);
    }

    #[test]
    fn drawing_twice_erases_and_reports_collision() {
        // Point I at glyph 0 and draw it twice at the origin.
        let rom = [0x60, 0x00, 0xf0, 0x29, 0xd0, 0x05, 0xd0, 0x05];
        let mut m = boot(&rom);
        for _ in 0..3 {
            m.step();
        }
        assert!(!m.screen().is_blank());
        assert_eq!(m.v()[0xf], 0);
        m.step();
        assert!(m.screen().is_blank());
        assert_eq!(m.v()[0xf], 1);
    }

    #[test]
    fn cls_blanks_the_screen() {
        let rom = [0x60, 0x00, 0xf0, 0x29, 0xd0, 0x05, 0x00, 0xe0];
        let mut m = boot(&rom);
        for _ in 0..4 {
            m.step();
        }
        assert!(m.screen().is_blank());
    }

    #[test]
    fn call_and_ret_round_trip() {
        let mut m = boot(&[0x23, 0x00]);
        m.mem.write(0x300, 0x00);
        m.mem.write(0x301, 0xee);
        m.step();
        assert_eq!(m.pc(), 0x300);
        assert_eq!(m.sp(), 1);
        m.step();
        assert_eq!(m.pc(), 0x202);
        assert_eq!(m.sp(), 0);
    }

    #[test]
    fn call_on_a_full_stack_is_ignored() {
        // 0x2200 at 0x200 calls itself; the 17th call must be swallowed
        // rather than advance sp past 16.
        let mut m = boot(&[0x22, 0x00]);
        for _ in 0..16 {
            m.step();
        }
        assert_eq!(m.sp(), 16);
        assert_eq!(m.pc(), 0x200);
        m.step();
        assert_eq!(m.sp(), 16);
        assert_eq!(m.pc(), 0x202);
    }

    #[test]
    fn ret_on_an_empty_stack_is_ignored() {
        let mut m = boot(&[0x00, 0xee]);
        m.step();
        assert_eq!(m.pc(), 0x202);
        assert_eq!(m.sp(), 0);
    }

    #[test]
    fn wait_for_key_pins_the_pc() {
        let mut m = boot(&[0xf0, 0x0a]);
        for _ in 0..5 {
            m.step();
        }
        assert_eq!(m.pc(), 0x200);

        let mut keys = [false; 16];
        keys[0xb] = true;
        m.set_keypad(keys);
        m.step();
        assert_eq!(m.v()[0], 0xb);
        assert_eq!(m.pc(), 0x202);
    }

    #[test]
    fn key_skips_respect_the_keypad() {
        // V0 = 4, key 4 held; SKP V0 skips, SKNP V0 does not.
        let mut m = boot(&[0x60, 0x04, 0xe0, 0x9e, 0x00, 0x00, 0xe0, 0xa1]);
        let mut keys = [false; 16];
        keys[4] = true;
        m.set_keypad(keys);
        m.step();
        m.step();
        assert_eq!(m.pc(), 0x206);
        m.step();
        assert_eq!(m.pc(), 0x208);
    }

    #[test]
    fn rnd_respects_its_mask() {
        let mut m = boot(&[0xc0, 0x0f]);
        m.step();
        assert_eq!(m.v()[0] & 0xf0, 0);
    }

    #[test]
    fn same_seed_gives_the_same_randoms() {
        let rom = [0xc0, 0xff, 0xc1, 0xff];
        let mut a = boot(&rom);
        let mut b = boot(&rom);
        for _ in 0..2 {
            a.step();
            b.step();
        }
        assert_eq!(a.v(), b.v());
    }

    #[test]
    fn timers_tick_once_per_cycle() {
        // V0 = 3, DT = V0. The setting cycle itself ticks DT down to 2.
        let mut m = boot(&[0x60, 0x03, 0xf0, 0x15]);
        m.step();
        m.step();
        assert_eq!(m.delay_timer(), 2);
        m.step();
        assert_eq!(m.delay_timer(), 1);
    }

    #[test]
    fn sound_timer_drives_the_tone() {
        // V0 = 1, ST = V0. The setting cycle beeps and exhausts the timer.
        let mut m = boot(&[0x60, 0x01, 0xf0, 0x18]);
        assert_eq!(m.step(), Tone::Silent);
        assert_eq!(m.step(), Tone::Beep);
        assert_eq!(m.step(), Tone::Silent);
        assert_eq!(m.sound_timer(), 0);
    }

    #[test]
    fn unknown_opcode_is_a_no_op() {
        let mut m = boot(&[0xff, 0xff, 0x60, 0x07]);
        m.step();
        m.step();
        assert_eq!(m.v()[0], 7);
        assert_eq!(m.pc(), 0x204);
    }

    #[test]
    fn sys_is_ignored() {
        let mut m = boot(&[0x01, 0x23]);
        m.step();
        assert_eq!(m.pc(), 0x202);
    }

    #[test]
    fn bcd_splits_decimal_digits() {
        // V0 = 234, I = 0x300, store BCD.
        let mut m = boot(&[0x60, 0xea, 0xa3, 0x00, 0xf0, 0x33]);
        for _ in 0..3 {
            m.step();
        }
        assert_eq!(m.mem().read(0x300), 2);
        assert_eq!(m.mem().read(0x301), 3);
        assert_eq!(m.mem().read(0x302), 4);
    }

    #[test]
    fn store_and_load_are_inclusive_and_leave_i_alone() {
        // V0..=V2 = 1, 2, 3; store at 0x300; clobber V1; load back.
        let rom = [
            0x60, 0x01, 0x61, 0x02, 0x62, 0x03, 0xa3, 0x00, 0xf2, 0x55, 0x61, 0x00, 0xf2, 0x65,
        ];
        let mut m = boot(&rom);
        for _ in 0..7 {
            m.step();
        }
        assert_eq!(&m.v()[..3], &[1, 2, 3]);
        assert_eq!(m.index(), 0x300);
        assert_eq!(m.mem().read(0x303), 0);
    }

    #[test]
    fn glyph_lookup_points_into_the_font() {
        let mut m = boot(&[0x60, 0x0a, 0xf0, 0x29]);
        m.step();
        m.step();
        assert_eq!(m.index(), Mem::glyph_addr(0xa));
    }

    #[test]
    fn jump_with_offset_adds_v0() {
        let mut m = boot(&[0x60, 0x10, 0xb3, 0x00]);
        m.step();
        m.step();
        assert_eq!(m.pc(), 0x310);
    }

    #[test]
    fn last_opcode_is_retained() {
        let mut m = boot(&[0x6a, 0x42]);
        m.step();
        assert_eq!(m.opcode(), 0x6a42);
    }
}
