//! A CHIP-8 emulator.
//!
//! [`cpu::Machine`] is the whole virtual machine: load a ROM, call
//! [`cpu::Machine::step`] once per cycle, feed it keypad state, and render
//! its screen however you like. [`terminal_io`] and [`debug_view`] are the
//! two terminal frontends the binary wires it up to.

pub mod cpu;
pub mod debug_view;
pub mod rom;
pub mod terminal_io;

mod debug;

pub use cpu::{Instr, Machine, Tone};
pub use rom::RomError;
