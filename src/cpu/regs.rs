use std::{
    fmt::{self, Debug},
    ops::{Index, IndexMut},
};

use crate::debug;

/// The sixteen general-purpose registers V0..VF.
///
/// VF doubles as the flag register: arithmetic, shift and draw instructions
/// overwrite it with their carry/borrow/collision bit.
#[derive(Clone)]
pub struct Regs {
    v: [u8; 16],
}

impl Regs {
    pub fn new() -> Self {
        Self { v: [0; 16] }
    }

    pub fn as_array(&self) -> [u8; 16] {
        self.v
    }
}

impl Index<u8> for Regs {
    type Output = u8;

    fn index(&self, x: u8) -> &Self::Output {
        &self.v[x as usize]
    }
}

impl IndexMut<u8> for Regs {
    fn index_mut(&mut self, x: u8) -> &mut Self::Output {
        &mut self.v[x as usize]
    }
}

impl Debug for Regs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ ")?;
        debug::write_row(f, self.v)?;
        write!(f, " ]")?;
        Ok(())
    }
}
