use std::fmt::{self, Debug};

/// The 64×32 monochrome framebuffer.
///
/// Pixels toggle by XOR. Sprite coordinates wrap at the screen edges;
/// wrap-around is on screen coordinates, never on memory addresses.
#[derive(Clone)]
pub struct Screen {
    rows: [[bool; Self::WIDTH]; Self::HEIGHT],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
    NoCollision,
    Collision,
}

impl Screen {
    pub const WIDTH: usize = 64;
    pub const HEIGHT: usize = 32;

    pub fn new() -> Self {
        Self {
            rows: [[false; Self::WIDTH]; Self::HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.rows[y][x]
    }

    /// XOR-toggle the pixel at (x, y), wrapping both coordinates.
    /// Reports whether the pixel was already on.
    pub fn flip(&mut self, x: usize, y: usize) -> Flip {
        let pixel = &mut self.rows[y % Self::HEIGHT][x % Self::WIDTH];
        let was_on = *pixel;
        *pixel ^= true;

        if was_on {
            Flip::Collision
        } else {
            Flip::NoCollision
        }
    }

    pub fn is_blank(&self) -> bool {
        self.rows.iter().flatten().all(|&p| !p)
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for y in 0..self.rows.len() {
            for x in 0..self.rows[y].len() {
                let c = if self.rows[y][x] { '#' } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
