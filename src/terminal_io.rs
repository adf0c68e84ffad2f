//! The plain terminal frontend: a `crossterm` renderer plus keyboard input.

pub mod keyboard;

use std::fmt::{self, Display};
use std::io;

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};

use crate::cpu::{screen, Machine, Tone};

/// Owns the terminal while the emulator runs. Raw mode and the alternate
/// screen are restored on drop, even when the run loop errors out.
#[derive(Debug)]
pub struct TerminalDisplay {
    scale: u16,
    last_frame: String,
}

impl TerminalDisplay {
    /// Take over the terminal. `scale` is how many columns wide each CHIP-8
    /// pixel renders; terminal cells are roughly twice as tall as they are
    /// wide, so rows scale by about half that.
    pub fn setup(scale: u16) -> Result<Self> {
        terminal::enable_raw_mode()?;
        io::stdout()
            .execute(EnterAlternateScreen)?
            .execute(Hide)?
            .execute(Clear(ClearType::All))?;
        Ok(Self {
            scale,
            last_frame: String::new(),
        })
    }

    pub fn render(&mut self, machine: &Machine, tone: Tone) -> Result<()> {
        self.last_frame = Frame {
            machine,
            tone,
            scale: self.scale,
        }
        .to_string();
        io::stdout()
            .execute(MoveTo(0, 0))?
            .execute(Print(&self.last_frame))?;
        Ok(())
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        fn try_drop(this: &TerminalDisplay) -> Result<()> {
            io::stdout().execute(Show)?.execute(LeaveAlternateScreen)?;
            terminal::disable_raw_mode()?;

            // Leaving the alternate screen discards its contents, so print
            // the last frame again to show where the program ended up.
            print!("{}", this.last_frame);
            Ok(())
        }

        // Ignore errors.
        try_drop(self).ok();
    }
}

/// One rendered frame, scaled up for the terminal.
struct Frame<'a> {
    machine: &'a Machine,
    tone: Tone,
    scale: u16,
}

impl Display for Frame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let xrep = self.scale as usize;
        let yrep = (self.scale as usize + 1) / 2;
        let screen = self.machine.screen();

        // \r\n line endings since the terminal is in raw mode.
        for y in 0..screen::Screen::HEIGHT {
            for _ in 0..yrep {
                for x in 0..screen::Screen::WIDTH {
                    let cell = if screen.pixel(x, y) { "\u{2588}" } else { " " };
                    for _ in 0..xrep {
                        f.write_str(cell)?;
                    }
                }
                f.write_str("\r\n")?;
            }
        }

        match self.tone {
            Tone::Beep => f.write_str("\x07 BEEP \r\n"),
            Tone::Silent => f.write_str("      \r\n"),
        }
    }
}
