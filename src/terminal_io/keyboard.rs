use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};

/// How long a keypress counts as held.
///
/// Terminals only report presses (and autorepeats), never releases, so each
/// virtual key stays down for a short window after its last press event.
/// Autorepeat keeps refreshing the window while the physical key is held.
const SUSTAIN: Duration = Duration::from_millis(150);

/// What the main loop should do after draining input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Tracks the 16-key hex keypad from terminal key events.
#[derive(Debug, Default)]
pub struct Keyboard {
    pressed_at: [Option<Instant>; 16],
}

impl Keyboard {
    /// Drain pending terminal events. Esc and ctrl-c ask the loop to quit.
    pub fn poll(&mut self) -> Result<Control> {
        while event::poll(Duration::from_secs(0))? {
            let Event::Key(e) = event::read()? else {
                continue;
            };
            if e.code == KeyCode::Esc {
                return Ok(Control::Quit);
            }
            if let KeyCode::Char(c) = e.code {
                if matches!(c, 'c' | 'C') && e.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(Control::Quit);
                }
                if let Some(k) = keycode_to_chip8(c) {
                    self.pressed_at[k as usize] = Some(Instant::now());
                }
            }
        }
        Ok(Control::Continue)
    }

    /// The keypad as the machine sees it right now.
    pub fn snapshot(&self) -> [bool; 16] {
        let now = Instant::now();
        let mut keys = [false; 16];
        for (key, stamp) in keys.iter_mut().zip(&self.pressed_at) {
            *key = matches!(stamp, Some(at) if now.duration_since(*at) < SUSTAIN);
        }
        keys
    }
}

/// Translate a key from the physical keyboard into one of the 16 virtual
/// keys, using the conventional 4x4 block from `1` through `v`.
fn keycode_to_chip8(c: char) -> Option<u8> {
    let key = match c.to_ascii_lowercase() {
        '1' => 0x1,
        '2' => 0x2,
        '3' => 0x3,
        '4' => 0xc,
        'q' => 0x4,
        'w' => 0x5,
        'e' => 0x6,
        'r' => 0xd,
        'a' => 0x7,
        's' => 0x8,
        'd' => 0x9,
        'f' => 0xe,
        'z' => 0xa,
        'x' => 0x0,
        'c' => 0xb,
        'v' => 0xf,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keymap_covers_the_4x4_block() {
        assert_eq!(keycode_to_chip8('1'), Some(0x1));
        assert_eq!(keycode_to_chip8('4'), Some(0xc));
        assert_eq!(keycode_to_chip8('x'), Some(0x0));
        assert_eq!(keycode_to_chip8('V'), Some(0xf));
        assert_eq!(keycode_to_chip8('g'), None);
    }

    #[test]
    fn presses_sustain_then_expire() {
        let mut kb = Keyboard::default();
        kb.pressed_at[0x5] = Some(Instant::now());
        assert!(kb.snapshot()[0x5]);

        kb.pressed_at[0x5] = Some(Instant::now() - SUSTAIN * 2);
        assert!(!kb.snapshot()[0x5]);
    }
}
