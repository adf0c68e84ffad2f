//! The debug frontend: a `tui` dashboard alongside the emulated display.
//!
//! Shows the screen plus live machine internals, refreshed every frame:
//! registers and timers, the keypad, the call stack, a memory view that
//! follows the program counter, and a disassembly window around it.

use std::io::{self, Stdout};

use anyhow::Result;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use tui::backend::CrosstermBackend;
use tui::layout::{Constraint, Direction, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::symbols::Marker;
use tui::text::{Span, Spans};
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders, Paragraph};
use tui::Frame;

use crate::cpu::{screen::Screen, Instr, Machine, Tone};
use crate::debug;

type Backend = CrosstermBackend<Stdout>;

const HILIGHT: Color = Color::Yellow;

/// Owns the terminal while the debug dashboard runs. Raw mode and the
/// alternate screen are restored on drop.
pub struct DebugView {
    terminal: tui::Terminal<Backend>,
}

impl DebugView {
    pub fn setup() -> Result<Self> {
        terminal::enable_raw_mode()?;
        io::stdout().execute(EnterAlternateScreen)?;
        let terminal = tui::Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(Self { terminal })
    }

    pub fn render(&mut self, machine: &Machine, tone: Tone) -> Result<()> {
        self.terminal.draw(|f| {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(68), Constraint::Min(30)])
                .split(f.size());

            let left = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(34), Constraint::Min(8)])
                .split(columns[0]);
            display_panel(f, left[0], machine, tone);
            disassembly_panel(f, left[1], machine);

            let right = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(12),
                    Constraint::Length(6),
                    Constraint::Length(6),
                    Constraint::Min(6),
                ])
                .split(columns[1]);
            registers_panel(f, right[0], machine);
            keypad_panel(f, right[1], machine);
            stack_panel(f, right[2], machine);
            memory_panel(f, right[3], machine);
        })?;
        Ok(())
    }
}

impl Drop for DebugView {
    fn drop(&mut self) {
        fn try_drop() -> Result<()> {
            io::stdout().execute(LeaveAlternateScreen)?;
            terminal::disable_raw_mode()?;
            Ok(())
        }

        // Ignore errors.
        try_drop().ok();
    }
}

fn display_panel(f: &mut Frame<'_, Backend>, area: Rect, machine: &Machine, tone: Tone) {
    let title = match tone {
        Tone::Beep => "Display (BEEP)",
        Tone::Silent => "Display",
    };
    let screen = machine.screen();
    let canvas = Canvas::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .marker(Marker::Block)
        .x_bounds([0.0, (Screen::WIDTH - 1) as f64])
        .y_bounds([-((Screen::HEIGHT - 1) as f64), 0.0])
        .paint(move |ctx| {
            let mut lit = Vec::new();
            for y in 0..Screen::HEIGHT {
                for x in 0..Screen::WIDTH {
                    if screen.pixel(x, y) {
                        lit.push((x as f64, -(y as f64)));
                    }
                }
            }
            ctx.draw(&Points {
                coords: &lit,
                color: Color::White,
            });
        });
    f.render_widget(canvas, area);
}

fn registers_panel(f: &mut Frame<'_, Backend>, area: Rect, machine: &Machine) {
    let v = machine.v();
    let mut lines = Vec::new();
    for row in 0..4 {
        let mut spans = Vec::new();
        for col in 0..4 {
            let r = row * 4 + col;
            spans.push(Span::raw(format!("V{r:X}={:02X}  ", v[r])));
        }
        lines.push(Spans::from(spans));
    }
    lines.push(Spans::from(format!(
        "PC={:03X}  I={:03X}  SP={:X}",
        machine.pc(),
        machine.index(),
        machine.sp(),
    )));
    lines.push(Spans::from(format!(
        "DT={:02X}   ST={:02X}",
        machine.delay_timer(),
        machine.sound_timer(),
    )));
    lines.push(Spans::from(format!(
        "opcode={:04X}  {}",
        machine.opcode(),
        Instr::decode(machine.opcode()),
    )));

    let panel = Paragraph::new(lines)
        .block(Block::default().title("Registers & State").borders(Borders::ALL));
    f.render_widget(panel, area);
}

/// The keypad in its physical layout, pressed keys highlighted.
fn keypad_panel(f: &mut Frame<'_, Backend>, area: Rect, machine: &Machine) {
    const LAYOUT: [[u8; 4]; 4] = [
        [0x1, 0x2, 0x3, 0xc],
        [0x4, 0x5, 0x6, 0xd],
        [0x7, 0x8, 0x9, 0xe],
        [0xa, 0x0, 0xb, 0xf],
    ];

    let keypad = machine.keypad();
    let lines: Vec<Spans> = LAYOUT
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|&k| {
                    let style = if keypad[k as usize] {
                        Style::default().fg(HILIGHT).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    Span::styled(format!(" {k:X} "), style)
                })
                .collect();
            Spans::from(spans)
        })
        .collect();

    let panel = Paragraph::new(lines).block(Block::default().title("Keypad").borders(Borders::ALL));
    f.render_widget(panel, area);
}

fn stack_panel(f: &mut Frame<'_, Backend>, area: Rect, machine: &Machine) {
    let stack = machine.stack();
    let sp = stack.sp() as usize;
    let lines: Vec<Spans> = stack.entries()[..sp]
        .iter()
        .enumerate()
        .rev()
        .map(|(depth, addr)| Spans::from(format!("{depth:X}: {addr:03X}")))
        .collect();

    let title = format!("Stack ({sp})");
    let panel = Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(panel, area);
}

const BYTES_PER_ROW: u16 = 8;

/// First address of the memory window: row-aligned, keeping pc visible a
/// third of the way down.
fn memory_window(pc: u16, rows: u16) -> u16 {
    pc.saturating_sub((rows / 3).saturating_mul(BYTES_PER_ROW)) / BYTES_PER_ROW * BYTES_PER_ROW
}

/// First address of the disassembly window: even-aligned, pc centered.
fn disassembly_window(pc: u16, rows: u16) -> u16 {
    pc.saturating_sub((rows / 2).saturating_mul(2)) & !1
}

/// Address of a panel row. Wraps: `JP V0, nnn` can push pc out of the 12-bit
/// space and on up to 0xFFFE, and the panels must keep drawing there.
fn row_addr(first: u16, row: u16, stride: u16) -> u16 {
    first.wrapping_add(row.wrapping_mul(stride))
}

/// A hexdump window that follows the program counter.
fn memory_panel(f: &mut Frame<'_, Backend>, area: Rect, machine: &Machine) {
    let rows = area.height.saturating_sub(2).max(1);
    let first = memory_window(machine.pc(), rows);

    let lines: Vec<Spans> = (0..rows)
        .map(|row| {
            let addr = row_addr(first, row, BYTES_PER_ROW);
            let bytes: Vec<u8> = (0..BYTES_PER_ROW)
                .map(|off| machine.mem().read(addr.wrapping_add(off)))
                .collect();
            let text = debug::dump_line(addr, &bytes);
            if machine.pc().wrapping_sub(addr) < BYTES_PER_ROW {
                Spans::from(Span::styled(text, Style::default().fg(HILIGHT)))
            } else {
                Spans::from(text)
            }
        })
        .collect();

    let panel = Paragraph::new(lines).block(Block::default().title("Memory").borders(Borders::ALL));
    f.render_widget(panel, area);
}

/// Decoded instructions around the program counter, current one highlighted.
fn disassembly_panel(f: &mut Frame<'_, Backend>, area: Rect, machine: &Machine) {
    let rows = area.height.saturating_sub(2).max(1);
    let first = disassembly_window(machine.pc(), rows);

    let lines: Vec<Spans> = (0..rows)
        .map(|row| {
            let addr = row_addr(first, row, 2);
            let op = u16::from_be_bytes([
                machine.mem().read(addr),
                machine.mem().read(addr.wrapping_add(1)),
            ]);
            let text = format!("{addr:03X}: {op:04X}  {}", Instr::decode(op));
            if addr == machine.pc() {
                Spans::from(Span::styled(
                    text,
                    Style::default().fg(HILIGHT).add_modifier(Modifier::BOLD),
                ))
            } else {
                Spans::from(text)
            }
        })
        .collect();

    let panel =
        Paragraph::new(lines).block(Block::default().title("Disassembly").borders(Borders::ALL));
    f.render_widget(panel, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_windows_tolerate_a_pc_at_the_top_of_the_address_space() {
        // LD V0, FF then JP V0, FFF sends pc to 0x10FE; from there every
        // fetch reads zeros (SYS no-ops) and pc climbs two at a time.
        let mut machine = Machine::with_seed(0);
        machine.load_rom(&[0x60, 0xff, 0xbf, 0xff]).unwrap();
        while machine.pc() != 0xfffe {
            machine.step();
        }

        // Overflow-checked arithmetic would abort here; the window math has
        // to wrap instead, and reads past the top are already tolerated.
        let rows = 10;
        let first = memory_window(machine.pc(), rows);
        for row in 0..rows {
            let addr = row_addr(first, row, BYTES_PER_ROW);
            for off in 0..BYTES_PER_ROW {
                machine.mem().read(addr.wrapping_add(off));
            }
        }
        assert_eq!(row_addr(memory_window(0xfffe, rows), rows - 1, BYTES_PER_ROW), 0x0028);

        let first = disassembly_window(machine.pc(), rows);
        for row in 0..rows {
            row_addr(first, row, 2);
        }
        assert_eq!(row_addr(disassembly_window(0xfffe, rows), rows - 1, 2), 0x0006);
    }

    #[test]
    fn windows_keep_the_pc_in_view() {
        let rows = 12;
        let first = memory_window(0x0200, rows);
        assert_eq!(first % BYTES_PER_ROW, 0);
        assert!(first <= 0x0200 && 0x0200 < row_addr(first, rows, BYTES_PER_ROW));

        let first = disassembly_window(0x0200, rows);
        assert_eq!(first % 2, 0);
        assert!(first <= 0x0200 && 0x0200 < row_addr(first, rows, 2));
    }
}
