use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;

use ocho::cpu::Machine;
use ocho::debug_view::DebugView;
use ocho::rom;
use ocho::terminal_io::keyboard::{Control, Keyboard};
use ocho::terminal_io::TerminalDisplay;

/// A terminal CHIP-8 emulator.
///
/// Keys 1234/qwer/asdf/zxcv map onto the 16-key hex pad. Esc quits.
#[derive(Debug, Parser)]
struct Args {
    /// How many terminal columns wide to draw each pixel.
    scale: u16,

    /// Milliseconds between emulated cycles.
    delay_ms: u64,

    /// Path to a ROM image.
    rom_path: PathBuf,

    /// Pass "debug" to run with the machine-internals dashboard.
    #[arg(value_parser = ["debug"])]
    debug: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = rom::read(&args.rom_path)?;
    let mut machine = Machine::new();
    machine.load_rom(&rom)?;

    let scale = args.scale.clamp(1, 20);
    let delay = Duration::from_millis(args.delay_ms);

    if args.debug.is_some() {
        let frontend = DebugView::setup()?;
        run(machine, delay, frontend, |view, m, tone| view.render(m, tone))
    } else {
        let frontend = TerminalDisplay::setup(scale)?;
        run(machine, delay, frontend, |term, m, tone| term.render(m, tone))
    }
}

/// The main loop: drain input, gate cycles on the delay, draw every cycle.
fn run<F>(
    mut machine: Machine,
    delay: Duration,
    mut frontend: F,
    mut render: impl FnMut(&mut F, &Machine, ocho::Tone) -> Result<()>,
) -> Result<()> {
    let mut keyboard = Keyboard::default();
    let mut last_cycle = Instant::now();

    loop {
        if keyboard.poll()? == Control::Quit {
            return Ok(());
        }
        machine.set_keypad(keyboard.snapshot());

        if last_cycle.elapsed() >= delay {
            last_cycle = Instant::now();
            let tone = machine.step();
            render(&mut frontend, &machine, tone)?;
        }

        // Stay responsive without spinning a whole core.
        thread::sleep(Duration::from_micros(500));
    }
}
