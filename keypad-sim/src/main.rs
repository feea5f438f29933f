//! Host-side simulator for the matrix keypad driver.
//!
//! Runs the real driver against an in-memory electrical model of the
//! matrix, so debounce and hold behavior can be exercised
//! deterministically on a workstation. `replay` interprets a small scan
//! script:
//!
//! ```text
//! # tap the A key
//! down A
//! poll          # -> key A
//! wait 20
//! up A
//! wait 20
//! state A       # -> Released
//! ```

mod bus;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;

use matrix_keypad::{layout, KeypadMatrix, LineId};

use bus::SimBus;

/// Default wiring: rows on P0, P1, P2, P8 and columns on P16, P13, P14,
/// P15, matching the reference board.
const ROW_LINES: [LineId; 4] = [0, 1, 2, 8];
const COL_LINES: [LineId; 4] = [16, 13, 14, 15];

#[derive(Parser)]
#[command(name = "keypad-sim")]
#[command(about = "Matrix keypad simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, ValueEnum)]
enum Preset {
    /// 4 rows x 4 columns, digits plus A-D
    #[value(name = "4x4")]
    Phone4x4,
    /// 4 rows x 3 columns, digits only
    #[value(name = "3x4")]
    Phone3x4,
}

#[derive(Subcommand)]
enum Command {
    /// Print a preset's character layout
    Layout {
        #[arg(value_enum, default_value = "4x4")]
        preset: Preset,
    },
    /// Run a scan script against a virtual clock
    Replay {
        /// Path to the script (down/up/wait/poll/state lines)
        script: String,
        #[arg(long, value_enum, default_value = "4x4")]
        preset: Preset,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Layout { preset } => print_layout(preset),
        Command::Replay { script, preset } => {
            let contents =
                fs::read_to_string(&script).with_context(|| format!("reading {}", script))?;
            replay(&contents, preset)?;
        }
    }

    Ok(())
}

fn grid(preset: Preset) -> Vec<&'static [char]> {
    match preset {
        Preset::Phone4x4 => layout::PHONE_4X4.iter().map(|row| &row[..]).collect(),
        Preset::Phone3x4 => layout::PHONE_3X4.iter().map(|row| &row[..]).collect(),
    }
}

fn build(preset: Preset) -> KeypadMatrix<SimBus> {
    match preset {
        Preset::Phone4x4 => {
            let bus = SimBus::new(&ROW_LINES, &COL_LINES);
            KeypadMatrix::phone_4x4(bus, ROW_LINES, COL_LINES)
        }
        Preset::Phone3x4 => {
            let cols = [COL_LINES[0], COL_LINES[1], COL_LINES[2]];
            let bus = SimBus::new(&ROW_LINES, &cols);
            KeypadMatrix::phone_3x4(bus, ROW_LINES, cols)
        }
    }
}

fn print_layout(preset: Preset) {
    for row in grid(preset) {
        let line: Vec<String> = row.iter().map(char::to_string).collect();
        println!("{}", line.join(" "));
    }
}

/// Find the first cell carrying this character.
fn find_key(grid: &[&[char]], ch: char) -> Option<(usize, usize)> {
    for (r, row) in grid.iter().enumerate() {
        if let Some(c) = row.iter().position(|&k| k == ch) {
            return Some((r, c));
        }
    }
    None
}

fn replay(script: &str, preset: Preset) -> Result<()> {
    let grid = grid(preset);
    let mut keypad = build(preset);

    for (idx, raw) in script.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.split('#').next().unwrap_or(raw).trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else { continue };
        let arg = parts.next();

        match verb {
            "down" | "up" => {
                let ch = parse_key(arg)
                    .with_context(|| format!("line {}: '{}' needs a key", lineno, verb))?;
                let (row, col) = find_key(&grid, ch)
                    .ok_or_else(|| anyhow!("line {}: key '{}' is not in the layout", lineno, ch))?;
                if verb == "down" {
                    keypad.gpio_mut().press(row, col);
                } else {
                    keypad.gpio_mut().release(row, col);
                }
            }
            "wait" => {
                let ms: u64 = arg
                    .ok_or_else(|| anyhow!("line {}: 'wait' needs milliseconds", lineno))?
                    .parse()
                    .with_context(|| format!("line {}: bad duration", lineno))?;
                keypad.gpio_mut().advance_ms(ms);
            }
            "poll" => {
                let t = keypad.gpio().now_ms();
                match keypad.get_key() {
                    Some(ch) => println!("t={}ms key {}", t, ch),
                    None => println!("t={}ms key -", t),
                }
            }
            "state" => {
                let ch = parse_key(arg)
                    .with_context(|| format!("line {}: 'state' needs a key", lineno))?;
                let t = keypad.gpio().now_ms();
                println!("t={}ms {} {:?}", t, ch, keypad.key_state(ch));
            }
            _ => bail!("line {}: unknown verb '{}'", lineno, verb),
        }
    }

    Ok(())
}

fn parse_key(arg: Option<&str>) -> Result<char> {
    let arg = arg.ok_or_else(|| anyhow!("missing key"))?;
    let mut chars = arg.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(anyhow!("'{}' is not a single key character", arg)),
    }
}
