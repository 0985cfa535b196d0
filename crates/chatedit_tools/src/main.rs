//! Randomised edit driver for the chatedit engine.
//!
//! Applies random typing, deletions, cursor motions, multi-cursor spawns,
//! undo/redo and diff rewrites to one buffer, checking after every step that
//! cursors stay in bounds, merging is idempotent, and undo followed by redo
//! restores the text.
//!
//! # Usage
//!
//! ```bash
//! # 10k steps with a random seed
//! cargo run -p chatedit_tools --bin edit-stress
//!
//! # Replay a failing run
//! cargo run -p chatedit_tools --bin edit-stress -- --seed 1234 --steps 500
//!
//! # Watch the engine's own logging
//! RUST_LOG=chatedit_core=debug cargo run -p chatedit_tools --bin edit-stress -- --steps 50
//! ```

use chatedit_core::{Buffer, EditorSettings, ManualClock, Motion, Position};
use clap::Parser;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Randomised edit driver for the chatedit engine.
#[derive(Parser)]
#[command(name = "edit-stress", about = "Fuzz the chatedit buffer with random edits")]
struct Args {
    /// Number of random steps to run
    #[arg(short, long, default_value = "10000")]
    steps: usize,

    /// RNG seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Upper bound for the simulated pause between steps, in milliseconds
    #[arg(long, default_value = "900")]
    max_pause_ms: u64,

    /// Insert spaces instead of tabs
    #[arg(long)]
    tabs_to_spaces: bool,

    /// Print progress every N steps
    #[arg(long, default_value = "1000")]
    progress_interval: usize,
}

const SEED_TEXT: &str = concat!(
    "fn main() {\n",
    "\tlet greeting = \"héllo\";\n",
    "    println!(\"{}\", greeting);\n",
    "}\n",
);

const SNIPPETS: &[&str] = &[
    "a", "b", "z", " ", "_", "word", "\n", "\t", "é", "日本", "()", "{\n}", "  ", "ok.",
];

const MOTIONS: &[Motion] = &[
    Motion::Left,
    Motion::Right,
    Motion::Up,
    Motion::Down,
    Motion::PageUp(3),
    Motion::PageDown(3),
    Motion::WordLeft,
    Motion::WordRight,
    Motion::LineStart,
    Motion::LineEnd,
    Motion::StartOfText,
    Motion::BufferStart,
    Motion::BufferEnd,
];

fn random_position(buffer: &Buffer, rng: &mut impl Rng) -> Position {
    let y = rng.gen_range(0..buffer.line_count());
    let x = rng.gen_range(0..=buffer.lines().line_len(y));
    Position::new(x, y)
}

fn random_snippet(rng: &mut impl Rng) -> &'static str {
    SNIPPETS.choose(rng).copied().unwrap_or("x")
}

/// Text near the current content: a few random rune edits.
fn mutate_text(text: &str, rng: &mut impl Rng) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    for _ in 0..rng.gen_range(1..5) {
        let at = rng.gen_range(0..=chars.len());
        if rng.gen_bool(0.5) && at < chars.len() {
            chars.remove(at);
        } else {
            for (offset, ch) in random_snippet(rng).chars().enumerate() {
                chars.insert(at + offset, ch);
            }
        }
    }
    chars.into_iter().collect()
}

/// Run one random operation; returns a label for logging.
fn step(buffer: &mut Buffer, rng: &mut impl Rng) -> Result<&'static str, String> {
    let label = match rng.gen_range(0..100) {
        0..=24 => {
            buffer.type_text(random_snippet(rng));
            "type"
        }
        25..=32 => {
            buffer.backspace();
            "backspace"
        }
        33..=37 => {
            buffer.delete_forward();
            "delete"
        }
        38..=42 => {
            buffer.insert_newline();
            "newline"
        }
        43..=45 => {
            buffer.insert_tab();
            "tab"
        }
        46..=61 => {
            let motion = MOTIONS.choose(rng).copied().unwrap_or(Motion::Right);
            buffer.move_cursors(motion, rng.gen_bool(0.3));
            "move"
        }
        62..=65 => {
            if rng.gen_bool(0.5) {
                buffer.spawn_cursor_above();
            } else {
                buffer.spawn_cursor_below();
            }
            "spawn"
        }
        66..=69 => {
            let pos = random_position(buffer, rng);
            buffer.add_cursor(pos).map_err(|err| err.to_string())?;
            "add-cursor"
        }
        70..=72 => {
            let index = rng.gen_range(0..buffer.cursors().len());
            if rng.gen_bool(0.5) {
                buffer.select_word(index).map_err(|err| err.to_string())?;
            } else {
                buffer.select_line(index).map_err(|err| err.to_string())?;
            }
            buffer.spawn_cursors_on_selected_lines();
            "select"
        }
        73..=74 => {
            buffer.clear_cursors();
            "clear-cursors"
        }
        75..=82 => {
            let before = buffer.full_text();
            if buffer.undo() > 0 {
                buffer.redo();
                let after = buffer.full_text();
                if after != before {
                    return Err(format!(
                        "undo/redo round trip changed text:\n  before: {:?}\n  after:  {:?}",
                        before, after
                    ));
                }
            }
            "undo-redo"
        }
        83..=86 => {
            buffer.undo();
            "undo"
        }
        87..=91 => {
            let target = mutate_text(&buffer.full_text(), rng);
            buffer.apply_diff(&target);
            if buffer.full_text() != target {
                return Err(format!(
                    "apply_diff missed its target:\n  target: {:?}\n  actual: {:?}",
                    target,
                    buffer.full_text()
                ));
            }
            "diff"
        }
        _ => {
            let a = random_position(buffer, rng);
            let b = random_position(buffer, rng);
            let (start, end) = if a <= b { (a, b) } else { (b, a) };
            buffer
                .replace(start, end, random_snippet(rng))
                .map_err(|err| err.to_string())?;
            "replace"
        }
    };
    Ok(label)
}

fn check_invariants(buffer: &Buffer) -> Result<(), String> {
    let lines = buffer.lines();
    for cursor in buffer.cursors().iter() {
        let selection = cursor.selection();
        for (what, pos) in [
            ("location", cursor.location()),
            ("selection start", selection.start),
            ("selection end", selection.end),
        ] {
            if !pos.is_valid(lines) {
                return Err(format!(
                    "cursor {} {} {} out of bounds ({} lines)",
                    cursor.ordinal(),
                    what,
                    pos,
                    lines.line_count()
                ));
            }
        }
    }

    let mut merged = buffer.cursors().clone();
    merged.merge();
    let once: Vec<Position> = merged.iter().map(|cursor| cursor.location()).collect();
    let removed = merged.merge();
    let twice: Vec<Position> = merged.iter().map(|cursor| cursor.location()).collect();
    if removed != 0 || once != twice {
        return Err(format!("merge is not idempotent: {:?} then {:?}", once, twice));
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    println!("edit-stress seed: {}", seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let settings = EditorSettings {
        tabs_to_spaces: args.tabs_to_spaces,
        ..EditorSettings::from_env()
    };
    let clock = ManualClock::new();
    let mut buffer = match Buffer::with_clock(SEED_TEXT, settings, clock.clone()) {
        Ok(buffer) => buffer,
        Err(err) => {
            eprintln!("Failed to create buffer: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    for index in 0..args.steps {
        clock.advance(Duration::from_millis(rng.gen_range(0..=args.max_pause_ms)));
        let outcome =
            step(&mut buffer, &mut rng).and_then(|label| check_invariants(&buffer).map(|()| label));
        match outcome {
            Ok(label) => debug!(step = index, label, "ok"),
            Err(violation) => {
                eprintln!("Violation at step {} (seed {}): {}", index, seed, violation);
                eprintln!("Buffer text: {:?}", buffer.full_text());
                return ExitCode::FAILURE;
            }
        }
        if args.progress_interval > 0 && (index + 1) % args.progress_interval == 0 {
            info!(
                steps = index + 1,
                lines = buffer.line_count(),
                cursors = buffer.cursors().len(),
                undo = buffer.history().undo_len(),
                "progress"
            );
        }
    }

    println!("\nStress run complete:");
    println!("  Steps: {}", args.steps);
    println!("  Final lines: {}", buffer.line_count());
    println!("  Final cursors: {}", buffer.cursors().len());
    println!("  Time: {:.2?}", start.elapsed());
    ExitCode::SUCCESS
}
