use std::{num::NonZeroUsize, path::PathBuf};

use cbf_interp::{InputMode, LoopEntry};
use clap::{ArgAction, Parser};

/// Handle CLI arguments for cbf
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// The Brainfuck program to execute
    #[clap(name = "PROGRAM")]
    pub program: PathBuf,

    /// Read the program's input from this file.
    ///
    /// Without --input or --input-string, stdin is read to the end before the run
    /// starts, but only if the program contains a `,`.
    #[arg(short, long, conflicts_with = "input_string")]
    pub input: Option<PathBuf>,

    /// Use this text as the program's input
    #[arg(short = 's', long)]
    pub input_string: Option<String>,

    /// Let each `,` consume one input byte instead of re-reading the first one
    #[arg(short, long)]
    pub consume_input: bool,

    /// Always run a loop body at least once, even if the cell is zero at `[`
    #[arg(short, long)]
    pub always_enter: bool,

    /// Abort after this many instructions
    #[arg(short = 'l', long)]
    pub step_limit: Option<NonZeroUsize>,

    /// Print the final machine state to stderr
    #[clap(short, long)]
    pub report_state: bool,

    /// Log more, repeat for even more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn input_mode(&self) -> InputMode {
        if self.consume_input {
            InputMode::Consume
        } else {
            InputMode::Sticky
        }
    }

    pub fn loop_entry(&self) -> LoopEntry {
        if self.always_enter {
            LoopEntry::AlwaysEnter
        } else {
            LoopEntry::SkipIfZero
        }
    }
}
