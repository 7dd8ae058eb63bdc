use crate::instructions::{Command, Instruction};
use std::{
    io::{self, BufRead, BufReader, Read},
    str::FromStr,
};
use thiserror::Error;

/// Structural problems with the loops of a program. Positions are 1-based.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoopError {
    #[error("unmatched closing bracket at line {line}, column {column}")]
    UnmatchedClose { line: usize, column: usize },
    #[error("unclosed opening bracket at line {line}, column {column}")]
    UnclosedOpen { line: usize, column: usize },
}

/// Reasons a program can be refused before it ever runs.
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("invalid command {character:?} at line {line}, column {column}")]
    InvalidCommand {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("unbalanced loop: {0}")]
    UnbalancedLoop(#[from] LoopError),
    #[error("failed to read program: {0}")]
    Io(#[from] io::Error),
}

/// A position in a [`Program`]. Everything from here to the end of the program is
/// what is left to run, so a cursor doubles as a saved continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgramCursor {
    position: usize,
}

impl ProgramCursor {
    pub fn at(position: usize) -> Self {
        ProgramCursor { position }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// The cursor for the rest of the program after the current instruction.
    #[must_use]
    pub fn next(self) -> Self {
        ProgramCursor {
            position: self.position + 1,
        }
    }

    pub fn is_exhausted(&self, program: &Program) -> bool {
        self.position >= program.len()
    }
}

/// A validated Brainfuck program. Holds only commands from the alphabet, and every
/// `[` is closed by a later `]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Lex and validate a program from a reader. Line terminators separate lines;
    /// every other character has to be one of the eight commands.
    pub fn new<R: Read>(reader: R) -> Result<Self, ProgramError> {
        let instructions = Self::read_data(reader)?;
        Self::validated(instructions)
    }

    /// Build a program from an already tokenized command sequence.
    pub fn from_commands<I>(commands: I) -> Result<Self, ProgramError>
    where
        I: IntoIterator<Item = Command>,
    {
        let instructions = commands
            .into_iter()
            .enumerate()
            .map(|(index, command)| Instruction::new(command, 0, index, index))
            .collect();
        Self::validated(instructions)
    }

    fn validated(instructions: Vec<Instruction>) -> Result<Self, ProgramError> {
        check_loops(&instructions).inspect_err(|err| log::error!("{}", err))?;
        Ok(Program { instructions })
    }

    // Lexes bytes rather than text so that a program which is not valid UTF-8 still
    // gets a located error. Every command is ASCII, so columns agree either way.
    fn read_data<R: Read>(reader: R) -> Result<Vec<Instruction>, ProgramError> {
        let mut buffread = BufReader::new(reader);
        let mut vec = Vec::new();
        let mut line = Vec::new();

        let mut index = 0;
        let mut line_idx = 0;
        while buffread.read_until(b'\n', &mut line)? > 0 {
            let content = line
                .strip_suffix(b"\n")
                .map(|rest| rest.strip_suffix(b"\r").unwrap_or(rest))
                .unwrap_or(line.as_slice());

            for (col_idx, &byte) in content.iter().enumerate() {
                let command = Command::from_char(byte as char).ok_or_else(|| {
                    let err = ProgramError::InvalidCommand {
                        character: offending_char(&content[col_idx..]),
                        line: line_idx + 1,
                        column: col_idx + 1,
                    };
                    log::error!("{}", err);
                    err
                })?;
                vec.push(Instruction::new(command, line_idx, col_idx, index));
                index += 1;
            }

            line.clear();
            line_idx += 1;
        }

        Ok(vec)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// A cursor at the first instruction.
    pub fn cursor(&self) -> ProgramCursor {
        ProgramCursor::default()
    }

    /// The head instruction of the program remaining at `cursor`.
    pub fn instruction_at(&self, cursor: ProgramCursor) -> Option<&Instruction> {
        self.instructions.get(cursor.position)
    }

    /// Everything left to run from `cursor`, empty once exhausted.
    pub fn remaining(&self, cursor: ProgramCursor) -> &[Instruction] {
        self.instructions.get(cursor.position..).unwrap_or(&[])
    }
}

impl FromStr for Program {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Program::new(s.as_bytes())
    }
}

// The character starting at the front of `bytes`, or U+FFFD if it isn't valid UTF-8.
fn offending_char(bytes: &[u8]) -> char {
    String::from_utf8_lossy(&bytes[..bytes.len().min(4)])
        .chars()
        .next()
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

// Only counts nesting. Nothing is recorded about which brackets pair up, the
// interpreter finds its way back through saved continuations instead.
fn check_loops(instructions: &[Instruction]) -> Result<(), LoopError> {
    let mut open_brackets: Vec<&Instruction> = Vec::new();

    for instruction in instructions {
        match instruction.command() {
            Command::LoopStart => open_brackets.push(instruction),
            Command::LoopEnd => {
                if open_brackets.pop().is_none() {
                    return Err(LoopError::UnmatchedClose {
                        line: instruction.line(),
                        column: instruction.column(),
                    });
                }
            }
            _ => {}
        }
    }

    match open_brackets.pop() {
        Some(unclosed) => Err(LoopError::UnclosedOpen {
            line: unclosed.line(),
            column: unclosed.column(),
        }),
        None => Ok(()),
    }
}
