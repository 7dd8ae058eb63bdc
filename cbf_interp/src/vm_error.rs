use cbf_types::{Instruction, ProgramError};
use std::{io, num::NonZeroUsize};
use thiserror::Error;

/// Everything that can stop a program from producing its output.
#[derive(Debug, Error)]
pub enum VMError {
    /// The program was refused before execution began.
    #[error(transparent)]
    Program(#[from] ProgramError),
    /// A `]` was reached with no saved continuation to resume or discard.
    #[error("unbalanced loop at {instruction}: no open loop to close")]
    LoopStackEmpty { instruction: Instruction },
    /// The program ran out of instructions inside a loop body.
    #[error("unbalanced loop: program ended with {depth} loop(s) still open")]
    LoopsLeftOpen { depth: usize },
    /// The opt-in step budget ran out before the program finished.
    #[error("step limit of {limit} instructions exceeded")]
    StepLimitExceeded { limit: NonZeroUsize },
    /// Errors occurring during the construction of the VM, typically due to misconfiguration
    #[error("builder error: {reason}")]
    Builder { reason: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl VMError {
    /// True for any loop structure fault, whether caught by validation or while running.
    pub fn is_unbalanced_loop(&self) -> bool {
        matches!(
            self,
            VMError::Program(ProgramError::UnbalancedLoop(_))
                | VMError::LoopStackEmpty { .. }
                | VMError::LoopsLeftOpen { .. }
        )
    }

    pub fn is_invalid_command(&self) -> bool {
        matches!(self, VMError::Program(ProgramError::InvalidCommand { .. }))
    }
}
