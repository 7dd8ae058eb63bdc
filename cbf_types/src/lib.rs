//! # Brainfuck Program Representation and State Snapshots
//!
//! Provides the data model shared by the continuation-stack interpreter and its
//! hosts: the eight-symbol command alphabet, validated programs and cursors into
//! them, the cell abstraction used by the tape, and snapshots of machine state.
//!
//! For more detailed examples and usage instructions, please refer to the documentation
//! of each module.

// Defines the types of cells used in a Brainfuck program's execution tape.
pub mod cellkind;

// Handles the lexing and representation of Brainfuck commands.
pub mod instructions;

// Validated programs, cursors into them and validation errors.
pub mod program;

// Snapshots of the virtual machine during and after execution.
pub mod state;

pub use cellkind::CellKind;
pub use instructions::{Command, Instruction};
pub use program::{LoopError, Program, ProgramCursor, ProgramError};
pub use state::{VMState, VMStateFinal};
