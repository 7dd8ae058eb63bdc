//! # Continuation-stack Brainfuck interpreter
//!
//! Runs validated Brainfuck programs on a tape that is unbounded in both directions.
//! Loops are driven by a stack of saved continuations rather than a table of matching
//! brackets: `[` remembers where its body starts, and `]` either resumes there or
//! drops the saved position and carries on.
//!
//! Input is supplied as a whole before the run and output is collected in memory.
//!
//! ```rust
//! let output = cbf_interp::run("++++++++[>++++++++<-]>.", &[]).expect("valid program");
//! assert_eq!(output, vec![64]);
//! ```

pub mod channels;
pub mod loop_stack;
pub mod tape;
pub mod vm;
pub mod vm_builder;
pub mod vm_error;
pub mod vm_iterator;

pub use channels::{InputChannel, InputMode, OutputChannel};
pub use loop_stack::LoopStack;
pub use tape::Tape;
pub use vm::{BrainfuckVM, LoopEntry};
pub use vm_builder::VMBuilder;
pub use vm_error::VMError;
pub use vm_iterator::VMIterator;

use cbf_types::Program;

/// Lexes, validates and runs `program` with default options, returning everything it wrote.
///
/// # Errors
///
/// Fails with [`VMError::Program`] if the text holds anything other than the eight
/// commands or its loops are unbalanced. Nothing is executed in that case.
pub fn run(program: &str, input: &[u8]) -> Result<Vec<u8>, VMError> {
    let program: Program = program.parse()?;
    run_program(&program, input)
}

/// Runs an already validated program with default options.
pub fn run_program(program: &Program, input: &[u8]) -> Result<Vec<u8>, VMError> {
    let mut vm: BrainfuckVM<u8> = VMBuilder::new()
        .set_program(program.clone())
        .set_input_bytes(input)
        .build()?;
    vm.interpret()?;
    Ok(vm.into_output())
}
