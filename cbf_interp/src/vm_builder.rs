//! Provides a builder for creating instances of the BrainfuckVM struct.
use crate::{
    channels::{InputChannel, InputMode},
    vm::{BrainfuckVM, LoopEntry},
    vm_error::VMError,
};
use cbf_types::{CellKind, Program};
use std::{
    fs::File,
    io::{BufReader, Read},
    num::NonZeroUsize,
    path::PathBuf,
};

/// Main builder object. Creates a BrainfuckVM according to various configs.
///
/// # Examples
///
/// Program from a string
///
/// ```rust
/// use cbf_interp::{BrainfuckVM, VMBuilder};
///
/// let program_string = "++++++++[>++++++++<-]>.";
///
/// let mut vm: BrainfuckVM<u8> = VMBuilder::new()
///     .set_program_reader(program_string.as_bytes())
///     .build()
///     .expect("Failed!");
/// vm.interpret().expect("Failed!");
/// assert_eq!(vm.output(), &[64]);
/// ```
///
/// Setting more interesting parameters
///
/// ```rust
/// use cbf_interp::{BrainfuckVM, InputMode, LoopEntry, VMBuilder};
/// # use core::num::NonZeroUsize;
///
/// let mut vm: BrainfuckVM<u8> = VMBuilder::new()
///     .set_program_reader(",.,.".as_bytes())
///     .set_input_bytes(*b"AB")
///     .set_input_mode(InputMode::Consume)
///     .set_loop_entry(LoopEntry::AlwaysEnter)
///     .set_step_limit(NonZeroUsize::new(1000))
///     .build()
///     .expect("Failed!");
/// vm.interpret().expect("Failed!");
/// assert_eq!(vm.output(), b"AB");
/// ```
#[derive(Default)]
pub struct VMBuilder<'a> {
    program: Option<Program>,
    program_file: Option<PathBuf>,
    program_reader: Option<Box<dyn Read + 'a>>,
    input_reader: Option<Box<dyn Read + 'a>>,
    input_bytes: Option<Vec<u8>>,
    input_mode: Option<InputMode>,
    loop_entry: Option<LoopEntry>,
    step_limit: Option<NonZeroUsize>,
}

impl<'a> VMBuilder<'a> {
    /// Creates a new instance of `VMBuilder`.
    pub fn new() -> Self {
        VMBuilder {
            program: None,
            program_file: None,
            program_reader: None,
            input_reader: None,
            input_bytes: None,
            input_mode: None,
            loop_entry: None,
            step_limit: None,
        }
    }

    /// Uses an already validated program.
    pub fn set_program(mut self, program: Program) -> Self {
        self.program = Some(program);
        self
    }

    /// Sets a file path to read the Brainfuck program from
    pub fn set_program_file(mut self, filepath: PathBuf) -> Self {
        self.program_file = Some(filepath);
        self
    }

    /// Loads a Brainfuck program from a reader.
    pub fn set_program_reader<T>(mut self, reader: T) -> Self
    where
        T: Read + 'a,
    {
        self.program_reader = Some(Box::new(reader));
        self
    }

    /// Reads the whole input from `input` when the VM is built.
    pub fn set_input<T>(mut self, input: T) -> Self
    where
        T: Read + 'a,
    {
        self.input_reader = Some(Box::new(input));
        self
    }

    /// Supplies the input bytes directly. Takes precedence over `set_input`.
    pub fn set_input_bytes(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.input_bytes = Some(input.into());
        self
    }

    pub fn set_input_mode(mut self, input_mode: InputMode) -> Self {
        self.input_mode = Some(input_mode);
        self
    }

    pub fn set_loop_entry(mut self, loop_entry: LoopEntry) -> Self {
        self.loop_entry = Some(loop_entry);
        self
    }

    /// Caps the number of instructions a run may execute. `None` means no cap.
    pub fn set_step_limit(mut self, step_limit: Option<NonZeroUsize>) -> Self {
        self.step_limit = step_limit;
        self
    }

    /// Builds and returns a `BrainfuckVM` instance based on the configured options.
    pub fn build<N>(self) -> Result<BrainfuckVM<N>, VMError>
    where
        N: CellKind,
    {
        // Prefer an already built program, then a reader, then a file
        let program = match (self.program, self.program_reader, self.program_file) {
            (Some(program), _, _) => program,
            (None, Some(reader), _) => Program::new(reader)?,
            (None, None, Some(program_file)) => {
                let file = File::open(&program_file).map_err(|err| VMError::Builder {
                    reason: format!(
                        "Failed to open program file {}: {}",
                        program_file.display(),
                        err
                    ),
                })?;
                Program::new(BufReader::new(file))?
            }
            (None, None, None) => {
                return Err(VMError::Builder {
                    reason: "Program must be set by using set_program, set_program_reader or set_program_file"
                        .to_string(),
                })
            }
        };

        let bytes = match (self.input_bytes, self.input_reader) {
            (Some(bytes), _) => bytes,
            (None, Some(mut reader)) => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                bytes
            }
            (None, None) => {
                log::info!("Using empty input");
                Vec::new()
            }
        };

        let input_mode = self.input_mode.unwrap_or_else(|| {
            log::info!("Using default input mode {}", InputMode::default());
            InputMode::default()
        });

        let loop_entry = self.loop_entry.unwrap_or_else(|| {
            log::info!("Using default loop entry {}", LoopEntry::default());
            LoopEntry::default()
        });

        if self.step_limit.is_none() {
            log::info!("No step limit, the program runs until it ends");
        }

        Ok(BrainfuckVM::new(
            program,
            InputChannel::new(bytes, input_mode),
            loop_entry,
            self.step_limit,
        ))
    }
}
