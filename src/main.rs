use cbf_interp::{BrainfuckVM, VMBuilder};
use cbf_types::{Command, Program, VMStateFinal};
use clap::Parser;
use cli::Cli;
use log::LevelFilter;
use std::{
    error::Error,
    fs::{self, File},
    io::{self, BufReader, Read, Write},
};

mod cli;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Entry point for the Brainfuck interpreter program.
///
/// Loads and validates the program named on the command line, gathers its whole input
/// up front, runs it and writes the collected output to stdout.
///
/// # Errors
///
/// Returns an error if the program file can't be read, holds anything other than the
/// eight commands, has unbalanced loops, or runs past the optional step limit.
///
/// # Examples
///
/// Run the program from the command line with:
/// ```bash
/// cargo run -- example.bf --input-string "abc" --consume-input
/// ```
fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let program = Program::new(BufReader::new(File::open(&cli.program)?))?;
    log::info!(
        "Loaded {} instructions from {}",
        program.len(),
        cli.program.display()
    );
    let input = read_input(&cli, &program)?;

    let mut vm: BrainfuckVM<u8> = VMBuilder::new()
        .set_program(program)
        .set_input_bytes(input)
        .set_input_mode(cli.input_mode())
        .set_loop_entry(cli.loop_entry())
        .set_step_limit(cli.step_limit)
        .build()?;
    let final_state = run_and_write(&mut vm, &mut io::stdout().lock())?;

    if cli.report_state {
        eprintln!("{}", final_state);
    }

    Ok(())
}

// Output produced before a failure, such as running past the step limit, is still written
fn run_and_write<W: Write>(
    vm: &mut BrainfuckVM<u8>,
    writer: &mut W,
) -> Result<VMStateFinal<u8>> {
    let result = vm.interpret();
    writer.write_all(vm.output())?;
    writer.flush()?;
    Ok(result?)
}

// RUST_LOG still applies, -v only raises the level
fn setup_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Info);
        }
        2 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.init();
}

fn read_input(cli: &Cli, program: &Program) -> Result<Vec<u8>> {
    if let Some(path) = &cli.input {
        return Ok(fs::read(path)?);
    }
    if let Some(text) = &cli.input_string {
        return Ok(text.as_bytes().to_vec());
    }

    let reads_input = program
        .instructions()
        .iter()
        .any(|instruction| instruction.command() == Command::Input);
    if !reads_input {
        return Ok(Vec::new());
    }

    let mut input = Vec::new();
    io::stdin().lock().read_to_end(&mut input)?;
    Ok(input)
}
