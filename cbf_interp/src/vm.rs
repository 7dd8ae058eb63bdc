use crate::{
    channels::{InputChannel, OutputChannel},
    loop_stack::LoopStack,
    tape::Tape,
    vm_error::VMError,
    vm_iterator::VMIterator,
};
use cbf_types::{CellKind, Command, Instruction, Program, ProgramCursor, VMState, VMStateFinal};
use std::{fmt, num::NonZeroUsize};

/// What `[` does when the current cell is already zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopEntry {
    /// The body is traversed without effect and left at its `]`.
    #[default]
    SkipIfZero,
    /// The body always runs at least once; only `]` tests the cell.
    AlwaysEnter,
}

impl fmt::Display for LoopEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopEntry::SkipIfZero => write!(f, "skip if zero"),
            LoopEntry::AlwaysEnter => write!(f, "always enter"),
        }
    }
}

// Represents the VM capable of interpreting Brainfuck programs. Loops are run from a stack
// of saved continuations: `[` saves the cursor just past itself, a non-zero `]` resumes the
// innermost saved cursor and a zero `]` discards it and falls through. Brackets are never
// matched up ahead of time.
pub struct BrainfuckVM<N = u8>
where
    N: CellKind,
{
    program: Program,
    cursor: ProgramCursor,
    tape: Tape<N>,
    loop_stack: LoopStack,
    input: InputChannel,
    output: OutputChannel,
    loop_entry: LoopEntry,
    step_limit: Option<NonZeroUsize>,
    // Loop stack depth of a loop entered on a zero cell. Its body has no effect until
    // the stack drops below this depth again.
    skipping_from: Option<usize>,
    last_command: Option<Command>,
    instructions_processed: usize,
}

impl<N> BrainfuckVM<N>
where
    N: CellKind,
{
    // Constructs a new VM instance with specified settings
    pub fn new(
        program: Program,
        input: InputChannel,
        loop_entry: LoopEntry,
        step_limit: Option<NonZeroUsize>,
    ) -> Self {
        BrainfuckVM {
            cursor: program.cursor(),
            program,
            tape: Tape::new(),
            loop_stack: LoopStack::new(),
            input,
            output: OutputChannel::new(),
            loop_entry,
            step_limit,
            skipping_from: None,
            last_command: None,
            instructions_processed: 0,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn tape(&self) -> &Tape<N> {
        &self.tape
    }

    pub fn output(&self) -> &[u8] {
        self.output.as_bytes()
    }

    pub fn into_output(self) -> Vec<u8> {
        self.output.into_bytes()
    }

    pub fn loop_depth(&self) -> usize {
        self.loop_stack.depth()
    }

    pub fn instructions_processed(&self) -> usize {
        self.instructions_processed
    }

    /// True once the cursor has run off the end of the program.
    pub fn is_finished(&self) -> bool {
        self.cursor.is_exhausted(&self.program)
    }

    /// The instructions not yet run.
    pub fn remaining(&self) -> &[Instruction] {
        self.program.remaining(self.cursor)
    }

    pub fn state(&self) -> VMState<N> {
        VMState::new(
            self.tape.read_current(),
            self.tape.position(),
            self.cursor.position(),
            self.last_command,
            self.loop_stack.depth(),
            self.instructions_processed,
        )
    }

    pub fn final_state(&self) -> VMStateFinal<N> {
        let (leftmost, cells) = self.tape.cells();
        VMStateFinal::new(self.state(), leftmost, cells)
    }

    // Applies one instruction and returns the cursor to continue from
    fn process_instruction(&mut self, instruction: Instruction) -> Result<ProgramCursor, VMError> {
        if self.skipping_from.is_some() {
            return self.skip_instruction(instruction);
        }

        // Most of the time we just continue with the rest of the program. Only `]` may resume elsewhere.
        let next = self.cursor.next();
        match instruction.command() {
            Command::MoveRight => self.tape.move_right(),
            Command::MoveLeft => self.tape.move_left(),
            Command::Increment => self.tape.increment(),
            Command::Decrement => self.tape.decrement(),
            Command::Output => self.output.emit(self.tape.read_current().to_byte()),
            Command::Input => {
                let byte = self.input.read_head();
                self.tape.write_current(N::from_byte(byte));
            }
            Command::LoopStart => {
                self.loop_stack.push(next);
                if self.loop_entry == LoopEntry::SkipIfZero && self.tape.read_current().is_zero() {
                    log::debug!("Skipping loop body after {}", instruction);
                    self.skipping_from = Some(self.loop_stack.depth());
                }
            }
            Command::LoopEnd => return self.close_loop(instruction, next),
        }
        Ok(next)
    }

    fn close_loop(
        &mut self,
        instruction: Instruction,
        next: ProgramCursor,
    ) -> Result<ProgramCursor, VMError> {
        if self.tape.read_current().is_zero() {
            self.loop_stack
                .pop()
                .ok_or(VMError::LoopStackEmpty { instruction })?;
            Ok(next)
        } else {
            // Leave the continuation in place, it is needed again on the next pass
            let resume = self
                .loop_stack
                .peek()
                .ok_or(VMError::LoopStackEmpty { instruction })?;
            log::debug!("Jumping back to {}", resume.position());
            Ok(resume)
        }
    }

    // Inside a skipped body only the nesting is tracked, so the body's own `]` is found
    // through the stack exactly like a loop exit
    fn skip_instruction(&mut self, instruction: Instruction) -> Result<ProgramCursor, VMError> {
        match instruction.command() {
            Command::LoopStart => self.loop_stack.push(self.cursor.next()),
            Command::LoopEnd => {
                self.loop_stack
                    .pop()
                    .ok_or(VMError::LoopStackEmpty { instruction })?;
                if self
                    .skipping_from
                    .is_some_and(|depth| self.loop_stack.depth() < depth)
                {
                    log::debug!("Leaving skipped loop at {}", instruction);
                    self.skipping_from = None;
                }
            }
            _ => {}
        }
        Ok(self.cursor.next())
    }

    /// Executes a single instruction. Returns the state after it, or `None` once the
    /// program has no instructions left.
    pub fn interpret_step(&mut self) -> Result<Option<VMState<N>>, VMError> {
        let Some(&instruction) = self.program.instruction_at(self.cursor) else {
            return Ok(None);
        };

        if let Some(limit) = self.step_limit {
            if self.instructions_processed >= limit.get() {
                log::warn!("Step limit of {} reached at {}", limit, instruction);
                return Err(VMError::StepLimitExceeded { limit });
            }
        }

        log::debug!("Processing instruction: {}", instruction);
        self.cursor = self.process_instruction(instruction)?;
        self.last_command = Some(instruction.command());
        self.instructions_processed += 1;

        Ok(Some(self.state()))
    }

    /// Fails if the program ran out while loops were still open.
    pub(crate) fn check_finished(&self) -> Result<(), VMError> {
        if self.loop_stack.is_empty() {
            Ok(())
        } else {
            Err(VMError::LoopsLeftOpen {
                depth: self.loop_stack.depth(),
            })
        }
    }

    /// Runs the entire program to completion or until an error occurs.
    pub fn interpret(&mut self) -> Result<VMStateFinal<N>, VMError> {
        while !self.is_finished() {
            self.interpret_step()?;
        }
        self.check_finished()?;

        log::info!(
            "Program finished after {} instructions, {} byte(s) of output",
            self.instructions_processed,
            self.output.len()
        );
        Ok(self.final_state())
    }

    /// Returns an iterator that allows stepping through the program execution.
    pub fn iter(&mut self) -> VMIterator<'_, N> {
        VMIterator::new(self)
    }
}

#[cfg(test)]
mod vm_tests {
    use super::*;
    use crate::{channels::InputMode, vm_builder::VMBuilder};
    use cbf_test_utils::TestFile;
    use log::LevelFilter;
    use rand::Rng;

    // Setup logging for any tests that it might be useful for
    pub fn setup_logging() {
        // Just use Debug level for tests
        let test_log_level = LevelFilter::Debug;
        let _ = env_logger::builder()
            .is_test(true)
            .filter(None, test_log_level)
            .try_init();
    }

    // Helper function to setup a test u8 VM with a program from a string and default options
    pub fn setup_vm_from_string(program_string: &str) -> Result<BrainfuckVM<u8>, VMError> {
        VMBuilder::new()
            .set_program_reader(program_string.as_bytes())
            .build()
    }

    // Helper function to ensure a VM has run and the final state is as expected
    pub fn ensure_vm_final_state<N>(mut vm: BrainfuckVM<N>, expected_state: VMState<N>) -> bool
    where
        N: CellKind,
    {
        // Move one more step, should reach end of program and the state should equal expected_state
        match vm.interpret_step() {
            Ok(None) => vm.state() == expected_state,
            Ok(Some(_)) => false,
            Err(_) => false,
        }
    }

    #[test]
    fn test_vm_initialization() -> Result<(), Box<dyn std::error::Error>> {
        let vm: BrainfuckVM<u8> = VMBuilder::new()
            .set_program_reader(TestFile::new()?)
            .build()?;
        assert_eq!(vm.tape().read_current(), 0);
        assert_eq!(vm.tape().position(), 0);
        assert_eq!(vm.loop_depth(), 0);
        assert_eq!(vm.instructions_processed(), 0);
        assert_eq!(vm.remaining().len(), vm.program().len());
        assert!(vm.output().is_empty());

        Ok(())
    }

    #[test]
    fn test_move_head_both_ways() -> Result<(), Box<dyn std::error::Error>> {
        let half_way = 5;
        let program_string = format!("{}{}", ">".repeat(half_way), "<".repeat(half_way * 2));
        let mut vm = setup_vm_from_string(&program_string)?;

        for step in 1..=half_way {
            let state = vm.interpret_step()?.ok_or("Program ended early")?;
            assert_eq!(state.last_command(), Some(Command::MoveRight));
            assert_eq!(state.head(), step as isize);
        }
        // No lower bound, the tape reaches past the starting cell
        for step in 1..=half_way * 2 {
            let state = vm.interpret_step()?.ok_or("Program ended early")?;
            assert_eq!(state.last_command(), Some(Command::MoveLeft));
            assert_eq!(state.head(), half_way as isize - step as isize);
        }

        let expected_final_state = VMState::<u8>::new(
            0,
            -(half_way as isize),
            3 * half_way,
            Some(Command::MoveLeft),
            0,
            3 * half_way,
        );
        assert!(ensure_vm_final_state(vm, expected_final_state));
        Ok(())
    }

    #[test]
    fn test_increment_decrement_success() -> Result<(), Box<dyn std::error::Error>> {
        let max_cell_value = u8::MAX as usize;
        let program_string = format!("{}{}", "+".repeat(max_cell_value), "-".repeat(max_cell_value));
        let mut vm = setup_vm_from_string(&program_string)?;

        for step in 1..=max_cell_value {
            let state = vm.interpret_step()?.ok_or("Program ended early")?;
            assert_eq!(state.last_command(), Some(Command::Increment));
            assert_eq!(state.cell_value() as usize, step);
        }
        for step in 1..=max_cell_value {
            let state = vm.interpret_step()?.ok_or("Program ended early")?;
            assert_eq!(state.last_command(), Some(Command::Decrement));
            assert_eq!(state.cell_value() as usize, max_cell_value - step);
        }

        let expected_final_state = VMState::<u8>::new(
            0,
            0,
            max_cell_value * 2,
            Some(Command::Decrement),
            0,
            max_cell_value * 2,
        );
        assert!(ensure_vm_final_state(vm, expected_final_state));
        Ok(())
    }

    #[test]
    fn test_decrement_cell_wrapping() -> Result<(), Box<dyn std::error::Error>> {
        let mut vm = setup_vm_from_string("-")?;
        let state = vm.interpret_step()?.ok_or("Program ended early")?;
        assert_eq!(state.cell_value(), 255);
        Ok(())
    }

    #[test]
    fn test_increment_cell_wrapping() -> Result<(), Box<dyn std::error::Error>> {
        let number_of_instructions = u8::MAX as usize + 1;
        let program_string = "+".repeat(number_of_instructions);
        let mut vm = setup_vm_from_string(&program_string)?;
        vm.interpret()?;
        let expected_final_state = VMState::<u8>::new(
            0,
            0,
            number_of_instructions,
            Some(Command::Increment),
            0,
            number_of_instructions,
        );
        assert!(ensure_vm_final_state(vm, expected_final_state));
        Ok(())
    }

    #[test]
    fn test_end_of_program() -> Result<(), Box<dyn std::error::Error>> {
        // Don't use any loops here, easier to define the end
        let program_string = "++-->+<--";
        let number_of_instructions = program_string.len();
        let mut vm = setup_vm_from_string(program_string)?;
        let final_state = vm.interpret()?;

        assert_eq!(final_state.cell(0), 254);
        assert_eq!(final_state.cell(1), 1);
        assert_eq!(final_state.leftmost(), 0);

        let expected_final_state = VMState::<u8>::new(
            254,
            0,
            number_of_instructions,
            Some(Command::Decrement),
            0,
            number_of_instructions,
        );
        assert!(ensure_vm_final_state(vm, expected_final_state));

        Ok(())
    }

    #[test]
    fn test_consumed_input_success() -> Result<(), Box<dyn std::error::Error>> {
        setup_logging();

        let number_of_instructions = 10000;
        let program_string = ",".repeat(number_of_instructions);

        // Generate some random u8 values
        let mut rng = rand::thread_rng();
        let mut buffer = vec![0u8; number_of_instructions];
        rng.fill(&mut buffer[..]);

        let mut vm: BrainfuckVM<u8> = VMBuilder::new()
            .set_program_reader(program_string.as_bytes())
            .set_input(buffer.as_slice())
            .set_input_mode(InputMode::Consume)
            .build()?;

        for rng_value in buffer.iter().copied() {
            let state = vm.interpret_step()?.ok_or("Program ended early")?;
            assert_eq!(
                state.cell_value(),
                rng_value,
                "Cell value should match the read value"
            );
        }

        let expected_final_state = VMState::<u8>::new(
            buffer[number_of_instructions - 1],
            0,
            number_of_instructions,
            Some(Command::Input),
            0,
            number_of_instructions,
        );
        assert!(ensure_vm_final_state(vm, expected_final_state));

        Ok(())
    }

    #[test]
    fn test_sticky_input_reads_first_byte_every_time() -> Result<(), Box<dyn std::error::Error>> {
        let mut vm: BrainfuckVM<u8> = VMBuilder::new()
            .set_program_reader(",.>,.".as_bytes())
            .set_input_bytes(vec![65, 66])
            .build()?;
        vm.interpret()?;
        assert_eq!(vm.output(), &[65, 65]);
        Ok(())
    }

    #[test]
    fn test_input_exhaustion_reads_zero() -> Result<(), Box<dyn std::error::Error>> {
        let mut vm: BrainfuckVM<u8> = VMBuilder::new()
            .set_program_reader("+,.+,.".as_bytes())
            .set_input_bytes(vec![7])
            .set_input_mode(InputMode::Consume)
            .build()?;
        vm.interpret()?;
        assert_eq!(vm.output(), &[7, 0]);
        Ok(())
    }

    #[test]
    fn test_output_success() -> Result<(), Box<dyn std::error::Error>> {
        setup_logging();

        // Write random values into the tape from the input, then write them all back out
        let number_of_cells = 1000;
        let mut rng = rand::thread_rng();
        let mut buffer = vec![0u8; number_of_cells];
        rng.fill(&mut buffer[..]);

        let mut program_string = ",>".repeat(number_of_cells);
        program_string.push_str(&"<".repeat(number_of_cells));
        program_string.push_str(&".>".repeat(number_of_cells));

        let mut vm: BrainfuckVM<u8> = VMBuilder::new()
            .set_program_reader(program_string.as_bytes())
            .set_input_bytes(buffer.clone())
            .set_input_mode(InputMode::Consume)
            .build()?;
        let final_state = vm.interpret()?;

        assert_eq!(vm.output(), buffer.as_slice());
        assert_eq!(final_state.tape().len(), number_of_cells + 1);
        assert_eq!(final_state.state().head(), number_of_cells as isize);

        Ok(())
    }

    #[test]
    fn test_loop_resumes_after_saved_continuation() -> Result<(), Box<dyn std::error::Error>> {
        setup_logging();

        // Set the first cell to 2, then loop while the current cell's value is not zero
        let program_string = "++[-]";
        let mut vm = setup_vm_from_string(program_string)?;

        // First two steps increment the first cell, instruction_index goes up normally
        let mut state = vm.interpret_step()?.ok_or("Program ended early")?;
        assert_eq!(state.last_command(), Some(Command::Increment));
        state = vm.interpret_step()?.ok_or("Program ended early")?;
        assert_eq!(state.cell_value(), 2);
        assert_eq!(state.instruction_index(), 2);

        // The loop is entered and its continuation saved
        state = vm.interpret_step()?.ok_or("Program ended early")?;
        assert_eq!(state.last_command(), Some(Command::LoopStart));
        assert_eq!(state.instruction_index(), 3);
        assert_eq!(state.loop_depth(), 1);

        state = vm.interpret_step()?.ok_or("Program ended early")?;
        assert_eq!(state.last_command(), Some(Command::Decrement));
        assert_eq!(state.cell_value(), 1);
        assert_eq!(state.instruction_index(), 4);

        // Non-zero, so resume just after the `[` rather than at it
        state = vm.interpret_step()?.ok_or("Program ended early")?;
        assert_eq!(state.last_command(), Some(Command::LoopEnd));
        assert_eq!(state.instruction_index(), 3);
        assert_eq!(state.loop_depth(), 1);

        state = vm.interpret_step()?.ok_or("Program ended early")?;
        assert_eq!(state.last_command(), Some(Command::Decrement));
        assert_eq!(state.cell_value(), 0);

        // Now the cell value is 0, so the continuation is dropped and the loop is exited
        state = vm.interpret_step()?.ok_or("Program ended early")?;
        assert_eq!(state.last_command(), Some(Command::LoopEnd));
        assert_eq!(state.instruction_index(), 5);
        assert_eq!(state.loop_depth(), 0);

        let expected_final_state = VMState::<u8>::new(0, 0, 5, Some(Command::LoopEnd), 0, 7);
        assert!(ensure_vm_final_state(vm, expected_final_state));

        Ok(())
    }

    #[test]
    fn test_zero_loop_is_skipped() -> Result<(), Box<dyn std::error::Error>> {
        let mut vm = setup_vm_from_string("[.+]")?;
        let final_state = vm.interpret()?;
        assert!(vm.output().is_empty());
        assert_eq!(final_state.state().cell_value(), 0);
        // The body is still walked through to reach its `]`
        assert_eq!(vm.instructions_processed(), 4);
        Ok(())
    }

    #[test]
    fn test_skipped_loop_ignores_nested_loops() -> Result<(), Box<dyn std::error::Error>> {
        let mut vm = setup_vm_from_string("[[+]+].")?;
        vm.interpret()?;
        assert_eq!(vm.output(), &[0]);
        assert_eq!(vm.loop_depth(), 0);
        Ok(())
    }

    #[test]
    fn test_skipped_loop_inside_running_loop() -> Result<(), Box<dyn std::error::Error>> {
        let mut vm = setup_vm_from_string("+[>[+.]<-.]")?;
        vm.interpret()?;
        assert_eq!(vm.output(), &[0]);
        Ok(())
    }

    #[test]
    fn test_always_enter_runs_zero_loop_once() -> Result<(), Box<dyn std::error::Error>> {
        let mut vm: BrainfuckVM<u8> = VMBuilder::new()
            .set_program_reader("[.]".as_bytes())
            .set_loop_entry(LoopEntry::AlwaysEnter)
            .build()?;
        vm.interpret()?;
        assert_eq!(vm.output(), &[0]);
        assert_eq!(vm.loop_depth(), 0);
        Ok(())
    }

    #[test]
    fn test_nested_loops_count() -> Result<(), Box<dyn std::error::Error>> {
        for loop_entry in [LoopEntry::SkipIfZero, LoopEntry::AlwaysEnter] {
            let mut vm: BrainfuckVM<u8> = VMBuilder::new()
                .set_program_reader("+++[>++[>+++<-]<-]>>.".as_bytes())
                .set_loop_entry(loop_entry)
                .build()?;
            vm.interpret()?;
            assert_eq!(vm.output(), &[18], "with {}", loop_entry);
        }
        Ok(())
    }

    #[test]
    fn test_step_limit_stops_infinite_loop() -> Result<(), Box<dyn std::error::Error>> {
        let mut vm: BrainfuckVM<u8> = VMBuilder::new()
            .set_program_reader("+[]".as_bytes())
            .set_step_limit(NonZeroUsize::new(100))
            .build()?;
        match vm.interpret() {
            Err(VMError::StepLimitExceeded { limit }) => assert_eq!(limit.get(), 100),
            other => panic!("Expected step limit error, got {:?}", other.map(|_| ())),
        }
        assert_eq!(vm.instructions_processed(), 100);
        Ok(())
    }

    #[test]
    fn test_step_limit_allows_exact_budget() -> Result<(), Box<dyn std::error::Error>> {
        let mut vm: BrainfuckVM<u8> = VMBuilder::new()
            .set_program_reader("+++".as_bytes())
            .set_step_limit(NonZeroUsize::new(3))
            .build()?;
        let final_state = vm.interpret()?;
        assert_eq!(final_state.state().cell_value(), 3);
        Ok(())
    }

    #[test]
    fn test_is_finished_follows_the_cursor() -> Result<(), Box<dyn std::error::Error>> {
        let mut vm = setup_vm_from_string("+[-]")?;
        let mut steps = 0;
        while !vm.is_finished() {
            vm.interpret_step()?;
            steps += 1;
        }
        assert_eq!(steps, 4);
        assert!(vm.remaining().is_empty());
        assert!(vm.interpret_step()?.is_none());

        let vm = setup_vm_from_string("")?;
        assert!(vm.is_finished());
        Ok(())
    }

    #[test]
    fn test_iterator_yields_every_step() -> Result<(), Box<dyn std::error::Error>> {
        let mut vm = setup_vm_from_string("+[-]")?;
        let commands = vm
            .iter()
            .map(|state| state.map(|s| s.last_command()))
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(
            commands,
            vec![
                Some(Command::Increment),
                Some(Command::LoopStart),
                Some(Command::Decrement),
                Some(Command::LoopEnd),
            ]
        );
        Ok(())
    }
}
