use crate::cellkind::CellKind;
use crate::instructions::Command;
use core::fmt;

// Extends VMState with the visited part of the tape at the end of program execution,
// providing a complete picture of the final program state
#[derive(PartialEq, Debug, Clone)]
pub struct VMStateFinal<N>
where
    N: CellKind,
{
    state: VMState<N>,
    leftmost: isize,
    tape: Vec<N>,
}

impl<N> VMStateFinal<N>
where
    N: CellKind,
{
    /// `tape` holds every visited cell in order, the first of them at position `leftmost`.
    pub fn new(state: VMState<N>, leftmost: isize, tape: Vec<N>) -> Self {
        VMStateFinal {
            state,
            leftmost,
            tape,
        }
    }

    pub fn state(&self) -> &VMState<N> {
        &self.state
    }

    pub fn leftmost(&self) -> isize {
        self.leftmost
    }

    pub fn tape(&self) -> &[N] {
        &self.tape
    }

    /// Value of the cell at `position`, zero if it was never visited.
    pub fn cell(&self, position: isize) -> N {
        usize::try_from(position - self.leftmost)
            .ok()
            .and_then(|offset| self.tape.get(offset))
            .copied()
            .unwrap_or_default()
    }
}

impl<N> fmt::Display for VMStateFinal<N>
where
    N: CellKind,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let non_zero_cells_str = self
            .tape
            .iter()
            .zip(self.leftmost..)
            .filter(|(value, _)| !value.is_zero())
            .map(|(value, position)| format!("[{}, {}]", position, value))
            .collect::<Vec<String>>()
            .join(",");

        write!(f, "{}\nTape:\n{}", self.state, non_zero_cells_str)
    }
}

// Represents the state of the VM at a specific point in execution, useful for debugging or state inspection
#[derive(Debug, PartialEq, Default, Clone)]
pub struct VMState<N>
where
    N: CellKind,
{
    cell_value: N,
    head: isize,
    instruction_index: usize,
    last_command: Option<Command>,
    loop_depth: usize,
    instructions_processed: usize,
}

impl<N> VMState<N>
where
    N: CellKind,
{
    pub fn new(
        cell_value: N,
        head: isize,
        instruction_index: usize,
        last_command: Option<Command>,
        loop_depth: usize,
        instructions_processed: usize,
    ) -> Self {
        VMState {
            cell_value,
            head,
            instruction_index,
            last_command,
            loop_depth,
            instructions_processed,
        }
    }

    pub fn cell_value(&self) -> N {
        self.cell_value
    }

    /// Pointer position relative to where the run started.
    pub fn head(&self) -> isize {
        self.head
    }

    /// Index of the next instruction to run.
    pub fn instruction_index(&self) -> usize {
        self.instruction_index
    }

    pub fn last_command(&self) -> Option<Command> {
        self.last_command
    }

    pub fn loop_depth(&self) -> usize {
        self.loop_depth
    }

    pub fn instructions_processed(&self) -> usize {
        self.instructions_processed
    }
}

impl<N> fmt::Display for VMState<N>
where
    N: CellKind,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self
            .last_command
            .map_or_else(|| "None".to_string(), |command| command.to_string());
        write!(
            f,
            "Cell value: {}\nHead: {}\nNext instruction index: {}\nLast command: {}\nLoop depth: {}\nInstructions processed: {}",
            self.cell_value,
            self.head,
            self.instruction_index,
            last,
            self.loop_depth,
            self.instructions_processed
        )
    }
}
