use core::fmt;

/// The eight commands a program is made of
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Command {
    MoveRight, // >
    MoveLeft,  // <
    Increment, // +
    Decrement, // -
    Output,    // .
    Input,     // ,
    LoopStart, // [
    LoopEnd,   // ]
}

impl Command {
    /// All commands, in the order of the alphabet `><+-.,[]`.
    pub const ALL: [Command; 8] = [
        Command::MoveRight,
        Command::MoveLeft,
        Command::Increment,
        Command::Decrement,
        Command::Output,
        Command::Input,
        Command::LoopStart,
        Command::LoopEnd,
    ];

    /// Lex a single character. Anything outside the alphabet is `None`.
    pub fn from_char(c: char) -> Option<Command> {
        match c {
            '>' => Some(Command::MoveRight),
            '<' => Some(Command::MoveLeft),
            '+' => Some(Command::Increment),
            '-' => Some(Command::Decrement),
            '.' => Some(Command::Output),
            ',' => Some(Command::Input),
            '[' => Some(Command::LoopStart),
            ']' => Some(Command::LoopEnd),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Command::MoveRight => '>',
            Command::MoveLeft => '<',
            Command::Increment => '+',
            Command::Decrement => '-',
            Command::Output => '.',
            Command::Input => ',',
            Command::LoopStart => '[',
            Command::LoopEnd => ']',
        }
    }
}

impl TryFrom<char> for Command {
    type Error = char;

    /// Fails with the offending character.
    fn try_from(c: char) -> Result<Self, Self::Error> {
        Command::from_char(c).ok_or(c)
    }
}

/// Corresponding display strings
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::MoveRight => "Move Right",
            Command::MoveLeft => "Move Left",
            Command::Increment => "Increment",
            Command::Decrement => "Decrement",
            Command::Output => "Output",
            Command::Input => "Input",
            Command::LoopStart => "Loop Start",
            Command::LoopEnd => "Loop End",
        };
        write!(f, "{} ({})", name, self.as_char())
    }
}

/// A command together with where it was found: 1-based line and column in the
/// source text and its 0-based index in the program.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Instruction {
    command: Command,
    line: usize,
    column: usize,
    index: usize,
}

impl Instruction {
    /// `line` and `column` are 0-based here and stored 1-based.
    pub(crate) fn new(command: Command, line: usize, column: usize, index: usize) -> Self {
        Instruction {
            command,
            line: line + 1,
            column: column + 1,
            index,
        }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Nice display strings
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.line, self.column, self.command)
    }
}
