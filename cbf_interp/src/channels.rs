use std::fmt;

/// How `,` treats the input it has been given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Every read returns the first input byte for the whole run, 0 if there is none.
    #[default]
    Sticky,
    /// Each read takes the next byte, 0 once the input is exhausted.
    Consume,
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Sticky => write!(f, "sticky"),
            InputMode::Consume => write!(f, "consume"),
        }
    }
}

/// Input supplied as a whole before the run starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputChannel {
    bytes: Vec<u8>,
    position: usize,
    mode: InputMode,
}

impl InputChannel {
    pub fn new(bytes: impl Into<Vec<u8>>, mode: InputMode) -> Self {
        InputChannel {
            bytes: bytes.into(),
            position: 0,
            mode,
        }
    }

    /// The head of the remaining input, or 0 once there is none.
    pub fn read_head(&mut self) -> u8 {
        let byte = self.bytes.get(self.position).copied().unwrap_or(0);
        if self.mode == InputMode::Consume && self.position < self.bytes.len() {
            self.position += 1;
        }
        byte
    }

    pub fn remaining(&self) -> &[u8] {
        &self.bytes[self.position..]
    }
}

/// Append-only record of every byte written by `.`, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputChannel {
    bytes: Vec<u8>,
}

impl OutputChannel {
    pub fn new() -> Self {
        OutputChannel { bytes: Vec::new() }
    }

    pub fn emit(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
