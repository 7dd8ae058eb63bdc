use std::io::{self, Read, Seek, SeekFrom, Write};
use tempfile::NamedTempFile;

const TEST_FILE_CONTENT: &str = "+[-[<<[+[--->]-[<<<]]]>>>-]";
// writeln! does add an extra newline character at the end, but line terminators
// are not program content so only the commands are counted
pub const TEST_FILE_NUM_INSTRUCTIONS: usize = TEST_FILE_CONTENT.len();

/// Prints "Hello World!" by building each character in a scratch cell with a counted loop.
pub const HELLO_WORLD: &str = ">++++++++[<+++++++++>-]<.>>++++++++++[<++++++++++>-]<+.>>+++++++++[<++++++++++++>-]<.>>+++++++++[<++++++++++++>-]<.>>++++++++++[<+++++++++++>-]<+.>>++++[<++++++++>-]<.>>+++++++++++[<++++++++>-]<-.>>++++++++++[<+++++++++++>-]<+.>>++++++++++[<++++++++++++>-]<------.>>+++++++++[<++++++++++++>-]<.>>++++++++++[<++++++++++>-]<.>>++++++[<++++++>-]<---.";
pub const HELLO_WORLD_OUTPUT: &[u8] = b"Hello World!";

/// Small programs paired with the output they must produce on empty input.
pub const CONFORMANCE_PROGRAMS: &[(&str, &[u8])] = &[
    ("", b""),
    ("[.]", b""),
    ("++++++++[>++++++++<-]>.", &[64]),
    ("-.", &[255]),
    ("++[>++[>+++<-]<-]>>.", &[12]),
    (">+<<+>>.<<.>.", &[1, 1, 0]),
    (HELLO_WORLD, HELLO_WORLD_OUTPUT),
];

/// A temporary file holding a program with deeply nested loops.
pub struct TestFile {
    file: NamedTempFile,
}

impl TestFile {
    pub fn new() -> io::Result<Self> {
        Self::with_content(TEST_FILE_CONTENT)
    }

    pub fn with_content(content: &str) -> io::Result<Self> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "{}", content)?;

        // Seek to the start of the file after writing
        file.seek(SeekFrom::Start(0))?;
        Ok(TestFile { file })
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }
}

impl Read for TestFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // Need to borrow it mutably to perform reads
        self.file.as_file_mut().read(buf)
    }
}
