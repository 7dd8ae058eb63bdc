use cbf_types::CellKind;

/// A tape that is unbounded in both directions.
///
/// Only the current cell is held directly. Cells already visited on either side are
/// kept as two stacks whose tops are the neighbours of the current cell, so moving
/// the pointer is a pop from one side and a push onto the other. Cells never
/// visited are materialized as zero the first time the pointer reaches them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tape<N>
where
    N: CellKind,
{
    left: Vec<N>,
    current: N,
    right: Vec<N>,
    position: isize,
}

impl<N> Tape<N>
where
    N: CellKind,
{
    pub fn new() -> Self {
        Tape {
            left: Vec::new(),
            current: N::default(),
            right: Vec::new(),
            position: 0,
        }
    }

    pub fn move_right(&mut self) {
        self.left.push(self.current);
        self.current = self.right.pop().unwrap_or_default();
        self.position += 1;
    }

    pub fn move_left(&mut self) {
        self.right.push(self.current);
        self.current = self.left.pop().unwrap_or_default();
        self.position -= 1;
    }

    pub fn increment(&mut self) {
        self.current.increment();
    }

    pub fn decrement(&mut self) {
        self.current.decrement();
    }

    pub fn read_current(&self) -> N {
        self.current
    }

    pub fn write_current(&mut self, value: N) {
        self.current = value;
    }

    /// Pointer position relative to the starting cell.
    pub fn position(&self) -> isize {
        self.position
    }

    /// Every visited cell from left to right, with the position of the first one.
    pub fn cells(&self) -> (isize, Vec<N>) {
        let leftmost = self.position - self.left.len() as isize;
        let cells = self
            .left
            .iter()
            .copied()
            .chain(std::iter::once(self.current))
            .chain(self.right.iter().rev().copied())
            .collect();
        (leftmost, cells)
    }
}
