use cbf_types::ProgramCursor;

/// Saved continuations of the loops currently open, innermost on top.
///
/// Each entry is the cursor just past a `[`, which is where a non-zero `]` resumes.
/// Depth equals the number of loop bodies being interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopStack {
    continuations: Vec<ProgramCursor>,
}

impl LoopStack {
    pub fn new() -> Self {
        LoopStack {
            continuations: Vec::new(),
        }
    }

    pub fn push(&mut self, continuation: ProgramCursor) {
        self.continuations.push(continuation);
    }

    /// The innermost continuation, left in place.
    pub fn peek(&self) -> Option<ProgramCursor> {
        self.continuations.last().copied()
    }

    pub fn pop(&mut self) -> Option<ProgramCursor> {
        self.continuations.pop()
    }

    pub fn depth(&self) -> usize {
        self.continuations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.continuations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stack_has_nothing_to_resume() {
        let mut stack = LoopStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.peek(), None);
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_peek_does_not_remove() {
        let mut stack = LoopStack::new();
        stack.push(ProgramCursor::at(3));
        assert_eq!(stack.peek(), Some(ProgramCursor::at(3)));
        assert_eq!(stack.peek(), Some(ProgramCursor::at(3)));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_inner_loop_sits_above_outer() {
        let mut stack = LoopStack::new();
        stack.push(ProgramCursor::at(1));
        stack.push(ProgramCursor::at(5));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.pop(), Some(ProgramCursor::at(5)));
        assert_eq!(stack.peek(), Some(ProgramCursor::at(1)));
        assert_eq!(stack.pop(), Some(ProgramCursor::at(1)));
        assert!(stack.is_empty());
    }
}
