use crate::{vm::BrainfuckVM, vm_error::VMError};
use cbf_types::{CellKind, VMState};

// Facilitates step-by-step execution of a Brainfuck program, yielding the state after each step.
// This is particularly useful for debugging.
pub struct VMIterator<'a, N>
where
    N: CellKind,
{
    vm: &'a mut BrainfuckVM<N>,
    done: bool,
}

impl<'a, N> VMIterator<'a, N>
where
    N: CellKind,
{
    pub fn new(vm: &'a mut BrainfuckVM<N>) -> Self {
        VMIterator { vm, done: false }
    }
}

// Iterate one step at a time. Iteration ends when the program is exhausted, or right
// after the first error has been yielded.
impl<N> Iterator for VMIterator<'_, N>
where
    N: CellKind,
{
    type Item = Result<VMState<N>, VMError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = match self.vm.interpret_step() {
            Ok(Some(state)) => return Some(Ok(state)),
            Ok(None) => self.vm.check_finished(),
            Err(err) => Err(err),
        };
        self.done = true;
        result.err().map(Err)
    }
}

#[cfg(test)]
mod tests {
    use crate::vm_builder::VMBuilder;
    use crate::BrainfuckVM;
    use std::num::NonZeroUsize;

    #[test]
    fn test_iteration_stops_after_error() -> Result<(), Box<dyn std::error::Error>> {
        let mut vm: BrainfuckVM<u8> = VMBuilder::new()
            .set_program_reader("+[]".as_bytes())
            .set_step_limit(NonZeroUsize::new(5))
            .build()?;
        let results: Vec<_> = vm.iter().collect();
        assert_eq!(results.len(), 6);
        assert!(results[..5].iter().all(|r| r.is_ok()));
        assert!(results[5].is_err());
        Ok(())
    }

    #[test]
    fn test_empty_program_yields_nothing() -> Result<(), Box<dyn std::error::Error>> {
        let mut vm: BrainfuckVM<u8> = VMBuilder::new()
            .set_program_reader("".as_bytes())
            .build()?;
        assert_eq!(vm.iter().count(), 0);
        Ok(())
    }
}
