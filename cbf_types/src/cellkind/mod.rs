//! The `CellKind` trait represents the type of value stored in a tape cell.
//! It is implemented for `u8`, which is what the interpreter uses unless told otherwise.
//!
//! Arithmetic is always wrapping: incrementing the maximum value yields zero and
//! decrementing zero yields the maximum value. I/O is a byte at a time, so every
//! cell kind must say how it converts to and from a single byte.
use num_traits::{Unsigned, WrappingAdd, WrappingSub};
use std::fmt::{Debug, Display};

/// Trait representing a kind of cell used by the BF interpreter program.
pub trait CellKind: Unsigned + WrappingAdd + WrappingSub + Copy + Display + Default + Debug {
    /// Increment the value of the cell by one, wrapping at the maximum.
    fn increment(&mut self) {
        *self = self.wrapping_add(&Self::one());
    }

    /// Decrement the value of the cell by one, wrapping at zero.
    fn decrement(&mut self) {
        *self = self.wrapping_sub(&Self::one());
    }

    /// Build a cell value from a byte read by `,`.
    fn from_byte(byte: u8) -> Self;

    /// The byte written by `.` for this cell value.
    fn to_byte(&self) -> u8;
}

impl CellKind for u8 {
    fn from_byte(byte: u8) -> Self {
        // Already a u8
        byte
    }

    fn to_byte(&self) -> u8 {
        *self
    }
}
