//! The memory tape: a fixed-size buffer of cells plus the data pointer.

/// Default number of cells on the tape.
pub const DEFAULT_TAPE_LEN: usize = 30_000;

/// Default cell width in bits; 8 bits gives the classic 0..=255 cells.
pub const DEFAULT_CELL_BITS: u32 = 8;

/// A circular memory tape of unsigned cells with a single data pointer.
///
/// Every cell holds a value in `[0, 2^bits)` and every mutation uses
/// explicit modulo arithmetic, so neither the pointer nor a cell can
/// ever leave its valid range: moving past either end of the tape wraps
/// to the opposite end, and incrementing past the cell maximum wraps to
/// zero (and vice versa).
pub struct Tape {
    cells: Vec<u8>,
    pointer: usize,
    modulus: u16,
}

impl Tape {
    /// Create a tape with the default length (30,000 cells) and the
    /// default cell width (8 bits), zeroed, with the pointer on cell 0.
    pub fn new() -> Self {
        Self::with_config(DEFAULT_TAPE_LEN, DEFAULT_CELL_BITS)
    }

    /// Create a tape with a custom length and cell width.
    ///
    /// `cell_bits` is clamped to `1..=8`; the cell modulus is `2^cell_bits`.
    pub fn with_config(len: usize, cell_bits: u32) -> Self {
        let bits = cell_bits.clamp(1, 8);
        Self {
            cells: vec![0; len.max(1)],
            pointer: 0,
            modulus: 1u16 << bits,
        }
    }

    /// Number of cells on the tape.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Current position of the data pointer.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Add one to the current cell, wrapping at the cell modulus.
    pub fn increment(&mut self) {
        let v = self.cells[self.pointer] as u16;
        self.cells[self.pointer] = ((v + 1) % self.modulus) as u8;
    }

    /// Subtract one from the current cell, wrapping below zero to the
    /// cell maximum.
    pub fn decrement(&mut self) {
        let v = self.cells[self.pointer] as u16;
        self.cells[self.pointer] = ((v + self.modulus - 1) % self.modulus) as u8;
    }

    /// Move the pointer one cell to the right; the last cell wraps to cell 0.
    pub fn move_right(&mut self) {
        self.pointer = (self.pointer + 1) % self.cells.len();
    }

    /// Move the pointer one cell to the left; cell 0 wraps to the last cell.
    pub fn move_left(&mut self) {
        self.pointer = (self.pointer + self.cells.len() - 1) % self.cells.len();
    }

    /// Value of the current cell.
    pub fn read_current(&self) -> u8 {
        self.cells[self.pointer]
    }

    /// Store `value` in the current cell, reduced modulo the cell modulus.
    pub fn write_current(&mut self, value: u8) {
        self.cells[self.pointer] = (value as u16 % self.modulus) as u8;
    }

    /// Snapshot of the tape for display: the cells from index 0 through
    /// the last nonzero cell, trailing zeros trimmed.
    ///
    /// Returns `None` when every cell is zero. Execution never calls
    /// this; it only feeds the post-run dump.
    pub fn dump(&self) -> Option<Vec<u8>> {
        let last = self.cells.iter().rposition(|&c| c != 0)?;
        Some(self.cells[..=last].to_vec())
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_then_decrement_round_trips() {
        let mut tape = Tape::with_config(1, 8);
        for v in 0..=255u16 {
            tape.write_current(v as u8);
            tape.increment();
            tape.decrement();
            assert_eq!(tape.read_current(), v as u8);
        }
    }

    #[test]
    fn increment_wraps_at_modulus() {
        // 256 increments of an 8-bit cell land back on the starting value.
        let mut tape = Tape::with_config(1, 8);
        tape.write_current(7);
        for _ in 0..256 {
            tape.increment();
        }
        assert_eq!(tape.read_current(), 7);
    }

    #[test]
    fn decrement_wraps_below_zero() {
        let mut tape = Tape::new();
        tape.decrement();
        assert_eq!(tape.read_current(), 255);
    }

    #[test]
    fn narrow_cells_wrap_at_their_own_modulus() {
        let mut tape = Tape::with_config(1, 4);
        for _ in 0..16 {
            tape.increment();
        }
        assert_eq!(tape.read_current(), 0);
        tape.decrement();
        assert_eq!(tape.read_current(), 15);
    }

    #[test]
    fn write_current_reduces_modulo_cell_width() {
        let mut tape = Tape::with_config(1, 4);
        tape.write_current(0x1f);
        assert_eq!(tape.read_current(), 0x0f);
    }

    #[test]
    fn moving_right_len_times_returns_home() {
        let mut tape = Tape::with_config(17, 8);
        for _ in 0..17 {
            tape.move_right();
        }
        assert_eq!(tape.pointer(), 0);
    }

    #[test]
    fn moving_left_len_times_returns_home() {
        let mut tape = Tape::with_config(17, 8);
        for _ in 0..17 {
            tape.move_left();
        }
        assert_eq!(tape.pointer(), 0);
    }

    #[test]
    fn left_from_cell_zero_wraps_to_last_cell() {
        let mut tape = Tape::with_config(10, 8);
        tape.move_left();
        assert_eq!(tape.pointer(), 9);
    }

    #[test]
    fn right_from_last_cell_wraps_to_cell_zero() {
        let mut tape = Tape::with_config(10, 8);
        for _ in 0..9 {
            tape.move_right();
        }
        assert_eq!(tape.pointer(), 9);
        tape.move_right();
        assert_eq!(tape.pointer(), 0);
    }

    #[test]
    fn dump_of_all_zero_tape_is_none() {
        let tape = Tape::new();
        assert!(tape.dump().is_none());
    }

    #[test]
    fn dump_trims_trailing_zeros_only() {
        let mut tape = Tape::with_config(10, 8);
        tape.move_right();
        tape.move_right();
        tape.move_right();
        tape.write_current(5);
        assert_eq!(tape.dump(), Some(vec![0, 0, 0, 5]));
    }

    #[test]
    fn dump_keeps_interior_zeros() {
        let mut tape = Tape::with_config(10, 8);
        tape.write_current(1);
        tape.move_right();
        tape.move_right();
        tape.write_current(9);
        assert_eq!(tape.dump(), Some(vec![1, 0, 9]));
    }
}
