//! A tiny Brainfuck interpreter library over a circular memory tape.
//!
//! This crate provides a minimal Brainfuck interpreter that operates on a
//! fixed-size memory tape (default 30,000 cells) with a single data pointer.
//!
//! Features and behaviors:
//! - Memory tape initialized to 0; cells are unsigned integers modulo a
//!   configurable power of two (8 bits, 0..=255, by default).
//! - Circular pointer: moving left from cell 0 wraps to the last cell and
//!   moving right from the last cell wraps to cell 0, so the pointer can
//!   never dangle.
//! - Input `,` reads a single byte; on EOF the current cell is set to 0.
//! - Output `.` emits the character whose code point is the current cell.
//! - Nested loops `[]` are resolved into a jump table before execution;
//!   unmatched brackets are reported as errors up front.
//! - Any non-Brainfuck character reaching the interpreter is an error;
//!   callers filter program text first (see [`filter_instructions`]).
//! - An optional post-run dump returns the tape up to its last nonzero
//!   cell, for display.
//!
//! Quick start:
//!
//! ```no_run
//! use bfrun::Interpreter;
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
//! let mut bf = Interpreter::new(code.to_string());
//! bf.run().expect("program should run");
//! println!(); // ensure a trailing newline for readability
//! ```

pub mod cli_util;
pub mod interpreter;
pub mod tape;

pub use interpreter::{Interpreter, InterpreterError, StepControl, UnmatchedBracketKind};
pub use tape::{DEFAULT_CELL_BITS, DEFAULT_TAPE_LEN, Tape};

/// Run `code` on a fresh default tape, with stdin/stdout as the streams.
///
/// When `show_array` is set, the trimmed tape dump is returned after a
/// successful run; `None` means every cell ended at zero (or the dump
/// was not requested).
///
/// ```no_run
/// let dump = bfrun::evaluate("+++>++", true).expect("program should run");
/// assert_eq!(dump, Some(vec![3, 2]));
/// ```
pub fn evaluate(code: &str, show_array: bool) -> Result<Option<Vec<u8>>, InterpreterError> {
    let mut interpreter = Interpreter::new(code.to_string());
    interpreter.run()?;
    if show_array {
        Ok(interpreter.tape().dump())
    } else {
        Ok(None)
    }
}

/// Keep only Brainfuck instruction characters.
///
/// Program files routinely carry comments and whitespace; the interpreter
/// does not, so strip everything else before handing code over.
pub fn filter_instructions(s: &str) -> String {
    s.chars()
        .filter(|c| matches!(c, '>' | '<' | '+' | '-' | '.' | ',' | '[' | ']'))
        .collect()
}
