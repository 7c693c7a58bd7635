//! The instruction-execution loop: dispatch, loop brackets, step control.

use std::fmt;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::tape::Tape;

/// Errors that can occur while loading or interpreting Brainfuck code.
///
/// Pointer movement cannot fail: the tape is circular, so there is no
/// out-of-bounds variant.
#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    /// Encountered a character outside the Brainfuck instruction set `><+-.,[]`.
    /// The caller is expected to filter program text before handing it over.
    #[error("Invalid character: '{ch}' at instruction {ip}")]
    InvalidCharacter { ch: char, ip: usize },

    /// Loops were not balanced; a matching `[` or `]` was not found.
    /// Detected up front, before any instruction executes.
    #[error("Unmatched bracket {kind} at instruction {ip}")]
    UnmatchedBrackets { ip: usize, kind: UnmatchedBracketKind },

    /// An underlying I/O error occurred when reading input for `,`.
    #[error("I/O error at instruction {ip}: {source}")]
    IoError {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (e.g., timeout or Ctrl+C).
    #[error("Execution aborted: cancelled")]
    Canceled,
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "'['"),
            UnmatchedBracketKind::Close => write!(f, "']'"),
        }
    }
}

/// Controls for cooperative cancellation and step limiting.
///
/// Checked once per executed instruction. Without one of these a run is
/// unbounded; an infinite loop runs forever.
#[derive(Clone)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self {
            max_steps,
            cancel_flag,
        }
    }
}

/// A Brainfuck interpreter over a circular memory tape.
///
/// The interpreter owns:
/// - the program as a `String` of instruction characters,
/// - a [`Tape`] it mutates one instruction at a time,
/// - optional I/O hooks replacing stdin/stdout.
///
/// Bracket pairs are resolved into a jump table before the first
/// instruction runs, so `[`/`]` jumps are O(1) lookups and unbalanced
/// programs fail fast instead of jumping to an undefined target.
pub struct Interpreter {
    code: String,
    tape: Tape,
    // Optional hooks:
    output_sink: Option<Box<dyn Fn(&[u8]) + Send + Sync>>,
    input_provider: Option<Box<dyn Fn() -> Option<u8> + Send + Sync>>,
}

impl Interpreter {
    /// Create a new interpreter over a default tape (30,000 8-bit cells).
    pub fn new(code: String) -> Self {
        Self::with_tape(code, Tape::new())
    }

    /// Create a new interpreter over a caller-configured tape.
    pub fn with_tape(code: String, tape: Tape) -> Self {
        Self {
            code,
            tape,
            output_sink: None,
            input_provider: None,
        }
    }

    /// Provide an output sink. When set, `.` sends bytes to this sink instead
    /// of stdout. Each `.` delivers the UTF-8 encoding of one character.
    pub fn set_output_sink<F>(&mut self, sink: F)
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        self.output_sink = Some(Box::new(sink));
    }

    /// Provide an input provider. When set, `,` reads from this provider
    /// instead of stdin. Returning None indicates EOF (cell is set to 0).
    pub fn set_input_provider<F>(&mut self, provider: F)
    where
        F: Fn() -> Option<u8> + Send + Sync + 'static,
    {
        self.input_provider = Some(Box::new(provider));
    }

    /// The tape in its current state; after a run, the final state.
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Execute the program until the instruction pointer passes the end.
    pub fn run(&mut self) -> Result<(), InterpreterError> {
        self.execute(None)
    }

    /// Execute with cooperative cancellation and optional step limit.
    pub fn run_with_control(&mut self, step_control: StepControl) -> Result<(), InterpreterError> {
        self.execute(Some(&step_control))
    }

    fn execute(&mut self, step_control: Option<&StepControl>) -> Result<(), InterpreterError> {
        let mut ip = 0;
        let chars: Vec<char> = self.code.chars().collect();
        let code_len = chars.len();

        let jump_map = build_jump_map(&chars)?;

        let mut step: usize = 0;
        while ip < code_len {
            // Cooperative cancellation check
            if let Some(ctrl) = step_control {
                if ctrl.cancel_flag.load(Ordering::Relaxed) {
                    return Err(InterpreterError::Canceled);
                }
                if let Some(max) = ctrl.max_steps {
                    if step >= max {
                        return Err(InterpreterError::StepLimitExceeded { limit: max });
                    }
                }
            }

            match chars[ip] {
                '+' => self.tape.increment(),
                '-' => self.tape.decrement(),
                '>' => self.tape.move_right(),
                '<' => self.tape.move_left(),
                '.' => {
                    // Emit the character whose code point is the current cell.
                    let ch = self.tape.read_current() as char;
                    if let Some(sink) = self.output_sink.as_ref() {
                        let mut buf = [0u8; 4];
                        (sink)(ch.encode_utf8(&mut buf).as_bytes());
                    } else {
                        print!("{ch}");
                    }
                }
                ',' => {
                    if let Some(provider) = self.input_provider.as_ref() {
                        match (provider)() {
                            Some(b) => self.tape.write_current(b),
                            None => self.tape.write_current(0), // EOF
                        }
                    } else {
                        // Read exactly one byte from stdin into the current cell.
                        // On EOF, set the current cell to 0.
                        use std::io::Read;
                        let mut buf = [0u8; 1];
                        match std::io::stdin().read(&mut buf) {
                            Ok(0) => self.tape.write_current(0),
                            Ok(_) => self.tape.write_current(buf[0]),
                            Err(e) => {
                                return Err(InterpreterError::IoError { ip, source: e });
                            }
                        }
                    }
                }
                '[' => {
                    // Current cell zero: skip the loop body. Landing on the
                    // matching ']' is fine; the shared ip += 1 below steps past it.
                    if self.tape.read_current() == 0 {
                        ip = jump_map[ip].expect("validated bracket");
                    }
                }
                ']' => {
                    // Current cell nonzero: re-enter the loop body just after
                    // the matching '['.
                    if self.tape.read_current() != 0 {
                        ip = jump_map[ip].expect("validated bracket");
                    }
                }
                other => {
                    return Err(InterpreterError::InvalidCharacter { ch: other, ip });
                }
            }

            step += 1;
            // Move to the next instruction
            ip += 1;
        }

        Ok(())
    }
}

/// Resolve matching bracket positions with a single forward scan.
///
/// `jump_map[i]` holds the matching index for a `[` or `]` at index `i`
/// and `None` everywhere else. Unbalanced brackets are an error here,
/// never an undefined jump target at run time.
fn build_jump_map(chars: &[char]) -> Result<Vec<Option<usize>>, InterpreterError> {
    let mut jump_map: Vec<Option<usize>> = vec![None; chars.len()];
    let mut stack: Vec<usize> = Vec::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '[' {
            stack.push(i);
        } else if c == ']' {
            let Some(open_index) = stack.pop() else {
                return Err(InterpreterError::UnmatchedBrackets {
                    ip: i,
                    kind: UnmatchedBracketKind::Close,
                });
            };
            jump_map[open_index] = Some(i);
            jump_map[i] = Some(open_index);
        }
    }

    if let Some(unmatched_open) = stack.last().copied() {
        return Err(InterpreterError::UnmatchedBrackets {
            ip: unmatched_open,
            kind: UnmatchedBracketKind::Open,
        });
    }

    Ok(jump_map)
}
