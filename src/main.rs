use bfrun::cli_util::print_interpreter_error;
use bfrun::{Interpreter, InterpreterError, StepControl, filter_instructions};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::time::Duration;
use std::{env, fs, thread};

#[derive(Parser, Debug)]
#[command(
    name = "bfrun",
    version,
    about = "A Brainfuck interpreter with a circular memory tape"
)]
struct Cli {
    /// Path to the Brainfuck program
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    file: PathBuf,

    /// Show the tape contents after the execution
    #[arg(short = 'a', long = "array")]
    array: bool,

    /// Wall-clock timeout in milliseconds (fallback BF_TIMEOUT_MS; default unlimited)
    #[arg(long = "timeout", value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    max_steps: Option<u64>,
}

fn run(program: &str, cli: Cli) -> i32 {
    let source = match fs::read_to_string(&cli.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!(
                "{program}: failed to open Brainfuck program {}: {e}",
                cli.file.display()
            );
            let _ = io::stderr().flush();
            return 1;
        }
    };

    // Comments and whitespace are legal in program files; the interpreter
    // only ever sees the eight instruction characters.
    let code = filter_instructions(&source);

    // Resolve limits: flags -> env -> unlimited
    let timeout_ms = cli.timeout_ms.or_else(|| {
        env::var("BF_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
    });
    let max_steps = cli.max_steps.or_else(|| {
        env::var("BF_MAX_STEPS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
    });

    let cancel = Arc::new(AtomicBool::new(false));

    // Ctrl+C flips the cancellation flag; the execution loop notices it
    // at the next instruction and aborts cleanly.
    {
        let cancel = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || cancel.store(true, Ordering::Relaxed)) {
            eprintln!("{program}: failed to set ctrl+c handler: {e}");
            let _ = io::stderr().flush();
        }
    }

    // Execute on a worker thread with cooperative cancellation
    let (tx, rx) = mpsc::channel::<Result<Option<Vec<u8>>, InterpreterError>>();
    let worker_code = code.clone();
    let worker_cancel = cancel.clone();
    let show_array = cli.array;

    thread::spawn(move || {
        let mut bf = Interpreter::new(worker_code);
        let ctrl = StepControl::new(max_steps.map(|n| n as usize), worker_cancel);
        let res = bf
            .run_with_control(ctrl)
            .map(|()| if show_array { bf.tape().dump() } else { None });
        let _ = tx.send(res);
    });

    let outcome = match timeout_ms {
        Some(ms) => match rx.recv_timeout(Duration::from_millis(ms)) {
            Ok(res) => res,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                cancel.store(true, Ordering::Relaxed);
                eprintln!("Execution aborted: wall-clock timeout exceeded ({ms} ms)");
                let _ = io::stderr().flush();
                return 1;
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => return 1,
        },
        None => match rx.recv() {
            Ok(res) => res,
            Err(_) => return 1,
        },
    };

    match outcome {
        Ok(dump) => {
            // For readability, ensure program output ends with a newline
            println!();
            if let Some(cells) = dump {
                println!("{cells:?}");
            }
            let _ = io::stdout().flush();
            0
        }
        Err(InterpreterError::Canceled) => {
            eprintln!("Execution aborted: cancelled");
            let _ = io::stderr().flush();
            130
        }
        Err(err @ InterpreterError::StepLimitExceeded { .. }) => {
            eprintln!("{err}");
            let _ = io::stderr().flush();
            1
        }
        Err(err) => {
            print_interpreter_error(Some(program), &code, &err);
            let _ = io::stderr().flush();
            1
        }
    }
}

fn main() {
    // We still pull the program name for error rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bfrun"));

    let cli = Cli::parse();
    std::process::exit(run(&program, cli));
}
