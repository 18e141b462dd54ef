//! `vfms` entry point.
//!
//! Usage:
//!   vfms                                 # Interactive session on standard input
//!   vfms --sessions N [--shared]         # Run N batch sessions concurrently
//!   vfms ... [--snapshot PATH] [--no-persist]

use std::{env, fs, thread};
use std::io::{self, BufRead as _, Write as _};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use tracing::Level as LogLevel;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vfms::VirtualFileSystem;
use vfms_shell::{Response, Session, ShellOptions, SnapshotFile};


fn main() -> ExitCode {
    // Respects `RUST_LOG`. Logs go to stderr, so they never mix with command output.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = env::args().skip(1).collect::<Vec<_>>();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(ExitCode::SUCCESS);
    }

    let options = ShellOptions::from_args(args)?;
    let snapshot_file = Arc::new(SnapshotFile::new(options.snapshot_path.clone()));

    if options.is_interactive() {
        run_interactive(&options, &snapshot_file)?;
        Ok(ExitCode::SUCCESS)
    } else {
        run_batch(&options, &snapshot_file)
    }
}

fn print_help() {
    println!("\
vfms v{}

Usage:
  vfms                         Interactive session on standard input
  vfms --sessions N            Run N batch sessions concurrently

Options:
  --sessions N                 Number of batch sessions; session i reads input_thread<i>.txt
                               and writes output_thread<i>.txt
  --snapshot PATH              Snapshot file (default: VFMS.json)
  --shared                     Batch sessions share one filesystem
  --no-persist                 Do not save the snapshot on exit
  -h, --help                   Show this help

Type `help` in a session for the list of commands.",
        env!("CARGO_PKG_VERSION"),
    );
}

/// Read commands from standard input until `exit` or end of input.
fn run_interactive(options: &ShellOptions, snapshot_file: &SnapshotFile) -> Result<()> {
    let session = Session::new(Arc::new(snapshot_file.load_or_default()));
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        print!("{}", session.prompt());
        stdout.flush().context("failed to flush stdout")?;

        line.clear();
        if stdin.lock().read_line(&mut line).context("failed to read stdin")? == 0 {
            // End of input acts as `exit`.
            println!();
            break;
        }

        match session.execute(&line) {
            Response::Empty          => {}
            Response::Output(output) => println!("{output}"),
            Response::Exit           => break,
        }
    }

    if options.persist {
        snapshot_file.save(session.filesystem())?;
    }
    Ok(())
}

/// Run every batch session on its own thread, and wait for all of them.
fn run_batch(options: &ShellOptions, snapshot_file: &Arc<SnapshotFile>) -> Result<ExitCode> {
    let shared = options.shared.then(|| Arc::new(snapshot_file.load_or_default()));

    let handles = (1..=options.sessions)
        .map(|session_number| {
            let options = options.clone();
            let snapshot_file = Arc::clone(snapshot_file);
            let shared = shared.clone();

            thread::Builder::new()
                .name(format!("session-{session_number}"))
                .spawn(move || {
                    let vfs = shared.unwrap_or_else(|| Arc::new(snapshot_file.load_or_default()));
                    run_batch_session(session_number, &options, &snapshot_file, vfs)
                })
                .with_context(|| format!("failed to spawn session {session_number}"))
                .map(|handle| (session_number, handle))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut failures = 0_usize;
    for (session_number, handle) in handles {
        let result = handle
            .join()
            .map_err(|_| anyhow!("session {session_number} panicked"))
            .and_then(|result| result);

        if let Err(err) = result {
            tracing::event!(LogLevel::ERROR, "session {session_number} failed: {err:#}");
            failures += 1;
        }
    }

    Ok(if failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Execute the command file of one batch session, then write its output file and, if enabled,
/// save the snapshot. Running out of commands acts as `exit`.
fn run_batch_session(
    session_number: usize,
    options:        &ShellOptions,
    snapshot_file:  &SnapshotFile,
    vfs:            Arc<VirtualFileSystem>,
) -> Result<()> {
    let input_path = options.input_path(session_number);
    let input = fs::read_to_string(&input_path)
        .with_context(|| format!("failed to read {}", input_path.display()))?;

    let session = Session::new(vfs);
    let mut outputs = Vec::new();

    for line in input.lines() {
        match session.execute(line) {
            Response::Empty          => {}
            Response::Output(output) => outputs.push(output),
            Response::Exit           => break,
        }
    }

    let output_path = options.output_path(session_number);
    fs::write(&output_path, outputs.join("\n"))
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    tracing::event!(
        LogLevel::DEBUG,
        "session {session_number} finished with {} response(s)",
        outputs.len(),
    );

    if options.persist {
        snapshot_file.save(session.filesystem())?;
    }
    Ok(())
}
