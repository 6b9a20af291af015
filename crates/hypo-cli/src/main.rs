//! CLI entry point for the `hypo` machine simulator.

use std::env;
use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use hypo_cli::{
    run_session, DumpFormat, SessionOptions, DEFAULT_DUMP_LEN, DEFAULT_DUMP_START,
    DEFAULT_OUTPUT_PATH,
};
use hypo_core::{CoreConfig, CycleAccounting, ErrorPolicy, RunState};
use serde as _;
use serde_json as _;
#[cfg(test)]
use tempfile as _;
use thiserror as _;
use tracing as _;
use tracing_subscriber::EnvFilter;

const USAGE_TEXT: &str = "\
Usage: hypo <command> [options]

Commands:
  run [<program>] [options]  Load a program image, run it and dump machine state

Options:
  -o, --output <file>     Dump file path (default: hypo_output.txt)
      --strict            Stop at the first instruction error
      --weighted-clock    Charge per-opcode cycle costs instead of one per instruction
      --max-steps <n>     Stop after n instructions
      --dump-start <addr> First memory address in each dump (default: 0)
      --dump-len <n>      Memory words in each dump (default: 100)
      --json              Write dumps as JSON objects
  -v, --verbose           Log each instruction to stderr
  -h, --help              Show this help message

Without a program path, the program file name is read from stdin.
Exit status is 0 when the program halts and 1 otherwise.

Examples:
  hypo run program.txt
  hypo run program.txt -o dump.txt --strict
  hypo run program.txt --json --dump-len 20
";

const PROMPT: &str = "Enter executable file name: ";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(RunArgs),
}

#[derive(Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
struct RunArgs {
    program: Option<PathBuf>,
    output: PathBuf,
    strict: bool,
    weighted_clock: bool,
    max_steps: Option<u64>,
    dump_start: usize,
    dump_len: usize,
    json: bool,
    verbose: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            program: None,
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            strict: false,
            weighted_clock: false,
            max_steps: None,
            dump_start: DEFAULT_DUMP_START,
            dump_len: DEFAULT_DUMP_LEN,
            json: false,
            verbose: false,
        }
    }
}

impl RunArgs {
    fn config(&self) -> CoreConfig {
        CoreConfig {
            error_policy: if self.strict {
                ErrorPolicy::Halt
            } else {
                ErrorPolicy::Continue
            },
            cycle_accounting: if self.weighted_clock {
                CycleAccounting::Weighted
            } else {
                CycleAccounting::PerInstruction
            },
            max_steps: self.max_steps,
            ..CoreConfig::default()
        }
    }
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let Some(first) = args.next() else {
        return Ok(ParseResult::Command(Command::Run(RunArgs::default())));
    };

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "run" => parse_run_args(args)
            .map(Command::Run)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

#[allow(clippy::while_let_on_iterator)]
fn parse_run_args(mut args: impl Iterator<Item = OsString>) -> Result<RunArgs, String> {
    let mut parsed = RunArgs::default();

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--verbose" || arg == "-v" {
            parsed.verbose = true;
            continue;
        }

        if arg == "--strict" {
            parsed.strict = true;
            continue;
        }

        if arg == "--weighted-clock" {
            parsed.weighted_clock = true;
            continue;
        }

        if arg == "--json" {
            parsed.json = true;
            continue;
        }

        if arg == "-o" || arg == "--output" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for -o".to_string())?;
            parsed.output = PathBuf::from(value);
            continue;
        }

        if arg == "--max-steps" {
            parsed.max_steps = Some(parse_number(&mut args, "--max-steps")?);
            continue;
        }

        if arg == "--dump-start" {
            parsed.dump_start = parse_number(&mut args, "--dump-start")?;
            continue;
        }

        if arg == "--dump-len" {
            parsed.dump_len = parse_number(&mut args, "--dump-len")?;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if parsed.program.is_some() {
            return Err("multiple program paths provided".to_string());
        }
        parsed.program = Some(PathBuf::from(arg));
    }

    Ok(parsed)
}

fn parse_number<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = OsString>,
    flag: &str,
) -> Result<T, String> {
    let value = args
        .next()
        .ok_or_else(|| format!("missing value for {flag}"))?;
    let text = value.to_string_lossy();
    text.parse()
        .map_err(|_| format!("invalid value for {flag}: {text}"))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn prompt_program_path(input: &mut impl BufRead) -> Result<PathBuf, String> {
    print!("{PROMPT}");
    io::stdout()
        .flush()
        .map_err(|e| format!("failed to write prompt: {e}"))?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| format!("failed to read program name: {e}"))?;
    let name = line.trim();
    if name.is_empty() {
        return Err("missing program path".to_string());
    }
    Ok(PathBuf::from(name))
}

fn run_program(args: RunArgs) -> Result<(), i32> {
    init_tracing(args.verbose);

    let config = args.config();
    let program = match args.program {
        Some(path) => path,
        None => prompt_program_path(&mut io::stdin().lock()).map_err(|e| {
            eprintln!("error: {e}");
            1
        })?,
    };

    let options = SessionOptions {
        output: args.output,
        config,
        dump_start: args.dump_start,
        dump_len: args.dump_len,
        format: if args.json {
            DumpFormat::Json
        } else {
            DumpFormat::Text
        },
        ..SessionOptions::new(program)
    };

    let summary = {
        let stdout = io::stdout();
        let mut console = stdout.lock();
        run_session(&options, &mut console).map_err(|e| {
            eprintln!("error: {e}");
            1
        })?
    };

    for report in &summary.outcome.reports {
        eprintln!("warning: {report}");
    }
    if let Some(fault) = &summary.outcome.fault {
        eprintln!("error: {fault}");
    }
    if summary.outcome.limit_reached {
        eprintln!(
            "warning: stopped after {} steps without halting",
            summary.outcome.steps
        );
    }
    eprintln!("Memory dump written to {}", options.output.display());

    if summary.outcome.final_state == RunState::Halted {
        Ok(())
    } else {
        Err(1)
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Run(args))) => match run_program(args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}
