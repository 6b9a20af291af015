//! Load, dump, run, dump: one complete machine session.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use hypo_core::{run, ConfigError, CoreConfig, CoreState, RunOutcome, Word};
use thiserror::Error;

use crate::loader::{load_program_file, LoadError};
use crate::report::{render_json, render_text, DEFAULT_DUMP_LEN, DEFAULT_DUMP_START};

/// Output file written when none is given.
pub const DEFAULT_OUTPUT_PATH: &str = "hypo_output.txt";

/// Title of the dump taken after loading.
pub const AFTER_LOAD_TITLE: &str = "After Loading Program";

/// Title of the dump taken after the run ends.
pub const AFTER_RUN_TITLE: &str = "After Executing Program";

/// Dump encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpFormat {
    /// Fixed-width text tables.
    #[default]
    Text,
    /// One JSON object per dump.
    Json,
}

/// Everything a session needs besides the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Program image to load.
    pub program: PathBuf,
    /// File that receives every dump.
    pub output: PathBuf,
    /// Machine configuration.
    pub config: CoreConfig,
    /// First memory address in each dump.
    pub dump_start: usize,
    /// Number of memory words in each dump.
    pub dump_len: usize,
    /// Dump encoding.
    pub format: DumpFormat,
}

impl SessionOptions {
    /// Options for `program` with every other setting at its default.
    #[must_use]
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            config: CoreConfig::default(),
            dump_start: DEFAULT_DUMP_START,
            dump_len: DEFAULT_DUMP_LEN,
            format: DumpFormat::Text,
        }
    }
}

/// Errors that abort a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The machine configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The program image could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The output file could not be created or written.
    #[error("failed to write {}: {source}", path.display())]
    Output {
        /// Output file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Writing to the console failed.
    #[error("failed to write to console: {0}")]
    Console(#[source] io::Error),
    /// A dump could not be encoded as JSON.
    #[error("failed to encode dump: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What a completed session observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Start address named by the image's end marker.
    pub start: Word,
    /// Result of running the program.
    pub outcome: RunOutcome,
    /// Errors recorded by the machine's diagnostics during the run.
    pub faults: u64,
}

/// Runs one session, writing both dumps to `console` and to the output file.
///
/// # Errors
///
/// Returns a [`SessionError`] if the configuration is invalid, the image fails
/// to load, or a dump cannot be written. Run-time machine errors are not
/// session errors; they are reported in the returned [`RunOutcome`].
pub fn run_session(
    options: &SessionOptions,
    console: &mut dyn Write,
) -> Result<SessionSummary, SessionError> {
    options.config.validate()?;

    let mut state = CoreState::with_config(&options.config);
    let start = load_program_file(&options.program, &mut state)?;
    tracing::info!(program = %options.program.display(), start, "program loaded");

    let mut output =
        File::create(&options.output).map_err(|source| output_error(options, source))?;

    emit_dump(options, AFTER_LOAD_TITLE, &state, console, &mut output)?;
    let outcome = run(&mut state, &options.config);
    let faults = state.diag.total_faults();
    tracing::info!(
        steps = outcome.steps,
        faults,
        fault = ?outcome.final_state.fault(),
        "run finished"
    );
    emit_dump(options, AFTER_RUN_TITLE, &state, console, &mut output)?;

    output.flush().map_err(|source| output_error(options, source))?;
    Ok(SessionSummary {
        start,
        outcome,
        faults,
    })
}

fn emit_dump(
    options: &SessionOptions,
    title: &str,
    state: &CoreState,
    console: &mut dyn Write,
    output: &mut File,
) -> Result<(), SessionError> {
    let dump = state.dump(options.dump_start, options.dump_len);
    let rendered = match options.format {
        DumpFormat::Text => render_text(title, &dump),
        DumpFormat::Json => render_json(title, &dump)? + "\n",
    };

    console
        .write_all(rendered.as_bytes())
        .map_err(SessionError::Console)?;
    output
        .write_all(rendered.as_bytes())
        .map_err(|source| output_error(options, source))
}

fn output_error(options: &SessionOptions, source: io::Error) -> SessionError {
    SessionError::Output {
        path: options.output.clone(),
        source,
    }
}
