//! Program loading, state dumps and session driving for the HYPO machine.

/// Absolute loader for `<address> <value>` program images.
pub mod loader;
pub use loader::{load_program, load_program_file, LoadError};

/// Text and JSON renderings of machine dumps.
pub mod report;
pub use report::{render_json, render_text, TextDump, DEFAULT_DUMP_LEN, DEFAULT_DUMP_START};

/// One complete load-dump-run-dump session.
pub mod session;
pub use session::{
    run_session, DumpFormat, SessionError, SessionOptions, SessionSummary, AFTER_LOAD_TITLE,
    AFTER_RUN_TITLE, DEFAULT_OUTPUT_PATH,
};

use tracing_subscriber as _;
