//! Absolute loader for `<address> <value>` program images.
//!
//! Each meaningful line holds two whitespace-separated integers. A line with a
//! negative address ends the image; its value is the start address. Lines that
//! do not have exactly two fields are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use hypo_core::{CoreState, Word};
use thiserror::Error;

/// Errors raised while loading a program image.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A field is not a decimal integer.
    #[error("line {line}: malformed number `{text}`")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// Offending field.
        text: String,
    },
    /// A load address is outside memory.
    #[error("line {line}: invalid instruction address {address}")]
    InvalidAddress {
        /// 1-based line number.
        line: usize,
        /// Offending address.
        address: Word,
    },
    /// The end marker names a start address outside memory.
    #[error("line {line}: start address {address} is outside memory")]
    InvalidStartAddress {
        /// 1-based line number.
        line: usize,
        /// Offending start address.
        address: Word,
    },
    /// Input ended before a negative-address end marker.
    #[error("no end marker found")]
    MissingTerminator,
}

/// Loads a program image into `state` and points `PC` at its start address.
///
/// Memory words not named by the image are left as they are.
///
/// # Errors
///
/// Returns a [`LoadError`] for malformed numbers, addresses outside memory, an
/// invalid start address or a missing end marker. Words loaded before the
/// error remain in memory.
pub fn load_program(source: &str, state: &mut CoreState) -> Result<Word, LoadError> {
    for (index, text) in source.lines().enumerate() {
        let line = index + 1;
        let fields: Vec<&str> = text.split_whitespace().collect();
        let [address, value] = fields.as_slice() else {
            if !fields.is_empty() {
                tracing::warn!(line, fields = fields.len(), "skipping line without two fields");
            }
            continue;
        };

        let address = parse_field(line, address)?;
        let value = parse_field(line, value)?;

        if address < 0 {
            state
                .start_at(value)
                .map_err(|_| LoadError::InvalidStartAddress {
                    line,
                    address: value,
                })?;
            tracing::debug!(line, start = value, "end marker");
            return Ok(value);
        }

        state
            .load_word(address, value)
            .map_err(|_| LoadError::InvalidAddress { line, address })?;
    }

    Err(LoadError::MissingTerminator)
}

/// Reads a program image from disk and loads it into `state`.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read, otherwise the errors of
/// [`load_program`].
pub fn load_program_file(path: &Path, state: &mut CoreState) -> Result<Word, LoadError> {
    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_program(&source, state)
}

fn parse_field(line: usize, text: &str) -> Result<Word, LoadError> {
    text.parse().map_err(|_| LoadError::Malformed {
        line,
        text: text.to_string(),
    })
}
