//! Memory model primitives for the flat word-addressed store.

/// Bounds-checked word access helpers.
pub mod access;

pub use access::{
    checked_address, read_word, validate_branch_target, validate_fetch_address, write_word,
};

/// Architectural machine word. Every memory cell and register holds one.
pub type Word = i64;

/// Number of words in the flat architectural memory.
pub const MEMORY_SIZE: usize = 10_000;

/// [`MEMORY_SIZE`] expressed as a machine word, for address arithmetic.
pub const MEMORY_WORDS: Word = 10_000;

/// Highest valid memory address.
pub const LAST_ADDRESS: Word = MEMORY_WORDS - 1;

/// Allocates a canonical zeroed memory backing store.
#[must_use]
pub fn new_address_space() -> Box<[Word]> {
    vec![0; MEMORY_SIZE].into_boxed_slice()
}
