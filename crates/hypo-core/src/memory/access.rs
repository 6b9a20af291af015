//! Bounds-checked memory access helpers.
//!
//! Every address the core dereferences goes through [`checked_address`]; the
//! wrappers only differ in which fault they report, so a bad `PC`, a bad
//! operand address and a bad branch target stay distinguishable.

use crate::fault::{FaultCode, FaultReason};
use crate::memory::{Word, MEMORY_SIZE};

/// Converts an architectural address into a memory index.
///
/// # Errors
///
/// Returns [`FaultCode::InvalidAddress`] (with the address as context) when
/// `addr` is outside `[0, MEMORY_SIZE)`.
pub fn checked_address(addr: Word) -> Result<usize, FaultReason> {
    usize::try_from(addr)
        .ok()
        .filter(|index| *index < MEMORY_SIZE)
        .ok_or(FaultReason::with_context(FaultCode::InvalidAddress, addr))
}

/// Validates the program counter before an instruction or extension-word fetch.
///
/// # Errors
///
/// Returns [`FaultCode::InvalidProgramCounter`] when `pc` is outside memory.
pub fn validate_fetch_address(pc: Word) -> Result<usize, FaultReason> {
    checked_address(pc)
        .map_err(|_| FaultReason::with_context(FaultCode::InvalidProgramCounter, pc))
}

/// Validates a branch target read from an instruction stream.
///
/// # Errors
///
/// Returns [`FaultCode::InvalidBranchTarget`] when `target` is outside memory.
pub fn validate_branch_target(target: Word) -> Result<Word, FaultReason> {
    checked_address(target)
        .map(|_| target)
        .map_err(|_| FaultReason::with_context(FaultCode::InvalidBranchTarget, target))
}

/// Reads one word.
///
/// # Errors
///
/// Returns [`FaultCode::InvalidAddress`] when `addr` is outside memory.
pub fn read_word(memory: &[Word], addr: Word) -> Result<Word, FaultReason> {
    let index = checked_address(addr)?;
    memory
        .get(index)
        .copied()
        .ok_or(FaultReason::with_context(FaultCode::InvalidAddress, addr))
}

/// Writes one word.
///
/// # Errors
///
/// Returns [`FaultCode::InvalidAddress`] when `addr` is outside memory; memory
/// is left untouched.
pub fn write_word(memory: &mut [Word], addr: Word, value: Word) -> Result<(), FaultReason> {
    let index = checked_address(addr)?;
    let slot = memory
        .get_mut(index)
        .ok_or(FaultReason::with_context(FaultCode::InvalidAddress, addr))?;
    *slot = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{
        checked_address, read_word, validate_branch_target, validate_fetch_address, write_word,
    };
    use crate::fault::{FaultCode, FaultReason};
    use crate::memory::{new_address_space, Word, LAST_ADDRESS, MEMORY_WORDS};

    #[rstest]
    #[case(0, Some(0))]
    #[case(1, Some(1))]
    #[case(LAST_ADDRESS, Some(9_999))]
    #[case(MEMORY_WORDS, None)]
    #[case(-1, None)]
    #[case(Word::MIN, None)]
    #[case(Word::MAX, None)]
    fn address_bounds_are_half_open(#[case] addr: Word, #[case] expected: Option<usize>) {
        assert_eq!(checked_address(addr).ok(), expected);
    }

    #[test]
    fn wrappers_report_distinct_fault_codes() {
        assert_eq!(
            validate_fetch_address(MEMORY_WORDS),
            Err(FaultReason::with_context(
                FaultCode::InvalidProgramCounter,
                MEMORY_WORDS
            ))
        );
        assert_eq!(
            validate_branch_target(-7),
            Err(FaultReason::with_context(FaultCode::InvalidBranchTarget, -7))
        );
        assert_eq!(validate_branch_target(42), Ok(42));
    }

    #[test]
    fn read_and_write_respect_bounds() {
        let mut memory = new_address_space();
        write_word(&mut memory, LAST_ADDRESS, -5).expect("last address is writable");
        assert_eq!(read_word(&memory, LAST_ADDRESS), Ok(-5));

        let before = memory.clone();
        assert_eq!(
            write_word(&mut memory, MEMORY_WORDS, 1),
            Err(FaultReason::with_context(
                FaultCode::InvalidAddress,
                MEMORY_WORDS
            ))
        );
        assert_eq!(memory, before);
        assert!(read_word(&memory, -1).is_err());
    }
}
