//! Operand resolution for the six addressing modes.
//!
//! Register mutation (autoincrement/autodecrement) and extension-word
//! consumption are committed as soon as they happen, even when the operand or
//! its instruction is later rejected.

use crate::decoder::OperandField;
use crate::encoding::AddressingMode;
use crate::memory::{read_word, validate_fetch_address, write_word, Word};
use crate::{CoreState, FaultCode, FaultReason, GeneralRegister};

/// Where a resolved operand lives, and therefore whether it can be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandLocation {
    /// The operand is a general-purpose register.
    Register(GeneralRegister),
    /// The operand is the memory word at this address.
    Memory(Word),
    /// The operand is a literal taken from the instruction stream.
    Immediate,
}

/// Operand value together with its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedOperand {
    /// Location the value was read from.
    pub location: OperandLocation,
    /// Operand value.
    pub value: Word,
}

impl ResolvedOperand {
    /// Memory address of the operand, if it lives in memory.
    #[must_use]
    pub const fn address(&self) -> Option<Word> {
        match self.location {
            OperandLocation::Memory(addr) => Some(addr),
            OperandLocation::Register(_) | OperandLocation::Immediate => None,
        }
    }
}

/// Reads the word at `PC` and advances `PC` past it.
///
/// # Errors
///
/// Returns [`FaultCode::InvalidProgramCounter`] when `PC` is outside memory;
/// `PC` is left unchanged.
pub fn fetch_extension_word(state: &mut CoreState) -> Result<Word, FaultReason> {
    let pc = state.arch.pc();
    let index = validate_fetch_address(pc)?;
    let word = state
        .memory
        .get(index)
        .copied()
        .ok_or(FaultReason::with_context(FaultCode::InvalidProgramCounter, pc))?;
    state.arch.set_pc(pc.wrapping_add(1));
    Ok(word)
}

/// Resolves one operand descriptor against the current machine state.
///
/// # Errors
///
/// - [`FaultCode::InvalidMode`] for a mode digit outside `1..=6`.
/// - [`FaultCode::InvalidRegister`] for a selector outside `1..=8` in modes 1-4,
///   or outside `0..=8` in modes 5/6. No state changes in that case.
/// - [`FaultCode::InvalidAddress`] when the effective address is outside memory.
/// - [`FaultCode::InvalidProgramCounter`] when modes 5/6 cannot read their
///   extension word.
pub fn resolve_operand(
    field: OperandField,
    state: &mut CoreState,
) -> Result<ResolvedOperand, FaultReason> {
    let mode = AddressingMode::from_field(field.mode)
        .ok_or(FaultReason::with_context(FaultCode::InvalidMode, field.mode))?;

    match mode {
        AddressingMode::Register => {
            let reg = select_register(field)?;
            Ok(ResolvedOperand {
                location: OperandLocation::Register(reg),
                value: state.arch.gpr(reg),
            })
        }
        AddressingMode::RegisterDeferred => {
            let reg = select_register(field)?;
            memory_operand(state, state.arch.gpr(reg))
        }
        AddressingMode::Autoincrement => {
            let reg = select_register(field)?;
            let addr = state.arch.gpr(reg);
            let operand = memory_operand(state, addr)?;
            state.arch.set_gpr(reg, addr.wrapping_add(1));
            Ok(operand)
        }
        AddressingMode::Autodecrement => {
            let reg = select_register(field)?;
            let addr = state.arch.gpr(reg).wrapping_sub(1);
            state.arch.set_gpr(reg, addr);
            memory_operand(state, addr)
        }
        AddressingMode::Direct => {
            check_unused_selector(field)?;
            let addr = fetch_extension_word(state)?;
            memory_operand(state, addr)
        }
        AddressingMode::Immediate => {
            check_unused_selector(field)?;
            Ok(ResolvedOperand {
                location: OperandLocation::Immediate,
                value: fetch_extension_word(state)?,
            })
        }
    }
}

/// Stores `value` into a destination operand.
///
/// # Errors
///
/// Returns [`FaultCode::ImmediateDestination`] for an immediate operand and
/// [`FaultCode::InvalidAddress`] for a memory location outside memory.
pub fn write_operand(
    state: &mut CoreState,
    location: OperandLocation,
    value: Word,
) -> Result<(), FaultReason> {
    match location {
        OperandLocation::Register(reg) => {
            state.arch.set_gpr(reg, value);
            Ok(())
        }
        OperandLocation::Memory(addr) => write_word(&mut state.memory, addr, value),
        OperandLocation::Immediate => Err(FaultCode::ImmediateDestination.into()),
    }
}

fn select_register(field: OperandField) -> Result<GeneralRegister, FaultReason> {
    GeneralRegister::from_selector(field.register).ok_or(FaultReason::with_context(
        FaultCode::InvalidRegister,
        field.register,
    ))
}

/// Modes 5 and 6 read no register, but still reject selectors outside `0..=8`.
fn check_unused_selector(field: OperandField) -> Result<(), FaultReason> {
    if field.register == 0 {
        return Ok(());
    }
    select_register(field).map(|_| ())
}

fn memory_operand(state: &CoreState, addr: Word) -> Result<ResolvedOperand, FaultReason> {
    Ok(ResolvedOperand {
        location: OperandLocation::Memory(addr),
        value: read_word(&state.memory, addr)?,
    })
}
