use thiserror::Error;

use crate::memory::Word;

/// Fault classes used for diagnostics aggregation and policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Instruction fetch from outside memory.
    Fetch,
    /// Opcode field does not name an instruction.
    Decode,
    /// Operand resolution failed (register, mode, address or branch target).
    Operand,
    /// Arithmetic could not produce a result.
    Arithmetic,
    /// Destination operand cannot be written.
    Destination,
    /// Stack bounds were violated.
    Stack,
}

impl FaultClass {
    /// Ordered list of every fault class.
    pub const ALL: [Self; 6] = [
        Self::Fetch,
        Self::Decode,
        Self::Operand,
        Self::Arithmetic,
        Self::Destination,
        Self::Stack,
    ];
}

/// Stable fault taxonomy for instruction fetch, decode and execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultCode {
    /// `PC` does not address a memory word.
    #[error("program counter outside memory")]
    InvalidProgramCounter = 0x01,
    /// Opcode field is not one of the twelve assigned opcodes.
    #[error("unknown opcode")]
    UnknownOpcode = 0x02,
    /// Register selector is not in `1..=8`.
    #[error("invalid general-purpose register")]
    InvalidRegister = 0x03,
    /// Effective address or stack-operation address is outside memory.
    #[error("invalid memory address")]
    InvalidAddress = 0x04,
    /// Addressing-mode field is not in `1..=6`.
    #[error("invalid addressing mode")]
    InvalidMode = 0x05,
    /// Branch target is outside memory.
    #[error("invalid branch address")]
    InvalidBranchTarget = 0x06,
    /// Divide with a zero divisor.
    #[error("division by zero")]
    DivisionByZero = 0x07,
    /// Arithmetic or move named an immediate operand as its destination.
    #[error("destination operand cannot be immediate value")]
    ImmediateDestination = 0x08,
    /// Push with the stack pointer at its floor.
    #[error("stack overflow")]
    StackOverflow = 0x09,
    /// Pop with an empty stack.
    #[error("stack underflow")]
    StackUnderflow = 0x0A,
}

impl FaultCode {
    /// Converts a fault code to the stable value latched into `PSR`.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable `PSR` value back into a fault code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::InvalidProgramCounter),
            0x02 => Some(Self::UnknownOpcode),
            0x03 => Some(Self::InvalidRegister),
            0x04 => Some(Self::InvalidAddress),
            0x05 => Some(Self::InvalidMode),
            0x06 => Some(Self::InvalidBranchTarget),
            0x07 => Some(Self::DivisionByZero),
            0x08 => Some(Self::ImmediateDestination),
            0x09 => Some(Self::StackOverflow),
            0x0A => Some(Self::StackUnderflow),
            _ => None,
        }
    }

    /// Returns the diagnostics fault class for this fault code.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::InvalidProgramCounter => FaultClass::Fetch,
            Self::UnknownOpcode => FaultClass::Decode,
            Self::InvalidRegister
            | Self::InvalidAddress
            | Self::InvalidMode
            | Self::InvalidBranchTarget => FaultClass::Operand,
            Self::DivisionByZero => FaultClass::Arithmetic,
            Self::ImmediateDestination => FaultClass::Destination,
            Self::StackOverflow | Self::StackUnderflow => FaultClass::Stack,
        }
    }

    /// Faults that end the run regardless of the configured error policy.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::InvalidProgramCounter | Self::UnknownOpcode)
    }
}

/// A fault code together with the offending value, when there is one.
///
/// The context is the selector, mode, address, opcode or stack pointer that
/// caused the fault, depending on the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[error("{code}{}", context_suffix(self.context))]
pub struct FaultReason {
    code: FaultCode,
    context: Option<Word>,
}

fn context_suffix(context: Option<Word>) -> String {
    context.map_or_else(String::new, |value| format!(": {value}"))
}

impl FaultReason {
    /// Creates a fault reason without context.
    #[must_use]
    pub const fn new(code: FaultCode) -> Self {
        Self {
            code,
            context: None,
        }
    }

    /// Creates a fault reason carrying the offending value.
    #[must_use]
    pub const fn with_context(code: FaultCode, context: Word) -> Self {
        Self {
            code,
            context: Some(context),
        }
    }

    /// Returns the fault code.
    #[must_use]
    pub const fn code(self) -> FaultCode {
        self.code
    }

    /// Returns the offending value, if recorded.
    #[must_use]
    pub const fn context(self) -> Option<Word> {
        self.context
    }
}

impl From<FaultCode> for FaultReason {
    fn from(code: FaultCode) -> Self {
        Self::new(code)
    }
}
