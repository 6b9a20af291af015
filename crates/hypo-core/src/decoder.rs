//! Instruction decoder for the HYPO packed decimal instruction word.
//!
//! A word is read as six decimal digits `O O M R M R`: a two-digit opcode
//! followed by two `(mode, register)` operand descriptors. Decoding is pure
//! digit-group arithmetic and never fails; opcode, mode and register validity
//! are checked when the instruction is dispatched and its operands resolved.

use crate::encoding::Opcode;
use crate::memory::Word;

/// Raw `(mode, register)` digits of one operand descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OperandField {
    /// Addressing-mode digit.
    pub mode: Word,
    /// Register selector digit.
    pub register: Word,
}

impl OperandField {
    /// Creates an operand descriptor from its digits.
    #[must_use]
    pub const fn new(mode: Word, register: Word) -> Self {
        Self { mode, register }
    }
}

/// Instruction word split into its digit groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedInstruction {
    /// Opcode field (`W / 10000`).
    pub opcode: Word,
    /// First operand descriptor.
    pub op1: OperandField,
    /// Second operand descriptor.
    pub op2: OperandField,
}

impl DecodedInstruction {
    /// Classifies the opcode field; `None` marks an unknown opcode.
    #[must_use]
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_field(self.opcode)
    }

    /// Re-packs the digit groups into an instruction word.
    #[must_use]
    pub const fn encode(self) -> Word {
        self.opcode
            .wrapping_mul(10_000)
            .wrapping_add(self.op1.mode.wrapping_mul(1_000))
            .wrapping_add(self.op1.register.wrapping_mul(100))
            .wrapping_add(self.op2.mode.wrapping_mul(10))
            .wrapping_add(self.op2.register)
    }
}

/// Instruction decoder for the HYPO machine.
pub struct Decoder;

impl Decoder {
    /// Splits an instruction word into opcode and operand descriptors.
    ///
    /// Division truncates toward zero, so negative words decode into negative
    /// digit groups, which downstream validation rejects.
    #[must_use]
    pub const fn decode(word: Word) -> DecodedInstruction {
        let operands = word % 10_000;
        let op1_register_and_op2 = operands % 1_000;
        let op2 = op1_register_and_op2 % 100;

        DecodedInstruction {
            opcode: word / 10_000,
            op1: OperandField {
                mode: operands / 1_000,
                register: op1_register_and_op2 / 100,
            },
            op2: OperandField {
                mode: op2 / 10,
                register: op2 % 10,
            },
        }
    }
}
