//! Opcode and addressing-mode tables for the HYPO instruction word.

use crate::memory::Word;

/// Assigned opcodes (the `W / 10000` digit group of an instruction word).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    Halt = 0,
    Add = 1,
    Subtract = 2,
    Multiply = 3,
    Divide = 4,
    Move = 5,
    Branch = 6,
    BranchOnMinus = 7,
    BranchOnPlus = 8,
    BranchOnZero = 9,
    Push = 10,
    Pop = 11,
}

/// Single source-of-truth opcode table: field value, opcode and mnemonic.
///
/// Any opcode field not present here is an unknown opcode by definition.
pub const OPCODE_TABLE: &[(Word, Opcode, &str)] = &[
    (0, Opcode::Halt, "HALT"),
    (1, Opcode::Add, "ADD"),
    (2, Opcode::Subtract, "SUB"),
    (3, Opcode::Multiply, "MUL"),
    (4, Opcode::Divide, "DIV"),
    (5, Opcode::Move, "MOVE"),
    (6, Opcode::Branch, "BR"),
    (7, Opcode::BranchOnMinus, "BRMINUS"),
    (8, Opcode::BranchOnPlus, "BRPLUS"),
    (9, Opcode::BranchOnZero, "BRZERO"),
    (10, Opcode::Push, "PUSH"),
    (11, Opcode::Pop, "POP"),
];

impl Opcode {
    /// Classifies a decoded opcode field.
    #[must_use]
    pub fn from_field(field: Word) -> Option<Self> {
        OPCODE_TABLE
            .iter()
            .find_map(|(value, opcode, _)| (*value == field).then_some(*opcode))
    }

    /// Returns the upper-case mnemonic.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        OPCODE_TABLE
            .iter()
            .find_map(|(_, opcode, mnemonic)| (*opcode == self).then_some(*mnemonic))
            .unwrap_or("???")
    }
}

/// Operand addressing modes (the mode digit of each operand descriptor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AddressingMode {
    /// Operand is the register itself.
    Register = 1,
    /// Register holds the operand address.
    RegisterDeferred = 2,
    /// Register holds the operand address; register is incremented afterwards.
    Autoincrement = 3,
    /// Register is decremented first, then holds the operand address.
    Autodecrement = 4,
    /// Next instruction word holds the operand address.
    Direct = 5,
    /// Next instruction word is the operand value.
    Immediate = 6,
}

impl AddressingMode {
    /// Converts a decoded mode field into an addressing mode.
    #[must_use]
    pub const fn from_field(field: Word) -> Option<Self> {
        match field {
            1 => Some(Self::Register),
            2 => Some(Self::RegisterDeferred),
            3 => Some(Self::Autoincrement),
            4 => Some(Self::Autodecrement),
            5 => Some(Self::Direct),
            6 => Some(Self::Immediate),
            _ => None,
        }
    }

    /// Returns true if this mode reads its operand descriptor's register.
    #[must_use]
    pub const fn uses_register(self) -> bool {
        matches!(
            self,
            Self::Register | Self::RegisterDeferred | Self::Autoincrement | Self::Autodecrement
        )
    }

    /// Returns true if this mode consumes an extension word at `PC`.
    #[must_use]
    pub const fn consumes_word(self) -> bool {
        matches!(self, Self::Direct | Self::Immediate)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{AddressingMode, Opcode, OPCODE_TABLE};

    #[test]
    fn table_contains_unique_fields_and_opcodes() {
        let fields: HashSet<_> = OPCODE_TABLE.iter().map(|(field, _, _)| *field).collect();
        let opcodes: HashSet<_> = OPCODE_TABLE.iter().map(|(_, opcode, _)| *opcode).collect();
        assert_eq!(fields.len(), OPCODE_TABLE.len());
        assert_eq!(opcodes.len(), OPCODE_TABLE.len());
    }

    #[test]
    fn every_table_entry_roundtrips_through_field() {
        for (field, opcode, _) in OPCODE_TABLE {
            assert_eq!(Opcode::from_field(*field), Some(*opcode));
        }
    }

    #[test]
    fn unassigned_fields_are_unknown() {
        assert_eq!(Opcode::from_field(12), None);
        assert_eq!(Opcode::from_field(-1), None);
        assert_eq!(Opcode::from_field(99), None);
    }

    #[test]
    fn mnemonics_resolve() {
        assert_eq!(Opcode::Halt.mnemonic(), "HALT");
        assert_eq!(Opcode::BranchOnZero.mnemonic(), "BRZERO");
        assert_eq!(Opcode::Pop.mnemonic(), "POP");
    }

    #[test]
    fn mode_valid_range_is_one_to_six() {
        for field in 1..=6 {
            assert!(AddressingMode::from_field(field).is_some(), "mode {field}");
        }
        assert!(AddressingMode::from_field(0).is_none());
        assert!(AddressingMode::from_field(7).is_none());
    }

    #[test]
    fn register_and_extension_word_modes_partition() {
        for field in 1..=6 {
            let mode = AddressingMode::from_field(field).expect("valid mode");
            assert_ne!(mode.uses_register(), mode.consumes_word(), "mode {field}");
        }
    }
}
