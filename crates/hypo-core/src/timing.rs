use crate::encoding::Opcode;

/// How the driver advances the cycle counter per dispatched instruction.
///
/// Per-instruction accounting counts every dispatched instruction. Weighted
/// accounting charges an opcode's cost only when the instruction completes; an
/// instruction that reports an error costs nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CycleAccounting {
    /// One cycle per dispatched instruction.
    #[default]
    PerInstruction,
    /// Opcode-specific cost from [`CYCLE_COST_TABLE`].
    Weighted,
}

impl CycleAccounting {
    /// Returns the number of cycles charged when `opcode` completes.
    #[must_use]
    pub fn cycles_for(self, opcode: Opcode) -> u64 {
        match self {
            Self::PerInstruction => 1,
            Self::Weighted => cycle_cost(opcode).unwrap_or(1),
        }
    }

    /// Returns the number of cycles charged for an instruction that reports an
    /// error.
    #[must_use]
    pub const fn failed_cycles(self) -> u64 {
        match self {
            Self::PerInstruction => 1,
            Self::Weighted => 0,
        }
    }
}

/// Single source-of-truth cycle-cost table for weighted accounting.
pub const CYCLE_COST_TABLE: &[(Opcode, u64)] = &[
    (Opcode::Halt, 12),
    (Opcode::Add, 3),
    (Opcode::Subtract, 3),
    (Opcode::Multiply, 6),
    (Opcode::Divide, 6),
    (Opcode::Move, 2),
    (Opcode::Branch, 2),
    (Opcode::BranchOnMinus, 4),
    (Opcode::BranchOnPlus, 4),
    (Opcode::BranchOnZero, 4),
    (Opcode::Push, 2),
    (Opcode::Pop, 2),
];

/// Looks up the weighted cycle cost for an opcode.
#[must_use]
pub fn cycle_cost(opcode: Opcode) -> Option<u64> {
    CYCLE_COST_TABLE
        .iter()
        .find_map(|(entry, cycles)| (*entry == opcode).then_some(*cycles))
}
