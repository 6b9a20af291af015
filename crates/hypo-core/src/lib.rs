//! Execution engine for the HYPO decimal instruction-set machine.

/// Memory model primitives for the flat word-addressed store.
pub mod memory;
pub use memory::{
    checked_address, new_address_space, read_word, validate_branch_target,
    validate_fetch_address, write_word, Word, LAST_ADDRESS, MEMORY_SIZE, MEMORY_WORDS,
};

/// Diagnostic counters maintained by the fetch-execute driver.
pub mod diag;
pub use diag::DiagCoreFields;

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    ConfigError, CoreConfig, CoreState, ErrorPolicy, FaultReport, MachineDump, RunOutcome,
    StepOutcome,
};

/// Architectural CPU state model primitives.
pub mod state;
pub use state::{
    ArchitecturalState, GeneralRegister, RunState, GENERAL_REGISTER_COUNT, INITIAL_STACK_POINTER,
};

/// Opcode and addressing-mode classification tables.
pub mod encoding;
pub use encoding::{AddressingMode, Opcode, OPCODE_TABLE};

/// Instruction decoder for packed decimal instruction words.
pub mod decoder;
pub use decoder::{DecodedInstruction, Decoder, OperandField};

/// Fault taxonomy for fetch, decode and execution errors.
pub mod fault;
pub use fault::{FaultClass, FaultCode, FaultReason};

/// Cycle accounting modes and the weighted cost table.
pub mod timing;
pub use timing::{cycle_cost, CycleAccounting, CYCLE_COST_TABLE};

/// Instruction execution pipeline and fetch-execute driver.
pub mod execute;
pub use execute::{
    execute_instruction, fetch_extension_word, resolve_operand, run, step_one, write_operand,
    ExecuteOutcome, OperandLocation, ResolvedOperand,
};

#[cfg(test)]
use proptest as _;
