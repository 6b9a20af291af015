//! Architectural CPU state model primitives.

/// Architectural register file types and storage model.
pub mod registers;
/// Fetch-execute run-state machine.
pub mod run_state;

pub use registers::{
    ArchitecturalState, GeneralRegister, GENERAL_REGISTER_COUNT, INITIAL_STACK_POINTER,
};
pub use run_state::RunState;
