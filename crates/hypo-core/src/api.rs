//! Public host-facing API contracts for embedding the execution engine.

use std::fmt;

use thiserror::Error;

use crate::encoding::Opcode;
use crate::memory::{
    new_address_space, validate_fetch_address, write_word, Word, LAST_ADDRESS, MEMORY_SIZE,
};
use crate::{
    ArchitecturalState, CycleAccounting, DiagCoreFields, FaultReason, RunState,
    GENERAL_REGISTER_COUNT, INITIAL_STACK_POINTER,
};

/// What the driver does with an error reported by an instruction handler.
///
/// Fetch and decode faults end the run under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ErrorPolicy {
    /// Report the error and continue with the next instruction.
    #[default]
    Continue,
    /// Latch the error into `PSR` and stop the run.
    Halt,
}

/// Top-level immutable configuration for a machine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// Handling of per-instruction errors.
    pub error_policy: ErrorPolicy,
    /// Cycle counter accounting mode.
    pub cycle_accounting: CycleAccounting,
    /// Lowest stack pointer value; a push requires `SP > stack_floor`.
    pub stack_floor: Word,
    /// Initial stack pointer; a pop requires `SP < stack_top`.
    pub stack_top: Word,
    /// Upper bound on steps executed by a single [`crate::run`] call.
    pub max_steps: Option<u64>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::Continue,
            cycle_accounting: CycleAccounting::PerInstruction,
            stack_floor: 0,
            stack_top: INITIAL_STACK_POINTER,
            max_steps: None,
        }
    }
}

/// Rejected [`CoreConfig`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Stack top does not address a memory word.
    #[error("stack top {0} is outside memory")]
    StackTopOutOfRange(Word),
    /// Stack floor is negative or not below the stack top.
    #[error("stack floor {floor} must be non-negative and below stack top {top}")]
    StackFloorOutOfRange {
        /// Configured floor.
        floor: Word,
        /// Configured top.
        top: Word,
    },
    /// A step limit of zero would never execute anything.
    #[error("step limit must be at least 1")]
    ZeroStepLimit,
}

impl CoreConfig {
    /// Checks that the stack bounds fit in memory and the step limit is usable.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.stack_top < 0 || self.stack_top > LAST_ADDRESS {
            return Err(ConfigError::StackTopOutOfRange(self.stack_top));
        }
        if self.stack_floor < 0 || self.stack_floor >= self.stack_top {
            return Err(ConfigError::StackFloorOutOfRange {
                floor: self.stack_floor,
                top: self.stack_top,
            });
        }
        if matches!(self.max_steps, Some(0)) {
            return Err(ConfigError::ZeroStepLimit);
        }
        Ok(())
    }

    /// Stack pointer value installed at reset, clamped into memory.
    #[must_use]
    pub const fn initial_stack_pointer(&self) -> Word {
        if self.stack_top < 0 {
            0
        } else if self.stack_top > LAST_ADDRESS {
            LAST_ADDRESS
        } else {
            self.stack_top
        }
    }
}

/// Complete machine state: register file, memory, run state and diagnostics.
///
/// Each instance owns its memory exclusively; independent instances never
/// share state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreState {
    /// Architectural register file and special registers.
    pub arch: ArchitecturalState,
    /// Flat word memory image.
    pub memory: Box<[Word]>,
    /// Current execution state.
    pub run_state: RunState,
    /// Driver-maintained fault and instruction counters.
    pub diag: DiagCoreFields,
}

impl Default for CoreState {
    fn default() -> Self {
        Self::with_config(&CoreConfig::default())
    }
}

impl CoreState {
    /// Creates a zeroed machine whose stack pointer follows `config`.
    #[must_use]
    pub fn with_config(config: &CoreConfig) -> Self {
        Self {
            arch: ArchitecturalState::with_stack_pointer(config.initial_stack_pointer()),
            memory: new_address_space(),
            run_state: RunState::Running,
            diag: DiagCoreFields::default(),
        }
    }

    /// Restores registers, run state and diagnostics to their reset values.
    ///
    /// Memory is preserved so a loaded image can be re-run.
    pub fn reset(&mut self, config: &CoreConfig) {
        self.arch = ArchitecturalState::with_stack_pointer(config.initial_stack_pointer());
        self.run_state = RunState::Running;
        self.diag.reset();
    }

    /// Stores one word of a program image.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FaultCode::InvalidAddress`] when `addr` is outside
    /// memory.
    pub fn load_word(&mut self, addr: Word, value: Word) -> Result<(), FaultReason> {
        write_word(&mut self.memory, addr, value)
    }

    /// Points `PC` at a program entry and marks the machine running.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FaultCode::InvalidProgramCounter`] when `entry` is
    /// outside memory; state is unchanged.
    pub fn start_at(&mut self, entry: Word) -> Result<(), FaultReason> {
        validate_fetch_address(entry)?;
        self.arch.set_pc(entry);
        self.run_state = RunState::Running;
        Ok(())
    }

    /// Records a run-ending fault in the run state and `PSR`.
    pub fn latch_fault(&mut self, reason: FaultReason) {
        self.run_state = RunState::Faulted(reason.code());
        self.arch.set_psr(Word::from(reason.code().as_u8()));
    }

    /// Returns a contiguous memory window, clipped to capacity.
    #[must_use]
    pub fn memory_window(&self, start: usize, len: usize) -> &[Word] {
        let begin = start.min(MEMORY_SIZE);
        let end = start.saturating_add(len).min(MEMORY_SIZE);
        &self.memory[begin..end]
    }

    /// Takes a read-only snapshot of registers and a memory window.
    #[must_use]
    pub fn dump(&self, start: usize, len: usize) -> MachineDump {
        MachineDump {
            pc: self.arch.pc(),
            sp: self.arch.sp(),
            psr: self.arch.psr(),
            clock: self.arch.clock(),
            gprs: *self.arch.gprs(),
            run_state: self.run_state,
            window_start: start.min(MEMORY_SIZE),
            memory: self.memory_window(start, len).to_vec(),
        }
    }
}

/// Read-only machine snapshot consumed by state reporters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineDump {
    /// Program counter.
    pub pc: Word,
    /// Stack pointer.
    pub sp: Word,
    /// Status register.
    pub psr: Word,
    /// Cycle counter.
    pub clock: u64,
    /// General-purpose registers `R1..R8`.
    pub gprs: [Word; GENERAL_REGISTER_COUNT],
    /// Run state at snapshot time.
    pub run_state: RunState,
    /// Address of the first word in `memory`.
    pub window_start: usize,
    /// Memory words starting at `window_start`.
    pub memory: Vec<Word>,
}

/// Result of one fetch-execute cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Instruction completed without error.
    Retired {
        /// Address the instruction was fetched from.
        pc: Word,
        /// Dispatched opcode.
        opcode: Opcode,
        /// Cycles charged.
        cycles: u64,
    },
    /// Instruction reported an error; execution continues with the next one.
    Reported {
        /// Address the instruction was fetched from.
        pc: Word,
        /// Dispatched opcode.
        opcode: Opcode,
        /// Cycles charged.
        cycles: u64,
        /// Reported error.
        reason: FaultReason,
    },
    /// A halt instruction retired.
    Halted {
        /// Address of the halt instruction.
        pc: Word,
        /// Cycles charged.
        cycles: u64,
    },
    /// A fault ended the run.
    Faulted {
        /// Address of the faulting instruction.
        pc: Word,
        /// Opcode being executed, absent for fetch and decode faults.
        opcode: Option<Opcode>,
        /// Latched fault.
        reason: FaultReason,
    },
    /// The machine was already halted or faulted; nothing executed.
    Stopped {
        /// Terminal run state.
        state: RunState,
    },
}

impl StepOutcome {
    /// Returns true if the machine can execute another step.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Retired { .. } | Self::Reported { .. })
    }

    /// Returns the reported or latched fault with the instruction that raised it.
    #[must_use]
    pub const fn report(&self) -> Option<FaultReport> {
        match *self {
            Self::Reported {
                pc, opcode, reason, ..
            } => Some(FaultReport {
                pc,
                opcode: Some(opcode),
                reason,
            }),
            Self::Faulted { pc, opcode, reason } => Some(FaultReport { pc, opcode, reason }),
            Self::Retired { .. } | Self::Halted { .. } | Self::Stopped { .. } => None,
        }
    }
}

/// An error observed during a run, with the instruction that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FaultReport {
    /// Address of the instruction that raised the error.
    pub pc: Word,
    /// Opcode being executed, absent for fetch and decode faults.
    pub opcode: Option<Opcode>,
    /// Reported error.
    pub reason: FaultReason,
}

impl fmt::Display for FaultReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Some(opcode) => write!(f, "pc {}: {}: {}", self.pc, opcode.mnemonic(), self.reason),
            None => write!(f, "pc {}: {}", self.pc, self.reason),
        }
    }
}

/// Aggregated outcome of running until a terminal state or the step limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Number of steps executed by this call.
    pub steps: u64,
    /// Run state when the call returned.
    pub final_state: RunState,
    /// True when the configured step limit stopped the run.
    pub limit_reached: bool,
    /// Errors reported and tolerated under [`ErrorPolicy::Continue`].
    pub reports: Vec<FaultReport>,
    /// The fault that ended the run, if it ended in [`RunState::Faulted`].
    pub fault: Option<FaultReport>,
}
