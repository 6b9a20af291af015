//! Diagnostic counters maintained by the fetch-execute driver.

use crate::memory::Word;
use crate::{FaultClass, FaultCode};

/// Core-owned diagnostic fields, updated on every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DiagCoreFields {
    /// The last fault reported or latched, if any.
    pub last_fault_code: Option<FaultCode>,
    /// Address of the instruction that raised the last fault.
    pub last_fault_pc: Word,
    /// Cycle counter value when the last fault was recorded.
    pub last_fault_clock: u64,
    /// Saturating counter for fetch-class faults.
    pub fault_count_fetch: u32,
    /// Saturating counter for decode-class faults.
    pub fault_count_decode: u32,
    /// Saturating counter for operand-class faults.
    pub fault_count_operand: u32,
    /// Saturating counter for arithmetic-class faults.
    pub fault_count_arithmetic: u32,
    /// Saturating counter for destination-class faults.
    pub fault_count_destination: u32,
    /// Saturating counter for stack-class faults.
    pub fault_count_stack: u32,
    /// Saturating counter for dispatched instructions.
    pub instruction_count: u64,
}

impl DiagCoreFields {
    /// Remembers `code` as the last fault and bumps its class counter.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_fault(&mut self, code: FaultCode, pc: Word, clock: u64) {
        self.last_fault_code = Some(code);
        self.last_fault_pc = pc;
        self.last_fault_clock = clock;
        let counter = match code.class() {
            FaultClass::Fetch => &mut self.fault_count_fetch,
            FaultClass::Decode => &mut self.fault_count_decode,
            FaultClass::Operand => &mut self.fault_count_operand,
            FaultClass::Arithmetic => &mut self.fault_count_arithmetic,
            FaultClass::Destination => &mut self.fault_count_destination,
            FaultClass::Stack => &mut self.fault_count_stack,
        };
        *counter = counter.saturating_add(1);
    }

    /// Returns the counter for one fault class.
    #[must_use]
    pub const fn fault_count(&self, class: FaultClass) -> u32 {
        match class {
            FaultClass::Fetch => self.fault_count_fetch,
            FaultClass::Decode => self.fault_count_decode,
            FaultClass::Operand => self.fault_count_operand,
            FaultClass::Arithmetic => self.fault_count_arithmetic,
            FaultClass::Destination => self.fault_count_destination,
            FaultClass::Stack => self.fault_count_stack,
        }
    }

    /// Sum of all fault class counters.
    #[must_use]
    pub fn total_faults(&self) -> u64 {
        FaultClass::ALL
            .iter()
            .map(|class| u64::from(self.fault_count(*class)))
            .sum()
    }

    /// Counts one dispatched instruction.
    pub const fn increment_instruction_count(&mut self) {
        self.instruction_count = self.instruction_count.saturating_add(1);
    }

    /// Clears every counter and the last fault.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
