use crate::memory::{Word, LAST_ADDRESS};

/// Number of architecturally visible general-purpose registers (`R1..R8`).
pub const GENERAL_REGISTER_COUNT: usize = 8;

/// Stack pointer value after reset: the top word of memory.
pub const INITIAL_STACK_POINTER: Word = LAST_ADDRESS;

/// Architecturally visible general-purpose register identifier.
///
/// Instruction encodings select registers with the digits `1..=8`; the
/// register file stores them in slots `0..=7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum GeneralRegister {
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
    R8 = 8,
}

impl GeneralRegister {
    /// Ordered list of all architectural general-purpose registers.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
        Self::R8,
    ];

    /// Returns the register-file slot for this register (`0..=7`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Returns the encoded selector digit for this register (`1..=8`).
    #[must_use]
    pub const fn selector(self) -> Word {
        self as Word
    }

    /// Decodes an instruction register field into an architectural register.
    #[must_use]
    pub const fn from_selector(selector: Word) -> Option<Self> {
        match selector {
            1 => Some(Self::R1),
            2 => Some(Self::R2),
            3 => Some(Self::R3),
            4 => Some(Self::R4),
            5 => Some(Self::R5),
            6 => Some(Self::R6),
            7 => Some(Self::R7),
            8 => Some(Self::R8),
            _ => None,
        }
    }
}

/// Full architectural register state of the HYPO machine.
///
/// `MAR`, `MBR` and `IR` are the fetch latches: they mirror the last fetch and
/// never influence execution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArchitecturalState {
    gpr: [Word; GENERAL_REGISTER_COUNT],
    pc: Word,
    sp: Word,
    psr: Word,
    mar: Word,
    mbr: Word,
    ir: Word,
    clock: u64,
}

impl Default for ArchitecturalState {
    fn default() -> Self {
        Self::with_stack_pointer(INITIAL_STACK_POINTER)
    }
}

impl ArchitecturalState {
    /// Creates a reset register file with a specific initial stack pointer.
    #[must_use]
    pub const fn with_stack_pointer(sp: Word) -> Self {
        Self {
            gpr: [0; GENERAL_REGISTER_COUNT],
            pc: 0,
            sp,
            psr: 0,
            mar: 0,
            mbr: 0,
            ir: 0,
            clock: 0,
        }
    }

    /// Reads a general-purpose register.
    #[must_use]
    pub const fn gpr(&self, reg: GeneralRegister) -> Word {
        self.gpr[reg.index()]
    }

    /// Writes a general-purpose register.
    pub const fn set_gpr(&mut self, reg: GeneralRegister, value: Word) {
        self.gpr[reg.index()] = value;
    }

    /// Returns the whole general-purpose register file in selector order.
    #[must_use]
    pub const fn gprs(&self) -> &[Word; GENERAL_REGISTER_COUNT] {
        &self.gpr
    }

    /// Reads the `PC` register.
    #[must_use]
    pub const fn pc(&self) -> Word {
        self.pc
    }

    /// Writes the `PC` register.
    pub const fn set_pc(&mut self, value: Word) {
        self.pc = value;
    }

    /// Reads the `SP` register.
    #[must_use]
    pub const fn sp(&self) -> Word {
        self.sp
    }

    /// Writes the `SP` register.
    pub const fn set_sp(&mut self, value: Word) {
        self.sp = value;
    }

    /// Reads the `PSR` status register (0 when no fault is latched).
    #[must_use]
    pub const fn psr(&self) -> Word {
        self.psr
    }

    /// Writes the `PSR` status register.
    pub const fn set_psr(&mut self, value: Word) {
        self.psr = value;
    }

    /// Reads the memory address latch.
    #[must_use]
    pub const fn mar(&self) -> Word {
        self.mar
    }

    /// Reads the memory buffer latch.
    #[must_use]
    pub const fn mbr(&self) -> Word {
        self.mbr
    }

    /// Reads the instruction latch.
    #[must_use]
    pub const fn ir(&self) -> Word {
        self.ir
    }

    /// Records a fetch in the `MAR`/`MBR`/`IR` latches.
    pub const fn latch_fetch(&mut self, addr: Word, word: Word) {
        self.mar = addr;
        self.mbr = word;
        self.ir = word;
    }

    /// Reads the cycle counter.
    #[must_use]
    pub const fn clock(&self) -> u64 {
        self.clock
    }

    /// Advances the cycle counter, saturating at `u64::MAX`.
    pub const fn advance_clock(&mut self, cycles: u64) {
        self.clock = self.clock.saturating_add(cycles);
    }
}
