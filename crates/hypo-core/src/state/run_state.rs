use crate::FaultCode;

/// Execution-state machine for the fetch-execute driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to fetch the next instruction.
    #[default]
    Running,
    /// A halt instruction retired; terminal for the run.
    Halted,
    /// A fault ended the run; terminal until reset.
    Faulted(FaultCode),
}

impl RunState {
    /// Returns the fault that ended the run, if this state is faulted.
    #[must_use]
    pub const fn fault(self) -> Option<FaultCode> {
        match self {
            Self::Faulted(cause) => Some(cause),
            Self::Running | Self::Halted => None,
        }
    }

    /// Returns `true` once no further instruction will execute.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::RunState;
    use crate::FaultCode;

    #[test]
    fn run_state_default_is_running() {
        assert_eq!(RunState::default(), RunState::Running);
        assert!(!RunState::Running.is_terminal());
    }

    #[test]
    fn halted_and_faulted_are_terminal() {
        assert!(RunState::Halted.is_terminal());
        assert!(RunState::Faulted(FaultCode::UnknownOpcode).is_terminal());
    }

    #[test]
    fn fault_accessor_reports_only_faulted_variant() {
        assert_eq!(RunState::Running.fault(), None);
        assert_eq!(RunState::Halted.fault(), None);
        assert_eq!(
            RunState::Faulted(FaultCode::InvalidProgramCounter).fault(),
            Some(FaultCode::InvalidProgramCounter)
        );
    }
}
