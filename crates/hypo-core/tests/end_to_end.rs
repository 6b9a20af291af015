//! End-to-end program execution under both error policies.

use hypo_core::{
    run, step_one, CoreConfig, CoreState, CycleAccounting, ErrorPolicy, FaultClass, FaultCode,
    FaultReason, GeneralRegister, Opcode, RunState, StepOutcome, Word, INITIAL_STACK_POINTER,
    MEMORY_WORDS,
};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

fn load(image: &[(Word, Word)], entry: Word, config: &CoreConfig) -> CoreState {
    let mut state = CoreState::with_config(config);
    for (addr, value) in image {
        state.load_word(*addr, *value).expect("image address in memory");
    }
    state.start_at(entry).expect("entry in memory");
    state
}

fn strict() -> CoreConfig {
    CoreConfig {
        error_policy: ErrorPolicy::Halt,
        ..CoreConfig::default()
    }
}

const SAMPLE_IMAGE: [(Word, Word); 3] = [(0, 15_020), (1, 30), (2, 0)];

#[test]
fn sample_image_reports_bad_register_then_halts() {
    let config = CoreConfig::default();
    let mut state = load(&SAMPLE_IMAGE, 0, &config);
    let loaded = state.memory.clone();

    let outcome = run(&mut state, &config);

    assert_eq!(outcome.final_state, RunState::Halted);
    assert_eq!(outcome.steps, 2);
    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(outcome.reports[0].pc, 0);
    assert_eq!(outcome.reports[0].opcode, Some(Opcode::Add));
    assert_eq!(
        outcome.reports[0].reason,
        FaultReason::with_context(FaultCode::InvalidRegister, 0)
    );
    assert_eq!(state.arch.pc(), 3);
    assert_eq!(state.arch.clock(), 2);
    assert_eq!(state.arch.psr(), 0);
    assert_eq!(state.memory, loaded);
}

#[test]
fn sample_image_faults_under_halt_policy() {
    let config = strict();
    let mut state = load(&SAMPLE_IMAGE, 0, &config);

    let outcome = run(&mut state, &config);

    assert_eq!(
        outcome.final_state,
        RunState::Faulted(FaultCode::InvalidRegister)
    );
    assert_eq!(outcome.steps, 1);
    assert_eq!(state.arch.psr(), 0x03);
    assert_eq!(state.arch.pc(), 2);
    assert_eq!(state.diag.last_fault_pc, 0);
}

#[test]
fn halt_word_alone_runs_one_cycle() {
    let config = CoreConfig::default();
    let mut state = load(&[(0, 0)], 0, &config);

    let outcome = run(&mut state, &config);

    assert_eq!(outcome.final_state, RunState::Halted);
    assert_eq!(state.arch.clock(), 1);
    assert!(outcome.reports.is_empty());
    assert_eq!(outcome.fault, None);
}

#[test]
fn move_immediate_then_halt_sets_only_that_register() {
    let config = CoreConfig::default();
    // MOVE R6 <- #-250 ; HALT
    let mut state = load(&[(10, 51_660), (11, -250), (12, 0)], 10, &config);

    run(&mut state, &config);

    for reg in GeneralRegister::ALL {
        let expected = if reg == GeneralRegister::R6 { -250 } else { 0 };
        assert_eq!(state.arch.gpr(reg), expected, "{reg:?}");
    }
    assert_eq!(state.arch.pc(), 13);
}

#[test]
fn out_of_bounds_branch_reports_and_falls_through() {
    let config = CoreConfig::default();
    // BR 10000 ; HALT
    let mut state = load(&[(0, 60_000), (1, MEMORY_WORDS), (2, 0)], 0, &config);

    let first = step_one(&mut state, &config);
    assert_eq!(
        first,
        StepOutcome::Reported {
            pc: 0,
            opcode: Opcode::Branch,
            cycles: 1,
            reason: FaultReason::with_context(FaultCode::InvalidBranchTarget, MEMORY_WORDS),
        }
    );
    assert_eq!(state.arch.pc(), 2);

    let outcome = run(&mut state, &config);
    assert_eq!(outcome.final_state, RunState::Halted);
}

#[test]
fn out_of_bounds_branch_faults_under_halt_policy() {
    let config = strict();
    let mut state = load(&[(0, 60_000), (1, -1), (2, 0)], 0, &config);

    let outcome = run(&mut state, &config);

    assert_eq!(
        outcome.final_state,
        RunState::Faulted(FaultCode::InvalidBranchTarget)
    );
    assert_eq!(state.arch.psr(), 0x06);
}

#[test]
fn countdown_loop_terminates() {
    let config = CoreConfig::default();
    let image = [
        (0, 51_160), // MOVE R1 <- #5
        (1, 5),
        (2, 21_160), // SUB R1 <- #1
        (3, 1),
        (4, 81_100), // BRPLUS R1, 2
        (5, 2),
        (6, 0), // HALT
    ];
    let mut state = load(&image, 0, &config);

    let outcome = run(&mut state, &config);

    assert_eq!(outcome.final_state, RunState::Halted);
    assert_eq!(outcome.steps, 12);
    assert_eq!(state.arch.gpr(GeneralRegister::R1), 0);
    assert_eq!(state.arch.clock(), 12);
    assert_eq!(state.arch.pc(), 7);
    assert_eq!(state.diag.instruction_count, 12);
}

#[test]
fn autoincrement_walks_an_array() {
    let config = CoreConfig::default();
    let image = [
        (0, 51_260), // MOVE R2 <- #100
        (1, 100),
        (2, 11_132), // ADD R1 <- (R2)+
        (3, 11_132),
        (4, 11_132),
        (5, 0),
        (100, 4),
        (101, 5),
        (102, 6),
    ];
    let mut state = load(&image, 0, &config);

    run(&mut state, &config);

    assert_eq!(state.arch.gpr(GeneralRegister::R1), 15);
    assert_eq!(state.arch.gpr(GeneralRegister::R2), 103);
}

#[test]
fn autodecrement_reads_below_register() {
    let config = CoreConfig::default();
    // MOVE R3 <- #50 ; MOVE R4 <- -(R3) ; HALT
    let image = [(0, 51_360), (1, 50), (2, 51_443), (3, 0), (49, 8)];
    let mut state = load(&image, 0, &config);

    run(&mut state, &config);

    assert_eq!(state.arch.gpr(GeneralRegister::R4), 8);
    assert_eq!(state.arch.gpr(GeneralRegister::R3), 49);
}

#[test]
fn pop_copies_the_slot_at_sp_before_moving_up() {
    let config = CoreConfig::default();
    let image = [
        (0, 100_000), // PUSH 500
        (1, 500),
        (2, 100_000), // PUSH 501
        (3, 501),
        (4, 110_000), // POP 600
        (5, 600),
        (6, 110_000), // POP 601
        (7, 601),
        (8, 0),
        (500, 11),
        (501, 22),
        (9_997, 33),
    ];
    let mut state = load(&image, 0, &config);

    let outcome = run(&mut state, &config);

    assert!(outcome.reports.is_empty());
    assert_eq!(state.memory[9_999], 11);
    assert_eq!(state.memory[9_998], 22);
    // SP names the next free slot, so each pop reads the word just below it.
    assert_eq!(state.memory[600], 33);
    assert_eq!(state.memory[601], 22);
    assert_eq!(state.arch.sp(), INITIAL_STACK_POINTER);
}

#[test]
fn push_past_configured_floor_overflows() {
    let config = CoreConfig {
        stack_floor: 9_997,
        ..CoreConfig::default()
    };
    let image = [
        (0, 100_000),
        (1, 500),
        (2, 100_000),
        (3, 500),
        (4, 100_000),
        (5, 500),
        (6, 0),
        (500, 1),
    ];
    let mut state = load(&image, 0, &config);

    let outcome = run(&mut state, &config);

    assert_eq!(outcome.final_state, RunState::Halted);
    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(
        outcome.reports[0].reason,
        FaultReason::with_context(FaultCode::StackOverflow, 9_997)
    );
    assert_eq!(state.arch.sp(), 9_997);
    assert_eq!(state.memory[9_997], 0);
    assert_eq!(state.diag.fault_count(FaultClass::Stack), 1);
}

#[test]
fn running_off_the_end_of_memory_faults() {
    let config = CoreConfig::default();
    // MOVE R1 <- #1 at the last two words; the next fetch is outside memory.
    let mut state = load(&[(9_998, 51_160), (9_999, 1)], 9_998, &config);

    let outcome = run(&mut state, &config);

    assert_eq!(
        outcome.final_state,
        RunState::Faulted(FaultCode::InvalidProgramCounter)
    );
    assert_eq!(state.arch.gpr(GeneralRegister::R1), 1);
    assert_eq!(outcome.fault.map(|fault| fault.pc), Some(MEMORY_WORDS));
}

#[test]
fn weighted_clock_sums_instruction_costs() {
    let config = CoreConfig {
        cycle_accounting: CycleAccounting::Weighted,
        ..CoreConfig::default()
    };
    // ADD R1 <- #2 ; MUL R1 <- #3 ; HALT
    let image = [(0, 11_160), (1, 2), (2, 31_160), (3, 3), (4, 0)];
    let mut state = load(&image, 0, &config);

    run(&mut state, &config);

    assert_eq!(state.arch.gpr(GeneralRegister::R1), 6);
    assert_eq!(state.arch.clock(), 3 + 6 + 12);
}

#[test]
fn independent_machines_do_not_share_state() {
    let config = CoreConfig::default();
    let mut first = load(&[(0, 51_160), (1, 1), (2, 0)], 0, &config);
    let mut second = load(&[(0, 51_160), (1, 2), (2, 0)], 0, &config);

    run(&mut first, &config);
    run(&mut second, &config);

    assert_eq!(first.arch.gpr(GeneralRegister::R1), 1);
    assert_eq!(second.arch.gpr(GeneralRegister::R1), 2);
}
