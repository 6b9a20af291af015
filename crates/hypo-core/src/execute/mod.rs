//! Instruction execution and the fetch-execute driver.
//!
//! Handlers resolve every operand first and only then check for errors, so an
//! instruction that fails still consumes its extension words and leaves `PC` on
//! the next instruction. Stack handlers validate all bounds before touching
//! memory or `SP`.

mod operand;

pub use operand::{
    fetch_extension_word, resolve_operand, write_operand, OperandLocation, ResolvedOperand,
};

use crate::decoder::{DecodedInstruction, Decoder};
use crate::encoding::Opcode;
use crate::memory::{
    checked_address, read_word, validate_branch_target, write_word, Word, LAST_ADDRESS,
};
use crate::{
    CoreConfig, CoreState, ErrorPolicy, FaultCode, FaultReason, RunOutcome, RunState, StepOutcome,
};

/// Successful result of executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecuteOutcome {
    /// Instruction completed; continue with the instruction at `PC`.
    Retired,
    /// Halt instruction; the run is over.
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOp {
    fn apply(self, lhs: Word, rhs: Word) -> Result<Word, FaultReason> {
        match self {
            Self::Add => Ok(lhs.wrapping_add(rhs)),
            Self::Sub => Ok(lhs.wrapping_sub(rhs)),
            Self::Mul => Ok(lhs.wrapping_mul(rhs)),
            Self::Div if rhs == 0 => Err(FaultCode::DivisionByZero.into()),
            Self::Div => Ok(lhs.wrapping_div(rhs)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BranchCondition {
    Minus,
    Plus,
    Zero,
}

impl BranchCondition {
    const fn holds(self, value: Word) -> bool {
        match self {
            Self::Minus => value < 0,
            Self::Plus => value > 0,
            Self::Zero => value == 0,
        }
    }
}

/// Executes one decoded instruction against `state`.
///
/// `PC` must already point past the instruction word.
///
/// # Errors
///
/// Returns the first error the handler detects. Side effects committed before
/// the error (operand register updates, consumed extension words) remain.
pub fn execute_instruction(
    opcode: Opcode,
    instr: &DecodedInstruction,
    state: &mut CoreState,
    config: &CoreConfig,
) -> Result<ExecuteOutcome, FaultReason> {
    match opcode {
        Opcode::Halt => return Ok(ExecuteOutcome::Halted),
        Opcode::Add => execute_arithmetic(instr, state, ArithmeticOp::Add)?,
        Opcode::Subtract => execute_arithmetic(instr, state, ArithmeticOp::Sub)?,
        Opcode::Multiply => execute_arithmetic(instr, state, ArithmeticOp::Mul)?,
        Opcode::Divide => execute_arithmetic(instr, state, ArithmeticOp::Div)?,
        Opcode::Move => execute_move(instr, state)?,
        Opcode::Branch => execute_branch(state)?,
        Opcode::BranchOnMinus => execute_branch_if(instr, state, BranchCondition::Minus)?,
        Opcode::BranchOnPlus => execute_branch_if(instr, state, BranchCondition::Plus)?,
        Opcode::BranchOnZero => execute_branch_if(instr, state, BranchCondition::Zero)?,
        Opcode::Push => execute_push(state, config)?,
        Opcode::Pop => execute_pop(state, config)?,
    }
    Ok(ExecuteOutcome::Retired)
}

fn execute_arithmetic(
    instr: &DecodedInstruction,
    state: &mut CoreState,
    op: ArithmeticOp,
) -> Result<(), FaultReason> {
    let op1 = resolve_operand(instr.op1, state);
    let op2 = resolve_operand(instr.op2, state);
    let (dest, src) = (op1?, op2?);

    let result = op.apply(dest.value, src.value)?;
    write_operand(state, dest.location, result)
}

fn execute_move(instr: &DecodedInstruction, state: &mut CoreState) -> Result<(), FaultReason> {
    let op1 = resolve_operand(instr.op1, state);
    let op2 = resolve_operand(instr.op2, state);
    let (dest, src) = (op1?, op2?);

    write_operand(state, dest.location, src.value)
}

fn execute_branch(state: &mut CoreState) -> Result<(), FaultReason> {
    let target = validate_branch_target(fetch_extension_word(state)?)?;
    state.arch.set_pc(target);
    Ok(())
}

fn execute_branch_if(
    instr: &DecodedInstruction,
    state: &mut CoreState,
    condition: BranchCondition,
) -> Result<(), FaultReason> {
    let op1 = resolve_operand(instr.op1, state);
    let target = fetch_extension_word(state);
    let value = op1?.value;
    let target = validate_branch_target(target?)?;

    if condition.holds(value) {
        state.arch.set_pc(target);
    }
    Ok(())
}

fn execute_push(state: &mut CoreState, config: &CoreConfig) -> Result<(), FaultReason> {
    let source = fetch_extension_word(state)?;
    let value = read_word(&state.memory, source)?;

    let sp = state.arch.sp();
    if sp <= config.stack_floor.max(0) {
        return Err(FaultReason::with_context(FaultCode::StackOverflow, sp));
    }
    write_word(&mut state.memory, sp, value)?;
    state.arch.set_sp(sp - 1);
    Ok(())
}

fn execute_pop(state: &mut CoreState, config: &CoreConfig) -> Result<(), FaultReason> {
    let dest = fetch_extension_word(state)?;
    checked_address(dest)?;

    let sp = state.arch.sp();
    if sp >= config.stack_top.min(LAST_ADDRESS) {
        return Err(FaultReason::with_context(FaultCode::StackUnderflow, sp));
    }
    let value = read_word(&state.memory, sp)?;
    write_word(&mut state.memory, dest, value)?;
    state.arch.set_sp(sp + 1);
    Ok(())
}

/// Executes exactly one fetch-execute cycle.
///
/// A machine that is already halted or faulted is left untouched and reported
/// as [`StepOutcome::Stopped`].
pub fn step_one(state: &mut CoreState, config: &CoreConfig) -> StepOutcome {
    if state.run_state.is_terminal() {
        return StepOutcome::Stopped {
            state: state.run_state,
        };
    }

    let pc = state.arch.pc();
    let word = match fetch_extension_word(state) {
        Ok(word) => word,
        Err(reason) => return latch(state, pc, None, reason),
    };
    state.arch.latch_fetch(pc, word);
    tracing::trace!(pc, word, "fetch");

    let instr = Decoder::decode(word);
    let Some(opcode) = instr.opcode() else {
        return latch(
            state,
            pc,
            None,
            FaultReason::with_context(FaultCode::UnknownOpcode, instr.opcode),
        );
    };

    let result = execute_instruction(opcode, &instr, state, config);
    let cycles = match result {
        Ok(_) => config.cycle_accounting.cycles_for(opcode),
        Err(_) => config.cycle_accounting.failed_cycles(),
    };
    state.arch.advance_clock(cycles);
    state.diag.increment_instruction_count();

    match result {
        Ok(ExecuteOutcome::Retired) => {
            tracing::debug!(
                pc,
                mnemonic = opcode.mnemonic(),
                next_pc = state.arch.pc(),
                "retired"
            );
            StepOutcome::Retired { pc, opcode, cycles }
        }
        Ok(ExecuteOutcome::Halted) => {
            state.run_state = RunState::Halted;
            tracing::info!(pc, clock = state.arch.clock(), "halted");
            StepOutcome::Halted { pc, cycles }
        }
        Err(reason) => match config.error_policy {
            ErrorPolicy::Continue => {
                state
                    .diag
                    .record_fault(reason.code(), pc, state.arch.clock());
                tracing::warn!(
                    pc,
                    mnemonic = opcode.mnemonic(),
                    %reason,
                    "instruction reported an error"
                );
                StepOutcome::Reported {
                    pc,
                    opcode,
                    cycles,
                    reason,
                }
            }
            ErrorPolicy::Halt => latch(state, pc, Some(opcode), reason),
        },
    }
}

fn latch(
    state: &mut CoreState,
    pc: Word,
    opcode: Option<Opcode>,
    reason: FaultReason,
) -> StepOutcome {
    state
        .diag
        .record_fault(reason.code(), pc, state.arch.clock());
    state.latch_fault(reason);
    tracing::error!(pc, %reason, "machine faulted");
    StepOutcome::Faulted { pc, opcode, reason }
}

/// Steps until the machine halts, faults or reaches `config.max_steps`.
pub fn run(state: &mut CoreState, config: &CoreConfig) -> RunOutcome {
    let mut outcome = RunOutcome {
        steps: 0,
        final_state: state.run_state,
        limit_reached: false,
        reports: Vec::new(),
        fault: None,
    };

    while !state.run_state.is_terminal() {
        if config.max_steps.is_some_and(|limit| outcome.steps >= limit) {
            outcome.limit_reached = true;
            break;
        }

        let step = step_one(state, config);
        outcome.steps += 1;
        match step.report() {
            Some(report) if step.is_running() => outcome.reports.push(report),
            Some(report) => outcome.fault = Some(report),
            None => {}
        }
    }

    outcome.final_state = state.run_state;
    outcome
}
