//! Text and JSON renderings of a [`MachineDump`].

use std::fmt;

use hypo_core::{FaultCode, GeneralRegister, MachineDump};
use serde::Serialize;

/// First memory address shown by default.
pub const DEFAULT_DUMP_START: usize = 0;

/// Number of memory words shown by default.
pub const DEFAULT_DUMP_LEN: usize = 100;

const WORDS_PER_ROW: usize = 10;

/// Fixed-width text dump with a title line.
///
/// Layout: title, `PC | Clock | SP`, `PSR`, a GPR header row and value row, a
/// dashed rule, then rows of ten memory words prefixed by their address. A
/// nonzero `PSR` is followed by the name of the latched fault.
#[derive(Debug, Clone, Copy)]
pub struct TextDump<'a> {
    /// Heading printed on the first line.
    pub title: &'a str,
    /// Snapshot to render.
    pub dump: &'a MachineDump,
}

impl fmt::Display for TextDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dump = self.dump;
        writeln!(f, "{}", self.title)?;
        writeln!(f, "PC: {} | Clock: {} | SP: {}", dump.pc, dump.clock, dump.sp)?;
        write!(f, "PSR: {}", dump.psr)?;
        if let Some(code) = u8::try_from(dump.psr).ok().and_then(FaultCode::from_u8) {
            write!(f, " ({code})")?;
        }
        writeln!(f)?;

        write!(f, "{:>4}: ", "GPRs")?;
        for reg in GeneralRegister::ALL {
            write!(f, "{:>5}{} ", "GPR", reg.selector())?;
        }
        writeln!(f)?;

        write!(f, "{:>4} ", " ")?;
        for value in &dump.gprs {
            write!(f, "{value:>6} ")?;
        }
        writeln!(f)?;

        write!(f, "{:>4} ", " ")?;
        for _ in 0..WORDS_PER_ROW {
            write!(f, "------")?;
        }
        writeln!(f)?;

        for (row, words) in dump.memory.chunks(WORDS_PER_ROW).enumerate() {
            write!(f, "{:>4}: ", dump.window_start + row * WORDS_PER_ROW)?;
            for word in words {
                write!(f, "{word:>6} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Renders a titled dump as text.
#[must_use]
pub fn render_text(title: &str, dump: &MachineDump) -> String {
    TextDump { title, dump }.to_string()
}

#[derive(Serialize)]
struct JsonDump<'a> {
    title: &'a str,
    #[serde(flatten)]
    dump: &'a MachineDump,
}

/// Renders a titled dump as a single-line JSON object.
///
/// # Errors
///
/// Returns the serializer error if encoding fails.
pub fn render_json(title: &str, dump: &MachineDump) -> Result<String, serde_json::Error> {
    serde_json::to_string(&JsonDump { title, dump })
}

#[cfg(test)]
mod tests {
    use hypo_core::{CoreState, FaultCode, FaultReason, GeneralRegister};

    use super::{render_json, render_text};

    fn sample_state() -> CoreState {
        let mut state = CoreState::default();
        state.memory[0] = 15_020;
        state.memory[1] = 30;
        state.memory[12] = -4;
        state.arch.set_gpr(GeneralRegister::R2, 17);
        state.arch.set_pc(3);
        state.arch.advance_clock(2);
        state
    }

    #[test]
    fn text_dump_matches_fixed_layout() {
        let state = sample_state();
        let text = render_text("After Loading Program", &state.dump(0, 20));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "After Loading Program");
        assert_eq!(lines[1], "PC: 3 | Clock: 2 | SP: 9999");
        assert_eq!(lines[2], "PSR: 0");
        assert_eq!(
            lines[3],
            "GPRs:   GPR1   GPR2   GPR3   GPR4   GPR5   GPR6   GPR7   GPR8 "
        );
        assert_eq!(
            lines[4],
            "          0     17      0      0      0      0      0      0 "
        );
        assert_eq!(lines[5], format!("     {}", "-".repeat(60)));
        assert_eq!(
            lines[6],
            "   0:  15020     30      0      0      0      0      0      0      0      0 "
        );
        assert_eq!(
            lines[7],
            "  10:      0      0     -4      0      0      0      0      0      0      0 "
        );
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn text_dump_names_latched_fault() {
        let mut state = CoreState::default();
        state.latch_fault(FaultReason::new(FaultCode::DivisionByZero));

        let text = render_text("After Executing Program", &state.dump(0, 10));
        assert_eq!(text.lines().nth(2), Some("PSR: 7 (division by zero)"));
    }

    #[test]
    fn text_dump_rows_follow_window_start_and_clip() {
        let state = CoreState::default();
        let text = render_text("tail", &state.dump(9_990, 100));
        let rows: Vec<&str> = text.lines().skip(6).collect();

        assert_eq!(rows.len(), 1);
        assert!(rows[0].starts_with("9990: "));
    }

    #[test]
    fn json_dump_carries_title_and_registers() {
        let state = sample_state();
        let json = render_json("After Executing Program", &state.dump(0, 2)).expect("encodes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

        assert_eq!(value["title"], "After Executing Program");
        assert_eq!(value["pc"], 3);
        assert_eq!(value["gprs"][1], 17);
        assert_eq!(value["memory"], serde_json::json!([15_020, 30]));
        assert_eq!(value["run_state"], "Running");
    }
}
