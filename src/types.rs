//! This module defines the core data structures and types used throughout the simulator,
//! including parsed rules, directions, run status, verdicts, engine configuration and the
//! compile/runtime error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::parser::Rule;

/// The symbol stored in every tape cell that was never written. It is also a valid
/// read/write token in rules.
pub const BLANK_SYMBOL: char = '_';
/// The state every run starts in.
pub const START_STATE: &str = "q0";
/// The accepting halt state. Reaching it ends the run as accepted.
pub const ACCEPT_STATE: &str = "ha";
/// The conventional rejecting halt state. It has no special handling: a run rejects there
/// because no rule leaves it.
pub const REJECT_STATE: &str = "hr";
/// The maximum allowed size for a program source in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// Default number of snapshots kept for stepping backwards.
pub const DEFAULT_HISTORY_CAPACITY: usize = 2000;
/// Maximum number of transitions the fast evaluator performs before giving up.
pub const MAX_BATCH_STEPS: usize = 5000;

/// A single parsed line of a program.
///
/// `line` is the zero-based index of the source line the rule came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRule {
    pub from: String,
    pub read: char,
    pub write: char,
    pub direction: Direction,
    pub to: String,
    pub line: usize,
}

impl SourceRule {
    /// Human-readable summary used as the diagram edge label, e.g. `a/_,R`.
    pub fn label(&self) -> String {
        format!("{}/{},{}", self.read, self.write, self.direction)
    }
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Applies the move to `head`, returning `None` when it would cross the left end of the
    /// tape or run past the last addressable cell.
    pub fn apply(self, head: usize) -> Option<usize> {
        match self {
            Direction::Left => head.checked_sub(1),
            Direction::Right => head.checked_add(1),
            Direction::Stay => Some(head),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'S',
        };
        write!(f, "{c}")
    }
}

/// Run status of the execution engine.
///
/// `Running` and `Paused` only exist for interactive use; the fast evaluator never
/// produces them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Idle,
    Running,
    Paused,
    Accepted,
    Rejected,
}

impl Status {
    /// Returns true for `Accepted` and `Rejected`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Accepted | Status::Rejected)
    }
}

/// Final outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Accepted,
    Rejected,
}

impl From<Verdict> for Status {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accepted => Status::Accepted,
            Verdict::Rejected => Status::Rejected,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "ACCEPTED"),
            Verdict::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Represents the outcome of an engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A transition was applied and the run goes on.
    Continue,
    /// The run is over, either by this step or an earlier one.
    Halt(Verdict),
}

/// Tunables for the execution engine and the fast evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How many snapshots are kept for stepping backwards. The oldest is dropped first.
    pub history_capacity: usize,
    /// Transition budget for bulk runs. Runs that exceed it are rejected.
    pub max_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_steps: MAX_BATCH_STEPS,
        }
    }
}

impl EngineConfig {
    /// Reads a configuration from JSON. Missing fields fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Errors raised while turning source text into a transition table.
///
/// Compilation is all-or-nothing: any of these discards the whole candidate table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// A line does not follow `<state> <read>/<write>,<move> <next>`.
    #[error("Syntax error: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),
    /// The source holds no rules at all (empty or comments only).
    #[error("No valid states found")]
    NoValidStates,
    /// Two rules share the same state and read symbol.
    #[error("Duplicate transition for ({state}, {symbol}) on line {line}")]
    DuplicateTransition {
        state: String,
        symbol: char,
        line: usize,
    },
    /// The source is larger than `MAX_PROGRAM_SIZE`.
    #[error("Program too large: {0} bytes (limit {limit})", limit = MAX_PROGRAM_SIZE)]
    ProgramTooLarge(usize),
}

impl CompileError {
    /// One-based source line the error points at, when there is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            CompileError::Syntax(e) => match e.line_col {
                pest::error::LineColLocation::Pos((line, _)) => Some(line),
                pest::error::LineColLocation::Span((line, _), _) => Some(line),
            },
            CompileError::DuplicateTransition { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Conditions that end a run as rejected.
///
/// These are recorded on the machine as its last error; they never escape as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum RuntimeError {
    /// No rule for the current state and symbol, and the state is not `ha`.
    #[error("No transition for ({state}, {symbol})")]
    MissingTransition { state: String, symbol: char },
    /// A rule tried to move the head left of cell 0.
    #[error("Crash: head moved past the left end of the tape in state {state}")]
    TapeBoundary { state: String },
    /// A rule tried to move the head right of the last addressable cell.
    #[error("Crash: head moved past the right end of the tape in state {state}")]
    HeadOverflow { state: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        assert_eq!(left_json, "\"Left\"");

        let deserialized: Direction = serde_json::from_str(&left_json).unwrap();
        assert_eq!(deserialized, Direction::Left);
    }

    #[test]
    fn test_direction_apply() {
        assert_eq!(Direction::Left.apply(0), None);
        assert_eq!(Direction::Left.apply(3), Some(2));
        assert_eq!(Direction::Right.apply(0), Some(1));
        assert_eq!(Direction::Right.apply(usize::MAX), None);
        assert_eq!(Direction::Stay.apply(7), Some(7));
    }

    #[test]
    fn test_rule_label() {
        let rule = SourceRule {
            from: "q0".into(),
            read: 'a',
            write: BLANK_SYMBOL,
            direction: Direction::Right,
            to: "q1".into(),
            line: 0,
        };

        assert_eq!(rule.label(), "a/_,R");
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&Status::Accepted).unwrap(),
            "\"ACCEPTED\""
        );
        assert!(Status::Rejected.is_terminal());
        assert!(!Status::Paused.is_terminal());
        assert_eq!(Status::from(Verdict::Rejected), Status::Rejected);
    }

    #[test]
    fn test_engine_config_from_json() {
        let config = EngineConfig::from_json(r#"{ "history_capacity": 3 }"#).unwrap();
        assert_eq!(config.history_capacity, 3);
        assert_eq!(config.max_steps, MAX_BATCH_STEPS);
    }

    #[test]
    fn test_error_display() {
        let error = RuntimeError::MissingTransition {
            state: "q3".to_string(),
            symbol: 'b',
        };

        assert_eq!(error.to_string(), "No transition for (q3, b)");
        assert_eq!(CompileError::NoValidStates.to_string(), "No valid states found");
    }
}
