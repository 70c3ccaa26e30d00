//! This module provides non-fatal checks over a built transition table. Undeclared targets
//! and unreachable states are legal, so nothing here fails a compile; the findings are
//! attached to the `Program` for the editor to show.

use crate::{
    table::TransitionTable,
    types::{ACCEPT_STATE, REJECT_STATE, START_STATE},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt};

/// Something suspicious about a program that still compiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// No rule leaves `q0`, so every run is rejected on its first step.
    MissingStartState,
    /// States with rules that no path from `q0` can reach.
    UnreachableStates(Vec<String>),
    /// Targets other than `ha`/`hr` that have no outgoing rule. Runs reject on arrival.
    DeadEndStates(Vec<String>),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingStartState => {
                write!(f, "No transition leaves the start state {START_STATE}")
            }
            Diagnostic::UnreachableStates(states) => {
                write!(f, "Unreachable states detected: {}", states.join(", "))
            }
            Diagnostic::DeadEndStates(states) => write!(
                f,
                "States without outgoing transitions: {}",
                states.join(", ")
            ),
        }
    }
}

/// Runs every check against `table`, returning the findings in a fixed order.
pub fn analyze(table: &TransitionTable) -> Vec<Diagnostic> {
    [
        check_start_state,
        check_unreachable_states,
        check_dead_end_states,
    ]
    .iter()
    .filter_map(|check| check(table))
    .collect()
}

fn check_start_state(table: &TransitionTable) -> Option<Diagnostic> {
    (!table.has_rules_from(START_STATE)).then_some(Diagnostic::MissingStartState)
}

/// Walks the table depth-first from `q0` and reports every source state never visited.
fn check_unreachable_states(table: &TransitionTable) -> Option<Diagnostic> {
    if !table.has_rules_from(START_STATE) {
        return None;
    }

    let mut visited = HashSet::new();
    let mut stack = vec![START_STATE];

    while let Some(state) = stack.pop() {
        if !visited.insert(state) {
            continue;
        }

        stack.extend(
            table
                .rules()
                .iter()
                .filter(|rule| rule.from == state && !visited.contains(rule.to.as_str()))
                .map(|rule| rule.to.as_str()),
        );
    }

    let mut unreachable: Vec<String> = table
        .rules()
        .iter()
        .map(|rule| rule.from.as_str())
        .filter(|state| !visited.contains(state))
        .collect::<HashSet<_>>()
        .into_iter()
        .map(String::from)
        .collect();

    if unreachable.is_empty() {
        return None;
    }

    unreachable.sort();
    Some(Diagnostic::UnreachableStates(unreachable))
}

fn check_dead_end_states(table: &TransitionTable) -> Option<Diagnostic> {
    let mut dead_ends: Vec<String> = table
        .rules()
        .iter()
        .map(|rule| rule.to.as_str())
        .filter(|state| *state != ACCEPT_STATE && *state != REJECT_STATE)
        .filter(|state| !table.has_rules_from(state))
        .collect::<HashSet<_>>()
        .into_iter()
        .map(String::from)
        .collect();

    if dead_ends.is_empty() {
        return None;
    }

    dead_ends.sort();
    Some(Diagnostic::DeadEndStates(dead_ends))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::compile;

    #[test]
    fn test_clean_program_has_no_diagnostics() {
        let program = compile("q0 a/a,R q1\nq1 _/_,S ha\nq1 a/a,S hr").unwrap();
        assert!(program.diagnostics.is_empty());
    }

    #[test]
    fn test_missing_start_state() {
        let program = compile("q1 a/a,R ha").unwrap();

        assert_eq!(program.diagnostics, vec![Diagnostic::MissingStartState]);
    }

    #[test]
    fn test_unreachable_states() {
        let program = compile("q0 a/a,R ha\nq9 a/a,R q8\nq8 a/a,R ha\nq7 a/a,L q7").unwrap();

        assert_eq!(
            program.diagnostics,
            vec![Diagnostic::UnreachableStates(vec![
                "q7".into(),
                "q8".into(),
                "q9".into()
            ])]
        );
    }

    #[test]
    fn test_dead_end_states() {
        let program = compile("q0 a/a,R q1\nq0 b/b,R q2\nq0 _/_,S ha").unwrap();

        assert_eq!(
            program.diagnostics,
            vec![Diagnostic::DeadEndStates(vec!["q1".into(), "q2".into()])]
        );
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic::UnreachableStates(vec!["q3".into(), "q4".into()]);
        assert_eq!(
            diagnostic.to_string(),
            "Unreachable states detected: q3, q4"
        );
    }
}
