//! This module builds the transition table out of parsed rules and defines the tagged
//! lookup outcome shared by the execution engine and the fast evaluator.

use crate::{
    analyzer::{analyze, Diagnostic},
    graph::{project, Graph},
    types::{CompileError, Direction, SourceRule, ACCEPT_STATE},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};
use tracing::{debug, warn};

/// Lookup key of a transition: `state:symbol`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionKey(String);

impl TransitionKey {
    pub fn new(state: &str, symbol: char) -> Self {
        Self(format!("{state}:{symbol}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What happens when a rule matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Symbol written under the head.
    pub write: char,
    /// Head movement after the write.
    pub direction: Direction,
    /// State entered after the move.
    pub next_state: String,
    /// Position of the originating rule among all rules, used to highlight diagram edges.
    pub rule_index: usize,
    /// Edge label, e.g. `a/_,R`.
    pub label: String,
}

/// Result of looking up the current state and symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// A rule exists for the key.
    Matched(&'a Transition),
    /// No rule, but the machine sits in `ha`.
    ImplicitAccept,
    /// No rule in any other state.
    ImplicitReject,
}

/// Read-only mapping from `state:symbol` to its transition.
///
/// Built once per compile and never mutated afterwards, so it can be shared freely between
/// the interactive engine and any number of batch evaluations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    transitions: HashMap<TransitionKey, Transition>,
    rules: Vec<SourceRule>,
}

impl TransitionTable {
    /// Classifies the `(state, symbol)` pair into a `Lookup` outcome.
    pub fn lookup(&self, state: &str, symbol: char) -> Lookup<'_> {
        match self.get(state, symbol) {
            Some(transition) => Lookup::Matched(transition),
            None if state == ACCEPT_STATE => Lookup::ImplicitAccept,
            None => Lookup::ImplicitReject,
        }
    }

    /// Returns the transition for `state` reading `symbol`, if one was declared.
    pub fn get(&self, state: &str, symbol: char) -> Option<&Transition> {
        self.transitions.get(&TransitionKey::new(state, symbol))
    }

    /// The accepted rules, indexed by `rule_index`.
    pub fn rules(&self) -> &[SourceRule] {
        &self.rules
    }

    /// Number of transitions in the table.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns true if at least one rule leaves `state`.
    pub fn has_rules_from(&self, state: &str) -> bool {
        self.rules.iter().any(|rule| rule.from == state)
    }
}

/// A compiled machine: its transition table, the derived diagram graph, and any
/// non-fatal diagnostics found while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub table: TransitionTable,
    pub graph: Graph,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds the transition table and its graph from parsed rules.
///
/// # Returns
///
/// * `Ok(Program)` when every `(state, symbol)` pair is unique.
/// * `Err(CompileError::NoValidStates)` if `rules` is empty.
/// * `Err(CompileError::DuplicateTransition)` for the first repeated pair.
pub fn build(rules: Vec<SourceRule>) -> Result<Program, CompileError> {
    if rules.is_empty() {
        return Err(CompileError::NoValidStates);
    }

    let mut transitions = HashMap::with_capacity(rules.len());

    for (rule_index, rule) in rules.iter().enumerate() {
        let key = TransitionKey::new(&rule.from, rule.read);

        // Non-determinism is rejected up front
        if transitions.contains_key(&key) {
            return Err(CompileError::DuplicateTransition {
                state: rule.from.clone(),
                symbol: rule.read,
                line: rule.line + 1,
            });
        }

        transitions.insert(
            key,
            Transition {
                write: rule.write,
                direction: rule.direction,
                next_state: rule.to.clone(),
                rule_index,
                label: rule.label(),
            },
        );
    }

    let table = TransitionTable { transitions, rules };
    let graph = project(&table);
    let diagnostics = analyze(&table);

    for diagnostic in &diagnostics {
        warn!(%diagnostic, "program diagnostic");
    }
    debug!(
        rules = table.len(),
        states = graph.nodes.len(),
        "compiled transition table"
    );

    Ok(Program {
        table,
        graph,
        diagnostics,
    })
}
