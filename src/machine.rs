//! This module defines the `TuringMachine` struct, the interactive execution engine. It owns
//! the tape, head, current state, status and step count, applies one transition at a time,
//! and keeps a bounded history so any step can be taken back.
//!
//! The engine never schedules itself. Auto-play is an outside caller invoking `step` on a
//! timer (see `playback`).

use crate::{
    graph::Graph,
    history::History,
    table::{Lookup, Program, TransitionTable},
    tape::Tape,
    types::{
        Direction, EngineConfig, RuntimeError, Status, Step, Verdict, ACCEPT_STATE, START_STATE,
    },
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};

/// Machine state captured right before a step is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tape: Tape,
    pub head: usize,
    pub state: String,
    pub status: Status,
    pub step_count: usize,
}

/// The rule that the next step would apply, for diagram highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRule {
    pub rule_index: usize,
    pub label: String,
}

/// A single-tape Turing machine bound to a compiled program.
#[derive(Debug, Clone)]
pub struct TuringMachine {
    program: Arc<Program>,
    config: EngineConfig,
    tape: Tape,
    head: usize,
    state: String,
    status: Status,
    step_count: usize,
    last_error: Option<RuntimeError>,
    history: History<Snapshot>,
}

impl TuringMachine {
    /// Creates a machine for `program` with an empty tape and the default configuration.
    pub fn new(program: Arc<Program>) -> Self {
        Self::with_config(program, EngineConfig::default())
    }

    /// Creates a machine for `program` with an empty tape.
    pub fn with_config(program: Arc<Program>, config: EngineConfig) -> Self {
        Self {
            program,
            config,
            tape: Tape::default(),
            head: 0,
            state: START_STATE.to_string(),
            status: Status::Idle,
            step_count: 0,
            last_error: None,
            history: History::new(config.history_capacity),
        }
    }

    /// Loads `input` onto a fresh tape and rewinds the run: head at 0, state `q0`, no
    /// history, no error.
    pub fn load_input(&mut self, input: &str) {
        self.tape = Tape::from_input(input);
        self.restart_at(0);
    }

    /// Moves the head to `index` without touching the tape and restarts the run from there.
    pub fn set_head_position(&mut self, index: usize) {
        self.restart_at(index);
    }

    fn restart_at(&mut self, head: usize) {
        self.head = head;
        self.state = START_STATE.to_string();
        self.status = Status::Idle;
        self.step_count = 0;
        self.last_error = None;
        self.history.clear();
    }

    /// Executes a single step of the machine.
    ///
    /// Does nothing once the run is accepted or rejected. Otherwise the current state is
    /// snapshotted and then:
    ///
    /// * no rule while in `ha` accepts,
    /// * no rule in any other state rejects with `RuntimeError::MissingTransition`,
    /// * a rule moving left of cell 0 rejects with `RuntimeError::TapeBoundary` and leaves
    ///   tape and head as they were (`RuntimeError::HeadOverflow` past the last cell),
    /// * any other rule is applied; entering `ha` accepts.
    ///
    /// Only applied rules count towards `step_count`.
    pub fn step(&mut self) -> Step {
        if let Some(verdict) = self.verdict() {
            return Step::Halt(verdict);
        }

        let program = Arc::clone(&self.program);
        let symbol = self.symbol();
        let lookup = program.table.lookup(&self.state, symbol);

        self.history.push(self.snapshot());

        let transition = match lookup {
            Lookup::Matched(transition) => transition,
            Lookup::ImplicitAccept => return self.halt(Verdict::Accepted, None),
            Lookup::ImplicitReject => {
                let error = RuntimeError::MissingTransition {
                    state: self.state.clone(),
                    symbol,
                };
                return self.halt(Verdict::Rejected, Some(error));
            }
        };

        let Some(head) = transition.direction.apply(self.head) else {
            let state = self.state.clone();
            let error = match transition.direction {
                Direction::Left => RuntimeError::TapeBoundary { state },
                _ => RuntimeError::HeadOverflow { state },
            };
            return self.halt(Verdict::Rejected, Some(error));
        };

        trace!(
            state = %self.state,
            symbol = %symbol,
            head = self.head,
            rule = transition.rule_index,
            "applying {}",
            transition.label
        );

        self.tape.write(self.head, transition.write);
        self.head = head;
        self.state.clone_from(&transition.next_state);
        self.step_count += 1;

        if self.state == ACCEPT_STATE {
            return self.halt(Verdict::Accepted, None);
        }

        Step::Continue
    }

    fn halt(&mut self, verdict: Verdict, error: Option<RuntimeError>) -> Step {
        debug!(
            %verdict,
            state = %self.state,
            steps = self.step_count,
            error = ?error,
            "machine halted"
        );
        self.status = verdict.into();
        self.last_error = error;
        Step::Halt(verdict)
    }

    /// Undoes the most recent step.
    ///
    /// Restores the snapshot taken before it and leaves the machine paused, with the error
    /// cleared. Returns false when there is nothing to undo.
    pub fn step_back(&mut self) -> bool {
        let Some(snapshot) = self.history.pop() else {
            return false;
        };

        self.tape = snapshot.tape;
        self.head = snapshot.head;
        self.state = snapshot.state;
        self.step_count = snapshot.step_count;
        self.status = Status::Paused;
        self.last_error = None;

        true
    }

    /// Steps until the run halts or `limit` steps have been attempted.
    ///
    /// Returns `None` when the limit is hit first; the machine then stays where it stopped.
    pub fn run(&mut self, limit: usize) -> Option<Verdict> {
        for _ in 0..limit {
            if let Step::Halt(verdict) = self.step() {
                return Some(verdict);
            }
        }

        self.verdict()
    }

    /// Runs with the configured `max_steps` budget, counting an exhausted budget as a
    /// rejection. The status itself is left as is in that case.
    pub fn run_to_completion(&mut self) -> Verdict {
        self.run(self.config.max_steps).unwrap_or(Verdict::Rejected)
    }

    /// Switches an idle or paused machine to running. Returns whether the status changed.
    pub fn play(&mut self) -> bool {
        if matches!(self.status, Status::Idle | Status::Paused) {
            self.status = Status::Running;
            return true;
        }
        false
    }

    /// Pauses a running machine. Returns whether the status changed.
    pub fn pause(&mut self) -> bool {
        if self.status == Status::Running {
            self.status = Status::Paused;
            return true;
        }
        false
    }

    /// Plays when paused or idle, pauses when running.
    pub fn toggle_play(&mut self) -> bool {
        self.pause() || self.play()
    }

    /// The rule the next step would apply. `None` if the run is over or no rule matches.
    pub fn active_rule(&self) -> Option<ActiveRule> {
        if self.status.is_terminal() {
            return None;
        }

        match self.program.table.lookup(&self.state, self.symbol()) {
            Lookup::Matched(transition) => Some(ActiveRule {
                rule_index: transition.rule_index,
                label: transition.label.clone(),
            }),
            _ => None,
        }
    }

    /// Captures the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tape: self.tape.clone(),
            head: self.head,
            state: self.state.clone(),
            status: self.status,
            step_count: self.step_count,
        }
    }

    /// The verdict of a finished run.
    pub fn verdict(&self) -> Option<Verdict> {
        match self.status {
            Status::Accepted => Some(Verdict::Accepted),
            Status::Rejected => Some(Verdict::Rejected),
            _ => None,
        }
    }

    /// Symbol under the head.
    pub fn symbol(&self) -> char {
        self.tape.read(self.head)
    }

    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    pub fn table(&self) -> &TransitionTable {
        &self.program.table
    }

    pub fn graph(&self) -> &Graph {
        &self.program.graph
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn last_error(&self) -> Option<&RuntimeError> {
        self.last_error.as_ref()
    }

    /// Number of steps that can currently be taken back.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_step_back(&self) -> bool {
        !self.history.is_empty()
    }
}
