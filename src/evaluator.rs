//! History-free simulation for batch acceptance testing.
//!
//! Follows the same step rules as `TuringMachine::step` but keeps only the tape, head,
//! state and a step counter, and only reports the final verdict.

use crate::{
    table::{Lookup, TransitionTable},
    tape::Tape,
    types::{Verdict, ACCEPT_STATE, MAX_BATCH_STEPS, START_STATE},
};
use tracing::trace;

/// Runs `input` from `q0` at cell 0 and returns the verdict.
///
/// Runs that do not halt within `MAX_BATCH_STEPS` steps are rejected.
pub fn evaluate(table: &TransitionTable, input: &str) -> Verdict {
    evaluate_with_limit(table, input, MAX_BATCH_STEPS)
}

/// Same as `evaluate`, with an explicit step budget.
pub fn evaluate_with_limit(table: &TransitionTable, input: &str, limit: usize) -> Verdict {
    let mut tape = Tape::from_input(input);
    let mut head = 0;
    let mut state = START_STATE;

    for _ in 0..limit {
        let symbol = tape.read(head);
        let transition = match table.lookup(state, symbol) {
            Lookup::Matched(transition) => transition,
            Lookup::ImplicitAccept => return Verdict::Accepted,
            Lookup::ImplicitReject => return Verdict::Rejected,
        };

        let Some(next_head) = transition.direction.apply(head) else {
            return Verdict::Rejected;
        };

        tape.write(head, transition.write);
        head = next_head;
        state = transition.next_state.as_str();

        if state == ACCEPT_STATE {
            return Verdict::Accepted;
        }
    }

    trace!(input, limit, "step budget exhausted");
    Verdict::Rejected
}
