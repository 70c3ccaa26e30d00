//! This crate provides the core logic for a single-tape Turing machine workbench.
//! It includes modules for parsing the rule language, building transition tables and state
//! diagrams, stepping a machine with bounded undo, and evaluating batches of inputs.

pub mod analyzer;
pub mod evaluator;
pub mod graph;
pub mod history;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod playback;
pub mod programs;
pub mod session;
pub mod suite;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `analyze` function and `Diagnostic` enum from the analyzer module.
pub use analyzer::{analyze, Diagnostic};
/// Re-exports the batch evaluation functions.
pub use evaluator::{evaluate, evaluate_with_limit};
/// Re-exports the `project` function and the diagram types from the graph module.
pub use graph::{project, Edge, Graph, Node};
/// Re-exports the bounded undo stack from the history module.
pub use history::History;
/// Re-exports the `ProgramLoader` struct and its error type from the loader module.
pub use loader::{LoadError, ProgramLoader};
/// Re-exports the `TuringMachine` struct and its snapshot types from the machine module.
pub use machine::{ActiveRule, Snapshot, TuringMachine};
/// Re-exports the `compile` and `parse` functions from the parser module.
pub use parser::{compile, parse};
/// Re-exports the auto-play pacing settings from the playback module.
pub use playback::Playback;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{LookupError, ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the `Session` workbench from the session module.
pub use session::Session;
/// Re-exports the batch test suite types from the suite module.
pub use suite::{TestCase, TestStatus, TestSuite};
/// Re-exports the `build` function, the transition table and lookup types from the table module.
pub use table::{build, Lookup, Program, Transition, TransitionKey, TransitionTable};
/// Re-exports the sparse `Tape` from the tape module.
pub use tape::Tape;
/// Re-exports the rule language types, run states and errors from the types module.
pub use types::{
    CompileError, Direction, EngineConfig, RuntimeError, SourceRule, Status, Step, Verdict,
    ACCEPT_STATE, BLANK_SYMBOL, MAX_BATCH_STEPS, MAX_PROGRAM_SIZE, REJECT_STATE, START_STATE,
};
