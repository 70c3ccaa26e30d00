//! Editor-facing workbench: source text, the last good program, the machine running it and
//! the batch test suite.
//!
//! Compiling is all-or-nothing. A failed compile records its error but keeps the previous
//! program, graph and machine running untouched.

use crate::{
    graph::Graph,
    machine::TuringMachine,
    parser::compile,
    programs::{LookupError, ProgramManager},
    suite::TestSuite,
    table::Program,
    types::{CompileError, EngineConfig},
};
use std::sync::Arc;
use tracing::{info, warn};

/// Inputs preloaded into the default session's test suite.
const DEFAULT_TESTS: [&str; 4] = ["abba", "bab", "aabaab", "aabb"];
/// Input on the tape of the default session.
const DEFAULT_INPUT: &str = "abba";

#[derive(Debug, Clone)]
pub struct Session {
    source: String,
    dirty: bool,
    input: String,
    config: EngineConfig,
    machine: Option<TuringMachine>,
    compile_error: Option<CompileError>,
    tests: TestSuite,
}

impl Session {
    /// Creates a session for `source` and compiles it right away.
    ///
    /// A source that does not compile still yields a session; the error is available from
    /// `compile_error` and there is no machine until a later compile succeeds.
    pub fn new(source: impl Into<String>, config: EngineConfig) -> Self {
        let mut session = Self {
            source: source.into(),
            dirty: true,
            input: String::new(),
            config,
            machine: None,
            compile_error: None,
            tests: TestSuite::with_max_steps(config.max_steps),
        };
        // The outcome is kept on the session
        let _ = session.compile();
        session
    }

    /// The built-in palindrome program with its sample input and tests.
    pub fn with_default_program() -> Result<Self, LookupError> {
        let info = ProgramManager::default_program()?;
        let mut session = Self::new(info.source, EngineConfig::default());

        session.load_input(DEFAULT_INPUT);
        for input in DEFAULT_TESTS {
            session.tests.add(input);
        }

        Ok(session)
    }

    /// Replaces the editor text. Nothing is recompiled until `compile` is called.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
        self.dirty = true;
    }

    /// Compiles the current source.
    ///
    /// On success the new program replaces the old one and the active input is reloaded
    /// into a fresh machine. On failure the previous program and machine are kept.
    pub fn compile(&mut self) -> Result<(), CompileError> {
        self.dirty = false;

        match compile(&self.source) {
            Ok(program) => {
                info!(
                    rules = program.table.len(),
                    diagnostics = program.diagnostics.len(),
                    "program compiled"
                );
                let mut machine = TuringMachine::with_config(Arc::new(program), self.config);
                machine.load_input(&self.input);

                self.machine = Some(machine);
                self.compile_error = None;
                self.tests.reset();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "compile failed, keeping previous program");
                self.compile_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Sets the active input and loads it onto the tape.
    pub fn load_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
        if let Some(machine) = &mut self.machine {
            machine.load_input(&self.input);
        }
    }

    /// Loads the input of test case `id` onto the tape. Returns false for unknown ids.
    pub fn load_test(&mut self, id: u64) -> bool {
        let Some(input) = self.tests.get(id).map(|case| case.input.clone()) else {
            return false;
        };
        self.load_input(input);
        true
    }

    /// Runs every test case against the current program. Does nothing without one.
    pub fn run_tests(&mut self) {
        if let Some(machine) = &self.machine {
            let program = Arc::clone(machine.program());
            self.tests.run_all(&program.table);
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// True if the source changed since the last compile.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn program(&self) -> Option<&Arc<Program>> {
        self.machine.as_ref().map(TuringMachine::program)
    }

    pub fn graph(&self) -> Option<&Graph> {
        self.machine.as_ref().map(TuringMachine::graph)
    }

    pub fn machine(&self) -> Option<&TuringMachine> {
        self.machine.as_ref()
    }

    pub fn machine_mut(&mut self) -> Option<&mut TuringMachine> {
        self.machine.as_mut()
    }

    /// Error of the most recent compile, if it failed.
    pub fn compile_error(&self) -> Option<&CompileError> {
        self.compile_error.as_ref()
    }

    pub fn tests(&self) -> &TestSuite {
        &self.tests
    }

    pub fn tests_mut(&mut self) -> &mut TestSuite {
        &mut self.tests
    }
}
