use crate::{
    parser::compile,
    table::Program,
    types::CompileError,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

// Built-in programs, the first one is the default
const PROGRAM_SOURCES: [(&str, &str); 3] = [
    ("Palindrome", include_str!("../programs/palindrome.tm")),
    ("a^n b^n", include_str!("../programs/anbn.tm")),
    ("Even number of a's", include_str!("../programs/even-as.tm")),
];

/// A built-in program together with its source text.
#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: &'static str,
    pub source: &'static str,
    pub program: Arc<Program>,
}

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<ProgramInfo> = load();
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("Program index {0} out of range")]
    IndexOutOfRange(usize),
    #[error("Program '{0}' not found")]
    NotFound(String),
}

fn load() -> Vec<ProgramInfo> {
    PROGRAM_SOURCES
        .iter()
        .enumerate()
        .filter_map(|(index, &(name, source))| match compile(source) {
            Ok(program) => Some(ProgramInfo {
                index,
                name,
                source,
                program: Arc::new(program),
            }),
            Err(e) => {
                error!(name, error = %e, "failed to compile built-in program");
                None
            }
        })
        .collect()
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<&'static ProgramInfo, LookupError> {
        PROGRAMS
            .get(index)
            .ok_or(LookupError::IndexOutOfRange(index))
    }

    /// Get a program by its name, ignoring case
    pub fn get_program_by_name(name: &str) -> Result<&'static ProgramInfo, LookupError> {
        PROGRAMS
            .iter()
            .find(|info| info.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| LookupError::NotFound(name.to_string()))
    }

    /// The default program
    pub fn default_program() -> Result<&'static ProgramInfo, LookupError> {
        Self::get_program_by_index(0)
    }

    /// Get the source text of a program by its index
    pub fn get_program_source(index: usize) -> Result<&'static str, LookupError> {
        Self::get_program_by_index(index).map(|info| info.source)
    }

    /// List all program names
    pub fn list_program_names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|info| info.name).collect()
    }

    /// Search for programs by name
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();
        PROGRAMS
            .iter()
            .filter(|info| info.name.to_lowercase().contains(&query))
            .map(|info| info.index)
            .collect()
    }

    /// Compiles every built-in source, reporting the first failure.
    pub fn validate_all() -> Result<(), CompileError> {
        PROGRAM_SOURCES
            .iter()
            .try_for_each(|(_, source)| compile(source).map(|_| ()))
    }
}
