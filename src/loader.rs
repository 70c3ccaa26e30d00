//! This module provides the `ProgramLoader` struct, responsible for loading programs from
//! files, directories and strings.

use crate::{
    parser::compile,
    table::Program,
    types::{CompileError, MAX_PROGRAM_SIZE},
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// File extension of program sources.
pub const PROGRAM_EXTENSION: &str = "tm";

/// Errors that can occur while loading a program from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}: {source}")]
    Compile {
        path: PathBuf,
        #[source]
        source: CompileError,
    },
    #[error(transparent)]
    Source(#[from] CompileError),
}

/// `ProgramLoader` is a utility struct for loading programs.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is successfully read and compiled.
    /// * `Err(LoadError::Io)` if the file cannot be read.
    /// * `Err(LoadError::Compile)` if the content is not a valid program, including files
    ///   larger than `MAX_PROGRAM_SIZE`.
    pub fn load_program(path: &Path) -> Result<Program, LoadError> {
        let io_error = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };

        let size = fs::metadata(path).map_err(io_error)?.len() as usize;
        if size > MAX_PROGRAM_SIZE {
            return Err(LoadError::Compile {
                path: path.to_path_buf(),
                source: CompileError::ProgramTooLarge(size),
            });
        }

        let content = fs::read_to_string(path).map_err(io_error)?;

        compile(&content).map_err(|source| LoadError::Compile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Compiles a program from the provided string content, e.g. from stdin or an editor.
    pub fn load_program_from_string(content: &str) -> Result<Program, LoadError> {
        Ok(compile(content)?)
    }

    /// Loads every `.tm` file in `directory`.
    ///
    /// Subdirectories and other files are skipped. Each entry of the result is the outcome
    /// for one file, so one broken program does not hide the others.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), LoadError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(source) => {
                return vec![Err(LoadError::Io {
                    path: directory.to_path_buf(),
                    source,
                })]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(source) => {
                        return Some(Err(LoadError::Io {
                            path: directory.to_path_buf(),
                            source,
                        }))
                    }
                };

                // Skip directories and non-.tm files
                if path.is_dir() || path.extension().is_none_or(|ext| ext != PROGRAM_EXTENSION) {
                    return None;
                }

                Some(Self::load_program(&path).map(|program| (path, program)))
            })
            .collect();

        // read_dir order is platform dependent
        results.sort_by_key(|result| match result {
            Ok((path, _)) => Some(path.clone()),
            Err(LoadError::Io { path, .. }) | Err(LoadError::Compile { path, .. }) => {
                Some(path.clone())
            }
            Err(LoadError::Source(_)) => None,
        });

        results
    }
}
