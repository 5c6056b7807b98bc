//! Post-run sink: an external command that mirrors the output directory.
//!
//! The command is an argv list from `[sink] command`; every `{dir}` inside
//! an argument is replaced with the output directory. It runs once, after
//! reconciliation, with inherited stdio.

use std::io;
use std::path::Path;
use std::process::Command;
use thiserror::Error;
use tracing::info;

/// Placeholder replaced with the output directory.
pub const DIR_PLACEHOLDER: &str = "{dir}";

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("cannot start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}")]
    Exit { program: String, status: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSink {
    argv: Vec<String>,
}

impl CommandSink {
    /// `None` when `argv` has no program.
    pub fn new(argv: Vec<String>) -> Option<Self> {
        argv.first()
            .is_some_and(|program| !program.trim().is_empty())
            .then_some(Self { argv })
    }

    /// The argv that will run for `dir`.
    pub fn command_line(&self, dir: &Path) -> Vec<String> {
        let dir = dir.display().to_string();
        self.argv
            .iter()
            .map(|arg| arg.replace(DIR_PLACEHOLDER, &dir))
            .collect()
    }

    /// Run the command and wait for it.
    pub fn push(&self, dir: &Path) -> Result<(), SinkError> {
        let argv = self.command_line(dir);
        let (program, args) = argv.split_first().ok_or_else(|| SinkError::Spawn {
            program: String::new(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty command"),
        })?;

        info!(command = ?argv, "running sink");
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|source| SinkError::Spawn {
                program: program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(SinkError::Exit {
                program: program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}
