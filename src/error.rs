//! Error types for the buildexit CLI.
//!
//! Every error knows which [`Outcome`] it represents, so the exit status is
//! always decided by classification and never chosen at the failure site.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::counterpart::Mismatch;
use crate::exit::RegistryError;
use crate::outcome::Outcome;

/// Main error type for buildexit operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A name or value that is not in the registry
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A required environment variable is not set
    #[error("{0} environment variable not set")]
    MissingEnv(&'static str),

    /// An environment variable is set to something unusable
    #[error("Invalid {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },

    /// An explicitly requested config file does not exist
    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// A config file exists but does not parse
    #[error("Failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// A counterpart header path that does not exist
    #[error("Counterpart header not found: {0}")]
    HeaderNotFound(PathBuf),

    /// A file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A counterpart header has no recognizable enumerators
    #[error("No exit status definitions found in {0}")]
    EmptyHeader(String),

    /// The counterpart table disagrees with ours
    #[error("Counterpart table out of sync: {}", describe(.0))]
    OutOfSync(Vec<Mismatch>),

    /// No command was given to run
    #[error("No command specified")]
    NoCommand,

    /// The command to run could not be started
    #[error("Failed to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience type alias for Results using Error.
pub type Result<T> = std::result::Result<T, Error>;

fn describe(mismatches: &[Mismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// The outcome this error reports to the terminator.
    pub fn outcome(&self) -> Outcome {
        match self {
            Error::Registry(RegistryError::UnknownName(name)) => {
                Outcome::InvalidArguments(format!("unknown exit status {}", name))
            }
            Error::Registry(e) => Outcome::RegistryInconsistent(e.to_string()),
            Error::MissingEnv(name) => Outcome::MissingEnvironmentVariable(name.to_string()),
            Error::InvalidEnv { name, reason } => Outcome::InvalidEnvironmentVariable {
                name: name.to_string(),
                reason: reason.clone(),
            },
            Error::ConfigNotFound(path) => {
                Outcome::InvalidArguments(format!("no such config file {}", path.display()))
            }
            Error::HeaderNotFound(path) => {
                Outcome::InvalidArguments(format!("no such header {}", path.display()))
            }
            Error::ConfigParse { .. } => Outcome::InvalidConfig(self.to_string()),
            Error::Read { source, .. } => Outcome::Io(source.kind()),
            Error::EmptyHeader(_) | Error::OutOfSync(_) => {
                Outcome::RegistryInconsistent(self.to_string())
            }
            Error::NoCommand => Outcome::InvalidArguments(self.to_string()),
            Error::Spawn { command, source } if source.kind() == io::ErrorKind::NotFound => {
                Outcome::CommandNotFound(command.clone())
            }
            Error::Spawn { source, .. } => Outcome::Io(source.kind()),
            Error::Io(e) => Outcome::Io(e.kind()),
        }
    }
}
