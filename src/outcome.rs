//! Mapping from internal outcomes to exit statuses.
//!
//! Subsystems never pick a number themselves. They describe what happened
//! as an [`Outcome`] and [`classify`] decides the status.

use std::fmt;
use std::io::ErrorKind;

use crate::exit::ExitStatus;

/// What a subsystem observed when it finished, or failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Ran to completion without error.
    Completed,
    /// Unknown flag, missing value, unknown subcommand.
    InvalidArguments(String),
    /// Individually valid flags that cannot be combined.
    ConflictingFlags(String),
    /// An environment variable is set but its value is unusable.
    InvalidEnvironmentVariable { name: String, reason: String },
    /// A config file the caller controls does not parse.
    InvalidConfig(String),
    /// The caller asked to run a program that does not exist.
    CommandNotFound(String),
    /// An environment variable the machine is expected to provide is absent.
    MissingEnvironmentVariable(String),
    /// Filesystem or OS failure on the local machine.
    Io(ErrorKind),
    /// A wrapped child process exited normally with this value.
    ChildExited(i32),
    /// A process was terminated by this signal.
    Signaled(i32),
    /// Unhandled panic.
    Panicked,
    /// Two exit status tables disagree, or one is malformed.
    RegistryInconsistent(String),
    /// Anything no rule above covers.
    Unclassified(String),
}

/// Resolve an outcome to exactly one exit status.
///
/// Total: anything without an explicit rule lands in
/// [`ExitStatus::InternalError`], never in success.
pub fn classify(outcome: &Outcome) -> ExitStatus {
    match outcome {
        Outcome::Completed => ExitStatus::Success,

        Outcome::InvalidArguments(_)
        | Outcome::ConflictingFlags(_)
        | Outcome::InvalidEnvironmentVariable { .. }
        | Outcome::InvalidConfig(_)
        | Outcome::CommandNotFound(_) => ExitStatus::BadArgv,

        Outcome::MissingEnvironmentVariable(_) | Outcome::Io(_) => {
            ExitStatus::LocalEnvironmentalError
        }

        Outcome::ChildExited(code) => u8::try_from(*code)
            .ok()
            .and_then(ExitStatus::from_code)
            .unwrap_or(ExitStatus::InternalError),

        Outcome::Signaled(_)
        | Outcome::Panicked
        | Outcome::RegistryInconsistent(_)
        | Outcome::Unclassified(_) => ExitStatus::InternalError,
    }
}

impl Outcome {
    /// Read the command-line spelling of an outcome.
    ///
    /// Spellings: `completed`, `invalid-arguments[:MSG]`,
    /// `conflicting-flags[:MSG]`, `invalid-env:NAME`, `missing-env:NAME`,
    /// `invalid-config[:MSG]`, `command-not-found:CMD`, `io[:KIND]`,
    /// `exit:N`, `signal:N`, `panic`, `registry-inconsistent[:MSG]`.
    /// Anything else is kept as [`Outcome::Unclassified`].
    pub fn parse(input: &str) -> Outcome {
        let input = input.trim();
        let (kind, detail) = match input.split_once(':') {
            Some((kind, detail)) => (kind, detail.trim()),
            None => (input, ""),
        };

        match kind.to_ascii_lowercase().as_str() {
            "completed" | "success" => Outcome::Completed,
            "invalid-arguments" => Outcome::InvalidArguments(detail.to_string()),
            "conflicting-flags" => Outcome::ConflictingFlags(detail.to_string()),
            "invalid-env" => Outcome::InvalidEnvironmentVariable {
                name: detail.to_string(),
                reason: "invalid value".to_string(),
            },
            "missing-env" => Outcome::MissingEnvironmentVariable(detail.to_string()),
            "invalid-config" => Outcome::InvalidConfig(detail.to_string()),
            "command-not-found" => Outcome::CommandNotFound(detail.to_string()),
            "io" => Outcome::Io(parse_error_kind(detail)),
            "exit" => match detail.parse() {
                Ok(code) => Outcome::ChildExited(code),
                Err(_) => Outcome::Unclassified(input.to_string()),
            },
            "signal" => match detail.parse() {
                Ok(signo) => Outcome::Signaled(signo),
                Err(_) => Outcome::Unclassified(input.to_string()),
            },
            "panic" => Outcome::Panicked,
            "registry-inconsistent" => Outcome::RegistryInconsistent(detail.to_string()),
            _ => Outcome::Unclassified(input.to_string()),
        }
    }
}

fn parse_error_kind(kind: &str) -> ErrorKind {
    match kind.to_ascii_lowercase().replace('_', "-").as_str() {
        "not-found" => ErrorKind::NotFound,
        "permission-denied" => ErrorKind::PermissionDenied,
        "already-exists" => ErrorKind::AlreadyExists,
        "interrupted" => ErrorKind::Interrupted,
        "out-of-memory" => ErrorKind::OutOfMemory,
        _ => ErrorKind::Other,
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed => write!(f, "completed"),
            Outcome::InvalidArguments(msg) => write!(f, "invalid arguments: {}", msg),
            Outcome::ConflictingFlags(msg) => write!(f, "conflicting flags: {}", msg),
            Outcome::InvalidEnvironmentVariable { name, reason } => {
                write!(f, "invalid environment variable {}: {}", name, reason)
            }
            Outcome::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
            Outcome::CommandNotFound(cmd) => write!(f, "command not found: {}", cmd),
            Outcome::MissingEnvironmentVariable(name) => {
                write!(f, "missing environment variable {}", name)
            }
            Outcome::Io(kind) => write!(f, "I/O failure: {}", kind),
            Outcome::ChildExited(code) => write!(f, "child exited with {}", code),
            Outcome::Signaled(signo) => write!(f, "terminated by signal {}", signo),
            Outcome::Panicked => write!(f, "panicked"),
            Outcome::RegistryInconsistent(msg) => write!(f, "registry inconsistent: {}", msg),
            Outcome::Unclassified(msg) => write!(f, "unclassified: {}", msg),
        }
    }
}
