//! Exit status registry for the build client.
//!
//! Every value here is part of the tool's external contract: scripts and CI
//! systems branch on the numbers, and the native launcher carries a copy of
//! the same table (`contrib/exit_codes.h`). Values are never renumbered once
//! released.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Outcome of a whole client run, as seen by the parent process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExitStatus {
    /// Success.
    Success = 0,

    /// Bad or illegal flags, flag combination, or environment variables.
    /// The caller must change its invocation.
    BadArgv = 2,

    /// Failure local to the invoking machine, not caused by bad input.
    LocalEnvironmentalError = 36,

    /// Unexpected termination: external kill, crash, unmapped failure.
    /// Last resort; the precise cause was lost.
    InternalError = 37,
}

/// Disjoint groups the failure values fall into.
///
/// Declared in precedence order, lowest first: when several statuses are
/// reported in one run, the one with the greatest category is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Success,
    Internal,
    Environment,
    CallerError,
}

impl ExitStatus {
    /// Every status, in registry order.
    pub const ALL: [ExitStatus; 4] = [
        ExitStatus::Success,
        ExitStatus::BadArgv,
        ExitStatus::LocalEnvironmentalError,
        ExitStatus::InternalError,
    ];

    /// Numeric value handed to the OS.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Stable symbolic name, shared with the counterpart header.
    pub const fn name(self) -> &'static str {
        match self {
            ExitStatus::Success => "SUCCESS",
            ExitStatus::BadArgv => "BAD_ARGV",
            ExitStatus::LocalEnvironmentalError => "LOCAL_ENVIRONMENTAL_ERROR",
            ExitStatus::InternalError => "INTERNAL_ERROR",
        }
    }

    pub const fn category(self) -> Category {
        match self {
            ExitStatus::Success => Category::Success,
            ExitStatus::BadArgv => Category::CallerError,
            ExitStatus::LocalEnvironmentalError => Category::Environment,
            ExitStatus::InternalError => Category::Internal,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ExitStatus::Success => "Success",
            ExitStatus::BadArgv => {
                "Bad or illegal flags, flag combination, or environment variables"
            }
            ExitStatus::LocalEnvironmentalError => {
                "Failure in the local environment, not caused by bad input"
            }
            ExitStatus::InternalError => {
                "Unexpected termination (external kill, crash); cause unknown"
            }
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    pub fn is_success(self) -> bool {
        self == ExitStatus::Success
    }

    /// Rank used when several statuses compete for the same run.
    /// Higher wins.
    pub(crate) fn precedence(self) -> Category {
        self.category()
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExitStatus {
    type Err = RegistryError;

    /// Accepts a symbolic name (any case, `-` for `_`) or a decimal value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::from_code(code)
                .ok_or_else(|| RegistryError::UnknownName(trimmed.to_string()));
        }
        let code = lookup(trimmed)?;
        Self::from_code(code).ok_or_else(|| RegistryError::UnknownName(trimmed.to_string()))
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code())
    }
}

/// Errors raised by the registry itself.
///
/// Apart from `UnknownName`, these describe a malformed table and are only
/// expected from tests and `check`, never from a normal run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown exit status: {0}")]
    UnknownName(String),

    #[error("Exit status {name} has value {value}, outside 0..=255")]
    OutOfRange { name: String, value: i32 },

    #[error("Exit statuses {first} and {second} share value {value}")]
    DuplicateValue {
        value: i32,
        first: String,
        second: String,
    },

    #[error("Exit status {0} is defined more than once")]
    DuplicateName(String),

    #[error("Value 0 is bound to {0}, not SUCCESS")]
    ZeroNotSuccess(String),

    #[error("No SUCCESS = 0 entry")]
    MissingSuccess,
}

/// The registry as a name/value table.
pub fn entries() -> Vec<(&'static str, i32)> {
    ExitStatus::ALL
        .iter()
        .map(|status| (status.name(), i32::from(status.code())))
        .collect()
}

/// Check the invariants every exit status table must hold.
pub fn validate(entries: &[(&str, i32)]) -> Result<(), RegistryError> {
    let mut names = HashSet::new();
    let mut values: HashMap<i32, &str> = HashMap::new();
    let mut has_success = false;

    for &(name, value) in entries {
        if !(0..=255).contains(&value) {
            return Err(RegistryError::OutOfRange {
                name: name.to_string(),
                value,
            });
        }
        if !names.insert(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        if let Some(first) = values.insert(value, name) {
            return Err(RegistryError::DuplicateValue {
                value,
                first: first.to_string(),
                second: name.to_string(),
            });
        }
        if value == 0 {
            if name != ExitStatus::Success.name() {
                return Err(RegistryError::ZeroNotSuccess(name.to_string()));
            }
            has_success = true;
        }
    }

    if !has_success {
        return Err(RegistryError::MissingSuccess);
    }
    Ok(())
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_uppercase().replace('-', "_")
}

fn registry() -> &'static Result<HashMap<&'static str, ExitStatus>, RegistryError> {
    static REGISTRY: OnceLock<Result<HashMap<&'static str, ExitStatus>, RegistryError>> =
        OnceLock::new();
    REGISTRY.get_or_init(|| {
        validate(&entries())?;
        Ok(ExitStatus::ALL
            .iter()
            .map(|status| (status.name(), *status))
            .collect())
    })
}

/// Fixed value for a symbolic name.
pub fn lookup(name: &str) -> Result<u8, RegistryError> {
    let table = registry().as_ref().map_err(Clone::clone)?;
    table
        .get(normalize(name).as_str())
        .map(|status| status.code())
        .ok_or_else(|| RegistryError::UnknownName(name.trim().to_string()))
}

/// Short digest of a table, for comparing tables at a glance.
/// Returns the first 8 hex characters of SHA-256 over `NAME=VALUE\n` lines.
#[must_use]
pub fn fingerprint(entries: &[(&str, i32)]) -> String {
    let mut hasher = Sha256::new();
    for (name, value) in entries {
        hasher.update(format!("{}={}\n", name, value).as_bytes());
    }
    let result = hasher.finalize();
    format!(
        "{:02x}{:02x}{:02x}{:02x}",
        result[0], result[1], result[2], result[3]
    )
}
