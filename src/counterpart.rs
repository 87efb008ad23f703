//! Synchronization with the native launcher's exit status table.
//!
//! The launcher is built from C++ and carries its own copy of the registry
//! in `contrib/exit_codes.h`. Nothing couples the two at runtime; this
//! module reads the header and reports every difference.

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::exit::{self, ExitStatus};

/// One difference between our table and a counterpart table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// Defined here, absent in the counterpart.
    Missing { name: String, value: i32 },
    /// Defined in the counterpart, absent here.
    Extra { name: String, value: i32 },
    /// Same name, different value.
    ValueDiffers { name: String, ours: i32, theirs: i32 },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Missing { name, value } => {
                write!(f, "{} = {} missing from counterpart", name, value)
            }
            Mismatch::Extra { name, value } => {
                write!(f, "{} = {} only in counterpart", name, value)
            }
            Mismatch::ValueDiffers { name, ours, theirs } => {
                write!(f, "{} is {} here but {} in counterpart", name, ours, theirs)
            }
        }
    }
}

/// Strip `/* ... */` comments, keeping line breaks so nothing merges.
fn strip_block_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("*/") {
            Some(end) => {
                out.extend(after[..end].chars().filter(|c| *c == '\n'));
                rest = &after[end + 2..];
            }
            None => {
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse one enumerator fragment such as `BAD_ARGV = 2`.
fn parse_enumerator(fragment: &str) -> Option<(String, i32)> {
    let fragment = fragment.rsplit('{').next().unwrap_or(fragment);
    let fragment = fragment.split('}').next().unwrap_or(fragment);
    let (name, value) = fragment.split_once('=')?;
    let name = name.trim();
    if !is_identifier(name) {
        return None;
    }
    let value = value.trim().parse().ok()?;
    Some((name.to_string(), value))
}

/// Read `NAME = VALUE` enumerators out of a C/C++ header.
///
/// Comments and preprocessor lines are ignored, as are enumerators without
/// an explicit integer value. Order is preserved.
pub fn parse_header(text: &str) -> Vec<(String, i32)> {
    let text = strip_block_comments(text);
    let mut entries = Vec::new();

    for line in text.lines() {
        let line = line.split("//").next().unwrap_or_default().trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        entries.extend(line.split(',').filter_map(parse_enumerator));
    }

    entries
}

/// Load and parse a counterpart header from disk.
/// A path that does not exist is the caller's mistake, same as a missing
/// `--config-file`; any other read failure is environmental.
pub fn load_header(path: &Path) -> Result<Vec<(String, i32)>> {
    if !path.exists() {
        return Err(Error::HeaderNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse_header(&text);
    debug!(path = %path.display(), count = entries.len(), "Parsed counterpart header");
    if entries.is_empty() {
        return Err(Error::EmptyHeader(path.display().to_string()));
    }
    Ok(entries)
}

/// Every difference between the registry and `theirs`, ours first.
pub fn compare(theirs: &[(String, i32)]) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    for status in ExitStatus::ALL {
        let ours = i32::from(status.code());
        match theirs.iter().find(|(name, _)| name == status.name()) {
            None => mismatches.push(Mismatch::Missing {
                name: status.name().to_string(),
                value: ours,
            }),
            Some((_, value)) if *value != ours => mismatches.push(Mismatch::ValueDiffers {
                name: status.name().to_string(),
                ours,
                theirs: *value,
            }),
            Some(_) => {}
        }
    }

    for (name, value) in theirs {
        if !ExitStatus::ALL.iter().any(|status| status.name() == name) {
            mismatches.push(Mismatch::Extra {
                name: name.clone(),
                value: *value,
            });
        }
    }

    mismatches
}

/// Validate a counterpart table on its own, then against the registry.
pub fn check(theirs: &[(String, i32)]) -> Result<()> {
    let borrowed: Vec<(&str, i32)> = theirs
        .iter()
        .map(|(name, value)| (name.as_str(), *value))
        .collect();
    exit::validate(&borrowed)?;

    let mismatches = compare(theirs);
    if !mismatches.is_empty() {
        return Err(Error::OutOfSync(mismatches));
    }
    Ok(())
}
