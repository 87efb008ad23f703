//! The `run` command: run a command and exit with its classified status.

use crate::error::Result;
use crate::outcome::{self, Outcome};
use crate::runner;

pub fn run(command: &[String], quiet: bool) -> Result<Outcome> {
    let result = runner::run(command)?;

    if !quiet {
        let status = outcome::classify(&result);
        if status.is_success() {
            eprintln!("[buildexit: {}]", status.name());
        } else {
            eprintln!("[buildexit: {} ({})]", status.name(), result);
        }
    }
    Ok(result)
}
