//! The `classify` command: show which status an outcome maps to.

use tracing::debug;

use crate::error::Result;
use crate::outcome::{self, Outcome};

pub fn run(input: &str) -> Result<Outcome> {
    let parsed = Outcome::parse(input);
    let status = outcome::classify(&parsed);
    debug!(outcome = %parsed, %status, "Classified");
    println!("{} {}", status.name(), status.code());
    Ok(Outcome::Completed)
}
