//! The `select` command: pick the final status among several candidates.

use tracing::debug;

use crate::error::Result;
use crate::exit::ExitStatus;
use crate::outcome::Outcome;
use crate::terminate;

pub fn run(candidates: &[String]) -> Result<Outcome> {
    let statuses = candidates
        .iter()
        .map(|candidate| candidate.parse::<ExitStatus>())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let selected = terminate::select_final(statuses.iter().copied());
    debug!(candidates = ?statuses, %selected, "Selected final status");
    println!("{} {}", selected.name(), selected.code());
    Ok(Outcome::Completed)
}
