//! The `check` command: validate the registry and its counterpart.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::Config;
use crate::counterpart;
use crate::error::Result;
use crate::exit;
use crate::outcome::Outcome;

pub fn run(header: Option<PathBuf>, config: &Config, quiet: bool) -> Result<Outcome> {
    let entries = exit::entries();
    exit::validate(&entries)?;
    debug!(count = entries.len(), "Registry is well formed");

    let header = match header {
        Some(path) => Some(path),
        None => config.counterpart_header()?,
    };

    if let Some(path) = &header {
        let theirs = counterpart::load_header(path)?;
        counterpart::check(&theirs)?;
        info!(header = %path.display(), "Counterpart table in sync");
    }

    if !quiet {
        let fingerprint = exit::fingerprint(&entries);
        match &header {
            Some(path) => println!("ok {} (in sync with {})", fingerprint, path.display()),
            None => println!("ok {}", fingerprint),
        }
    }
    Ok(Outcome::Completed)
}
