//! The `list` command: print the exit status table.

use crate::color;
use crate::error::Result;
use crate::exit::{self, ExitStatus};
use crate::outcome::Outcome;

pub fn run(fingerprint_only: bool, use_color: bool) -> Result<Outcome> {
    if fingerprint_only {
        println!("{}", exit::fingerprint(&exit::entries()));
        return Ok(Outcome::Completed);
    }

    let width = name_width();
    for status in ExitStatus::ALL {
        println!("{}", format_row(status, width, use_color));
    }
    Ok(Outcome::Completed)
}

fn name_width() -> usize {
    ExitStatus::ALL
        .iter()
        .map(|status| status.name().len())
        .max()
        .unwrap_or(0)
}

fn format_row(status: ExitStatus, width: usize, use_color: bool) -> String {
    format!(
        "{:>3}  {}  {}",
        status.code(),
        color::status_name(status, width, use_color),
        status.description()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_width_fits_longest() {
        assert_eq!(name_width(), "LOCAL_ENVIRONMENTAL_ERROR".len());
    }

    #[test]
    fn test_format_row_aligns_values() {
        let row = format_row(ExitStatus::BadArgv, 10, false);
        assert!(row.starts_with("  2  BAD_ARGV  "));
        let row = format_row(ExitStatus::InternalError, 14, false);
        assert!(row.starts_with(" 37  INTERNAL_ERROR  Unexpected"));
    }
}
