//! Terminal color formatting utilities.

use std::io::IsTerminal;

use crate::exit::{Category, ExitStatus};

/// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35m";
const RESET: &str = "\x1b[0m";

/// Check if colors should be used based on terminal support and force flag.
/// Respects the NO_COLOR environment variable (https://no-color.org/).
pub fn should_use_color(force_color: bool) -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    force_color || std::io::stdout().is_terminal()
}

fn category_color(category: Category) -> &'static str {
    match category {
        Category::Success => GREEN,
        Category::CallerError => YELLOW,
        Category::Environment => MAGENTA,
        Category::Internal => RED,
    }
}

/// Format a status name, colored by its category.
pub fn status_name(status: ExitStatus, width: usize, use_color: bool) -> String {
    let padded = format!("{:<width$}", status.name(), width = width);
    if use_color {
        format!("{}{}{}", category_color(status.category()), padded, RESET)
    } else {
        padded
    }
}
