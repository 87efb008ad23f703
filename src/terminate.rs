//! Final exit status selection.
//!
//! Several subsystems can fail during one run: argument parsing, config
//! loading, a wrapped child, a signal arriving in the background. Each one
//! reports to a [`Terminator`] and only the terminator exits the process, so
//! the value the OS sees follows precedence, never thread timing.
//!
//! Precedence, highest first: caller error, environment failure, internal
//! failure, success. Equal precedence keeps the earliest report.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::exit::ExitStatus;

/// Pick the status to exit with from everything reported during a run.
pub fn select_final<I>(candidates: I) -> ExitStatus
where
    I: IntoIterator<Item = ExitStatus>,
{
    let mut best: Option<ExitStatus> = None;
    for candidate in candidates {
        match best {
            Some(current) if current.precedence() >= candidate.precedence() => {}
            _ => best = Some(candidate),
        }
    }
    best.unwrap_or(ExitStatus::Success)
}

/// No status reported yet.
const NONE: u8 = 0x7f;
/// Set once the final status has been committed.
const SEALED: u8 = 0x80;

/// The one place allowed to end the process.
///
/// State is a single byte: the best status so far (or `NONE`) plus the
/// `SEALED` bit. `report` and `commit` are lock-free and never allocate,
/// so they can run inside a signal handler.
#[derive(Debug)]
pub struct Terminator {
    state: AtomicU8,
}

impl Terminator {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(NONE),
        }
    }

    /// Offer a status. Returns true if it is now the one that will be
    /// committed; false if something of equal or higher precedence was
    /// reported first, or the status is already sealed.
    pub fn report(&self, status: ExitStatus) -> bool {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                if state & SEALED != 0 {
                    return None;
                }
                match decode(state) {
                    Some(current) if current.precedence() >= status.precedence() => None,
                    _ => Some(status.code()),
                }
            })
            .is_ok()
    }

    /// Status that would be committed right now.
    pub fn current(&self) -> ExitStatus {
        decode(self.state.load(Ordering::Acquire) & !SEALED).unwrap_or(ExitStatus::Success)
    }

    pub fn is_sealed(&self) -> bool {
        self.state.load(Ordering::Acquire) & SEALED != 0
    }

    /// Seal and return the final status. Later reports are ignored and
    /// later commits return the same value.
    pub fn commit(&self) -> ExitStatus {
        let previous = self.state.fetch_or(SEALED, Ordering::AcqRel);
        decode(previous & !SEALED).unwrap_or(ExitStatus::Success)
    }

    /// Commit and terminate the process with the committed value.
    pub fn exit(&self) -> ! {
        let status = self.commit();
        std::process::exit(i32::from(status.code()))
    }
}

impl Default for Terminator {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(state: u8) -> Option<ExitStatus> {
    if state == NONE {
        None
    } else {
        ExitStatus::from_code(state)
    }
}

/// Process-wide termination authority.
pub static TERMINATOR: Terminator = Terminator::new();
