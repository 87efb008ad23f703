//! Termination by signal.
//!
//! A forced stop is reported as an internal error, but it goes through the
//! terminator like everything else: a caller error reported earlier in the
//! run still decides the exit status.
//!
//! Signals are received on a dedicated thread. While a wrapped child runs,
//! the signal is forwarded to it and the runner reports whatever the child
//! ends with; otherwise the client exits straight away.

use std::io;
use std::process::{Child, Command};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use tracing::{debug, warn};

#[cfg(unix)]
use crate::outcome::{self, Outcome};
#[cfg(unix)]
use crate::terminate::TERMINATOR;

/// Signals that end the client.
#[cfg(unix)]
pub const TRAPPED: [libc::c_int; 3] = [SIGINT, SIGTERM, SIGHUP];

/// Pid of the wrapped child, if one is running.
///
/// The lock is held across `spawn` and across the decision to exit, so a
/// signal either sees the child or stops it from ever starting.
#[derive(Debug)]
pub struct ChildSlot {
    pid: Mutex<Option<u32>>,
}

impl ChildSlot {
    pub const fn new() -> Self {
        Self {
            pid: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<u32>> {
        self.pid.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn `command` and remember its pid.
    pub fn spawn(&self, command: &mut Command) -> io::Result<Child> {
        let mut slot = self.lock();
        let child = command.spawn()?;
        *slot = Some(child.id());
        Ok(child)
    }

    /// Forget `pid` once it has been waited for.
    pub fn release(&self, pid: u32) {
        let mut slot = self.lock();
        if *slot == Some(pid) {
            *slot = None;
        }
    }

    pub fn current(&self) -> Option<u32> {
        *self.lock()
    }
}

impl Default for ChildSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// The wrapped child of this process.
pub static CHILD: ChildSlot = ChildSlot::new();

#[cfg(unix)]
fn on_signal(signo: libc::c_int) {
    TERMINATOR.report(outcome::classify(&Outcome::Signaled(signo)));

    let slot = CHILD.lock();
    match *slot {
        Some(pid) => forward(pid, signo),
        None => {
            debug!(signo, "Terminating on signal");
            // Slot stays locked so no child can start after this point.
            TERMINATOR.exit()
        }
    }
}

#[cfg(unix)]
fn forward(pid: u32, signo: libc::c_int) {
    debug!(pid, signo, "Forwarding signal to child");
    // SAFETY: kill has no memory-safety preconditions.
    let rc = unsafe { libc::kill(pid as libc::pid_t, signo) };
    if rc != 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            debug!(pid, "Child already gone");
        } else {
            warn!(pid, signo, error = %err, "Failed to forward signal");
        }
    }
}

/// Start the signal thread for every trapped signal.
#[cfg(unix)]
pub fn install() -> io::Result<()> {
    let mut signals = signal_hook::iterator::Signals::new(TRAPPED)?;
    std::thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for signo in signals.forever() {
                on_signal(signo);
            }
        })?;
    debug!(signals = ?TRAPPED, "Installed termination handlers");
    Ok(())
}

#[cfg(not(unix))]
pub fn install() -> io::Result<()> {
    Ok(())
}
