//! Wrapped command execution.
//!
//! The child's own exit value never reaches the OS directly. It comes back
//! as an [`Outcome`] and is classified like any other report. The child is
//! registered with [`signals::CHILD`] while it runs, so a signal sent to the
//! client reaches it too and the client still waits for it.

use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Error, Result};
use crate::outcome::Outcome;
use crate::signals;

/// Run a command, inheriting stdin/stdout/stderr, and describe how it ended.
pub fn run(command: &[String]) -> Result<Outcome> {
    let (cmd, args) = command.split_first().ok_or(Error::NoCommand)?;

    let command_str = command.join(" ");
    debug!(command = %command_str, "Running command");

    let mut process = Command::new(cmd);
    process
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let mut child = signals::CHILD
        .spawn(&mut process)
        .map_err(|source| Error::Spawn {
            command: cmd.clone(),
            source,
        })?;

    // Signals arriving from here on are forwarded to the child.
    let status = child.wait();
    signals::CHILD.release(child.id());
    let status = status?;

    let outcome = outcome_of(status);
    debug!(command = %command_str, %outcome, "Command finished");
    Ok(outcome)
}

fn outcome_of(status: std::process::ExitStatus) -> Outcome {
    if let Some(code) = status.code() {
        return Outcome::ChildExited(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signo) = status.signal() {
            return Outcome::Signaled(signo);
        }
    }

    Outcome::Unclassified(format!("child ended without exit value: {}", status))
}
