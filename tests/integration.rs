//! Integration tests for the buildexit CLI.
//!
//! Every test runs the real binary and checks the exit status the invoking
//! shell observes.

mod common;

use common::TestEnv;

const SUCCESS: i32 = 0;
const BAD_ARGV: i32 = 2;
const LOCAL_ENVIRONMENTAL_ERROR: i32 = 36;
const INTERNAL_ERROR: i32 = 37;

const DRIFTED_HEADER: &str = "\
enum ExitCode {
  SUCCESS = 0,
  BAD_ARGV = 2,
  LOCAL_ENVIRONMENTAL_ERROR = 36,
  INTERNAL_ERROR = 38,
};
";

// =============================================================================
// ARGUMENT HANDLING
// =============================================================================

#[test]
fn test_unknown_flag_is_bad_argv() {
    let env = TestEnv::new();
    let output = env.run(&["list", "--no-such-flag"]);
    TestEnv::assert_code(&output, BAD_ARGV);
}

#[test]
fn test_unknown_subcommand_is_bad_argv() {
    let env = TestEnv::new();
    let output = env.run(&["frobnicate"]);
    TestEnv::assert_code(&output, BAD_ARGV);
}

#[test]
fn test_conflicting_flags_are_bad_argv() {
    let env = TestEnv::new();
    let output = env.run(&["--quiet", "--verbose", "list"]);
    TestEnv::assert_code(&output, BAD_ARGV);
}

#[test]
fn test_help_and_version_succeed() {
    let env = TestEnv::new();
    TestEnv::assert_code(&env.run(&["--help"]), SUCCESS);
    TestEnv::assert_code(&env.run(&["--version"]), SUCCESS);
}

#[test]
fn test_no_command_prints_help() {
    let env = TestEnv::new();
    let output = env.run(&[]);
    TestEnv::assert_code(&output, SUCCESS);
    assert!(TestEnv::stdout(&output).contains("Usage"));
}

#[test]
fn test_invalid_rust_log_is_bad_argv() {
    let env = TestEnv::new();
    let output = env.run_with_env(&["list"], &[("RUST_LOG", "buildexit=loud")]);
    TestEnv::assert_code(&output, BAD_ARGV);
    assert!(TestEnv::stderr(&output).contains("RUST_LOG"));
}

// =============================================================================
// LIST / LOOKUP / CLASSIFY / SELECT
// =============================================================================

#[test]
fn test_list_shows_every_status() {
    let env = TestEnv::new();
    let output = env.run(&["list"]);

    TestEnv::assert_code(&output, SUCCESS);
    let stdout = TestEnv::stdout(&output);
    for name in [
        "SUCCESS",
        "BAD_ARGV",
        "LOCAL_ENVIRONMENTAL_ERROR",
        "INTERNAL_ERROR",
    ] {
        assert!(stdout.contains(name), "list should contain {}", name);
    }
    assert!(!stdout.contains('\x1b'), "NO_COLOR should disable color");
}

#[test]
fn test_list_fingerprint() {
    let env = TestEnv::new();
    let output = env.run(&["list", "--fingerprint"]);
    TestEnv::assert_code(&output, SUCCESS);
    assert_eq!(TestEnv::stdout(&output).trim(), "4253ac4b");
}

#[test]
fn test_lookup_prints_value() {
    let env = TestEnv::new();
    let output = env.run(&["lookup", "LOCAL_ENVIRONMENTAL_ERROR"]);
    TestEnv::assert_code(&output, SUCCESS);
    assert_eq!(TestEnv::stdout(&output).trim(), "36");
}

#[test]
fn test_lookup_unknown_name_is_bad_argv() {
    let env = TestEnv::new();
    let output = env.run(&["lookup", "BUILD_FAILURE"]);
    TestEnv::assert_code(&output, BAD_ARGV);
    assert!(TestEnv::stderr(&output).contains("BUILD_FAILURE"));
}

#[test]
fn test_classify_known_outcome() {
    let env = TestEnv::new();
    let output = env.run(&["classify", "missing-env:HOME"]);
    TestEnv::assert_code(&output, SUCCESS);
    assert_eq!(
        TestEnv::stdout(&output).trim(),
        "LOCAL_ENVIRONMENTAL_ERROR 36"
    );
}

#[test]
fn test_classify_unknown_outcome_is_last_resort() {
    let env = TestEnv::new();
    let output = env.run(&["classify", "cosmic-ray"]);
    TestEnv::assert_code(&output, SUCCESS);
    assert_eq!(TestEnv::stdout(&output).trim(), "INTERNAL_ERROR 37");
}

#[test]
fn test_select_user_error_beats_crash() {
    let env = TestEnv::new();
    let output = env.run(&["select", "BAD_ARGV", "INTERNAL_ERROR"]);
    TestEnv::assert_code(&output, SUCCESS);
    assert_eq!(TestEnv::stdout(&output).trim(), "BAD_ARGV 2");
}

#[test]
fn test_select_crash_alone() {
    let env = TestEnv::new();
    let output = env.run(&["select", "37"]);
    TestEnv::assert_code(&output, SUCCESS);
    assert_eq!(TestEnv::stdout(&output).trim(), "INTERNAL_ERROR 37");
}

#[test]
fn test_select_is_order_independent() {
    let env = TestEnv::new();
    let forward = env.run(&["select", "LOCAL_ENVIRONMENTAL_ERROR", "BAD_ARGV"]);
    let reverse = env.run(&["select", "BAD_ARGV", "LOCAL_ENVIRONMENTAL_ERROR"]);
    assert_eq!(TestEnv::stdout(&forward).trim(), "BAD_ARGV 2");
    assert_eq!(TestEnv::stdout(&reverse).trim(), "BAD_ARGV 2");
}

#[test]
fn test_select_unknown_candidate_is_bad_argv() {
    let env = TestEnv::new();
    let output = env.run(&["select", "BAD_ARGV", "1"]);
    TestEnv::assert_code(&output, BAD_ARGV);
}

// =============================================================================
// CHECK
// =============================================================================

#[test]
fn test_check_registry_only() {
    let env = TestEnv::new();
    let output = env.run(&["check"]);
    TestEnv::assert_code(&output, SUCCESS);
    assert!(TestEnv::stdout(&output).starts_with("ok 4253ac4b"));
}

#[test]
fn test_check_shipped_header_in_sync() {
    let env = TestEnv::new();
    let header = TestEnv::shipped_header();
    let output = env.run(&["check", "--header", header.to_str().unwrap()]);
    TestEnv::assert_code(&output, SUCCESS);
    assert!(TestEnv::stdout(&output).contains("in sync"));
}

#[test]
fn test_check_drifted_header_is_internal_error() {
    let env = TestEnv::new();
    let header = env.write_file("exit_codes.h", DRIFTED_HEADER);
    let output = env.run(&["check", "--header", header.to_str().unwrap()]);
    TestEnv::assert_code(&output, INTERNAL_ERROR);
    assert!(TestEnv::stderr(&output).contains("INTERNAL_ERROR is 37 here but 38"));
}

#[test]
fn test_check_missing_header_is_bad_argv() {
    let env = TestEnv::new();
    let output = env.run(&["check", "--header", "does/not/exist.h"]);
    TestEnv::assert_code(&output, BAD_ARGV);
    assert!(TestEnv::stderr(&output).contains("does/not/exist.h"));
}

#[test]
fn test_check_missing_configured_header_is_bad_argv() {
    let env = TestEnv::new();
    env.write_local_config("counterpart_header = \"gone.h\"\n");
    let output = env.run(&["check"]);
    TestEnv::assert_code(&output, BAD_ARGV);
}

#[test]
fn test_check_unreadable_header_is_environmental() {
    let env = TestEnv::new();
    let dir = env.work_dir.path().to_str().unwrap().to_string();
    let output = env.run(&["check", "--header", &dir]);
    TestEnv::assert_code(&output, LOCAL_ENVIRONMENTAL_ERROR);
}

#[test]
fn test_check_uses_configured_header() {
    let env = TestEnv::new();
    env.write_file("launcher_codes.h", DRIFTED_HEADER);
    env.write_local_config("counterpart_header = \"launcher_codes.h\"\n");

    let output = env.run(&["check"]);
    TestEnv::assert_code(&output, INTERNAL_ERROR);
}

#[test]
fn test_check_quiet_prints_nothing() {
    let env = TestEnv::new();
    let output = env.run(&["--quiet", "check"]);
    TestEnv::assert_code(&output, SUCCESS);
    assert!(TestEnv::stdout(&output).is_empty());
}

// =============================================================================
// CONFIG
// =============================================================================

#[test]
fn test_invalid_config_is_bad_argv() {
    let env = TestEnv::new();
    env.write_local_config("trap_signals = maybe\n");
    let output = env.run(&["check"]);
    TestEnv::assert_code(&output, BAD_ARGV);
}

#[test]
fn test_lookup_commands_ignore_local_config() {
    let env = TestEnv::new();
    env.write_local_config("trap_signals = maybe\n");
    let output = env.run(&["lookup", "BAD_ARGV"]);
    TestEnv::assert_code(&output, SUCCESS);
    assert_eq!(TestEnv::stdout(&output).trim(), "2");
}

#[test]
fn test_missing_config_file_is_bad_argv() {
    let env = TestEnv::new();
    let output = env.run(&["--config-file", "/nonexistent/buildexit.toml", "list"]);
    TestEnv::assert_code(&output, BAD_ARGV);
}

#[test]
fn test_missing_home_skips_user_config() {
    let env = TestEnv::new();
    let output = env.run_without_home(&["lookup", "SUCCESS"]);
    TestEnv::assert_code(&output, SUCCESS);
    assert_eq!(TestEnv::stdout(&output).trim(), "0");

    let output = env.run_without_home(&["check"]);
    TestEnv::assert_code(&output, SUCCESS);
}

#[test]
fn test_missing_home_for_tilde_header_is_environmental() {
    let env = TestEnv::new();
    env.write_local_config("counterpart_header = \"~/exit_codes.h\"\n");
    let output = env.run_without_home(&["check"]);
    TestEnv::assert_code(&output, LOCAL_ENVIRONMENTAL_ERROR);
    assert!(TestEnv::stderr(&output).contains("HOME"));
}

#[test]
fn test_unknown_config_key_warns() {
    let env = TestEnv::new();
    env.write_local_config("colour = true\n");
    let output = env.run(&["check"]);
    TestEnv::assert_code(&output, SUCCESS);
    assert!(TestEnv::stderr(&output).contains("Unknown config key"));
}

// =============================================================================
// OUTPUT FAILURES
// =============================================================================

#[cfg(target_os = "linux")]
mod output_failures {
    use super::*;
    use std::fs::File;
    use std::process::{Command, Stdio};

    fn run_into_full_device(args: &[&str]) -> std::process::Output {
        let full = File::options()
            .write(true)
            .open("/dev/full")
            .expect("Failed to open /dev/full");
        Command::new(TestEnv::bin())
            .args(args)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .stdout(Stdio::from(full))
            .stderr(Stdio::piped())
            .output()
            .expect("Failed to run buildexit")
    }

    #[test]
    fn test_panic_exits_with_internal_error() {
        // println! panics when stdout cannot be written.
        let output = run_into_full_device(&["list"]);
        TestEnv::assert_code(&output, INTERNAL_ERROR);
        assert!(TestEnv::stderr(&output).contains("panicked"));
    }

    #[test]
    fn test_unwritable_help_is_environmental() {
        let output = run_into_full_device(&["--help"]);
        TestEnv::assert_code(&output, LOCAL_ENVIRONMENTAL_ERROR);
        assert!(TestEnv::stderr(&output).contains("Failed to write usage message"));
    }
}

// =============================================================================
// RUN
// =============================================================================

#[cfg(unix)]
mod run {
    use super::*;

    fn run_sh(env: &TestEnv, script: &str) -> std::process::Output {
        env.run(&["run", "--", "sh", "-c", script])
    }

    #[test]
    fn test_run_success() {
        let env = TestEnv::new();
        TestEnv::assert_code(&run_sh(&env, "exit 0"), SUCCESS);
    }

    #[test]
    fn test_run_forwards_registry_values() {
        let env = TestEnv::new();
        TestEnv::assert_code(&run_sh(&env, "exit 2"), BAD_ARGV);
        TestEnv::assert_code(&run_sh(&env, "exit 36"), LOCAL_ENVIRONMENTAL_ERROR);
        TestEnv::assert_code(&run_sh(&env, "exit 37"), INTERNAL_ERROR);
    }

    #[test]
    fn test_run_unmapped_value_is_internal_error() {
        let env = TestEnv::new();
        TestEnv::assert_code(&run_sh(&env, "exit 1"), INTERNAL_ERROR);
        TestEnv::assert_code(&run_sh(&env, "exit 101"), INTERNAL_ERROR);
    }

    #[test]
    fn test_run_killed_child_is_internal_error() {
        let env = TestEnv::new();
        TestEnv::assert_code(&run_sh(&env, "kill -9 $$"), INTERNAL_ERROR);
    }

    #[test]
    fn test_run_missing_program_is_bad_argv() {
        let env = TestEnv::new();
        let output = env.run(&["run", "--", "buildexit-no-such-program"]);
        TestEnv::assert_code(&output, BAD_ARGV);
    }
}

// =============================================================================
// SIGNALS
// =============================================================================

#[cfg(unix)]
mod signals {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn terminate(child: &std::process::Child) {
        // Give the process time to install its handlers.
        thread::sleep(Duration::from_millis(1000));
        let rc = unsafe { libc::kill(child.id() as libc::pid_t, libc::SIGTERM) };
        assert_eq!(rc, 0);
    }

    #[test]
    fn test_sigterm_exits_with_internal_error() {
        let env = TestEnv::new();
        let mut child = env.spawn(&["run", "--", "sleep", "30"]);
        terminate(&child);
        let status = child.wait().unwrap();
        assert_eq!(status.code(), Some(INTERNAL_ERROR));
    }

    #[test]
    fn test_sigterm_stops_wrapped_child() {
        let env = TestEnv::new();
        let marker = env.work_dir.path().join("marker");
        let mut child = env.spawn(&["run", "--", "sh", "-c", "sleep 3; touch marker"]);
        terminate(&child);
        let status = child.wait().unwrap();
        assert_eq!(status.code(), Some(INTERNAL_ERROR));

        // Long enough for an orphaned child to have finished its sleep.
        thread::sleep(Duration::from_millis(3000));
        assert!(!marker.exists());
    }

    #[test]
    fn test_sigterm_keeps_child_outcome() {
        let env = TestEnv::new();
        let mut child = env.spawn(&[
            "run",
            "--",
            "sh",
            "-c",
            "trap 'exit 2' TERM; sleep 30 & wait",
        ]);
        terminate(&child);
        let status = child.wait().unwrap();
        assert_eq!(status.code(), Some(BAD_ARGV));
    }

    #[test]
    fn test_untrapped_sigterm_is_raw_signal() {
        use std::os::unix::process::ExitStatusExt;

        let env = TestEnv::new();
        env.write_local_config("trap_signals = false\n");
        let mut child = env.spawn(&["run", "--", "sleep", "30"]);
        terminate(&child);
        let status = child.wait().unwrap();
        assert_eq!(status.code(), None);
        assert_eq!(status.signal(), Some(libc::SIGTERM));
    }
}
