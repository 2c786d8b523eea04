//! Per-platform launch/terminate actions behind one [`ProcessLauncher`] interface.
//!
//! - **Windows**: `cmd /C start "" <path>` (the shell's "start file" action), `taskkill /f /im`.
//! - **macOS**: `open -a <bundle>`, `pkill -f`.
//! - **Linux and other Unix**: the configured command is shell-token split and spawned directly, `pkill -f`.
//!
//! Direct spawns are fire-and-forget: a detached thread reaps the child when it exits, so finished
//! apps never linger as zombies. The Windows and macOS open actions hand off to `start`/`open`, which
//! return promptly; their exit status decides success. Terminate waits for the kill command so its
//! exit status can be reported.

use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;

use tracing::debug;

use crate::apps::OsFamily;
use crate::error::{NovaError, NovaResult};

/// Result of a terminate-by-name attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminateOutcome {
    /// The kill command reported at least one matching process.
    pub matched: bool,
}

pub trait ProcessLauncher: Send + Sync {
    /// Platform this launcher drives. Selects the descriptor path.
    fn os(&self) -> OsFamily;

    /// Launch a configured application path with the platform's native action.
    fn open_path(&self, path: &str) -> NovaResult<()>;

    /// Spawn an already tokenized command line.
    fn spawn(&self, argv: &[String]) -> NovaResult<()>;

    /// Best-effort terminate of every process matching `name`.
    fn terminate(&self, name: &str) -> NovaResult<TerminateOutcome>;
}

pub type SharedLauncher = Arc<dyn ProcessLauncher>;

/// Launcher for the platform this binary was compiled for.
pub fn default_launcher() -> SharedLauncher {
    #[cfg(windows)]
    {
        Arc::new(WindowsLauncher)
    }

    #[cfg(target_os = "macos")]
    {
        Arc::new(MacLauncher)
    }

    #[cfg(not(any(windows, target_os = "macos")))]
    {
        Arc::new(UnixLauncher)
    }
}

/// Split a command line the way a POSIX shell would, without running a shell.
pub fn split_command(command: &str) -> NovaResult<Vec<String>> {
    let argv = shlex::split(command).ok_or_else(|| {
        NovaError::LaunchFailure(format!("malformed command (unmatched quotes): {command}"))
    })?;
    if argv.is_empty() {
        return Err(NovaError::LaunchFailure("command is empty".to_string()));
    }
    Ok(argv)
}

fn spawn_detached(program: &str, args: &[String]) -> NovaResult<()> {
    debug!("Spawning {} {:?}", program, args);
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| NovaError::LaunchFailure(format!("failed to spawn {program}: {e}")))?;
    let pid = child.id();
    std::thread::spawn(move || match child.wait() {
        Ok(status) => debug!("Child {} exited: {}", pid, status),
        Err(e) => debug!("Child {} could not be reaped: {}", pid, e),
    });
    Ok(())
}

fn run_to_status<S: AsRef<std::ffi::OsStr> + std::fmt::Debug>(
    program: &str,
    args: &[S],
) -> NovaResult<ExitStatus> {
    debug!("Running {} {:?}", program, args);
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| NovaError::LaunchFailure(format!("failed to run {program}: {e}")))
}

/// Run a launcher command that returns once the app is handed off; non-zero exit is a failure.
fn run_checked(argv: &[String]) -> NovaResult<()> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| NovaError::LaunchFailure("command is empty".to_string()))?;
    let status = run_to_status(program, args)?;
    if status.success() {
        Ok(())
    } else {
        Err(NovaError::LaunchFailure(format!("{program} exited with {status}")))
    }
}

/// `cmd /C start "" <path>`; the empty string is the window title `start` expects before a path.
fn windows_open_argv(path: &str) -> Vec<String> {
    ["cmd", "/C", "start", "", path]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// `open -a <bundle>`.
fn mac_open_argv(path: &str) -> Vec<String> {
    vec!["open".to_string(), "-a".to_string(), path.to_string()]
}

fn spawn_argv(argv: &[String]) -> NovaResult<()> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| NovaError::LaunchFailure("command is empty".to_string()))?;
    spawn_detached(program, args)
}

/// `pkill` exits 0 when something matched and 1 when nothing did.
fn pkill(name: &str) -> NovaResult<TerminateOutcome> {
    let status = run_to_status("pkill", &["-f", name])?;
    Ok(TerminateOutcome {
        matched: status.success(),
    })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsLauncher;

impl ProcessLauncher for WindowsLauncher {
    fn os(&self) -> OsFamily {
        OsFamily::Windows
    }

    fn open_path(&self, path: &str) -> NovaResult<()> {
        run_checked(&windows_open_argv(path))
    }

    fn spawn(&self, argv: &[String]) -> NovaResult<()> {
        spawn_argv(argv)
    }

    fn terminate(&self, name: &str) -> NovaResult<TerminateOutcome> {
        let image = format!("{name}.exe");
        let status = run_to_status("taskkill", &["/f", "/im", image.as_str()])?;
        Ok(TerminateOutcome {
            matched: status.success(),
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MacLauncher;

impl ProcessLauncher for MacLauncher {
    fn os(&self) -> OsFamily {
        OsFamily::MacOs
    }

    fn open_path(&self, path: &str) -> NovaResult<()> {
        run_checked(&mac_open_argv(path))
    }

    fn spawn(&self, argv: &[String]) -> NovaResult<()> {
        spawn_argv(argv)
    }

    fn terminate(&self, name: &str) -> NovaResult<TerminateOutcome> {
        pkill(name)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UnixLauncher;

impl ProcessLauncher for UnixLauncher {
    fn os(&self) -> OsFamily {
        OsFamily::Linux
    }

    fn open_path(&self, path: &str) -> NovaResult<()> {
        let argv = split_command(path)?;
        spawn_argv(&argv)
    }

    fn spawn(&self, argv: &[String]) -> NovaResult<()> {
        spawn_argv(argv)
    }

    fn terminate(&self, name: &str) -> NovaResult<TerminateOutcome> {
        pkill(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_honors_quotes() {
        let argv = split_command(r#"code --new-window "/tmp/my project""#).expect("split");
        assert_eq!(argv, vec!["code", "--new-window", "/tmp/my project"]);
    }

    #[test]
    fn split_rejects_unbalanced_quotes_and_blank_input() {
        assert!(matches!(
            split_command(r#"code "unterminated"#),
            Err(NovaError::LaunchFailure(_))
        ));
        assert!(matches!(split_command("   "), Err(NovaError::LaunchFailure(_))));
    }

    #[test]
    fn launchers_report_their_platform() {
        assert_eq!(WindowsLauncher.os(), OsFamily::Windows);
        assert_eq!(MacLauncher.os(), OsFamily::MacOs);
        assert_eq!(UnixLauncher.os(), OsFamily::Linux);
        assert_eq!(default_launcher().os(), OsFamily::current());
    }

    #[cfg(unix)]
    #[test]
    fn spawning_a_missing_binary_is_a_launch_failure() {
        let err = UnixLauncher
            .spawn(&["nova-definitely-not-a-real-binary".to_string()])
            .expect_err("spawn should fail");
        assert!(matches!(err, NovaError::LaunchFailure(msg) if msg.contains("failed to spawn")));
    }

    #[test]
    fn open_argv_per_platform() {
        assert_eq!(
            windows_open_argv(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            vec![
                "cmd",
                "/C",
                "start",
                "",
                r"C:\Program Files\Google\Chrome\Application\chrome.exe"
            ]
        );
        assert_eq!(
            mac_open_argv("/Applications/Google Chrome.app"),
            vec!["open", "-a", "/Applications/Google Chrome.app"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_of_open_action_is_a_launch_failure() {
        assert!(run_checked(&["true".to_string()]).is_ok());
        let err = run_checked(&["false".to_string()]).expect_err("false exits 1");
        assert!(matches!(err, NovaError::LaunchFailure(msg) if msg.contains("false exited")));
    }

    /// Children of this process currently in the zombie state.
    #[cfg(target_os = "linux")]
    fn zombie_children() -> usize {
        let me = std::process::id().to_string();
        std::fs::read_dir("/proc")
            .map(|rd| {
                rd.filter_map(|e| e.ok())
                    .filter_map(|e| std::fs::read_to_string(e.path().join("stat")).ok())
                    .filter(|stat| {
                        // Fields after the `(comm)` are: state ppid ...
                        let rest = stat.rsplit_once(')').map(|(_, r)| r).unwrap_or("");
                        let mut fields = rest.split_whitespace();
                        let state = fields.next();
                        let ppid = fields.next();
                        state == Some("Z") && ppid == Some(me.as_str())
                    })
                    .count()
            })
            .unwrap_or(0)
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn exited_children_are_reaped() {
        for _ in 0..3 {
            UnixLauncher.spawn(&["true".to_string()]).expect("spawn true");
        }
        let mut zombies = usize::MAX;
        for _ in 0..20 {
            std::thread::sleep(std::time::Duration::from_millis(100));
            zombies = zombie_children();
            if zombies == 0 {
                break;
            }
        }
        assert_eq!(zombies, 0, "exited launches left zombie children");
    }

    #[test]
    fn empty_argv_is_rejected() {
        assert!(matches!(UnixLauncher.spawn(&[]), Err(NovaError::LaunchFailure(_))));
    }
}
