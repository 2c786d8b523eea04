use std::sync::Arc;

use tracing::{info, warn};

use super::launcher::{split_command, SharedLauncher};
use crate::apps::{expand_placeholders, normalize_key, AppCatalog};
use crate::error::{NovaError, NovaResult};

/// How an open request was satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opened {
    /// Launched from the descriptor map.
    Descriptor { name: String, path: String },
    /// Not in the map; the raw name was run as a command line.
    Shell { name: String },
}

impl Opened {
    pub fn message(&self) -> String {
        match self {
            Opened::Descriptor { name, .. } => format!("Opened {name}"),
            Opened::Shell { name } => format!("Launched {name} via shell"),
        }
    }
}

/// Outcome of a best-effort close. `matched` is false when no process was found; that is
/// still a success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closed {
    pub name: String,
    pub matched: bool,
}

impl Closed {
    pub fn message(&self) -> String {
        if self.matched {
            format!("Closed {}", self.name)
        } else {
            format!("Attempted to close {} (no matching process found)", self.name)
        }
    }
}

/// Resolves symbolic app names and drives the platform launcher.
#[derive(Clone)]
pub struct ProcessController {
    launcher: SharedLauncher,
    catalog: Arc<AppCatalog>,
}

impl ProcessController {
    pub fn new(launcher: SharedLauncher, catalog: AppCatalog) -> Self {
        Self {
            launcher,
            catalog: Arc::new(catalog),
        }
    }

    pub fn catalog(&self) -> &AppCatalog {
        &self.catalog
    }

    /// Launch `name` from the descriptor map, or as a raw command line when unknown.
    pub fn open(&self, name: &str) -> NovaResult<Opened> {
        let app = name.trim();
        if app.is_empty() {
            return Err(NovaError::InvalidInput("missing app name".to_string()));
        }
        let os = self.launcher.os();
        let key = normalize_key(app);

        if let Some(descriptor) = self.catalog.get(&key) {
            let raw = descriptor.path_for(os).ok_or_else(|| NovaError::UnsupportedApp {
                app: app.to_string(),
                os: os.to_string(),
            })?;
            let path = expand_placeholders(raw);
            self.launcher.open_path(&path).map_err(|e| {
                warn!("open {} via {} failed: {}", app, path, e);
                NovaError::LaunchFailure(format!("Failed to open {app}: {}", cause(&e)))
            })?;
            info!("Opened {} ({})", app, path);
            return Ok(Opened::Descriptor {
                name: app.to_string(),
                path,
            });
        }

        split_command(app)
            .and_then(|argv| self.launcher.spawn(&argv))
            .map_err(|e| {
                warn!("shell launch of {} failed: {}", app, e);
                NovaError::LaunchFailure(format!(
                    "Unknown app and shell launch failed: {}",
                    cause(&e)
                ))
            })?;
        info!("Launched {} via shell", app);
        Ok(Opened::Shell {
            name: app.to_string(),
        })
    }

    /// Best-effort terminate by name. Only a failure to run the kill command is an error.
    pub fn close(&self, name: &str) -> NovaResult<Closed> {
        let app = name.trim();
        if app.is_empty() {
            return Err(NovaError::InvalidInput("missing app name".to_string()));
        }
        let outcome = self.launcher.terminate(app).map_err(|e| {
            warn!("terminate {} failed: {}", app, e);
            NovaError::LaunchFailure(format!("Failed to close {app}: {}", cause(&e)))
        })?;
        info!("Close {} (matched: {})", app, outcome.matched);
        Ok(Closed {
            name: app.to_string(),
            matched: outcome.matched,
        })
    }
}

fn cause(err: &NovaError) -> String {
    match err {
        NovaError::LaunchFailure(msg) => msg.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::apps::{AppDescriptor, OsFamily};
    use crate::process::launcher::{ProcessLauncher, TerminateOutcome};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        OpenPath(String),
        Spawn(Vec<String>),
        Terminate(String),
    }

    struct FakeLauncher {
        os: OsFamily,
        fail: bool,
        matched: bool,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeLauncher {
        fn new(os: OsFamily) -> Self {
            Self {
                os,
                fail: false,
                matched: true,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn result(&self) -> NovaResult<()> {
            if self.fail {
                Err(NovaError::LaunchFailure("no such file".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl ProcessLauncher for FakeLauncher {
        fn os(&self) -> OsFamily {
            self.os
        }

        fn open_path(&self, path: &str) -> NovaResult<()> {
            self.calls.lock().unwrap().push(Call::OpenPath(path.to_string()));
            self.result()
        }

        fn spawn(&self, argv: &[String]) -> NovaResult<()> {
            self.calls.lock().unwrap().push(Call::Spawn(argv.to_vec()));
            self.result()
        }

        fn terminate(&self, name: &str) -> NovaResult<TerminateOutcome> {
            self.calls.lock().unwrap().push(Call::Terminate(name.to_string()));
            self.result()?;
            Ok(TerminateOutcome {
                matched: self.matched,
            })
        }
    }

    fn controller(launcher: Arc<FakeLauncher>) -> ProcessController {
        ProcessController::new(launcher, AppCatalog::builtin())
    }

    #[test]
    fn known_app_uses_descriptor_path_for_platform() {
        let launcher = Arc::new(FakeLauncher::new(OsFamily::MacOs));
        let opened = controller(launcher.clone()).open(" Chrome ").expect("open");
        assert_eq!(opened.message(), "Opened Chrome");
        assert_eq!(
            launcher.calls(),
            vec![Call::OpenPath("/Applications/Google Chrome.app".to_string())]
        );
    }

    #[test]
    fn unknown_app_falls_back_to_shell_launch() {
        let launcher = Arc::new(FakeLauncher::new(OsFamily::Linux));
        let opened = controller(launcher.clone())
            .open("gedit notes.txt")
            .expect("open");
        assert_eq!(
            opened,
            Opened::Shell {
                name: "gedit notes.txt".to_string()
            }
        );
        assert_eq!(opened.message(), "Launched gedit notes.txt via shell");
        assert_eq!(
            launcher.calls(),
            vec![Call::Spawn(vec!["gedit".to_string(), "notes.txt".to_string()])]
        );
    }

    #[test]
    fn missing_platform_path_is_unsupported() {
        let launcher = Arc::new(FakeLauncher::new(OsFamily::Windows));
        let mut extra = HashMap::new();
        extra.insert(
            "safari".to_string(),
            AppDescriptor {
                macos: Some("/Applications/Safari.app".into()),
                ..Default::default()
            },
        );
        let controller =
            ProcessController::new(launcher.clone(), AppCatalog::builtin().merged(extra));
        let err = controller.open("safari").expect_err("unsupported");
        assert_eq!(err.to_string(), "No configured path for safari on Windows");
        assert!(launcher.calls().is_empty());
    }

    #[test]
    fn launch_error_is_reported_as_launch_failure() {
        let mut fake = FakeLauncher::new(OsFamily::Linux);
        fake.fail = true;
        let launcher = Arc::new(fake);
        let err = controller(launcher.clone()).open("vscode").expect_err("fails");
        assert_eq!(err.to_string(), "Failed to open vscode: no such file");

        let err = controller(launcher).open("mystery-tool").expect_err("fails");
        assert_eq!(
            err.to_string(),
            "Unknown app and shell launch failed: no such file"
        );
    }

    #[test]
    fn close_is_best_effort() {
        let mut fake = FakeLauncher::new(OsFamily::Linux);
        fake.matched = false;
        let launcher = Arc::new(fake);
        let closed = controller(launcher.clone()).close("VSCode").expect("close");
        assert!(!closed.matched);
        assert_eq!(
            closed.message(),
            "Attempted to close VSCode (no matching process found)"
        );
        assert_eq!(launcher.calls(), vec![Call::Terminate("VSCode".to_string())]);
    }

    #[test]
    fn close_reports_match() {
        let launcher = Arc::new(FakeLauncher::new(OsFamily::Windows));
        let closed = controller(launcher).close("notepad").expect("close");
        assert_eq!(closed.message(), "Closed notepad");
    }

    #[test]
    fn blank_names_are_invalid_input() {
        let launcher = Arc::new(FakeLauncher::new(OsFamily::Linux));
        let controller = controller(launcher);
        assert!(matches!(controller.open("  "), Err(NovaError::InvalidInput(_))));
        assert!(matches!(controller.close(""), Err(NovaError::InvalidInput(_))));
    }
}
