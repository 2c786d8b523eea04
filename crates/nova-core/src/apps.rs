//! Static application descriptor map: symbolic app key -> per-OS launch path.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating-system family the launch/terminate behavior branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OsFamily {
    Windows,
    MacOs,
    Linux,
}

impl OsFamily {
    /// Family of the running binary. Non-Windows, non-macOS targets use the Linux branch.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => OsFamily::Windows,
            "macos" => OsFamily::MacOs,
            _ => OsFamily::Linux,
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OsFamily::Windows => "Windows",
            OsFamily::MacOs => "Darwin",
            OsFamily::Linux => "Linux",
        };
        f.write_str(name)
    }
}

/// Launch paths for one application. A missing entry means the app is unsupported on that OS.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDescriptor {
    #[serde(default)]
    pub windows: Option<String>,
    #[serde(default, alias = "darwin")]
    pub macos: Option<String>,
    #[serde(default)]
    pub linux: Option<String>,
}

impl AppDescriptor {
    pub fn path_for(&self, os: OsFamily) -> Option<&str> {
        let path = match os {
            OsFamily::Windows => self.windows.as_deref(),
            OsFamily::MacOs => self.macos.as_deref(),
            OsFamily::Linux => self.linux.as_deref(),
        };
        path.map(str::trim).filter(|p| !p.is_empty())
    }
}

/// Read-only lookup table consulted by the process controller.
#[derive(Debug, Clone, Default)]
pub struct AppCatalog {
    entries: HashMap<String, AppDescriptor>,
}

impl AppCatalog {
    /// Browser and editor entries shipped with the assistant.
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            "chrome".to_string(),
            AppDescriptor {
                windows: Some(r"C:\Program Files\Google\Chrome\Application\chrome.exe".to_string()),
                macos: Some("/Applications/Google Chrome.app".to_string()),
                linux: Some("google-chrome".to_string()),
            },
        );
        entries.insert(
            "vscode".to_string(),
            AppDescriptor {
                windows: Some(
                    r"C:\Users\%USERNAME%\AppData\Local\Programs\Microsoft VS Code\Code.exe"
                        .to_string(),
                ),
                macos: Some("/Applications/Visual Studio Code.app".to_string()),
                linux: Some("code".to_string()),
            },
        );
        Self { entries }
    }

    /// Replace or add entries; keys are normalized the same way lookups are.
    pub fn merged(mut self, extra: HashMap<String, AppDescriptor>) -> Self {
        for (key, descriptor) in extra {
            self.entries.insert(normalize_key(&key), descriptor);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&AppDescriptor> {
        self.entries.get(&normalize_key(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Trim and lowercase an app name for lookup.
pub fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Expand `~`, `$VAR`, `${VAR}` and `%VAR%` in a configured path.
///
/// Unknown variables are left as written, so a bad path fails at launch time with the
/// original text in the error.
pub fn expand_placeholders(path: &str) -> String {
    let path = expand_home(path);
    let path = expand_dollar_vars(&path);
    expand_percent_vars(&path)
}

fn expand_home(path: &str) -> String {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return path.to_string(),
    };
    match dirs::home_dir() {
        Some(home) => format!("{}{}", home.display(), rest),
        None => path.to_string(),
    }
}

fn is_var_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn expand_dollar_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                let name = &braced[..end];
                match std::env::var(name) {
                    Ok(value) if !name.is_empty() => out.push_str(&value),
                    _ => out.push_str(&rest[pos..pos + 3 + end]),
                }
                rest = &braced[end + 1..];
                continue;
            }
            out.push('$');
            rest = after;
            continue;
        }
        let len = after.find(|c: char| !is_var_char(c)).unwrap_or(after.len());
        let name = &after[..len];
        match std::env::var(name) {
            Ok(value) if !name.is_empty() => out.push_str(&value),
            _ => {
                out.push('$');
                out.push_str(name);
            }
        }
        rest = &after[len..];
    }
    out.push_str(rest);
    out
}

fn expand_percent_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) if end > 0 && after[..end].chars().all(is_var_char) => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(value) => out.push_str(&value),
                    Err(_) => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            _ => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_and_whitespace_insensitive() {
        let catalog = AppCatalog::builtin();
        assert!(catalog.get("  Chrome ").is_some());
        assert!(catalog.get("VSCODE").is_some());
        assert!(catalog.get("notepad").is_none());
    }

    #[test]
    fn descriptor_reports_missing_platform_path() {
        let descriptor = AppDescriptor {
            windows: None,
            macos: Some("/Applications/Foo.app".into()),
            linux: Some("  ".into()),
        };
        assert_eq!(descriptor.path_for(OsFamily::MacOs), Some("/Applications/Foo.app"));
        assert_eq!(descriptor.path_for(OsFamily::Windows), None);
        assert_eq!(descriptor.path_for(OsFamily::Linux), None);
    }

    #[test]
    fn merged_entries_override_builtins() {
        let mut extra = HashMap::new();
        extra.insert(
            "Chrome".to_string(),
            AppDescriptor {
                linux: Some("chromium".into()),
                ..Default::default()
            },
        );
        let catalog = AppCatalog::builtin().merged(extra);
        assert_eq!(
            catalog.get("chrome").and_then(|d| d.path_for(OsFamily::Linux)),
            Some("chromium")
        );
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn expands_percent_and_dollar_variables() {
        std::env::set_var("NOVA_APPS_TEST_USER", "ada");
        assert_eq!(
            expand_placeholders(r"C:\Users\%NOVA_APPS_TEST_USER%\Code.exe"),
            r"C:\Users\ada\Code.exe"
        );
        assert_eq!(expand_placeholders("/home/$NOVA_APPS_TEST_USER/bin"), "/home/ada/bin");
        assert_eq!(expand_placeholders("/home/${NOVA_APPS_TEST_USER}x"), "/home/adax");
    }

    #[test]
    fn unknown_variables_are_left_verbatim() {
        assert_eq!(
            expand_placeholders("%NOVA_SURELY_UNSET_VAR%/x"),
            "%NOVA_SURELY_UNSET_VAR%/x"
        );
        assert_eq!(expand_placeholders("$NOVA_SURELY_UNSET_VAR/x"), "$NOVA_SURELY_UNSET_VAR/x");
        assert_eq!(expand_placeholders("100% sure"), "100% sure");
    }

    #[test]
    fn expands_leading_tilde_only() {
        let expanded = expand_placeholders("~/apps/tool");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, format!("{}/apps/tool", home.display()));
        }
        assert_eq!(expand_placeholders("a~b"), "a~b");
    }
}
