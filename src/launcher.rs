//! Application Launcher
//!
//! Maps logical app names ("calculator", "file explorer") to a platform
//! invocation and spawns it without waiting. Linux entries list candidates in
//! preference order; the first one found on PATH wins. Exited children are
//! reaped in the background.

use crate::audit::{self, AuditEvent};
use crate::error::LaunchError;
use crate::utils::fuzzy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, info, warn};

/// Minimum similarity for a "did you mean" hint
const SUGGESTION_CUTOFF: f64 = 0.6;

/// Per-platform invocation strings for one application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppEntry {
    pub windows: Option<String>,
    pub linux: Vec<String>,
    pub mac: Option<String>,
}

fn entry(windows: &str, linux: &[&str], mac: &str) -> AppEntry {
    AppEntry {
        windows: Some(windows.to_string()),
        linux: linux.iter().map(|s| s.to_string()).collect(),
        mac: Some(mac.to_string()),
    }
}

/// Built-in application table
pub fn default_applications() -> BTreeMap<String, AppEntry> {
    BTreeMap::from([
        (
            "calculator".to_string(),
            entry("calc.exe", &["gnome-calculator", "kcalc"], "open -a Calculator"),
        ),
        (
            "notepad".to_string(),
            entry("notepad.exe", &["gedit", "kate", "mousepad"], "open -a TextEdit"),
        ),
        (
            "browser".to_string(),
            entry(
                "start chrome",
                &["xdg-open https://www.google.com"],
                "open -a Safari",
            ),
        ),
        (
            "spotify".to_string(),
            entry(
                "spotify",
                &["spotify", "xdg-open https://open.spotify.com"],
                "open -a Spotify",
            ),
        ),
        (
            "terminal".to_string(),
            entry(
                "cmd.exe",
                &["gnome-terminal", "konsole", "x-terminal-emulator"],
                "open -a Terminal",
            ),
        ),
        (
            "file explorer".to_string(),
            entry("explorer", &["nautilus", "dolphin", "xdg-open ."], "open ."),
        ),
    ])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    Mac,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            "macos" => Platform::Mac,
            _ => Platform::Other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::Mac => "macOS",
            Platform::Other => std::env::consts::OS,
        }
    }
}

/// A resolved launch, ready to spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub app: String,
    pub invocation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(LaunchCommand),
    /// Known app, no invocation for this platform
    Unsupported,
    Unknown { suggestion: Option<String> },
}

/// Boundary to the OS process table
pub trait Launcher: Send + Sync {
    fn resolve(&self, app: &str) -> Resolution;

    /// Registered logical names, sorted
    fn apps(&self) -> Vec<String>;

    /// Fire-and-forget spawn
    fn spawn(&self, command: &LaunchCommand) -> Result<(), LaunchError>;

    fn open_url(&self, url: &str) -> Result<(), LaunchError>;
}

/// Launches real processes
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    apps: BTreeMap<String, AppEntry>,
    platform: Platform,
}

impl SystemLauncher {
    pub fn new(apps: BTreeMap<String, AppEntry>) -> Self {
        Self::with_platform(apps, Platform::current())
    }

    pub fn with_platform(apps: BTreeMap<String, AppEntry>, platform: Platform) -> Self {
        let apps = apps
            .into_iter()
            .map(|(name, entry)| (name.trim().to_lowercase(), entry))
            .collect();
        Self { apps, platform }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    fn invocation_for(&self, entry: &AppEntry) -> Option<String> {
        let invocation = match self.platform {
            Platform::Windows => entry.windows.clone(),
            Platform::Mac => entry.mac.clone(),
            Platform::Linux => entry
                .linux
                .iter()
                .find(|candidate| {
                    candidate
                        .split_whitespace()
                        .next()
                        .is_some_and(|program| which::which(program).is_ok())
                })
                .cloned(),
            Platform::Other => None,
        };
        invocation.filter(|inv| !inv.trim().is_empty())
    }

    fn command_for(&self, invocation: &str) -> Result<Command, LaunchError> {
        let mut command = if self.platform == Platform::Windows {
            let mut c = Command::new("cmd");
            c.args(["/C", invocation]);
            c
        } else {
            let mut parts = invocation.split_whitespace();
            let program = parts
                .next()
                .ok_or_else(|| LaunchError::EmptyInvocation(invocation.to_string()))?;
            let mut c = Command::new(program);
            c.args(parts);
            c
        };
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        Ok(command)
    }

    /// Spawn without waiting; returns the child's pid
    fn run_detached(&self, label: &str, invocation: &str) -> Result<Option<u32>, LaunchError> {
        let program = invocation
            .split_whitespace()
            .next()
            .unwrap_or(invocation)
            .to_string();
        let mut command = self.command_for(invocation)?;
        let spawn_failed = |source| LaunchError::Spawn { program, source };
        let label_owned = label.to_string();

        let pid = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let mut child = tokio::process::Command::from(command)
                    .spawn()
                    .map_err(spawn_failed)?;
                let pid = child.id();
                runtime.spawn(async move { log_exit(&label_owned, child.wait().await) });
                pid
            }
            // No runtime (plain threads, sync tests)
            Err(_) => {
                let mut child = command.spawn().map_err(spawn_failed)?;
                let pid = child.id();
                std::thread::spawn(move || log_exit(&label_owned, child.wait()));
                Some(pid)
            }
        };

        info!("🚀 Launched {} ({})", label, invocation);
        Ok(pid)
    }
}

fn log_exit(label: &str, status: io::Result<ExitStatus>) {
    match status {
        Ok(status) => debug!("{} exited: {}", label, status),
        Err(e) => warn!("Lost track of {}: {}", label, e),
    }
}

impl Launcher for SystemLauncher {
    fn resolve(&self, app: &str) -> Resolution {
        let name = fuzzy::strip_articles(app.trim()).to_lowercase();
        match self.apps.get(&name) {
            Some(entry) => match self.invocation_for(entry) {
                Some(invocation) => Resolution::Resolved(LaunchCommand {
                    app: name,
                    invocation,
                }),
                None => Resolution::Unsupported,
            },
            None => Resolution::Unknown {
                suggestion: fuzzy::find_best_match(&name, &self.apps(), SUGGESTION_CUTOFF)
                    .map(|m| m.value),
            },
        }
    }

    fn apps(&self) -> Vec<String> {
        self.apps.keys().cloned().collect()
    }

    fn spawn(&self, command: &LaunchCommand) -> Result<(), LaunchError> {
        if command.invocation.trim().is_empty() {
            return Err(LaunchError::EmptyInvocation(command.app.clone()));
        }
        self.run_detached(&command.app, &command.invocation)?;
        write_audit(&AuditEvent::Launch {
            app: &command.app,
            invocation: &command.invocation,
        });
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<(), LaunchError> {
        let invocation = match self.platform {
            Platform::Windows => format!("start \"\" \"{}\"", url),
            Platform::Mac => format!("open {}", url),
            Platform::Linux | Platform::Other => format!("xdg-open {}", url),
        };
        self.run_detached("url", &invocation)?;
        write_audit(&AuditEvent::OpenUrl(url));
        Ok(())
    }
}

fn write_audit(event: &AuditEvent<'_>) {
    if let Err(e) = audit::record(event) {
        warn!("Failed to write audit log: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher(platform: Platform) -> SystemLauncher {
        SystemLauncher::with_platform(default_applications(), platform)
    }

    #[test]
    fn test_resolve_windows_and_mac() {
        let win = launcher(Platform::Windows);
        assert_eq!(
            win.resolve("calculator"),
            Resolution::Resolved(LaunchCommand {
                app: "calculator".to_string(),
                invocation: "calc.exe".to_string(),
            })
        );

        let mac = launcher(Platform::Mac);
        match mac.resolve("The Terminal") {
            Resolution::Resolved(cmd) => assert_eq!(cmd.invocation, "open -a Terminal"),
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_unmapped_platform_is_unsupported() {
        assert_eq!(launcher(Platform::Other).resolve("calculator"), Resolution::Unsupported);

        let mut apps = BTreeMap::new();
        apps.insert(
            "calculator".to_string(),
            AppEntry {
                windows: Some("calc.exe".to_string()),
                ..Default::default()
            },
        );
        let mac = SystemLauncher::with_platform(apps, Platform::Mac);
        assert_eq!(mac.resolve("calculator"), Resolution::Unsupported);
    }

    #[test]
    fn test_linux_candidates_require_installed_program() {
        let mut apps = BTreeMap::new();
        apps.insert(
            "ghost".to_string(),
            AppEntry {
                linux: vec!["definitely-not-installed-jarvis-app".to_string()],
                ..Default::default()
            },
        );
        let linux = SystemLauncher::with_platform(apps, Platform::Linux);
        assert_eq!(linux.resolve("ghost"), Resolution::Unsupported);
    }

    #[test]
    fn test_unknown_app_suggestion() {
        let win = launcher(Platform::Windows);
        assert_eq!(
            win.resolve("calculater"),
            Resolution::Unknown {
                suggestion: Some("calculator".to_string())
            }
        );
        assert_eq!(
            win.resolve("photoshop"),
            Resolution::Unknown { suggestion: None }
        );
    }

    #[test]
    fn test_empty_invocation_rejected() {
        let linux = launcher(Platform::Linux);
        let result = linux.spawn(&LaunchCommand {
            app: "nothing".to_string(),
            invocation: "   ".to_string(),
        });
        assert!(matches!(result, Err(LaunchError::EmptyInvocation(_))));
    }

    #[cfg(target_os = "linux")]
    fn reaped(pid: Option<u32>) -> bool {
        let Some(pid) = pid else {
            return true;
        };
        // A zombie keeps its /proc entry until waited on
        for _ in 0..50 {
            if !std::path::Path::new(&format!("/proc/{}", pid)).exists() {
                return true;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        false
    }

    #[cfg(target_os = "linux")]
    #[tokio::test(flavor = "multi_thread")]
    async fn test_exited_child_is_reaped() {
        let pid = launcher(Platform::Linux).run_detached("true", "true").unwrap();
        assert!(pid.is_some());
        let done = tokio::task::spawn_blocking(move || reaped(pid)).await.unwrap();
        assert!(done, "child left as a zombie");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_exited_child_is_reaped_without_runtime() {
        let pid = launcher(Platform::Linux).run_detached("true", "true").unwrap();
        assert!(reaped(pid), "child left as a zombie");
    }

    #[test]
    fn test_missing_program_reports_spawn_error() {
        let result =
            launcher(Platform::Linux).run_detached("ghost", "definitely-not-installed-jarvis-app");
        assert!(matches!(result, Err(LaunchError::Spawn { .. })));
    }

    #[test]
    fn test_apps_sorted() {
        let apps = launcher(Platform::Linux).apps();
        assert_eq!(apps.first().map(String::as_str), Some("browser"));
        assert!(apps.contains(&"file explorer".to_string()));
    }
}
