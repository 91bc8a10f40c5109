//! Audit trail of processes and pages opened on the user's behalf

use anyhow::Result;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent<'a> {
    Launch { app: &'a str, invocation: &'a str },
    OpenUrl(&'a str),
}

impl fmt::Display for AuditEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEvent::Launch { app, invocation } => {
                write!(f, "LAUNCH: {} | COMMAND: {}", app, invocation)
            }
            AuditEvent::OpenUrl(url) => write!(f, "OPEN URL: {}", url),
        }
    }
}

/// `<config_dir>/jarvis/audit.log`
pub fn audit_log_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("jarvis")
        .join("audit.log")
}

pub fn record(event: &AuditEvent<'_>) -> Result<()> {
    append(&audit_log_path(), event)
}

/// Append one timestamped line, creating the file and its directory
pub fn append(path: &Path, event: &AuditEvent<'_>) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        event
    )?;
    Ok(())
}
