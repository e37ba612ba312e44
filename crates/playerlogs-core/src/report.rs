//! Failure reporting: every failure is logged, and optionally appended to a
//! crash-report file with enough context to file a bug.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{error, warn};

#[derive(Debug, Clone)]
pub struct Reporter {
    path: Option<PathBuf>,
    version: String,
}

impl Reporter {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            path: None,
            version: version.into(),
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Report a failure. `context` names what was being done, e.g. `tick status-module`.
    pub fn report(&self, context: &str, err: &dyn std::error::Error) {
        error!("{context}: {err}");

        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = self.append(path, context, err) {
            warn!("Failed to write crash report to {}: {e}", path.display());
        }
    }

    fn append(&self, path: &Path, context: &str, err: &dyn std::error::Error) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut block = String::new();
        block.push_str(&format!(
            "Exception Date: {}\n",
            chrono::Local::now().format("%m/%d/%Y %H:%M:%S")
        ));
        block.push_str(&format!("Version: {}\n", self.version));
        block.push_str(&format!("Fault: {context}\n"));
        block.push_str(&format!("Error Message: {err}\n"));
        let mut source = err.source();
        while let Some(cause) = source {
            block.push_str(&format!("Caused by: {cause}\n"));
            source = cause.source();
        }
        block.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(block.as_bytes())
    }
}
