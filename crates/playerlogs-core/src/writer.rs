//! Timestamped append-only log files under `<data dir>/log-files`.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use playerlogs_api::{ActivityPlayer, LogTarget};
use tracing::{debug, warn};

pub const GLOBAL_FILE: &str = "global.log";

/// Resolves [`LogTarget`]s to files and appends `[MM/dd/yyyy HH:mm] message` lines.
#[derive(Debug, Clone)]
pub struct LogWriter {
    root: PathBuf,
}

impl LogWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn global_file(&self) -> PathBuf {
        self.root.join(GLOBAL_FILE)
    }

    pub fn module_file(&self, module: &str) -> PathBuf {
        self.root.join(format!("{}.log", sanitize(module)))
    }

    /// Per-player directory, keyed by UUID or by name.
    ///
    /// When the key style changes, an existing directory under the other key is
    /// renamed so earlier logs follow the player.
    pub fn player_dir(&self, player: &ActivityPlayer, use_uuid: bool) -> PathBuf {
        let (key, other) = if use_uuid {
            (&player.uuid, &player.name)
        } else {
            (&player.name, &player.uuid)
        };
        let dir = self.root.join(sanitize(key));
        let previous = self.root.join(sanitize(other));

        if previous != dir && previous.is_dir() && !dir.exists() {
            match std::fs::rename(&previous, &dir) {
                Ok(()) => debug!("Moved {} to {}", previous.display(), dir.display()),
                Err(e) => warn!("Failed to move {} to {}: {e}", previous.display(), dir.display()),
            }
        }
        dir
    }

    pub fn path_for(&self, target: &LogTarget, use_uuid: bool) -> PathBuf {
        match target {
            LogTarget::Global => self.global_file(),
            LogTarget::Module(module) => self.module_file(module),
            LogTarget::Player { player, module } => self
                .player_dir(player, use_uuid)
                .join(format!("{}.log", sanitize(module))),
        }
    }

    pub fn write(&self, target: &LogTarget, message: &str, use_uuid: bool) -> io::Result<()> {
        self.append(&self.path_for(target, use_uuid), message)
    }

    /// Append one timestamped line, creating the file and its parents.
    pub fn append(&self, path: &Path, message: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "[{}] {}", timestamp(), message)
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%m/%d/%Y %H:%M").to_string()
}

fn sanitize(component: &str) -> String {
    let cleaned: String = component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}
