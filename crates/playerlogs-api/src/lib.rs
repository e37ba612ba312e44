//! Module API: activity events, the module trait, and the host API modules see.
//!
//! This crate defines the interface that logging modules implement and that
//! hosts feed. It has no dependency on the registry, scheduler or cache.

mod settings;

pub use settings::{parse_duration, Settings, SettingsError};

use serde::Deserialize;
use thiserror::Error;

// ─── Types ───────────────────────────────────────────────────────────────────

/// A player as carried by activity events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActivityPlayer {
    pub name: String,
    pub uuid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub world: Option<String>,
}

impl ActivityPlayer {
    pub fn new(name: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: uuid.into(),
            display_name: None,
            world: None,
        }
    }

    /// Display name, falling back to the account name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// Block position for block events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// A position inside a named world.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Memory figures in MiB, supplied by the host when it can measure them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub used_mb: u64,
    pub free_mb: u64,
    pub total_mb: u64,
    pub max_mb: u64,
}

/// Server state snapshot for module reads (built by the host before dispatch).
#[derive(Debug, Clone, Default)]
pub struct ServerSnapshot {
    pub online_players: usize,
    pub memory: Option<MemoryStats>,
}

/// Where a module wants a log line to go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// The shared `global.log`.
    Global,
    /// A module-wide file, `<identifier>.log`.
    Module(String),
    /// A per-player file for one module.
    Player {
        player: ActivityPlayer,
        module: String,
    },
}

/// Error returned by module callbacks.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid setting '{path}': {reason}")]
    InvalidSetting { path: String, reason: String },

    #[error("{0}")]
    Failed(String),
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// All player activity a host can report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityEvent {
    PlayerJoin {
        player: ActivityPlayer,
        #[serde(default)]
        message: Option<String>,
    },
    PlayerQuit {
        player: ActivityPlayer,
        #[serde(default)]
        message: Option<String>,
    },
    PlayerChat {
        player: ActivityPlayer,
        message: String,
    },
    PlayerCommand {
        player: ActivityPlayer,
        command: String,
    },
    PlayerDeath {
        player: ActivityPlayer,
        #[serde(default)]
        message: Option<String>,
    },
    BlockBreak {
        player: ActivityPlayer,
        position: BlockPos,
        block: String,
    },
    BlockPlace {
        player: ActivityPlayer,
        position: BlockPos,
        block: String,
    },
    PlayerTeleport {
        player: ActivityPlayer,
        from: Location,
        to: Location,
        #[serde(default)]
        cause: Option<String>,
    },
    WorldChange {
        player: ActivityPlayer,
        from_world: String,
        to_world: String,
    },
    ItemEnchant {
        player: ActivityPlayer,
        item: String,
        #[serde(default)]
        enchantments: Vec<String>,
        cost: u32,
    },
}

impl ActivityEvent {
    /// The player who caused the event.
    pub fn player(&self) -> &ActivityPlayer {
        match self {
            ActivityEvent::PlayerJoin { player, .. }
            | ActivityEvent::PlayerQuit { player, .. }
            | ActivityEvent::PlayerChat { player, .. }
            | ActivityEvent::PlayerCommand { player, .. }
            | ActivityEvent::PlayerDeath { player, .. }
            | ActivityEvent::BlockBreak { player, .. }
            | ActivityEvent::BlockPlace { player, .. }
            | ActivityEvent::PlayerTeleport { player, .. }
            | ActivityEvent::WorldChange { player, .. }
            | ActivityEvent::ItemEnchant { player, .. } => player,
        }
    }

    /// Wire name of the event, matching the `type` tag.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ActivityEvent::PlayerJoin { .. } => "player_join",
            ActivityEvent::PlayerQuit { .. } => "player_quit",
            ActivityEvent::PlayerChat { .. } => "player_chat",
            ActivityEvent::PlayerCommand { .. } => "player_command",
            ActivityEvent::PlayerDeath { .. } => "player_death",
            ActivityEvent::BlockBreak { .. } => "block_break",
            ActivityEvent::BlockPlace { .. } => "block_place",
            ActivityEvent::PlayerTeleport { .. } => "player_teleport",
            ActivityEvent::WorldChange { .. } => "world_change",
            ActivityEvent::ItemEnchant { .. } => "item_enchant",
        }
    }

    /// Parse one event from a JSON line.
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

// ─── Module trait ────────────────────────────────────────────────────────────

/// An independently togglable unit of logging work.
///
/// Modules are identified by [`Module::identifier`]; two modules with the same
/// identifier are the same module as far as the registry is concerned.
pub trait Module: Send {
    /// Stable identifier, e.g. `chat-module`.
    fn identifier(&self) -> &str;

    /// Whether the live configuration wants this module running. Queried on every audit.
    fn enabled(&self, settings: &Settings) -> bool;

    /// Called when the module moves into the active list.
    fn initialize(&mut self, settings: &Settings) -> Result<(), ModuleError> {
        let _ = settings;
        Ok(())
    }

    /// Called when a module with a recurring action leaves the active list.
    fn shutdown(&mut self) {}

    /// Called for every dispatched event while the module is active.
    fn on_event(&mut self, event: &ActivityEvent, api: &mut dyn ModuleApi) -> Result<(), ModuleError> {
        let _ = (event, api);
        Ok(())
    }

    /// Cache key of the recurring action's interval counter. `None` = no recurring action.
    fn timer_key(&self) -> Option<&str> {
        None
    }

    /// Ticks between firings of the recurring action, read fresh on every tick.
    fn interval(&self, settings: &Settings) -> u64 {
        let _ = settings;
        0
    }

    /// The recurring action.
    fn run(&mut self, api: &mut dyn ModuleApi) -> Result<(), ModuleError> {
        let _ = api;
        Ok(())
    }
}

// ─── Module API ──────────────────────────────────────────────────────────────

/// Access to host state during a module callback.
///
/// Reads return data immediately. Writes are deferred and flushed after the
/// callback returns.
pub trait ModuleApi {
    fn settings(&self) -> &Settings;
    fn snapshot(&self) -> &ServerSnapshot;

    /// Apply placeholders to `template`, with player and message variables when
    /// given. `vars` adds call-specific `%name%` values such as event details.
    fn render(
        &self,
        template: &str,
        player: Option<&ActivityPlayer>,
        message: Option<&str>,
        vars: &[(&str, String)],
    ) -> String;

    fn write(&mut self, target: LogTarget, line: &str);
}

// ─── Tests ───────────────────────────────────────────────────────────────────
