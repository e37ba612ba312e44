//! Loading of the live module settings (`modules.toml`).

use std::path::Path;

use playerlogs_api::Settings;
use playerlogs_core::modules::{default_settings, DEFAULT_SETTINGS};
use tracing::{info, warn};

/// Read `modules.toml`, merged over the shipped defaults. A missing file is
/// created from the defaults; an unreadable one is reported and the defaults
/// are used.
pub fn load_settings(path: &Path) -> Settings {
    let defaults = default_settings();

    if !path.exists() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        match std::fs::write(path, DEFAULT_SETTINGS) {
            Ok(()) => info!("Wrote default module settings to {}", path.display()),
            Err(e) => warn!("Failed to write default settings to {}: {e}", path.display()),
        }
        return defaults;
    }

    match Settings::load(path) {
        Ok(user) => user.with_defaults(&defaults),
        Err(e) => {
            warn!("Failed to load {}, using defaults: {e}", path.display());
            defaults
        }
    }
}
