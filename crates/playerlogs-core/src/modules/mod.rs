//! Built-in modules and their default settings.

pub mod activity;
pub mod status;

pub use activity::{ActivityKind, ActivityModule};
pub use status::StatusModule;

use playerlogs_api::{Module, Settings};

/// The shipped `modules.toml`.
pub const DEFAULT_SETTINGS: &str = include_str!("../../modules.toml");

/// Parsed [`DEFAULT_SETTINGS`].
pub fn default_settings() -> Settings {
    Settings::parse(DEFAULT_SETTINGS).unwrap_or_default()
}

/// Every built-in module, in declaration order.
pub fn builtin() -> Vec<Box<dyn Module>> {
    let mut modules: Vec<Box<dyn Module>> = ActivityKind::ALL
        .iter()
        .map(|kind| Box::new(ActivityModule::new(*kind)) as Box<dyn Module>)
        .collect();
    modules.push(Box::new(StatusModule::new()));
    modules
}
