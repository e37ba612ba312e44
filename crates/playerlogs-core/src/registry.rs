//! Module registry: the master list of known modules and the active subset.

use playerlogs_api::{Module, ModuleError, Settings};
use tracing::{debug, warn};

/// Transitions made by one [`ModuleRegistry::audit`] pass.
#[derive(Debug, Default)]
pub struct AuditReport {
    pub activated: Vec<String>,
    pub deactivated: Vec<String>,
    /// Modules whose `initialize` failed; they stay inactive until the next audit.
    pub failed: Vec<(String, ModuleError)>,
}

impl AuditReport {
    pub fn is_unchanged(&self) -> bool {
        self.activated.is_empty() && self.deactivated.is_empty()
    }
}

/// Tracks every known module (`master`, declaration order) and the modules
/// currently running (`active`, activation order). Identity is the module
/// identifier.
#[derive(Default)]
pub struct ModuleRegistry {
    master: Vec<Box<dyn Module>>,
    active: Vec<String>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module to the master list. Returns `false` if it was already known.
    pub fn add_to_master(&mut self, module: Box<dyn Module>) -> bool {
        if self.contains(module.identifier()) {
            return false;
        }
        self.master.push(module);
        true
    }

    /// Mark a known module active without initializing it. Unknown identifiers
    /// are logged and ignored.
    pub fn add_to_registry(&mut self, identifier: &str) -> bool {
        if self.is_active(identifier) {
            return false;
        }
        if !self.contains(identifier) {
            warn!("Cannot register unknown module: {identifier}");
            return false;
        }
        self.active.push(identifier.to_string());
        debug!("Registered module: {identifier}");
        true
    }

    /// Reconcile the active list with each module's `enabled` predicate.
    pub fn audit(&mut self, settings: &Settings) -> AuditReport {
        let mut report = AuditReport::default();

        for module in &mut self.master {
            let id = module.identifier().to_string();
            let active = self.active.contains(&id);
            let enabled = module.enabled(settings);

            if enabled && !active {
                match module.initialize(settings) {
                    Ok(()) => {
                        self.active.push(id.clone());
                        debug!("Registered module: {id}");
                        report.activated.push(id);
                    }
                    Err(e) => {
                        warn!("Failed to initialize module {id}: {e}");
                        report.failed.push((id, e));
                    }
                }
            } else if !enabled && active {
                if module.timer_key().is_some() {
                    module.shutdown();
                }
                self.active.retain(|a| a != &id);
                debug!("Unloaded module: {id}");
                report.deactivated.push(id);
            }
        }

        report
    }

    /// Deactivate everything and forget all modules.
    pub fn shutdown_all(&mut self) {
        for id in std::mem::take(&mut self.active) {
            if let Some(module) = self.module_mut(&id) {
                if module.timer_key().is_some() {
                    module.shutdown();
                }
                debug!("Unloaded module: {id}");
            }
        }
        self.master.clear();
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.master.iter().any(|m| m.identifier() == identifier)
    }

    pub fn is_active(&self, identifier: &str) -> bool {
        self.active.iter().any(|a| a == identifier)
    }

    pub fn active_ids(&self) -> &[String] {
        &self.active
    }

    pub fn master_ids(&self) -> Vec<&str> {
        self.master.iter().map(|m| m.identifier()).collect()
    }

    pub fn module(&self, identifier: &str) -> Option<&dyn Module> {
        self.master
            .iter()
            .find(|m| m.identifier() == identifier)
            .map(|m| m.as_ref())
    }

    pub fn module_mut(&mut self, identifier: &str) -> Option<&mut (dyn Module + 'static)> {
        self.master
            .iter_mut()
            .find(|m| m.identifier() == identifier)
            .map(|m| m.as_mut())
    }

    /// `"active/master"`, e.g. `"3/11"`.
    pub fn count(&self) -> String {
        format!("{}/{}", self.active.len(), self.master.len())
    }
}
