//! Module manager: owns the registry, scheduler and cache, and routes events
//! and ticks to active modules.

use playerlogs_api::{
    ActivityEvent, ActivityPlayer, LogTarget, Module, ModuleApi, ServerSnapshot, Settings,
};
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::modules;
use crate::placeholder::Placeholders;
use crate::registry::{AuditReport, ModuleRegistry};
use crate::report::Reporter;
use crate::scheduler::{Scheduler, TickOutcome};
use crate::writer::LogWriter;

/// Top-level setting: key per-player directories by UUID.
pub const USE_UUID: &str = "use-uuid";

// ─── Types ───────────────────────────────────────────────────────────────────

/// Deferred log line requested by a module during a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub target: LogTarget,
    pub line: String,
}

// ─── ModuleApiImpl ───────────────────────────────────────────────────────────

/// Implements `ModuleApi` using a snapshot for reads and accumulating PendingWrites.
struct ModuleApiImpl<'a> {
    settings: &'a Settings,
    snapshot: &'a ServerSnapshot,
    placeholders: &'a Placeholders,
    writes: Vec<PendingWrite>,
}

impl<'a> ModuleApiImpl<'a> {
    fn new(settings: &'a Settings, snapshot: &'a ServerSnapshot, placeholders: &'a Placeholders) -> Self {
        Self {
            settings,
            snapshot,
            placeholders,
            writes: Vec::new(),
        }
    }

    fn take_writes(self) -> Vec<PendingWrite> {
        self.writes
    }
}

impl ModuleApi for ModuleApiImpl<'_> {
    fn settings(&self) -> &Settings {
        self.settings
    }

    fn snapshot(&self) -> &ServerSnapshot {
        self.snapshot
    }

    fn render(
        &self,
        template: &str,
        player: Option<&ActivityPlayer>,
        message: Option<&str>,
        vars: &[(&str, String)],
    ) -> String {
        self.placeholders.apply(template, player, message, vars, self.snapshot)
    }

    fn write(&mut self, target: LogTarget, line: &str) {
        self.writes.push(PendingWrite {
            target,
            line: line.to_string(),
        });
    }
}

fn flush(writer: &LogWriter, reporter: &Reporter, writes: Vec<PendingWrite>, use_uuid: bool) {
    for PendingWrite { target, line } in writes {
        let path = writer.path_for(&target, use_uuid);
        if let Err(e) = writer.append(&path, &line) {
            reporter.report(&format!("write {}", path.display()), &e);
        }
    }
}

// ─── ModuleManager ───────────────────────────────────────────────────────────

pub struct ModuleManager {
    registry: ModuleRegistry,
    scheduler: Scheduler,
    cache: CacheStore,
    writer: LogWriter,
    reporter: Reporter,
    placeholders: Placeholders,
}

impl ModuleManager {
    pub fn new(cache: CacheStore, writer: LogWriter, reporter: Reporter) -> Self {
        Self {
            registry: ModuleRegistry::new(),
            scheduler: Scheduler::new(),
            cache,
            writer,
            reporter,
            placeholders: Placeholders::new(),
        }
    }

    /// Add a module to the master list (call before `audit`).
    pub fn register(&mut self, module: Box<dyn Module>) {
        let id = module.identifier().to_string();
        if self.registry.add_to_master(module) {
            debug!("Loaded module: {id}");
        }
    }

    pub fn register_builtin(&mut self) {
        for module in modules::builtin() {
            self.register(module);
        }
    }

    /// Reconcile active modules with `settings`, then make sure every active
    /// module with a recurring action has a live timer.
    pub fn audit(&mut self, settings: &Settings) -> AuditReport {
        let report = self.registry.audit(settings);

        for (id, err) in &report.failed {
            self.reporter.report(&format!("initialize {id}"), err);
        }
        for id in &report.deactivated {
            self.scheduler.cancel(id);
        }
        for id in self.registry.active_ids() {
            if let Some(key) = self.registry.module(id).and_then(|m| m.timer_key()) {
                self.scheduler.start(id, key, &mut self.cache);
            }
        }

        if !report.is_unchanged() {
            info!("Modules active: {}", self.registry.count());
        }
        report
    }

    pub fn reload(&mut self, settings: &Settings) -> AuditReport {
        self.audit(settings)
    }

    /// Deliver `event` to every active module, in activation order.
    pub fn dispatch(&mut self, event: &ActivityEvent, settings: &Settings, snapshot: &ServerSnapshot) {
        let use_uuid = settings.get_bool(USE_UUID);

        for id in self.registry.active_ids().to_vec() {
            let Some(module) = self.registry.module_mut(&id) else {
                continue;
            };
            let mut api = ModuleApiImpl::new(settings, snapshot, &self.placeholders);
            let result = module.on_event(event, &mut api);
            flush(&self.writer, &self.reporter, api.take_writes(), use_uuid);

            if let Err(e) = result {
                self.reporter.report(&format!("{id} on {}", event.kind_name()), &e);
            }
        }
    }

    /// Advance every interval timer once.
    pub fn tick(&mut self, settings: &Settings, snapshot: &ServerSnapshot) -> Vec<(String, TickOutcome)> {
        let use_uuid = settings.get_bool(USE_UUID);
        let Self {
            registry,
            scheduler,
            cache,
            writer,
            reporter,
            placeholders,
        } = self;

        let outcomes = scheduler.tick(registry, settings, cache, |module| {
            let mut api = ModuleApiImpl::new(settings, snapshot, placeholders);
            let result = module.run(&mut api);
            flush(writer, reporter, api.take_writes(), use_uuid);
            result
        });

        for (id, outcome) in &outcomes {
            if let TickOutcome::Failed(e) = outcome {
                reporter.report(&format!("tick {id}"), e);
            }
        }
        outcomes
    }

    /// Cancel every timer and deactivate every module.
    pub fn shutdown(&mut self) {
        self.scheduler.cancel_all();
        self.registry.shutdown_all();
        info!("All modules unloaded");
    }

    pub fn count(&self) -> String {
        self.registry.count()
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn cache_mut(&mut self) -> &mut CacheStore {
        &mut self.cache
    }

    pub fn placeholders_mut(&mut self) -> &mut Placeholders {
        &mut self.placeholders
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
