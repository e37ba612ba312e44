//! Console-driven host: owns the module manager and the live settings, and
//! turns console lines and ticks into manager calls.

use std::collections::HashSet;

use playerlogs_api::{ActivityEvent, MemoryStats, ServerSnapshot, Settings};
use playerlogs_core::{CacheOrdering, CacheStore, LogWriter, ModuleManager, Reporter};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::feed::{self, ConsoleInput};
use crate::settings::load_settings;
use crate::stats::{MemorySource, SystemMemory};

pub struct Host {
    config: ServerConfig,
    manager: ModuleManager,
    settings: Settings,
    /// UUIDs of players seen joining and not yet quitting.
    online: HashSet<String>,
    current_tick: u64,
    memory_source: Box<dyn MemorySource>,
    /// Last sample, refreshed on ticks that have timers to run.
    memory: Option<MemoryStats>,
}

impl Host {
    /// Build the manager from `config`, load `modules.toml` and run the first audit.
    pub fn new(config: ServerConfig) -> Self {
        let ordering = if config.cache.sorted {
            CacheOrdering::Sorted
        } else {
            CacheOrdering::Unordered
        };
        let cache = CacheStore::new(config.cache_path(), ordering);
        let writer = LogWriter::new(config.log_dir());
        let mut reporter = Reporter::new(env!("CARGO_PKG_VERSION"));
        if let Some(path) = config.report_path() {
            reporter = reporter.with_file(path);
        }

        let mut manager = ModuleManager::new(cache, writer, reporter);
        manager.register_builtin();
        let settings = load_settings(&config.modules_path());
        manager.audit(&settings);

        Self {
            config,
            manager,
            settings,
            online: HashSet::new(),
            current_tick: 0,
            memory_source: Box::new(SystemMemory::new()),
            memory: None,
        }
    }

    pub fn snapshot(&self) -> ServerSnapshot {
        ServerSnapshot {
            online_players: self.online.len(),
            memory: self.memory,
        }
    }

    /// Handle one console line. Returns `false` when the host should stop.
    pub fn handle_line(&mut self, line: &str) -> bool {
        match feed::parse_line(line) {
            Ok(Some(ConsoleInput::Reload)) => self.reload(),
            Ok(Some(ConsoleInput::Status)) => info!("{}", self.status()),
            Ok(Some(ConsoleInput::Stop)) => return false,
            Ok(Some(ConsoleInput::Event(event))) => self.handle_event(&event),
            Ok(None) => {}
            Err(e) => warn!("Ignoring console line {line:?}: {e}"),
        }
        true
    }

    pub fn handle_event(&mut self, event: &ActivityEvent) {
        match event {
            ActivityEvent::PlayerJoin { player, .. } => {
                self.online.insert(player.uuid.clone());
            }
            ActivityEvent::PlayerQuit { player, .. } => {
                self.online.remove(&player.uuid);
            }
            _ => {}
        }
        let snapshot = self.snapshot();
        self.manager.dispatch(event, &self.settings, &snapshot);
    }

    pub fn tick(&mut self) {
        self.current_tick += 1;
        if self.manager.scheduler().timers().is_empty() {
            return;
        }
        self.memory = self.memory_source.sample();
        let snapshot = self.snapshot();
        self.manager.tick(&self.settings, &snapshot);
    }

    /// Re-read `modules.toml` and re-audit.
    pub fn reload(&mut self) {
        self.settings = load_settings(&self.config.modules_path());
        let report = self.manager.reload(&self.settings);
        info!(
            "Reloaded: {} enabled, {} disabled, {} failed ({} active)",
            report.activated.len(),
            report.deactivated.len(),
            report.failed.len(),
            self.manager.count()
        );
    }

    pub fn status(&self) -> String {
        let registry = self.manager.registry();
        format!(
            "Modules {} [{}], timers {}, online {}, tick {}",
            registry.count(),
            registry.active_ids().join(", "),
            self.manager.scheduler().timers().len(),
            self.online.len(),
            self.current_tick
        )
    }

    pub fn shutdown(&mut self) {
        self.manager.shutdown();
    }

    pub fn manager(&self) -> &ModuleManager {
        &self.manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerSection;
    use std::path::PathBuf;

    struct FixedMemory;

    impl MemorySource for FixedMemory {
        fn sample(&mut self) -> Option<MemoryStats> {
            Some(MemoryStats {
                used_mb: 10,
                free_mb: 20,
                total_mb: 30,
                max_mb: 40,
            })
        }
    }

    struct Fixture {
        dir: PathBuf,
        host: Host,
    }

    impl Fixture {
        fn new(modules_toml: Option<&str>) -> Self {
            let dir = std::env::temp_dir().join(format!("playerlogs_host_{}", rand::random::<u64>()));
            std::fs::create_dir_all(&dir).unwrap();
            if let Some(contents) = modules_toml {
                std::fs::write(dir.join("modules.toml"), contents).unwrap();
            }
            let config = ServerConfig {
                server: ServerSection {
                    data_dir: dir.clone(),
                },
                ..Default::default()
            };
            let mut host = Host::new(config);
            host.memory_source = Box::new(FixedMemory);
            Self { dir, host }
        }

        fn read(&self, rel: &str) -> String {
            std::fs::read_to_string(self.dir.join(rel)).unwrap_or_default()
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.dir).ok();
        }
    }

    #[test]
    fn first_start_writes_modules_toml() {
        let fx = Fixture::new(None);
        assert!(fx.dir.join("modules.toml").exists());
        assert_eq!(fx.host.manager().count(), "6/11");
    }

    #[test]
    fn join_and_quit_track_online_players() {
        let mut fx = Fixture::new(None);
        let join = r#"{"type":"player_join","player":{"name":"Steve","uuid":"u-1"}}"#;
        let quit = r#"{"type":"player_quit","player":{"name":"Steve","uuid":"u-1"}}"#;

        assert!(fx.host.handle_line(join));
        assert_eq!(fx.host.snapshot().online_players, 1);
        assert!(fx.host.handle_line(quit));
        assert_eq!(fx.host.snapshot().online_players, 0);

        let global = fx.read("log-files/global.log");
        let lines: Vec<&str> = global.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] Steve joined the server"));
        assert!(lines[1].ends_with("] Steve left the server"));
        assert!(fx.dir.join("log-files/Steve/join-module.log").exists());
    }

    #[test]
    fn bad_lines_are_skipped() {
        let mut fx = Fixture::new(None);
        assert!(fx.host.handle_line("not a command"));
        assert!(fx.host.handle_line(""));
        assert!(fx.read("log-files/global.log").is_empty());
    }

    #[test]
    fn stop_ends_the_loop() {
        let mut fx = Fixture::new(None);
        assert!(!fx.host.handle_line("stop"));
    }

    #[test]
    fn reload_picks_up_edits() {
        let mut fx = Fixture::new(Some("[modules.ram]\nenabled = false\n"));
        assert!(!fx.host.manager().registry().is_active("status-module"));

        std::fs::write(
            fx.dir.join("modules.toml"),
            "[modules.ram]\nenabled = true\ninterval = 2\n",
        )
        .unwrap();
        assert!(fx.host.handle_line("reload"));
        assert!(fx.host.manager().registry().is_active("status-module"));

        fx.host.tick();
        fx.host.tick();
        assert!(fx
            .read("log-files/status-module.log")
            .trim_end()
            .ends_with("] Used: 10 | Free: 20 | Total: 30 | Max: 40"));
    }

    #[test]
    fn status_line() {
        let mut fx = Fixture::new(None);
        fx.host.tick();
        let status = fx.host.status();
        assert!(status.starts_with("Modules 6/11 [join-module, quit-module"));
        assert!(status.ends_with("tick 1"));
    }

    #[test]
    fn shutdown_unloads_modules() {
        let mut fx = Fixture::new(None);
        fx.host.shutdown();
        assert_eq!(fx.host.manager().count(), "0/0");
    }
}
