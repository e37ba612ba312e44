//! Periodic server status snapshot.

use playerlogs_api::{LogTarget, Module, ModuleApi, ModuleError, Settings};

use super::activity::DEFAULT_MESSAGE;
use crate::placeholder::strip_color;

pub const IDENTIFIER: &str = "status-module";
pub const TIMER_KEY: &str = "ram-timer";
pub const DEFAULT_INTERVAL: u64 = 30 * 60;
pub const DEFAULT_LINE: &str =
    "Used: %server_ram_used% | Free: %server_ram_free% | Total: %server_ram_total% | Max: %server_ram_max%";

const ENABLED: &str = "modules.ram.enabled";
const INTERVAL: &str = "modules.ram.interval";
const MESSAGE: &str = "modules.ram.message";

/// Writes memory figures to `status-module.log` every `modules.ram.interval`.
#[derive(Debug, Default)]
pub struct StatusModule;

impl StatusModule {
    pub fn new() -> Self {
        Self
    }
}

impl Module for StatusModule {
    fn identifier(&self) -> &str {
        IDENTIFIER
    }

    fn enabled(&self, settings: &Settings) -> bool {
        settings.get_bool(ENABLED)
    }

    fn initialize(&mut self, settings: &Settings) -> Result<(), ModuleError> {
        if settings.get(INTERVAL).is_some() && settings.get_interval(INTERVAL).is_none() {
            return Err(ModuleError::InvalidSetting {
                path: INTERVAL.to_string(),
                reason: "expected seconds or a duration like \"30m\"".to_string(),
            });
        }
        Ok(())
    }

    fn timer_key(&self) -> Option<&str> {
        Some(TIMER_KEY)
    }

    fn interval(&self, settings: &Settings) -> u64 {
        settings.get_interval(INTERVAL).unwrap_or(DEFAULT_INTERVAL)
    }

    fn run(&mut self, api: &mut dyn ModuleApi) -> Result<(), ModuleError> {
        let mut templates = api
            .settings()
            .get_lines(MESSAGE)
            .unwrap_or_else(|| vec![DEFAULT_MESSAGE.to_string()]);
        // `DEFAULT` anywhere in the list stands for the whole message.
        if templates.iter().any(|t| t == DEFAULT_MESSAGE) {
            templates = vec![DEFAULT_LINE.to_string()];
        }

        let lines: Vec<String> = templates
            .iter()
            .map(|t| strip_color(&api.render(t, None, None, &[])))
            .collect();

        for line in lines {
            api.write(LogTarget::Module(IDENTIFIER.to_string()), &line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::Placeholders;
    use playerlogs_api::{ActivityPlayer, MemoryStats, ServerSnapshot};

    struct RecordingApi {
        settings: Settings,
        snapshot: ServerSnapshot,
        writes: Vec<(LogTarget, String)>,
    }

    impl ModuleApi for RecordingApi {
        fn settings(&self) -> &Settings {
            &self.settings
        }

        fn snapshot(&self) -> &ServerSnapshot {
            &self.snapshot
        }

        fn render(
            &self,
            template: &str,
            player: Option<&ActivityPlayer>,
            message: Option<&str>,
            vars: &[(&str, String)],
        ) -> String {
            Placeholders::new().apply(template, player, message, vars, &self.snapshot)
        }

        fn write(&mut self, target: LogTarget, line: &str) {
            self.writes.push((target, line.to_string()));
        }
    }

    fn api(settings: Settings, memory: Option<MemoryStats>) -> RecordingApi {
        RecordingApi {
            settings,
            snapshot: ServerSnapshot {
                online_players: 2,
                memory,
            },
            writes: Vec::new(),
        }
    }

    #[test]
    fn interval_from_settings() {
        let module = StatusModule::new();
        let mut settings = Settings::default();
        assert_eq!(module.interval(&settings), DEFAULT_INTERVAL);

        settings.set(INTERVAL, "1h30m");
        assert_eq!(module.interval(&settings), 5400);
        settings.set(INTERVAL, 90_i64);
        assert_eq!(module.interval(&settings), 90);
    }

    #[test]
    fn initialize_rejects_bad_interval() {
        let mut module = StatusModule::new();
        let mut settings = Settings::default();
        assert!(module.initialize(&settings).is_ok());

        settings.set(INTERVAL, "soon");
        let err = module.initialize(&settings).unwrap_err();
        assert!(matches!(err, ModuleError::InvalidSetting { .. }));
    }

    #[test]
    fn run_writes_default_line() {
        let mut module = StatusModule::new();
        let memory = MemoryStats {
            used_mb: 100,
            free_mb: 200,
            total_mb: 300,
            max_mb: 400,
        };
        let mut api = api(Settings::default(), Some(memory));
        module.run(&mut api).unwrap();

        assert_eq!(
            api.writes,
            vec![(
                LogTarget::Module(IDENTIFIER.to_string()),
                "Used: 100 | Free: 200 | Total: 300 | Max: 400".to_string()
            )]
        );
    }

    #[test]
    fn default_entry_replaces_the_other_lines() {
        let mut module = StatusModule::new();
        let mut settings = Settings::default();
        settings.set(MESSAGE, vec!["Online: %online_players%", "DEFAULT", "extra"]);
        let mut api = api(settings, None);
        module.run(&mut api).unwrap();

        let lines: Vec<&str> = api.writes.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(lines, vec!["Used: unknown | Free: unknown | Total: unknown | Max: unknown"]);
    }

    #[test]
    fn run_writes_custom_lines_without_memory() {
        let mut module = StatusModule::new();
        let mut settings = Settings::default();
        settings.set(MESSAGE, vec!["&aOnline: %online_players%", "RAM: %server_ram_used%"]);
        let mut api = api(settings, None);
        module.run(&mut api).unwrap();

        let lines: Vec<&str> = api.writes.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(lines, vec!["Online: 2", "RAM: unknown"]);
    }
}
