//! Player activity modules: one [`ActivityModule`] per [`ActivityKind`].

use playerlogs_api::{ActivityEvent, LogTarget, Location, Module, ModuleApi, ModuleError, Settings};

use crate::placeholder::strip_color;

/// Message value that selects the built-in line for a kind.
pub const DEFAULT_MESSAGE: &str = "DEFAULT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Join,
    Quit,
    Chat,
    Command,
    Death,
    BlockBreak,
    BlockPlace,
    Teleport,
    WorldChange,
    Enchant,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 10] = [
        ActivityKind::Join,
        ActivityKind::Quit,
        ActivityKind::Chat,
        ActivityKind::Command,
        ActivityKind::Death,
        ActivityKind::BlockBreak,
        ActivityKind::BlockPlace,
        ActivityKind::Teleport,
        ActivityKind::WorldChange,
        ActivityKind::Enchant,
    ];

    pub fn identifier(self) -> &'static str {
        match self {
            ActivityKind::Join => "join-module",
            ActivityKind::Quit => "quit-module",
            ActivityKind::Chat => "chat-module",
            ActivityKind::Command => "command-module",
            ActivityKind::Death => "death-module",
            ActivityKind::BlockBreak => "break-module",
            ActivityKind::BlockPlace => "place-module",
            ActivityKind::Teleport => "teleport-module",
            ActivityKind::WorldChange => "world-module",
            ActivityKind::Enchant => "enchant-module",
        }
    }

    /// Settings section under `modules.`.
    pub fn section(self) -> &'static str {
        match self {
            ActivityKind::Join => "join",
            ActivityKind::Quit => "quit",
            ActivityKind::Chat => "chat",
            ActivityKind::Command => "command",
            ActivityKind::Death => "death",
            ActivityKind::BlockBreak => "block-break",
            ActivityKind::BlockPlace => "block-place",
            ActivityKind::Teleport => "teleport",
            ActivityKind::WorldChange => "world-change",
            ActivityKind::Enchant => "enchant",
        }
    }

    pub fn matches(self, event: &ActivityEvent) -> bool {
        matches!(
            (self, event),
            (ActivityKind::Join, ActivityEvent::PlayerJoin { .. })
                | (ActivityKind::Quit, ActivityEvent::PlayerQuit { .. })
                | (ActivityKind::Chat, ActivityEvent::PlayerChat { .. })
                | (ActivityKind::Command, ActivityEvent::PlayerCommand { .. })
                | (ActivityKind::Death, ActivityEvent::PlayerDeath { .. })
                | (ActivityKind::BlockBreak, ActivityEvent::BlockBreak { .. })
                | (ActivityKind::BlockPlace, ActivityEvent::BlockPlace { .. })
                | (ActivityKind::Teleport, ActivityEvent::PlayerTeleport { .. })
                | (ActivityKind::WorldChange, ActivityEvent::WorldChange { .. })
                | (ActivityKind::Enchant, ActivityEvent::ItemEnchant { .. })
        )
    }
}

/// Built-in template for `event`. Player-supplied text is only ever passed
/// through `%message%`.
fn default_template(event: &ActivityEvent) -> &'static str {
    match event {
        ActivityEvent::PlayerJoin { message: Some(_), .. }
        | ActivityEvent::PlayerQuit { message: Some(_), .. }
        | ActivityEvent::PlayerDeath { message: Some(_), .. } => "%message%",
        ActivityEvent::PlayerJoin { .. } => "%display_name% joined the server",
        ActivityEvent::PlayerQuit { .. } => "%display_name% left the server",
        ActivityEvent::PlayerDeath { .. } => "%display_name% died",
        ActivityEvent::PlayerChat { .. } => "%display_name%: %message%",
        ActivityEvent::PlayerCommand { .. } => "%display_name% issued server command: %message%",
        ActivityEvent::BlockBreak { .. } => "%display_name% broke %block% at %x%, %y%, %z%",
        ActivityEvent::BlockPlace { .. } => "%display_name% placed %block% at %x%, %y%, %z%",
        ActivityEvent::PlayerTeleport { .. } => "%display_name% teleported from %from% to %to%",
        ActivityEvent::WorldChange { .. } => "%display_name% moved from %from_world% to %to_world%",
        ActivityEvent::ItemEnchant { .. } => {
            "%display_name% enchanted %item% with %enchantments% for %cost% levels"
        }
    }
}

/// The text bound to `%message%` for `event`.
fn event_message(event: &ActivityEvent) -> Option<&str> {
    match event {
        ActivityEvent::PlayerJoin { message, .. }
        | ActivityEvent::PlayerQuit { message, .. }
        | ActivityEvent::PlayerDeath { message, .. } => message.as_deref(),
        ActivityEvent::PlayerChat { message, .. } => Some(message),
        ActivityEvent::PlayerCommand { command, .. } => Some(command),
        _ => None,
    }
}

fn format_location(loc: &Location) -> String {
    format!("{} ({:.1}, {:.1}, {:.1})", loc.world, loc.x, loc.y, loc.z)
}

/// Kind-specific variables, applied before the shared placeholders.
fn event_vars(event: &ActivityEvent) -> Vec<(&'static str, String)> {
    match event {
        ActivityEvent::BlockBreak { position, block, .. }
        | ActivityEvent::BlockPlace { position, block, .. } => vec![
            ("%block%", block.clone()),
            ("%x%", position.x.to_string()),
            ("%y%", position.y.to_string()),
            ("%z%", position.z.to_string()),
        ],
        ActivityEvent::PlayerTeleport { from, to, .. } => vec![
            ("%from%", format_location(from)),
            ("%to%", format_location(to)),
            ("%from_world%", from.world.clone()),
            ("%to_world%", to.world.clone()),
            ("%x%", format!("{:.1}", to.x)),
            ("%y%", format!("{:.1}", to.y)),
            ("%z%", format!("{:.1}", to.z)),
        ],
        ActivityEvent::WorldChange {
            from_world,
            to_world,
            ..
        } => vec![
            ("%from_world%", from_world.clone()),
            ("%to_world%", to_world.clone()),
        ],
        ActivityEvent::ItemEnchant {
            item,
            enchantments,
            cost,
            ..
        } => vec![
            ("%item%", item.clone()),
            ("%enchantments%", enchantments.join(", ")),
            ("%cost%", cost.to_string()),
        ],
        _ => Vec::new(),
    }
}

/// Logs one kind of player activity to the global log and, when
/// `modularize` is on, to the player's own file for this module.
#[derive(Debug)]
pub struct ActivityModule {
    kind: ActivityKind,
}

impl ActivityModule {
    pub fn new(kind: ActivityKind) -> Self {
        Self { kind }
    }

    fn setting(&self, key: &str) -> String {
        format!("modules.{}.{}", self.kind.section(), key)
    }

    fn lines(&self, event: &ActivityEvent, api: &dyn ModuleApi) -> Vec<String> {
        let templates = api
            .settings()
            .get_lines(&self.setting("message"))
            .unwrap_or_else(|| vec![DEFAULT_MESSAGE.to_string()]);
        let vars = event_vars(event);

        templates
            .iter()
            .map(|template| {
                let line = if template == DEFAULT_MESSAGE {
                    default_template(event)
                } else {
                    template.as_str()
                };
                let rendered = api.render(line, Some(event.player()), event_message(event), &vars);
                strip_color(&rendered)
            })
            .collect()
    }
}

impl Module for ActivityModule {
    fn identifier(&self) -> &str {
        self.kind.identifier()
    }

    fn enabled(&self, settings: &Settings) -> bool {
        settings.get_bool(&self.setting("enabled"))
    }

    fn on_event(&mut self, event: &ActivityEvent, api: &mut dyn ModuleApi) -> Result<(), ModuleError> {
        if !self.kind.matches(event) {
            return Ok(());
        }
        let modularize = api.settings().get_bool("modularize");

        for line in self.lines(event, api) {
            api.write(LogTarget::Global, &line);
            if modularize {
                api.write(
                    LogTarget::Player {
                        player: event.player().clone(),
                        module: self.identifier().to_string(),
                    },
                    &line,
                );
            }
        }
        Ok(())
    }
}
