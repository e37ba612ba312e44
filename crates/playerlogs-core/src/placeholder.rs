//! `%variable%` substitution for log messages.

use std::collections::BTreeMap;

use playerlogs_api::{ActivityPlayer, MemoryStats, ServerSnapshot};

pub const PLAYER_NAME: &str = "%player_name%";
pub const DISPLAY_NAME: &str = "%display_name%";
pub const PLAYER_UUID: &str = "%player_uuid%";
pub const WORLD: &str = "%world%";
pub const MESSAGE: &str = "%message%";
pub const RAM_USED: &str = "%server_ram_used%";
pub const RAM_FREE: &str = "%server_ram_free%";
pub const RAM_TOTAL: &str = "%server_ram_total%";
pub const RAM_MAX: &str = "%server_ram_max%";
pub const ONLINE_PLAYERS: &str = "%online_players%";

/// Built-in variables plus custom ones registered at runtime. Lookup order
/// is custom, then per-call variables, then built-ins.
#[derive(Debug, Default)]
pub struct Placeholders {
    custom: BTreeMap<String, String>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a custom variable. `name` may be given with or
    /// without the surrounding `%`.
    pub fn add_custom(&mut self, name: &str, value: impl ToString) {
        let var = if name.starts_with('%') && name.ends_with('%') && name.len() > 1 {
            name.to_string()
        } else {
            format!("%{}%", name.trim_matches('%'))
        };
        self.custom.insert(var, value.to_string());
    }

    pub fn remove_custom(&mut self, name: &str) {
        let var = format!("%{}%", name.trim_matches('%'));
        self.custom.remove(&var);
    }

    /// Expand every `%variable%` in `template` in one pass. Substituted values
    /// are never scanned again, so names, messages and item names containing
    /// `%...%` come out verbatim. Unknown variables are left as written.
    pub fn apply(
        &self,
        template: &str,
        player: Option<&ActivityPlayer>,
        message: Option<&str>,
        vars: &[(&str, String)],
        snapshot: &ServerSnapshot,
    ) -> String {
        expand(template, |token| {
            if let Some(value) = self.custom.get(token) {
                return Some(value.clone());
            }
            if let Some((_, value)) = vars.iter().find(|(name, _)| *name == token) {
                return Some(value.clone());
            }
            builtin(token, player, message, snapshot)
        })
    }
}

fn builtin(
    token: &str,
    player: Option<&ActivityPlayer>,
    message: Option<&str>,
    snapshot: &ServerSnapshot,
) -> Option<String> {
    let mb = |f: fn(&MemoryStats) -> u64| {
        Some(
            snapshot
                .memory
                .as_ref()
                .map(|m| f(m).to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        )
    };
    match token {
        PLAYER_NAME => player.map(|p| p.name.clone()),
        DISPLAY_NAME => player.map(|p| p.display_name().to_string()),
        PLAYER_UUID => player.map(|p| p.uuid.clone()),
        WORLD => player.map(|p| p.world.clone().unwrap_or_default()),
        MESSAGE => message.map(str::to_string),
        RAM_USED => mb(|m| m.used_mb),
        RAM_FREE => mb(|m| m.free_mb),
        RAM_TOTAL => mb(|m| m.total_mb),
        RAM_MAX => mb(|m| m.max_mb),
        ONLINE_PLAYERS => Some(snapshot.online_players.to_string()),
        _ => None,
    }
}

/// Replace each `%name%` token for which `lookup` has a value.
fn expand(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(len) = after.find('%') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let end = start + len + 2;
        match lookup(&rest[start..end]) {
            Some(value) => {
                out.push_str(&value);
                rest = &rest[end..];
            }
            // The closing `%` may open the next token.
            None => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Remove `§x` / `&x` colour and format codes.
pub fn strip_color(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if (c == '§' || c == '&') && chars.peek().is_some_and(|n| is_format_code(*n)) {
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}

fn is_format_code(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), '0'..='9' | 'a'..='f' | 'k'..='o' | 'r' | 'x')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steve() -> ActivityPlayer {
        ActivityPlayer {
            name: "Steve".into(),
            uuid: "uuid-1".into(),
            display_name: Some("[VIP] Steve".into()),
            world: Some("world_nether".into()),
        }
    }

    #[test]
    fn player_variables() {
        let p = Placeholders::new();
        let out = p.apply(
            "%display_name% (%player_name%, %player_uuid%) in %world%",
            Some(&steve()),
            None,
            &[],
            &ServerSnapshot::default(),
        );
        assert_eq!(out, "[VIP] Steve (Steve, uuid-1) in world_nether");
    }

    #[test]
    fn player_variables_left_without_player() {
        let p = Placeholders::new();
        let out = p.apply("%player_name%", None, None, &[], &ServerSnapshot::default());
        assert_eq!(out, "%player_name%");
    }

    #[test]
    fn message_is_not_expanded() {
        let p = Placeholders::new();
        let out = p.apply(
            "%player_name%: %message%",
            Some(&steve()),
            Some("my name is %player_name%"),
            &[],
            &ServerSnapshot::default(),
        );
        assert_eq!(out, "Steve: my name is %player_name%");
    }

    #[test]
    fn memory_variables() {
        let p = Placeholders::new();
        let snapshot = ServerSnapshot {
            online_players: 3,
            memory: Some(MemoryStats {
                used_mb: 512,
                free_mb: 1024,
                total_mb: 2048,
                max_mb: 4096,
            }),
        };
        let out = p.apply(
            "Used: %server_ram_used% | Free: %server_ram_free% | Total: %server_ram_total% | Max: %server_ram_max% | Online: %online_players%",
            None,
            None,
            &[],
            &snapshot,
        );
        assert_eq!(out, "Used: 512 | Free: 1024 | Total: 2048 | Max: 4096 | Online: 3");

        let out = p.apply("%server_ram_used%", None, None, &[], &ServerSnapshot::default());
        assert_eq!(out, "unknown");
    }

    #[test]
    fn custom_variables_override_and_replace() {
        let mut p = Placeholders::new();
        p.add_custom("server_name", "Lobby");
        p.add_custom("%world%", "overridden");
        let out = p.apply("%server_name%/%world%", Some(&steve()), None, &[], &ServerSnapshot::default());
        assert_eq!(out, "Lobby/overridden");

        p.add_custom("server_name", "Survival");
        p.remove_custom("%world%");
        let out = p.apply("%server_name%/%world%", Some(&steve()), None, &[], &ServerSnapshot::default());
        assert_eq!(out, "Survival/world_nether");
    }

    #[test]
    fn player_text_is_never_expanded() {
        let p = Placeholders::new();
        let player = ActivityPlayer {
            display_name: Some("%player_uuid% %world%".into()),
            ..steve()
        };
        let out = p.apply("%display_name%: %message%", Some(&player), Some("hi"), &[], &ServerSnapshot::default());
        assert_eq!(out, "%player_uuid% %world%: hi");

        let vars = [("%item%", "%display_name%".to_string())];
        let out = p.apply("%player_name% used %item%", Some(&player), None, &vars, &ServerSnapshot::default());
        assert_eq!(out, "Steve used %display_name%");
    }

    #[test]
    fn call_variables_sit_between_custom_and_builtin() {
        let mut p = Placeholders::new();
        let vars = [("%world%", "from-call".to_string()), ("%level%", "30".to_string())];
        let out = p.apply("%world% %level%", Some(&steve()), None, &vars, &ServerSnapshot::default());
        assert_eq!(out, "from-call 30");

        p.add_custom("level", "custom");
        let out = p.apply("%world% %level%", Some(&steve()), None, &vars, &ServerSnapshot::default());
        assert_eq!(out, "from-call custom");
    }

    #[test]
    fn stray_percent_signs_survive() {
        let p = Placeholders::new();
        let out = p.apply("100% of %player_name% 50%", Some(&steve()), None, &[], &ServerSnapshot::default());
        assert_eq!(out, "100% of Steve 50%");
        assert_eq!(p.apply("%%", None, None, &[], &ServerSnapshot::default()), "%%");
    }

    #[test]
    fn strips_colour_codes() {
        assert_eq!(strip_color("§aHello §lworld&r!"), "Hello world!");
        assert_eq!(strip_color("Tom & Jerry"), "Tom & Jerry");
        assert_eq!(strip_color("50%&"), "50%&");
    }
}
