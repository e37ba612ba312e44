//! Live module configuration (`modules.toml`) with dotted-path reads.

use std::path::Path;

use thiserror::Error;
use toml::{Table, Value};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Module settings document. Keys are addressed with dotted paths such as
/// `modules.chat.enabled`; individual path segments may contain dashes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    root: Table,
}

impl Settings {
    pub fn parse(contents: &str) -> Result<Self, SettingsError> {
        let root: Table = toml::from_str(contents)?;
        Ok(Self { root })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Layer these settings over `defaults`: tables merge key by key, any other
    /// value set here wins.
    pub fn with_defaults(self, defaults: &Settings) -> Self {
        let mut root = defaults.root.clone();
        merge(&mut root, self.root);
        Self { root }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.root.get(parts.next()?)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current)
    }

    /// Boolean at `path`; absent or non-boolean reads as `false`.
    pub fn get_bool(&self, path: &str) -> bool {
        self.get(path).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// A string or a list of strings at `path`, as lines.
    pub fn get_lines(&self, path: &str) -> Option<Vec<String>> {
        match self.get(path)? {
            Value::String(s) => Some(vec![s.clone()]),
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Interval in seconds: a non-negative integer or a duration string (`"30m"`).
    pub fn get_interval(&self, path: &str) -> Option<u64> {
        match self.get(path)? {
            Value::Integer(i) => u64::try_from(*i).ok(),
            Value::String(s) => parse_duration(s),
            _ => None,
        }
    }

    /// Set `path` to `value`, creating intermediate tables.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let mut parts: Vec<&str> = path.split('.').collect();
        let Some(last) = parts.pop() else {
            return;
        };
        let mut table = &mut self.root;
        for part in parts {
            let entry = table
                .entry(part)
                .or_insert(Value::Table(Table::new()));
            if !entry.is_table() {
                *entry = Value::Table(Table::new());
            }
            let Some(next) = entry.as_table_mut() else {
                return;
            };
            table = next;
        }
        table.insert(last.to_string(), value.into());
    }

    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(&self.root)?)
    }
}

fn merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match value {
            Value::Table(incoming) => {
                if let Some(Value::Table(existing)) = base.get_mut(&key) {
                    merge(existing, incoming);
                } else {
                    base.insert(key, Value::Table(incoming));
                }
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}

/// Parse a duration into seconds. Accepts bare seconds (`"90"`) and summed
/// `s`/`m`/`h`/`d` parts (`"1h30m"`).
pub fn parse_duration(input: &str) -> Option<u64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if c.is_whitespace() {
            continue;
        }
        let unit: u64 = match c.to_ascii_lowercase() {
            's' => 1,
            'm' => 60,
            'h' => 3600,
            'd' => 86400,
            _ => return None,
        };
        let amount: u64 = digits.parse().ok()?;
        total = total.checked_add(amount.checked_mul(unit)?)?;
        digits.clear();
    }
    if !digits.is_empty() {
        total = total.checked_add(digits.parse().ok()?)?;
    }
    Some(total)
}
