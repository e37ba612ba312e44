//! Console input: operator verbs and JSON activity events, one per line.

use playerlogs_api::ActivityEvent;

#[derive(Debug, PartialEq)]
pub enum ConsoleInput {
    Reload,
    Status,
    Stop,
    Event(ActivityEvent),
}

/// Parse one stdin line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleInput>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let input = match line.to_ascii_lowercase().as_str() {
        "reload" => ConsoleInput::Reload,
        "status" => ConsoleInput::Status,
        "stop" | "exit" | "quit" => ConsoleInput::Stop,
        _ => ConsoleInput::Event(ActivityEvent::from_json(line)?),
    };
    Ok(Some(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs() {
        assert_eq!(parse_line("reload").unwrap(), Some(ConsoleInput::Reload));
        assert_eq!(parse_line("  STATUS ").unwrap(), Some(ConsoleInput::Status));
        assert_eq!(parse_line("stop").unwrap(), Some(ConsoleInput::Stop));
        assert_eq!(parse_line("exit").unwrap(), Some(ConsoleInput::Stop));
    }

    #[test]
    fn blank_line() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn event_line() {
        let line = r#"{"type":"player_quit","player":{"name":"Steve","uuid":"u-1"}}"#;
        match parse_line(line).unwrap() {
            Some(ConsoleInput::Event(event)) => {
                assert_eq!(event.kind_name(), "player_quit");
                assert_eq!(event.player().name, "Steve");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_line("relaod").is_err());
        assert!(parse_line(r#"{"type":"player_dance","player":{"name":"a","uuid":"b"}}"#).is_err());
    }
}
