//! REPL line parsing.

use gpdi_core::session::SessionId;

/// Slash commands offered for completion and hints.
pub const SLASH_COMMANDS: &[&str] = &["/new", "/chats", "/open", "/delete", "/lang", "/help"];

pub const HELP: &str = "\
  <text>           ask something
  /new             start a new conversation
  /chats           list saved conversations
  /open <id>       continue a saved conversation (e.g. /open chat_2)
  /delete <id>     delete a saved conversation
  /lang <code>     switch the display language (e.g. /lang fr)
  /help            show this help
  quit | exit      leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    New,
    Chats,
    Open(SessionId),
    Delete(SessionId),
    Lang(String),
    Help,
    Quit,
    /// A malformed command; the payload is shown to the user.
    Invalid(String),
}

/// Parses one non-empty, trimmed input line.
pub fn parse(line: &str) -> Command {
    if line == "quit" || line == "exit" {
        return Command::Quit;
    }
    if !line.starts_with('/') {
        return Command::Say(line.to_string());
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|arg| !arg.is_empty());

    match (name, arg) {
        ("/new", None) => Command::New,
        ("/chats", None) => Command::Chats,
        ("/help", None) => Command::Help,
        ("/open", Some(id)) => session_arg(id).map_or_else(Command::Invalid, Command::Open),
        ("/delete", Some(id)) => session_arg(id).map_or_else(Command::Invalid, Command::Delete),
        ("/lang", Some(code)) => Command::Lang(code.to_string()),
        ("/open", None) => Command::Invalid("usage: /open <id>".to_string()),
        ("/delete", None) => Command::Invalid("usage: /delete <id>".to_string()),
        ("/lang", None) => Command::Invalid("usage: /lang <code>".to_string()),
        ("/new" | "/chats" | "/help", Some(_)) => {
            Command::Invalid(format!("{} takes no arguments", name))
        }
        _ => Command::Invalid(format!("unknown command {} (try /help)", name)),
    }
}

fn session_arg(id: &str) -> Result<SessionId, String> {
    id.parse()
        .map_err(|_| format!("'{}' is not a conversation id like chat_3", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_said() {
        assert_eq!(parse("nasılsın?"), Command::Say("nasılsın?".to_string()));
        assert_eq!(parse("quitting time"), Command::Say("quitting time".to_string()));
    }

    #[test]
    fn test_quit() {
        assert_eq!(parse("quit"), Command::Quit);
        assert_eq!(parse("exit"), Command::Quit);
    }

    #[test]
    fn test_session_commands() {
        assert_eq!(parse("/new"), Command::New);
        assert_eq!(parse("/chats"), Command::Chats);
        assert_eq!(parse("/open chat_2"), Command::Open(SessionId::new(2)));
        assert_eq!(parse("/open 2"), Command::Open(SessionId::new(2)));
        assert_eq!(parse("/delete   chat_10 "), Command::Delete(SessionId::new(10)));
    }

    #[test]
    fn test_lang() {
        assert_eq!(parse("/lang fr"), Command::Lang("fr".to_string()));
    }

    #[test]
    fn test_malformed_commands() {
        assert!(matches!(parse("/open"), Command::Invalid(_)));
        assert!(matches!(parse("/open latest"), Command::Invalid(_)));
        assert!(matches!(parse("/new now"), Command::Invalid(_)));
        assert!(matches!(parse("/plan"), Command::Invalid(_)));
    }
}
