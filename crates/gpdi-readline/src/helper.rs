//! Line-editor support: completion and hints for slash commands and their
//! arguments.
//!
//! The helper cannot reach the orchestrator from inside rustyline's
//! callbacks, so it works from a snapshot of conversation ids and language
//! codes that the REPL refreshes whenever those change.

use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use gpdi_core::language::LanguageCode;
use gpdi_core::session::SessionId;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::commands::SLASH_COMMANDS;

/// What the word under the cursor can be completed from.
#[derive(Debug, PartialEq, Eq)]
struct Completion<'a> {
    /// Byte offset where the word starts.
    start: usize,
    /// The part of the word already typed.
    typed: &'a str,
    matches: Vec<String>,
}

#[derive(Default)]
pub struct CliHelper {
    sessions: Vec<String>,
    languages: Vec<String>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sessions(&mut self, sessions: &[SessionId]) {
        self.sessions = sessions.iter().map(SessionId::to_string).collect();
    }

    pub fn set_languages(&mut self, languages: &[LanguageCode]) {
        self.languages = languages.iter().map(|code| code.as_str().to_string()).collect();
    }

    fn completion<'a>(&self, line: &'a str) -> Option<Completion<'a>> {
        if !line.starts_with('/') {
            return None;
        }

        let Some((name, rest)) = line.split_once(char::is_whitespace) else {
            let matches = SLASH_COMMANDS
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| cmd.to_string())
                .collect();
            return Some(Completion {
                start: 0,
                typed: line,
                matches,
            });
        };

        let typed = rest.trim_start();
        if typed.contains(char::is_whitespace) {
            return None;
        }
        let start = line.len() - typed.len();

        let matches = match name {
            "/open" | "/delete" => self
                .sessions
                .iter()
                .filter(|id| session_matches(id, typed))
                .cloned()
                .collect(),
            "/lang" => self
                .languages
                .iter()
                .filter(|code| code.starts_with(typed))
                .cloned()
                .collect(),
            _ => return None,
        };

        Some(Completion {
            start,
            typed,
            matches,
        })
    }
}

/// `chat_1` is offered for `ch`, `chat_` and the bare number `1`.
fn session_matches(id: &str, typed: &str) -> bool {
    id.starts_with(typed)
        || id
            .strip_prefix("chat_")
            .is_some_and(|number| number.starts_with(typed))
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let Some(completion) = self.completion(&line[..pos]) else {
            return Ok((0, vec![]));
        };

        let candidates = completion
            .matches
            .into_iter()
            .map(|text| Pair {
                display: text.clone(),
                replacement: text,
            })
            .collect();
        Ok((completion.start, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Borrowed(line);
        }
        match line.find(char::is_whitespace) {
            Some(end) => Owned(format!("{}{}", line[..end].bright_cyan(), &line[end..])),
            None => Owned(line.bright_cyan().to_string()),
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let completion = self.completion(line)?;
        if completion.typed.is_empty() {
            return None;
        }

        completion
            .matches
            .iter()
            .find(|text| text.starts_with(completion.typed) && text.len() > completion.typed.len())
            .map(|text| text[completion.typed.len()..].to_string())
    }
}

impl Validator for CliHelper {}
