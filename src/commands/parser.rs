//! Prefix command parsing
//!
//! `!name arg "quoted arg" rest of text` becomes a command name plus an
//! [`Args`] cursor. Arguments are whitespace-delimited unless wrapped in
//! double quotes.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use std::str::FromStr;

use crate::core::{BotError, BotResult};

/// A message that starts with the command prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    /// The token right after the prefix, exactly as typed
    pub name: &'a str,
    /// Everything after the name, untouched
    pub body: &'a str,
}

/// Split `content` into command name and body, or `None` if it is not a command
pub fn parse_command<'a>(content: &'a str, prefix: &str) -> Option<ParsedCommand<'a>> {
    let rest = content.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        return None;
    }
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Some(ParsedCommand {
        name: &rest[..end],
        body: rest[end..].trim_start(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    value: String,
    /// Byte offset in the body where the token begins
    start: usize,
}

fn tokenize(body: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = body.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut value = String::new();
        if c == '"' {
            chars.next();
            for (_, c) in chars.by_ref() {
                if c == '"' {
                    break;
                }
                value.push(c);
            }
        } else {
            while let Some(&(_, c)) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                value.push(c);
                chars.next();
            }
        }
        tokens.push(Token { value, start });
    }
    tokens
}

/// Positional argument cursor for one invocation
#[derive(Debug, Clone)]
pub struct Args {
    body: String,
    tokens: Vec<Token>,
    cursor: usize,
    usage: &'static str,
}

impl Args {
    pub fn new(body: &str, usage: &'static str) -> Self {
        Self {
            body: body.to_string(),
            tokens: tokenize(body),
            cursor: 0,
            usage,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    pub fn next(&mut self) -> Option<String> {
        let token = self.tokens.get(self.cursor)?;
        self.cursor += 1;
        Some(token.value.clone())
    }

    /// Next argument, or an error naming it
    pub fn required(&mut self, name: &str) -> BotResult<String> {
        self.next().ok_or_else(|| self.missing(name))
    }

    /// Next argument converted to `T`
    pub fn parse<T: FromStr>(&mut self, name: &str) -> BotResult<T> {
        let raw = self.required(name)?;
        convert(&raw, name)
    }

    /// Like [`Args::parse`], but an absent argument yields `default`
    pub fn parse_or<T: FromStr>(&mut self, name: &str, default: T) -> BotResult<T> {
        match self.next() {
            Some(raw) => convert(&raw, name),
            None => Ok(default),
        }
    }

    /// Everything not yet consumed, as typed, including quotes and line breaks
    pub fn rest(&mut self) -> Option<String> {
        let token = self.tokens.get(self.cursor)?;
        let rest = self.body[token.start..].trim_end().to_string();
        self.cursor = self.tokens.len();
        Some(rest)
    }

    pub fn required_rest(&mut self, name: &str) -> BotResult<String> {
        self.rest().ok_or_else(|| self.missing(name))
    }

    /// Remaining arguments without consuming them
    pub fn remaining(&self) -> Vec<&str> {
        self.tokens[self.cursor.min(self.tokens.len())..]
            .iter()
            .map(|t| t.value.as_str())
            .collect()
    }

    fn missing(&self, name: &str) -> BotError {
        BotError::invalid(format!(
            "Missing argument `{name}`. Usage: `{}`",
            self.usage
        ))
    }
}

fn convert<T: FromStr>(raw: &str, name: &str) -> BotResult<T> {
    raw.parse::<T>()
        .map_err(|_| BotError::invalid(format!("Invalid input for `{name}`: `{raw}`")))
}
