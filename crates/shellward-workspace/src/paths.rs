//! Path-looking substrings in raw command text.
//!
//! This is pattern matching over the raw string, not a shell parser: tokens
//! are split on whitespace and shell operators, quotes are trimmed, and
//! `key=value` arguments contribute their value.

use std::path::{Component, Path, PathBuf};

/// Characters that separate tokens in addition to whitespace.
fn is_token_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ';' | '|' | '&' | '<' | '>' | '(' | ')' | '`')
}

/// Split a command into argument-like tokens, trimming quotes and taking the
/// value side of `key=value` arguments.
pub(crate) fn argument_tokens(command: &str) -> Vec<&str> {
    command
        .split(is_token_separator)
        .map(|t| t.trim_matches(|c| c == '"' || c == '\''))
        .map(|t| match t.split_once('=') {
            Some((_, value)) if !value.is_empty() => value,
            _ => t,
        })
        .filter(|t| !t.is_empty())
        .collect()
}

/// Whether a token refers to a filesystem location by shape alone.
#[must_use]
pub fn is_path_like(token: &str) -> bool {
    token.starts_with('/')
        || token.starts_with("./")
        || token.starts_with("../")
        || token == ".."
        || token == "~"
        || token.starts_with("~/")
        || token.contains("/../")
        || token.ends_with("/..")
}

/// Extract every path-looking substring (absolute, `../`, `~/`, `./`) from a
/// command, in order of first appearance and without duplicates.
#[must_use]
pub fn extract_paths(command: &str) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for token in argument_tokens(command) {
        if is_path_like(token) && !paths.iter().any(|p| p == token) {
            paths.push(token.to_owned());
        }
    }
    paths
}

/// How one simple command is joined to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Joiner {
    /// `&&`: the next segment runs only if this one succeeded.
    And,
    /// `;`, `||`, `|`, `&`, newline or end of input.
    Other,
}

/// One simple command and the operator that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    /// The segment text, surrounding whitespace included.
    pub(crate) text: &'a str,
    /// The operator text after it, empty at the end of input.
    pub(crate) operator: &'a str,
}

impl Segment<'_> {
    pub(crate) fn joiner(self) -> Joiner {
        if self.operator == "&&" {
            Joiner::And
        } else {
            Joiner::Other
        }
    }
}

/// Split a command at `;`, `|`, `||`, `&`, `&&` and newlines. Concatenating
/// every segment's text and operator gives back the input.
pub(crate) fn split_segments(command: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut chars = command.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if !matches!(c, ';' | '|' | '&' | '\n') {
            continue;
        }
        let mut end = idx.saturating_add(c.len_utf8());
        if matches!(c, '|' | '&') && chars.peek().is_some_and(|&(_, next)| next == c) {
            chars.next();
            end = end.saturating_add(c.len_utf8());
        }
        segments.push(Segment {
            text: &command[start..idx],
            operator: &command[idx..end],
        });
        start = end;
    }
    segments.push(Segment {
        text: &command[start..],
        operator: "",
    });
    segments
}

/// Split a command into non-empty, trimmed simple-command segments.
pub(crate) fn command_segments(command: &str) -> impl Iterator<Item = &str> {
    split_segments(command)
        .into_iter()
        .map(|segment| segment.text.trim())
        .filter(|s| !s.is_empty())
}

/// The target of a segment that is a `cd`. A bare `cd` targets `~`.
pub(crate) fn cd_target(segment: &str) -> Option<String> {
    let mut words = segment.split_whitespace();
    if words.next()? != "cd" {
        return None;
    }
    let target = words
        .find(|w| !w.starts_with('-'))
        .map_or("~", |w| w.trim_matches(|c| c == '"' || c == '\''));
    Some(target.to_owned())
}

/// Every `cd` target in the command, in order.
#[must_use]
pub fn cd_targets(command: &str) -> Vec<String> {
    command_segments(command).filter_map(cd_target).collect()
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// `..` never climbs above the root of an absolute path.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {},
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            },
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Expand a leading `~` against `home`. Other paths are returned unchanged.
#[must_use]
pub fn expand_home(raw: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(raw);
    };
    if raw == "~" {
        return home.to_path_buf();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}
