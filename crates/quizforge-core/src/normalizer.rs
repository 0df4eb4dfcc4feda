//! Content normalizer.
//!
//! Turns the free-form text returned by the generative service into a
//! [`QuizPayload`]. The text is untrusted: it may be wrapped in markdown
//! fences, carry raw control characters inside string literals, use stray
//! backslashes (LaTeX is a frequent offender), be surrounded by prose, or end
//! lists with trailing commas. Each repair is a pure [`RepairStrategy`] tried
//! in order; the first one that yields a payload wins.
//!
//! Nothing in here fails: unrecoverable input becomes an empty payload.

use std::borrow::Cow;
use std::fmt;

use serde_json::{Map, Value};

/// Field names accepted for the top-level answer key, in lookup order.
pub const ANSWER_KEY_FIELDS: &[&str] = &["answer_key", "answer_keys", "answerKey", "answerKeys"];

/// Structured content recovered from a generation response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizPayload {
    /// Question entries in document order, still in their raw JSON shape.
    pub questions: Vec<Value>,
    /// Answer-key mapping from question reference to option token.
    pub answer_key: Map<String, Value>,
}

impl QuizPayload {
    /// `true` for the "no content" result.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// One step of the repair cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStrategy {
    /// Parse the unfenced text as-is.
    Strict,
    /// Escape stray backslashes and raw control characters inside strings.
    EscapeStrings,
    /// Take the outermost `{ ... }` span, escape it, and drop trailing commas.
    ExtractObject,
}

impl RepairStrategy {
    /// All strategies, in the order they are attempted.
    pub const CASCADE: [RepairStrategy; 3] = [
        RepairStrategy::Strict,
        RepairStrategy::EscapeStrings,
        RepairStrategy::ExtractObject,
    ];

    /// Produce the candidate text for this strategy, or `None` if it does not apply.
    pub fn repair(self, text: &str) -> Option<Cow<'_, str>> {
        match self {
            RepairStrategy::Strict => Some(Cow::Borrowed(text)),
            RepairStrategy::EscapeStrings => Some(Cow::Owned(escape_string_literals(text))),
            RepairStrategy::ExtractObject => extract_object(text)
                .map(|span| Cow::Owned(strip_trailing_commas(&escape_string_literals(span)))),
        }
    }
}

impl fmt::Display for RepairStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairStrategy::Strict => write!(f, "strict"),
            RepairStrategy::EscapeStrings => write!(f, "escape-strings"),
            RepairStrategy::ExtractObject => write!(f, "extract-object"),
        }
    }
}

/// Normalize a raw generation response. Returns an empty payload when nothing
/// could be recovered.
pub fn normalize(raw: &str) -> QuizPayload {
    recover(raw).map(|(_, payload)| payload).unwrap_or_default()
}

/// Like [`normalize`], but also reports which strategy succeeded.
pub fn recover(raw: &str) -> Option<(RepairStrategy, QuizPayload)> {
    let text = strip_fences(raw);

    for strategy in RepairStrategy::CASCADE {
        let Some(candidate) = strategy.repair(text) else {
            tracing::debug!(%strategy, "repair strategy not applicable");
            continue;
        };
        match parse_payload(&candidate) {
            Some(payload) => {
                tracing::debug!(
                    %strategy,
                    questions = payload.questions.len(),
                    "recovered quiz payload"
                );
                return Some((strategy, payload));
            }
            None => tracing::debug!(%strategy, "repair strategy did not yield a payload"),
        }
    }

    tracing::warn!(raw = %preview(raw, 160), "no quiz payload could be recovered");
    None
}

/// Trim and remove one leading fence (with optional language tag) and one
/// trailing fence.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        text = rest[tag_len..].trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }

    text
}

/// Escape what a strict parser rejects inside string literals.
///
/// Backslashes are handled first: a backslash that starts a valid JSON escape
/// is kept, any other one is doubled. Raw line feeds, tabs, carriage returns,
/// form feeds and remaining control characters are then written as escapes.
/// Text outside string literals is copied unchanged.
pub fn escape_string_literals(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut in_string = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }

        match c {
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\\' => {
                let valid = match chars.peek() {
                    Some(&'u') => {
                        let mut ahead = chars.clone();
                        ahead.next();
                        (0..4).all(|_| ahead.next().is_some_and(|h| h.is_ascii_hexdigit()))
                    }
                    Some(&next) => matches!(next, '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't'),
                    None => false,
                };
                if valid {
                    out.push('\\');
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                } else {
                    out.push_str("\\\\");
                }
            }
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{0C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }

    out
}

/// Greedy span from the first `{` to the last `}`.
pub fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Drop commas that directly precede a closing `}` or `]`, ignoring string contents.
pub fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' if text[i + 1..].trim_start().starts_with(['}', ']']) => {}
            c => out.push(c),
        }
    }

    out
}

fn parse_payload(text: &str) -> Option<QuizPayload> {
    let Value::Object(mut root) = serde_json::from_str::<Value>(text).ok()? else {
        return None;
    };
    let Value::Array(questions) = root.remove("questions")? else {
        return None;
    };

    let answer_key = ANSWER_KEY_FIELDS
        .iter()
        .find_map(|field| match root.remove(*field)? {
            Value::Object(map) => Some(map),
            // Positional keys: ["B", "A", ...] answers Q1, Q2, ...
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| ((i + 1).to_string(), v))
                    .collect(),
            ),
            _ => None,
        })
        .unwrap_or_default();

    Some(QuizPayload {
        questions,
        answer_key,
    })
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        text.chars().take(max_chars).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
