//! Answer-key resolution.
//!
//! Generated payloads reference the correct answer indirectly: an answer-key
//! map keyed by question id, position, or `Q{n}`, whose values are short
//! tokens like `"B"` that prefix one of the options (`"B) ..."` or `"B. ..."`).

use serde_json::{Map, Value};

/// Field names accepted for a question's option list, in lookup order.
pub const OPTION_FIELDS: &[&str] = &["answers", "options", "choices"];

/// Resolve the literal text of the correct option for the entry at `index`
/// (zero-based).
///
/// Falls back to the first option when no key resolves or no option matches,
/// so scoring stays well-defined. Returns an empty string when the entry has
/// no options at all.
pub fn resolve_correct_answer(entry: &Value, index: usize, answer_key: &Map<String, Value>) -> String {
    let options = options_of(entry);
    let Some(first) = options.first() else {
        return String::new();
    };

    let matched = lookup_key(entry, index, answer_key).and_then(|key| {
        let found = find_option(&options, &key);
        if found.is_none() {
            tracing::debug!(index, key = %key, "answer key matches no option");
        }
        found
    });

    matched.unwrap_or(first).clone()
}

/// Find the answer-key token for an entry.
///
/// Candidates, first present wins: the entry's own id, its positional id
/// (own id or `Q{n}`), the 1-based index, and `Q{n}`.
pub fn lookup_key(entry: &Value, index: usize, answer_key: &Map<String, Value>) -> Option<String> {
    let n = index + 1;
    let own_id = entry_id(entry);
    let positional_id = own_id.clone().unwrap_or_else(|| format!("Q{n}"));

    own_id
        .into_iter()
        .chain([positional_id, n.to_string(), format!("Q{n}")])
        .find_map(|candidate| answer_key.get(&candidate).and_then(scalar_text))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Option whose trimmed text begins with `"{key})"` or `"{key}."`, or equals
/// the key verbatim.
pub fn find_option<'a>(options: &'a [String], key: &str) -> Option<&'a String> {
    let paren = format!("{key})");
    let dot = format!("{key}.");
    options.iter().find(|option| {
        let option = option.trim_start();
        option.starts_with(&paren) || option.starts_with(&dot) || option.trim_end() == key
    })
}

/// Options of an entry under the first accepted field name present.
///
/// Scalar options are stringified; nested values are skipped.
pub fn options_of(entry: &Value) -> Vec<String> {
    OPTION_FIELDS
        .iter()
        .find_map(|field| entry.get(*field).and_then(Value::as_array))
        .map(|items| items.iter().filter_map(scalar_text).collect())
        .unwrap_or_default()
}

/// The entry's own identifier, if it has a non-empty one.
pub fn entry_id(entry: &Value) -> Option<String> {
    entry
        .get("id")
        .and_then(scalar_text)
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
