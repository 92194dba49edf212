//! Raw document → flat row normalization
//!
//! Rules are applied in a fixed order, each reading the output of the previous:
//! 1. drop internal fields
//! 2. rename fields (old key removed, new key appended)
//! 3. join list values with the list delimiter
//! 4. escape line breaks everywhere, and tabs too in free-text fields

use serde_json::{Map, Value};

/// A variable-schema document as read from the source collection.
///
/// Key order is the source's field order (`serde_json` is built with
/// `preserve_order`).
pub type RawRecord = Map<String, Value>;

/// Delimiter for joined list values. Author names and MeSH terms may contain
/// commas, so a comma would make element boundaries unrecoverable.
pub const LIST_DELIMITER: char = ';';

/// Fixed rule set applied by [`transform`].
#[derive(Debug, Clone)]
pub struct TransformRules {
    /// Fields that never reach the output (raw payload, full text)
    pub dropped: Vec<&'static str>,
    /// `(old, new)` field renames
    pub renames: Vec<(&'static str, &'static str)>,
    /// Separator used when joining list values
    pub list_delimiter: char,
    /// Fields whose embedded tabs are escaped as well as line breaks
    pub free_text: Vec<&'static str>,
}

impl Default for TransformRules {
    fn default() -> Self {
        Self {
            dropped: vec!["_id", "raw", "full_text", "full_text_type"],
            renames: vec![("publication_date", "pubdate"), ("source", "journal")],
            list_delimiter: LIST_DELIMITER,
            free_text: vec!["title", "abstract"],
        }
    }
}

impl TransformRules {
    /// Fields a record source can skip fetching altogether.
    pub fn excluded_fields(&self) -> &[&'static str] {
        &self.dropped
    }
}

/// Normalized, list-free row ready for tabular output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRecord {
    fields: Vec<(String, String)>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `name`, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.fields[i].1.as_str())
    }

    /// Insert or overwrite in place, keeping the original position
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => self.fields[i].1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|(k, _)| k == name)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Map one raw document to one flat row. Never fails; absent fields are a no-op.
pub fn transform(raw: &RawRecord, rules: &TransformRules) -> FlatRecord {
    // 1. drop
    let mut fields: Vec<(&str, &Value)> = raw
        .iter()
        .filter(|(k, _)| !rules.dropped.contains(&k.as_str()))
        .map(|(k, v)| (k.as_str(), v))
        .collect();

    // 2. rename
    for &(old, new) in &rules.renames {
        let Some(pos) = fields.iter().position(|(k, _)| *k == old) else {
            continue;
        };
        let (_, value) = fields.remove(pos);
        match fields.iter().position(|(k, _)| *k == new) {
            Some(existing) => fields[existing].1 = value,
            None => fields.push((new, value)),
        }
    }

    let mut delim = [0u8; 4];
    let delim: &str = rules.list_delimiter.encode_utf8(&mut delim);

    fields
        .into_iter()
        .map(|(name, value)| {
            // 3. join; line breaks are escaped in every value so a row stays on one line
            let mut text = match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| escape_line_breaks(&scalar_text(item)))
                    .collect::<Vec<_>>()
                    .join(delim),
                other => escape_line_breaks(&scalar_text(other)),
            };
            // 4. escape
            if rules.free_text.contains(&name) {
                text = escape_free_text(&text);
            }
            (name.to_string(), text)
        })
        .collect()
}

/// String form of a single value. Nested structures become compact JSON so
/// nothing is lost.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Replace row/column-breaking characters with visible two-character escapes.
pub fn escape_free_text(text: &str) -> String {
    escape_controls(text, true)
}

/// Escape `\n` and `\r` only; tabs are left for the sink to quote.
pub fn escape_line_breaks(text: &str) -> String {
    escape_controls(text, false)
}

fn escape_controls(text: &str, tabs: bool) -> String {
    if !text.contains(['\n', '\r']) && !(tabs && text.contains('\t')) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' if tabs => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
