//! Line-oriented keyfile parsing.

use crate::types::{declared_kind, ValueKind};
use crate::{KeyFileError, Result};
use serde_json::{Map, Value};

/// Converts keyfile text into a JSON object.
///
/// Sections become objects keyed by their verbatim names, assignments become
/// typed members, and both preserve first-seen order. A duplicate key within
/// a section overwrites the earlier value. Locale-suffixed keys
/// (`Key[locale]=`) are collapsed under the base key as an object keyed by
/// locale, with the unsuffixed value stored under `"C"`.
pub fn to_json(input: &str) -> Result<Value> {
    let mut doc = Map::new();
    let mut current: Option<String> = None;

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .ok_or_else(|| KeyFileError::at(line_no, "unterminated section header"))?;
            if name.is_empty() {
                return Err(KeyFileError::at(line_no, "empty section name"));
            }
            // Re-opening a section merges into the existing object.
            doc.entry(name.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            current = Some(name.to_string());
            continue;
        }

        let eq = line.find('=').ok_or_else(|| {
            KeyFileError::at(line_no, "line is neither a header, a comment, nor an assignment")
        })?;
        let section = current
            .as_deref()
            .ok_or_else(|| KeyFileError::at(line_no, "assignment before any section header"))?;
        let (base, locale) = parse_key(line[..eq].trim_end(), line_no)?;
        let value = line[eq + 1..].trim_start();

        let entries = doc
            .get_mut(section)
            .and_then(Value::as_object_mut)
            .expect("section object exists for the current section");
        match locale {
            None => {
                let coerced = coerce(section, base, value);
                insert_plain(entries, base, coerced);
            }
            Some(locale) => insert_localized(entries, base, locale, value),
        }
    }

    Ok(Value::Object(doc))
}

/// Splits `Key` or `Key[locale]` into base key and optional locale.
fn parse_key<'a>(key: &'a str, line_no: usize) -> Result<(&'a str, Option<&'a str>)> {
    let (base, locale) = match key.find('[') {
        Some(open) => {
            let locale = key[open + 1..]
                .strip_suffix(']')
                .ok_or_else(|| KeyFileError::at(line_no, "unterminated locale suffix"))?;
            if locale.is_empty() || locale.contains('[') || locale.contains(']') {
                return Err(KeyFileError::at(line_no, "invalid locale suffix"));
            }
            (&key[..open], Some(locale))
        }
        None => (key, None),
    };
    if base.is_empty() {
        return Err(KeyFileError::at(line_no, "empty key"));
    }
    if base.contains(']') {
        return Err(KeyFileError::at(line_no, "invalid key name"));
    }
    Ok((base, locale))
}

/// Applies value coercion in documented precedence: exact booleans, then
/// declared or separator-implied lists, then declared integers, then strings.
fn coerce(section: &str, key: &str, value: &str) -> Value {
    if value == "true" {
        return Value::Bool(true);
    }
    if value == "false" {
        return Value::Bool(false);
    }
    let kind = declared_kind(section, key);
    if kind == ValueKind::List || contains_unescaped_separator(value) {
        return Value::Array(split_list(value).into_iter().map(Value::String).collect());
    }
    if kind == ValueKind::Integer {
        if let Ok(n) = value.parse::<i64>() {
            return Value::Number(n.into());
        }
    }
    Value::String(unescape(value))
}

fn insert_plain(entries: &mut Map<String, Value>, key: &str, value: Value) {
    // An object here is a locale fold; the unsuffixed value lives at "C".
    if let Some(Value::Object(locales)) = entries.get_mut(key) {
        locales.insert("C".to_string(), value);
        return;
    }
    entries.insert(key.to_string(), value);
}

fn insert_localized(entries: &mut Map<String, Value>, key: &str, locale: &str, value: &str) {
    let translated = Value::String(unescape(value));
    if let Some(existing) = entries.get_mut(key) {
        if let Value::Object(locales) = existing {
            locales.insert(locale.to_string(), translated);
        } else {
            // Promote the plain value in place so the key keeps its position.
            let mut locales = Map::new();
            locales.insert("C".to_string(), existing.take());
            locales.insert(locale.to_string(), translated);
            *existing = Value::Object(locales);
        }
        return;
    }
    let mut locales = Map::new();
    locales.insert(locale.to_string(), translated);
    entries.insert(key.to_string(), Value::Object(locales));
}

fn contains_unescaped_separator(value: &str) -> bool {
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            ';' => return true,
            _ => {}
        }
    }
    false
}

/// Splits on unescaped `;`, unescaping each element. A trailing separator's
/// empty tail is dropped; interior empty elements are kept.
fn split_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut item = String::new();
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => unescape_step(&mut item, chars.next()),
            ';' => items.push(std::mem::take(&mut item)),
            _ => item.push(c),
        }
    }
    if !item.is_empty() {
        items.push(item);
    }
    items
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => unescape_step(&mut out, chars.next()),
            _ => out.push(c),
        }
    }
    out
}

/// `\;` and `\\` are the two recognized escapes; anything else passes
/// through verbatim, backslash included.
fn unescape_step(out: &mut String, escaped: Option<char>) {
    match escaped {
        Some(';') => out.push(';'),
        Some('\\') => out.push('\\'),
        Some(other) => {
            out.push('\\');
            out.push(other);
        }
        None => out.push('\\'),
    }
}
