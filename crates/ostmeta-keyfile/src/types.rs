//! Declared value types for well-known metadata keys.
//!
//! Most keys are plain strings. A fixed allow-list of (section, key) pairs
//! carries a declared type that drives coercion: the extension tables use
//! booleans and string lists, `ExtensionOf` carries an integer priority, and
//! everything under `Context` is list-valued.

use regex::Regex;
use std::sync::LazyLock;

/// Value type a key coerces to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Bool,
    List,
    Integer,
}

struct TypedKey {
    section: Regex,
    key: Regex,
    kind: ValueKind,
}

fn full(pattern: &str) -> Regex {
    // The table matches whole section and key names, not substrings.
    Regex::new(&format!("^(?:{pattern})$")).expect("static pattern")
}

static TYPED_KEYS: LazyLock<Vec<TypedKey>> = LazyLock::new(|| {
    [
        (r"Context", r".*", ValueKind::List),
        (
            r"Extension \S+",
            r"autodelete|no-autodownload|subdirectories|locale-subset",
            ValueKind::Bool,
        ),
        (r"Extension \S+", r"versions|merge-dirs", ValueKind::List),
        (r"ExtensionOf", r"priority", ValueKind::Integer),
        (
            r"(Application|Runtime)",
            r"required-flatpak|tags",
            ValueKind::List,
        ),
        (r"Build", r"built-extensions", ValueKind::List),
    ]
    .into_iter()
    .map(|(section, key, kind)| TypedKey {
        section: full(section),
        key: full(key),
        kind,
    })
    .collect()
});

/// Looks up the declared type for a key, defaulting to plain string.
pub fn declared_kind(section: &str, key: &str) -> ValueKind {
    for row in TYPED_KEYS.iter() {
        if row.section.is_match(section) && row.key.is_match(key) {
            return row.kind;
        }
    }
    ValueKind::String
}
