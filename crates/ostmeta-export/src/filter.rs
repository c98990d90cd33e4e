//! Ref selection.

/// The structured parts of a ref name, `kind/id/arch/branch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefParts<'a> {
    pub kind: &'a str,
    pub id: &'a str,
    pub arch: &'a str,
    pub branch: &'a str,
}

impl<'a> RefParts<'a> {
    /// Splits a ref name into its four segments, `None` for other shapes.
    pub fn parse(name: &'a str) -> Option<Self> {
        let mut segments = name.split('/');
        let parts = Self {
            kind: segments.next()?,
            id: segments.next()?,
            arch: segments.next()?,
            branch: segments.next()?,
        };
        if segments.next().is_some()
            || [parts.kind, parts.id, parts.arch, parts.branch]
                .iter()
                .any(|s| s.is_empty())
        {
            return None;
        }
        Some(parts)
    }
}

/// True for refs produced as build byproducts of another application.
pub fn is_built_extension(id: &str) -> bool {
    id.ends_with(".Locale") || id.ends_with(".Sources") || id.ends_with(".Debug")
}

/// Selects which enumerated refs get processed.
#[derive(Debug, Clone, Default)]
pub struct RefFilter {
    /// Explicit allow-list of full ref names; `None` selects everything.
    pub refs: Option<Vec<String>>,
    /// Keep only refs whose architecture segment matches.
    pub arch: Option<String>,
    /// Drop `.Locale`/`.Sources`/`.Debug` build byproducts.
    pub skip_built_extensions: bool,
}

impl RefFilter {
    /// Applies the filter to one ref name.
    pub fn matches(&self, name: &str) -> bool {
        if let Some(allow) = &self.refs {
            if !allow.iter().any(|r| r == name) {
                return false;
            }
        }
        let parts = RefParts::parse(name);
        if let Some(arch) = &self.arch {
            if parts.map(|p| p.arch) != Some(arch.as_str()) {
                return false;
            }
        }
        if self.skip_built_extensions {
            if let Some(parts) = parts {
                if is_built_extension(parts.id) {
                    return false;
                }
            }
        }
        true
    }
}
