//! `${attribute}` template strings resolved against the request context.

/// A configuration value that may reference request attributes.
///
/// A plain string is its own literal. Each `${name}` segment is replaced
/// with the value of attribute `name` on the in-flight request; an
/// attribute with no value resolves to the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
}

impl Template {
    /// Create a template from its raw text.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The unresolved template text.
    pub fn literal(&self) -> &str {
        &self.raw
    }

    /// Whether the template references any attribute.
    pub fn is_dynamic(&self) -> bool {
        self.raw.contains("${")
    }

    /// Resolve the template against an attribute lookup.
    pub fn resolve<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.is_dynamic() {
            return self.raw.clone();
        }

        let mut resolved = String::with_capacity(self.raw.len());
        let mut rest = self.raw.as_str();
        while let Some(start) = rest.find("${") {
            resolved.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    if let Some(value) = lookup(&after[..end]) {
                        resolved.push_str(&value);
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    // Unterminated reference, keep the text as-is.
                    resolved.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        resolved.push_str(rest);
        resolved
    }
}

impl From<&str> for Template {
    fn from(raw: &str) -> Self {
        Template::new(raw)
    }
}

impl From<String> for Template {
    fn from(raw: String) -> Self {
        Template::new(raw)
    }
}
