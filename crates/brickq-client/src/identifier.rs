//! Structured identifiers for result cells.
//!
//! Endpoints hand back full IRIs (`<http://x.org/brick#Sensor>`), compact
//! CURIEs (`brick:Sensor`), literals, and unbound variables (`?x`). All of them
//! are reduced to a `(namespace, value)` pair.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A resource reference or literal value returned by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    /// Namespace part (may be empty).
    pub namespace: String,

    /// Local name or literal value.
    pub value: String,
}

impl Identifier {
    pub fn new(namespace: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            value: value.into(),
        }
    }

    /// Parse an identifier string.
    ///
    /// Strips one surrounding `<`/`>`, then splits on `#` when that yields
    /// exactly two non-empty parts. Otherwise splits once on the first `:`.
    /// Strings with neither keep an empty namespace.
    pub fn parse(raw: &str) -> Self {
        let s = raw.strip_prefix('<').unwrap_or(raw);
        let s = s.strip_suffix('>').unwrap_or(s);

        let parts: Vec<&str> = s.split('#').collect();
        if let [namespace, value] = parts.as_slice() {
            if !namespace.is_empty() && !value.is_empty() {
                return Self::new(*namespace, *value);
            }
        }

        match s.split_once(':') {
            Some((namespace, value)) => Self::new(namespace, value),
            None => Self::new("", s),
        }
    }

    /// Whether this denotes an unbound variable placeholder.
    pub fn is_variable(&self) -> bool {
        self.value.starts_with('?')
    }

    /// Byte form `namespace#value`, including the `#` when the namespace is empty.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("{}#{}", self.namespace, self.value).into_bytes()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.value)
        } else {
            write!(f, "{}#{}", self.namespace, self.value)
        }
    }
}

impl From<&str> for Identifier {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}
