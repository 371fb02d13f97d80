//! Query-string construction from optional filters.

use std::fmt::Display;

/// Ordered `key=value` pairs; absent and blank values are skipped.
#[derive(Debug, Clone, Default)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<V: Display>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            let value = value.to_string();
            let value = value.trim();
            if !value.is_empty() {
                self.pairs.push((key.to_string(), value.to_string()));
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `""` when empty, otherwise `?k=v&…` with both sides percent-encoded.
    pub fn render(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let joined = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("?{joined}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_renders_nothing() {
        let q = QueryString::new().push("q", None::<&str>).push("status", Some("  "));
        assert!(q.is_empty());
        assert_eq!(q.render(), "");
    }

    #[test]
    fn keeps_insertion_order_and_encodes() {
        let q = QueryString::new()
            .push("q", Some(" Acme & Sons "))
            .push("active", Some(false))
            .push("sort", Some("name"));
        assert_eq!(q.render(), "?q=Acme%20%26%20Sons&active=false&sort=name");
    }
}
