//! Shared metadata container for schemas and nodes.
//!
//! Comments, `$key=value` attributes, `#tags` and the `required` flag live
//! here. The same type serves three roles: the decoder's pending-metadata
//! accumulator, the type-level metadata on a [`Schema`](crate::Schema), and
//! the instance-level metadata on a [`Node`](crate::Node). Metadata is
//! additive -- applying one container onto another appends comments and
//! tags, overwrites attributes by key, and ORs `required`.

use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Default)]
pub struct Meta {
    /// `/* ... */` comment bodies, in source order.
    pub comments: Vec<String>,
    /// `$key=value` attributes. Insertion-ordered; values are restricted to
    /// the scalar union (string, number, boolean, null).
    pub attrs: Map<String, Value>,
    /// `#tag` entries, in source order.
    pub tags: Vec<String>,
    /// `!required` / `$required`. Only meaningful on schemas.
    pub required: bool,
}

impl Meta {
    pub fn new() -> Self {
        Meta::default()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty() && self.attrs.is_empty() && self.tags.is_empty() && !self.required
    }

    /// Merge another container into this one.
    pub fn apply(&mut self, other: &Meta) {
        self.comments.extend_from_slice(&other.comments);
        for (key, value) in &other.attrs {
            self.attrs.insert(key.clone(), value.clone());
        }
        self.tags.extend_from_slice(&other.tags);
        self.required |= other.required;
    }

    pub fn clear(&mut self) {
        *self = Meta::default();
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: Value) {
        self.attrs.insert(key.into(), value);
    }
}

/// Debug summary: `<Meta !required #tag $key=value /* preview */>`.
impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();

        if self.required {
            parts.push("!required".to_string());
        }
        for tag in &self.tags {
            parts.push(format!("#{tag}"));
        }
        for (key, value) in &self.attrs {
            let rendered = serde_json::to_string(value).unwrap_or_default();
            parts.push(format!("${key}={rendered}"));
        }
        if self.comments.len() == 1 {
            let comment = &self.comments[0];
            let preview: String = if comment.chars().count() > 15 {
                let head: String = comment.chars().take(15).collect();
                format!("{head}..")
            } else {
                comment.clone()
            };
            parts.push(format!("/* {preview} */"));
        } else if self.comments.len() > 1 {
            parts.push(format!("/* {} comments */", self.comments.len()));
        }

        if parts.is_empty() {
            write!(f, "<Meta (empty)>")
        } else {
            write!(f, "<Meta {}>", parts.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn apply_merges_additively() {
        let mut base = Meta::new();
        base.comments.push("first".to_string());
        base.set_attr("a", json!(1));
        base.tags.push("t1".to_string());

        let mut incoming = Meta::new();
        incoming.comments.push("second".to_string());
        incoming.set_attr("a", json!(2));
        incoming.set_attr("b", json!("x"));
        incoming.tags.push("t2".to_string());
        incoming.required = true;

        base.apply(&incoming);

        assert_eq!(base.comments, vec!["first", "second"]);
        assert_eq!(base.attrs.get("a"), Some(&json!(2)), "attributes overwrite by key");
        assert_eq!(base.attrs.get("b"), Some(&json!("x")));
        assert_eq!(base.tags, vec!["t1", "t2"]);
        assert!(base.required);

        // required is ORed: applying an empty container does not clear it
        base.apply(&Meta::new());
        assert!(base.required);
    }

    #[test]
    fn attribute_order_is_insertion_order() {
        let mut meta = Meta::new();
        meta.set_attr("z", json!(1));
        meta.set_attr("a", json!(2));
        let keys: Vec<&String> = meta.attrs.keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn debug_summary_format() {
        let mut meta = Meta::new();
        assert_eq!(meta.to_string(), "<Meta (empty)>");

        meta.required = true;
        meta.tags.push("hot".to_string());
        meta.set_attr("count", json!(3));
        meta.set_attr("label", json!("me"));
        meta.comments.push("a very long comment body here".to_string());
        assert_eq!(
            meta.to_string(),
            "<Meta !required #hot $count=3 $label=\"me\" /* a very long com.. */>"
        );

        meta.comments.push("another".to_string());
        assert!(meta.to_string().ends_with("/* 2 comments */>"));
    }
}
