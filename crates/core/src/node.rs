//! Document nodes: values linked to schema descriptors.

use crate::color;
use crate::meta::Meta;
use crate::schema::SchemaRef;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// A decoded (or programmatically built) value. Exactly one of the three
/// payloads is populated, matching the linked schema's kind: `value` for
/// primitives, `fields` for records, `elements` for lists. The node owns
/// its payload and children; the schema descriptor is shared.
pub struct Node {
    pub schema: SchemaRef,
    pub name: String,
    /// Scalar payload for primitive nodes.
    pub value: Option<Value>,
    /// Record children. Rendering order comes from the schema, not this map.
    pub fields: HashMap<String, Node>,
    /// List children, in source order.
    pub elements: Vec<Node>,
    /// Instance metadata, distinct from the type metadata on the schema.
    pub meta: Meta,
}

impl Node {
    pub fn new(schema: SchemaRef) -> Node {
        Node {
            schema,
            name: String::new(),
            value: None,
            fields: HashMap::new(),
            elements: Vec::new(),
            meta: Meta::new(),
        }
    }

    pub fn primitive(schema: SchemaRef, value: Value) -> Node {
        let mut node = Node::new(schema);
        node.value = Some(value);
        node
    }

    pub fn is_primitive(&self) -> bool {
        self.schema.borrow().is_primitive()
    }

    pub fn is_record(&self) -> bool {
        self.schema.borrow().is_record()
    }

    pub fn is_list(&self) -> bool {
        self.schema.borrow().is_list()
    }

    /// Apply the common metadata fields. Unlike schemas, nodes have no
    /// `required` constraint; a `required` attribute stays an attribute.
    pub fn apply_meta(&mut self, info: &Meta) {
        self.meta.comments.extend_from_slice(&info.comments);
        for (key, value) in &info.attrs {
            self.meta.attrs.insert(key.clone(), value.clone());
        }
        self.meta.tags.extend_from_slice(&info.tags);
    }

    pub fn clear_meta(&mut self) {
        self.meta.clear();
    }

    /// Recursively convert into a plain `serde_json::Value`. Records honor
    /// the schema's field order; fields with no child node are omitted.
    pub fn plain(&self) -> Value {
        if self.is_primitive() {
            return self.value.clone().unwrap_or(Value::Null);
        }
        if self.is_list() {
            return Value::Array(self.elements.iter().map(Node::plain).collect());
        }
        if self.is_record() {
            let mut map = Map::new();
            for field in self.schema.borrow().fields() {
                let name = field.borrow().name.clone();
                if let Some(child) = self.fields.get(&name) {
                    map.insert(name, child.plain());
                }
            }
            return Value::Object(map);
        }
        self.value.clone().unwrap_or(Value::Null)
    }

    /// JSON export with optional token-level ANSI colors.
    pub fn json(&self, indent: usize, colorize: bool) -> String {
        let data = self.plain();
        if colorize {
            let mut out = String::new();
            write_colored_json(&data, indent, 0, &mut out);
            return out;
        }
        if indent == 0 {
            return serde_json::to_string(&data).unwrap_or_default();
        }
        let indent_str = " ".repeat(indent);
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent_str.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        match serde::Serialize::serialize(&data, &mut ser) {
            Ok(()) => String::from_utf8(buf).unwrap_or_default(),
            Err(_) => String::new(),
        }
    }
}

fn write_colored_json(value: &Value, indent: usize, level: usize, out: &mut String) {
    let paint = |text: &str, c: &str| format!("{c}{text}{}", color::RESET);
    match value {
        Value::Null => out.push_str(&paint("null", color::JSON_NULL)),
        Value::Bool(true) => out.push_str(&paint("true", color::JSON_BOOL)),
        Value::Bool(false) => out.push_str(&paint("false", color::JSON_BOOL)),
        Value::Number(n) => out.push_str(&paint(&n.to_string(), color::JSON_NUMBER)),
        Value::String(s) => {
            let quoted = serde_json::to_string(s).unwrap_or_default();
            out.push_str(&paint(&quoted, color::JSON_STRING));
        }
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            let (open, close, pad) = brackets(indent, level);
            out.push_str(&format!("[{open}"));
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push_str(&format!(",{open}"));
                }
                out.push_str(&pad);
                write_colored_json(item, indent, level + 1, out);
            }
            out.push_str(&close);
            out.push(']');
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            let (open, close, pad) = brackets(indent, level);
            out.push_str(&format!("{{{open}"));
            for (idx, (key, item)) in map.iter().enumerate() {
                if idx > 0 {
                    out.push_str(&format!(",{open}"));
                }
                out.push_str(&pad);
                let quoted = serde_json::to_string(key).unwrap_or_default();
                out.push_str(&paint(&format!("{quoted}:"), color::JSON_KEY));
                out.push(' ');
                write_colored_json(item, indent, level + 1, out);
            }
            out.push_str(&close);
            out.push('}');
        }
    }
}

/// (separator after `{`/`,`, separator before the closer, child padding)
fn brackets(indent: usize, level: usize) -> (String, String, String) {
    if indent == 0 {
        return (String::new(), String::new(), String::new());
    }
    let newline = "\n".to_string();
    let close = format!("\n{}", " ".repeat(indent * level));
    let pad = " ".repeat(indent * (level + 1));
    (newline, close, pad)
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let schema = self.schema.borrow();
        let type_label = if schema.is_list() {
            let element_type = schema
                .element
                .as_ref()
                .and_then(|el| el.try_borrow().ok().map(|el| el.type_name.clone()))
                .unwrap_or_else(|| "any".to_string());
            format!("LIST[{element_type}]")
        } else if schema.is_record() && schema.type_name != "record" && schema.type_name != "any" {
            format!("RECORD:{}", schema.type_name)
        } else {
            format!("{}:{}", schema.kind.label(), schema.type_name)
        };
        write!(f, "<Node({type_label})")?;

        if schema.is_list() {
            write!(f, " len={}", self.elements.len())?;
        } else if schema.is_record() {
            let mut names: Vec<String> = schema
                .fields()
                .iter()
                .take(3)
                .map(|field| field.borrow().name.clone())
                .collect();
            if schema.fields_len() > 3 {
                names.push("...".to_string());
            }
            write!(f, " fields=[{}]", names.join(","))?;
        } else {
            let mut rendered = match &self.value {
                Some(v) => v.to_string(),
                None => "null".to_string(),
            };
            if rendered.chars().count() > 50 {
                rendered = format!("{}...", rendered.chars().take(47).collect::<String>());
            }
            write!(f, " val={rendered}")?;
        }

        if !self.meta.comments.is_empty() {
            write!(f, " comments={}", self.meta.comments.len())?;
        }
        if !self.meta.attrs.is_empty() {
            let keys: Vec<&String> = self.meta.attrs.keys().collect();
            write!(f, " attr={keys:?}")?;
        }
        if !self.meta.tags.is_empty() {
            write!(f, " tags={:?}", self.meta.tags)?;
        }
        write!(f, ">")
    }
}
