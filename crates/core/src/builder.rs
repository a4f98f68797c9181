//! Plain value -> node builder.
//!
//! `serde_json::Value` is the carrier for plain data, which makes the
//! builder total: every variant of the accepted union maps to a node.
//! Mapping order is preserved (`serde_json` with `preserve_order`), so
//! record fields keep their source order.

use crate::node::Node;
use crate::schema::{Schema, SchemaKind};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Build a node tree for any plain value.
pub fn parse(value: &Value) -> Node {
    match value {
        Value::Null => primitive("null", value),
        Value::Bool(_) => primitive("bool", value),
        Value::Number(_) => primitive("number", value),
        Value::String(_) => primitive("string", value),
        Value::Array(items) => parse_array(items),
        Value::Object(map) => parse_object(map),
    }
}

fn primitive(type_name: &str, value: &Value) -> Node {
    Node::primitive(Schema::primitive(type_name).into_ref(), value.clone())
}

/// Sequences become lists. An empty sequence is a list of `any`; when all
/// elements are records the element schema is the union of their fields in
/// first-seen order (first descriptor wins per name); otherwise the first
/// element's schema is taken as the element schema.
fn parse_array(items: &[Value]) -> Node {
    if items.is_empty() {
        let schema = Schema::list(Schema::primitive("any").into_ref()).into_ref();
        return Node::new(schema);
    }

    let parsed: Vec<Node> = items.iter().map(parse).collect();
    let all_records = parsed.iter().all(Node::is_record);

    let element = if all_records && parsed[0].is_record() {
        let unified = Schema::with_type(SchemaKind::Record, "record").into_ref();
        let mut seen = HashSet::new();
        for item in &parsed {
            let fields = item.schema.borrow().fields().to_vec();
            for field in fields {
                let name = field.borrow().name.clone();
                if seen.insert(name) {
                    unified.borrow_mut().add_field(field);
                }
            }
        }
        unified
    } else {
        parsed[0].schema.clone()
    };

    let schema = Schema::list(element).into_ref();
    let mut node = Node::new(schema);
    node.elements = parsed;
    node
}

/// Mappings become records; each child's schema doubles as the field
/// descriptor, named by its key.
fn parse_object(map: &Map<String, Value>) -> Node {
    let schema = Schema::new(SchemaKind::Record).into_ref();
    let mut node = Node::new(schema.clone());
    for (key, raw) in map {
        let child = parse(raw);
        child.schema.borrow_mut().name = key.clone();
        schema.borrow_mut().add_field(child.schema.clone());
        node.fields.insert(key.clone(), child);
    }
    node
}
