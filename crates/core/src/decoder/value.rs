//! Data value parsing: dispatch, lists, positional and named records,
//! schema-prefixed values, primitives.

use super::{Decoder, MetaHost};
use crate::node::Node;
use crate::schema::{Schema, SchemaKind, SchemaRef};
use serde_json::Value;
use std::rc::Rc;

impl Decoder {
    /// The dispatch hub. `host` is the enclosing container, so metadata
    /// blocks in front of the value attach to it.
    pub(crate) fn parse_node(&mut self, host: &mut MetaHost<'_>) -> Node {
        self.parse_meta(host);
        let Some(c) = self.peek() else {
            self.add_error("Unexpected EOF while expecting a node");
            return self.create_node(None);
        };

        let mut node = match c {
            '@' => self.parse_node_with_schema_ref(host),
            '<' => self.parse_node_with_inline_schema(host),
            '[' => self.parse_list(),
            '(' => self.parse_positional_record(),
            '{' => self.parse_named_record(),
            '"' => {
                let value = self.read_quoted_string();
                self.create_node(Some(Value::String(value)))
            }
            c if c.is_ascii_digit() || c == '-' => {
                let value = self.read_number();
                self.create_node(Some(value))
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '`' => self.parse_raw_string(),
            other => {
                self.add_error(format!("Unexpected character '{other}'"));
                self.advance(1);
                self.create_node(None)
            }
        };

        let pending = std::mem::take(&mut self.pending);
        node.apply_meta(&pending);
        node
    }

    /// `@Type value` -- the reference becomes the value's schema context.
    fn parse_node_with_schema_ref(&mut self, host: &mut MetaHost<'_>) -> Node {
        self.dbg("node with schema ref (@)");
        let schema = self.parse_schema_at_ref();
        self.push_schema(schema.clone());
        let mut node = self.parse_node(host);
        self.pop_schema();
        node.schema = schema;
        node
    }

    /// `<...> value` -- inline definition (or type tag) ahead of the value.
    fn parse_node_with_inline_schema(&mut self, host: &mut MetaHost<'_>) -> Node {
        self.dbg("node with inline schema (<)");
        let schema = self.parse_schema_body("");
        self.push_schema(schema.clone());
        let mut node = self.parse_node(host);
        self.pop_schema();
        node.schema = schema;
        node
    }

    /// `[ ... ]`. The node inherits a list context or mutates its schema
    /// into one; an `any` element is widened to the schema of the first
    /// element produced.
    pub(crate) fn parse_list(&mut self) -> Node {
        self.dbg("START list [");
        self.depth += 1;
        self.advance(1);

        let mut node = self.create_node(None);
        node.elements.clear();
        {
            let mut s = node.schema.borrow_mut();
            if s.kind != SchemaKind::List {
                s.kind = SchemaKind::List;
                s.type_name = "list".to_string();
                s.element = Some(Schema::any().into_ref());
            }
        }
        let parent_schema = node.schema.clone();
        let child_schema = parent_schema
            .borrow()
            .element
            .clone()
            .unwrap_or_else(|| Schema::any().into_ref());

        loop {
            self.parse_meta(&mut MetaHost::Node(&mut node));
            let Some(c) = self.peek() else {
                self.add_error("Unexpected EOF: List not closed, expected ']'");
                break;
            };
            if c == ']' {
                self.flush_trailing_to_element(&mut node);
                self.advance(1);
                break;
            }
            if c == ',' {
                self.flush_trailing_to_element(&mut node);
                self.advance(1);
                continue;
            }

            self.push_schema(child_schema.clone());
            let child = self.parse_node(&mut MetaHost::Node(&mut node));
            self.pop_schema();

            let element = parent_schema.borrow().element.clone();
            if let Some(el) = element {
                let widen = !Rc::ptr_eq(&el, &parent_schema) && el.borrow().is_any();
                if widen {
                    parent_schema.borrow_mut().element = Some(child.schema.clone());
                }
            }
            node.elements.push(child);
        }

        self.depth -= 1;
        self.dbg("END list ]");
        node
    }

    /// `( ... )`. Children map onto schema fields by ordinal when the
    /// context has fields; otherwise synthetic `_i` fields are inferred
    /// from the produced children and appended.
    pub(crate) fn parse_positional_record(&mut self) -> Node {
        self.dbg("START record (");
        self.depth += 1;
        self.advance(1);

        let mut node = self.create_node(None);
        {
            let mut s = node.schema.borrow_mut();
            if s.kind != SchemaKind::Record {
                s.kind = SchemaKind::Record;
                s.type_name = "any".to_string();
            }
        }
        // freeze the declared fields before inference starts appending
        let predefined: Vec<SchemaRef> = node.schema.borrow().fields().to_vec();
        let mut index = 0usize;
        let mut last_key: Option<String> = None;

        loop {
            self.parse_meta(&mut MetaHost::Node(&mut node));
            let Some(c) = self.peek() else {
                self.add_error("Unexpected EOF: Record not closed, expected ')'");
                break;
            };
            if c == ')' {
                self.flush_trailing_to_field(&mut node, last_key.as_deref());
                self.advance(1);
                break;
            }
            if c == ',' {
                self.flush_trailing_to_field(&mut node, last_key.as_deref());
                self.advance(1);
                continue;
            }

            let field_schema = predefined
                .get(index)
                .cloned()
                .unwrap_or_else(|| Schema::any().into_ref());
            self.push_schema(field_schema);
            let child = self.parse_node(&mut MetaHost::Node(&mut node));
            self.pop_schema();

            let name = match predefined.get(index) {
                Some(field) => field.borrow().name.clone(),
                None => {
                    let name = format!("_{index}");
                    if !Rc::ptr_eq(&node.schema, &child.schema) {
                        child.schema.borrow_mut().name = name.clone();
                        node.schema.borrow_mut().add_field(child.schema.clone());
                    }
                    name
                }
            };
            node.fields.insert(name.clone(), child);
            last_key = Some(name);
            index += 1;
        }

        self.depth -= 1;
        self.dbg("END record )");
        node
    }

    /// `{ key: value, ... }`. Keys are identifiers or quoted strings.
    /// An `any` field schema is replaced (order-preserving) by the child's
    /// concrete schema; unknown keys get inferred fields appended.
    pub(crate) fn parse_named_record(&mut self) -> Node {
        self.dbg("START named record {");
        self.depth += 1;
        self.advance(1);

        let mut node = self.create_node(None);
        node.fields.clear();
        {
            let mut s = node.schema.borrow_mut();
            if s.kind != SchemaKind::Record {
                s.kind = SchemaKind::Record;
                s.type_name = "any".to_string();
            }
        }
        let current_schema = node.schema.clone();
        let mut last_key: Option<String> = None;

        loop {
            self.parse_meta(&mut MetaHost::Node(&mut node));
            let Some(c) = self.peek() else {
                self.add_error("Unexpected EOF: Record not closed, expected '}'");
                break;
            };
            if c == '}' {
                self.flush_trailing_to_field(&mut node, last_key.as_deref());
                self.advance(1);
                break;
            }
            if c == ',' {
                self.flush_trailing_to_field(&mut node, last_key.as_deref());
                self.advance(1);
                continue;
            }

            let mut key = self.parse_ident();
            if key.is_empty() {
                if self.peek() == Some('"') {
                    key = self.read_quoted_string();
                } else {
                    self.add_error("Expected key in record");
                    self.advance(1);
                    continue;
                }
            }
            self.skip_whitespace();
            self.expect(':');

            let field_schema = current_schema
                .borrow()
                .field(&key)
                .unwrap_or_else(|| Schema::any().into_ref());
            self.push_schema(field_schema);
            let child = self.parse_node(&mut MetaHost::Node(&mut node));
            self.pop_schema();

            if !Rc::ptr_eq(&current_schema, &child.schema) {
                let refine = {
                    let cs = current_schema.borrow();
                    !child.schema.borrow().is_any()
                        && cs
                            .field(&key)
                            .map(|f| !Rc::ptr_eq(&f, &child.schema) && f.borrow().is_any())
                            .unwrap_or(false)
                };
                if refine {
                    child.schema.borrow_mut().name = key.clone();
                    current_schema.borrow_mut().replace_field(child.schema.clone());
                }
                if !current_schema.borrow().has_field(&key) {
                    child.schema.borrow_mut().name = key.clone();
                    current_schema.borrow_mut().add_field(child.schema.clone());
                }
            }

            node.fields.insert(key.clone(), child);
            last_key = Some(key);
        }

        self.depth -= 1;
        self.dbg("END named record }");
        node
    }

    /// Unquoted word in value position: `true` / `false` / `null`, or a
    /// bare string.
    fn parse_raw_string(&mut self) -> Node {
        let raw = self.parse_ident();
        match raw.as_str() {
            "true" => self.create_node(Some(Value::Bool(true))),
            "false" => self.create_node(Some(Value::Bool(false))),
            "null" => self.create_node(None),
            _ => self.create_node(Some(Value::String(raw))),
        }
    }

    /// Trailing pending metadata at a separator/closer: last element, or
    /// the list itself when empty.
    fn flush_trailing_to_element(&mut self, node: &mut Node) {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return;
        }
        match node.elements.last_mut() {
            Some(last) => last.apply_meta(&pending),
            None => node.apply_meta(&pending),
        }
    }

    /// Trailing pending metadata at a separator/closer: last field child,
    /// or the record itself when none parsed yet.
    fn flush_trailing_to_field(&mut self, node: &mut Node, last_key: Option<&str>) {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return;
        }
        match last_key.and_then(|key| node.fields.get_mut(key)) {
            Some(child) => child.apply_meta(&pending),
            None => node.apply_meta(&pending),
        }
    }
}
