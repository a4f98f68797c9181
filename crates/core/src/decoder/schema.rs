//! Schema header parsing: `@Name` references and definitions, `<...>`
//! bodies, field lists, `[...]` list shapes and type signatures.

use super::{Decoder, MetaHost};
use crate::schema::{promote_element_meta, Schema, SchemaKind, SchemaRef};

/// Canonical name for a primitive type token in schema position.
/// `int` and `float` are aliases of `number`.
fn primitive_alias(name: &str) -> Option<&'static str> {
    match name {
        "string" => Some("string"),
        "bool" => Some("bool"),
        "number" | "int" | "float" => Some("number"),
        "null" => Some("null"),
        "binary" => Some("binary"),
        _ => None,
    }
}

impl Decoder {
    /// `@Name` reference or `@Name<...>` definition. Definitions are
    /// registered; references resolve through the registry, or to a fresh
    /// placeholder record for forward references.
    pub(crate) fn parse_schema_at_ref(&mut self) -> SchemaRef {
        self.advance(1); // '@'
        let type_name = self.parse_ident();
        self.skip_whitespace();

        if self.peek() == Some('<') {
            if self.debug {
                self.dbg(&format!("defining type {type_name}"));
            }
            let schema = self.parse_schema_body(&type_name);
            {
                let mut s = schema.borrow_mut();
                if s.is_any() {
                    s.kind = SchemaKind::Record;
                }
            }
            return schema;
        }

        if self.debug {
            self.dbg(&format!("referencing type {type_name}"));
        }
        if let Some(existing) = self.registry.get(&type_name) {
            return existing.clone();
        }
        Schema::with_type(SchemaKind::Record, &type_name).into_ref()
    }

    /// A `<...>` schema block. Named bodies register themselves before
    /// their content parses, so self-references (`@Tree<children:[@Tree]>`)
    /// resolve to the descriptor under construction. First registration
    /// wins per name.
    pub(crate) fn parse_schema_body(&mut self, type_name: &str) -> SchemaRef {
        if !self.expect('<') {
            let schema = self.create_schema(SchemaKind::Any, type_name);
            self.pop_schema();
            return schema;
        }
        let schema = self.create_schema(SchemaKind::Record, type_name);
        if !type_name.is_empty() {
            self.registry
                .entry(type_name.to_string())
                .or_insert_with(|| schema.clone());
        }
        self.parse_schema_body_content(&schema, '>');
        self.pop_schema();
        schema
    }

    /// Create a schema, drain pending metadata onto it, and push it as the
    /// current context.
    fn create_schema(&mut self, kind: SchemaKind, type_name: &str) -> SchemaRef {
        let schema = Schema::with_type(kind, type_name).into_ref();
        self.flush_pending_to_schema(&schema);
        self.push_schema(schema.clone());
        schema
    }

    /// Fields (or a list shape) inside `<...>` or `[...]`.
    pub(crate) fn parse_schema_body_content(&mut self, schema: &SchemaRef, end: char) {
        let mut last_field: Option<SchemaRef> = None;

        loop {
            self.parse_meta(&mut MetaHost::Schema(schema.clone()));
            let Some(c) = self.peek() else {
                self.add_error(format!("Unexpected EOF: Schema not closed, expected '{end}'"));
                break;
            };

            if c == end {
                self.advance(1);
                break;
            }

            // `< [ ... ] >` -- the outer schema becomes a list
            if c == '[' {
                self.advance(1);
                self.dbg("LIST schema begin");
                {
                    let mut s = schema.borrow_mut();
                    s.kind = SchemaKind::List;
                    s.clear_fields();
                }
                self.flush_pending_to_schema(schema);

                let element = Schema::any().into_ref();
                self.parse_schema_body_content(&element, ']');
                schema.borrow_mut().element = Some(element);

                self.parse_meta(&mut MetaHost::Schema(schema.clone()));
                self.expect(end);
                self.flush_pending_to_schema(schema);
                promote_element_meta(schema);
                return;
            }

            if c == ',' {
                self.flush_pending_to_field_or(schema, last_field.as_ref());
                self.advance(1);
                continue;
            }

            let name = self.parse_ident();
            if name.is_empty() {
                self.add_error("Expected identifier");
                self.advance(1);
                continue;
            }
            self.skip_whitespace();

            // shorthand: a bare primitive token with no other fields turns
            // the whole schema into that primitive (`<number>`)
            if let Some(canonical) = primitive_alias(&name) {
                if self.peek() != Some(':') && schema.borrow().fields_len() == 0 {
                    let mut s = schema.borrow_mut();
                    s.kind = SchemaKind::Primitive;
                    s.type_name = canonical.to_string();
                    continue;
                }
            }

            let field = if self.peek() == Some(':') {
                self.advance(1);
                self.parse_schema_type()
            } else {
                Schema::primitive("any").into_ref()
            };
            field.borrow_mut().name = name;

            // metadata collected in front of the name
            self.flush_pending_to_schema(&field);
            // trailing metadata between the type and the separator
            self.parse_meta(&mut MetaHost::Schema(schema.clone()));
            self.flush_pending_to_schema(&field);

            schema.borrow_mut().add_field(field.clone());
            last_field = Some(field);
        }

        self.flush_pending_to_field_or(schema, last_field.as_ref());
    }

    /// A type signature after `name:` -- primitive, `[element]`, `@Name`,
    /// `@Name<...>`, or an anonymous `<...>`.
    pub(crate) fn parse_schema_type(&mut self) -> SchemaRef {
        match self.schema_context() {
            Some(context) => self.parse_meta(&mut MetaHost::Schema(context)),
            None => self.parse_meta(&mut MetaHost::Free),
        }

        match self.peek() {
            Some('[') => {
                self.advance(1);
                let list = Schema::new(SchemaKind::List).into_ref();
                self.flush_pending_to_schema(&list);
                let element = self.parse_schema_type();
                list.borrow_mut().element = Some(element);
                self.expect(']');
                list
            }
            Some('@') => {
                self.advance(1);
                let name = self.parse_ident();
                match self.schema_context() {
                    Some(context) => self.parse_meta(&mut MetaHost::Schema(context)),
                    None => self.parse_meta(&mut MetaHost::Free),
                }
                if self.peek() == Some('<') {
                    if self.debug {
                        self.dbg(&format!("inline definition for @{name}"));
                    }
                    let schema = self.parse_schema_body(&name);
                    let mut s = schema.borrow_mut();
                    if s.is_any() {
                        s.kind = SchemaKind::Record;
                    }
                    drop(s);
                    return schema;
                }
                match self.registry.get(&name) {
                    Some(existing) => existing.clone(),
                    None => Schema::with_type(SchemaKind::Record, &name).into_ref(),
                }
            }
            Some('<') => self.parse_schema_body(""),
            _ => {
                let name = self.parse_ident();
                if let Some(canonical) = primitive_alias(&name) {
                    let schema = Schema::primitive(canonical).into_ref();
                    self.flush_pending_to_schema(&schema);
                    return schema;
                }
                if let Some(existing) = self.registry.get(&name) {
                    return existing.clone();
                }
                if name.is_empty() {
                    return Schema::any().into_ref();
                }
                // forward reference
                Schema::with_type(SchemaKind::Record, &name).into_ref()
            }
        }
    }

    pub(crate) fn flush_pending_to_schema(&mut self, schema: &SchemaRef) {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return;
        }
        schema.borrow_mut().apply_meta(&pending);
    }

    fn flush_pending_to_field_or(&mut self, schema: &SchemaRef, field: Option<&SchemaRef>) {
        let target = field.unwrap_or(schema);
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return;
        }
        target.borrow_mut().apply_meta(&pending);
    }
}
