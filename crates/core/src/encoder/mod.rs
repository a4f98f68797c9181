//! Canonical renderer: node tree -> AKD text.
//!
//! `encode` renders `[schema header][data body]`. Schema headers come from
//! the node's linked schema; data bodies recurse through the tree with the
//! parent's field/element schema as the expectation, and a child whose
//! schema is incompatible with that expectation gets an inline `<type>`
//! tag. The encoder is total: any constructed node renders.

mod meta;
mod prompt;

use crate::color;
use crate::config::EncodeConfig;
use crate::node::Node;
use crate::schema::{promote_element_meta, SchemaKind, SchemaRef};
use serde_json::Value;
use std::rc::Rc;

pub struct Encoder<'a> {
    cfg: &'a EncodeConfig,
    /// Named record descriptors currently being rendered; a re-entry
    /// renders as a bare `@Name` reference instead of recursing.
    active: Vec<usize>,
    /// Same guard for blueprint rendering.
    pub(crate) prompt_active: Vec<usize>,
}

impl<'a> Encoder<'a> {
    pub fn new(cfg: &'a EncodeConfig) -> Encoder<'a> {
        Encoder {
            cfg,
            active: Vec::new(),
            prompt_active: Vec::new(),
        }
    }

    pub fn encode(&mut self, node: &Node) -> String {
        self.encode_node(node, 0, true)
    }

    /// Render the schema of `node` alone, without the data body.
    pub fn encode_schema(&mut self, schema: &SchemaRef) -> String {
        self.encode_schema_at(schema, 0, true)
    }

    pub(crate) fn encode_node(&mut self, node: &Node, indent: usize, include_schema: bool) -> String {
        let base = self.cfg.start_indent + indent;

        let mut schema_prefix = String::new();
        if include_schema && self.cfg.include_schema {
            let rendered = self.encode_schema_at(&node.schema, base, true).trim().to_string();
            if !rendered.is_empty() {
                let rendered = if rendered.starts_with('<') || rendered.starts_with('@') {
                    rendered
                } else {
                    format!("<{rendered}>")
                };
                schema_prefix = if self.cfg.compact {
                    rendered
                } else {
                    format!("{rendered}\n{}", " ".repeat(base))
                };
            }
        }

        let data = if self.cfg.prompt_output {
            self.prompt_value(&node.schema, base)
        } else if node.is_list() {
            self.render_list(node, base)
        } else if node.is_primitive() {
            self.render_primitive_node(node)
        } else if node.is_record() {
            self.render_record(node, base)
        } else {
            self.paint("null", color::NULL)
        };

        format!("{schema_prefix}{data}")
    }

    // -- Schema rendering ---------------------------------------

    fn encode_schema_at(&mut self, schema: &SchemaRef, indent: usize, include_meta: bool) -> String {
        let ind = " ".repeat(indent);
        let pad = if self.cfg.compact { "" } else { " " };
        let (type_name, is_primitive, is_list, is_record, is_any) = {
            let s = schema.borrow();
            (s.type_name.clone(), s.is_primitive(), s.is_list(), s.is_record(), s.is_any())
        };

        // nominal records carry an @Name prefix
        let prefix = if is_record && !is_any {
            self.paint(&format!("@{}", escape_ident(&type_name)), color::SCHEMA)
        } else {
            String::new()
        };

        if is_primitive {
            let meta_prefix = if include_meta {
                self.meta_inline(&schema.borrow().meta)
            } else {
                String::new()
            };
            let head = if meta_prefix.is_empty() {
                String::new()
            } else {
                format!("{meta_prefix} ")
            };
            return format!("{ind}{head}{}", self.paint(&type_name, color::TYPE));
        }

        if is_list {
            let ptr = Rc::as_ptr(schema) as usize;
            if self.active.contains(&ptr) {
                return format!("{ind}[any]");
            }
            // metadata the parser left on the element belongs to the list
            promote_element_meta(schema);
            let list_meta = if include_meta {
                self.meta_wrapped(&schema.borrow().meta)
            } else {
                String::new()
            };
            let element = schema.borrow().element.clone();

            if let Some(el) = &element {
                if !Rc::ptr_eq(el, schema) && el.borrow().is_record() {
                    // list of records: fields inlined inside the brackets
                    let inner = self.encode_schema_fields(el);
                    return format!("{ind}{prefix}<{pad}[{list_meta}{inner}{pad}]{pad}>");
                }
            }
            let inner = match &element {
                Some(el) if !Rc::ptr_eq(el, schema) && !el.borrow().is_any() => {
                    self.active.push(ptr);
                    let inner = self.encode_schema_at(el, 0, false).trim().to_string();
                    self.active.pop();
                    inner
                }
                _ => "any".to_string(),
            };
            return format!("{ind}[{list_meta}{}]", self.paint(&inner, color::TYPE));
        }

        if is_record {
            let ptr = Rc::as_ptr(schema) as usize;
            if !prefix.is_empty() && self.active.contains(&ptr) {
                return format!("{ind}{prefix}");
            }
            let record_meta = if include_meta {
                self.meta_wrapped(&schema.borrow().meta)
            } else {
                String::new()
            };
            if schema.borrow().fields_len() == 0 {
                if prefix.is_empty() && record_meta.is_empty() && is_any {
                    return String::new();
                }
                return format!("{ind}{prefix}<{pad}{record_meta}any{pad}>");
            }
            self.active.push(ptr);
            let inner = self.encode_schema_fields(schema);
            self.active.pop();
            return format!("{ind}{prefix}<{pad}{record_meta}{inner}{pad}>");
        }

        // kind Any
        let meta = if include_meta {
            self.meta_wrapped(&schema.borrow().meta)
        } else {
            String::new()
        };
        format!("{ind}{meta}any")
    }

    /// `meta name:type` per field, comma-joined.
    fn encode_schema_fields(&mut self, schema: &SchemaRef) -> String {
        let pad = if self.cfg.compact { "" } else { " " };
        let fields: Vec<SchemaRef> = schema.borrow().fields().to_vec();
        let mut parts = Vec::new();

        for field in &fields {
            let (name, is_primitive, type_name) = {
                let f = field.borrow();
                (f.name.clone(), f.is_primitive(), f.type_name.clone())
            };
            let mut part = String::new();
            let meta_prefix = self.meta_inline(&field.borrow().meta);
            if !meta_prefix.is_empty() {
                part.push_str(&meta_prefix);
                part.push(' ');
            }
            part.push_str(&self.paint(&escape_ident(&name), color::KEY));

            // structures always show their shape; primitives only when the
            // type is explicit and includeType is on
            let field_type = self.encode_schema_at(field, 0, false).trim().to_string();
            let is_structure = !is_primitive;
            let is_explicit_primitive = self.cfg.include_type && type_name != "any";
            if !field_type.is_empty() && (is_structure || is_explicit_primitive) {
                part.push(':');
                part.push_str(&self.paint(&field_type, color::TYPE));
            }
            parts.push(part);
        }
        parts.join(&format!(",{pad}"))
    }

    // -- Compatibility and type tags ----------------------------

    /// Whether a child's actual schema satisfies the parent's expectation.
    /// `any` expectations always match; kinds must agree; primitive type
    /// names must match exactly.
    fn schemas_compatible(actual: &SchemaRef, expected: Option<&SchemaRef>) -> bool {
        let Some(expected) = expected else { return true };
        if Rc::ptr_eq(actual, expected) {
            return true;
        }
        if expected.borrow().is_any() {
            return true;
        }
        let a = actual.borrow();
        let e = expected.borrow();
        if a.kind != e.kind {
            return false;
        }
        if a.is_primitive() && e.is_primitive() {
            return a.type_name == e.type_name;
        }
        true
    }

    /// Short label for inline `<type>` tags: primitive name, `[element]`,
    /// `@`-less nominal record name, or `any`.
    fn type_label(schema: &SchemaRef) -> String {
        Self::type_label_guarded(schema, &mut Vec::new())
    }

    fn type_label_guarded(schema: &SchemaRef, seen: &mut Vec<usize>) -> String {
        let ptr = Rc::as_ptr(schema) as usize;
        if seen.contains(&ptr) {
            return "any".to_string();
        }
        let s = schema.borrow();
        match s.kind {
            SchemaKind::Primitive => s.type_name.clone(),
            SchemaKind::List => match &s.element {
                Some(el) if !Rc::ptr_eq(el, schema) => {
                    seen.push(ptr);
                    let label = format!("[{}]", Self::type_label_guarded(el, seen));
                    seen.pop();
                    label
                }
                _ => "[any]".to_string(),
            },
            SchemaKind::Record if s.type_name != "any" => s.type_name.clone(),
            _ => "any".to_string(),
        }
    }

    fn apply_type_tag(&self, rendered: &str, actual: &SchemaRef, expected: Option<&SchemaRef>) -> String {
        if Self::schemas_compatible(actual, expected) {
            return rendered.to_string();
        }
        let tag = self.paint(&format!("<{}>", Self::type_label(actual)), color::SCHEMA);
        format!("{tag} {rendered}")
    }

    // -- Data rendering -----------------------------------------

    fn render_primitive_node(&self, node: &Node) -> String {
        let meta = self.meta_inline(&node.meta);
        let value = self.render_scalar(node.value.as_ref().unwrap_or(&Value::Null));
        if meta.is_empty() {
            value
        } else {
            format!("{meta} {value}")
        }
    }

    pub(crate) fn render_scalar(&self, value: &Value) -> String {
        match value {
            Value::String(s) => self.render_string(s),
            Value::Bool(true) => self.paint("true", color::BOOL),
            Value::Bool(false) => self.paint("false", color::BOOL),
            Value::Null => self.paint("null", color::NULL),
            other => self.paint(&other.to_string(), color::NUMBER),
        }
    }

    fn render_string(&self, value: &str) -> String {
        let mut content = value.replace('\\', "\\\\").replace('"', "\\\"");
        if self.cfg.escape_new_lines {
            content = content
                .replace("\r\n", "\\n")
                .replace('\r', "\\r")
                .replace('\n', "\\n")
                .replace('\t', "\\t");
        }
        self.paint(&format!("\"{content}\""), color::STRING)
    }

    fn render_list(&mut self, node: &Node, indent: usize) -> String {
        let ind = " ".repeat(indent);
        let child_indent = indent + self.cfg.indent;

        let list_meta = if self.cfg.include_array_size {
            let mut instance = node.meta.clone();
            instance.set_attr("size", Value::from(node.elements.len() as u64));
            self.meta_wrapped(&instance)
        } else {
            self.meta_wrapped(&node.meta)
        };

        let expected = node.schema.borrow().element.clone();
        let mut items = Vec::new();
        for element in &node.elements {
            let child_indent_arg = if self.cfg.compact {
                0
            } else {
                child_indent.saturating_sub(self.cfg.start_indent)
            };
            // child schema headers are suppressed inside lists
            let rendered = self.encode_node(element, child_indent_arg, false).trim().to_string();
            items.push(self.apply_type_tag(&rendered, &element.schema, expected.as_ref()));
        }

        if self.cfg.compact {
            return format!("{ind}[{list_meta}{}]", items.join(","));
        }

        let mut out = format!("{ind}[");
        if !list_meta.is_empty() {
            out.push('\n');
            out.push_str(&" ".repeat(child_indent));
            out.push_str(list_meta.trim());
        }
        if !items.is_empty() {
            out.push('\n');
            let lines: Vec<String> = items
                .iter()
                .map(|item| format!("{}{item}", " ".repeat(child_indent)))
                .collect();
            out.push_str(&lines.join(",\n"));
        }
        out.push('\n');
        out.push_str(&ind);
        out.push(']');
        out
    }

    /// Data records always emit the positional form, in schema field
    /// order; missing fields render as `null`, and an empty record as
    /// `(null)`.
    fn render_record(&mut self, node: &Node, indent: usize) -> String {
        let inner_meta = self.meta_wrapped(&node.meta);
        let fields: Vec<SchemaRef> = node.schema.borrow().fields().to_vec();

        let mut parts = Vec::new();
        if fields.is_empty() {
            parts.push(self.paint("null", color::NULL));
        } else {
            for field_def in &fields {
                let name = field_def.borrow().name.clone();
                match node.fields.get(&name) {
                    Some(child) => {
                        let rendered = self
                            .encode_node(child, indent.saturating_sub(self.cfg.start_indent), false)
                            .trim()
                            .to_string();
                        parts.push(self.apply_type_tag(&rendered, &child.schema, Some(field_def)));
                    }
                    None => parts.push(self.paint("null", color::NULL)),
                }
            }
        }

        let sep = if self.cfg.compact { "," } else { ", " };
        format!("({inner_meta}{})", parts.join(sep))
    }

    pub(crate) fn paint(&self, text: &str, c: &str) -> String {
        if !self.cfg.colorize {
            return text.to_string();
        }
        format!("{c}{text}{}", color::RESET)
    }
}

/// Backtick-escape any name that is not a plain identifier.
pub(crate) fn escape_ident(name: &str) -> String {
    let mut chars = name.chars();
    let plain = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if plain {
        name.to_string()
    } else {
        format!("`{name}`")
    }
}
