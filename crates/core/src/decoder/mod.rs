//! Cursor-driven streaming decoder: AKD text -> schema-linked node tree.
//!
//! Single pass, no separate token stream -- the grammar is context
//! sensitive (`/` opens either a comment or a metadata block, `<` opens a
//! schema header or a type tag depending on position), so the decoder reads
//! the char buffer directly and keeps two context stacks: the schema
//! context that types the value being parsed, and the enclosing node that
//! receives metadata blocks. Structural problems are recorded and parsing
//! continues; the result always carries a root node.

mod meta;
mod schema;
mod value;

use crate::color;
use crate::config::DecodeOptions;
use crate::error::{Diagnostic, Severity};
use crate::meta::Meta;
use crate::node::Node;
use crate::schema::{promote_element_meta, Schema, SchemaKind, SchemaRef};
use serde_json::Value;
use std::collections::HashMap;

/// Diagnostics are capped so pathological inputs cannot grow the result
/// without bound; additions beyond the cap are silently dropped.
pub const MAX_ERRORS: usize = 50;
pub const MAX_WARNINGS: usize = 50;

/// What one decode pass produces. `errors.is_empty()` is the success
/// signal; the node is present (possibly partial) either way.
#[derive(Debug)]
pub struct DecodeResult {
    pub node: Node,
    pub schema: SchemaRef,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl DecodeResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The object that metadata blocks apply to while scanning: the enclosing
/// node or schema container, or nothing (top level).
pub(crate) enum MetaHost<'a> {
    Free,
    Node(&'a mut Node),
    Schema(SchemaRef),
}

pub struct Decoder {
    text: Vec<char>,
    i: usize,
    line: u32,
    col: u32,
    pub(crate) debug: bool,
    pub(crate) depth: usize,
    pub(crate) pending: Meta,
    pub(crate) schema_stack: Vec<SchemaRef>,
    pub(crate) registry: HashMap<String, SchemaRef>,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl Decoder {
    pub fn new(text: &str, options: &DecodeOptions) -> Decoder {
        let cleaned;
        let input = if options.remove_ansi_colors {
            cleaned = color::strip_ansi(text);
            cleaned.as_str()
        } else {
            text
        };
        let full = format!("{}{}", options.schema_prefix, input);
        Decoder {
            text: full.chars().collect(),
            i: 0,
            line: 1,
            col: 1,
            debug: options.debug,
            depth: 0,
            pending: Meta::new(),
            schema_stack: Vec::new(),
            registry: HashMap::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Consume the buffer and produce the result. A document is an optional
    /// run of schema definitions (`@Name<...>`, bare `<...>`) or references
    /// (`@Name`), followed by exactly one data value.
    pub fn decode(mut self) -> DecodeResult {
        self.dbg("decode() start");
        self.parse_meta(&mut MetaHost::Free);

        let mut root_context: Option<SchemaRef> = None;
        while !self.eof() {
            match self.peek() {
                Some('<') => {
                    root_context = Some(self.parse_schema_body(""));
                    self.parse_meta(&mut MetaHost::Free);
                    if matches!(self.peek(), Some('(' | '{' | '[')) {
                        break;
                    }
                }
                Some('@') => {
                    let schema = self.parse_schema_at_ref();
                    self.parse_meta(&mut MetaHost::Free);
                    match self.peek() {
                        // another definition follows; this one was standalone
                        Some('@') | Some('<') => continue,
                        // the reference heads the root value
                        _ => {
                            root_context = Some(schema);
                            break;
                        }
                    }
                }
                _ => break,
            }
        }

        if let Some(context) = &root_context {
            self.push_schema(context.clone());
        }
        let mut root = if self.eof() {
            self.create_node(None)
        } else {
            self.parse_node(&mut MetaHost::Free)
        };
        if let Some(context) = &root_context {
            self.pop_schema();
            if root.schema.borrow().is_any() {
                root.schema = context.clone();
            }
        }

        // trailing comments and modifiers attach to the root
        self.parse_meta(&mut MetaHost::Free);
        let trailing = std::mem::take(&mut self.pending);
        root.apply_meta(&trailing);

        self.dbg("decode() end");
        let schema = root_context.unwrap_or_else(|| root.schema.clone());
        DecodeResult {
            node: root,
            schema,
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    // -- Node creation ------------------------------------------

    /// Create a node under the current schema context, draining pending
    /// metadata onto it. A scalar payload is checked against the context:
    /// `any` contexts adopt the inferred primitive schema, matching type
    /// names share the context descriptor, and a mismatch links the node to
    /// the inferred schema instead (which the encoder later surfaces as an
    /// inline type tag).
    pub(crate) fn create_node(&mut self, value: Option<Value>) -> Node {
        let current = match self.schema_stack.last() {
            Some(context) => context.clone(),
            None => {
                let context = Schema::any().into_ref();
                self.push_schema(context.clone());
                context
            }
        };

        let final_schema = match &value {
            Some(scalar) => {
                let inferred = infer_primitive(scalar);
                let (kind, type_name) = {
                    let c = current.borrow();
                    (c.kind, c.type_name.clone())
                };
                if kind == SchemaKind::Any {
                    Schema::primitive(inferred).into_ref()
                } else if type_name == inferred
                    || (type_name == "number" && (inferred == "int" || inferred == "float"))
                {
                    current.clone()
                } else {
                    Schema::primitive(inferred).into_ref()
                }
            }
            None => {
                // no scalar: either a structure is about to be parsed under
                // this context, or this is a null literal
                let structural = {
                    let c = current.borrow();
                    c.is_record() || c.is_list()
                };
                if structural {
                    current.clone()
                } else {
                    Schema::primitive("null").into_ref()
                }
            }
        };

        let mut node = match value {
            Some(scalar) => Node::primitive(final_schema, scalar),
            None => Node::new(final_schema),
        };
        let pending = std::mem::take(&mut self.pending);
        node.apply_meta(&pending);
        if self.debug {
            self.dbg(&format!("create node {node:?}"));
        }
        node
    }

    // -- Schema context stack -----------------------------------

    pub(crate) fn push_schema(&mut self, schema: SchemaRef) {
        self.schema_stack.push(schema);
    }

    /// Pop the current schema context. Popping a list schema promotes any
    /// metadata left on its element onto the list itself.
    pub(crate) fn pop_schema(&mut self) -> Option<SchemaRef> {
        let schema = self.schema_stack.pop();
        if let Some(popped) = &schema {
            promote_element_meta(popped);
        }
        schema
    }

    pub(crate) fn schema_context(&self) -> Option<SchemaRef> {
        self.schema_stack.last().cloned()
    }

    // -- Low-level readers --------------------------------------

    /// `[A-Za-z_][A-Za-z0-9_]*`, or a backtick-escaped identifier whose
    /// content is taken verbatim up to the closing backtick.
    pub(crate) fn parse_ident(&mut self) -> String {
        self.skip_whitespace();
        if self.peek() == Some('`') {
            self.advance(1);
            let mut name = String::new();
            while let Some(c) = self.peek() {
                if c == '`' {
                    break;
                }
                name.push(c);
                self.advance(1);
            }
            self.expect('`');
            return name;
        }
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return String::new(),
        }
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.advance(1);
            } else {
                break;
            }
        }
        name
    }

    /// Content between double quotes with `\n \t \r \" \\` escapes; any
    /// other escaped char is taken literally. An unterminated string closes
    /// at end of input (recorded as an error by the trailing expect).
    pub(crate) fn read_quoted_string(&mut self) -> String {
        self.expect('"');
        let mut result = String::new();
        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }
            if c == '\\' {
                self.advance(1);
                match self.peek() {
                    Some(escaped) => {
                        result.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            other => other,
                        });
                        self.advance(1);
                    }
                    None => {
                        self.add_error("Unexpected EOF inside string escape");
                        break;
                    }
                }
                continue;
            }
            result.push(c);
            self.advance(1);
        }
        self.expect('"');
        result
    }

    /// Optional sign, digits, optional fraction, optional exponent.
    /// Integral literals parse to `i64` (falling back to `f64` on
    /// overflow), everything else to `f64`.
    pub(crate) fn read_number(&mut self) -> Value {
        let start = self.i;
        if self.peek() == Some('-') {
            self.advance(1);
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance(1);
        }
        let mut is_float = false;
        if self.peek() == Some('.') {
            is_float = true;
            self.advance(1);
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance(1);
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            self.advance(1);
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance(1);
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance(1);
            }
        }
        let raw: String = self.text[start..self.i].iter().collect();

        if !is_float {
            if let Ok(n) = raw.parse::<i64>() {
                return Value::from(n);
            }
        }
        match raw.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            Some(n) => Value::Number(n),
            None => {
                self.add_error(format!("Invalid number format: {raw}"));
                Value::from(0)
            }
        }
    }

    /// A raw scalar for attribute values: no node is created.
    pub(crate) fn parse_primitive_value(&mut self) -> Value {
        match self.peek() {
            None => Value::Null,
            Some('"') => Value::String(self.read_quoted_string()),
            Some(c) if c.is_ascii_digit() || c == '-' => self.read_number(),
            _ => match self.parse_ident().as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                "null" => Value::Null,
                raw => Value::String(raw.to_string()),
            },
        }
    }

    // -- Cursor -------------------------------------------------

    pub(crate) fn eof(&self) -> bool {
        self.i >= self.text.len()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.text.get(self.i).copied()
    }

    pub(crate) fn peek_next(&self) -> Option<char> {
        self.text.get(self.i + 1).copied()
    }

    /// The only place the cursor moves; keeps line/column in sync.
    pub(crate) fn advance(&mut self, n: usize) {
        for _ in 0..n {
            let Some(&c) = self.text.get(self.i) else { break };
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
            self.i += 1;
        }
    }

    /// Pure whitespace skip. Comments stay in the stream for the metadata
    /// scanner to pick up.
    pub(crate) fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance(1);
        }
    }

    /// Consume the expected char, or record an error and continue as if it
    /// had been there.
    pub(crate) fn expect(&mut self, expected: char) -> bool {
        match self.peek() {
            Some(c) if c == expected => {
                self.advance(1);
                true
            }
            Some(c) => {
                self.add_error(format!("Expected '{expected}', got '{c}'"));
                false
            }
            None => {
                self.add_error(format!("Expected '{expected}', got end of input"));
                false
            }
        }
    }

    // -- Diagnostics --------------------------------------------

    fn diagnostic(&self, severity: Severity, message: String) -> Diagnostic {
        let start = self.i.saturating_sub(10);
        let end = (self.i + 10).min(self.text.len());
        let context: String = self.text[start..end]
            .iter()
            .collect::<String>()
            .replace('\n', "\\n")
            .replace('\r', "");
        Diagnostic {
            severity,
            message,
            position: self.i,
            line: self.line,
            column: self.col,
            schema: self.schema_stack.last().map(|s| s.borrow().type_name.clone()),
            context,
        }
    }

    pub(crate) fn add_error(&mut self, message: impl Into<String>) {
        if self.errors.len() >= MAX_ERRORS {
            return;
        }
        let message = message.into();
        if self.debug {
            self.dbg(&format!("ERROR: {message}"));
        }
        self.errors.push(self.diagnostic(Severity::Error, message));
    }

    pub(crate) fn add_warning(&mut self, message: impl Into<String>) {
        if self.warnings.len() >= MAX_WARNINGS {
            return;
        }
        let message = message.into();
        if self.debug {
            self.dbg(&format!("WARNING: {message}"));
        }
        self.warnings.push(self.diagnostic(Severity::Warning, message));
    }

    // -- Debug trace --------------------------------------------

    pub(crate) fn dbg(&self, message: &str) {
        if !self.debug {
            return;
        }
        let start = self.i.saturating_sub(10);
        let end = (self.i + 11).min(self.text.len());
        let window: String = self.text[start..end]
            .iter()
            .collect::<String>()
            .replace('\n', "⏎")
            .replace('\t', "→");
        eprintln!(
            "|{:>4}:{:<4}| {:<24}| {}{}",
            self.line,
            self.col,
            window,
            "│ ".repeat(self.depth),
            message
        );
    }
}

/// Inferred primitive type name for a scalar. Integers and floats both
/// infer `number`.
fn infer_primitive(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        _ => "null",
    }
}
