//! Blueprint rendering (`prompt_output`): a structural sketch of the
//! schema in place of data, for prompt templates. Records expand to
//! `{ key: type }` braces, lists show one example element plus a repeat
//! marker, field comments trail their type slot.

use super::{escape_ident, Encoder};
use crate::schema::{SchemaKind, SchemaRef};
use std::rc::Rc;

impl Encoder<'_> {
    pub(crate) fn prompt_value(&mut self, schema: &SchemaRef, indent: usize) -> String {
        let kind = schema.borrow().kind;
        match kind {
            SchemaKind::Record => self.prompt_record(schema, indent),
            SchemaKind::List => {
                let ind = " ".repeat(indent);
                let child_indent = indent + self.cfg.indent;
                let cind = " ".repeat(child_indent);
                let element = schema.borrow().element.clone();
                let example = match &element {
                    Some(el) if !Rc::ptr_eq(el, schema) => self.prompt_slot(el, child_indent),
                    _ => "any".to_string(),
                };
                format!(
                    "[\n{cind}{example},\n{cind}... /* repeat pattern for additional items */\n{ind}]"
                )
            }
            _ => schema.borrow().type_name.clone(),
        }
    }

    fn prompt_record(&mut self, schema: &SchemaRef, indent: usize) -> String {
        let ptr = Rc::as_ptr(schema) as usize;
        if self.prompt_active.contains(&ptr) {
            let s = schema.borrow();
            return if s.type_name != "any" {
                format!("@{}", escape_ident(&s.type_name))
            } else {
                "any".to_string()
            };
        }
        self.prompt_active.push(ptr);

        let child_indent = indent + self.cfg.indent;
        let cind = " ".repeat(child_indent);
        let fields: Vec<SchemaRef> = schema.borrow().fields().to_vec();
        let mut lines = Vec::new();
        for field in &fields {
            let (name, comments) = {
                let f = field.borrow();
                (f.name.clone(), f.meta.comments.clone())
            };
            let slot = self.prompt_slot(field, child_indent);
            let mut line = format!("{cind}{}: {slot}", escape_ident(&name));
            if self.cfg.include_comments {
                for comment in &comments {
                    line.push_str(&format!(" /* {} */", comment.trim()));
                }
            }
            lines.push(line);
        }

        self.prompt_active.pop();
        format!("{{\n{}\n{}}}", lines.join(",\n"), " ".repeat(indent))
    }

    /// The type slot for one field: primitive name, nested blueprint, or
    /// `[element]` for lists.
    fn prompt_slot(&mut self, schema: &SchemaRef, indent: usize) -> String {
        let kind = schema.borrow().kind;
        match kind {
            SchemaKind::Record => self.prompt_record(schema, indent),
            SchemaKind::List => {
                let element = schema.borrow().element.clone();
                match &element {
                    Some(el) if !Rc::ptr_eq(el, schema) => {
                        format!("[{}]", self.prompt_slot(el, indent))
                    }
                    _ => "[any]".to_string(),
                }
            }
            _ => schema.borrow().type_name.clone(),
        }
    }
}
