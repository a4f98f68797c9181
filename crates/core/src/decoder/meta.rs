//! Metadata scanning: comments, `/.../` and `//...//` blocks, inline
//! `$attr` / `#tag` / `!flag` modifiers.
//!
//! Attachment order is the subtlest part of the decoder and is fixed here:
//! a delimited block applies directly to the enclosing container (the
//! [`MetaHost`]); comments and inline modifiers accumulate in the pending
//! meta and flow to the next created object; whatever is still pending at a
//! separator or closing delimiter flushes to the last child, or to the
//! container when no child precedes it.

use super::{Decoder, MetaHost};
use crate::meta::Meta;
use serde_json::Value;

impl Decoder {
    /// Consume whitespace, comments and metadata in front of (or behind) a
    /// node or schema.
    pub(crate) fn parse_meta(&mut self, host: &mut MetaHost<'_>) {
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else { break };
            let next = self.peek_next();

            if c == '/' && next == Some('*') {
                let comment = self.parse_comment_block();
                self.pending.comments.push(comment);
                continue;
            }
            if c == '/' {
                let block = self.parse_meta_block();
                match host {
                    MetaHost::Free => {
                        self.add_warning(format!(
                            "There is no parent to add the meta block '{block}'"
                        ));
                        self.pending.apply(&block);
                    }
                    MetaHost::Node(node) => node.apply_meta(&block),
                    MetaHost::Schema(schema) => schema.borrow_mut().apply_meta(&block),
                }
                continue;
            }
            if matches!(c, '$' | '#' | '!') {
                self.parse_modifier_inline();
                continue;
            }
            break;
        }
    }

    /// `/* ... */`, nested, with `\` copying the next char literally.
    pub(crate) fn parse_comment_block(&mut self) -> String {
        self.dbg("START comment block");
        self.advance(2);
        let mut nesting = 1u32;
        let mut content = String::new();

        while nesting > 0 {
            let Some(c) = self.peek() else {
                self.add_error("Unterminated comment (expected '*/')");
                break;
            };
            if c == '\\' {
                self.advance(1);
                if let Some(escaped) = self.peek() {
                    content.push(escaped);
                    self.advance(1);
                }
                continue;
            }
            if c == '/' && self.peek_next() == Some('*') {
                nesting += 1;
                self.advance(2);
                content.push_str("/*");
                continue;
            }
            if c == '*' && self.peek_next() == Some('/') {
                nesting -= 1;
                self.advance(2);
                if nesting > 0 {
                    content.push_str("*/");
                }
                continue;
            }
            content.push(c);
            self.advance(1);
        }
        self.dbg("END comment block");
        content.trim().to_string()
    }

    /// A `/ ... /` or `// ... //` block. Contents: `$name[=value]`, `#name`,
    /// `!name`, nested comments, and legacy `name=value` attributes written
    /// without the `$` prefix (accepted with a warning).
    fn parse_meta_block(&mut self) -> Meta {
        self.expect('/');
        let double = self.peek() == Some('/');
        if double {
            self.advance(1);
        }
        self.dbg("START meta block");
        let mut block = Meta::new();

        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else {
                self.add_error("Unexpected EOF: Meta block not closed");
                break;
            };
            if c == '/' && self.peek_next() == Some('*') {
                let comment = self.parse_comment_block();
                block.comments.push(comment);
                continue;
            }
            if c == '/' {
                self.advance(1);
                if double && self.peek() == Some('/') {
                    self.advance(1);
                }
                break;
            }
            match c {
                '$' => self.parse_meta_attribute(&mut block),
                '#' => self.parse_meta_tag(&mut block),
                '!' => self.parse_meta_flag(&mut block),
                c if c.is_ascii_alphanumeric() || c == '_' || c == '`' => {
                    let key = self.parse_ident();
                    if key.is_empty() {
                        self.add_error(format!("Unexpected token in meta block: {c}"));
                        self.advance(1);
                        continue;
                    }
                    let mut value = Value::Bool(true);
                    self.skip_whitespace();
                    if self.peek() == Some('=') {
                        self.advance(1);
                        value = self.parse_primitive_value();
                    }
                    self.add_warning(format!("Implicit attribute '{key}'. Use '${key}' instead."));
                    block.attrs.insert(key, value);
                }
                other => {
                    self.add_error(format!("Unexpected token in meta block: {other}"));
                    self.advance(1);
                }
            }
        }
        self.dbg("END meta block");
        block
    }

    /// A stray `$`, `#` or `!` outside a block contributes to the pending
    /// meta.
    fn parse_modifier_inline(&mut self) {
        let mut pending = std::mem::take(&mut self.pending);
        match self.peek() {
            Some('$') => self.parse_meta_attribute(&mut pending),
            Some('#') => self.parse_meta_tag(&mut pending),
            Some('!') => self.parse_meta_flag(&mut pending),
            _ => self.advance(1),
        }
        self.pending = pending;
    }

    /// `$key[=value]`; a missing value means `true`.
    fn parse_meta_attribute(&mut self, meta: &mut Meta) {
        self.advance(1);
        let key = self.parse_ident();
        let mut value = Value::Bool(true);
        self.skip_whitespace();
        if self.peek() == Some('=') {
            self.advance(1);
            value = self.parse_primitive_value();
        }
        if self.debug {
            self.dbg(&format!("meta attr ${key}={value}"));
        }
        meta.attrs.insert(key, value);
    }

    /// `#tag`
    fn parse_meta_tag(&mut self, meta: &mut Meta) {
        self.advance(1);
        let tag = self.parse_ident();
        if self.debug {
            self.dbg(&format!("meta tag #{tag}"));
        }
        meta.tags.push(tag);
    }

    /// `!flag`. `required` is the only recognized flag.
    fn parse_meta_flag(&mut self, meta: &mut Meta) {
        self.advance(1);
        let flag = self.parse_ident();
        if flag == "required" {
            meta.required = true;
        } else {
            self.add_warning(format!("Unknown flag: !{flag}"));
        }
    }
}
