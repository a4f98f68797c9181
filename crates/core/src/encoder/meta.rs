//! Metadata rendering: inline form for primitives and fields, `//...//`
//! wrapped form for containers and schema headers.

use super::Encoder;
use crate::color;
use crate::meta::Meta;
use serde_json::Value;

impl Encoder<'_> {
    /// `/* c */ $required $key=value #tag`, space-joined. Boolean `true`
    /// attributes render bare (`$key`); a required schema renders the
    /// `$required` attribute form.
    fn build_meta_string(&self, meta: &Meta) -> String {
        let pad = if self.cfg.compact { "" } else { " " };
        let mut items = Vec::new();

        if self.cfg.include_comments {
            for comment in &meta.comments {
                items.push(self.paint(&format!("/*{pad}{}{pad}*/", comment.trim()), color::NULL));
            }
        }
        if self.cfg.include_meta {
            if meta.required {
                items.push(self.paint("$required", color::ATTR));
            }
            for (key, value) in &meta.attrs {
                if value == &Value::Bool(true) {
                    items.push(self.paint(&format!("${key}"), color::ATTR));
                } else {
                    items.push(format!(
                        "{}{}",
                        self.paint(&format!("${key}="), color::ATTR),
                        self.render_scalar(value)
                    ));
                }
            }
            for tag in &meta.tags {
                items.push(self.paint(&format!("#{tag}"), color::TAG));
            }
        }
        items.join(" ")
    }

    /// For primitives and fields: no delimiters.
    pub(crate) fn meta_inline(&self, meta: &Meta) -> String {
        self.build_meta_string(meta)
    }

    /// For containers and schema headers: `//...//` with surrounding
    /// spacing, empty when there is nothing to show.
    pub(crate) fn meta_wrapped(&self, meta: &Meta) -> String {
        let content = self.build_meta_string(meta);
        if content.is_empty() {
            return content;
        }
        let pad = if self.cfg.compact { "" } else { " " };
        let wrapped = format!(
            "{}{content}{}",
            self.paint(&format!("//{pad}"), color::SCHEMA),
            self.paint(&format!("{pad}//"), color::SCHEMA)
        );
        if self.cfg.compact {
            format!("{wrapped} ")
        } else {
            format!(" {wrapped} ")
        }
    }
}
