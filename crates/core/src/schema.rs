//! Schema descriptors: the structural type attached to every node.
//!
//! Descriptors are shared -- the decoder's named-type registry hands the
//! same `SchemaRef` to every `@Name` site, list nodes share their element
//! descriptor with their children, and the decoder promotes kinds in place
//! on descriptors that are already linked from several places. `Rc<RefCell>`
//! handles carry that aliasing; the codec is single-threaded by contract.

use crate::meta::Meta;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// `number`, `string`, `bool`, `null`, `binary` (or the default `any`).
    Primitive,
    /// Named (`@User`) or anonymous (`<a:number>`) field container.
    Record,
    /// Ordered sequence with a single element descriptor.
    List,
    /// Unconstrained; widened on first contact with data.
    Any,
}

impl SchemaKind {
    pub fn label(self) -> &'static str {
        match self {
            SchemaKind::Primitive => "PRIMITIVE",
            SchemaKind::Record => "RECORD",
            SchemaKind::List => "LIST",
            SchemaKind::Any => "ANY",
        }
    }
}

/// Shared handle to a schema descriptor.
pub type SchemaRef = Rc<RefCell<Schema>>;

pub struct Schema {
    pub kind: SchemaKind,
    /// Primitive type name (`number`, `string`, ...) or nominal record name
    /// (`User`). Defaults to `"any"`.
    pub type_name: String,
    /// Field name when this schema sits inside a record; empty otherwise.
    pub name: String,
    /// Element descriptor for list kinds.
    pub element: Option<SchemaRef>,
    fields_list: Vec<SchemaRef>,
    fields_map: HashMap<String, SchemaRef>,
    pub meta: Meta,
}

impl Schema {
    pub fn new(kind: SchemaKind) -> Schema {
        Schema::with_type(kind, "")
    }

    pub fn with_type(kind: SchemaKind, type_name: &str) -> Schema {
        Schema {
            kind,
            type_name: if type_name.is_empty() { "any".to_string() } else { type_name.to_string() },
            name: String::new(),
            element: None,
            fields_list: Vec::new(),
            fields_map: HashMap::new(),
            meta: Meta::new(),
        }
    }

    pub fn primitive(type_name: &str) -> Schema {
        Schema::with_type(SchemaKind::Primitive, type_name)
    }

    pub fn any() -> Schema {
        Schema::new(SchemaKind::Any)
    }

    pub fn list(element: SchemaRef) -> Schema {
        let mut schema = Schema::with_type(SchemaKind::List, "list");
        schema.element = Some(element);
        schema
    }

    pub fn into_ref(self) -> SchemaRef {
        Rc::new(RefCell::new(self))
    }

    pub fn is_primitive(&self) -> bool {
        self.kind == SchemaKind::Primitive
    }

    pub fn is_record(&self) -> bool {
        self.kind == SchemaKind::Record
    }

    pub fn is_list(&self) -> bool {
        self.kind == SchemaKind::List
    }

    /// `any` either by kind or by a primitive/record that never got a
    /// concrete type name.
    pub fn is_any(&self) -> bool {
        self.kind == SchemaKind::Any
            || (self.type_name == "any"
                && (self.kind == SchemaKind::Primitive || self.kind == SchemaKind::Record))
    }

    // -- Fields -------------------------------------------------

    pub fn fields(&self) -> &[SchemaRef] {
        &self.fields_list
    }

    pub fn fields_len(&self) -> usize {
        self.fields_list.len()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields_map.contains_key(name)
    }

    pub fn clear_fields(&mut self) {
        self.fields_list.clear();
        self.fields_map.clear();
    }

    /// Append a field. Promotes the kind to `Record` if needed; unnamed
    /// fields are auto-named by their ordinal.
    pub fn add_field(&mut self, field: SchemaRef) {
        if self.kind != SchemaKind::Record {
            self.kind = SchemaKind::Record;
        }
        let name = match field.try_borrow_mut() {
            Ok(mut f) => {
                if f.name.is_empty() {
                    f.name = self.fields_list.len().to_string();
                }
                f.name.clone()
            }
            // the field descriptor aliases this schema (self-referential
            // named type); this schema's own borrow holds its name
            Err(_) => {
                if self.name.is_empty() {
                    self.name = self.fields_list.len().to_string();
                }
                self.name.clone()
            }
        };
        self.fields_list.push(field.clone());
        self.fields_map.insert(name, field);
    }

    /// Replace the field with the same name, preserving its ordinal.
    /// Appends when no such field exists.
    pub fn replace_field(&mut self, field: SchemaRef) {
        let name = field.borrow().name.clone();
        if name.is_empty() {
            self.add_field(field);
            return;
        }
        match self.fields_map.get(&name) {
            Some(old) => {
                match self.fields_list.iter().position(|f| Rc::ptr_eq(f, old)) {
                    Some(idx) => self.fields_list[idx] = field.clone(),
                    None => self.fields_list.push(field.clone()),
                }
                self.fields_map.insert(name, field);
            }
            None => self.add_field(field),
        }
    }

    /// Field lookup by name. Records only; `None` otherwise.
    pub fn field(&self, name: &str) -> Option<SchemaRef> {
        if !self.is_record() {
            return None;
        }
        self.fields_map.get(name).cloned()
    }

    /// Field lookup by ordinal. Records only; `None` otherwise.
    pub fn field_at(&self, index: usize) -> Option<SchemaRef> {
        if !self.is_record() {
            return None;
        }
        self.fields_list.get(index).cloned()
    }

    // -- Meta ---------------------------------------------------

    /// Apply metadata, including the schema-only `required` constraint.
    /// A `$required=true` attribute is absorbed into the flag here so the
    /// emitted `$required` form round-trips.
    pub fn apply_meta(&mut self, info: &Meta) {
        self.meta.comments.extend_from_slice(&info.comments);
        for (key, value) in &info.attrs {
            if key == "required" && value == &serde_json::Value::Bool(true) {
                self.meta.required = true;
                continue;
            }
            self.meta.attrs.insert(key.clone(), value.clone());
        }
        self.meta.tags.extend_from_slice(&info.tags);
        if info.required {
            self.meta.required = true;
        }
    }

    pub fn clear_meta(&mut self) {
        self.meta.clear();
    }
}

/// Move metadata collected on a list's element onto the list itself and
/// clear it on the element. `< // $attr=v // [int] >` attaches `$attr` to
/// the list, not the element; both decoder and encoder rely on this step.
pub fn promote_element_meta(list: &SchemaRef) {
    let element = {
        let schema = list.borrow();
        if !schema.is_list() {
            return;
        }
        schema.element.clone()
    };
    let Some(element) = element else { return };
    if Rc::ptr_eq(list, &element) {
        return;
    }
    let taken = {
        let mut el = element.borrow_mut();
        if el.meta.is_empty() {
            return;
        }
        std::mem::take(&mut el.meta)
    };
    list.borrow_mut().apply_meta(&taken);
}

/// Hand-written so that cyclic named types do not recurse.
impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_label = if !self.type_name.is_empty()
            && self.type_name != "any"
            && self.type_name != self.kind.label().to_lowercase()
        {
            format!(":{}", self.type_name)
        } else {
            String::new()
        };
        write!(f, "<Schema({}{})", self.kind.label(), type_label)?;
        if !self.name.is_empty() {
            write!(f, " name='{}'", self.name)?;
        }
        if self.meta.required {
            write!(f, " !required")?;
        }
        if !self.meta.attrs.is_empty() {
            let keys: Vec<&String> = self.meta.attrs.keys().collect();
            write!(f, " attr={keys:?}")?;
        }
        if !self.meta.tags.is_empty() {
            write!(f, " tags={:?}", self.meta.tags)?;
        }
        if !self.meta.comments.is_empty() {
            write!(f, " comments={}", self.meta.comments.len())?;
        }
        if self.is_record() {
            let mut names: Vec<String> = self
                .fields_list
                .iter()
                .take(3)
                .map(|field| field.borrow().name.clone())
                .collect();
            if self.fields_list.len() > 3 {
                names.push("...".to_string());
            }
            write!(f, " fields({})=[{}]", self.fields_list.len(), names.join(", "))?;
        } else if self.is_list() {
            match &self.element {
                Some(el) => match el.try_borrow() {
                    Ok(el) => write!(f, " element={}:{}", el.kind.label(), el.type_name)?,
                    Err(_) => write!(f, " element=<borrowed>")?,
                },
                None => write!(f, " element=None")?,
            }
        }
        write!(f, ">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_field_promotes_and_auto_names() {
        let mut schema = Schema::any();
        schema.add_field(Schema::primitive("number").into_ref());
        assert_eq!(schema.kind, SchemaKind::Record, "first field promotes ANY to RECORD");
        assert_eq!(schema.field_at(0).unwrap().borrow().name, "0");

        schema.add_field(Schema::primitive("string").into_ref());
        assert_eq!(schema.fields_len(), 2);
        assert_eq!(schema.field_at(1).unwrap().borrow().name, "1");
    }

    #[test]
    fn fields_retrievable_by_ordinal_and_name() {
        let mut schema = Schema::new(SchemaKind::Record);
        for name in ["a", "b", "c"] {
            let mut field = Schema::primitive("number");
            field.name = name.to_string();
            schema.add_field(field.into_ref());
        }
        assert_eq!(schema.fields_len(), 3);
        for (idx, name) in ["a", "b", "c"].iter().enumerate() {
            let by_ordinal = schema.field_at(idx).unwrap();
            let by_name = schema.field(name).unwrap();
            assert!(Rc::ptr_eq(&by_ordinal, &by_name));
        }
    }

    #[test]
    fn replace_field_preserves_ordinal() {
        let mut schema = Schema::new(SchemaKind::Record);
        for name in ["a", "b", "c"] {
            let mut field = Schema::primitive("any");
            field.name = name.to_string();
            schema.add_field(field.into_ref());
        }
        let mut replacement = Schema::primitive("string");
        replacement.name = "b".to_string();
        schema.replace_field(replacement.into_ref());

        assert_eq!(schema.fields_len(), 3);
        let field = schema.field_at(1).unwrap();
        assert_eq!(field.borrow().name, "b");
        assert_eq!(field.borrow().type_name, "string");
    }

    #[test]
    fn replace_field_appends_when_absent() {
        let mut schema = Schema::new(SchemaKind::Record);
        let mut field = Schema::primitive("bool");
        field.name = "flag".to_string();
        schema.replace_field(field.into_ref());
        assert_eq!(schema.fields_len(), 1);
        assert!(schema.has_field("flag"));
    }

    #[test]
    fn subscript_is_record_only() {
        let schema = Schema::list(Schema::primitive("number").into_ref());
        assert!(schema.field("x").is_none());
        assert!(schema.field_at(0).is_none());
    }

    #[test]
    fn required_attribute_becomes_flag() {
        let mut schema = Schema::primitive("number");
        let mut info = Meta::new();
        info.set_attr("required", serde_json::Value::Bool(true));
        info.set_attr("key", serde_json::json!(1));
        schema.apply_meta(&info);
        assert!(schema.meta.required);
        assert!(!schema.meta.attrs.contains_key("required"));
        assert!(schema.meta.attrs.contains_key("key"));
    }

    #[test]
    fn element_meta_promotion() {
        let element = Schema::primitive("number").into_ref();
        element.borrow_mut().meta.set_attr("unit", serde_json::json!("ms"));
        let list = Schema::list(element.clone()).into_ref();
        list.borrow_mut().meta.set_attr("size", serde_json::json!(3));

        promote_element_meta(&list);

        assert!(element.borrow().meta.is_empty());
        let list = list.borrow();
        assert_eq!(list.meta.attrs.get("unit"), Some(&serde_json::json!("ms")));
        assert_eq!(list.meta.attrs.get("size"), Some(&serde_json::json!(3)));
    }
}
