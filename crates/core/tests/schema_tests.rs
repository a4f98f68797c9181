//! Schema definitions, named types, references, and schema-level comments.

mod common;

use akd_core::{decode, decode_with, DecodeOptions, SchemaKind};
use common::assert_roundtrip;
use serde_json::json;

#[test]
fn schema_definition_and_usage() {
    let text = "@User<id:int, name:string> @User(1, \"Admin\")";
    let result = decode(text);
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let node = &result.node;
    assert_eq!(node.schema.borrow().type_name, "User");
    assert_eq!(node.fields["id"].value, Some(json!(1)));
    assert_eq!(node.fields["name"].value, Some(json!("Admin")));

    assert_roundtrip(text, "@User<id:number,name:string>(1,\"Admin\")");
}

#[test]
fn nested_schema_structure() {
    let text = "
    @Profile<level:int>
    @User<id:int, profile: @Profile>
    @User(1, {level: 99})
    ";
    let result = decode(text);
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let node = &result.node;
    assert_eq!(node.fields["id"].value, Some(json!(1)));
    assert_eq!(node.fields["profile"].fields["level"].value, Some(json!(99)));

    assert_roundtrip(text, "@User<id:number,profile:@Profile<level:number>>(1,(99))");
}

#[test]
fn named_type_sites_share_one_descriptor() {
    let text = "@Point<x:int,y:int> @Box<a:@Point,b:@Point> @Box((1,2),(3,4))";
    let result = decode(text);
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let schema = result.node.schema.borrow();
    let a = schema.field("a").unwrap();
    let b = schema.field("b").unwrap();
    assert!(std::rc::Rc::ptr_eq(&a, &b), "both @Point sites resolve to the same descriptor");
}

#[test]
fn self_referential_named_type() {
    let text = "@Tree<id:number,children:[@Tree]> @Tree(1,[(2,[])])";
    let result = decode(text);
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let node = &result.node;
    assert_eq!(node.fields["id"].value, Some(json!(1)));
    let children = &node.fields["children"];
    assert!(children.is_list());
    assert_eq!(children.elements[0].fields["id"].value, Some(json!(2)));

    // the children element descriptor is the Tree descriptor itself
    let field = node.schema.borrow().field("children").unwrap();
    let element = field.borrow().element.clone().unwrap();
    assert!(std::rc::Rc::ptr_eq(&element, &node.schema));

    assert_roundtrip(text, "@Tree<id:number,children:[@Tree]>(1,[(2,[])])");
}

#[test]
fn comments_in_schema_attach_to_fields() {
    let text = "@User<id:int /*primary key*/, name:string> @User(5, \"Bob\")";
    let result = decode(text);
    assert!(result.errors.is_empty());
    assert_eq!(result.node.fields["id"].value, Some(json!(5)));

    assert_roundtrip(text, "@User</*primary key*/ id:number,name:string>(5,\"Bob\")");
}

#[test]
fn backtick_escaped_field_name() {
    let text = "< `User ID+`: number /* system id */ > (123)";
    let result = decode(text);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.node.fields["User ID+"].value, Some(json!(123)));

    assert_roundtrip(text, "</*system id*/ `User ID+`:number>(123)");
}

#[test]
fn bare_primitive_switches_schema_only_without_fields() {
    // shorthand form
    let result = decode("<number>123");
    assert!(result.errors.is_empty());
    assert_eq!(result.schema.borrow().kind, SchemaKind::Primitive);
    assert_eq!(result.schema.borrow().type_name, "number");

    // with a field already present the bare token is a field name instead
    let result = decode("<a:int, number>(1, 2)");
    assert!(result.errors.is_empty());
    let schema = result.schema.borrow();
    assert_eq!(schema.kind, SchemaKind::Record);
    assert!(schema.has_field("number"));
}

#[test]
fn int_and_float_alias_to_number() {
    assert_roundtrip("<[[int]]>[[2,3,4],[5,6,7]]", "<[[number]]>[[2,3,4],[5,6,7]]");
    assert_roundtrip("<x:float>(1.5)", "<x:number>(1.5)");
}

#[test]
fn schema_prefix_option() {
    let options = DecodeOptions {
        schema_prefix: "<x:int,y:int>".to_string(),
        ..DecodeOptions::default()
    };
    let result = decode_with("(10,20)", &options);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.node.fields["x"].value, Some(json!(10)));
    assert_eq!(result.node.fields["y"].value, Some(json!(20)));
}

#[test]
fn first_registration_wins_per_name() {
    let text = "@User<id:int> @User<name:string> @User(7)";
    let result = decode(text);
    // the second definition parses but the registry keeps the first
    let node = &result.node;
    assert_eq!(node.fields["id"].value, Some(json!(7)));
}
