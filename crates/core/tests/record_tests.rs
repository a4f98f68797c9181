//! Records: positional and named forms, field mapping, mismatch tagging.

mod common;

use akd_core::{decode, encode, encode_value, EncodeConfig};
use common::assert_roundtrip;
use serde_json::json;

#[test]
fn encode_simple_dict() {
    let output = encode_value(&json!({"x": 10, "y": 20}), &EncodeConfig::compact());
    assert_eq!(output, "<x:number,y:number>(10,20)");
    assert_roundtrip(&output, "<x:number,y:number>(10,20)");
}

#[test]
fn encode_list_of_objects() {
    let data = json!([{"name": "A", "val": 1}, {"name": "B", "val": 2}]);
    let output = encode_value(&data, &EncodeConfig::compact());
    assert_eq!(output, "<[name:string,val:number]>[(\"A\",1),(\"B\",2)]");
    assert_roundtrip(&output, "<[name:string,val:number]>[(\"A\",1),(\"B\",2)]");
}

#[test]
fn round_trip_consistency() {
    let data = json!([
        {"id": 1, "active": true, "tags": ["a", "b"]},
        {"id": 2, "active": false, "tags": ["c"]},
    ]);
    let expected =
        "<[id:number,active:bool,tags:[string]]>[(1,true,[\"a\",\"b\"]),(2,false,[\"c\"])]";

    let encoded = encode_value(&data, &EncodeConfig::compact());
    assert_eq!(encoded, expected);
    assert_roundtrip(&encoded, expected);

    let result = decode(&encoded);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let plain = result.node.plain();
    assert_eq!(plain, data);
}

#[test]
fn mixed_primitive_types_in_named_record() {
    assert_roundtrip(
        "{ a:\"a\", b:\"b\", c:\"c\", d: 3 }",
        "<a:string,b:string,c:string,d:number>(\"a\",\"b\",\"c\",3)",
    );
}

#[test]
fn named_record_type_mismatch_gets_tag() {
    let text = "
<tests: string>
{
 tests: 3
}
    ";
    assert_roundtrip(text, "<tests:string>(<number> 3)");
}

#[test]
fn positional_record_type_mismatch_gets_tag() {
    let text = "
<tests: string>
(3)
    ";
    assert_roundtrip(text, "<tests:string>(<number> 3)");
}

#[test]
fn record_value_in_typed_slot() {
    let text = "
    <
      id: number
    >
    ( [\"text\"] )
    ";
    let result = decode(text);
    assert!(result.errors.is_empty());
    assert!(result.node.is_record());

    assert_roundtrip(text, "<id:number>(<[string]> [\"text\"])");
}

#[test]
fn missing_fields_render_as_null() {
    let result = decode("<a:int,b:int,c:int>(1)");
    assert!(result.errors.is_empty());
    assert_eq!(encode(&result.node, &EncodeConfig::compact()), "<a:number,b:number,c:number>(1,null,null)");
}

#[test]
fn quoted_keys_round_trip_as_backtick_fields() {
    let result = decode("{\"some key\": 1}");
    assert!(result.errors.is_empty());
    assert_eq!(result.node.fields["some key"].value, Some(json!(1)));
    assert_roundtrip("{\"some key\": 1}", "<`some key`:number>(1)");
}

#[test]
fn empty_object_renders_null_record() {
    let output = encode_value(&json!({}), &EncodeConfig::compact());
    assert_eq!(output, "(null)", "no <any> header in front of an empty record");
}

#[test]
fn inferred_structural_field_in_positional_record() {
    assert_roundtrip("([1,2])", "<_0:[number]>([1,2])");
}

#[test]
fn later_children_do_not_rerefine_fields() {
    // first refinement of an `any` field is final; a second conflicting
    // value is tagged instead
    let text = "<v:any>{v: 1}";
    let result = decode(text);
    assert!(result.errors.is_empty());
    let field = result.node.schema.borrow().field("v").unwrap();
    assert_eq!(field.borrow().type_name, "number");
}
