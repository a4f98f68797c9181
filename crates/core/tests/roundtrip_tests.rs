//! End-to-end round-trip scenarios and the codec laws: canonical stability,
//! plain-value fidelity, and idempotence of repeated encoding.

mod common;

use akd_core::{decode, encode, encode_value, EncodeConfig};
use common::{assert_roundtrip, assert_roundtrip_node};
use serde_json::json;

#[test]
fn scenario_named_record() {
    assert_roundtrip("{x:10,y:20}", "<x:number,y:number>(10,20)");
}

#[test]
fn scenario_list_of_records_from_plain_value() {
    let data = json!([{"name": "A", "val": 1}, {"name": "B", "val": 2}]);
    let node = akd_core::parse(&data);
    assert_roundtrip_node(&node, "<[name:string,val:number]>[(\"A\",1),(\"B\",2)]");
}

#[test]
fn scenario_string_field_with_number_value() {
    assert_roundtrip("<tests:string>{tests:3}", "<tests:string>(<number> 3)");
}

#[test]
fn scenario_any_list_with_mixed_tail() {
    assert_roundtrip("<[any]>[\"a\",\"b\",\"c\",3]", "<[string]>[\"a\",\"b\",\"c\",<number> 3]");
}

#[test]
fn scenario_nested_int_lists() {
    assert_roundtrip("<[[int]]>[[2,3,4],[5,6,7]]", "<[[number]]>[[2,3,4],[5,6,7]]");
}

#[test]
fn scenario_named_type_definition_and_use() {
    assert_roundtrip(
        "@User<id:int,name:string> @User(5,\"Bob\")",
        "@User<id:number,name:string>(5,\"Bob\")",
    );
}

#[test]
fn scenario_list_instance_meta_block() {
    assert_roundtrip(
        "[ // $size=3 $author=\"me\" // 1, 2, 3 ]",
        "<[number]>[//$size=3 $author=\"me\"// 1,2,3]",
    );
}

#[test]
fn scenario_backtick_identifier_with_comment() {
    assert_roundtrip(
        "< `User ID+`: number /* system id */ > (123)",
        "</*system id*/ `User ID+`:number>(123)",
    );
}

#[test]
fn plain_value_round_trip() {
    let values = [
        json!(null),
        json!(true),
        json!(123),
        json!(-1.5),
        json!("hello world"),
        json!([1, 2, 3]),
        json!({"x": 10, "y": 20}),
        json!([{"id": 1, "tags": ["a"]}, {"id": 2, "tags": []}]),
        json!({"nested": {"deep": [{"k": "v"}]}}),
    ];
    for value in values {
        let encoded = encode_value(&value, &EncodeConfig::compact());
        let result = decode(&encoded);
        assert!(result.errors.is_empty(), "decode of {encoded:?}: {:?}", result.errors);
        assert_eq!(result.node.plain(), value, "plain-value fidelity for {encoded:?}");
    }
}

#[test]
fn double_encode_agrees() {
    let values = [
        json!({"a": [1, "x", true]}),
        json!([[1, 2], [3]]),
        json!({"m": {"n": null}}),
    ];
    let compact = EncodeConfig::compact();
    for value in values {
        let first = encode_value(&value, &compact);
        let reparsed = decode(&first);
        assert!(reparsed.errors.is_empty(), "{first:?}: {:?}", reparsed.errors);
        let second = encode(&reparsed.node, &compact);
        assert_eq!(second, first, "idempotence for {value}");
    }
}

#[test]
fn float_values_stay_floats() {
    let encoded = encode_value(&json!(3.0), &EncodeConfig::compact());
    assert_eq!(encoded, "<number>3.0");
    let result = decode(&encoded);
    assert!(result.errors.is_empty());
    assert_eq!(result.node.value.as_ref().unwrap().as_f64(), Some(3.0));
    assert_eq!(encode(&result.node, &EncodeConfig::compact()), "<number>3.0");
}

#[test]
fn pretty_output_reparses_to_same_tree() {
    let data = json!([{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]);
    let pretty = encode_value(&data, &EncodeConfig::default());
    let result = decode(&pretty);
    assert!(result.errors.is_empty(), "pretty output must reparse: {pretty}\n{:?}", result.errors);
    assert_eq!(result.node.plain(), data);
}

#[test]
fn header_suppression_options() {
    let node = akd_core::parse(&json!({"x": 1}));
    let no_schema = encode(
        &node,
        &EncodeConfig {
            include_schema: false,
            ..EncodeConfig::compact()
        },
    );
    assert_eq!(no_schema, "(1)");

    let no_types = encode(
        &node,
        &EncodeConfig {
            include_type: false,
            ..EncodeConfig::compact()
        },
    );
    assert_eq!(no_types, "<x>(1)");
}
