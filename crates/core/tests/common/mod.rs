#![allow(dead_code)]

use akd_core::{decode, encode, EncodeConfig, Node};

/// Decode -> encode -> decode -> encode. The first encoding must match
/// `expected` (canonical compact form) and the second must agree with the
/// first (idempotence).
pub fn assert_roundtrip(source: &str, expected: &str) -> Node {
    let result = decode(source);
    assert!(
        result.errors.is_empty(),
        "input decoding errors for {source:?}: {:?}",
        result.errors
    );
    assert_roundtrip_node(&result.node, expected);
    result.node
}

/// Same starting from an already-built node.
pub fn assert_roundtrip_node(node: &Node, expected: &str) {
    let compact = EncodeConfig::compact();
    let encoded = encode(node, &compact);
    assert_eq!(encoded, expected, "first encoding pass");

    let reparsed = decode(&encoded);
    assert!(
        reparsed.errors.is_empty(),
        "re-decoding errors for {encoded:?}: {:?}",
        reparsed.errors
    );
    let encoded_again = encode(&reparsed.node, &compact);
    assert_eq!(encoded_again, expected, "second encoding pass (idempotence)");
}
