//! Blueprint (`prompt_output`) rendering.

use akd_core::{decode, encode, EncodeConfig};

fn prompt_config() -> EncodeConfig {
    EncodeConfig {
        prompt_output: true,
        include_schema: false,
        ..EncodeConfig::default()
    }
}

#[test]
fn record_blueprint_with_comments() {
    let text = "
    @User <
      id: number /* unique id */,
      name: string /* display name */
    >
    ";
    let result = decode(text);
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let output = encode(&result.node, &prompt_config());
    let expected = "{
  id: number /* unique id */,
  name: string /* display name */
}";
    assert_eq!(output.trim(), expected);
}

#[test]
fn list_blueprint_shows_one_example_element() {
    let text = "
    <[ /* id */ id: number, name: string, val: <id: string, num: number> ]>
    [ (1, \"n\", (\"id\", 3)), (2), (3) ]
    ";
    let result = decode(text);
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let output = encode(&result.node, &prompt_config());
    let expected = "[
  {
    id: number /* id */,
    name: string,
    val: {
      id: string,
      num: number
    }
  },
  ... /* repeat pattern for additional items */
]";
    assert_eq!(output.trim(), expected);
}

#[test]
fn nested_record_blueprint() {
    let text = "
    <
      name: string,
      meta: < ver: number /* version number */ >
    >
    (\"App\", (1.0))
    ";
    let result = decode(text);
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let output = encode(&result.node, &prompt_config());
    let expected = "{
  name: string,
  meta: {
    ver: number /* version number */
  }
}";
    assert_eq!(output.trim(), expected);
}

#[test]
fn escaped_identifiers_survive_blueprints() {
    let text = "< `User ID`: number /* system id */ > (123)";
    let result = decode(text);
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let output = encode(&result.node, &prompt_config());
    let expected = "{
  `User ID`: number /* system id */
}";
    assert_eq!(output.trim(), expected);
}

#[test]
fn primitive_list_blueprint() {
    let result = decode("<[int]>[1,2,3]");
    assert!(result.errors.is_empty());

    let output = encode(&result.node, &prompt_config());
    let expected = "[
  number,
  ... /* repeat pattern for additional items */
]";
    assert_eq!(output.trim(), expected);
}

#[test]
fn blueprint_comments_can_be_suppressed() {
    let result = decode("< id: number /* unique id */ > (1)");
    assert!(result.errors.is_empty());

    let config = EncodeConfig {
        include_comments: false,
        ..prompt_config()
    };
    let output = encode(&result.node, &config);
    assert_eq!(output.trim(), "{\n  id: number\n}");
}
