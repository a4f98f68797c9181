//! akd-core: the Arkadia Data (AKD) codec.
//!
//! AKD is a schema-first, token-efficient textual data format -- a denser
//! alternative to JSON for passing structured data to and from language
//! models. A document carries an explicit schema header followed by data
//! rendered positionally or nominally, plus a metadata layer (`/* ... */`
//! comments, `$key=value` attributes, `#tags`, flags) that is syntactically
//! first-class but transparent to consumers who only want the data:
//!
//! ```text
//! @User<id:number,name:string>(5,"Bob")
//! <[name:string,val:number]>[("A",1),("B",2)]
//! ```
//!
//! # Public API
//!
//! - [`decode()`] / [`decode_with()`] -- text to a schema-linked node tree
//!   plus accumulated diagnostics; decoding recovers from errors and always
//!   returns a root node
//! - [`encode()`] -- node tree to canonical AKD text, driven by
//!   [`EncodeConfig`]
//! - [`encode_value()`] / [`parse()`] -- the same for plain
//!   `serde_json::Value` data, via the node builder
//!
//! Round trip: for canonical compact text `s`,
//! `encode(&decode(s).node, &EncodeConfig::compact()) == s`.

pub mod builder;
pub mod color;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod meta;
pub mod node;
pub mod schema;

// ── Convenience re-exports ───────────────────────────────────────────

pub use builder::parse;
pub use config::{DecodeOptions, EncodeConfig};
pub use decoder::{DecodeResult, Decoder, MAX_ERRORS, MAX_WARNINGS};
pub use encoder::Encoder;
pub use error::{Diagnostic, Severity};
pub use meta::Meta;
pub use node::Node;
pub use schema::{Schema, SchemaKind, SchemaRef};

/// Decode AKD text with default options.
pub fn decode(text: &str) -> DecodeResult {
    decode_with(text, &DecodeOptions::default())
}

/// Decode AKD text. `options.schema_prefix` is concatenated in front of
/// the input, so a schema can be supplied out of band.
pub fn decode_with(text: &str, options: &DecodeOptions) -> DecodeResult {
    Decoder::new(text, options).decode()
}

/// Render a node tree to AKD text.
pub fn encode(node: &Node, config: &EncodeConfig) -> String {
    Encoder::new(config).encode(node)
}

/// Render any plain value to AKD text via the node builder.
pub fn encode_value(value: &serde_json::Value, config: &EncodeConfig) -> String {
    encode(&parse(value), config)
}
