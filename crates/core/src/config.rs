//! Encoder and decoder configuration.

/// Rendering options. Every switch is independent; [`Default`] gives the
/// pretty, fully-annotated form and [`EncodeConfig::compact`] the canonical
/// compact form used by the round-trip laws.
#[derive(Debug, Clone)]
pub struct EncodeConfig {
    /// Spaces per nesting level (pretty mode).
    pub indent: usize,
    /// Initial column offset (pretty mode).
    pub start_indent: usize,
    /// Collapse internal padding; separators become `,`; schema and data on
    /// one line.
    pub compact: bool,
    /// Render `\n`, `\r` and `\t` in string values as escape sequences.
    pub escape_new_lines: bool,
    /// Wrap tokens in ANSI colors. Presentation only.
    pub colorize: bool,
    /// Emit `/* ... */` comments.
    pub include_comments: bool,
    /// Inject `$size=<n>` into list instance metadata.
    pub include_array_size: bool,
    /// Emit the leading schema header.
    pub include_schema: bool,
    /// Emit `:type` signatures for explicitly-typed primitive fields.
    /// Type info for `any` is suppressed regardless.
    pub include_type: bool,
    /// Emit `$attr` and `#tag` metadata.
    pub include_meta: bool,
    /// Emit a structural blueprint instead of data.
    pub prompt_output: bool,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        EncodeConfig {
            indent: 2,
            start_indent: 0,
            compact: false,
            escape_new_lines: false,
            colorize: false,
            include_comments: true,
            include_array_size: false,
            include_schema: true,
            include_type: true,
            include_meta: true,
            prompt_output: false,
        }
    }
}

impl EncodeConfig {
    /// The canonical compact configuration.
    pub fn compact() -> Self {
        EncodeConfig {
            compact: true,
            ..EncodeConfig::default()
        }
    }
}

/// Decoder options.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Schema-only text concatenated in front of the input, so a schema can
    /// be supplied out of band: `decode_with("(1,2)", &opts)` with
    /// `schema_prefix = "<x:int,y:int>"`.
    pub schema_prefix: String,
    /// Strip ANSI color sequences before parsing.
    pub remove_ansi_colors: bool,
    /// Trace cursor movement and stack events to stderr.
    pub debug: bool,
}
