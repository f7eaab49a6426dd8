//! Schema loading and value errors.

/// Errors raised while loading a schema, parsing values, or merging overrides.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A format name does not resolve to a builtin, enum, or struct.
    #[error("unknown format '{name}' referenced by {context}")]
    UnknownFormat { name: String, context: String },

    /// Two enums, structs, or knobs share a name.
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    /// A struct contains itself, directly or through other structs.
    #[error("struct '{name}' is recursive")]
    RecursiveStruct { name: String },

    /// A struct member repeat count of zero.
    #[error("member '{member}' of struct '{structure}' has a zero repeat count")]
    ZeroCount { structure: String, member: String },

    /// Value text that cannot be read as the expected format.
    #[error("invalid {format} value '{text}': {detail}")]
    InvalidValue {
        format: String,
        text: String,
        detail: String,
    },

    /// A value (or declared bound) outside the natural range of its format.
    #[error("value {value} is outside the range of {format} [{min}, {max}]")]
    OutOfRange {
        format: String,
        value: String,
        min: String,
        max: String,
    },

    /// A declared lower bound above the declared upper bound.
    #[error("{context} declares min {min} above max {max}")]
    InvertedBounds {
        context: String,
        min: String,
        max: String,
    },

    /// A name that cannot be spliced into generated C identifiers.
    #[error("{kind} name '{name}' is not a valid C identifier")]
    InvalidName { kind: &'static str, name: String },

    /// A knob whose identity enumerator would shadow the `KNOB_MAX` sentinel.
    #[error("knob name '{name}' collides with the KNOB_MAX sentinel")]
    ReservedName { name: String },

    /// An override source names a knob the schema does not declare.
    #[error("override source '{source_name}' sets unknown knob '{knob}'")]
    UnknownKnob { source_name: String, knob: String },

    /// Unsupported file type for a schema or override source.
    #[error("unsupported file extension for {}", path.display())]
    UnsupportedFile { path: std::path::PathBuf },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
