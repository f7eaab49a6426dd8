//! Header generation errors.

use knob_core::SchemaError;

/// Errors that can occur while generating headers.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// An enum without members has no lowest/highest value to validate against.
    #[error("enum '{name}' declares no values")]
    EmptyEnum { name: String },

    /// A member number outside the 32-bit domain of the enum's backing type.
    #[error("enum '{name}' member '{member}' ({number}) does not fit {domain}")]
    EnumOutOfRange {
        name: String,
        member: String,
        number: i64,
        domain: &'static str,
    },

    /// A declared member number equals the width-forcing padding value.
    #[error("enum '{name}' member '{member}' collides with the padding value {padding:#x}")]
    PaddingCollision {
        name: String,
        member: String,
        padding: u32,
    },

    /// A profile name that cannot be spliced into C identifiers.
    #[error("profile name '{name}' is not a valid C identifier")]
    InvalidProfileName { name: String },

    /// Two override sources share a profile name.
    #[error("profile '{name}' is given more than once")]
    DuplicateProfile { name: String },

    /// A value does not have the shape its format requires.
    #[error("cannot render {value} as {format}")]
    ValueMismatch { format: String, value: String },

    /// Schema lookup or value error.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// I/O error while writing an artifact.
    #[error("I/O error writing {}: {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, CodegenError>;
