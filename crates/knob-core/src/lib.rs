//! Configuration knob schemas.
//!
//! A schema declares enums, packed structs, and knobs (named, typed,
//! persisted configuration values). This crate holds the resolved object
//! graph that the header generators consume, plus the providers around it.
//!
//! ## Modules
//!
//! - [`types`]: value formats, bounds, and values
//! - [`schema`]: the resolved schema graph and sub-knob expansion
//! - [`value`]: reading values from text and TOML
//! - [`loader`]: `.toml` / `.json` schema files
//! - [`overrides`]: profile override sources and the override merge

pub mod error;
pub mod loader;
pub mod overrides;
pub mod schema;
pub mod types;
pub mod value;

// Re-export key types for convenience
pub use error::SchemaError;
pub use loader::SchemaFile;
pub use overrides::{merge_overrides, KnobOverride, OverrideSource, ProfileOverrides};
pub use schema::{is_c_identifier, EnumDef, EnumValue, Knob, Schema, StructDef, StructMember, SubKnob};
pub use types::{Bounds, FloatKind, IntKind, Scalar, Value, ValueFormat};
