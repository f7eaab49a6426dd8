//! C header generation for knob schemas.
//!
//! Three artifacts are produced from one [`knob_core::Schema`]:
//!
//! - the public header ([`declaration`]): enums, packed structs, bound
//!   macros, accessor prototypes, and the runtime table types
//! - the service header ([`definition`]): default and cache tables,
//!   validators, the knob descriptor table, and accessor bodies
//! - the optional profile header ([`profile`]): one override table per
//!   profile plus the profile directory
//!
//! Every spelling decision goes through a [`Dialect`]. Two are provided:
//! [`Generic`] (standard C) and [`Firmware`] (UEFI-style).

pub mod artifact;
pub mod config;
pub mod declaration;
pub mod definition;
pub mod dialect;
pub mod error;
pub mod generate;
pub mod literal;
pub mod naming;
pub mod profile;
pub mod validator;
pub mod writer;

pub use artifact::Artifact;
pub use config::CodegenConfig;
pub use declaration::emit_declarations;
pub use definition::emit_definitions;
pub use dialect::{Dialect, DialectKind, Firmware, Generic};
pub use error::{CodegenError, Result};
pub use generate::{generate, generate_to_disk, OutputPaths};
pub use profile::{emit_profiles, merge_profiles};
pub use validator::{ContentValidator, EnumStrategy, EnumValidator, LeafCheck};
