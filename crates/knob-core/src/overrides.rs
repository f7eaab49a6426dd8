//! Profile override sources and the override merge.
//!
//! An override source is a `.toml` file whose stem names the profile:
//!
//! ```toml
//! # profiles/server.toml
//! [knobs]
//! power_limit_watts = 300
//! fan_mode = "Turbo"
//! ```
//!
//! Merging never mutates the schema. Each source yields a fresh
//! [`ProfileOverrides`], so sources can be merged in any order or in
//! parallel.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::schema::Schema;
use crate::types::Value;

/// A named set of knob-name to value pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideSource {
    /// Profile name, taken from the file stem.
    #[serde(skip)]
    pub name: String,
    /// Where the source came from, for provenance comments.
    #[serde(skip)]
    pub origin: String,
    #[serde(default)]
    pub knobs: toml::Table,
}

impl OverrideSource {
    /// An empty source.
    pub fn new(name: &str) -> Self {
        OverrideSource {
            name: name.to_string(),
            origin: name.to_string(),
            knobs: toml::Table::new(),
        }
    }

    /// Add or replace one override.
    pub fn set(&mut self, knob: &str, value: impl Into<toml::Value>) -> &mut Self {
        self.knobs.insert(knob.to_string(), value.into());
        self
    }

    /// Parse an override source from TOML text.
    pub fn parse(name: &str, input: &str) -> Result<Self> {
        let mut source: OverrideSource = toml::from_str(input)?;
        source.name = name.to_string();
        source.origin = name.to_string();
        Ok(source)
    }

    /// Load an override source; the profile name is the file stem.
    ///
    /// Only `.toml` sources are read.
    pub fn load(path: &Path) -> Result<Self> {
        let unsupported = || SchemaError::UnsupportedFile {
            path: path.to_path_buf(),
        };
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            return Err(unsupported());
        }
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(unsupported)?;
        let content = std::fs::read_to_string(path)?;
        let mut source = Self::parse(name, &content)?;
        source.origin = path.display().to_string();
        Ok(source)
    }
}

/// One overridden knob.
#[derive(Debug, Clone, PartialEq)]
pub struct KnobOverride {
    pub knob: String,
    pub value: Value,
}

/// The overrides of one profile, in schema knob order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileOverrides {
    pub name: String,
    pub origin: String,
    pub entries: Vec<KnobOverride>,
}

impl ProfileOverrides {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, knob: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.knob == knob)
            .map(|e| &e.value)
    }
}

/// Start from schema defaults and apply one source on top.
///
/// Knobs absent from the source keep their defaults and are not part of
/// the result. Naming a knob the schema does not declare is an error, as
/// is a value outside the knob's declared bounds.
pub fn merge_overrides(schema: &Schema, source: &OverrideSource) -> Result<ProfileOverrides> {
    if let Some(unknown) = source
        .knobs
        .keys()
        .find(|name| schema.find_knob(name).is_none())
    {
        return Err(SchemaError::UnknownKnob {
            source_name: source.name.clone(),
            knob: unknown.clone(),
        });
    }

    let mut entries = Vec::new();
    for knob in &schema.knobs {
        if let Some(raw) = source.knobs.get(&knob.name) {
            let value = schema.value_from_toml(&knob.format, raw)?;
            knob.check_bounds(schema, &value)?;
            entries.push(KnobOverride {
                knob: knob.name.clone(),
                value,
            });
        }
    }

    tracing::debug!(
        profile = %source.name,
        overrides = entries.len(),
        "merged override source"
    );
    Ok(ProfileOverrides {
        name: source.name.clone(),
        origin: source.origin.clone(),
        entries,
    })
}
