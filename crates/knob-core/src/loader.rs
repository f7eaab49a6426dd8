//! Schema file parsing (`.toml` / `.json`).
//!
//! A schema file declares enums, structs, and knobs:
//!
//! ```toml
//! [[enums]]
//! name = "FanMode"
//! values = [{ name = "Quiet", number = 0 }, { name = "Turbo", number = 2 }]
//!
//! [[structs]]
//! name = "FanPoint"
//! members = [{ name = "temp", format = "uint8_t", max = 100 }]
//!
//! [[knobs]]
//! name = "power_limit_watts"
//! namespace = "8c7a7f4e-3b9b-4f25-9a52-5d9e0d3a4c11"
//! format = "uint16_t"
//! default = 250
//! max = 300
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SchemaError};
use crate::schema::{is_c_identifier, EnumDef, EnumValue, Knob, Schema, StructDef, StructMember};
use crate::types::{Scalar, ValueFormat};

/// The raw contents of a schema file, before name resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    #[serde(default)]
    pub enums: Vec<EnumEntry>,
    #[serde(default)]
    pub structs: Vec<StructEntry>,
    #[serde(default)]
    pub knobs: Vec<KnobEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumEntry {
    pub name: String,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub values: Vec<EnumValueEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumValueEntry {
    pub name: String,
    pub number: i64,
    #[serde(default)]
    pub help: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructEntry {
    pub name: String,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub members: Vec<MemberEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberEntry {
    pub name: String,
    pub format: String,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub min: Option<toml::Value>,
    #[serde(default)]
    pub max: Option<toml::Value>,
    #[serde(default)]
    pub help: Option<String>,
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnobEntry {
    pub name: String,
    #[serde(default)]
    pub help: Option<String>,
    pub namespace: Uuid,
    pub format: String,
    #[serde(default)]
    pub default: Option<toml::Value>,
    #[serde(default)]
    pub min: Option<toml::Value>,
    #[serde(default)]
    pub max: Option<toml::Value>,
}

impl Schema {
    /// Parse a TOML schema. `source` is kept for provenance comments.
    pub fn parse_toml(input: &str, source: &str) -> Result<Self> {
        let file: SchemaFile = toml::from_str(input)?;
        file.resolve(source)
    }

    /// Parse a JSON schema. `source` is kept for provenance comments.
    pub fn parse_json(input: &str, source: &str) -> Result<Self> {
        let file: SchemaFile = serde_json::from_str(input)?;
        file.resolve(source)
    }

    /// Load a schema file, choosing the parser by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let source = path.display().to_string();
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::parse_toml(&content, &source),
            Some("json") => Self::parse_json(&content, &source),
            _ => Err(SchemaError::UnsupportedFile {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl SchemaFile {
    /// Resolve format names, expand sub-knobs, and read defaults and bounds.
    ///
    /// Every name must be a C identifier, declared bounds must be ordered,
    /// and defaults must lie inside each leaf's effective bounds.
    pub fn resolve(self, source: &str) -> Result<Schema> {
        let mut schema = Schema {
            source: source.to_string(),
            ..Default::default()
        };

        // Enums and structs share the C type namespace.
        let mut type_names = HashSet::new();
        for entry in &self.enums {
            check_name("enum", &entry.name)?;
            if !type_names.insert(entry.name.clone()) {
                return Err(duplicate("type", &entry.name));
            }
        }
        for entry in &self.structs {
            check_name("struct", &entry.name)?;
            if !type_names.insert(entry.name.clone()) {
                return Err(duplicate("type", &entry.name));
            }
        }

        for entry in self.enums {
            let mut member_names = HashSet::new();
            for value in &entry.values {
                check_name("enum member", &value.name)?;
                if !member_names.insert(value.name.as_str()) {
                    let ident = format!("{}_{}", entry.name, value.name);
                    return Err(duplicate("enum member", &ident));
                }
            }
            schema.enums.push(EnumDef {
                name: entry.name,
                help: entry.help,
                values: entry
                    .values
                    .into_iter()
                    .map(|v| EnumValue {
                        name: v.name,
                        number: v.number,
                        help: v.help,
                    })
                    .collect(),
            });
        }

        let enum_names: HashSet<String> = schema.enums.iter().map(|e| e.name.clone()).collect();
        let struct_names: HashSet<String> = self.structs.iter().map(|s| s.name.clone()).collect();
        let mut structs = Vec::with_capacity(self.structs.len());
        for entry in &self.structs {
            let mut members = Vec::with_capacity(entry.members.len());
            for member in &entry.members {
                check_name("struct member", &member.name)?;
                if member.count == 0 {
                    return Err(SchemaError::ZeroCount {
                        structure: entry.name.clone(),
                        member: member.name.clone(),
                    });
                }
                let context = format!("member '{}.{}'", entry.name, member.name);
                let format = resolve_format(&member.format, &enum_names, &struct_names, &context)?;
                members.push(StructMember {
                    name: member.name.clone(),
                    format,
                    count: member.count,
                    min: None,
                    max: None,
                    help: member.help.clone(),
                });
            }
            structs.push(StructDef {
                name: entry.name.clone(),
                help: entry.help.clone(),
                members,
            });
        }
        schema.structs = structs;
        check_acyclic(&schema)?;

        // Bounds need the resolved schema to read values.
        for (index, entry) in self.structs.iter().enumerate() {
            for (member_index, member) in entry.members.iter().enumerate() {
                let format = schema.structs[index].members[member_index].format.clone();
                let min = member
                    .min
                    .as_ref()
                    .map(|v| schema.bound_from_toml(&format, v))
                    .transpose()?;
                let max = member
                    .max
                    .as_ref()
                    .map(|v| schema.bound_from_toml(&format, v))
                    .transpose()?;
                check_order(&format!("member '{}.{}'", entry.name, member.name), min, max)?;
                let resolved = &mut schema.structs[index].members[member_index];
                resolved.min = min;
                resolved.max = max;
            }
        }

        let mut knob_names = HashSet::new();
        for entry in self.knobs {
            check_name("knob", &entry.name)?;
            if entry.name == "MAX" {
                return Err(SchemaError::ReservedName { name: entry.name });
            }
            if !knob_names.insert(entry.name.clone()) {
                return Err(duplicate("knob", &entry.name));
            }
            let context = format!("knob '{}'", entry.name);
            let format = resolve_format(&entry.format, &enum_names, &struct_names, &context)?;
            let default = match &entry.default {
                Some(value) => schema.value_from_toml(&format, value)?,
                None => schema.zero_value(&format)?,
            };
            let (min, max) = match format {
                ValueFormat::Struct(_) => (None, None),
                _ => (
                    entry
                        .min
                        .as_ref()
                        .map(|v| schema.bound_from_toml(&format, v))
                        .transpose()?,
                    entry
                        .max
                        .as_ref()
                        .map(|v| schema.bound_from_toml(&format, v))
                        .transpose()?,
                ),
            };
            check_order(&context, min, max)?;
            let subknobs = schema.expand_subknobs(&entry.name, &format, min, max)?;
            let knob = Knob {
                name: entry.name,
                help: entry.help,
                namespace: entry.namespace,
                format,
                default,
                subknobs,
            };
            knob.check_bounds(&schema, &knob.default)?;
            schema.knobs.push(knob);
        }

        tracing::debug!(
            source,
            enums = schema.enums.len(),
            structs = schema.structs.len(),
            knobs = schema.knobs.len(),
            "resolved schema"
        );
        Ok(schema)
    }
}

fn duplicate(kind: &'static str, name: &str) -> SchemaError {
    SchemaError::DuplicateName {
        kind,
        name: name.to_string(),
    }
}

fn check_name(kind: &'static str, name: &str) -> Result<()> {
    if is_c_identifier(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}

fn check_order(context: &str, min: Option<Scalar>, max: Option<Scalar>) -> Result<()> {
    match (min, max) {
        (Some(min), Some(max)) if !min.at_most(&max) => Err(SchemaError::InvertedBounds {
            context: context.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }),
        _ => Ok(()),
    }
}

fn resolve_format(
    name: &str,
    enums: &HashSet<String>,
    structs: &HashSet<String>,
    context: &str,
) -> Result<ValueFormat> {
    if let Some(builtin) = ValueFormat::builtin(name) {
        Ok(builtin)
    } else if enums.contains(name) {
        Ok(ValueFormat::Enum(name.to_string()))
    } else if structs.contains(name) {
        Ok(ValueFormat::Struct(name.to_string()))
    } else {
        Err(SchemaError::UnknownFormat {
            name: name.to_string(),
            context: context.to_string(),
        })
    }
}

/// Reject structs that contain themselves.
fn check_acyclic(schema: &Schema) -> Result<()> {
    fn visit<'a>(
        schema: &'a Schema,
        name: &'a str,
        stack: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<()> {
        if done.contains(name) {
            return Ok(());
        }
        if stack.contains(&name) {
            return Err(SchemaError::RecursiveStruct {
                name: name.to_string(),
            });
        }
        stack.push(name);
        if let Some(def) = schema.find_struct(name) {
            for member in &def.members {
                if let ValueFormat::Struct(inner) = &member.format {
                    visit(schema, inner, stack, done)?;
                }
            }
        }
        stack.pop();
        done.insert(name);
        Ok(())
    }

    let mut done = HashSet::new();
    for def in &schema.structs {
        visit(schema, &def.name, &mut Vec::new(), &mut done)?;
    }
    Ok(())
}
