//! The resolved schema object graph: enums, structs, and knobs.

use uuid::Uuid;

use crate::error::{Result, SchemaError};
use crate::types::{Bounds, Scalar, Value, ValueFormat};

/// Whether `name` can be spliced into generated C identifiers.
pub fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A single named enum member.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub number: i64,
    pub help: Option<String>,
}

/// A schema enum. Member numbers need not be sorted or contiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: String,
    pub help: Option<String>,
    pub values: Vec<EnumValue>,
}

impl EnumDef {
    /// Lowest declared member number, `None` for an empty enum.
    pub fn lowest(&self) -> Option<i64> {
        self.values.iter().map(|v| v.number).min()
    }

    /// Highest declared member number, `None` for an empty enum.
    pub fn highest(&self) -> Option<i64> {
        self.values.iter().map(|v| v.number).max()
    }

    pub fn has_negative(&self) -> bool {
        self.values.iter().any(|v| v.number < 0)
    }

    pub fn member(&self, name: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.name == name)
    }

    pub fn member_by_number(&self, number: i64) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.number == number)
    }

    /// C identifier of a member: `<Enum>_<Member>`.
    pub fn member_ident(&self, member: &str) -> String {
        format!("{}_{}", self.name, member)
    }
}

/// A struct member. `count > 1` declares a fixed-size array.
#[derive(Debug, Clone, PartialEq)]
pub struct StructMember {
    pub name: String,
    pub format: ValueFormat,
    pub count: u32,
    /// Declared lower bound, if narrower than the format's natural range.
    pub min: Option<Scalar>,
    /// Declared upper bound, if narrower than the format's natural range.
    pub max: Option<Scalar>,
    pub help: Option<String>,
}

/// A schema struct, laid out with 1-byte packing.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub help: Option<String>,
    pub members: Vec<StructMember>,
}

/// An addressable path inside a knob's value.
#[derive(Debug, Clone, PartialEq)]
pub struct SubKnob {
    /// Dotted/indexed path starting with the knob name (`fan.points[1].temp`).
    pub path: String,
    pub format: ValueFormat,
    /// Leaves hold scalar, boolean, or enum values; non-leaves hold structs
    /// or arrays.
    pub leaf: bool,
    /// Effective range of a numeric leaf.
    pub bounds: Option<Bounds>,
}

impl SubKnob {
    /// Macro-safe form of the path: `[` and `]` become `_`, `.` becomes `__`.
    pub fn define_name(&self) -> String {
        self.path
            .replace('[', "_")
            .replace(']', "_")
            .replace('.', "__")
    }

    /// The part of the path following the knob name (`.points[1].temp`),
    /// suitable for appending to a C lvalue of the knob's type.
    pub fn access_suffix<'a>(&'a self, knob_name: &str) -> &'a str {
        self.path.strip_prefix(knob_name).unwrap_or("")
    }

    /// Effective lower bound when it differs from the natural one.
    pub fn narrowed_min(&self) -> Option<Scalar> {
        let natural = self.format.natural_bounds()?;
        let effective = self.bounds?;
        (effective.min != natural.min).then_some(effective.min)
    }

    /// Effective upper bound when it differs from the natural one.
    pub fn narrowed_max(&self) -> Option<Scalar> {
        let natural = self.format.natural_bounds()?;
        let effective = self.bounds?;
        (effective.max != natural.max).then_some(effective.max)
    }

    /// Whether generated code must check this leaf (enum membership or a
    /// narrowed bound).
    pub fn is_constrained(&self) -> bool {
        self.leaf
            && (self.format.is_enum()
                || self.narrowed_min().is_some()
                || self.narrowed_max().is_some())
    }
}

/// A named, typed, persisted configuration value.
#[derive(Debug, Clone, PartialEq)]
pub struct Knob {
    pub name: String,
    pub help: Option<String>,
    /// Namespace GUID scoping the persisted variable.
    pub namespace: Uuid,
    pub format: ValueFormat,
    pub default: Value,
    /// Sub-knobs in depth-first declaration order; the first entry is the
    /// knob itself.
    pub subknobs: Vec<SubKnob>,
}

impl Knob {
    /// Leaf sub-knobs only.
    pub fn leaves(&self) -> impl Iterator<Item = &SubKnob> {
        self.subknobs.iter().filter(|s| s.leaf)
    }

    /// Whether any leaf requires a generated content check.
    pub fn has_constraints(&self) -> bool {
        self.subknobs.iter().any(SubKnob::is_constrained)
    }

    /// Check every numeric leaf of `value` against its effective bounds.
    pub fn check_bounds(&self, schema: &Schema, value: &Value) -> Result<()> {
        for leaf in self.leaves() {
            let Some(bounds) = leaf.bounds else {
                continue;
            };
            let Some(scalar) = schema
                .select(&self.format, value, leaf.access_suffix(&self.name))
                .and_then(Value::as_scalar)
            else {
                continue;
            };
            if !bounds.contains(&scalar) {
                return Err(SchemaError::OutOfRange {
                    format: format!("{} ({})", leaf.path, leaf.format),
                    value: scalar.to_string(),
                    min: bounds.min.to_string(),
                    max: bounds.max.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// The root object: ordered enums, structs, and knobs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    /// Human-readable source identifier, used for provenance comments.
    pub source: String,
    pub enums: Vec<EnumDef>,
    pub structs: Vec<StructDef>,
    pub knobs: Vec<Knob>,
}

impl Schema {
    pub fn find_enum(&self, name: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|e| e.name == name)
    }

    pub fn find_struct(&self, name: &str) -> Option<&StructDef> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn find_knob(&self, name: &str) -> Option<&Knob> {
        self.knobs.iter().find(|k| k.name == name)
    }

    pub(crate) fn enum_for(&self, name: &str, context: &str) -> Result<&EnumDef> {
        self.find_enum(name).ok_or_else(|| SchemaError::UnknownFormat {
            name: name.to_string(),
            context: context.to_string(),
        })
    }

    pub(crate) fn struct_for(&self, name: &str, context: &str) -> Result<&StructDef> {
        self.find_struct(name).ok_or_else(|| SchemaError::UnknownFormat {
            name: name.to_string(),
            context: context.to_string(),
        })
    }

    /// Walk the `.member` and `[index]` steps of an access suffix through a
    /// value of `format`. `None` when the path does not fit the value.
    pub fn select<'v>(
        &self,
        format: &ValueFormat,
        value: &'v Value,
        suffix: &str,
    ) -> Option<&'v Value> {
        if suffix.is_empty() {
            return Some(value);
        }
        let ValueFormat::Struct(name) = format else {
            return None;
        };
        let def = self.find_struct(name)?;
        let rest = suffix.strip_prefix('.')?;
        let end = rest.find(['.', '[']).unwrap_or(rest.len());
        let (member_name, mut rest) = rest.split_at(end);
        let index = def.members.iter().position(|m| m.name == member_name)?;
        let member = &def.members[index];
        let Value::Struct(items) = value else {
            return None;
        };
        let mut current = items.get(index)?;
        if member.count > 1 {
            let inner = rest.strip_prefix('[')?;
            let close = inner.find(']')?;
            let element: usize = inner[..close].parse().ok()?;
            let Value::Array(elements) = current else {
                return None;
            };
            current = elements.get(element)?;
            rest = &inner[close + 1..];
        }
        self.select(&member.format, current, rest)
    }

    /// Packed storage size of a format in bytes.
    pub fn size_of(&self, format: &ValueFormat) -> Result<u64> {
        match format {
            ValueFormat::Int(kind) => Ok(kind.size_bytes()),
            ValueFormat::Float(kind) => Ok(kind.size_bytes()),
            ValueFormat::Bool => Ok(1),
            ValueFormat::Enum(name) => {
                self.enum_for(name, "size computation")?;
                Ok(4)
            }
            ValueFormat::Struct(name) => {
                let def = self.struct_for(name, "size computation")?;
                self.struct_size(def)
            }
        }
    }

    /// Sum of member sizes times repeat counts, with no padding.
    pub fn struct_size(&self, def: &StructDef) -> Result<u64> {
        let mut total = 0u64;
        for member in &def.members {
            total += self.size_of(&member.format)? * u64::from(member.count);
        }
        Ok(total)
    }

    /// Expand a knob's value into its addressable sub-knobs.
    ///
    /// `min`/`max` are the knob's own declared bounds, which only apply when
    /// the knob is a scalar.
    pub fn expand_subknobs(
        &self,
        knob_name: &str,
        format: &ValueFormat,
        min: Option<Scalar>,
        max: Option<Scalar>,
    ) -> Result<Vec<SubKnob>> {
        let mut out = Vec::new();
        self.expand_into(knob_name.to_string(), format, min, max, &mut out)?;
        Ok(out)
    }

    fn expand_into(
        &self,
        path: String,
        format: &ValueFormat,
        min: Option<Scalar>,
        max: Option<Scalar>,
        out: &mut Vec<SubKnob>,
    ) -> Result<()> {
        match format {
            ValueFormat::Struct(name) => {
                let def = self.struct_for(name, &path)?;
                out.push(SubKnob {
                    path: path.clone(),
                    format: format.clone(),
                    leaf: false,
                    bounds: None,
                });
                for member in &def.members {
                    let member_path = format!("{path}.{}", member.name);
                    if member.count == 1 {
                        self.expand_into(member_path, &member.format, member.min, member.max, out)?;
                    } else {
                        out.push(SubKnob {
                            path: member_path.clone(),
                            format: member.format.clone(),
                            leaf: false,
                            bounds: None,
                        });
                        for index in 0..member.count {
                            self.expand_into(
                                format!("{member_path}[{index}]"),
                                &member.format,
                                member.min,
                                member.max,
                                out,
                            )?;
                        }
                    }
                }
            }
            ValueFormat::Enum(name) => {
                self.enum_for(name, &path)?;
                out.push(SubKnob {
                    path,
                    format: format.clone(),
                    leaf: true,
                    bounds: None,
                });
            }
            _ => {
                let bounds = format.natural_bounds().map(|natural| Bounds {
                    min: min.unwrap_or(natural.min),
                    max: max.unwrap_or(natural.max),
                });
                out.push(SubKnob {
                    path,
                    format: format.clone(),
                    leaf: true,
                    bounds,
                });
            }
        }
        Ok(())
    }
}
