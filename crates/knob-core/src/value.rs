//! Reading values from text and TOML against a schema format.
//!
//! Text syntax:
//! - integers: decimal, `0x` hex, optional leading `-`, optional C suffix
//!   (`U`, `L`, `LL`, `ULL`)
//! - floats: decimal with optional `f` suffix
//! - booleans: `true` / `false`, any case
//! - enum members: bare member name, `<Enum>_<Member>`, or member number
//! - structs and repeated members: brace lists, `{1,{2,3},Quiet}`

use crate::error::{Result, SchemaError};
use crate::schema::{EnumDef, Schema, StructMember};
use crate::types::{Bounds, FloatKind, IntKind, Scalar, Value, ValueFormat};

impl Schema {
    /// Parse value text as the given format.
    pub fn parse_value(&self, format: &ValueFormat, text: &str) -> Result<Value> {
        let text = text.trim();
        match format {
            ValueFormat::Int(kind) => parse_int(*kind, text),
            ValueFormat::Float(kind) => parse_float(*kind, text),
            ValueFormat::Bool => parse_bool(text),
            ValueFormat::Enum(name) => {
                let def = self.enum_for(name, "value")?;
                parse_enum(def, text)
            }
            ValueFormat::Struct(name) => {
                let def = self.struct_for(name, "value")?;
                let items = split_brace_list(text, name)?;
                if items.len() != def.members.len() {
                    return Err(invalid(
                        format,
                        text,
                        format!(
                            "expected {} members, found {}",
                            def.members.len(),
                            items.len()
                        ),
                    ));
                }
                let mut values = Vec::with_capacity(items.len());
                for (member, item) in def.members.iter().zip(items) {
                    values.push(self.parse_member(member, item)?);
                }
                Ok(Value::Struct(values))
            }
        }
    }

    fn parse_member(&self, member: &StructMember, text: &str) -> Result<Value> {
        if member.count == 1 {
            return self.parse_value(&member.format, text);
        }
        let items = split_brace_list(text, &member.name)?;
        if items.len() != member.count as usize {
            return Err(invalid(
                &member.format,
                text,
                format!(
                    "member '{}' expects {} elements, found {}",
                    member.name,
                    member.count,
                    items.len()
                ),
            ));
        }
        let elements = items
            .into_iter()
            .map(|item| self.parse_value(&member.format, item))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(elements))
    }

    /// Convert a TOML value to a schema value of the given format.
    ///
    /// Strings are read with [`Schema::parse_value`]; tables fill struct
    /// members by name, with omitted members taking their zero value.
    pub fn value_from_toml(&self, format: &ValueFormat, value: &toml::Value) -> Result<Value> {
        match (format, value) {
            (_, toml::Value::String(text)) => self.parse_value(format, text),
            (ValueFormat::Int(kind), toml::Value::Integer(v)) => {
                check_int(*kind, i128::from(*v), &v.to_string())
            }
            (ValueFormat::Float(kind), toml::Value::Integer(v)) => {
                check_float(*kind, *v as f64, &v.to_string())
            }
            (ValueFormat::Float(kind), toml::Value::Float(v)) => {
                check_float(*kind, *v, &v.to_string())
            }
            (ValueFormat::Bool, toml::Value::Boolean(v)) => Ok(Value::Bool(*v)),
            (ValueFormat::Enum(name), toml::Value::Integer(v)) => {
                let def = self.enum_for(name, "value")?;
                parse_enum(def, &v.to_string())
            }
            (ValueFormat::Struct(name), toml::Value::Array(items)) => {
                let def = self.struct_for(name, "value")?;
                if items.len() != def.members.len() {
                    return Err(invalid(
                        format,
                        &value.to_string(),
                        format!(
                            "expected {} members, found {}",
                            def.members.len(),
                            items.len()
                        ),
                    ));
                }
                def.members
                    .iter()
                    .zip(items)
                    .map(|(member, item)| self.member_from_toml(member, item))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Struct)
            }
            (ValueFormat::Struct(name), toml::Value::Table(table)) => {
                let def = self.struct_for(name, "value")?;
                if let Some(unknown) = table
                    .keys()
                    .find(|key| !def.members.iter().any(|m| &m.name == *key))
                {
                    return Err(invalid(
                        format,
                        &value.to_string(),
                        format!("no member named '{unknown}'"),
                    ));
                }
                def.members
                    .iter()
                    .map(|member| match table.get(&member.name) {
                        Some(item) => self.member_from_toml(member, item),
                        None => self.zero_member(member),
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Struct)
            }
            _ => Err(invalid(
                format,
                &value.to_string(),
                format!("a TOML {} cannot hold this format", value.type_str()),
            )),
        }
    }

    fn member_from_toml(&self, member: &StructMember, value: &toml::Value) -> Result<Value> {
        if member.count == 1 {
            return self.value_from_toml(&member.format, value);
        }
        match value {
            toml::Value::String(text) => self.parse_member(member, text),
            toml::Value::Array(items) if items.len() == member.count as usize => items
                .iter()
                .map(|item| self.value_from_toml(&member.format, item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            _ => Err(invalid(
                &member.format,
                &value.to_string(),
                format!(
                    "member '{}' expects an array of {} elements",
                    member.name, member.count
                ),
            )),
        }
    }

    /// The value a knob takes when its schema entry declares no default.
    pub fn zero_value(&self, format: &ValueFormat) -> Result<Value> {
        match format {
            ValueFormat::Int(_) => Ok(Value::Int(0)),
            ValueFormat::Float(_) => Ok(Value::Float(0.0)),
            ValueFormat::Bool => Ok(Value::Bool(false)),
            ValueFormat::Enum(name) => {
                let def = self.enum_for(name, "default value")?;
                def.values
                    .first()
                    .map(|v| Value::Enum(v.name.clone()))
                    .ok_or_else(|| invalid(format, "", "enum has no members".to_string()))
            }
            ValueFormat::Struct(name) => {
                let def = self.struct_for(name, "default value")?;
                def.members
                    .iter()
                    .map(|member| self.zero_member(member))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Struct)
            }
        }
    }

    fn zero_member(&self, member: &StructMember) -> Result<Value> {
        let zero = self.zero_value(&member.format)?;
        if member.count == 1 {
            Ok(zero)
        } else {
            Ok(Value::Array(vec![zero; member.count as usize]))
        }
    }

    /// Read a declared bound for a numeric format.
    pub fn bound_from_toml(&self, format: &ValueFormat, value: &toml::Value) -> Result<Scalar> {
        let natural = format.natural_bounds().ok_or_else(|| {
            invalid(
                format,
                &value.to_string(),
                "only numeric formats take min/max bounds".to_string(),
            )
        })?;
        let scalar = self
            .value_from_toml(format, value)?
            .as_scalar()
            .ok_or_else(|| invalid(format, &value.to_string(), "not numeric".to_string()))?;
        check_bounds(format, &natural, scalar)?;
        Ok(scalar)
    }
}

fn invalid(format: &ValueFormat, text: &str, detail: String) -> SchemaError {
    SchemaError::InvalidValue {
        format: format.to_string(),
        text: text.to_string(),
        detail,
    }
}

fn check_bounds(format: &ValueFormat, bounds: &Bounds, value: Scalar) -> Result<()> {
    if bounds.contains(&value) {
        Ok(())
    } else {
        Err(SchemaError::OutOfRange {
            format: format.to_string(),
            value: value.to_string(),
            min: bounds.min.to_string(),
            max: bounds.max.to_string(),
        })
    }
}

fn check_int(kind: IntKind, value: i128, text: &str) -> Result<Value> {
    let format = ValueFormat::Int(kind);
    if value < kind.min() || value > kind.max() {
        return Err(SchemaError::OutOfRange {
            format: format.to_string(),
            value: text.to_string(),
            min: kind.min().to_string(),
            max: kind.max().to_string(),
        });
    }
    Ok(Value::Int(value))
}

fn check_float(kind: FloatKind, value: f64, text: &str) -> Result<Value> {
    let format = ValueFormat::Float(kind);
    if !value.is_finite() {
        return Err(invalid(&format, text, "not a finite number".to_string()));
    }
    if let Some(bounds) = format.natural_bounds() {
        check_bounds(&format, &bounds, Scalar::Float(value))?;
    }
    Ok(Value::Float(value))
}

fn parse_int(kind: IntKind, text: &str) -> Result<Value> {
    let format = ValueFormat::Int(kind);
    let body = text.trim_end_matches(['u', 'U', 'l', 'L']);
    let (negative, digits) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i128::from_str_radix(hex, 16),
        None => digits.parse::<i128>(),
    }
    .map_err(|e| invalid(&format, text, e.to_string()))?;
    let value = if negative { -magnitude } else { magnitude };
    check_int(kind, value, text)
}

fn parse_float(kind: FloatKind, text: &str) -> Result<Value> {
    let format = ValueFormat::Float(kind);
    let body = text.strip_suffix(['f', 'F']).unwrap_or(text);
    let value = body
        .parse::<f64>()
        .map_err(|e| invalid(&format, text, e.to_string()))?;
    check_float(kind, value, text)
}

fn parse_bool(text: &str) -> Result<Value> {
    if text.eq_ignore_ascii_case("true") {
        Ok(Value::Bool(true))
    } else if text.eq_ignore_ascii_case("false") {
        Ok(Value::Bool(false))
    } else {
        Err(invalid(
            &ValueFormat::Bool,
            text,
            "expected true or false".to_string(),
        ))
    }
}

fn parse_enum(def: &EnumDef, text: &str) -> Result<Value> {
    if let Some(member) = def.member(text) {
        return Ok(Value::Enum(member.name.clone()));
    }
    if let Some(member) = text
        .strip_prefix(def.name.as_str())
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|name| def.member(name))
    {
        return Ok(Value::Enum(member.name.clone()));
    }
    if let Some(member) = text
        .parse::<i64>()
        .ok()
        .and_then(|n| def.member_by_number(n))
    {
        return Ok(Value::Enum(member.name.clone()));
    }
    Err(invalid(
        &ValueFormat::Enum(def.name.clone()),
        text,
        format!("'{}' has no such member", def.name),
    ))
}

/// Split `{a, {b, c}, d}` into its top-level items.
fn split_brace_list<'a>(text: &'a str, what: &str) -> Result<Vec<&'a str>> {
    let inner = text
        .trim()
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| SchemaError::InvalidValue {
            format: what.to_string(),
            text: text.to_string(),
            detail: "expected a brace-enclosed list".to_string(),
        })?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1).ok_or_else(|| SchemaError::InvalidValue {
                    format: what.to_string(),
                    text: text.to_string(),
                    detail: "unbalanced braces".to_string(),
                })?;
            }
            ',' if depth == 0 => {
                items.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(SchemaError::InvalidValue {
            format: what.to_string(),
            text: text.to_string(),
            detail: "unbalanced braces".to_string(),
        });
    }
    items.push(inner[start..].trim());
    Ok(items)
}
