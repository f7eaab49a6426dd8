//! C literal rendering for knob values.

use knob_core::{FloatKind, IntKind, Scalar, Schema, Value, ValueFormat};
use uuid::Uuid;

use crate::dialect::Dialect;
use crate::error::{CodegenError, Result};

/// Render `value` as a C initializer for `format`.
///
/// Integers are decimal (64-bit widths carry `LL`/`ULL`), `float` carries an
/// `f` suffix, enums render as `Enum_Member`, and structs and arrays as
/// positional brace lists.
pub fn render_value(
    schema: &Schema,
    format: &ValueFormat,
    value: &Value,
    dialect: &dyn Dialect,
) -> Result<String> {
    match (format, value) {
        (ValueFormat::Int(kind), Value::Int(v)) => Ok(render_int(*kind, *v)),
        (ValueFormat::Float(kind), Value::Float(v)) => Ok(render_float(*kind, *v)),
        (ValueFormat::Float(kind), Value::Int(v)) => Ok(render_float(*kind, *v as f64)),
        (ValueFormat::Bool, Value::Bool(b)) => Ok(dialect.literal(*b).to_string()),
        (ValueFormat::Enum(name), Value::Enum(member)) => {
            let def = schema
                .find_enum(name)
                .ok_or_else(|| mismatch(format, value))?;
            if def.member(member).is_none() {
                return Err(mismatch(format, value));
            }
            Ok(def.member_ident(member))
        }
        (ValueFormat::Struct(name), Value::Struct(items)) => {
            let def = schema
                .find_struct(name)
                .ok_or_else(|| mismatch(format, value))?;
            if def.members.len() != items.len() {
                return Err(mismatch(format, value));
            }
            let mut parts = Vec::with_capacity(items.len());
            for (member, item) in def.members.iter().zip(items) {
                let text = match item {
                    Value::Array(elements) if member.count > 1 => {
                        if elements.len() != member.count as usize {
                            return Err(mismatch(format, value));
                        }
                        let rendered = elements
                            .iter()
                            .map(|e| render_value(schema, &member.format, e, dialect))
                            .collect::<Result<Vec<_>>>()?;
                        format!("{{{}}}", rendered.join(","))
                    }
                    _ if member.count == 1 => render_value(schema, &member.format, item, dialect)?,
                    _ => return Err(mismatch(format, value)),
                };
                parts.push(text);
            }
            Ok(format!("{{{}}}", parts.join(",")))
        }
        _ => Err(mismatch(format, value)),
    }
}

/// Render a numeric bound for a leaf of `format`.
pub fn render_scalar(format: &ValueFormat, scalar: Scalar) -> String {
    match (format, scalar) {
        (ValueFormat::Int(kind), Scalar::Int(v)) => render_int(*kind, v),
        (ValueFormat::Float(kind), Scalar::Float(v)) => render_float(*kind, v),
        (ValueFormat::Float(kind), Scalar::Int(v)) => render_float(*kind, v as f64),
        (_, other) => other.to_string(),
    }
}

/// GUID initializer `{0xd1,0xd2,0xd3,{0xb0,...,0xb7}}`.
pub fn guid_literal(id: &Uuid) -> String {
    let (d1, d2, d3, d4) = id.as_fields();
    let tail: Vec<String> = d4.iter().map(|b| format!("{b:#x}")).collect();
    format!("{{{d1:#x},{d2:#x},{d3:#x},{{{}}}}}", tail.join(","))
}

fn render_int(kind: IntKind, v: i128) -> String {
    match kind {
        IntKind::U64 => format!("{v}ULL"),
        IntKind::I64 => format!("{v}LL"),
        _ => v.to_string(),
    }
}

fn render_float(kind: FloatKind, v: f64) -> String {
    match kind {
        FloatKind::F32 => format!("{v:?}f"),
        FloatKind::F64 => format!("{v:?}"),
    }
}

fn mismatch(format: &ValueFormat, value: &Value) -> CodegenError {
    CodegenError::ValueMismatch {
        format: format.to_string(),
        value: value.to_string(),
    }
}
