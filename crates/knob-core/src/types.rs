//! Value formats and values.
//!
//! A [`ValueFormat`] names the storage type of a knob, struct member, or
//! sub-knob. Builtin formats map one-to-one onto fixed-width C types; enum
//! and struct formats refer to schema definitions by name.

use std::fmt;

/// Fixed-width integer formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntKind {
    /// All integer kinds, narrowest signed first.
    pub const ALL: [IntKind; 8] = [
        IntKind::I8,
        IntKind::I16,
        IntKind::I32,
        IntKind::I64,
        IntKind::U8,
        IntKind::U16,
        IntKind::U32,
        IntKind::U64,
    ];

    /// Canonical C type name (`<stdint.h>` spelling).
    pub fn c_type(&self) -> &'static str {
        match self {
            IntKind::I8 => "int8_t",
            IntKind::I16 => "int16_t",
            IntKind::I32 => "int32_t",
            IntKind::I64 => "int64_t",
            IntKind::U8 => "uint8_t",
            IntKind::U16 => "uint16_t",
            IntKind::U32 => "uint32_t",
            IntKind::U64 => "uint64_t",
        }
    }

    /// Storage size in bytes.
    pub fn size_bytes(&self) -> u64 {
        match self {
            IntKind::I8 | IntKind::U8 => 1,
            IntKind::I16 | IntKind::U16 => 2,
            IntKind::I32 | IntKind::U32 => 4,
            IntKind::I64 | IntKind::U64 => 8,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, IntKind::I8 | IntKind::I16 | IntKind::I32 | IntKind::I64)
    }

    /// Smallest representable value.
    pub fn min(&self) -> i128 {
        if self.is_signed() {
            -(1i128 << (self.size_bytes() * 8 - 1))
        } else {
            0
        }
    }

    /// Largest representable value.
    pub fn max(&self) -> i128 {
        if self.is_signed() {
            (1i128 << (self.size_bytes() * 8 - 1)) - 1
        } else {
            (1i128 << (self.size_bytes() * 8)) - 1
        }
    }

    fn from_c_type(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.c_type() == name)
    }
}

/// IEEE 754 floating-point formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    F32,
    F64,
}

impl FloatKind {
    pub fn c_type(&self) -> &'static str {
        match self {
            FloatKind::F32 => "float",
            FloatKind::F64 => "double",
        }
    }

    pub fn size_bytes(&self) -> u64 {
        match self {
            FloatKind::F32 => 4,
            FloatKind::F64 => 8,
        }
    }

    pub fn max(&self) -> f64 {
        match self {
            FloatKind::F32 => f32::MAX as f64,
            FloatKind::F64 => f64::MAX,
        }
    }
}

/// The storage format of a knob, member, or sub-knob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueFormat {
    Int(IntKind),
    Float(FloatKind),
    Bool,
    /// Reference to a schema enum by name.
    Enum(String),
    /// Reference to a schema struct by name.
    Struct(String),
}

impl ValueFormat {
    /// Resolve a builtin format name (`uint8_t`, `bool`, `double`, ...).
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(ValueFormat::Bool),
            "float" => Some(ValueFormat::Float(FloatKind::F32)),
            "double" => Some(ValueFormat::Float(FloatKind::F64)),
            other => IntKind::from_c_type(other).map(ValueFormat::Int),
        }
    }

    /// Canonical (generic dialect) C type name.
    pub fn canonical_type(&self) -> &str {
        match self {
            ValueFormat::Int(kind) => kind.c_type(),
            ValueFormat::Float(kind) => kind.c_type(),
            ValueFormat::Bool => "bool",
            ValueFormat::Enum(name) | ValueFormat::Struct(name) => name,
        }
    }

    /// The format's natural inclusive range. `None` for formats without an
    /// ordering (booleans, enums, structs).
    pub fn natural_bounds(&self) -> Option<Bounds> {
        match self {
            ValueFormat::Int(kind) => Some(Bounds {
                min: Scalar::Int(kind.min()),
                max: Scalar::Int(kind.max()),
            }),
            ValueFormat::Float(kind) => Some(Bounds {
                min: Scalar::Float(-kind.max()),
                max: Scalar::Float(kind.max()),
            }),
            ValueFormat::Bool | ValueFormat::Enum(_) | ValueFormat::Struct(_) => None,
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, ValueFormat::Enum(_))
    }
}

impl fmt::Display for ValueFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_type())
    }
}

/// A numeric bound value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i128),
    Float(f64),
}

impl Scalar {
    fn as_f64(&self) -> f64 {
        match self {
            Scalar::Int(v) => *v as f64,
            Scalar::Float(v) => *v,
        }
    }

    /// Numeric `<=` across integer and float scalars.
    pub fn at_most(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => a <= b,
            (a, b) => a.as_f64() <= b.as_f64(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v:?}"),
        }
    }
}

/// An inclusive `[min, max]` range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Scalar,
    pub max: Scalar,
}

impl Bounds {
    pub fn contains(&self, value: &Scalar) -> bool {
        self.min.at_most(value) && value.at_most(&self.max)
    }
}

/// A concrete knob or member value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i128),
    Float(f64),
    Bool(bool),
    /// Enum member, by member name.
    Enum(String),
    /// Struct members in declaration order.
    Struct(Vec<Value>),
    /// Elements of a repeated struct member.
    Array(Vec<Value>),
}

impl Value {
    /// The numeric view of a scalar value.
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Value::Int(v) => Some(Scalar::Int(*v)),
            Value::Float(v) => Some(Scalar::Float(*v)),
            _ => None,
        }
    }
}

/// Renders the value in the text form accepted by
/// [`Schema::parse_value`](crate::Schema::parse_value).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Enum(member) => write!(f, "{member}"),
            Value::Struct(items) | Value::Array(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_ranges() {
        assert_eq!(IntKind::U8.max(), 255);
        assert_eq!(IntKind::I8.min(), -128);
        assert_eq!(IntKind::I8.max(), 127);
        assert_eq!(IntKind::U64.max(), u64::MAX as i128);
        assert_eq!(IntKind::I64.min(), i64::MIN as i128);
        assert_eq!(IntKind::U16.min(), 0);
    }

    #[test]
    fn builtin_names() {
        assert_eq!(
            ValueFormat::builtin("uint16_t"),
            Some(ValueFormat::Int(IntKind::U16))
        );
        assert_eq!(ValueFormat::builtin("bool"), Some(ValueFormat::Bool));
        assert_eq!(
            ValueFormat::builtin("double"),
            Some(ValueFormat::Float(FloatKind::F64))
        );
        assert_eq!(ValueFormat::builtin("FanMode"), None);
    }

    #[test]
    fn bounds_are_inclusive() {
        let b = Bounds {
            min: Scalar::Int(0),
            max: Scalar::Int(300),
        };
        assert!(b.contains(&Scalar::Int(0)));
        assert!(b.contains(&Scalar::Int(300)));
        assert!(!b.contains(&Scalar::Int(301)));
        assert!(!b.contains(&Scalar::Int(-1)));
    }

    #[test]
    fn display_brace_lists() {
        let v = Value::Struct(vec![
            Value::Int(1),
            Value::Array(vec![Value::Bool(true), Value::Bool(false)]),
            Value::Enum("Quiet".into()),
        ]);
        assert_eq!(v.to_string(), "{1,{true,false},Quiet}");
    }
}
