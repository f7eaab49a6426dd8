//! Dialect policy: every spelling, spacing, and macro-syntax decision.
//!
//! Emitters never branch on the dialect themselves. They ask the
//! [`Dialect`] for type names, literals, indentation, line endings, guards,
//! assertions, and identifier renames, so a new dialect only needs a new
//! implementation of this trait.

use std::fmt;

/// A fixed bundle of naming and formatting conventions.
pub trait Dialect: Send + Sync {
    /// Which dialect this is (for logging and provenance).
    fn kind(&self) -> DialectKind;

    /// Map a canonical C type name (`uint32_t`, `bool`, `void*`, `const`,
    /// `config_guid_t`, ...) to this dialect's spelling.
    fn type_name<'a>(&self, canonical: &'a str) -> &'a str;

    /// Boolean literal.
    fn literal(&self, value: bool) -> &'static str;

    /// Leading whitespace for the given nesting depth.
    fn indent(&self, depth: usize) -> String;

    fn line_ending(&self) -> &'static str;

    /// Include-guard text for a header named `name`. The opening form is
    /// written first in the file, the closing form last. Each includes its
    /// own line endings.
    fn include_guard(&self, name: &str, opening: bool) -> String;

    /// A compile-time assertion statement, without line ending.
    fn assertion(&self, condition: &str, message: &str) -> String;

    /// Rename a generic-style identifier (`snake_case`, `_t` type suffix).
    fn rename(&self, identifier: &str, is_type_name: bool) -> String;

    /// Headers the declaration artifact includes first.
    fn includes(&self) -> &'static [&'static str];

    /// Lines defining the assertion macro, when the environment lacks one.
    fn assertion_macro(&self) -> Option<&'static [&'static str]>;

    /// Whether generated code exposes knob setters.
    fn supports_set(&self) -> bool;

    /// Whether the GUID type must be declared by the generated header.
    fn declares_guid_type(&self) -> bool;
}

/// The available dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DialectKind {
    /// `<stdint.h>` types, 4-space indent, LF, `#pragma once`, `C_ASSERT`.
    #[default]
    Generic,
    /// Firmware types (`UINT32`, `BOOLEAN`), 2-space indent, CRLF,
    /// `#ifndef` guards, `STATIC_ASSERT`, CamelCase functions.
    Firmware,
}

impl DialectKind {
    /// The policy implementing this dialect.
    pub fn policy(&self) -> &'static dyn Dialect {
        match self {
            DialectKind::Generic => &Generic,
            DialectKind::Firmware => &Firmware,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "generic" | "c" | "stdlib" => Some(Self::Generic),
            "firmware" | "efi" | "uefi" => Some(Self::Firmware),
            _ => None,
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => write!(f, "generic"),
            Self::Firmware => write!(f, "firmware"),
        }
    }
}

/// Standard C dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Generic;

impl Dialect for Generic {
    fn kind(&self) -> DialectKind {
        DialectKind::Generic
    }

    fn type_name<'a>(&self, canonical: &'a str) -> &'a str {
        canonical
    }

    fn literal(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    fn indent(&self, depth: usize) -> String {
        "    ".repeat(depth)
    }

    fn line_ending(&self) -> &'static str {
        "\n"
    }

    fn include_guard(&self, _name: &str, opening: bool) -> String {
        if opening {
            format!("#pragma once{}", self.line_ending())
        } else {
            String::new()
        }
    }

    fn assertion(&self, condition: &str, _message: &str) -> String {
        format!("C_ASSERT({condition});")
    }

    fn rename(&self, identifier: &str, _is_type_name: bool) -> String {
        identifier.to_string()
    }

    fn includes(&self) -> &'static [&'static str] {
        &["stdint.h", "stddef.h", "stdbool.h"]
    }

    fn assertion_macro(&self) -> Option<&'static [&'static str]> {
        Some(&[
            "#ifndef C_ASSERT",
            "// Statically verify an expression",
            "#define C_ASSERT(e) typedef char __C_ASSERT__[(e)?1:-1]",
            "#endif",
        ])
    }

    fn supports_set(&self) -> bool {
        true
    }

    fn declares_guid_type(&self) -> bool {
        true
    }
}

/// Firmware (UEFI-style) dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Firmware;

impl Dialect for Firmware {
    fn kind(&self) -> DialectKind {
        DialectKind::Firmware
    }

    fn type_name<'a>(&self, canonical: &'a str) -> &'a str {
        match canonical {
            "int8_t" => "INT8",
            "int16_t" => "INT16",
            "int32_t" => "INT32",
            "int64_t" => "INT64",
            "uint8_t" => "UINT8",
            "uint16_t" => "UINT16",
            "uint32_t" => "UINT32",
            "uint64_t" => "UINT64",
            "bool" => "BOOLEAN",
            "size_t" => "UINTN",
            "int" => "INTN",
            "const" => "CONST",
            "void*" => "VOID *",
            "char*" => "CHAR8 *",
            "config_guid_t" => "EFI_GUID",
            "void" => "VOID",
            other => other,
        }
    }

    fn literal(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    fn indent(&self, depth: usize) -> String {
        "  ".repeat(depth)
    }

    fn line_ending(&self) -> &'static str {
        "\r\n"
    }

    fn include_guard(&self, name: &str, opening: bool) -> String {
        let guard = guard_macro(name);
        let le = self.line_ending();
        if opening {
            format!("#ifndef {guard}{le}#define {guard}{le}")
        } else {
            format!("#endif // {guard}{le}")
        }
    }

    fn assertion(&self, condition: &str, message: &str) -> String {
        format!("STATIC_ASSERT({condition}, {message});")
    }

    fn rename(&self, identifier: &str, is_type_name: bool) -> String {
        if is_type_name {
            identifier
                .strip_suffix("_t")
                .unwrap_or(identifier)
                .to_uppercase()
        } else {
            upper_camel(identifier)
        }
    }

    fn includes(&self) -> &'static [&'static str] {
        &["Uefi.h"]
    }

    fn assertion_macro(&self) -> Option<&'static [&'static str]> {
        None
    }

    fn supports_set(&self) -> bool {
        false
    }

    fn declares_guid_type(&self) -> bool {
        false
    }
}

/// `config_data.h` → `CONFIG_DATA_H`.
fn guard_macro(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// `_get_knob_value` → `GetKnobValue`; `config_get_` → `ConfigGet`.
fn upper_camel(identifier: &str) -> String {
    let trimmed = identifier.strip_prefix('_').unwrap_or(identifier);
    let trimmed = trimmed.strip_suffix('_').unwrap_or(trimmed);
    let mut out = String::with_capacity(trimmed.len());
    let mut capitalize = true;
    for c in trimmed.chars() {
        if c == '_' {
            capitalize = true;
        } else if capitalize {
            out.push(c.to_ascii_uppercase());
            capitalize = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_is_identity() {
        let d = DialectKind::Generic.policy();
        assert_eq!(d.type_name("uint32_t"), "uint32_t");
        assert_eq!(d.rename("knob_t", true), "knob_t");
        assert_eq!(d.rename("_knob_default_values", false), "_knob_default_values");
        assert_eq!(d.literal(false), "false");
        assert_eq!(d.indent(2), "        ");
        assert_eq!(d.line_ending(), "\n");
    }

    #[test]
    fn firmware_types_and_literals() {
        let d = DialectKind::Firmware.policy();
        assert_eq!(d.type_name("uint32_t"), "UINT32");
        assert_eq!(d.type_name("bool"), "BOOLEAN");
        assert_eq!(d.type_name("void*"), "VOID *");
        assert_eq!(d.type_name("FanMode"), "FanMode");
        assert_eq!(d.literal(true), "TRUE");
        assert_eq!(d.indent(2), "    ");
        assert_eq!(d.line_ending(), "\r\n");
    }

    #[test]
    fn firmware_renames() {
        let d = Firmware;
        assert_eq!(d.rename("knob_t", true), "KNOB");
        assert_eq!(d.rename("knob_statistics_t", true), "KNOB_STATISTICS");
        assert_eq!(d.rename("knob_validation_fn*", true), "KNOB_VALIDATION_FN*");
        assert_eq!(d.rename("config_get_", false), "ConfigGet");
        assert_eq!(d.rename("_knob_default_values", false), "KnobDefaultValues");
        assert_eq!(d.rename("validate_enum_value_", false), "ValidateEnumValue");
        assert_eq!(d.rename("value", false), "Value");
    }

    #[test]
    fn guards() {
        assert_eq!(Generic.include_guard("config.h", true), "#pragma once\n");
        assert_eq!(Generic.include_guard("config.h", false), "");
        assert_eq!(
            Firmware.include_guard("ConfigData.h", true),
            "#ifndef CONFIGDATA_H\r\n#define CONFIGDATA_H\r\n"
        );
        assert_eq!(
            Firmware.include_guard("ConfigData.h", false),
            "#endif // CONFIGDATA_H\r\n"
        );
    }

    #[test]
    fn assertions() {
        assert_eq!(
            Generic.assertion("sizeof(A) == 4", "\"msg\""),
            "C_ASSERT(sizeof(A) == 4);"
        );
        assert_eq!(
            Firmware.assertion("sizeof(A) == 4", "\"msg\""),
            "STATIC_ASSERT(sizeof(A) == 4, \"msg\");"
        );
    }

    #[test]
    fn parse_kind() {
        assert_eq!(DialectKind::parse("EFI"), Some(DialectKind::Firmware));
        assert_eq!(DialectKind::parse("generic"), Some(DialectKind::Generic));
        assert_eq!(DialectKind::parse("rust"), None);
    }
}
