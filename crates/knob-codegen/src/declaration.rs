//! Public header: enums, structs, knob accessors, and runtime table types.

use knob_core::{EnumDef, Knob, Schema, StructDef};

use crate::config::CodegenConfig;
use crate::dialect::Dialect;
use crate::error::{CodegenError, Result};
use crate::literal::render_scalar;
use crate::naming::Naming;
use crate::writer::HeaderWriter;

/// Width-forcing padding value for an enum.
///
/// `0x7fffffff` keeps a signed domain representable when any member is
/// negative; otherwise `0xffffffff` pins an unsigned 32-bit backing type.
pub fn enum_padding(def: &EnumDef) -> u32 {
    if def.has_negative() {
        0x7fff_ffff
    } else {
        0xffff_ffff
    }
}

/// Reject members the 4-byte backing integer cannot hold: `int32_t` when
/// any member is negative, `uint32_t` otherwise.
pub fn check_enum_domain(def: &EnumDef) -> Result<()> {
    let (low, high, domain) = if def.has_negative() {
        (i64::from(i32::MIN), i64::from(i32::MAX), "int32_t")
    } else {
        (0, i64::from(u32::MAX), "uint32_t")
    };
    match def.values.iter().find(|v| v.number < low || v.number > high) {
        Some(value) => Err(CodegenError::EnumOutOfRange {
            name: def.name.clone(),
            member: value.name.clone(),
            number: value.number,
            domain,
        }),
        None => Ok(()),
    }
}

/// Produce the public declaration header.
pub fn emit_declarations(
    schema: &Schema,
    dialect: &dyn Dialect,
    config: &CodegenConfig,
    file_name: &str,
) -> Result<String> {
    let naming = Naming::new(dialect);
    let mut w = HeaderWriter::new(dialect);

    w.raw(&dialect.include_guard(file_name, true));
    for header in dialect.includes() {
        w.line(0, format!("#include <{header}>"));
    }
    w.provenance(&config.script, &schema.source);
    w.blank();

    if let Some(lines) = dialect.assertion_macro() {
        for line in lines {
            w.line(0, line);
        }
        w.blank();
    }

    w.line(0, "#pragma pack(push, 1)");
    w.blank();

    if !schema.enums.is_empty() {
        w.line(0, "// Schema-defined enums");
        for def in &schema.enums {
            write_enum(&mut w, def)?;
        }
    }

    if !schema.structs.is_empty() {
        w.line(0, "// Schema-defined structures");
        for def in &schema.structs {
            write_struct(&mut w, schema, def)?;
        }
    }

    if !schema.knobs.is_empty() {
        w.line(0, "// Schema-defined knobs");
        for knob in &schema.knobs {
            write_knob_accessors(&mut w, &naming, knob);
        }
    }

    write_runtime_types(&mut w, schema, &naming);

    w.line(0, "#pragma pack(pop)");
    w.blank();
    w.raw(&dialect.include_guard(file_name, false));

    tracing::debug!(
        enums = schema.enums.len(),
        structs = schema.structs.len(),
        knobs = schema.knobs.len(),
        dialect = %dialect.kind(),
        "emitted declarations"
    );
    Ok(w.finish())
}

fn write_enum(w: &mut HeaderWriter<'_>, def: &EnumDef) -> Result<()> {
    let dialect = w.dialect();
    check_enum_domain(def)?;
    let padding = enum_padding(def);
    if let Some(collision) = def
        .values
        .iter()
        .find(|v| v.number == i64::from(padding))
    {
        return Err(CodegenError::PaddingCollision {
            name: def.name.clone(),
            member: collision.name.clone(),
            padding,
        });
    }

    if let Some(help) = &def.help {
        w.comment(0, help);
    }
    w.line(0, "typedef enum {");
    for value in &def.values {
        let entry = format!("{} = {},", def.member_ident(&value.name), value.number);
        match &value.help {
            Some(help) => w.line(1, format!("{entry} // {}", one_line(help))),
            None => w.line(1, entry),
        }
    }
    w.line(
        1,
        format!("_{}_PADDING = {padding:#x} // Force packing to int size", def.name),
    );
    w.line(0, format!("}} {};", def.name));
    w.blank();
    w.line(
        0,
        dialect.assertion(
            &format!(
                "sizeof({}) == sizeof({})",
                def.name,
                dialect.type_name("uint32_t")
            ),
            "\"enum must be unsigned 32 bit int\"",
        ),
    );
    w.blank();
    Ok(())
}

fn write_struct(w: &mut HeaderWriter<'_>, schema: &Schema, def: &StructDef) -> Result<()> {
    let dialect = w.dialect();
    let size = schema.struct_size(def)?;

    if let Some(help) = &def.help {
        w.comment(0, help);
    }
    w.line(0, "typedef struct {");
    for member in &def.members {
        if let Some(help) = &member.help {
            w.comment(1, help);
        }
        let ty = dialect.type_name(member.format.canonical_type());
        if member.count == 1 {
            w.line(1, format!("{ty} {};", member.name));
        } else {
            w.line(1, format!("{ty} {}[{}];", member.name, member.count));
        }
    }
    w.line(0, format!("}} {};", def.name));
    w.blank();
    w.line(
        0,
        dialect.assertion(
            &format!("sizeof({}) == {size}", def.name),
            "\"structure size must be consistent\"",
        ),
    );
    w.blank();
    Ok(())
}

fn write_knob_accessors(w: &mut HeaderWriter<'_>, naming: &Naming, knob: &Knob) {
    let dialect = w.dialect();
    let ty = dialect.type_name(knob.format.canonical_type());

    w.line(0, format!("// {} knob", knob.name));
    if let Some(help) = &knob.help {
        w.comment(0, help);
    }
    w.blank();

    let mut any_bound = false;
    for leaf in knob.leaves() {
        let define = leaf.define_name();
        if let Some(min) = leaf.narrowed_min() {
            w.line(
                0,
                format!(
                    "#define {} {}",
                    naming.bound_define(&define, false),
                    render_scalar(&leaf.format, min)
                ),
            );
            any_bound = true;
        }
        if let Some(max) = leaf.narrowed_max() {
            w.line(
                0,
                format!(
                    "#define {} {}",
                    naming.bound_define(&define, true),
                    render_scalar(&leaf.format, max)
                ),
            );
            any_bound = true;
        }
    }
    if any_bound {
        w.blank();
    }

    w.line(0, format!("// Get the current value of the {} knob", knob.name));
    w.line(0, format!("{ty} {}{}();", naming.getter_prefix, knob.name));
    w.blank();

    if dialect.supports_set() {
        w.line(0, "#ifdef CONFIG_SET_VARIABLES");
        w.line(0, format!("// Set the current value of the {} knob", knob.name));
        w.line(
            0,
            format!(
                "{} {}{}({ty} {});",
                dialect.type_name("bool"),
                naming.setter_prefix,
                knob.name,
                naming.value
            ),
        );
        w.line(0, "#endif // CONFIG_SET_VARIABLES");
        w.blank();
    }
}

fn write_runtime_types(w: &mut HeaderWriter<'_>, schema: &Schema, naming: &Naming) {
    let dialect = w.dialect();
    let field = |canonical: &str, name: &str| {
        format!("{} {};", dialect.type_name(canonical), dialect.rename(name, false))
    };

    w.line(0, "typedef enum {");
    for knob in &schema.knobs {
        w.line(1, format!("{},", naming.knob_id(&knob.name)));
    }
    w.line(1, naming.knob_max());
    w.line(0, format!("}} {};", naming.knob_type));
    w.blank();

    if dialect.declares_guid_type() {
        w.line(0, "typedef struct {");
        w.line(1, "uint32_t Data1;");
        w.line(1, "uint16_t Data2;");
        w.line(1, "uint16_t Data3;");
        w.line(1, "uint8_t Data4[8];");
        w.line(0, format!("}} {};", naming.guid_type));
        w.blank();
    }

    w.line(0, "typedef struct {");
    w.line(1, field("int", "get_count"));
    w.line(1, field("int", "set_count"));
    w.line(0, format!("}} {};", naming.statistics_type));
    w.blank();

    w.line(
        0,
        format!(
            "typedef {} ({})({} {});",
            dialect.type_name("bool"),
            naming.validation_fn_type,
            dialect.type_name("const"),
            dialect.type_name("void*")
        ),
    );
    w.blank();

    let konst = dialect.type_name("const");
    w.line(0, "typedef struct {");
    w.line(1, format!("{} {};", naming.knob_type, naming.knob));
    w.line(1, format!("{konst} {}", field("void*", "default_value_address")));
    w.line(1, field("void*", "cache_value_address"));
    w.line(1, field("size_t", "value_size"));
    w.line(1, format!("{konst} {}", field("char*", "name")));
    w.line(1, field("size_t", "name_size"));
    w.line(1, field("config_guid_t", "vendor_namespace"));
    w.line(1, field("int", "attributes"));
    w.line(
        1,
        format!(
            "{} {};",
            naming.statistics_type,
            dialect.rename("statistics", false)
        ),
    );
    w.line(
        1,
        format!(
            "{}* {};",
            naming.validation_fn_type,
            dialect.rename("validator", false)
        ),
    );
    w.line(0, format!("}} {};", naming.data_type));
    w.blank();

    w.line(0, "typedef struct {");
    w.line(1, format!("{} {};", naming.knob_type, naming.knob));
    w.line(1, field("void*", "value"));
    w.line(0, format!("}} {};", naming.override_type));
    w.blank();

    w.line(0, "typedef struct {");
    w.line(1, format!("{}* {};", naming.override_type, naming.overrides));
    w.line(1, field("size_t", "override_count"));
    w.line(0, format!("}} {};", naming.profile_type));
    w.blank();
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Firmware, Generic};

    fn schema() -> Schema {
        Schema::parse_toml(
            r#"
[[enums]]
name = "FanMode"
help = "Fan behavior"
values = [
    { name = "Quiet", number = 0, help = "Lowest noise" },
    { name = "Turbo", number = 2 },
]

[[enums]]
name = "Offset"
values = [{ name = "Down", number = -1 }, { name = "Up", number = 1 }]

[[structs]]
name = "FanPoint"
members = [
    { name = "temp", format = "uint8_t", max = 100 },
    { name = "duty", format = "uint16_t", count = 2 },
]

[[knobs]]
name = "power_limit_watts"
help = "Package power limit"
namespace = "8c7a7f4e-3b9b-4f25-9a52-5d9e0d3a4c11"
format = "uint16_t"
default = 250
max = 300

[[knobs]]
name = "curve"
namespace = "8c7a7f4e-3b9b-4f25-9a52-5d9e0d3a4c11"
format = "FanPoint"
"#,
            "demo.toml",
        )
        .unwrap()
    }

    fn generic() -> String {
        emit_declarations(&schema(), &Generic, &CodegenConfig::default(), "config.h").unwrap()
    }

    #[test]
    fn enum_padding_and_assertion() {
        let out = generic();
        assert!(out.contains("    FanMode_Quiet = 0, // Lowest noise\n"));
        assert!(out.contains("    _FanMode_PADDING = 0xffffffff // Force packing to int size\n"));
        assert!(out.contains("    _Offset_PADDING = 0x7fffffff // Force packing to int size\n"));
        assert!(out.contains("C_ASSERT(sizeof(FanMode) == sizeof(uint32_t));"));
    }

    #[test]
    fn struct_layout_and_size() {
        let out = generic();
        assert!(out.contains("    uint16_t duty[2];\n"));
        assert!(out.contains("C_ASSERT(sizeof(FanPoint) == 5);"));
    }

    #[test]
    fn knob_bounds_and_accessors() {
        let out = generic();
        assert!(out.contains("#define KNOB__power_limit_watts__MAX 300\n"));
        assert!(!out.contains("KNOB__power_limit_watts__MIN"));
        assert!(out.contains("#define KNOB__curve__temp__MAX 100\n"));
        assert!(out.contains("uint16_t config_get_power_limit_watts();"));
        assert!(out.contains("bool config_set_power_limit_watts(uint16_t value);"));
        assert!(out.contains("    KNOB_curve,\n    KNOB_MAX\n} knob_t;"));
    }

    #[test]
    fn generic_prelude() {
        let out = generic();
        assert!(out.starts_with("#pragma once\n#include <stdint.h>\n"));
        assert!(out.contains("#define C_ASSERT(e) typedef char __C_ASSERT__[(e)?1:-1]"));
        assert!(out.contains("} config_guid_t;"));
        assert!(out.contains("    knob_validation_fn* validator;\n"));
        assert!(out.ends_with("#pragma pack(pop)\n\n"));
    }

    #[test]
    fn firmware_spelling() {
        let out =
            emit_declarations(&schema(), &Firmware, &CodegenConfig::default(), "ConfigData.h")
                .unwrap();
        assert!(out.starts_with("#ifndef CONFIGDATA_H\r\n#define CONFIGDATA_H\r\n"));
        assert!(out.contains("#include <Uefi.h>\r\n"));
        assert!(out.contains(
            "STATIC_ASSERT(sizeof(FanMode) == sizeof(UINT32), \"enum must be unsigned 32 bit int\");"
        ));
        assert!(out.contains("  UINT16 duty[2];\r\n"));
        assert!(out.contains("UINT16 ConfigGetpower_limit_watts();"));
        assert!(!out.contains("CONFIG_SET_VARIABLES"));
        assert!(!out.contains("config_guid_t"));
        assert!(out.contains("  CONST VOID * DefaultValueAddress;\r\n"));
        assert!(out.contains("typedef BOOLEAN (KNOB_VALIDATION_FN)(CONST VOID *);"));
        assert!(out.contains("} KNOB_DATA;"));
        assert!(out.ends_with("#endif // CONFIGDATA_H\r\n"));
        assert!(!out.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn enum_members_must_fit_32_bits() {
        let mut schema = schema();
        schema.enums[0].values[1].number = 5_000_000_000;
        let err =
            emit_declarations(&schema, &Generic, &CodegenConfig::default(), "c.h").unwrap_err();
        assert!(matches!(
            err,
            CodegenError::EnumOutOfRange { domain: "uint32_t", .. }
        ));

        // A negative member narrows the domain to int32_t.
        let mut schema = self::schema();
        schema.enums[1].values[1].number = 0x8000_0000;
        let err =
            emit_declarations(&schema, &Generic, &CodegenConfig::default(), "c.h").unwrap_err();
        assert!(matches!(
            err,
            CodegenError::EnumOutOfRange { domain: "int32_t", .. }
        ));

        let mut schema = self::schema();
        schema.enums[0].values[1].number = i64::from(u32::MAX) - 1;
        assert!(emit_declarations(&schema, &Generic, &CodegenConfig::default(), "c.h").is_ok());
    }

    #[test]
    fn padding_collision_rejected() {
        let mut schema = schema();
        schema.enums[0].values[1].number = 0xffff_ffff;
        let err =
            emit_declarations(&schema, &Generic, &CodegenConfig::default(), "c.h").unwrap_err();
        assert!(matches!(err, CodegenError::PaddingCollision { .. }));
    }
}
