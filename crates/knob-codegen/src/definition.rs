//! Service header: value tables, validators, the knob descriptor table, and
//! accessor bodies.
//!
//! Must be included after the public header produced by
//! [`emit_declarations`](crate::declaration::emit_declarations) for the same
//! schema and dialect.

use knob_core::{Knob, Schema};

use crate::config::CodegenConfig;
use crate::declaration::check_enum_domain;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::literal::{guid_literal, render_value};
use crate::naming::Naming;
use crate::validator::{ContentValidator, EnumStrategy, EnumValidator, LeafCheck};
use crate::writer::HeaderWriter;

/// Attribute flags stored in every descriptor: non-volatile, boot-service
/// and runtime access.
pub const KNOB_ATTRIBUTES: u32 = 0x7;

/// Produce the service (definition) header.
pub fn emit_definitions(
    schema: &Schema,
    dialect: &dyn Dialect,
    config: &CodegenConfig,
    file_name: &str,
) -> Result<String> {
    let naming = Naming::new(dialect);
    let mut w = HeaderWriter::new(dialect);

    w.raw(&dialect.include_guard(file_name, true));
    w.line(0, "// The config public header must be included prior to this file");
    w.provenance(&config.script, &schema.source);
    w.blank();

    if !schema.knobs.is_empty() {
        write_value_tables(&mut w, schema, &naming)?;
    }

    for def in &schema.enums {
        check_enum_domain(def)?;
        let plan = EnumValidator::plan(def, config.sparse_slack)?;
        write_enum_validator(&mut w, &naming, &plan);
    }

    write_no_constraints(&mut w, &naming);
    for knob in &schema.knobs {
        match ContentValidator::plan(knob) {
            Some(plan) => write_content_validator(&mut w, &naming, knob, &plan),
            None => {
                w.line(
                    0,
                    format!(
                        "#define {}{} {}",
                        naming.content_validator_prefix, knob.name, naming.no_constraints_fn
                    ),
                );
                w.blank();
            }
        }
    }

    write_descriptor_table(&mut w, schema, &naming);
    write_accessors(&mut w, schema, &naming);

    w.raw(&dialect.include_guard(file_name, false));

    tracing::debug!(
        knobs = schema.knobs.len(),
        dialect = %dialect.kind(),
        "emitted definitions"
    );
    Ok(w.finish())
}

fn write_value_tables(w: &mut HeaderWriter<'_>, schema: &Schema, naming: &Naming) -> Result<()> {
    let dialect = w.dialect();

    w.line(0, "typedef struct {");
    for knob in &schema.knobs {
        w.line(
            1,
            format!(
                "{} {};",
                dialect.type_name(knob.format.canonical_type()),
                knob.name
            ),
        );
    }
    w.line(0, format!("}} {};", naming.values_type));
    w.blank();

    let mut initializers = Vec::with_capacity(schema.knobs.len());
    for knob in &schema.knobs {
        let literal = render_value(schema, &knob.format, &knob.default, dialect)?;
        initializers.push(format!(".{}={literal},", knob.name));
    }

    w.line(
        0,
        format!(
            "{} {} {} = {{",
            dialect.type_name("const"),
            naming.values_type,
            naming.defaults_var
        ),
    );
    for init in &initializers {
        w.line(1, init);
    }
    w.line(0, "};");
    w.blank();

    w.line(0, "#ifdef CONFIG_INCLUDE_CACHE");
    w.line(0, format!("{} {} = {{", naming.values_type, naming.cache_var));
    for init in &initializers {
        w.line(1, init);
    }
    w.line(0, "};");
    w.line(
        0,
        format!(
            "#define CONFIG_CACHE_ADDRESS({k}) (&{}.{k})",
            naming.cache_var,
            k = naming.knob
        ),
    );
    w.line(0, "#else // CONFIG_INCLUDE_CACHE");
    w.line(0, format!("#define CONFIG_CACHE_ADDRESS({}) (NULL)", naming.knob));
    w.line(0, "#endif // CONFIG_INCLUDE_CACHE");
    w.blank();
    Ok(())
}

fn write_enum_validator(w: &mut HeaderWriter<'_>, naming: &Naming, plan: &EnumValidator<'_>) {
    let dialect = w.dialect();
    let def = plan.def;
    let bool_ty = dialect.type_name("bool");
    let yes = dialect.literal(true);
    let no = dialect.literal(false);

    w.line(
        0,
        format!(
            "{bool_ty} {}{}({} {})",
            naming.enum_validator_prefix, def.name, def.name, naming.value
        ),
    );
    w.line(0, "{");
    match &plan.strategy {
        EnumStrategy::Exhaustive { numbers } => {
            w.line(1, format!("switch ({})", naming.value));
            w.line(1, "{");
            for number in numbers {
                if let Some(member) = def.member_by_number(*number) {
                    w.line(
                        2,
                        format!("case {}: return {yes};", def.member_ident(&member.name)),
                    );
                }
            }
            w.line(1, "}");
            w.line(1, format!("return {no};"));
        }
        EnumStrategy::Range {
            lowest,
            highest,
            gaps,
        } => {
            let numeric = &naming.numeric_value;
            let int_ty = dialect.type_name("int64_t");
            w.line(1, format!("{int_ty} {numeric} = ({int_ty}){};", naming.value));
            w.line(1, format!("if ({numeric} < {lowest}) return {no};"));
            w.line(1, format!("if ({numeric} > {highest}) return {no};"));
            for gap in gaps {
                w.line(1, format!("if ({numeric} == {gap}) return {no};"));
            }
            w.line(1, format!("return {yes};"));
        }
    }
    w.line(0, "}");
    w.blank();
}

fn write_no_constraints(w: &mut HeaderWriter<'_>, naming: &Naming) {
    let dialect = w.dialect();
    w.line(
        0,
        format!(
            "{} {}({} {} {})",
            dialect.type_name("bool"),
            naming.no_constraints_fn,
            dialect.type_name("const"),
            dialect.type_name("void*"),
            naming.buffer
        ),
    );
    w.line(0, "{");
    w.line(1, format!("({}){};", dialect.type_name("void"), naming.buffer));
    w.line(1, format!("return {};", dialect.literal(true)));
    w.line(0, "}");
    w.blank();
}

fn write_content_validator(
    w: &mut HeaderWriter<'_>,
    naming: &Naming,
    knob: &Knob,
    plan: &ContentValidator,
) {
    let dialect = w.dialect();
    let konst = dialect.type_name("const");
    let ty = dialect.type_name(knob.format.canonical_type());
    let no = dialect.literal(false);
    let value = &naming.value;

    w.line(
        0,
        format!(
            "{} {}{}({konst} {} {})",
            dialect.type_name("bool"),
            naming.content_validator_prefix,
            knob.name,
            dialect.type_name("void*"),
            naming.buffer
        ),
    );
    w.line(0, "{");
    w.line(
        1,
        format!("{konst} {ty}* {value} = ({konst} {ty}*){};", naming.buffer),
    );
    for check in &plan.checks {
        let suffix = check.path().strip_prefix(knob.name.as_str()).unwrap_or("");
        let lvalue = format!("(*{value}){suffix}");
        let line = match check {
            LeafCheck::Member { enum_name, .. } => format!(
                "if (!{}{enum_name}({lvalue})) return {no};",
                naming.enum_validator_prefix
            ),
            LeafCheck::Min { define, .. } => format!(
                "if ({lvalue} < {}) return {no};",
                naming.bound_define(define, false)
            ),
            LeafCheck::Max { define, .. } => format!(
                "if ({lvalue} > {}) return {no};",
                naming.bound_define(define, true)
            ),
        };
        w.line(1, line);
    }
    w.line(1, format!("return {};", dialect.literal(true)));
    w.line(0, "}");
    w.blank();
}

fn write_descriptor_table(w: &mut HeaderWriter<'_>, schema: &Schema, naming: &Naming) {
    let dialect = w.dialect();

    w.line(
        0,
        format!(
            "{} {}[{}] = {{",
            naming.data_type,
            naming.data_var,
            schema.knobs.len() + 1
        ),
    );
    for knob in &schema.knobs {
        w.line(1, "{");
        w.line(2, format!("{},", naming.knob_id(&knob.name)));
        w.line(2, format!("&{}.{},", naming.defaults_var, knob.name));
        w.line(2, format!("CONFIG_CACHE_ADDRESS({}),", knob.name));
        w.line(
            2,
            format!(
                "sizeof({}),",
                dialect.type_name(knob.format.canonical_type())
            ),
        );
        w.line(2, format!("\"{}\",", knob.name));
        w.line(
            2,
            format!(
                "{}, // Length of name (including NULL terminator)",
                knob.name.len() + 1
            ),
        );
        w.line(
            2,
            format!("{}, // {}", guid_literal(&knob.namespace), knob.namespace),
        );
        w.line(2, format!("{KNOB_ATTRIBUTES},"));
        w.line(2, "{0, 0},");
        w.line(2, format!("&{}{}", naming.content_validator_prefix, knob.name));
        w.line(1, "},");
    }
    w.line(1, "{");
    w.line(2, format!("{},", naming.knob_max()));
    for field in [
        "NULL,",
        "NULL,",
        "0,",
        "NULL,",
        "0,",
        "{0,0,0,{0,0,0,0,0,0,0,0}},",
        "0,",
        "{0, 0},",
        "NULL",
    ] {
        w.line(2, field);
    }
    w.line(1, "}");
    w.line(0, "};");
    w.blank();
}

fn write_accessors(w: &mut HeaderWriter<'_>, schema: &Schema, naming: &Naming) {
    let dialect = w.dialect();
    let bool_ty = dialect.type_name("bool");

    w.line(
        0,
        format!(
            "{} {}({} {});",
            dialect.type_name("void*"),
            naming.get_value_fn,
            naming.knob_type,
            naming.knob
        ),
    );
    if dialect.supports_set() {
        w.blank();
        w.line(0, "#ifdef CONFIG_SET_VARIABLES");
        w.line(
            0,
            format!(
                "{bool_ty} {}({} {}, {} {});",
                naming.set_value_fn,
                naming.knob_type,
                naming.knob,
                dialect.type_name("void*"),
                naming.value
            ),
        );
        w.line(0, "#endif // CONFIG_SET_VARIABLES");
    }
    w.blank();

    if schema.knobs.is_empty() {
        return;
    }
    w.line(0, "// Schema-defined knobs");
    for knob in &schema.knobs {
        let ty = dialect.type_name(knob.format.canonical_type());
        let id = naming.knob_id(&knob.name);

        w.line(0, format!("// {} knob", knob.name));
        w.line(0, format!("// Get the current value of the {} knob", knob.name));
        w.line(0, format!("{ty} {}{}()", naming.getter_prefix, knob.name));
        w.line(0, "{");
        w.line(
            1,
            format!("return *(({ty}*){}({id}));", naming.get_value_fn),
        );
        w.line(0, "}");
        w.blank();

        if dialect.supports_set() {
            w.line(0, "#ifdef CONFIG_SET_VARIABLES");
            w.line(0, format!("// Set the current value of the {} knob", knob.name));
            w.line(
                0,
                format!(
                    "{bool_ty} {}{}({ty} {})",
                    naming.setter_prefix, knob.name, naming.value
                ),
            );
            w.line(0, "{");
            w.line(
                1,
                format!("return {}({id}, &{});", naming.set_value_fn, naming.value),
            );
            w.line(0, "}");
            w.line(0, "#endif // CONFIG_SET_VARIABLES");
            w.blank();
        }
    }
}
