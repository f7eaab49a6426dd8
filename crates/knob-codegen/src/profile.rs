//! Profile header: per-profile override tables and the profile directory.

use std::collections::HashSet;

use knob_core::{is_c_identifier, merge_overrides, OverrideSource, ProfileOverrides, Schema};

use crate::config::CodegenConfig;
use crate::dialect::Dialect;
use crate::error::{CodegenError, Result};
use crate::literal::render_value;
use crate::naming::Naming;
use crate::writer::HeaderWriter;

/// Merge every source against the schema defaults, in order.
///
/// Each merge is independent; no schema state carries over between
/// profiles. Profile names must be C identifiers, unique ignoring case
/// since their macros are upper-cased.
pub fn merge_profiles(schema: &Schema, sources: &[OverrideSource]) -> Result<Vec<ProfileOverrides>> {
    let mut seen = HashSet::new();
    let mut profiles = Vec::with_capacity(sources.len());
    for source in sources {
        if !is_c_identifier(&source.name) {
            return Err(CodegenError::InvalidProfileName {
                name: source.name.clone(),
            });
        }
        if !seen.insert(source.name.to_uppercase()) {
            return Err(CodegenError::DuplicateProfile {
                name: source.name.clone(),
            });
        }
        profiles.push(merge_overrides(schema, source)?);
    }
    Ok(profiles)
}

/// Produce the profile header for already merged profiles.
pub fn emit_profiles(
    schema: &Schema,
    dialect: &dyn Dialect,
    config: &CodegenConfig,
    file_name: &str,
    profiles: &[ProfileOverrides],
) -> Result<String> {
    let naming = Naming::new(dialect);
    let mut w = HeaderWriter::new(dialect);

    w.raw(&dialect.include_guard(file_name, true));
    w.line(0, "// The config service header must be included prior to this file");
    w.provenance(&config.script, &schema.source);
    for profile in profiles {
        w.line(0, format!("//  Profile: {}", profile.origin));
    }
    w.blank();

    for profile in profiles {
        write_profile(&mut w, schema, &naming, profile)?;
    }

    w.line(0, format!("#define PROFILE_COUNT {}", profiles.len()));
    w.line(
        0,
        format!(
            "{} {}[PROFILE_COUNT + 1] = {{",
            naming.profile_type, naming.profiles_var
        ),
    );
    for profile in profiles {
        let macro_name = naming.profile_macro(&profile.name);
        w.line(1, "{");
        w.line(
            2,
            format!(
                ".{} = {},",
                naming.overrides,
                naming.profile_overrides_var(&profile.name)
            ),
        );
        w.line(
            2,
            format!(".{} = {macro_name}_OVERRIDES_COUNT,", naming.override_count),
        );
        w.line(1, "},");
    }
    w.line(1, "{");
    w.line(2, format!(".{} = NULL,", naming.overrides));
    w.line(2, format!(".{} = 0,", naming.override_count));
    w.line(1, "}");
    w.line(0, "};");
    w.blank();

    w.raw(&dialect.include_guard(file_name, false));

    tracing::debug!(
        profiles = profiles.len(),
        dialect = %dialect.kind(),
        "emitted profiles"
    );
    Ok(w.finish())
}

fn write_profile(
    w: &mut HeaderWriter<'_>,
    schema: &Schema,
    naming: &Naming,
    profile: &ProfileOverrides,
) -> Result<()> {
    let dialect = w.dialect();
    let data_type = naming.profile_data_type(&profile.name);
    let data_var = naming.profile_data_var(&profile.name);
    let macro_name = naming.profile_macro(&profile.name);

    w.line(0, format!("// Profile {}", profile.name));

    // C forbids empty structs, so a profile without overrides only gets the
    // sentinel entry.
    if !profile.is_empty() {
        let mut fields = Vec::with_capacity(profile.len());
        let mut initializers = Vec::with_capacity(profile.len());
        for entry in &profile.entries {
            let knob = schema
                .find_knob(&entry.knob)
                .ok_or_else(|| knob_core::SchemaError::UnknownKnob {
                    source_name: profile.name.clone(),
                    knob: entry.knob.clone(),
                })?;
            fields.push(format!(
                "{} {};",
                dialect.type_name(knob.format.canonical_type()),
                knob.name
            ));
            let literal = render_value(schema, &knob.format, &entry.value, dialect)?;
            initializers.push(format!(".{}={literal},", knob.name));
        }

        w.line(0, "typedef struct {");
        for field in &fields {
            w.line(1, field);
        }
        w.line(0, format!("}} {data_type};"));
        w.blank();
        w.line(0, format!("{data_type} {data_var} = {{"));
        for init in &initializers {
            w.line(1, init);
        }
        w.line(0, "};");
        w.blank();
    }

    w.line(0, format!("#define {macro_name}_OVERRIDES"));
    w.line(
        0,
        format!("#define {macro_name}_OVERRIDES_COUNT {}", profile.len()),
    );
    w.line(
        0,
        format!(
            "{} {}[{macro_name}_OVERRIDES_COUNT + 1] = {{",
            naming.override_type,
            naming.profile_overrides_var(&profile.name)
        ),
    );
    for entry in &profile.entries {
        w.line(1, "{");
        w.line(
            2,
            format!(".{} = {},", naming.knob, naming.knob_id(&entry.knob)),
        );
        w.line(
            2,
            format!(".{} = &{data_var}.{},", naming.value, entry.knob),
        );
        w.line(1, "},");
    }
    w.line(1, "{");
    w.line(2, format!(".{} = {},", naming.knob, naming.knob_max()));
    w.line(2, format!(".{} = NULL,", naming.value));
    w.line(1, "}");
    w.line(0, "};");
    w.blank();
    Ok(())
}
