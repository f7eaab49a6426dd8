//! Integration tests: the demo schema through every artifact in both dialects.

use std::path::{Path, PathBuf};

use knob_codegen::literal::render_value;
use knob_codegen::{
    generate, generate_to_disk, CodegenConfig, ContentValidator, DialectKind, OutputPaths,
};
use knob_core::{OverrideSource, Schema, Value};

fn demos() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

fn demo_schema() -> Schema {
    Schema::load(&demos().join("schema.toml")).unwrap()
}

fn demo_sources() -> Vec<OverrideSource> {
    ["server.toml", "quiet.toml"]
        .iter()
        .map(|name| OverrideSource::load(&demos().join("profiles").join(name)).unwrap())
        .collect()
}

fn render(kind: DialectKind) -> Vec<String> {
    let paths = OutputPaths {
        public_header: "config.h".into(),
        service_header: "config_service.h".into(),
        profile_header: Some("config_profiles.h".into()),
    };
    let config = CodegenConfig::default().with_dialect(kind);
    generate(&demo_schema(), &demo_sources(), &paths, &config)
        .unwrap()
        .into_iter()
        .map(|a| a.contents)
        .collect()
}

/// Names closing each `typedef`, in output order.
fn declared_types(public_header: &str) -> Vec<String> {
    public_header
        .lines()
        .filter_map(|line| line.strip_prefix("} "))
        .map(|rest| rest.trim_end_matches(';').to_string())
        .collect()
}

/// Knob identity enumerators, in output order.
fn knob_ids(public_header: &str) -> Vec<String> {
    public_header
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("KNOB_"))
        .map(|line| line.trim_end_matches(',').to_string())
        .collect()
}

#[test]
fn writes_all_three_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let paths = OutputPaths {
        public_header: dir.path().join("config.h"),
        service_header: dir.path().join("config_service.h"),
        profile_header: Some(dir.path().join("config_profiles.h")),
    };
    let written = generate_to_disk(
        &demo_schema(),
        &demo_sources(),
        &paths,
        &CodegenConfig::default(),
    )
    .unwrap();
    assert_eq!(written.len(), 3);
    for path in &written {
        assert!(path.exists(), "{} missing", path.display());
    }

    let public = std::fs::read_to_string(&paths.public_header).unwrap();
    assert!(public.contains("//  Schema: "));
    assert!(public.contains("schema.toml"));
}

#[test]
fn power_limit_bound_in_both_dialects() {
    let generic = render(DialectKind::Generic);
    assert!(generic[0].contains("#define KNOB__power_limit_watts__MAX 300\n"));
    assert!(generic[1].contains("    if ((*value) > KNOB__power_limit_watts__MAX) return false;\n"));

    let firmware = render(DialectKind::Firmware);
    assert!(firmware[0].contains("#define KNOB__power_limit_watts__MAX 300\r\n"));
    assert!(firmware[1].contains("  if ((*Value) > KNOB__power_limit_watts__MAX) return FALSE;\r\n"));

    let schema = demo_schema();
    let knob = schema.find_knob("power_limit_watts").unwrap();
    let plan = ContentValidator::plan(knob).unwrap();
    assert!(plan.accepts(&schema, knob, &Value::Int(300)));
    assert!(!plan.accepts(&schema, knob, &Value::Int(301)));
}

#[test]
fn dialect_switch_keeps_declaration_order() {
    let generic = render(DialectKind::Generic);
    let firmware = render(DialectKind::Firmware);
    let g = declared_types(&generic[0]);
    let f = declared_types(&firmware[0]);

    let schema_order = ["FanMode", "BootTarget", "ClockSkew", "FanPoint", "FanCurve"];
    assert_eq!(&g[..5], &schema_order[..]);
    assert_eq!(&f[..5], &schema_order[..]);

    assert_eq!(knob_ids(&generic[0]), knob_ids(&firmware[0]));
    assert_eq!(
        knob_ids(&generic[0]),
        vec![
            "KNOB_power_limit_watts",
            "KNOB_fan_curve",
            "KNOB_boot_target",
            "KNOB_turbo_enabled",
            "KNOB_clock_skew",
            "KNOB_memory_base",
            "KNOB_MAX",
        ]
    );
}

#[test]
fn firmware_uses_crlf_everywhere() {
    for artifact in render(DialectKind::Firmware) {
        assert!(!artifact.replace("\r\n", "").contains('\n'));
    }
    for artifact in render(DialectKind::Generic) {
        assert!(!artifact.contains('\r'));
    }
}

#[test]
fn enum_strategies_follow_density() {
    let service = &render(DialectKind::Generic)[1];
    // FanMode {0,1,3}: span 3, count 3
    assert!(service.contains("    if (numeric_value == 2) return false;\n"));
    // BootTarget {1,16,256}: span 255, count 3
    assert!(service.contains("        case BootTarget_Usb: return true;\n"));
    // ClockSkew has a negative member
    assert!(render(DialectKind::Generic)[0].contains("_ClockSkew_PADDING = 0x7fffffff"));
}

#[test]
fn nested_struct_checks() {
    let generic = render(DialectKind::Generic);
    assert!(generic[0].contains("#define KNOB__fan_curve__points_2___temp_c__MIN 20\n"));
    assert!(generic[1].contains(
        "    if ((*value).points[2].temp_c < KNOB__fan_curve__points_2___temp_c__MIN) return false;\n"
    ));
    assert!(generic[1].contains("    if (!validate_enum_value_FanMode((*value).mode)) return false;\n"));
    assert!(generic[1].contains(
        "    .fan_curve={FanMode_Balanced,{{40,30},{60,60},{80,100}},2.5f},\n"
    ));
    assert!(generic[1].contains("    .memory_base=4294967296ULL,\n"));
}

#[test]
fn profile_arrays_end_with_sentinel() {
    let profiles = &render(DialectKind::Generic)[2];
    assert!(profiles.contains("#define PROFILE_SERVER_OVERRIDES_COUNT 3\n"));
    assert!(profiles.contains("#define PROFILE_QUIET_OVERRIDES_COUNT 2\n"));
    assert!(profiles.contains(
        "    .fan_curve={FanMode_Turbo,{{30,50},{50,80},{70,100}},1.0f},\n"
    ));
    assert!(profiles.contains("//  Profile: "));
    assert!(profiles.contains("#define PROFILE_COUNT 2\n"));

    let server = profiles
        .split("knob_override_t profile_server_overrides")
        .nth(1)
        .and_then(|rest| rest.split("};").next())
        .unwrap();
    assert_eq!(server.matches(".knob = ").count(), 4);
    assert!(server.trim_end().ends_with(".knob = KNOB_MAX,\n        .value = NULL,\n    }"));
}

#[test]
fn defaults_survive_render_and_parse() {
    let schema = demo_schema();
    let dialect = DialectKind::Generic.policy();
    for knob in &schema.knobs {
        let text = render_value(&schema, &knob.format, &knob.default, dialect).unwrap();
        let back = schema.parse_value(&knob.format, &text).unwrap();
        assert_eq!(back, knob.default, "knob {}", knob.name);
    }
}
