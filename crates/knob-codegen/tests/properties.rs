//! Property-based tests for validator planning, layout, and value rendering.

use proptest::prelude::*;

use knob_codegen::literal::render_value;
use knob_codegen::{
    emit_profiles, merge_profiles, CodegenConfig, ContentValidator, EnumValidator, Generic,
};
use knob_core::{
    EnumDef, EnumValue, FloatKind, IntKind, OverrideSource, Schema, StructDef, StructMember,
    Value, ValueFormat,
};

fn enum_def(numbers: &[i64]) -> EnumDef {
    EnumDef {
        name: "Probe".into(),
        help: None,
        values: numbers
            .iter()
            .enumerate()
            .map(|(i, number)| EnumValue {
                name: format!("M{i}"),
                number: *number,
                help: None,
            })
            .collect(),
    }
}

/// Builtin scalar formats.
fn scalar_format() -> impl Strategy<Value = ValueFormat> {
    prop_oneof![
        prop::sample::select(IntKind::ALL.to_vec()).prop_map(ValueFormat::Int),
        Just(ValueFormat::Float(FloatKind::F32)),
        Just(ValueFormat::Float(FloatKind::F64)),
        Just(ValueFormat::Bool),
    ]
}

/// An integer kind together with a value inside its natural range.
fn int_value() -> impl Strategy<Value = (IntKind, i128)> {
    prop::sample::select(IntKind::ALL.to_vec())
        .prop_flat_map(|kind| (Just(kind), kind.min()..=kind.max()))
}

fn knob_schema(body: &str) -> Schema {
    Schema::parse_toml(body, "prop").unwrap()
}

proptest! {
    /// Contiguous enums accept their whole range and nothing just outside it.
    #[test]
    fn dense_enum_accepts_exact_range(lowest in 0i64..100_000, len in 1i64..64, reversed in any::<bool>()) {
        let mut numbers: Vec<i64> = (lowest..lowest + len).collect();
        if reversed {
            numbers.reverse();
        }
        let def = enum_def(&numbers);
        let plan = EnumValidator::plan(&def, 0).unwrap();
        prop_assert!(!plan.is_sparse());
        for n in lowest..lowest + len {
            prop_assert!(plan.accepts(n));
        }
        prop_assert!(!plan.accepts(lowest - 1));
        prop_assert!(!plan.accepts(lowest + len));
    }

    /// Sparse enums accept exactly their declared members.
    #[test]
    fn sparse_enum_accepts_only_members(
        members in prop::collection::btree_set(-100_000i64..100_000, 2..24),
        samples in prop::collection::vec(any::<i32>(), 0..64),
    ) {
        let numbers: Vec<i64> = members.iter().copied().collect();
        let span = numbers[numbers.len() - 1] - numbers[0];
        prop_assume!(span > numbers.len() as i64);

        let def = enum_def(&numbers);
        let plan = EnumValidator::plan(&def, 0).unwrap();
        prop_assert!(plan.is_sparse());
        for n in &numbers {
            prop_assert!(plan.accepts(*n));
        }
        for sample in samples {
            let sample = i64::from(sample);
            prop_assert_eq!(plan.accepts(sample), members.contains(&sample));
        }
        // Every undeclared number inside the range is rejected too.
        for n in numbers[0]..=numbers[0] + 64 {
            prop_assert_eq!(plan.accepts(n), members.contains(&n));
        }
    }

    /// Packed struct size is the plain sum of member sizes times counts.
    #[test]
    fn struct_size_has_no_padding(
        members in prop::collection::vec((scalar_format(), 1u32..8), 1..12),
    ) {
        let schema = Schema::default();
        let expected: u64 = members
            .iter()
            .map(|(format, count)| schema.size_of(format).unwrap() * u64::from(*count))
            .sum();
        let def = StructDef {
            name: "Packed".into(),
            help: None,
            members: members
                .into_iter()
                .enumerate()
                .map(|(i, (format, count))| StructMember {
                    name: format!("m{i}"),
                    format,
                    count,
                    min: None,
                    max: None,
                    help: None,
                })
                .collect(),
        };
        prop_assert_eq!(schema.struct_size(&def).unwrap(), expected);
    }

    /// Rendered integer literals parse back to the same value.
    #[test]
    fn integer_literals_round_trip((kind, v) in int_value()) {
        let schema = Schema::default();
        let format = ValueFormat::Int(kind);
        let text = render_value(&schema, &format, &Value::Int(v), &Generic).unwrap();
        prop_assert_eq!(schema.parse_value(&format, &text).unwrap(), Value::Int(v));
    }

    /// Rendered float literals parse back to the same value.
    #[test]
    fn float_literals_round_trip(v in -1.0e30f64..1.0e30, wide in any::<bool>()) {
        let schema = Schema::default();
        let kind = if wide { FloatKind::F64 } else { FloatKind::F32 };
        let format = ValueFormat::Float(kind);
        let text = render_value(&schema, &format, &Value::Float(v), &Generic).unwrap();
        prop_assert_eq!(schema.parse_value(&format, &text).unwrap(), Value::Float(v));
    }

    /// A narrowed bound accepts both edges and rejects one step outside.
    #[test]
    fn narrowed_bounds_are_inclusive(min in 1u32..30_000, width in 0u32..30_000) {
        let max = min + width;
        let schema = knob_schema(&format!(
            r#"
[[knobs]]
name = "limit"
namespace = "8c7a7f4e-3b9b-4f25-9a52-5d9e0d3a4c11"
format = "uint16_t"
default = {min}
min = {min}
max = {max}
"#
        ));
        let knob = schema.find_knob("limit").unwrap();
        let plan = ContentValidator::plan(knob).unwrap();
        let check = |v: u32| plan.accepts(&schema, knob, &Value::Int(i128::from(v)));
        prop_assert!(check(min));
        prop_assert!(check(max));
        prop_assert!(!check(min - 1));
        prop_assert!(!check(max + 1));
    }

    /// Each profile array holds one entry per override plus the sentinel.
    #[test]
    fn profile_arrays_count_overrides(mask in prop::collection::vec(any::<bool>(), 1..10)) {
        let mut body = String::new();
        for i in 0..mask.len() {
            body.push_str(&format!(
                "[[knobs]]\nname = \"k{i}\"\nnamespace = \"8c7a7f4e-3b9b-4f25-9a52-5d9e0d3a4c11\"\nformat = \"bool\"\n\n"
            ));
        }
        let schema = knob_schema(&body);

        let mut source = OverrideSource::new("p");
        for (i, set) in mask.iter().enumerate() {
            if *set {
                source.set(&format!("k{i}"), true);
            }
        }
        let profiles = merge_profiles(&schema, &[source]).unwrap();
        let out = emit_profiles(&schema, &Generic, &CodegenConfig::default(), "p.h", &profiles)
            .unwrap();

        let array = out
            .split("profile_p_overrides[PROFILE_P_OVERRIDES_COUNT + 1] = {")
            .nth(1)
            .and_then(|rest| rest.split("};").next())
            .unwrap();
        let overridden = mask.iter().filter(|m| **m).count();
        prop_assert_eq!(array.matches(".knob = ").count(), overridden + 1);
        let last = array.rsplit(".knob = ").next().unwrap();
        prop_assert!(last.starts_with("KNOB_MAX,"));
    }
}
