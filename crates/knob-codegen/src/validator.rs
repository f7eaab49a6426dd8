//! Validation plans for enums and knob contents.
//!
//! A plan is the decision the definition header renders into C. Keeping it
//! as data lets the accept/reject behavior of generated validators be
//! checked directly, without compiling the output.

use knob_core::{EnumDef, Knob, Scalar, Schema, Value, ValueFormat};

use crate::error::{CodegenError, Result};

/// Largest slack honored when choosing a strategy. Bounds the number of gap
/// checks a range validator can emit.
pub const MAX_SPARSE_SLACK: u64 = 4096;

/// How an enum validator decides membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumStrategy {
    /// `switch` over every declared number; anything else is rejected.
    Exhaustive { numbers: Vec<i64> },
    /// Range check plus an explicit rejection for each undeclared number
    /// inside the range.
    Range {
        lowest: i64,
        highest: i64,
        gaps: Vec<i64>,
    },
}

/// The validator generated for one enum.
#[derive(Debug, Clone)]
pub struct EnumValidator<'s> {
    pub def: &'s EnumDef,
    pub strategy: EnumStrategy,
}

impl<'s> EnumValidator<'s> {
    /// Choose a strategy: with `span = highest - lowest` and `count` the
    /// number of declared members, the enum is sparse when
    /// `span > count + sparse_slack`, with the slack clamped to
    /// [`MAX_SPARSE_SLACK`].
    pub fn plan(def: &'s EnumDef, sparse_slack: u64) -> Result<Self> {
        let (Some(lowest), Some(highest)) = (def.lowest(), def.highest()) else {
            return Err(CodegenError::EmptyEnum {
                name: def.name.clone(),
            });
        };
        let span = i128::from(highest) - i128::from(lowest);
        let count = def.values.len() as i128;
        let sparse = span > count + i128::from(sparse_slack.min(MAX_SPARSE_SLACK));

        let strategy = if sparse {
            let mut numbers: Vec<i64> = Vec::with_capacity(def.values.len());
            for value in &def.values {
                if !numbers.contains(&value.number) {
                    numbers.push(value.number);
                }
            }
            EnumStrategy::Exhaustive { numbers }
        } else {
            let gaps = (lowest..highest)
                .filter(|n| def.member_by_number(*n).is_none())
                .collect();
            EnumStrategy::Range {
                lowest,
                highest,
                gaps,
            }
        };

        tracing::debug!(
            enum_name = %def.name,
            span = %span,
            count = %count,
            sparse,
            "planned enum validator"
        );
        Ok(Self { def, strategy })
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self.strategy, EnumStrategy::Exhaustive { .. })
    }

    /// Whether the generated validator returns true for `number`.
    pub fn accepts(&self, number: i64) -> bool {
        match &self.strategy {
            EnumStrategy::Exhaustive { numbers } => numbers.contains(&number),
            EnumStrategy::Range {
                lowest,
                highest,
                gaps,
            } => number >= *lowest && number <= *highest && !gaps.contains(&number),
        }
    }
}

/// One generated check on a leaf of a knob value.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafCheck {
    /// The leaf must be a declared member of `enum_name`.
    Member { path: String, enum_name: String },
    /// The leaf must be at least `bound`.
    Min {
        path: String,
        define: String,
        bound: Scalar,
    },
    /// The leaf must be at most `bound`.
    Max {
        path: String,
        define: String,
        bound: Scalar,
    },
}

impl LeafCheck {
    /// Sub-knob path this check reads.
    pub fn path(&self) -> &str {
        match self {
            LeafCheck::Member { path, .. }
            | LeafCheck::Min { path, .. }
            | LeafCheck::Max { path, .. } => path,
        }
    }
}

/// The content validator generated for one knob.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentValidator {
    pub knob: String,
    pub checks: Vec<LeafCheck>,
}

impl ContentValidator {
    /// Collect every leaf check of a knob, in sub-knob order. `None` when
    /// the knob is unconstrained and shares the no-constraint validator.
    pub fn plan(knob: &Knob) -> Option<Self> {
        let mut checks = Vec::new();
        for leaf in knob.leaves() {
            if let ValueFormat::Enum(enum_name) = &leaf.format {
                checks.push(LeafCheck::Member {
                    path: leaf.path.clone(),
                    enum_name: enum_name.clone(),
                });
                continue;
            }
            let define = leaf.define_name();
            if let Some(bound) = leaf.narrowed_min() {
                checks.push(LeafCheck::Min {
                    path: leaf.path.clone(),
                    define: define.clone(),
                    bound,
                });
            }
            if let Some(bound) = leaf.narrowed_max() {
                checks.push(LeafCheck::Max {
                    path: leaf.path.clone(),
                    define,
                    bound,
                });
            }
        }
        (!checks.is_empty()).then(|| Self {
            knob: knob.name.clone(),
            checks,
        })
    }

    /// Whether the generated validator accepts `value`, evaluating the
    /// checks in order and stopping at the first failure.
    pub fn accepts(&self, schema: &Schema, knob: &Knob, value: &Value) -> bool {
        self.checks.iter().all(|check| {
            let Some(suffix) = check.path().strip_prefix(knob.name.as_str()) else {
                return false;
            };
            let Some(leaf) = schema.select(&knob.format, value, suffix) else {
                return false;
            };
            match check {
                LeafCheck::Member { enum_name, .. } => match leaf {
                    Value::Enum(member) => schema
                        .find_enum(enum_name)
                        .is_some_and(|def| def.member(member).is_some()),
                    Value::Int(n) => i64::try_from(*n).is_ok_and(|n| {
                        schema
                            .find_enum(enum_name)
                            .is_some_and(|def| def.member_by_number(n).is_some())
                    }),
                    _ => false,
                },
                LeafCheck::Min { bound, .. } => {
                    leaf.as_scalar().is_some_and(|v| bound.at_most(&v))
                }
                LeafCheck::Max { bound, .. } => {
                    leaf.as_scalar().is_some_and(|v| v.at_most(bound))
                }
            }
        })
    }
}
