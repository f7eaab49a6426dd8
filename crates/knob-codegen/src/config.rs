//! Generation settings.

use crate::dialect::DialectKind;

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenConfig {
    pub dialect: DialectKind,
    /// Label written to the `//  Script:` provenance line.
    pub script: String,
    /// Extra span an enum may have before its validator switches from range
    /// checks to an exhaustive `switch`. Sparse iff `span > count + slack`.
    pub sparse_slack: u64,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            dialect: DialectKind::Generic,
            script: "knobgen".to_string(),
            sparse_slack: 0,
        }
    }
}

impl CodegenConfig {
    pub fn with_dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = dialect;
        self
    }
}
