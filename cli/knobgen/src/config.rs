//! `knobgen.toml` project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use knob_codegen::CodegenConfig;
use serde::{Deserialize, Serialize};

pub const FILE_NAME: &str = "knobgen.toml";

/// The top-level project file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// `[generator]` section. Unset keys keep the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Provenance label for generated headers.
    #[serde(default)]
    pub script: Option<String>,
    /// Enum sparseness tolerance.
    #[serde(default)]
    pub sparse_slack: Option<u64>,
}

impl ProjectConfig {
    /// Search upward from `start_dir` for a `knobgen.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(FILE_NAME);
            if candidate.is_file() {
                let config = Self::load(&candidate)?;
                tracing::debug!(path = %candidate.display(), "loaded project config");
                return Ok(Some((config, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Generation settings with this file's values applied over the defaults.
    pub fn codegen_config(&self) -> CodegenConfig {
        let mut config = CodegenConfig::default();
        if let Some(script) = &self.generator.script {
            config.script = script.clone();
        }
        if let Some(slack) = self.generator.sparse_slack {
            config.sparse_slack = slack;
        }
        config
    }
}
