//! `knobgen generate-header` and `generate-header-firmware`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use knob_codegen::{generate_to_disk, CodegenConfig, OutputPaths};
use knob_core::{OverrideSource, Schema};

/// Load the schema and override sources, then write every header.
pub fn run(
    schema_path: &Path,
    public_header: &Path,
    service_header: &Path,
    profile_header: Option<&Path>,
    source_paths: &[PathBuf],
    config: &CodegenConfig,
) -> Result<()> {
    let schema = Schema::load(schema_path)
        .with_context(|| format!("loading schema {}", schema_path.display()))?;

    let sources = source_paths
        .iter()
        .map(|path| {
            OverrideSource::load(path)
                .with_context(|| format!("loading override source {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let paths = OutputPaths {
        public_header: public_header.to_path_buf(),
        service_header: service_header.to_path_buf(),
        profile_header: profile_header.map(Path::to_path_buf),
    };

    let written = generate_to_disk(&schema, &sources, &paths, config)
        .with_context(|| format!("generating headers from {}", schema_path.display()))?;

    println!("Generated {} header(s) ({} dialect)", written.len(), config.dialect);
    for path in &written {
        println!("  {}", path.display());
    }
    Ok(())
}
