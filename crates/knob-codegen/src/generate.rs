//! End-to-end generation: schema and override sources in, artifacts out.

use std::path::PathBuf;

use knob_core::{OverrideSource, Schema};

use crate::artifact::{guard_name, Artifact};
use crate::config::CodegenConfig;
use crate::declaration::emit_declarations;
use crate::definition::emit_definitions;
use crate::error::Result;
use crate::profile::{emit_profiles, merge_profiles};

/// Where each artifact goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub public_header: PathBuf,
    pub service_header: PathBuf,
    /// Only produced when override sources are given.
    pub profile_header: Option<PathBuf>,
}

/// Render every artifact in memory.
///
/// Nothing is written here, so a failure in any artifact leaves the output
/// directory untouched.
pub fn generate(
    schema: &Schema,
    sources: &[OverrideSource],
    paths: &OutputPaths,
    config: &CodegenConfig,
) -> Result<Vec<Artifact>> {
    let dialect = config.dialect.policy();
    tracing::info!(
        schema = %schema.source,
        dialect = %config.dialect,
        knobs = schema.knobs.len(),
        "generating headers"
    );

    let mut artifacts = vec![
        Artifact {
            contents: emit_declarations(schema, dialect, config, &guard_name(&paths.public_header))?,
            path: paths.public_header.clone(),
        },
        Artifact {
            contents: emit_definitions(schema, dialect, config, &guard_name(&paths.service_header))?,
            path: paths.service_header.clone(),
        },
    ];

    if let Some(profile_header) = &paths.profile_header {
        let profiles = merge_profiles(schema, sources)?;
        artifacts.push(Artifact {
            contents: emit_profiles(
                schema,
                dialect,
                config,
                &guard_name(profile_header),
                &profiles,
            )?,
            path: profile_header.clone(),
        });
    }

    Ok(artifacts)
}

/// Render and write every artifact.
///
/// All artifacts are staged to temporary files before any destination is
/// replaced, so a render or staging failure leaves existing headers intact.
pub fn generate_to_disk(
    schema: &Schema,
    sources: &[OverrideSource],
    paths: &OutputPaths,
    config: &CodegenConfig,
) -> Result<Vec<PathBuf>> {
    let artifacts = generate(schema, sources, paths, config)?;
    let staged = artifacts
        .iter()
        .map(Artifact::stage)
        .collect::<Result<Vec<_>>>()?;
    for artifact in staged {
        artifact.commit()?;
    }
    Ok(artifacts.into_iter().map(|a| a.path).collect())
}
