//! Generated file output.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{CodegenError, Result};

/// A generated header and its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

impl Artifact {
    /// Write through a temporary file in the destination directory, renamed
    /// into place once fully written.
    pub fn write(&self) -> Result<()> {
        self.stage()?.commit()
    }

    /// Write the contents to a temporary file beside the destination
    /// without touching the destination itself.
    pub fn stage(&self) -> Result<StagedArtifact> {
        let io_err = |source: std::io::Error| CodegenError::Io {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(io_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(self.contents.as_bytes()).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        Ok(StagedArtifact {
            path: self.path.clone(),
            bytes: self.contents.len(),
            tmp,
        })
    }
}

/// A fully written temporary file awaiting its rename.
///
/// Dropping it without committing removes the temporary file.
#[derive(Debug)]
pub struct StagedArtifact {
    path: PathBuf,
    bytes: usize,
    tmp: tempfile::NamedTempFile,
}

impl StagedArtifact {
    /// Rename the temporary file over the destination.
    pub fn commit(self) -> Result<()> {
        let path = self.path;
        self.tmp.persist(&path).map_err(|e| CodegenError::Io {
            path: path.clone(),
            source: e.error,
        })?;
        tracing::info!(path = %path.display(), bytes = self.bytes, "wrote artifact");
        Ok(())
    }
}

/// File name used for include guards: the last path component.
pub fn guard_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.h");
        let first = Artifact {
            path: path.clone(),
            contents: "one\n".into(),
        };
        first.write().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\n");

        let second = Artifact {
            path: path.clone(),
            contents: "two\r\n".into(),
        };
        second.write().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"two\r\n");

        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn guard_uses_file_name_only() {
        assert_eq!(guard_name(Path::new("out/include/ConfigData.h")), "ConfigData.h");
        assert_eq!(guard_name(Path::new("config.h")), "config.h");
    }

    #[test]
    fn dropped_stage_leaves_destination_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.h");
        std::fs::write(&path, "old\n").unwrap();
        let staged = Artifact {
            path: path.clone(),
            contents: "new\n".into(),
        }
        .stage()
        .unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
        drop(staged);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
