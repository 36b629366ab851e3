use crate::errors::{invalid_document_name, io_error, Result};
use crate::output::atomic::atomic_write;
use stackdrift_core::canonical::CanonicalForm;
use stackdrift_core::model::RunSummary;
use std::fs;
use std::path::{Path, PathBuf};

pub const META_FILE_NAME: &str = "_meta.json";

/// Which side of a comparison a canonical document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSide {
    /// Template committed to the repository
    Github,
    /// Template of the deployed stack
    Cfn,
}

impl TemplateSide {
    pub fn dir_name(&self) -> &'static str {
        match self {
            TemplateSide::Github => "github",
            TemplateSide::Cfn => "cfn",
        }
    }
}

/// Output directory of one run
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn side_dir(&self, side: TemplateSide) -> PathBuf {
        self.root.join(side.dir_name())
    }

    pub fn meta_path(&self) -> PathBuf {
        self.root.join(META_FILE_NAME)
    }

    /// Create `github/` and `cfn/` so both exist even when empty
    pub fn prepare(&self) -> Result<()> {
        for side in [TemplateSide::Github, TemplateSide::Cfn] {
            fs::create_dir_all(self.side_dir(side)).map_err(|e| io_error("prepare_output", e))?;
        }
        Ok(())
    }

    /// Write `<side>/<name>.json` with a trailing newline
    pub fn write_canonical(
        &self,
        side: TemplateSide,
        name: &str,
        canonical: &CanonicalForm,
    ) -> Result<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(invalid_document_name(name));
        }

        let path = self.side_dir(side).join(format!("{}.json", name));
        let mut content = canonical.as_str().to_string();
        content.push('\n');
        atomic_write(&path, content.as_bytes())?;

        tracing::debug!(path = %path.display(), "wrote canonical template");
        Ok(path)
    }

    /// Write `_meta.json` as pretty JSON
    pub fn write_meta(&self, summary: &RunSummary) -> Result<PathBuf> {
        let path = self.meta_path();
        let mut content = summary.to_pretty_json()?;
        content.push('\n');
        atomic_write(&path, content.as_bytes())?;
        Ok(path)
    }
}
