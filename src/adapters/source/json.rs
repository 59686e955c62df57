use crate::domain::description::SystemDescription;
use crate::domain::ports::SystemSource;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// JSON file system source implementation
pub struct JsonSystemSource {
    path: PathBuf,
}

impl JsonSystemSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SystemSource for JsonSystemSource {
    fn load(&self) -> Result<SystemDescription> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| {
                format!("Failed to read system description: {}", self.path.display())
            })?;
        parse_description(&content)
            .with_context(|| format!("Invalid system description: {}", self.path.display()))
    }
}

pub fn parse_description(content: &str) -> Result<SystemDescription> {
    serde_json::from_str(content).context("Failed to parse SystemDescription JSON")
}
