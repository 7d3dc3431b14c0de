//! Filesystem implementation of `ArtifactWriter`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::ArtifactWriter;

/// Writes retrieval artifacts as compact JSON, creating parent directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactWriter;

impl ArtifactWriter for FsArtifactWriter {
    async fn write_json(&self, path: &Path, value: &serde_json::Value) -> Result<()> {
        let path = path.to_path_buf();
        let content = serde_json::to_vec(value).context("serializing artifact")?;
        tokio::task::spawn_blocking(move || {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating artifact dir {}", parent.display()))?;
            }
            std::fs::write(&path, content)
                .with_context(|| format!("writing artifact {}", path.display()))
        })
        .await
        .context("spawn_blocking for write_json")?
    }
}
