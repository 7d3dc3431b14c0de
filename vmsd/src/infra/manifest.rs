//! `ManifestFactory` adapter writing JSON manifests.
//!
//! The document is assembled in memory and written to a `NamedTempFile` in
//! the manifest directory when the builder is closed. Persisting renames it
//! to `mct-<unix-millis>.json`, so the target never sees a half-written
//! manifest. A builder closed after a failed `add_applications` discards its
//! temp file instead.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use qs_common::Application;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::application::ports::{ManifestBuilder, ManifestFactory};
use crate::domain::AddressPool;

/// Creates manifests under one directory.
#[derive(Debug, Clone)]
pub struct JsonManifestFactory {
    dir: PathBuf,
}

impl JsonManifestFactory {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ManifestFactory for JsonManifestFactory {
    type Builder = JsonManifestBuilder;

    fn create(&self) -> Result<Self::Builder> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating manifest directory {}", self.dir.display()))?;
        let file = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("creating temp manifest in {}", self.dir.display()))?;
        let now = chrono::Utc::now();
        let path = self.dir.join(format!("mct-{}.json", now.timestamp_millis()));
        Ok(JsonManifestBuilder {
            file,
            path,
            document: ManifestDocument {
                generated_at: now.to_rfc3339(),
                target: String::new(),
                pool: String::new(),
                domains: Vec::new(),
            },
            failed: false,
        })
    }
}

#[derive(Debug, Serialize)]
struct ManifestDocument {
    generated_at: String,
    target: String,
    pool: String,
    domains: Vec<ManifestDomain>,
}

#[derive(Debug, Serialize)]
struct ManifestDomain {
    id: i64,
    name: String,
    part: String,
    address: String,
}

/// A manifest being filled in.
#[derive(Debug)]
pub struct JsonManifestBuilder {
    file: NamedTempFile,
    path: PathBuf,
    document: ManifestDocument,
    failed: bool,
}

impl ManifestBuilder for JsonManifestBuilder {
    fn add_applications(
        &mut self,
        apps: &[Application],
        target_address: &str,
        pool: &AddressPool,
    ) -> Result<()> {
        self.document.target = target_address.to_string();
        self.document.pool = pool.to_string();

        let offset = self.document.domains.len();
        for (index, app) in apps.iter().enumerate() {
            let Some(address) = pool.nth(offset + index) else {
                self.failed = true;
                anyhow::bail!(
                    "guest address pool {pool} exhausted after {} domains (app {})",
                    pool.len(),
                    app.id
                );
            };
            self.document.domains.push(ManifestDomain {
                id: app.id,
                name: app.name.clone(),
                part: app.part.clone(),
                address: address.to_string(),
            });
        }
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn close(self) -> Result<()> {
        let Self {
            mut file,
            path,
            document,
            failed,
        } = self;
        if failed {
            // Dropping the temp file deletes it.
            return Ok(());
        }
        serde_json::to_writer_pretty(file.as_file_mut(), &document)
            .context("serializing manifest")?;
        file.as_file_mut()
            .flush()
            .context("flushing manifest")?;
        file.persist(&path)
            .with_context(|| format!("persisting manifest {}", path.display()))?;
        Ok(())
    }
}
