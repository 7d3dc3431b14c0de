//! Executable command extensions.
//!
//! An extension for namespace `ns` is the executable `<dir>/ns`. It is run
//! as `<program> <verb> <payload>` and its exit status is the command's
//! success flag. Extensions are looked up at dispatch time, so dropping a
//! new executable into the directory is enough to make its namespace live.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::application::ports::{CommandExtension, CommandRunner, ExtensionLoader};
use crate::domain::error::DispatchError;

/// Wraps one executable as a [`CommandExtension`].
#[derive(Debug, Clone)]
pub struct ExecutableExtension<R> {
    program: PathBuf,
    runner: R,
}

impl<R> ExecutableExtension<R> {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait(?Send)]
impl<S, R: CommandRunner> CommandExtension<S> for ExecutableExtension<R> {
    async fn process(&self, _store: &S, verb: &str, payload: &str) -> Result<bool> {
        let program = self
            .program
            .to_str()
            .with_context(|| format!("extension path {} is not UTF-8", self.program.display()))?;
        let output = self.runner.run(program, &[verb, payload]).await?;
        let success = output.status.success();
        if !success {
            debug!(
                program,
                verb,
                code = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "extension reported failure"
            );
        }
        Ok(success)
    }
}

/// Loads [`ExecutableExtension`]s from a directory.
#[derive(Debug, Clone)]
pub struct ExecutableLoader<R> {
    dir: PathBuf,
    runner: R,
}

impl<R> ExecutableLoader<R> {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            dir: dir.into(),
            runner,
        }
    }
}

/// Namespaces name a file directly inside the extension directory.
fn validate_namespace(namespace: &str) -> Result<(), DispatchError> {
    let valid = !namespace.is_empty()
        && !namespace.starts_with('.')
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(DispatchError::InvalidNamespace(namespace.to_string()))
    }
}

fn is_executable(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

impl<S, R> ExtensionLoader<S> for ExecutableLoader<R>
where
    R: CommandRunner + Clone + 'static,
{
    fn load(&self, namespace: &str) -> Result<Arc<dyn CommandExtension<S>>> {
        validate_namespace(namespace)?;
        let program = self.dir.join(namespace);
        if !is_executable(&program) {
            return Err(DispatchError::ExtensionNotRegistered(namespace.to_string()))
                .with_context(|| format!("no executable at {}", program.display()));
        }
        debug!(namespace, program = %program.display(), "loaded command extension");
        Ok(Arc::new(ExecutableExtension::new(program, self.runner.clone())))
    }
}
