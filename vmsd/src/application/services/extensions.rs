//! Application service: `namespace.verb` command types.
//!
//! Handlers are looked up by namespace, first among the extensions
//! registered at startup and then through an optional loader that can pick
//! up handlers installed while the daemon runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use qs_common::Command;
use tracing::{debug, warn};

use crate::application::ports::{CommandExtension, CommandStore, ExtensionLoader};
use crate::application::services::completion;
use crate::domain::error::DispatchError;

/// Split an extension command type into `(namespace, verb)`.
///
/// Anything other than exactly one `.` separating two parts is rejected.
#[must_use]
pub fn split_kind(kind: &str) -> Option<(&str, &str)> {
    let mut parts = kind.splitn(3, '.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(namespace), Some(verb), None) => Some((namespace, verb)),
        _ => None,
    }
}

/// Namespace → handler registry.
pub struct ExtensionRegistry<S> {
    extensions: BTreeMap<String, Arc<dyn CommandExtension<S>>>,
    loader: Option<Box<dyn ExtensionLoader<S>>>,
}

impl<S> Default for ExtensionRegistry<S> {
    fn default() -> Self {
        Self {
            extensions: BTreeMap::new(),
            loader: None,
        }
    }
}

impl<S> ExtensionRegistry<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `extension` for `namespace`, replacing any earlier entry.
    pub fn register(&mut self, namespace: impl Into<String>, extension: Arc<dyn CommandExtension<S>>) {
        self.extensions.insert(namespace.into(), extension);
    }

    /// Fall back to `loader` for namespaces that were not registered.
    #[must_use]
    pub fn with_loader(mut self, loader: Box<dyn ExtensionLoader<S>>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Find the handler for `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::ExtensionNotRegistered`] when nothing is
    /// registered and there is no loader, or the loader's error otherwise.
    pub fn resolve(&self, namespace: &str) -> Result<Arc<dyn CommandExtension<S>>> {
        if let Some(extension) = self.extensions.get(namespace) {
            return Ok(Arc::clone(extension));
        }
        match &self.loader {
            Some(loader) => loader
                .load(namespace)
                .with_context(|| format!("loading command extension '{namespace}'")),
            None => Err(DispatchError::ExtensionNotRegistered(namespace.to_string()).into()),
        }
    }
}

impl<S: CommandStore> ExtensionRegistry<S> {
    /// Route one bucket of extension commands.
    ///
    /// The namespace is resolved once per bucket. Each command is then
    /// processed and completed on its own; the handler's flag becomes the
    /// command's success flag.
    pub async fn dispatch(&self, store: &S, kind: &str, commands: Vec<Command>) {
        let Some((namespace, verb)) = split_kind(kind) else {
            for command in &commands {
                let err = anyhow::Error::from(DispatchError::UnknownCommand {
                    kind: kind.to_string(),
                    id: command.id,
                });
                completion::fail(store, std::slice::from_ref(command), &err).await;
            }
            return;
        };

        let extension = match self.resolve(namespace) {
            Ok(extension) => extension,
            Err(err) => {
                warn!(namespace, error = %err, "command extension unavailable");
                completion::fail(store, &commands, &err).await;
                return;
            }
        };

        for command in &commands {
            match extension.process(store, verb, &command.data).await {
                Ok(success) => {
                    debug!(command_id = command.id, kind, success, "extension command processed");
                    completion::record(store, std::slice::from_ref(command), success, None).await;
                }
                Err(err) => {
                    let err = err.context(format!("extension {kind} failed on command {}", command.id));
                    completion::fail(store, std::slice::from_ref(command), &err).await;
                }
            }
        }
    }
}
