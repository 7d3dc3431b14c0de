//! File-backed `CommandStore`.
//!
//! The store is a directory of JSON documents:
//!
//! | File | Content |
//! |------|---------|
//! | `commands.json` | command queue; an entry without `completion` is pending |
//! | `applications.json` | VM-app records |
//! | `session.json` | recording session counter |
//! | `settings.json` | poll rates |
//! | `radio.json` | call and radio status |
//! | `records/<category>.json` | command logs, system messages, flight data |
//!
//! Reads and writes run on the blocking pool. Every write replaces its
//! document atomically (temp file + rename), and read-modify-write cycles
//! are serialised by one async mutex.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use qs_common::{Application, Command, RecordFilter, RecordKind, StateChange, TIMESTAMP_FORMAT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::ports::CommandStore;
use crate::domain::CommandBatch;

/// Poll interval reported when `settings.json` does not set one.
pub const DEFAULT_COMMAND_POLL_RATE: Duration = Duration::from_secs(10);

const COMMANDS: &str = "commands.json";
const APPLICATIONS: &str = "applications.json";
const SESSION: &str = "session.json";
const SETTINGS: &str = "settings.json";
const RADIO: &str = "radio.json";
const RECORDS: &str = "records";

// ── Documents ─────────────────────────────────────────────────────────────────

/// One queue entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCommand {
    #[serde(flatten)]
    pub command: Command,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<Completion>,
}

/// Completion record of a queue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    pub completed_at: NaiveDateTime,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionDoc {
    session: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsDoc {
    #[serde(default = "default_poll_rate_secs")]
    command_poll_rate_secs: u64,
}

impl Default for SettingsDoc {
    fn default() -> Self {
        Self {
            command_poll_rate_secs: default_poll_rate_secs(),
        }
    }
}

fn default_poll_rate_secs() -> u64 {
    DEFAULT_COMMAND_POLL_RATE.as_secs()
}

/// Call and radio status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadioDoc {
    #[serde(default)]
    pub active_call: Option<String>,
    #[serde(default)]
    pub call_started_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub last_refresh: Option<NaiveDateTime>,
    #[serde(default)]
    pub refresh_count: u64,
}

// ── File helpers ──────────────────────────────────────────────────────────────

/// Read a document, treating a missing file as the default value.
fn read_doc<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Replace a document atomically.
fn write_doc<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(value)
        .with_context(|| format!("serializing {}", path.display()))?;
    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, &content)
        .with_context(|| format!("writing temp file {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("finalizing {}", path.display()))
}

async fn blocking<R, F>(what: &'static str, f: F) -> Result<R>
where
    R: Send + 'static,
    F: FnOnce() -> Result<R> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .with_context(|| format!("store {what} task panicked"))?
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

// ── Record filtering ──────────────────────────────────────────────────────────

fn matches_filter(record: &serde_json::Value, filter: &RecordFilter) -> bool {
    match filter {
        RecordFilter::All => true,
        RecordFilter::Session(session) => {
            record.get("session").and_then(serde_json::Value::as_i64) == Some(*session)
        }
        RecordFilter::Since(since) => record
            .get("time")
            .and_then(serde_json::Value::as_str)
            .and_then(|time| NaiveDateTime::parse_from_str(time, TIMESTAMP_FORMAT).ok())
            .is_some_and(|time| time >= *since),
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// `CommandStore` over a directory of JSON documents.
#[derive(Debug)]
pub struct JsonStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn doc(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Every queue entry, completed or not.
    ///
    /// # Errors
    ///
    /// Returns an error if `commands.json` cannot be read or parsed.
    pub async fn queue(&self) -> Result<Vec<StoredCommand>> {
        let path = self.doc(COMMANDS);
        blocking("queue", move || read_doc(&path)).await
    }

    /// Current radio document.
    ///
    /// # Errors
    ///
    /// Returns an error if `radio.json` cannot be read or parsed.
    pub async fn radio(&self) -> Result<RadioDoc> {
        let path = self.doc(RADIO);
        blocking("radio", move || read_doc(&path)).await
    }

    /// Read-modify-write one document under the write lock.
    async fn update<T, R, F>(&self, name: &str, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Default + Send + 'static,
        R: Send + 'static,
        F: FnOnce(&mut T) -> Result<R> + Send + 'static,
    {
        let _guard = self.write_lock.lock().await;
        let path = self.doc(name);
        blocking("update", move || {
            let mut doc: T = read_doc(&path)?;
            let out = f(&mut doc)?;
            write_doc(&path, &doc)?;
            Ok(out)
        })
        .await
    }
}

impl CommandStore for JsonStore {
    async fn pending_commands(&self) -> Result<CommandBatch> {
        let queue = self.queue().await?;
        let batch: CommandBatch = queue
            .into_iter()
            .filter(|entry| entry.completion.is_none())
            .map(|entry| Command {
                app: None,
                ..entry.command
            })
            .collect();
        debug!(count = batch.len(), "pending commands loaded");
        Ok(batch)
    }

    async fn applications(&self) -> Result<Vec<Application>> {
        let path = self.doc(APPLICATIONS);
        blocking("applications", move || read_doc(&path)).await
    }

    async fn set_application_state(&self, app: &Application, change: &StateChange) -> Result<()> {
        let id = app.id;
        let change = change.clone();
        self.update(APPLICATIONS, move |apps: &mut Vec<Application>| {
            let stored = apps
                .iter_mut()
                .find(|stored| stored.id == id)
                .with_context(|| format!("app {id} not found in {APPLICATIONS}"))?;
            stored.state = change.code;
            stored.status = change.status;
            stored.message = change.message;
            Ok(())
        })
        .await
    }

    async fn complete_commands(
        &self,
        commands: &[Command],
        success: bool,
        diagnostic: Option<&str>,
    ) -> Result<()> {
        let ids: Vec<u64> = commands.iter().map(|c| c.id).collect();
        let diagnostic = diagnostic.map(str::to_string);
        self.update(COMMANDS, move |queue: &mut Vec<StoredCommand>| {
            if let Some(missing) = ids
                .iter()
                .find(|id| !queue.iter().any(|entry| entry.command.id == **id))
            {
                anyhow::bail!("command {missing} not found in {COMMANDS}");
            }
            let completed_at = now();
            for entry in queue.iter_mut().filter(|entry| ids.contains(&entry.command.id)) {
                entry.completion = Some(Completion {
                    success,
                    diagnostic: diagnostic.clone(),
                    completed_at,
                });
            }
            Ok(())
        })
        .await
    }

    async fn increment_session(&self) -> Result<i64> {
        self.update(SESSION, |doc: &mut SessionDoc| {
            doc.session += 1;
            Ok(doc.session)
        })
        .await
    }

    async fn command_poll_interval(&self) -> Result<Duration> {
        let path = self.doc(SETTINGS);
        let settings: SettingsDoc = blocking("settings", move || read_doc(&path)).await?;
        Ok(Duration::from_secs(settings.command_poll_rate_secs))
    }

    async fn retrieve_records(
        &self,
        kind: RecordKind,
        filter: &RecordFilter,
    ) -> Result<serde_json::Value> {
        let path = self
            .root
            .join(RECORDS)
            .join(format!("{}.json", kind.category()));
        let filter = *filter;
        blocking("records", move || {
            let records: Vec<serde_json::Value> = read_doc(&path)?;
            Ok(serde_json::Value::Array(
                records
                    .into_iter()
                    .filter(|record| matches_filter(record, &filter))
                    .collect(),
            ))
        })
        .await
    }

    async fn call(&self, destination: &str) -> Result<()> {
        let destination = destination.to_string();
        self.update(RADIO, move |radio: &mut RadioDoc| {
            radio.active_call = Some(destination);
            radio.call_started_at = Some(now());
            Ok(())
        })
        .await
    }

    async fn hangup(&self) -> Result<()> {
        self.update(RADIO, |radio: &mut RadioDoc| {
            radio.active_call = None;
            radio.call_started_at = None;
            Ok(())
        })
        .await
    }

    async fn refresh_radio_status(&self) -> Result<()> {
        self.update(RADIO, |radio: &mut RadioDoc| {
            radio.last_refresh = Some(now());
            radio.refresh_count += 1;
            Ok(())
        })
        .await
    }
}
