//! Shared mock infrastructure for unit tests.
//!
//! Every mock appends to one shared [`Journal`] so tests can assert on the
//! relative order of store, target and manifest calls. Failures are injected
//! by operation key, e.g. `"reload"` or `"set_state:2"`.

#![allow(clippy::expect_used)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use qs_common::{Application, Command, CommandKind, RecordFilter, RecordKind, StateChange};
use qs_vmsd::application::ports::{
    ArtifactWriter, CommandExtension, CommandStore, ManifestBuilder, ManifestFactory, McpTarget,
    TargetSession,
};
use qs_vmsd::application::{ExtensionRegistry, Orchestrator, OrchestratorSettings, TargetNetwork};
use qs_vmsd::domain::{AddressPool, CommandBatch};

// ── Journal ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Connect,
    RemoveFiles(Vec<String>),
    AddFiles(Vec<String>),
    Reload(PathBuf),
    Start,
    Stop,
    Restart,
    Close,
    ManifestCreate,
    ManifestAdd(Vec<String>),
    ManifestClose,
    SetState { app: i64, code: i32 },
    Complete { ids: Vec<u64>, success: bool },
    IncrementSession,
    Call(String),
    Hangup,
    Retrieve(RecordKind, RecordFilter),
    WriteArtifact(PathBuf),
    RefreshRadio,
}

pub type Journal = Arc<Mutex<Vec<Event>>>;

fn log(journal: &Journal, event: Event) {
    journal.lock().expect("journal lock").push(event);
}

/// Set of operation keys that fail when invoked.
#[derive(Debug, Default, Clone)]
pub struct Failures(Arc<Mutex<HashSet<String>>>);

impl Failures {
    pub fn add(&self, key: impl Into<String>) {
        self.0.lock().expect("failures lock").insert(key.into());
    }

    fn check(&self, key: &str) -> Result<()> {
        if self.0.lock().expect("failures lock").contains(key) {
            anyhow::bail!("injected failure: {key}");
        }
        Ok(())
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

pub fn app(id: i64, name: &str, state: i32) -> Application {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": name,
        "part": format!("PN-{id}"),
        "state": state,
        "status": "",
        "message": "",
    }))
    .expect("valid application fixture")
}

pub fn cmd(id: u64, kind: &str, data: &str) -> Command {
    Command {
        id,
        kind: CommandKind::parse(kind),
        time: NaiveDate::from_ymd_opt(2024, 3, 4)
            .and_then(|d| d.and_hms_opt(5, 6, 7))
            .expect("valid fixture time"),
        data: data.to_string(),
        app: None,
    }
}

// ── Mock: command store ───────────────────────────────────────────────────────

/// Completion as recorded by [`MockStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub success: bool,
    pub diagnostic: Option<String>,
}

pub struct MockStore {
    journal: Journal,
    pub failures: Failures,
    commands: Mutex<Vec<Command>>,
    apps: Mutex<Vec<Application>>,
    completions: Mutex<Vec<(u64, Recorded)>>,
    session: Mutex<i64>,
    poll_interval: Mutex<Duration>,
    records: serde_json::Value,
}

impl MockStore {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            failures: Failures::default(),
            commands: Mutex::new(Vec::new()),
            apps: Mutex::new(Vec::new()),
            completions: Mutex::new(Vec::new()),
            session: Mutex::new(0),
            poll_interval: Mutex::new(Duration::from_secs(5)),
            records: serde_json::json!([{"session": 1, "value": "r1"}]),
        }
    }

    pub fn queue(&self, commands: impl IntoIterator<Item = Command>) {
        self.commands.lock().expect("lock").extend(commands);
    }

    pub fn set_apps(&self, apps: Vec<Application>) {
        *self.apps.lock().expect("lock") = apps;
    }

    pub fn set_poll_interval(&self, interval: Duration) {
        *self.poll_interval.lock().expect("lock") = interval;
    }

    pub fn apps(&self) -> Vec<Application> {
        self.apps.lock().expect("lock").clone()
    }

    pub fn app(&self, id: i64) -> Application {
        self.apps()
            .into_iter()
            .find(|a| a.id == id)
            .expect("app present")
    }

    pub fn session(&self) -> i64 {
        *self.session.lock().expect("lock")
    }

    pub fn completion(&self, id: u64) -> Option<Recorded> {
        self.completions
            .lock()
            .expect("lock")
            .iter()
            .find(|(cid, _)| *cid == id)
            .map(|(_, r)| r.clone())
    }

    /// Ids in the order their completions were written.
    pub fn completed_ids(&self) -> Vec<u64> {
        self.completions
            .lock()
            .expect("lock")
            .iter()
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn succeeded(&self, id: u64) -> bool {
        self.completion(id).is_some_and(|r| r.success)
    }

    pub fn failed(&self, id: u64) -> bool {
        self.completion(id).is_some_and(|r| !r.success)
    }

    pub fn diagnostic(&self, id: u64) -> String {
        self.completion(id)
            .and_then(|r| r.diagnostic)
            .unwrap_or_default()
    }
}

impl CommandStore for MockStore {
    async fn pending_commands(&self) -> Result<CommandBatch> {
        self.failures.check("pending")?;
        let done: HashSet<u64> = self.completed_ids().into_iter().collect();
        Ok(self
            .commands
            .lock()
            .expect("lock")
            .iter()
            .filter(|c| !done.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn applications(&self) -> Result<Vec<Application>> {
        self.failures.check("applications")?;
        Ok(self.apps())
    }

    async fn set_application_state(&self, app: &Application, change: &StateChange) -> Result<()> {
        self.failures.check(&format!("set_state:{}", app.id))?;
        log(
            &self.journal,
            Event::SetState {
                app: app.id,
                code: change.code.value(),
            },
        );
        let mut apps = self.apps.lock().expect("lock");
        if let Some(stored) = apps.iter_mut().find(|a| a.id == app.id) {
            stored.state = change.code;
            stored.status.clone_from(&change.status);
            stored.message.clone_from(&change.message);
        }
        Ok(())
    }

    async fn complete_commands(
        &self,
        commands: &[Command],
        success: bool,
        diagnostic: Option<&str>,
    ) -> Result<()> {
        for command in commands {
            self.failures.check(&format!("complete:{}", command.id))?;
        }
        log(
            &self.journal,
            Event::Complete {
                ids: commands.iter().map(|c| c.id).collect(),
                success,
            },
        );
        let mut completions = self.completions.lock().expect("lock");
        for command in commands {
            completions.push((
                command.id,
                Recorded {
                    success,
                    diagnostic: diagnostic.map(str::to_string),
                },
            ));
        }
        Ok(())
    }

    async fn increment_session(&self) -> Result<i64> {
        self.failures.check("session")?;
        log(&self.journal, Event::IncrementSession);
        let mut session = self.session.lock().expect("lock");
        *session += 1;
        Ok(*session)
    }

    async fn command_poll_interval(&self) -> Result<Duration> {
        self.failures.check("poll")?;
        Ok(*self.poll_interval.lock().expect("lock"))
    }

    async fn retrieve_records(
        &self,
        kind: RecordKind,
        filter: &RecordFilter,
    ) -> Result<serde_json::Value> {
        self.failures.check("retrieve")?;
        log(&self.journal, Event::Retrieve(kind, *filter));
        Ok(self.records.clone())
    }

    async fn call(&self, destination: &str) -> Result<()> {
        self.failures.check("call")?;
        log(&self.journal, Event::Call(destination.to_string()));
        Ok(())
    }

    async fn hangup(&self) -> Result<()> {
        self.failures.check("hangup")?;
        log(&self.journal, Event::Hangup);
        Ok(())
    }

    async fn refresh_radio_status(&self) -> Result<()> {
        self.failures.check("radio")?;
        log(&self.journal, Event::RefreshRadio);
        Ok(())
    }
}

// ── Mock: MCP target ──────────────────────────────────────────────────────────

pub struct MockTarget {
    journal: Journal,
    pub failures: Failures,
}

pub struct MockSession {
    journal: Journal,
    failures: Failures,
}

impl McpTarget for MockTarget {
    type Session = MockSession;

    async fn connect(&self) -> Result<Self::Session> {
        self.failures.check("connect")?;
        log(&self.journal, Event::Connect);
        Ok(MockSession {
            journal: Arc::clone(&self.journal),
            failures: self.failures.clone(),
        })
    }
}

impl TargetSession for MockSession {
    async fn remove_files(&self, names: &[String]) -> Result<()> {
        self.failures.check("remove_files")?;
        log(&self.journal, Event::RemoveFiles(names.to_vec()));
        Ok(())
    }

    async fn add_files(&self, names: &[String]) -> Result<()> {
        self.failures.check("add_files")?;
        log(&self.journal, Event::AddFiles(names.to_vec()));
        Ok(())
    }

    async fn reload(&self, manifest: &Path) -> Result<()> {
        self.failures.check("reload")?;
        log(&self.journal, Event::Reload(manifest.to_path_buf()));
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        self.failures.check("start")?;
        log(&self.journal, Event::Start);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.failures.check("stop")?;
        log(&self.journal, Event::Stop);
        Ok(())
    }

    async fn restart(&self) -> Result<()> {
        self.failures.check("restart")?;
        log(&self.journal, Event::Restart);
        Ok(())
    }

    async fn close(self) -> Result<()> {
        log(&self.journal, Event::Close);
        self.failures.check("close")
    }
}

// ── Mock: manifests ───────────────────────────────────────────────────────────

pub const MANIFEST_PATH: &str = "/tmp/qs-test/mct-1.json";

pub struct MockManifests {
    journal: Journal,
    pub failures: Failures,
}

pub struct MockManifestBuilder {
    journal: Journal,
    failures: Failures,
    path: PathBuf,
}

impl ManifestFactory for MockManifests {
    type Builder = MockManifestBuilder;

    fn create(&self) -> Result<Self::Builder> {
        self.failures.check("manifest_create")?;
        log(&self.journal, Event::ManifestCreate);
        Ok(MockManifestBuilder {
            journal: Arc::clone(&self.journal),
            failures: self.failures.clone(),
            path: PathBuf::from(MANIFEST_PATH),
        })
    }
}

impl ManifestBuilder for MockManifestBuilder {
    fn add_applications(
        &mut self,
        apps: &[Application],
        _target_address: &str,
        _pool: &AddressPool,
    ) -> Result<()> {
        self.failures.check("manifest_add")?;
        log(
            &self.journal,
            Event::ManifestAdd(apps.iter().map(|a| a.name.clone()).collect()),
        );
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn close(self) -> Result<()> {
        log(&self.journal, Event::ManifestClose);
        Ok(())
    }
}

// ── Mock: artifacts ───────────────────────────────────────────────────────────

pub struct MockArtifacts {
    journal: Journal,
    pub failures: Failures,
    written: Mutex<Vec<(PathBuf, serde_json::Value)>>,
}

impl MockArtifacts {
    pub fn written(&self) -> Vec<(PathBuf, serde_json::Value)> {
        self.written.lock().expect("lock").clone()
    }
}

impl ArtifactWriter for MockArtifacts {
    async fn write_json(&self, path: &Path, value: &serde_json::Value) -> Result<()> {
        self.failures.check("write")?;
        log(&self.journal, Event::WriteArtifact(path.to_path_buf()));
        self.written
            .lock()
            .expect("lock")
            .push((path.to_path_buf(), value.clone()));
        Ok(())
    }
}

// ── Mock: extension ───────────────────────────────────────────────────────────

/// Extension answering from a fixed function and recording `(verb, payload)`.
pub struct RecordingExtension {
    pub calls: Mutex<Vec<(String, String)>>,
    answer: fn(&str, &str) -> Result<bool>,
}

impl RecordingExtension {
    pub fn new(answer: fn(&str, &str) -> Result<bool>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            answer,
        })
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait::async_trait(?Send)]
impl<S> CommandExtension<S> for RecordingExtension {
    async fn process(&self, _store: &S, verb: &str, payload: &str) -> Result<bool> {
        self.calls
            .lock()
            .expect("lock")
            .push((verb.to_string(), payload.to_string()));
        (self.answer)(verb, payload)
    }
}

// ── Harness ───────────────────────────────────────────────────────────────────

pub const OUTPUT_DIR: &str = "/tmp/qs-test/outputs";

pub fn settings() -> OrchestratorSettings {
    OrchestratorSettings {
        network: TargetNetwork {
            address: "192.168.1.10".to_string(),
            pool: "10.0.0.10-10.0.0.250".parse().expect("valid pool"),
        },
        output_dir: PathBuf::from(OUTPUT_DIR),
        call_destination: "777".to_string(),
        default_interval: Duration::from_secs(10),
        status_interval: Duration::from_secs(39),
    }
}

/// All mocks wired to one journal.
pub struct Harness {
    pub journal: Journal,
    pub store: MockStore,
    pub target: MockTarget,
    pub manifests: MockManifests,
    pub artifacts: MockArtifacts,
    pub extensions: ExtensionRegistry<MockStore>,
}

impl Harness {
    pub fn new() -> Self {
        let journal: Journal = Arc::default();
        Self {
            store: MockStore::new(Arc::clone(&journal)),
            target: MockTarget {
                journal: Arc::clone(&journal),
                failures: Failures::default(),
            },
            manifests: MockManifests {
                journal: Arc::clone(&journal),
                failures: Failures::default(),
            },
            artifacts: MockArtifacts {
                journal: Arc::clone(&journal),
                failures: Failures::default(),
                written: Mutex::new(Vec::new()),
            },
            extensions: ExtensionRegistry::new(),
            journal,
        }
    }

    pub fn orchestrator(&self) -> Orchestrator<'_, MockStore, MockTarget, MockManifests, MockArtifacts> {
        Orchestrator::new(
            &self.store,
            &self.target,
            &self.manifests,
            &self.artifacts,
            &self.extensions,
            settings(),
        )
    }

    pub fn events(&self) -> Vec<Event> {
        self.journal.lock().expect("journal lock").clone()
    }

    /// Events of the MCP target session only.
    pub fn target_events(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    Event::Connect
                        | Event::RemoveFiles(_)
                        | Event::AddFiles(_)
                        | Event::Reload(_)
                        | Event::Start
                        | Event::Stop
                        | Event::Restart
                        | Event::Close
                )
            })
            .collect()
    }
}
