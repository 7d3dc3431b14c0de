//! Pending command work list.
//!
//! A [`CommandBatch`] groups the commands fetched in one poll by type. Buckets
//! are taken whole by the handler that owns them, which is what lets a
//! handler fail without its commands being picked up again in the same cycle.

use qs_common::{Command, CommandKind, RecordKind};

/// The unit of work selected for one pass of the drain loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `ADD_VMAPP` and `REMOVE_VMAPP`, handled together.
    Update,
    UploadToGateway,
    DeleteFromGateway,
    Start,
    Stop,
    Restart,
    Retrieve(RecordKind),
    CreateRecSession,
    Call,
    Hangup,
    /// Any other type, routed to the extension registry.
    Extension(String),
}

impl Step {
    /// The step that owns commands of `kind`.
    #[must_use]
    pub fn for_kind(kind: &CommandKind) -> Self {
        match kind {
            CommandKind::AddVmApp | CommandKind::RemoveVmApp => Self::Update,
            CommandKind::UploadVmAppToGateway => Self::UploadToGateway,
            CommandKind::DeleteVmAppFromGateway => Self::DeleteFromGateway,
            CommandKind::Start => Self::Start,
            CommandKind::Stop => Self::Stop,
            CommandKind::Restart => Self::Restart,
            CommandKind::RetrieveCommandLogs => Self::Retrieve(RecordKind::CommandLog),
            CommandKind::RetrieveSystemMessages => Self::Retrieve(RecordKind::SystemMessages),
            CommandKind::RetrieveFlightData => Self::Retrieve(RecordKind::FlightData),
            CommandKind::CreateRecSession => Self::CreateRecSession,
            CommandKind::Call => Self::Call,
            CommandKind::Hangup => Self::Hangup,
            CommandKind::Other(name) => Self::Extension(name.clone()),
        }
    }

    /// Lower runs first.
    #[must_use]
    pub fn priority(&self) -> u8 {
        match self {
            Self::Update => 0,
            Self::UploadToGateway => 1,
            Self::DeleteFromGateway => 2,
            Self::Start => 3,
            Self::Stop => 4,
            Self::Restart => 5,
            Self::Retrieve(RecordKind::CommandLog) => 6,
            Self::Retrieve(RecordKind::SystemMessages) => 7,
            Self::Retrieve(RecordKind::FlightData) => 8,
            Self::CreateRecSession => 9,
            Self::Call => 10,
            Self::Hangup => 11,
            Self::Extension(_) => 12,
        }
    }
}

/// The command type that retrieves records of `kind`.
#[must_use]
pub fn retrieval_command(kind: RecordKind) -> CommandKind {
    match kind {
        RecordKind::CommandLog => CommandKind::RetrieveCommandLogs,
        RecordKind::SystemMessages => CommandKind::RetrieveSystemMessages,
        RecordKind::FlightData => CommandKind::RetrieveFlightData,
    }
}

/// Pending commands keyed by type, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandBatch {
    buckets: Vec<(CommandKind, Vec<Command>)>,
}

impl CommandBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command to the end of its type's bucket.
    pub fn push(&mut self, command: Command) {
        match self.buckets.iter_mut().find(|(kind, _)| *kind == command.kind) {
            Some((_, bucket)) => bucket.push(command),
            None => self.buckets.push((command.kind.clone(), vec![command])),
        }
    }

    /// Remove and return every command of `kind`, in insertion order.
    pub fn take(&mut self, kind: &CommandKind) -> Vec<Command> {
        match self.buckets.iter().position(|(k, _)| k == kind) {
            Some(index) => self.buckets.remove(index).1,
            None => Vec::new(),
        }
    }

    #[must_use]
    pub fn contains(&self, kind: &CommandKind) -> bool {
        self.buckets.iter().any(|(k, _)| k == kind)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of commands across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|(_, bucket)| bucket.len()).sum()
    }

    /// Command types present, in first-seen order.
    pub fn kinds(&self) -> impl Iterator<Item = &CommandKind> {
        self.buckets.iter().map(|(kind, _)| kind)
    }

    /// The highest-priority step with work pending.
    ///
    /// Ties between extension types go to the type seen first.
    #[must_use]
    pub fn next_step(&self) -> Option<Step> {
        self.buckets
            .iter()
            .map(|(kind, _)| Step::for_kind(kind))
            .min_by_key(Step::priority)
    }
}

impl FromIterator<Command> for CommandBatch {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        let mut batch = Self::new();
        batch.extend(iter);
        batch
    }
}

impl Extend<Command> for CommandBatch {
    fn extend<I: IntoIterator<Item = Command>>(&mut self, iter: I) {
        for command in iter {
            self.push(command);
        }
    }
}
