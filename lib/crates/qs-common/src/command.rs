use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::application::Application;

/// Command type as written into the command queue.
///
/// Anything that is not one of the fixed wire names is kept verbatim in
/// [`CommandKind::Other`]; extension commands (`namespace.verb`) land there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CommandKind {
    AddVmApp,
    RemoveVmApp,
    UploadVmAppToGateway,
    DeleteVmAppFromGateway,
    Start,
    Stop,
    Restart,
    RetrieveCommandLogs,
    RetrieveSystemMessages,
    RetrieveFlightData,
    CreateRecSession,
    Call,
    Hangup,
    Other(String),
}

impl CommandKind {
    /// The wire name of this command type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AddVmApp => "ADD_VMAPP",
            Self::RemoveVmApp => "REMOVE_VMAPP",
            Self::UploadVmAppToGateway => "UPLOAD_VMAPP_TO_GATEWAY",
            Self::DeleteVmAppFromGateway => "DELETE_VMAPP_FROM_GATEWAY",
            Self::Start => "START",
            Self::Stop => "STOP",
            Self::Restart => "RESTART",
            Self::RetrieveCommandLogs => "RETRIEVE_COMMAND_LOGS",
            Self::RetrieveSystemMessages => "RETRIEVE_SYSTEM_MESSAGES",
            Self::RetrieveFlightData => "RETRIEVE_FLIGHT_DATA",
            Self::CreateRecSession => "CREATE_REC_SESSION",
            Self::Call => "CALL",
            Self::Hangup => "HANGUP",
            Self::Other(name) => name,
        }
    }

    /// Parse a wire name. Never fails: unknown names become `Other`.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "ADD_VMAPP" => Self::AddVmApp,
            "REMOVE_VMAPP" => Self::RemoveVmApp,
            "UPLOAD_VMAPP_TO_GATEWAY" => Self::UploadVmAppToGateway,
            "DELETE_VMAPP_FROM_GATEWAY" => Self::DeleteVmAppFromGateway,
            "START" => Self::Start,
            "STOP" => Self::Stop,
            "RESTART" => Self::Restart,
            "RETRIEVE_COMMAND_LOGS" => Self::RetrieveCommandLogs,
            "RETRIEVE_SYSTEM_MESSAGES" => Self::RetrieveSystemMessages,
            "RETRIEVE_FLIGHT_DATA" => Self::RetrieveFlightData,
            "CREATE_REC_SESSION" => Self::CreateRecSession,
            "CALL" => Self::Call,
            "HANGUP" => Self::Hangup,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for CommandKind {
    fn from(value: String) -> Self {
        match Self::parse(&value) {
            Self::Other(_) => Self::Other(value),
            known => known,
        }
    }
}

impl From<CommandKind> for String {
    fn from(value: CommandKind) -> Self {
        match value {
            CommandKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queued operator command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Command {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: CommandKind,
    /// When the command was queued.
    pub time: NaiveDateTime,
    /// Raw payload; its meaning depends on `kind`.
    #[serde(default)]
    pub data: String,
    /// The app the payload refers to, filled in during routing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<Application>,
}
