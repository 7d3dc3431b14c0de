//! Retrieval command payloads and artifact naming.

use chrono::NaiveDateTime;
use qs_common::{Command, RecordFilter, RecordKind, TIMESTAMP_FORMAT};

use crate::domain::error::DispatchError;

/// Layout of the command time inside artifact names.
const ARTIFACT_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Interpret a retrieval payload.
///
/// Empty means everything, an integer selects a recording session, and a
/// `YYYY-MM-DD HH:MM:SS` timestamp selects records since that time. The
/// integer form is tried before the timestamp form.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidRetrievalPayload`] when neither form fits.
pub fn parse_filter(payload: &str) -> Result<RecordFilter, DispatchError> {
    if payload.is_empty() {
        return Ok(RecordFilter::All);
    }
    if let Ok(session) = payload.trim().parse::<i64>() {
        return Ok(RecordFilter::Session(session));
    }
    NaiveDateTime::parse_from_str(payload, TIMESTAMP_FORMAT)
        .map(RecordFilter::Since)
        .map_err(|_| DispatchError::InvalidRetrievalPayload(payload.to_string()))
}

/// File name of the artifact written for `command`:
/// `cmd{time}_{category}_{payload}`.
///
/// Path separators in the payload become `_` so the artifact cannot escape
/// the output directory.
#[must_use]
pub fn artifact_name(kind: RecordKind, command: &Command) -> String {
    let payload: String = command
        .data
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!(
        "cmd{}_{}_{}",
        command.time.format(ARTIFACT_TIME_FORMAT),
        kind.category(),
        payload
    )
}
