pub mod application;
pub mod command;
pub mod records;

pub use application::{Application, StateChange, StateClass, StateCode};
pub use command::{Command, CommandKind};
pub use records::{RecordFilter, RecordKind, TIMESTAMP_FORMAT};
