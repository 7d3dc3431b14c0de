//! Application services: use-case orchestration.
//!
//! Each service module implements one command-handling use-case by composing
//! domain logic with port trait calls. Services import only from
//! `crate::domain` and `crate::application::ports`, never from
//! `crate::infra` or `crate::commands`.

pub mod completion;
pub mod extensions;
pub mod lifecycle;
pub mod orchestrator;
pub mod retrieval;
pub mod scheduler;
pub mod session;
pub mod update;
