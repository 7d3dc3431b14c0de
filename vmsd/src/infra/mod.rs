//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, the
//! file-backed command store, manifest files, retrieval artifacts and
//! executable extensions.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` are forbidden.

pub mod artifacts;
pub mod command_runner;
pub mod config;
pub mod extensions;
pub mod json_store;
pub mod manifest;
pub mod target;
