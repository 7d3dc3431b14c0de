//! Target update planning for ADD/REMOVE commands.
//!
//! Pure computation: which apps make up the new manifest and which files
//! move on or off the target. Nothing here talks to the store or the target.

use std::collections::HashSet;

use qs_common::{Application, Command};

use crate::domain::error::ResolveError;
use crate::domain::transition::qualifies_for_manifest;

/// Attach each command's application, matched on the string form of its id.
///
/// Returns the resolved apps in command order. The first unresolvable
/// command aborts the whole resolution.
///
/// # Errors
///
/// Returns [`ResolveError::AppNotFound`] naming the unknown reference.
pub fn resolve_apps(
    commands: &mut [Command],
    apps: &[Application],
) -> Result<Vec<Application>, ResolveError> {
    let mut resolved = Vec::with_capacity(commands.len());
    for command in commands.iter_mut() {
        let app = apps
            .iter()
            .find(|app| app.matches_ref(&command.data))
            .ok_or_else(|| ResolveError::AppNotFound {
                reference: command.data.clone(),
                known: apps
                    .iter()
                    .map(|app| app.id.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;
        command.app = Some(app.clone());
        resolved.push(app.clone());
    }
    Ok(resolved)
}

/// What one update pass pushes to the target.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePlan {
    /// Apps listed in the rebuilt manifest, in store order.
    pub membership: Vec<Application>,
    /// Files to delete from the target.
    pub remove_files: Vec<String>,
    /// Files to upload to the target.
    pub add_files: Vec<String>,
}

impl UpdatePlan {
    /// Plan the update for `removing` and `adding` against every known app.
    #[must_use]
    pub fn new(apps: &[Application], removing: &[Application], adding: &[Application]) -> Self {
        let removing_ids: HashSet<i64> = removing.iter().map(|app| app.id).collect();
        let adding_ids: HashSet<i64> = adding.iter().map(|app| app.id).collect();

        let membership: Vec<Application> = apps
            .iter()
            .filter(|app| qualifies_for_manifest(app, &removing_ids, &adding_ids))
            .cloned()
            .collect();

        // A file still named by a manifest member must stay on the target.
        let required: HashSet<&str> = membership.iter().map(|app| app.name.as_str()).collect();
        let remove_files = unique_names(
            removing
                .iter()
                .map(|app| app.name.as_str())
                .filter(|name| !required.contains(name)),
        );
        let add_files = unique_names(adding.iter().map(|app| app.name.as_str()));

        Self {
            membership,
            remove_files,
            add_files,
        }
    }

    /// Manifest member file names.
    #[must_use]
    pub fn required_files(&self) -> Vec<&str> {
        self.membership.iter().map(|app| app.name.as_str()).collect()
    }
}

fn unique_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}
