//! VM-app state transitions driven by install/remove commands.
//!
//! Only two transitions originate here. Everything else (195 → 100 after
//! boot, → 300 on fault) is written by other processes and is read-only
//! input to manifest selection.

use std::collections::HashSet;

use qs_common::{Application, StateChange, StateCode};

/// Status text stored for an app that was taken off the host.
pub const GATEWAY_STORAGE_STATUS: &str = "GATEWAY Storage";

/// Status text stored for an app that was placed on the host.
pub const VM_CONFIGURED_STATUS: &str = "On Host - VM Configured";

/// Transition applied once an app has been removed from the target.
#[must_use]
pub fn on_remove(app: &Application) -> StateChange {
    StateChange {
        code: StateCode::GATEWAY_STORAGE,
        status: GATEWAY_STORAGE_STATUS.to_string(),
        message: format!("Success - VM/App \"{}\" removed from Host", app.part),
    }
}

/// Transition applied once an app has been installed on the target.
#[must_use]
pub fn on_add(app: &Application) -> StateChange {
    StateChange {
        code: StateCode::VM_CONFIGURED,
        status: VM_CONFIGURED_STATUS.to_string(),
        message: format!("Success - VM/App \"{}\" installed", app.part),
    }
}

/// Whether `app` belongs in the manifest being rebuilt.
///
/// Apps being added always qualify. Otherwise the app must be on the host
/// and not in the set being removed, whatever its stored state says.
#[must_use]
pub fn qualifies_for_manifest(
    app: &Application,
    removing: &HashSet<i64>,
    adding: &HashSet<i64>,
) -> bool {
    adding.contains(&app.id) || (app.state.is_on_host() && !removing.contains(&app.id))
}
