use serde::{Deserialize, Serialize};

/// Lifecycle state code of a VM app, as stored by the command store.
///
/// The numeric values are shared with existing stored records and must not
/// change. Ranges carry meaning (see [`StateClass`]); only a handful of
/// codes have names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct StateCode(pub i32);

impl StateCode {
    /// Stored on the ground station only.
    pub const GROUND_STATION: Self = Self(50);
    /// Stored on the gateway, not on the host.
    pub const GATEWAY_STORAGE: Self = Self(80);
    /// On the host and fully operational.
    pub const OPERATIONAL: Self = Self(100);
    /// VM is initializing.
    pub const VM_INITIALIZING: Self = Self(190);
    /// Placed on the host, VM not yet started.
    pub const VM_CONFIGURED: Self = Self(195);
    /// On the host but not operational.
    pub const PARKED: Self = Self(200);
    /// First error code; VM/app present but faulted.
    pub const FAULTED: Self = Self(300);

    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Range classification of this code.
    #[must_use]
    pub const fn class(self) -> StateClass {
        match self.0 {
            i32::MIN..=99 => StateClass::NotOnHost,
            100 => StateClass::Operational,
            101..=199 => StateClass::OperationalVariant,
            200..=299 => StateClass::Parked,
            300..=399 => StateClass::Faulted,
            _ => StateClass::Unknown,
        }
    }

    /// Whether the app is physically present on the host (`>= 100`).
    #[must_use]
    pub const fn is_on_host(self) -> bool {
        self.0 >= Self::OPERATIONAL.0
    }
}

impl From<i32> for StateCode {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for StateCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Semantic range a [`StateCode`] falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateClass {
    /// `< 100`
    NotOnHost,
    /// `100`
    Operational,
    /// `101..=199`
    OperationalVariant,
    /// `200..=299`
    Parked,
    /// `300..=399`
    Faulted,
    /// Outside every documented range.
    Unknown,
}

/// A VM app record.
///
/// Only `id`, `name`, `part` and `state` carry meaning for the daemon; the
/// remaining store columns travel through `extra` untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Application {
    pub id: i64,
    /// File name of the app image on the target.
    pub name: String,
    /// Part number, used in operator-facing messages.
    pub part: String,
    pub state: StateCode,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Application {
    /// Whether a command payload refers to this app.
    ///
    /// Commands carry the id as text; the comparison is on the string form
    /// so `"7"` matches id `7` but `" 7"` and `"07"` do not.
    #[must_use]
    pub fn matches_ref(&self, reference: &str) -> bool {
        self.id.to_string() == reference
    }
}

/// A state transition to persist against an [`Application`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub code: StateCode,
    pub status: String,
    pub message: String,
}
