//! Domain types and validators for daemon configuration.
//!
//! Pure functions only: no I/O, no async, no environment access. Loading
//! from the environment lives in `crate::infra::config`.

use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Address pool ─────────────────────────────────────────────────────────────

/// Inclusive block of IPv4 addresses handed to guest VM apps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AddressPool {
    first: Ipv4Addr,
    last: Ipv4Addr,
}

impl AddressPool {
    /// # Errors
    ///
    /// Returns an error if `first` comes after `last`.
    pub fn new(first: Ipv4Addr, last: Ipv4Addr) -> Result<Self, ConfigError> {
        if u32::from(first) > u32::from(last) {
            return Err(ConfigError::InvertedAddressPool { first, last });
        }
        Ok(Self { first, last })
    }

    #[must_use]
    pub fn first(&self) -> Ipv4Addr {
        self.first
    }

    #[must_use]
    pub fn last(&self) -> Ipv4Addr {
        self.last
    }

    /// Number of addresses in the pool.
    #[must_use]
    pub fn len(&self) -> u64 {
        u64::from(u32::from(self.last) - u32::from(self.first)) + 1
    }

    /// A pool always holds at least one address.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The `index`-th address of the pool, if it is in range.
    #[must_use]
    pub fn nth(&self, index: usize) -> Option<Ipv4Addr> {
        let offset = u32::try_from(index).ok()?;
        let addr = u32::from(self.first).checked_add(offset)?;
        (addr <= u32::from(self.last)).then(|| Ipv4Addr::from(addr))
    }
}

impl FromStr for AddressPool {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidAddressPool(s.to_string());
        let (first, last) = s.split_once('-').ok_or_else(invalid)?;
        let first = first.trim().parse().map_err(|_| invalid())?;
        let last = last.trim().parse().map_err(|_| invalid())?;
        Self::new(first, last)
    }
}

impl TryFrom<String> for AddressPool {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AddressPool> for String {
    fn from(value: AddressPool) -> Self {
        value.to_string()
    }
}

impl fmt::Display for AddressPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

// ── Config schema ────────────────────────────────────────────────────────────

/// Daemon configuration, one field per `QS_VMS_<FIELD>` environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Address of the MCP target.
    #[serde(default = "default_mcp_address")]
    pub mcp_address: String,

    /// Control port of the MCP target.
    #[serde(default = "default_mcp_port")]
    pub mcp_port: u16,

    /// Account used by the control tool.
    #[serde(default = "default_mcp_username")]
    pub mcp_username: String,

    /// Path to a file holding the target password (never the password itself).
    #[serde(default)]
    pub mcp_password_file: Option<PathBuf>,

    /// Target control tool executable.
    #[serde(default = "default_mcp_ctl")]
    pub mcp_ctl: String,

    /// Upper bound for a single control tool invocation.
    #[serde(default = "default_mcp_timeout_secs")]
    pub mcp_timeout_secs: u64,

    /// Guest address pool passed through to the manifest.
    #[serde(default = "default_domu_ip_range")]
    pub domu_ip_range: AddressPool,

    /// Directory of the file-backed command store.
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    /// Directory receiving retrieval artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory receiving rebuilt manifests.
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: PathBuf,

    /// Directory searched for executable command extensions.
    #[serde(default)]
    pub extensions_dir: Option<PathBuf>,

    /// Period of the radio/target status refresh.
    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: u64,

    /// Destination dialed by CALL commands.
    #[serde(default = "default_call_destination")]
    pub call_destination: String,
}

impl DaemonConfig {
    /// Check cross-field invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mcp_address.trim().is_empty() {
            return Err(ConfigError::Empty("mcp_address"));
        }
        if self.mcp_ctl.trim().is_empty() {
            return Err(ConfigError::Empty("mcp_ctl"));
        }
        if self.status_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval("status_interval_secs"));
        }
        if self.mcp_timeout_secs == 0 {
            return Err(ConfigError::ZeroInterval("mcp_timeout_secs"));
        }
        Ok(())
    }

    #[must_use]
    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }

    #[must_use]
    pub fn mcp_timeout(&self) -> Duration {
        Duration::from_secs(self.mcp_timeout_secs)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            mcp_address: default_mcp_address(),
            mcp_port: default_mcp_port(),
            mcp_username: default_mcp_username(),
            mcp_password_file: None,
            mcp_ctl: default_mcp_ctl(),
            mcp_timeout_secs: default_mcp_timeout_secs(),
            domu_ip_range: default_domu_ip_range(),
            store_dir: default_store_dir(),
            output_dir: default_output_dir(),
            manifest_dir: default_manifest_dir(),
            extensions_dir: None,
            status_interval_secs: default_status_interval_secs(),
            call_destination: default_call_destination(),
        }
    }
}

fn default_mcp_address() -> String {
    "192.168.1.10".to_string()
}

fn default_mcp_port() -> u16 {
    8022
}

fn default_mcp_username() -> String {
    "admin".to_string()
}

fn default_mcp_ctl() -> String {
    "mcpctl".to_string()
}

fn default_mcp_timeout_secs() -> u64 {
    60
}

fn default_domu_ip_range() -> AddressPool {
    AddressPool {
        first: Ipv4Addr::new(10, 0, 0, 10),
        last: Ipv4Addr::new(10, 0, 0, 250),
    }
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("/opt/qs/db")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("/opt/qs/outputs")
}

fn default_manifest_dir() -> PathBuf {
    PathBuf::from("/opt/qs/mct")
}

fn default_status_interval_secs() -> u64 {
    39
}

fn default_call_destination() -> String {
    "777".to_string()
}
