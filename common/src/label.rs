use std::{fmt, path::Path, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

const DELIMITER: char = '_';
const SERVERS_TOKEN: usize = 2;
const CLIENTS_TOKEN: usize = 4;

static RUN_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^_]+_[^_]+_(\d+)_servers_(\d+)_clients(?:_|$)").expect("valid run label regex")
});

/// Topology of one node scaling run, eg. `client_scaling_4_servers_8_clients`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunLabel {
    pub servers: u32,
    pub clients: u32,
}

impl RunLabel {
    pub fn new(servers: u32, clients: u32) -> Self {
        Self { servers, clients }
    }

    /// Strict counterpart of [`derive_label`]: the stem must read
    /// `<kind>_<sweep>_<n>_servers_<m>_clients`, optionally followed by more tokens
    pub fn from_stem(stem: &str) -> Option<Self> {
        let caps = RUN_LABEL_RE.captures(stem)?;
        Some(Self {
            servers: caps.get(1)?.as_str().parse().ok()?,
            clients: caps.get(2)?.as_str().parse().ok()?,
        })
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        Self::from_stem(&path.file_stem()?.to_string_lossy())
    }
}

impl fmt::Display for RunLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Servers: {}, clients: {}", self.servers, self.clients)
    }
}

/// Builds a legend label from the positional tokens of the file name.
///
/// The tokens are not validated. A name outside the
/// `<kind>_<sweep>_<servers>_servers_<clients>_clients_...` convention gives a
/// wrong label, with `?` standing in for tokens that do not exist.
pub fn derive_label(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tokens = stem.split(DELIMITER).collect::<Vec<_>>();
    let servers = tokens.get(SERVERS_TOKEN).copied();
    let clients = tokens.get(CLIENTS_TOKEN).copied();
    if servers.is_none() || clients.is_none() {
        warn!("{} does not follow the node scaling naming convention", path.display());
    }
    format!(
        "Servers: {}, clients: {}",
        servers.unwrap_or("?"),
        clients.unwrap_or("?")
    )
}
