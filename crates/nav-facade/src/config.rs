//! Server configuration: the key/value file that names every data file.
//!
//! ```text
//! # server.ini
//! hsgrData  = map.hsgr
//! ramIndex  = map.ramIndex
//! fileIndex = map.fileIndex
//! nodesData = map.nodes
//! edgesData = map.edges
//! namesData = map.names
//! timestamp = map.timestamp
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use nav_core::{DataError, DataResult};

// ── ServerConfig ──────────────────────────────────────────────────────────────

/// Flat key/value mapping.  Keys are case-sensitive; a repeated key keeps the
/// last value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerConfig {
    entries: BTreeMap<String, String>,
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value` text.
    ///
    /// Blank lines and lines starting with `#` or `;` are skipped.  Keys and
    /// values are trimmed.  Any other line without `=`, or with an empty
    /// key, is a [`DataError::Config`].
    pub fn parse(text: &str) -> DataResult<Self> {
        let mut config = ServerConfig::new();
        for (n, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(DataError::Config(format!("line {}: expected key=value, got {line:?}", n + 1)));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(DataError::Config(format!("line {}: empty key", n + 1)));
            }
            config.set(key, value.trim());
        }
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> DataResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| DataError::from_open(path, e))?;
        Self::parse(&text)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    #[inline]
    pub fn holds(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for ServerConfig {
    type Err = DataError;

    fn from_str(s: &str) -> DataResult<Self> {
        Self::parse(s)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ServerConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = ServerConfig::new();
        for (k, v) in iter {
            config.set(k, v);
        }
        config
    }
}

// ── ServerPaths ───────────────────────────────────────────────────────────────

/// Absolute locations of the seven data files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerPaths {
    pub hsgr_data:  PathBuf,
    pub ram_index:  PathBuf,
    pub file_index: PathBuf,
    pub nodes_data: PathBuf,
    pub edges_data: PathBuf,
    pub names_data: PathBuf,
    pub timestamp:  PathBuf,
}

impl ServerPaths {
    /// Every key a config must hold, in the order they are checked.
    pub const REQUIRED_KEYS: [&'static str; 7] = [
        "hsgrData",
        "ramIndex",
        "fileIndex",
        "nodesData",
        "edgesData",
        "namesData",
        "timestamp",
    ];

    /// Resolve the configured file names against `base_dir`.
    ///
    /// Relative values are joined onto `base_dir`, and a relative result is
    /// then made absolute against the working directory.  Absolute values are
    /// kept.  Touches no files.
    ///
    /// # Errors
    ///
    /// - [`DataError::Config`] naming the first missing key, in
    ///   [`REQUIRED_KEYS`](Self::REQUIRED_KEYS) order.
    /// - [`DataError::Io`] if the working directory cannot be determined.
    pub fn from_config(config: &ServerConfig, base_dir: &Path) -> DataResult<Self> {
        let resolve = |key: &str| -> DataResult<PathBuf> {
            let value = config
                .get(key)
                .ok_or_else(|| DataError::Config(format!("no `{key}` entry in server config")))?;
            let joined = base_dir.join(value);
            std::path::absolute(&joined).map_err(|e| DataError::io(&joined, e))
        };

        Ok(ServerPaths {
            hsgr_data:  resolve("hsgrData")?,
            ram_index:  resolve("ramIndex")?,
            file_index: resolve("fileIndex")?,
            nodes_data: resolve("nodesData")?,
            edges_data: resolve("edgesData")?,
            names_data: resolve("namesData")?,
            timestamp:  resolve("timestamp")?,
        })
    }
}
