//! File-backed preference nodes holding versioned JSON documents.
//!
//! # Responsibility
//! - Store per-feature settings (map home/style, data source lists).
//! - Keep the on-disk shape `{ "format_version": N, "value": ... }`.
//!
//! # Invariants
//! - Node paths are `/`-separated segments of `[a-z0-9_.-]`, never `..`.
//! - A document newer than [`PREFERENCES_FORMAT_VERSION`] is rejected;
//!   older documents are read as-is, there is no migration step.
//! - Writes go through a temp file and rename, so readers never see a
//!   half-written document.

use crate::model::geo::GeoPoint;
use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const PREFERENCES_FORMAT_VERSION: u32 = 1;

const MAP_NODE: &str = "map";
const MAP_KEY: &str = "preferences";
const SOURCES_NODE: &str = "sources";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    InvalidName(String),
    UnsupportedFormatVersion { path: PathBuf, found: u32, supported: u32 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "{}: invalid preference document: {source}", path.display())
            }
            Self::InvalidName(name) => write!(f, "invalid preference node or key `{name}`"),
            Self::UnsupportedFormatVersion {
                path,
                found,
                supported,
            } => write!(
                f,
                "{}: format version {found} is newer than supported {supported}",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidName(_) | Self::UnsupportedFormatVersion { .. } => None,
        }
    }
}

#[derive(Serialize)]
struct EnvelopeOut<'a, T> {
    format_version: u32,
    value: &'a T,
}

#[derive(Deserialize)]
struct EnvelopeIn<T> {
    format_version: u32,
    value: T,
}

/// Root of a preference node tree.
#[derive(Debug, Clone)]
pub struct Preferences {
    root: PathBuf,
}

impl Preferences {
    /// Opens (creating if needed) the tree rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> ConfigResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| ConfigError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn put<T: Serialize>(&self, node: &str, key: &str, value: &T) -> ConfigResult<()> {
        let path = self.document_path(node, key)?;
        let dir = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let bytes = serde_json::to_vec_pretty(&EnvelopeOut {
            format_version: PREFERENCES_FORMAT_VERSION,
            value,
        })
        .map_err(|source| ConfigError::Json {
            path: path.clone(),
            source,
        })?;

        let staging = path.with_extension("json.tmp");
        fs::write(&staging, bytes).map_err(|source| ConfigError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        info!("event=preferences_put module=config status=ok node={node} key={key}");
        Ok(())
    }

    /// Reads a document; `Ok(None)` when it does not exist.
    pub fn get<T: DeserializeOwned>(&self, node: &str, key: &str) -> ConfigResult<Option<T>> {
        let path = self.document_path(node, key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        let envelope: EnvelopeIn<T> =
            serde_json::from_slice(&bytes).map_err(|source| ConfigError::Json {
                path: path.clone(),
                source,
            })?;
        if envelope.format_version > PREFERENCES_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedFormatVersion {
                path,
                found: envelope.format_version,
                supported: PREFERENCES_FORMAT_VERSION,
            });
        }
        Ok(Some(envelope.value))
    }

    pub fn get_or_default<T: DeserializeOwned + Default>(
        &self,
        node: &str,
        key: &str,
    ) -> ConfigResult<T> {
        Ok(self.get(node, key)?.unwrap_or_default())
    }

    /// Deletes a document; returns whether it existed.
    pub fn remove(&self, node: &str, key: &str) -> ConfigResult<bool> {
        let path = self.document_path(node, key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    /// Keys stored directly under `node`, sorted.
    pub fn keys(&self, node: &str) -> ConfigResult<Vec<String>> {
        let dir = self.node_path(node)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(ConfigError::Io { path: dir, source }),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ConfigError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn node_path(&self, node: &str) -> ConfigResult<PathBuf> {
        let mut path = self.root.clone();
        for segment in node.split('/') {
            if !is_valid_name(segment) {
                return Err(ConfigError::InvalidName(node.to_string()));
            }
            path.push(segment);
        }
        Ok(path)
    }

    fn document_path(&self, node: &str, key: &str) -> ConfigResult<PathBuf> {
        if !is_valid_name(key) {
            return Err(ConfigError::InvalidName(key.to_string()));
        }
        Ok(self.node_path(node)?.join(format!("{key}.json")))
    }
}

fn is_valid_name(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'))
}

/// Map view preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPreferences {
    pub style: String,
    pub home: GeoPoint,
    pub home_zoom: f64,
}

impl Default for MapPreferences {
    fn default() -> Self {
        Self {
            style: "default".to_string(),
            home: GeoPoint::new(57.7, 11.97),
            home_zoom: 0.5,
        }
    }
}

impl MapPreferences {
    pub fn load(preferences: &Preferences) -> ConfigResult<Self> {
        preferences.get_or_default(MAP_NODE, MAP_KEY)
    }

    pub fn save(&self, preferences: &Preferences) -> ConfigResult<()> {
        preferences.put(MAP_NODE, MAP_KEY, self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    File,
    Directory,
}

/// One configured data source of a monitoring domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    pub kind: SourceKind,
    pub path: PathBuf,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// Data sources of one domain, stored under `sources/<domain>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceList {
    pub sources: Vec<SourceEntry>,
}

impl SourceList {
    pub fn load(preferences: &Preferences, domain: &str) -> ConfigResult<Self> {
        preferences.get_or_default(SOURCES_NODE, domain)
    }

    pub fn save(&self, preferences: &Preferences, domain: &str) -> ConfigResult<()> {
        preferences.put(SOURCES_NODE, domain, self)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &SourceEntry> + '_ {
        self.sources.iter().filter(|source| source.enabled)
    }
}
