//! Snapshot service
//!
//! Loads the collaborator list, catalogs and expanded-ids as one unit, so a
//! pipeline run never mixes inputs from different moments.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Collaborator, ExpandedIds, Level, LevelId, Sector, SectorId};
use crate::infrastructure::traits::FileSystem;

/// Everything one chart computation reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgSnapshot {
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub sectors: Vec<Sector>,
    #[serde(default)]
    pub expanded: ExpandedIds,
}

impl OrgSnapshot {
    pub fn new(collaborators: Vec<Collaborator>, levels: Vec<Level>) -> Self {
        Self {
            collaborators,
            levels,
            ..Self::default()
        }
    }

    pub fn with_expanded(mut self, expanded: ExpandedIds) -> Self {
        self.expanded = expanded;
        self
    }

    pub fn sector_name(&self, sector_id: SectorId) -> Option<&str> {
        self.sectors
            .iter()
            .find(|s| s.id == sector_id)
            .map(|s| s.display_name.as_str())
    }

    pub fn level_name(&self, level_id: LevelId) -> Option<&str> {
        self.levels
            .iter()
            .find(|l| l.id == level_id)
            .map(|l| l.display_name.as_str())
    }
}

/// Serialization format for snapshots and command output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Toml,
}

impl Format {
    /// Format implied by a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }

    pub fn encode<T: Serialize>(&self, value: &T) -> ApplicationResult<String> {
        match self {
            Format::Json => {
                serde_json::to_string_pretty(value).map_err(|e| ApplicationError::OperationFailed {
                    context: "serialize json".into(),
                    source: Box::new(e),
                })
            }
            Format::Toml => {
                toml::to_string_pretty(value).map_err(|e| ApplicationError::OperationFailed {
                    context: "serialize toml".into(),
                    source: Box::new(e),
                })
            }
        }
    }

    pub fn decode<T: DeserializeOwned>(&self, content: &str) -> Result<T, String> {
        match self {
            Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            other => Err(format!("unknown format '{other}', expected json or toml")),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "json"),
            Format::Toml => write!(f, "toml"),
        }
    }
}

/// Service for reading and writing snapshot files.
pub struct SnapshotService {
    fs: Arc<dyn FileSystem>,
}

impl SnapshotService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load a snapshot; the format follows the file extension.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<OrgSnapshot> {
        let format = Format::from_path(path)
            .ok_or_else(|| ApplicationError::UnsupportedFormat(path.to_path_buf()))?;
        if !self.fs.is_file(path) {
            return Err(ApplicationError::SnapshotNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read snapshot", path)?;
        let snapshot: OrgSnapshot =
            format
                .decode(&content)
                .map_err(|message| ApplicationError::InvalidSnapshot {
                    path: path.to_path_buf(),
                    message,
                })?;
        debug!(
            "load: {} collaborators, {} levels, {} sectors, {} expanded",
            snapshot.collaborators.len(),
            snapshot.levels.len(),
            snapshot.sectors.len(),
            snapshot.expanded.len()
        );
        Ok(snapshot)
    }

    /// Write a snapshot; the format follows the file extension.
    #[instrument(level = "debug", skip(self, snapshot))]
    pub fn save(&self, path: &Path, snapshot: &OrgSnapshot) -> ApplicationResult<()> {
        let format = Format::from_path(path)
            .ok_or_else(|| ApplicationError::UnsupportedFormat(path.to_path_buf()))?;
        let content = format.encode(snapshot)?;
        self.fs
            .write(path, &content)
            .with_path_context("write snapshot", path)
    }
}
