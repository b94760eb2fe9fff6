//! Domain entities: collaborator records and the catalogs they reference

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a collaborator.
pub type CollaboratorId = u64;

/// Numeric rank. Lower value means higher authority.
pub type LevelId = u32;

/// Organizational sector a collaborator belongs to.
pub type SectorId = u32;

/// Sentinel id of a collaborator that has not been persisted yet.
///
/// No existing collaborator can be an ancestor or descendant of it.
pub const NEW_COLLABORATOR_ID: CollaboratorId = 0;

/// A person in the supervision hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub id: CollaboratorId,
    pub display_name: String,
    /// Free-text job title
    #[serde(default)]
    pub role: String,
    pub sector_id: SectorId,
    pub level_id: LevelId,
    /// Seniority within a level; not used by layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_level_id: Option<u32>,
    /// Direct supervisor; `None` means root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superior_id: Option<CollaboratorId>,
}

impl Collaborator {
    pub fn new(
        id: CollaboratorId,
        display_name: impl Into<String>,
        sector_id: SectorId,
        level_id: LevelId,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            role: String::new(),
            sector_id,
            level_id,
            sub_level_id: None,
            superior_id: None,
        }
    }

    pub fn with_superior(mut self, superior_id: CollaboratorId) -> Self {
        self.superior_id = Some(superior_id);
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_sub_level(mut self, sub_level_id: u32) -> Self {
        self.sub_level_id = Some(sub_level_id);
        self
    }
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.role.is_empty() {
            write!(f, "{} (#{})", self.display_name, self.id)
        } else {
            write!(f, "{} (#{}, {})", self.display_name, self.id, self.role)
        }
    }
}

/// Entry of the level catalog.
///
/// `order_index` controls the chart row, independent of the rank number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: LevelId,
    pub order_index: i32,
    pub display_name: String,
}

impl Level {
    pub fn new(id: LevelId, order_index: i32, display_name: impl Into<String>) -> Self {
        Self {
            id,
            order_index,
            display_name: display_name.into(),
        }
    }
}

/// Entry of the sector catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub id: SectorId,
    pub display_name: String,
}

impl Sector {
    pub fn new(id: SectorId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}
