//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::{CollaboratorId, LevelId, SectorId};

/// Domain errors represent business rule violations in the supervision hierarchy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("collaborator not found: #{0}")]
    UnknownCollaborator(CollaboratorId),

    #[error("collaborator #{0} cannot supervise itself")]
    SelfSupervision(CollaboratorId),

    #[error("superior not found: #{0}")]
    UnknownSuperior(CollaboratorId),

    #[error("superior #{superior_id} is in sector {superior_sector}, expected sector {expected}")]
    SectorMismatch {
        superior_id: CollaboratorId,
        superior_sector: SectorId,
        expected: SectorId,
    },

    #[error("superior #{superior_id} has level {superior_level}, which ranks below level {level}")]
    RankBelow {
        superior_id: CollaboratorId,
        superior_level: LevelId,
        level: LevelId,
    },

    #[error("cycle detected in hierarchy: #{superior_id} is subordinate to #{node_id}")]
    CycleDetected {
        node_id: CollaboratorId,
        superior_id: CollaboratorId,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
