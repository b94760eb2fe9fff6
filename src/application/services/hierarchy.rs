//! Hierarchy service
//!
//! Queries behind the collaborator edit form: who may supervise whom, whether
//! a current assignment still holds, and what moves along with a reassignment.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{
    inspect, Collaborator, CollaboratorId, DomainError, HierarchyGraph, IntegrityIssue, LevelId,
    SectorId, SuperiorResolver,
};

/// Edit-form answer for one collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityReport {
    pub node_id: CollaboratorId,
    pub sector_id: SectorId,
    pub level_id: LevelId,
    pub candidates: Vec<Collaborator>,
    /// Currently assigned superior, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_superior: Option<CollaboratorId>,
    /// Why the current superior is no longer valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_superior_problem: Option<String>,
}

impl EligibilityReport {
    pub fn candidate_ids(&self) -> Vec<CollaboratorId> {
        self.candidates.iter().map(|c| c.id).collect()
    }

    pub fn current_superior_is_valid(&self) -> bool {
        self.current_superior_problem.is_none()
    }
}

/// Subordinates that follow a collaborator when it changes supervisor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignmentImpact {
    pub node_id: CollaboratorId,
    pub new_superior_id: Option<CollaboratorId>,
    pub moved: Vec<CollaboratorId>,
}

#[derive(Debug, Default)]
pub struct HierarchyService;

impl HierarchyService {
    pub fn new() -> Self {
        Self
    }

    /// Eligible superiors for `node_id` with the sector/level chosen in the form.
    ///
    /// The collaborator's current superior, if it no longer satisfies the
    /// rules under the new sector or level, is flagged rather than dropped.
    #[instrument(level = "debug", skip(self, all))]
    pub fn eligible(
        &self,
        all: &[Collaborator],
        node_id: CollaboratorId,
        sector_id: SectorId,
        level_id: LevelId,
    ) -> EligibilityReport {
        let resolver = SuperiorResolver::new(all);
        let candidates: Vec<Collaborator> = resolver
            .eligible_superiors(node_id, sector_id, level_id)
            .into_iter()
            .cloned()
            .collect();
        debug!("eligible: {} candidates for #{}", candidates.len(), node_id);

        let current_superior = resolver.graph().get(node_id).and_then(|n| n.superior_id);
        let current_superior_problem = current_superior.and_then(|sup| {
            resolver
                .check_superior(node_id, sector_id, level_id, sup)
                .err()
                .map(|e| e.to_string())
        });

        EligibilityReport {
            node_id,
            sector_id,
            level_id,
            candidates,
            current_superior,
            current_superior_problem,
        }
    }

    /// Validate a proposed superior; the error names the first rule broken.
    pub fn validate_assignment(
        &self,
        all: &[Collaborator],
        node_id: CollaboratorId,
        sector_id: SectorId,
        level_id: LevelId,
        superior_id: Option<CollaboratorId>,
    ) -> ApplicationResult<()> {
        match superior_id {
            Some(sup) => SuperiorResolver::new(all)
                .check_superior(node_id, sector_id, level_id, sup)
                .map_err(Into::into),
            None => Ok(()),
        }
    }

    /// Descendants that move with `node_id` when it gets `new_superior_id`.
    #[instrument(level = "debug", skip(self, all))]
    pub fn reassignment_impact(
        &self,
        all: &[Collaborator],
        node_id: CollaboratorId,
        new_superior_id: Option<CollaboratorId>,
    ) -> ApplicationResult<ReassignmentImpact> {
        let graph = HierarchyGraph::new(all);
        let node = graph
            .get(node_id)
            .ok_or(DomainError::UnknownCollaborator(node_id))?;
        if let Some(sup) = new_superior_id {
            SuperiorResolver::from_graph(graph.clone()).check_superior(
                node_id,
                node.sector_id,
                node.level_id,
                sup,
            )?;
        }
        let moved = graph.descendants(node_id).iter().map(|c| c.id).collect();
        Ok(ReassignmentImpact {
            node_id,
            new_superior_id,
            moved,
        })
    }

    /// Direct and indirect subordinates of a known collaborator.
    pub fn descendants<'a>(
        &self,
        all: &'a [Collaborator],
        node_id: CollaboratorId,
    ) -> ApplicationResult<Vec<&'a Collaborator>> {
        let graph = HierarchyGraph::new(all);
        if !graph.contains(node_id) {
            return Err(DomainError::UnknownCollaborator(node_id).into());
        }
        Ok(graph.descendants(node_id))
    }

    /// Collaborators whose names contain `query`, ignoring case and accents.
    pub fn search<'a>(&self, all: &'a [Collaborator], query: &str) -> Vec<&'a Collaborator> {
        HierarchyGraph::new(all).search(query)
    }

    pub fn integrity(&self, all: &[Collaborator]) -> Vec<IntegrityIssue> {
        inspect(all)
    }
}
