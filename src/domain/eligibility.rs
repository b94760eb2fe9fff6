//! Superior eligibility: which collaborators may supervise a given one.
//!
//! A candidate is eligible when it is in the same sector, ranks equal or
//! higher (lower or equal `level_id`), and assigning it would not close a
//! cycle in the supervision graph.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::domain::entities::{Collaborator, CollaboratorId, LevelId, SectorId, NEW_COLLABORATOR_ID};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::graph::HierarchyGraph;

/// Eligibility queries over one hierarchy snapshot.
///
/// Build once and reuse when asking several questions about the same snapshot.
#[derive(Debug, Clone)]
pub struct SuperiorResolver<'a> {
    graph: HierarchyGraph<'a>,
}

impl<'a> SuperiorResolver<'a> {
    pub fn new(nodes: &'a [Collaborator]) -> Self {
        Self {
            graph: HierarchyGraph::new(nodes),
        }
    }

    pub fn from_graph(graph: HierarchyGraph<'a>) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &HierarchyGraph<'a> {
        &self.graph
    }

    /// True if making `candidate` the superior of `node_id` would close a cycle.
    ///
    /// Walks the superior chain upward from `candidate`. Reaching `node_id`
    /// means `candidate` is below it. Revisiting any id means the data is
    /// already cyclic, which is reported as a cycle as well.
    pub fn would_create_cycle(
        &self,
        node_id: CollaboratorId,
        candidate: Option<CollaboratorId>,
    ) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };
        if candidate == node_id {
            return true;
        }

        let mut visited = HashSet::new();
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == node_id {
                return true;
            }
            if !visited.insert(id) {
                debug!("superior chain from #{} loops at #{}", candidate, id);
                return true;
            }
            current = self.graph.get(id).and_then(|n| n.superior_id);
        }
        false
    }

    /// Candidates that may legally supervise a collaborator with the given
    /// sector and level. Input order is preserved.
    #[instrument(level = "debug", skip(self))]
    pub fn eligible_superiors(
        &self,
        node_id: CollaboratorId,
        sector_id: SectorId,
        level_id: LevelId,
    ) -> Vec<&'a Collaborator> {
        let is_new = node_id == NEW_COLLABORATOR_ID;
        let eligible: Vec<_> = self
            .graph
            .nodes()
            .iter()
            .filter(|c| is_new || c.id != node_id)
            .filter(|c| c.sector_id == sector_id)
            .filter(|c| c.level_id <= level_id)
            .filter(|c| is_new || !self.would_create_cycle(node_id, Some(c.id)))
            .collect();
        debug!("{} eligible superiors for #{}", eligible.len(), node_id);
        eligible
    }

    /// Validate one proposed (or already assigned) superior.
    ///
    /// Reports the first rule the assignment breaks.
    pub fn check_superior(
        &self,
        node_id: CollaboratorId,
        sector_id: SectorId,
        level_id: LevelId,
        superior_id: CollaboratorId,
    ) -> DomainResult<()> {
        let is_new = node_id == NEW_COLLABORATOR_ID;
        if !is_new && superior_id == node_id {
            return Err(DomainError::SelfSupervision(node_id));
        }
        let superior = self
            .graph
            .get(superior_id)
            .ok_or(DomainError::UnknownSuperior(superior_id))?;
        if superior.sector_id != sector_id {
            return Err(DomainError::SectorMismatch {
                superior_id,
                superior_sector: superior.sector_id,
                expected: sector_id,
            });
        }
        if superior.level_id > level_id {
            return Err(DomainError::RankBelow {
                superior_id,
                superior_level: superior.level_id,
                level: level_id,
            });
        }
        if !is_new && self.would_create_cycle(node_id, Some(superior_id)) {
            return Err(DomainError::CycleDetected {
                node_id,
                superior_id,
            });
        }
        Ok(())
    }

    /// Everyone who moves along when `node_id` is reassigned.
    pub fn descendants(&self, node_id: CollaboratorId) -> Vec<&'a Collaborator> {
        self.graph.descendants(node_id)
    }
}

/// True if `candidate` supervising `node_id` would create a cycle.
///
/// `None` (no superior) never does.
pub fn would_create_cycle(
    all: &[Collaborator],
    node_id: CollaboratorId,
    candidate: Option<CollaboratorId>,
) -> bool {
    SuperiorResolver::new(all).would_create_cycle(node_id, candidate)
}

/// Legal superiors for a collaborator. `node_id == 0` denotes a new collaborator.
///
/// An empty result is a valid answer, not an error.
pub fn compute_eligible_superiors(
    all: &[Collaborator],
    node_id: CollaboratorId,
    sector_id: SectorId,
    level_id: LevelId,
) -> Vec<&Collaborator> {
    SuperiorResolver::new(all).eligible_superiors(node_id, sector_id, level_id)
}

/// Direct and indirect subordinates of `node_id`.
pub fn get_descendants(all: &[Collaborator], node_id: CollaboratorId) -> Vec<&Collaborator> {
    HierarchyGraph::new(all).descendants(node_id)
}

/// Validate a superior assignment against every hierarchy rule.
pub fn check_superior(
    all: &[Collaborator],
    node_id: CollaboratorId,
    sector_id: SectorId,
    level_id: LevelId,
    superior_id: CollaboratorId,
) -> DomainResult<()> {
    SuperiorResolver::new(all).check_superior(node_id, sector_id, level_id, superior_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(nodes: &[&Collaborator]) -> Vec<CollaboratorId> {
        nodes.iter().map(|n| n.id).collect()
    }

    fn scenario() -> Vec<Collaborator> {
        vec![
            Collaborator::new(1, "A", 1, 1),
            Collaborator::new(2, "B", 1, 2).with_superior(1),
            Collaborator::new(3, "C", 1, 2).with_superior(1),
            Collaborator::new(4, "D", 1, 3).with_superior(2),
        ]
    }

    #[test]
    fn given_no_candidate_when_checking_cycle_then_false() {
        assert!(!would_create_cycle(&scenario(), 1, None));
    }

    #[test]
    fn given_self_candidate_when_checking_cycle_then_true() {
        assert!(would_create_cycle(&scenario(), 3, Some(3)));
    }

    #[test]
    fn given_grandchild_candidate_when_checking_cycle_then_true() {
        assert!(would_create_cycle(&scenario(), 1, Some(4)));
    }

    #[test]
    fn given_sibling_candidate_when_checking_cycle_then_false() {
        assert!(!would_create_cycle(&scenario(), 3, Some(2)));
    }

    #[test]
    fn given_unknown_candidate_when_checking_cycle_then_false() {
        assert!(!would_create_cycle(&scenario(), 1, Some(42)));
    }

    #[test]
    fn given_corrupted_loop_elsewhere_when_checking_cycle_then_reports_cycle() {
        let nodes = vec![
            Collaborator::new(1, "A", 1, 1),
            Collaborator::new(2, "B", 1, 1).with_superior(3),
            Collaborator::new(3, "C", 1, 1).with_superior(2),
        ];
        assert!(would_create_cycle(&nodes, 1, Some(2)));
    }

    #[test]
    fn given_existing_node_when_computing_eligible_then_excludes_self_and_subtree() {
        let nodes = scenario();
        let eligible = compute_eligible_superiors(&nodes, 2, 1, 2);
        assert_eq!(ids(&eligible), vec![1, 3]);
    }

    #[test]
    fn given_other_sector_when_computing_eligible_then_empty() {
        let nodes = scenario();
        assert!(compute_eligible_superiors(&nodes, 0, 9, 3).is_empty());
    }

    #[test]
    fn given_assigned_superior_in_other_sector_when_checking_then_sector_mismatch() {
        let nodes = scenario();
        let err = check_superior(&nodes, 3, 2, 2, 1).unwrap_err();
        assert_eq!(
            err,
            DomainError::SectorMismatch {
                superior_id: 1,
                superior_sector: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn given_superior_ranking_below_when_checking_then_rank_below() {
        let nodes = scenario();
        let err = check_superior(&nodes, 3, 1, 2, 4).unwrap_err();
        assert!(matches!(err, DomainError::RankBelow { superior_level: 3, .. }));
    }

    #[test]
    fn given_subordinate_as_superior_when_checking_then_cycle() {
        let nodes = scenario();
        let err = check_superior(&nodes, 1, 1, 3, 4).unwrap_err();
        assert_eq!(
            err,
            DomainError::CycleDetected {
                node_id: 1,
                superior_id: 4
            }
        );
    }

    #[test]
    fn given_valid_superior_when_checking_then_ok() {
        let nodes = scenario();
        assert!(check_superior(&nodes, 4, 1, 3, 3).is_ok());
        assert_eq!(
            check_superior(&nodes, 4, 1, 3, 99),
            Err(DomainError::UnknownSuperior(99))
        );
    }
}
