//! Integrity report over a collaborator snapshot.
//!
//! The layout path tolerates bad links silently; this module names them so
//! they can be fixed at the source.

use std::collections::{HashMap, HashSet};
use std::fmt;

use itertools::Itertools;
use serde::Serialize;
use tracing::instrument;

use crate::domain::entities::{Collaborator, CollaboratorId, LevelId, SectorId};
use crate::domain::graph::HierarchyGraph;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IntegrityIssue {
    #[serde(rename_all = "camelCase")]
    DuplicateId { id: CollaboratorId },
    #[serde(rename_all = "camelCase")]
    DanglingSuperior {
        id: CollaboratorId,
        superior_id: CollaboratorId,
    },
    #[serde(rename_all = "camelCase")]
    SelfSupervision { id: CollaboratorId },
    #[serde(rename_all = "camelCase")]
    SectorMismatch {
        id: CollaboratorId,
        superior_id: CollaboratorId,
        sector_id: SectorId,
        superior_sector_id: SectorId,
    },
    #[serde(rename_all = "camelCase")]
    RankInversion {
        id: CollaboratorId,
        superior_id: CollaboratorId,
        level_id: LevelId,
        superior_level_id: LevelId,
    },
    /// Members in superior-chain order, starting where the walk re-entered the loop
    Cycle { members: Vec<CollaboratorId> },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id } => write!(f, "#{id}: duplicate id"),
            Self::DanglingSuperior { id, superior_id } => {
                write!(f, "#{id}: superior #{superior_id} does not exist")
            }
            Self::SelfSupervision { id } => write!(f, "#{id}: supervises itself"),
            Self::SectorMismatch {
                id,
                superior_id,
                sector_id,
                superior_sector_id,
            } => write!(
                f,
                "#{id}: sector {sector_id} differs from superior #{superior_id} sector {superior_sector_id}"
            ),
            Self::RankInversion {
                id,
                superior_id,
                level_id,
                superior_level_id,
            } => write!(
                f,
                "#{id}: level {level_id} outranks superior #{superior_id} level {superior_level_id}"
            ),
            Self::Cycle { members } => {
                let chain = members.iter().map(|m| format!("#{m}")).join(" -> ");
                write!(f, "cycle: {chain}")
            }
        }
    }
}

/// List every broken hierarchy rule, in input order, cycles last.
#[instrument(level = "debug", skip(all), fields(count = all.len()))]
pub fn inspect(all: &[Collaborator]) -> Vec<IntegrityIssue> {
    let graph = HierarchyGraph::new(all);
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for node in all {
        if !seen.insert(node.id) {
            issues.push(IntegrityIssue::DuplicateId { id: node.id });
            continue;
        }
        let Some(superior_id) = node.superior_id else {
            continue;
        };
        if superior_id == node.id {
            issues.push(IntegrityIssue::SelfSupervision { id: node.id });
            continue;
        }
        let Some(superior) = graph.get(superior_id) else {
            issues.push(IntegrityIssue::DanglingSuperior {
                id: node.id,
                superior_id,
            });
            continue;
        };
        if superior.sector_id != node.sector_id {
            issues.push(IntegrityIssue::SectorMismatch {
                id: node.id,
                superior_id,
                sector_id: node.sector_id,
                superior_sector_id: superior.sector_id,
            });
        }
        if superior.level_id > node.level_id {
            issues.push(IntegrityIssue::RankInversion {
                id: node.id,
                superior_id,
                level_id: node.level_id,
                superior_level_id: superior.level_id,
            });
        }
    }

    issues.extend(find_cycles(&graph));
    issues
}

fn find_cycles(graph: &HierarchyGraph<'_>) -> Vec<IntegrityIssue> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        OnPath,
        Done,
    }

    let mut marks: HashMap<CollaboratorId, Mark> = HashMap::new();
    let mut cycles = Vec::new();

    for node in graph.nodes() {
        if marks.contains_key(&node.id) {
            continue;
        }
        let mut path = Vec::new();
        let mut current = Some(node.id);
        while let Some(id) = current {
            match marks.get(&id) {
                Some(Mark::Done) => break,
                Some(Mark::OnPath) => {
                    let start = path.iter().position(|&p| p == id).unwrap_or(0);
                    cycles.push(IntegrityIssue::Cycle {
                        members: path[start..].to_vec(),
                    });
                    break;
                }
                None => {
                    marks.insert(id, Mark::OnPath);
                    path.push(id);
                    current = graph.superior_of(id).map(|s| s.id);
                }
            }
        }
        for id in path {
            marks.insert(id, Mark::Done);
        }
    }
    cycles
}
