//! Which nodes are drawn, given the set of expanded collaborators.
//!
//! Roots are always visible. A node's children are visible only when the
//! node itself is visible and its id is expanded. Layout, connectors and the
//! node list must all be computed from the same `ExpandedIds` value.

use std::collections::BTreeSet;

use generational_arena::Index;
use serde::{Deserialize, Serialize};

use crate::domain::arena::{ForestArena, TreeNode};
use crate::domain::entities::CollaboratorId;
use crate::domain::layout::Layout;

/// Collaborator ids whose subordinates are currently shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpandedIds(BTreeSet<CollaboratorId>);

impl ExpandedIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: CollaboratorId) -> bool {
        self.0.contains(&id)
    }

    pub fn insert(&mut self, id: CollaboratorId) -> bool {
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: CollaboratorId) -> bool {
        self.0.remove(&id)
    }

    /// Flip one node between expanded and collapsed. Returns the new state.
    pub fn toggle(&mut self, id: CollaboratorId) -> bool {
        if self.0.remove(&id) {
            false
        } else {
            self.0.insert(id);
            true
        }
    }

    pub fn collapse_all(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = CollaboratorId> + '_ {
        self.0.iter().copied()
    }

    /// Every node that has subordinates.
    pub fn expand_all(forest: &ForestArena) -> Self {
        forest
            .iter()
            .filter(|(_, node)| !node.children.is_empty())
            .map(|(_, node)| node.id())
            .collect()
    }

    /// Expand the top `depth` tiers; `depth == 1` shows the roots' direct reports.
    pub fn expand_to_depth(forest: &ForestArena, depth: usize) -> Self {
        let mut expanded = Self::new();
        let mut stack: Vec<(Index, usize)> = forest.roots().iter().map(|&r| (r, 0)).collect();
        while let Some((idx, tier)) = stack.pop() {
            if tier >= depth {
                continue;
            }
            if let Some(node) = forest.get_node(idx) {
                if !node.children.is_empty() {
                    expanded.insert(node.id());
                    stack.extend(node.children.iter().map(|&c| (c, tier + 1)));
                }
            }
        }
        expanded
    }

    /// Expand every ancestor of `id` so that it becomes visible.
    ///
    /// Returns false if `id` is not in the forest.
    pub fn reveal(&mut self, forest: &ForestArena, id: CollaboratorId) -> bool {
        let Some(mut idx) = forest.index_of(id) else {
            return false;
        };
        while let Some(parent) = forest.get_node(idx).and_then(|n| n.parent) {
            if let Some(parent_node) = forest.get_node(parent) {
                self.0.insert(parent_node.id());
            }
            idx = parent;
        }
        true
    }
}

impl FromIterator<CollaboratorId> for ExpandedIds {
    fn from_iter<T: IntoIterator<Item = CollaboratorId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<CollaboratorId> for ExpandedIds {
    fn extend<T: IntoIterator<Item = CollaboratorId>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

/// A visible node with its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedNode<'a> {
    pub index: Index,
    pub node: &'a TreeNode,
    pub x: f64,
    pub y: f64,
    pub expanded: bool,
}

impl PositionedNode<'_> {
    pub fn id(&self) -> CollaboratorId {
        self.node.id()
    }

    pub fn has_children(&self) -> bool {
        !self.node.children.is_empty()
    }
}

/// Visible arena slots in pre-order, roots left to right.
pub fn visible_preorder(forest: &ForestArena, expanded: &ExpandedIds) -> Vec<Index> {
    let mut order = Vec::with_capacity(forest.len());
    let mut stack: Vec<Index> = forest.roots().iter().rev().copied().collect();
    while let Some(idx) = stack.pop() {
        let Some(node) = forest.get_node(idx) else {
            continue;
        };
        order.push(idx);
        if expanded.contains(node.id()) {
            stack.extend(node.children.iter().rev());
        }
    }
    order
}

/// Visible nodes with the coordinates `layout` assigned to them.
pub fn collect_visible_nodes<'a>(
    forest: &'a ForestArena,
    layout: &Layout,
    expanded: &ExpandedIds,
) -> Vec<PositionedNode<'a>> {
    visible_preorder(forest, expanded)
        .into_iter()
        .filter_map(|idx| {
            let node = forest.get_node(idx)?;
            let point = layout.position(idx)?;
            Some(PositionedNode {
                index: idx,
                node,
                x: point.x,
                y: point.y,
                expanded: expanded.contains(node.id()),
            })
        })
        .collect()
}
