//! Arena-backed forest of collaborators.
//!
//! Every record of the input list owns exactly one slot; parent/child links
//! are arena indices. A forest is rebuilt from scratch on every layout pass.

use std::cmp::Ordering;
use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::{instrument, warn};

use crate::domain::collate;
use crate::domain::entities::{Collaborator, CollaboratorId, LevelId};

/// One collaborator in the forest.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub collaborator: Collaborator,
    /// Index of the supervising node, None for roots
    pub parent: Option<Index>,
    /// Subordinates ordered by level, then name
    pub children: Vec<Index>,
}

impl TreeNode {
    pub fn id(&self) -> CollaboratorId {
        self.collaborator.id
    }

    pub fn level_id(&self) -> LevelId {
        self.collaborator.level_id
    }
}

/// Forest of supervision trees stored in a single arena.
#[derive(Debug, Clone, Default)]
pub struct ForestArena {
    arena: Arena<TreeNode>,
    roots: Vec<Index>,
    by_id: HashMap<CollaboratorId, Index>,
}

impl ForestArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node and link it under `parent`, or register it as a root.
    #[instrument(level = "trace", skip(self, collaborator), fields(id = collaborator.id))]
    pub fn insert_node(&mut self, collaborator: Collaborator, parent: Option<Index>) -> Index {
        let id = collaborator.id;
        let node_idx = self.arena.insert(TreeNode {
            collaborator,
            parent,
            children: Vec::new(),
        });
        self.by_id.entry(id).or_insert(node_idx);

        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent_node) => parent_node.children.push(node_idx),
            None => {
                if let Some(node) = self.arena.get_mut(node_idx) {
                    node.parent = None;
                }
                self.roots.push(node_idx);
            }
        }
        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    /// Slot of the first record carrying `id`.
    pub fn index_of(&self, id: CollaboratorId) -> Option<Index> {
        self.by_id.get(&id).copied()
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal of every tree, roots left to right.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.roots.iter().rev().copied().collect())
    }

    /// Pre-order traversal of the subtree rooted at `idx`.
    pub fn iter_subtree(&self, idx: Index) -> TreeIterator<'_> {
        TreeIterator::new(self, vec![idx])
    }

    /// Post-order traversal: children before their parent.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Number of levels in the deepest tree.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(Index, usize)> = self.roots.iter().map(|&r| (r, 1)).collect();
        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.get_node(idx) {
                stack.extend(node.children.iter().map(|&c| (c, depth + 1)));
            }
        }
        max_depth
    }

    fn sort_children(&mut self) {
        let slots: Vec<Index> = self.arena.iter().map(|(idx, _)| idx).collect();
        for idx in slots {
            let mut children = match self.arena.get_mut(idx) {
                Some(node) => std::mem::take(&mut node.children),
                None => continue,
            };
            children.sort_by(|&a, &b| self.sibling_order(a, b));
            if let Some(node) = self.arena.get_mut(idx) {
                node.children = children;
            }
        }
        let mut roots = std::mem::take(&mut self.roots);
        roots.sort_by(|&a, &b| self.sibling_order(a, b));
        self.roots = roots;
    }

    fn sibling_order(&self, a: Index, b: Index) -> Ordering {
        match (self.get_node(a), self.get_node(b)) {
            (Some(a), Some(b)) => a
                .collaborator
                .level_id
                .cmp(&b.collaborator.level_id)
                .then_with(|| {
                    collate::compare(&a.collaborator.display_name, &b.collaborator.display_name)
                }),
            _ => Ordering::Equal,
        }
    }
}

/// Build the forest for a flat collaborator list.
///
/// Each record lands in exactly one position: under its resolved superior,
/// or as a root when the superior is absent, unknown, itself, or part of a
/// corrupted cycle (the cycle is cut where the walk first re-enters it).
/// Siblings are ordered by `level_id`, then by collated display name; equal
/// keys keep input order.
#[instrument(level = "debug", skip(nodes), fields(count = nodes.len()))]
pub fn build_forest(nodes: &[Collaborator]) -> ForestArena {
    let mut first_pos: HashMap<CollaboratorId, usize> = HashMap::with_capacity(nodes.len());
    for (pos, node) in nodes.iter().enumerate() {
        first_pos.entry(node.id).or_insert(pos);
    }

    let mut parent_pos: Vec<Option<usize>> = nodes
        .iter()
        .enumerate()
        .map(|(pos, node)| {
            let superior = node.superior_id?;
            match first_pos.get(&superior) {
                Some(&p) if p != pos => Some(p),
                Some(_) => None,
                None => {
                    warn!(
                        "superior #{} of #{} not found, treating as root",
                        superior, node.id
                    );
                    None
                }
            }
        })
        .collect();

    break_cycles(nodes, &mut parent_pos);

    // Parents must exist in the arena before their children are linked.
    let mut forest = ForestArena::new();
    let mut slots: Vec<Option<Index>> = vec![None; nodes.len()];
    for pos in insertion_order(&parent_pos) {
        let parent = parent_pos[pos].and_then(|p| slots[p]);
        slots[pos] = Some(forest.insert_node(nodes[pos].clone(), parent));
    }
    // Insertion runs parents first; ids resolve to the first record in input order.
    forest.by_id = first_pos
        .into_iter()
        .filter_map(|(id, pos)| slots[pos].map(|idx| (id, idx)))
        .collect();
    forest.sort_children();
    forest
}

/// Cut every cycle in the resolved parent links.
fn break_cycles(nodes: &[Collaborator], parent_pos: &mut [Option<usize>]) {
    const UNSEEN: u8 = 0;
    const ON_PATH: u8 = 1;
    const DONE: u8 = 2;

    let mut state = vec![UNSEEN; parent_pos.len()];
    for start in 0..parent_pos.len() {
        if state[start] != UNSEEN {
            continue;
        }
        let mut path = Vec::new();
        let mut current = Some(start);
        while let Some(pos) = current {
            match state[pos] {
                DONE => break,
                ON_PATH => {
                    warn!("cycle in superior links at #{}, treating as root", nodes[pos].id);
                    parent_pos[pos] = None;
                    break;
                }
                _ => {
                    state[pos] = ON_PATH;
                    path.push(pos);
                    current = parent_pos[pos];
                }
            }
        }
        for pos in path {
            state[pos] = DONE;
        }
    }
}

/// Input positions ordered so that every parent precedes its children.
fn insertion_order(parent_pos: &[Option<usize>]) -> Vec<usize> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); parent_pos.len()];
    let mut order = Vec::with_capacity(parent_pos.len());
    for (pos, parent) in parent_pos.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(pos),
            None => order.push(pos),
        }
    }
    let mut cursor = 0;
    while cursor < order.len() {
        let pos = order[cursor];
        order.extend(children[pos].iter().copied());
        cursor += 1;
    }
    order
}

pub struct TreeIterator<'a> {
    forest: &'a ForestArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(forest: &'a ForestArena, stack: Vec<Index>) -> Self {
        Self { forest, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    forest: &'a ForestArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(forest: &'a ForestArena) -> Self {
        let stack = forest.roots.iter().rev().map(|&r| (r, false)).collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
