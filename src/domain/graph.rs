//! In-memory view of the supervision graph.
//!
//! Wraps a borrowed collaborator slice with an id index and a children index
//! derived from `superior_id`. Nothing here mutates the records.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{instrument, warn};

use crate::domain::collate;
use crate::domain::entities::{Collaborator, CollaboratorId};

/// Read-only hierarchy over one snapshot of collaborators.
#[derive(Debug, Clone)]
pub struct HierarchyGraph<'a> {
    nodes: &'a [Collaborator],
    /// id → position of the first record carrying that id
    by_id: HashMap<CollaboratorId, usize>,
    /// superior id → positions of direct subordinates, in input order
    children: HashMap<CollaboratorId, Vec<usize>>,
}

impl<'a> HierarchyGraph<'a> {
    #[instrument(level = "trace", skip(nodes), fields(count = nodes.len()))]
    pub fn new(nodes: &'a [Collaborator]) -> Self {
        let mut by_id = HashMap::with_capacity(nodes.len());
        let mut children: HashMap<CollaboratorId, Vec<usize>> = HashMap::new();

        for (pos, node) in nodes.iter().enumerate() {
            match by_id.entry(node.id) {
                Entry::Occupied(_) => {
                    warn!("duplicate collaborator id #{}, keeping first record", node.id);
                }
                Entry::Vacant(slot) => {
                    slot.insert(pos);
                }
            }
            if let Some(superior) = node.superior_id {
                if superior != node.id {
                    children.entry(superior).or_default().push(pos);
                }
            }
        }

        Self {
            nodes,
            by_id,
            children,
        }
    }

    pub fn nodes(&self) -> &'a [Collaborator] {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: CollaboratorId) -> Option<&'a Collaborator> {
        self.by_id.get(&id).map(|&pos| &self.nodes[pos])
    }

    pub fn contains(&self, id: CollaboratorId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Resolved direct superior. Dangling or self references yield `None`.
    pub fn superior_of(&self, id: CollaboratorId) -> Option<&'a Collaborator> {
        let node = self.get(id)?;
        let superior_id = node.superior_id.filter(|&s| s != id)?;
        self.get(superior_id)
    }

    /// Direct subordinates in input order.
    pub fn children_of(&self, id: CollaboratorId) -> Vec<&'a Collaborator> {
        self.children
            .get(&id)
            .map(|positions| positions.iter().map(|&pos| &self.nodes[pos]).collect())
            .unwrap_or_default()
    }

    /// Superior chain of `id`, nearest first.
    ///
    /// Stops at a root, a dangling reference, or the first repeated id.
    pub fn ancestors(&self, id: CollaboratorId) -> Vec<&'a Collaborator> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut current = id;
        while let Some(superior) = self.superior_of(current) {
            if !visited.insert(superior.id) {
                break;
            }
            chain.push(superior);
            current = superior.id;
        }
        chain
    }

    /// Every direct and indirect subordinate of `id`, breadth-first.
    ///
    /// `id` itself is never included, even when corrupted data loops back to it.
    #[instrument(level = "trace", skip(self))]
    pub fn descendants(&self, id: CollaboratorId) -> Vec<&'a Collaborator> {
        let mut result = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            for child in self.children_of(current) {
                if visited.insert(child.id) {
                    result.push(child);
                    queue.push_back(child.id);
                }
            }
        }
        result
    }

    /// True if `candidate` sits anywhere below `ancestor`.
    pub fn is_descendant(&self, ancestor: CollaboratorId, candidate: CollaboratorId) -> bool {
        self.descendants(ancestor).iter().any(|n| n.id == candidate)
    }

    /// Collaborators whose name or role contains `query`, ignoring case and accents.
    pub fn search(&self, query: &str) -> Vec<&'a Collaborator> {
        self.nodes
            .iter()
            .filter(|n| {
                collate::contains_folded(&n.display_name, query)
                    || collate::contains_folded(&n.role, query)
            })
            .collect()
    }
}
