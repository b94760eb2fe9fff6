//! Text rendering of the supervision forest with `termtree`.

use std::collections::HashMap;

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::{Collaborator, ForestArena};

pub trait ForestConvert {
    /// One `Tree` per root; `label` formats each collaborator.
    fn to_trees<F>(&self, label: F) -> Vec<Tree<String>>
    where
        F: Fn(&Collaborator) -> String;
}

impl ForestConvert for ForestArena {
    #[instrument(level = "debug", skip_all)]
    fn to_trees<F>(&self, label: F) -> Vec<Tree<String>>
    where
        F: Fn(&Collaborator) -> String,
    {
        // Post-order: every child tree is finished before its parent needs it.
        let mut built: HashMap<Index, Tree<String>> = HashMap::with_capacity(self.len());
        for (idx, node) in self.iter_postorder() {
            let leaves: Vec<Tree<String>> = node
                .children
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(idx, Tree::new(label(&node.collaborator)).with_leaves(leaves));
        }
        self.roots()
            .iter()
            .filter_map(|root| built.remove(root))
            .collect()
    }
}
