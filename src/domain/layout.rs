//! Two-pass tree layout.
//!
//! Pass 1 computes, bottom-up, the horizontal space every visible subtree
//! needs. Pass 2 assigns absolute coordinates top-down. Rows come from the
//! level catalog's display order, not from the rank number.
//!
//! A child on the same level as its parent is placed beside the parent on
//! the parent's row. Other-level children are centered beneath the combined
//! row formed by the parent and its same-level children. Same-level chains
//! nest naturally: a lateral child's own lateral children extend the row
//! further right, because they are part of that child's subtree width.
//!
//! When a lateral child's subtree reaches other rows, the space below it is
//! already taken. The parent then gets a column of its own, wide enough for
//! its other-level children, and the lateral children start right of it.

use std::collections::{BTreeSet, HashMap, HashSet};

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::arena::{ForestArena, TreeNode};
use crate::domain::entities::{Level, LevelId};
use crate::domain::visibility::{visible_preorder, ExpandedIds};

/// Geometry constants. Negative gaps or a zero row height are caller errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    /// Space between sibling subtrees and between a node and its lateral children
    pub horizontal_gap: f64,
    pub row_height: f64,
    pub padding_top: f64,
    pub padding_left: f64,
    pub padding_right: f64,
    pub padding_bottom: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 220.0,
            node_height: 90.0,
            horizontal_gap: 40.0,
            row_height: 160.0,
            padding_top: 40.0,
            padding_left: 40.0,
            padding_right: 40.0,
            padding_bottom: 40.0,
        }
    }
}

/// Level → row index, by ascending `order_index`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelRows {
    rows: HashMap<LevelId, usize>,
}

impl LevelRows {
    /// Enumerate the catalog sorted by `order_index`; ties keep the lower level id first.
    pub fn from_catalog(levels: &[Level]) -> Self {
        let mut sorted: Vec<&Level> = levels.iter().collect();
        sorted.sort_by_key(|l| (l.order_index, l.id));
        let mut rows = HashMap::with_capacity(sorted.len());
        for level in sorted {
            let next = rows.len();
            rows.entry(level.id).or_insert(next);
        }
        Self { rows }
    }

    pub fn get(&self, level_id: LevelId) -> Option<usize> {
        self.rows.get(&level_id).copied()
    }

    /// Row of a level; levels missing from the catalog fall back to row 0.
    pub fn row_of(&self, level_id: LevelId) -> usize {
        self.get(level_id).unwrap_or(0)
    }
}

/// Position of a node's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Result of one layout pass. Only visible nodes are positioned.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    positions: HashMap<Index, Point>,
    subtree_widths: HashMap<Index, f64>,
    pub width: f64,
    pub height: f64,
    /// Distinct levels among visible nodes
    pub row_count: usize,
}

impl Layout {
    pub fn position(&self, idx: Index) -> Option<Point> {
        self.positions.get(&idx).copied()
    }

    pub fn subtree_width(&self, idx: Index) -> Option<f64> {
        self.subtree_widths.get(&idx).copied()
    }

    pub fn is_positioned(&self, idx: Index) -> bool {
        self.positions.contains_key(&idx)
    }
}

/// Layout engine bound to a configuration and a level catalog.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    rows: LevelRows,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig, levels: &[Level]) -> Self {
        Self {
            config,
            rows: LevelRows::from_catalog(levels),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn rows(&self) -> &LevelRows {
        &self.rows
    }

    /// Lay out every visible node of `forest`.
    #[instrument(level = "debug", skip_all, fields(nodes = forest.len(), expanded = expanded.len()))]
    pub fn compute(&self, forest: &ForestArena, expanded: &ExpandedIds) -> Layout {
        let visible = visible_preorder(forest, expanded);
        let extents = self.subtree_extents(forest, expanded, &visible);
        let positions = self.assign_positions(forest, expanded, &extents);
        self.finish(forest, &visible, positions, extents.widths)
    }

    /// Pass 1: reverse pre-order visits every child before its parent.
    fn subtree_extents(
        &self,
        forest: &ForestArena,
        expanded: &ExpandedIds,
        visible: &[Index],
    ) -> Extents {
        let mut extents = Extents {
            widths: HashMap::with_capacity(visible.len()),
            multi_row: HashSet::new(),
        };
        for &idx in visible.iter().rev() {
            let Some(node) = forest.get_node(idx) else {
                continue;
            };
            let width = if !expanded.contains(node.id()) || node.children.is_empty() {
                self.config.node_width
            } else {
                let (same, other) = split_children(forest, node);
                if !other.is_empty() || same.iter().any(|c| extents.multi_row.contains(c)) {
                    extents.multi_row.insert(idx);
                }
                if same.is_empty() {
                    self.config
                        .node_width
                        .max(self.span(&node.children, &extents.widths))
                } else {
                    let group = self.lateral_group(&same, &other, &extents);
                    group.combined.max(group.below)
                }
            };
            extents.widths.insert(idx, width);
        }
        extents
    }

    /// Pass 2: top-down placement from each subtree's left edge.
    fn assign_positions(
        &self,
        forest: &ForestArena,
        expanded: &ExpandedIds,
        extents: &Extents,
    ) -> HashMap<Index, Point> {
        let cfg = &self.config;
        let widths = &extents.widths;
        let width_of = |idx: &Index| widths.get(idx).copied().unwrap_or(cfg.node_width);

        let mut stack: Vec<(Index, f64)> = Vec::with_capacity(widths.len());
        let mut cursor = cfg.padding_left;
        for root in forest.roots() {
            stack.push((*root, cursor));
            cursor += width_of(root) + cfg.horizontal_gap;
        }

        let mut positions = HashMap::with_capacity(widths.len());
        while let Some((idx, left)) = stack.pop() {
            let Some(node) = forest.get_node(idx) else {
                continue;
            };
            let width = width_of(&idx);
            let y = cfg.padding_top + self.rows.row_of(node.level_id()) as f64 * cfg.row_height;

            let x = if !expanded.contains(node.id()) || node.children.is_empty() {
                left + (width - cfg.node_width) / 2.0
            } else {
                let (same, other) = split_children(forest, node);
                if same.is_empty() {
                    let total = self.span(&node.children, widths);
                    let mut cursor = left + (width - total) / 2.0;
                    for child in &node.children {
                        stack.push((*child, cursor));
                        cursor += width_of(child) + cfg.horizontal_gap;
                    }
                    left + (width - cfg.node_width) / 2.0
                } else {
                    let group = self.lateral_group(&same, &other, extents);
                    let group_left = left + (width - group.combined) / 2.0;

                    let mut cursor = group_left + group.own + cfg.horizontal_gap;
                    for child in &same {
                        stack.push((*child, cursor));
                        cursor += width_of(child) + cfg.horizontal_gap;
                    }

                    // Other-level children stay inside the parent's column
                    // when the lateral subtrees occupy the rows below.
                    let under = if group.stacked {
                        group.own
                    } else {
                        group.combined
                    };
                    let mut cursor = group_left + (under - group.below) / 2.0;
                    for child in &other {
                        stack.push((*child, cursor));
                        cursor += width_of(child) + cfg.horizontal_gap;
                    }
                    group_left + (group.own - cfg.node_width) / 2.0
                }
            };
            positions.insert(idx, Point::new(x, y));
        }
        positions
    }

    fn finish(
        &self,
        forest: &ForestArena,
        visible: &[Index],
        positions: HashMap<Index, Point>,
        subtree_widths: HashMap<Index, f64>,
    ) -> Layout {
        let cfg = &self.config;
        let mut levels = BTreeSet::new();
        let mut missing = BTreeSet::new();
        let mut right = None::<f64>;
        let mut bottom = None::<f64>;

        for idx in visible {
            let (Some(node), Some(p)) = (forest.get_node(*idx), positions.get(idx)) else {
                continue;
            };
            levels.insert(node.level_id());
            if self.rows.get(node.level_id()).is_none() {
                missing.insert(node.level_id());
            }
            right = Some(right.map_or(p.x + cfg.node_width, |r| r.max(p.x + cfg.node_width)));
            bottom = Some(bottom.map_or(p.y + cfg.node_height, |b| b.max(p.y + cfg.node_height)));
        }
        for level in &missing {
            warn!("level {} not in catalog, placing its nodes on row 0", level);
        }

        let width = right.map_or(cfg.padding_left, |r| r) + cfg.padding_right;
        let height = match bottom {
            Some(b) => b + cfg.padding_bottom + cfg.row_height,
            None => cfg.padding_top + cfg.padding_bottom,
        };
        debug!(
            "layout: {} visible nodes, {}x{}, {} rows",
            visible.len(),
            width,
            height,
            levels.len()
        );

        Layout {
            positions,
            subtree_widths,
            width,
            height,
            row_count: levels.len(),
        }
    }

    /// Sum of subtree widths plus the gaps between them.
    fn span(&self, nodes: &[Index], widths: &HashMap<Index, f64>) -> f64 {
        if nodes.is_empty() {
            return 0.0;
        }
        let sum: f64 = nodes
            .iter()
            .map(|idx| widths.get(idx).copied().unwrap_or(self.config.node_width))
            .sum();
        sum + self.config.horizontal_gap * (nodes.len() - 1) as f64
    }

    /// Parent column, a gap, then its same-level children side by side.
    fn lateral_group(&self, same: &[Index], other: &[Index], extents: &Extents) -> LateralGroup {
        let cfg = &self.config;
        let below = self.span(other, &extents.widths);
        let stacked = same.iter().any(|c| extents.multi_row.contains(c));
        let own = if stacked {
            cfg.node_width.max(below)
        } else {
            cfg.node_width
        };
        LateralGroup {
            own,
            combined: own + cfg.horizontal_gap + self.span(same, &extents.widths),
            below,
            stacked,
        }
    }
}

/// Pass 1 output.
struct Extents {
    widths: HashMap<Index, f64>,
    /// Visible subtrees with nodes on more than one row
    multi_row: HashSet<Index>,
}

/// Horizontal split of a node that has same-level children.
struct LateralGroup {
    /// Parent box, widened to its other-level children when `stacked`
    own: f64,
    combined: f64,
    /// Span of the other-level children
    below: f64,
    /// Some lateral subtree reaches other rows
    stacked: bool,
}

/// Children sharing the parent's level, and the rest. Sorted order is kept.
pub fn split_children(forest: &ForestArena, node: &TreeNode) -> (Vec<Index>, Vec<Index>) {
    node.children.iter().partition(|&&child| {
        forest
            .get_node(child)
            .is_some_and(|c| c.level_id() == node.level_id())
    })
}
