//! Parent → child connectors and their path geometry.
//!
//! Vertical connectors leave the parent's bottom edge and enter the child's
//! top edge. Lateral connectors (child on the parent's level) leave the
//! parent's right edge and enter the child's left edge.

use serde::{Deserialize, Serialize};

use crate::domain::arena::ForestArena;
use crate::domain::entities::CollaboratorId;
use crate::domain::layout::{Layout, LayoutConfig};
use crate::domain::visibility::{visible_preorder, ExpandedIds};

/// Upper bound for the elbow bend radius of lateral connectors.
pub const MAX_ELBOW_RADIUS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    Vertical,
    Lateral,
}

/// One visible parent → child edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub from_id: CollaboratorId,
    pub to_id: CollaboratorId,
    pub kind: ConnectorKind,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Connection {
    pub fn delta_x(&self) -> f64 {
        self.x2 - self.x1
    }

    /// Bend radius of a rightward lateral elbow; `None` for other shapes.
    pub fn curve_radius(&self) -> Option<f64> {
        match self.kind {
            ConnectorKind::Lateral if self.delta_x() > 0.0 => {
                Some(MAX_ELBOW_RADIUS.min(self.delta_x().abs() / 4.0))
            }
            _ => None,
        }
    }

    /// Abstract drawing commands for this connector.
    pub fn path(&self) -> EdgePath {
        match (self.kind, self.curve_radius()) {
            (ConnectorKind::Vertical, _) => self.vertical_curve(),
            (ConnectorKind::Lateral, Some(r)) => self.elbow(r),
            // leftward lateral edges fall back to a straight segment
            (ConnectorKind::Lateral, None) => EdgePath {
                commands: vec![
                    PathCommand::MoveTo { x: self.x1, y: self.y1 },
                    PathCommand::LineTo { x: self.x2, y: self.y2 },
                ],
            },
        }
    }

    /// Cubic through the vertical midpoint; x moves linearly from start to end.
    fn vertical_curve(&self) -> EdgePath {
        let mid_y = (self.y1 + self.y2) / 2.0;
        EdgePath {
            commands: vec![
                PathCommand::MoveTo { x: self.x1, y: self.y1 },
                PathCommand::CubicTo {
                    c1x: self.x1,
                    c1y: mid_y,
                    c2x: self.x2,
                    c2y: mid_y,
                    x: self.x2,
                    y: self.y2,
                },
            ],
        }
    }

    /// Horizontal run, quarter bend, vertical run, quarter bend, horizontal run.
    fn elbow(&self, r: f64) -> EdgePath {
        let mid_x = (self.x1 + self.x2) / 2.0;
        let dir = match self.y2 - self.y1 {
            dy if dy > 0.0 => 1.0,
            dy if dy < 0.0 => -1.0,
            _ => 0.0,
        };
        EdgePath {
            commands: vec![
                PathCommand::MoveTo { x: self.x1, y: self.y1 },
                PathCommand::LineTo { x: mid_x - r, y: self.y1 },
                PathCommand::QuadTo {
                    cx: mid_x,
                    cy: self.y1,
                    x: mid_x,
                    y: self.y1 + dir * r,
                },
                PathCommand::LineTo { x: mid_x, y: self.y2 - dir * r },
                PathCommand::QuadTo {
                    cx: mid_x,
                    cy: self.y2,
                    x: mid_x + r,
                    y: self.y2,
                },
                PathCommand::LineTo { x: self.x2, y: self.y2 },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum PathCommand {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    QuadTo { cx: f64, cy: f64, x: f64, y: f64 },
    CubicTo { c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64 },
}

/// Renderer-neutral path: a sequence of drawing commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgePath {
    pub commands: Vec<PathCommand>,
}

impl EdgePath {
    pub fn end(&self) -> Option<(f64, f64)> {
        self.commands.last().map(|cmd| match *cmd {
            PathCommand::MoveTo { x, y }
            | PathCommand::LineTo { x, y }
            | PathCommand::QuadTo { x, y, .. }
            | PathCommand::CubicTo { x, y, .. } => (x, y),
        })
    }
}

/// One connection per visible parent → child pair, in pre-order.
pub fn generate_connections(
    forest: &ForestArena,
    layout: &Layout,
    expanded: &ExpandedIds,
    config: &LayoutConfig,
) -> Vec<Connection> {
    let mut connections = Vec::new();
    for idx in visible_preorder(forest, expanded) {
        let (Some(parent), Some(from)) = (forest.get_node(idx), layout.position(idx)) else {
            continue;
        };
        if !expanded.contains(parent.id()) {
            continue;
        }
        for &child_idx in &parent.children {
            let (Some(child), Some(to)) = (forest.get_node(child_idx), layout.position(child_idx))
            else {
                continue;
            };
            let connection = if child.level_id() == parent.level_id() {
                Connection {
                    from_id: parent.id(),
                    to_id: child.id(),
                    kind: ConnectorKind::Lateral,
                    x1: from.x + config.node_width,
                    y1: from.y + config.node_height / 2.0,
                    x2: to.x,
                    y2: to.y + config.node_height / 2.0,
                }
            } else {
                Connection {
                    from_id: parent.id(),
                    to_id: child.id(),
                    kind: ConnectorKind::Vertical,
                    x1: from.x + config.node_width / 2.0,
                    y1: from.y + config.node_height,
                    x2: to.x + config.node_width / 2.0,
                    y2: to.y,
                }
            };
            connections.push(connection);
        }
    }
    connections
}
