//! Domain layer: hierarchy rules and chart geometry
//!
//! Pure, synchronous, deterministic. No I/O, no CLI, no config loading.

pub mod arena;
pub mod collate;
pub mod connector;
pub mod eligibility;
pub mod entities;
pub mod error;
pub mod graph;
pub mod integrity;
pub mod layout;
pub mod visibility;

pub use arena::{build_forest, ForestArena, TreeNode};
pub use connector::{generate_connections, Connection, ConnectorKind, EdgePath, PathCommand};
pub use eligibility::{
    check_superior, compute_eligible_superiors, get_descendants, would_create_cycle,
    SuperiorResolver,
};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use graph::HierarchyGraph;
pub use integrity::{inspect, IntegrityIssue};
pub use layout::{Layout, LayoutConfig, LayoutEngine, LevelRows, Point};
pub use visibility::{collect_visible_nodes, visible_preorder, ExpandedIds, PositionedNode};
