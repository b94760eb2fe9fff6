//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

mod chart;
mod hierarchy;
mod snapshot;

pub use chart::{compute_chart, CacheStats, ChartEdge, ChartLayout, ChartNode, ChartService, LayoutCache};
pub use hierarchy::{EligibilityReport, HierarchyService, ReassignmentImpact};
pub use snapshot::{Format, OrgSnapshot, SnapshotService};
