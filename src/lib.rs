//! Org-chart engine: supervisor eligibility, hierarchy integrity and chart layout.
//!
//! The `domain` layer holds the pure engine; `application` wraps it in
//! services over a loaded snapshot; `cli` is the `orgchart` binary's surface.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
