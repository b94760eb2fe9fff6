//! Chart service
//!
//! Runs the full chart pipeline (forest, layout, connectors, visible nodes)
//! over one snapshot and memoizes the last result.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::services::snapshot::OrgSnapshot;
use crate::domain::{
    build_forest, collect_visible_nodes, generate_connections, Collaborator, CollaboratorId,
    Connection, EdgePath, ExpandedIds, ForestArena, Level, LayoutConfig, LayoutEngine, LevelId,
    SectorId,
};

/// A visible collaborator box, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartNode {
    pub id: CollaboratorId,
    pub display_name: String,
    pub role: String,
    pub sector_id: SectorId,
    pub level_id: LevelId,
    pub x: f64,
    pub y: f64,
    pub expanded: bool,
    pub has_children: bool,
}

/// A visible connector with its drawing commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartEdge {
    pub connection: Connection,
    pub path: EdgePath,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub row_count: usize,
    pub nodes: Vec<ChartNode>,
    pub connections: Vec<ChartEdge>,
}

impl ChartLayout {
    pub fn node(&self, id: CollaboratorId) -> Option<&ChartNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Uncached pipeline: identical inputs always give identical output.
#[instrument(level = "debug", skip_all, fields(collaborators = collaborators.len()))]
pub fn compute_chart(
    config: &LayoutConfig,
    collaborators: &[Collaborator],
    levels: &[Level],
    expanded: &ExpandedIds,
) -> ChartLayout {
    let forest = build_forest(collaborators);
    chart_from_forest(config, &forest, levels, expanded)
}

fn chart_from_forest(
    config: &LayoutConfig,
    forest: &ForestArena,
    levels: &[Level],
    expanded: &ExpandedIds,
) -> ChartLayout {
    let engine = LayoutEngine::new(*config, levels);
    let layout = engine.compute(forest, expanded);

    let nodes = collect_visible_nodes(forest, &layout, expanded)
        .into_iter()
        .map(|p| {
            let c = &p.node.collaborator;
            ChartNode {
                id: c.id,
                display_name: c.display_name.clone(),
                role: c.role.clone(),
                sector_id: c.sector_id,
                level_id: c.level_id,
                x: p.x,
                y: p.y,
                expanded: p.expanded,
                has_children: p.has_children(),
            }
        })
        .collect();

    let connections = generate_connections(forest, &layout, expanded, config)
        .into_iter()
        .map(|connection| {
            let path = connection.path();
            ChartEdge { connection, path }
        })
        .collect();

    ChartLayout {
        width: layout.width,
        height: layout.height,
        row_count: layout.row_count,
        nodes,
        connections,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    config: LayoutConfig,
    collaborators: Vec<Collaborator>,
    levels: Vec<Level>,
    expanded: ExpandedIds,
}

/// Hit/miss counters of a [`LayoutCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Single-entry memo of the last chart computed.
#[derive(Debug, Default)]
pub struct LayoutCache {
    entry: Option<(CacheKey, Arc<ChartLayout>)>,
    stats: CacheStats,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_compute(
        &mut self,
        key: CacheKey,
        compute: impl FnOnce(&CacheKey) -> ChartLayout,
    ) -> Arc<ChartLayout> {
        if let Some((cached_key, chart)) = &self.entry {
            if *cached_key == key {
                self.stats.hits += 1;
                return Arc::clone(chart);
            }
        }
        self.stats.misses += 1;
        let chart = Arc::new(compute(&key));
        self.entry = Some((key, Arc::clone(&chart)));
        chart
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

/// Service producing chart geometry for a renderer.
pub struct ChartService {
    config: LayoutConfig,
    cache: Mutex<LayoutCache>,
}

impl ChartService {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            cache: Mutex::new(LayoutCache::new()),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Chart for a snapshot, using its own expanded-ids.
    pub fn layout(&self, snapshot: &OrgSnapshot) -> Arc<ChartLayout> {
        self.layout_with(&snapshot.collaborators, &snapshot.levels, &snapshot.expanded)
    }

    /// Chart for explicit inputs. Unchanged inputs return the previous result.
    #[instrument(level = "debug", skip_all, fields(collaborators = collaborators.len(), expanded = expanded.len()))]
    pub fn layout_with(
        &self,
        collaborators: &[Collaborator],
        levels: &[Level],
        expanded: &ExpandedIds,
    ) -> Arc<ChartLayout> {
        let key = CacheKey {
            config: self.config,
            collaborators: collaborators.to_vec(),
            levels: levels.to_vec(),
            expanded: expanded.clone(),
        };
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let chart = cache.get_or_compute(key, |k| {
            compute_chart(&k.config, &k.collaborators, &k.levels, &k.expanded)
        });
        debug!("layout: cache {:?}", cache.stats());
        chart
    }

    /// Expanded-ids for a first render: everything, a fixed depth, or nothing.
    pub fn initial_expansion(
        &self,
        collaborators: &[Collaborator],
        expand_all: bool,
        depth: Option<usize>,
    ) -> ExpandedIds {
        let forest = build_forest(collaborators);
        match (expand_all, depth) {
            (true, _) => ExpandedIds::expand_all(&forest),
            (false, Some(depth)) => ExpandedIds::expand_to_depth(&forest, depth),
            (false, None) => ExpandedIds::new(),
        }
    }

    /// Add every ancestor of `ids` so that each of them is drawn.
    pub fn reveal(
        &self,
        collaborators: &[Collaborator],
        expanded: &mut ExpandedIds,
        ids: &[CollaboratorId],
    ) -> Vec<CollaboratorId> {
        let forest = build_forest(collaborators);
        ids.iter()
            .copied()
            .filter(|&id| !expanded.reveal(&forest, id))
            .collect()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).stats()
    }
}
