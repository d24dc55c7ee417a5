//! Board layout loader.
//!
//! Loads the tile graph from a RON file. Edges reference tiles by id, so
//! the loader validates the finished graph before handing it out.

use std::path::Path;

use board_core::{BoardGraph, Position, TemplateId, TileEffect, TileId, TileKind, TileNode};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Board data structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoardDataRon {
    tiles: Vec<TileRon>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TileRon {
    id: u32,
    #[serde(default)]
    kind: TileKind,
    position: (i32, i32),
    #[serde(default)]
    next: Vec<u32>,
    #[serde(default)]
    effects: Vec<TileEffect>,
    #[serde(default)]
    partner_pool: Vec<u32>,
}

/// Loader for board layouts from RON files.
pub struct BoardLoader;

impl BoardLoader {
    /// Load a board layout from a RON file.
    ///
    /// The resulting graph is structurally validated; authoring problems
    /// (dangling edges, reachable dead ends, no start tile) are reported
    /// as errors here rather than surfacing mid-match.
    pub fn load(path: &Path) -> LoadResult<BoardGraph> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load board {}: {}", path.display(), e))
    }

    fn parse(content: &str) -> LoadResult<BoardGraph> {
        let data: BoardDataRon =
            ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse board RON: {e}"))?;

        let nodes = data.tiles.into_iter().map(|tile| {
            TileNode::new(
                TileId(tile.id),
                tile.kind,
                Position::new(tile.position.0, tile.position.1),
            )
            .with_next(tile.next.into_iter().map(TileId))
            .with_effects(tile.effects)
            .with_partner_pool(tile.partner_pool.into_iter().map(TemplateId))
        });

        let graph = BoardGraph::from_nodes(nodes)?;
        if let Err(errors) = graph.validate() {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(anyhow::anyhow!("board failed validation: {joined}"));
        }
        Ok(graph)
    }
}
