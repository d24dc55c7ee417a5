//! Tile graph the actors walk on.
//!
//! The board is a directed graph, possibly cyclic, so forks and merges are
//! both legal. Edges are ordered (authoring order is choice-presentation
//! order). Movement legality is a pure query here; the runtime owns the
//! stepping loop and its suspension points.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::partner::TemplateId;

/// Unique identifier of a tile within one board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Logical grid position of a tile, used to derive facing vectors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Unit-ish direction between two tiles (component-wise signum).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Facing {
    pub dx: i32,
    pub dy: i32,
}

impl Facing {
    /// Direction faced when walking from `from` to `to`.
    pub fn between(from: Position, to: Position) -> Self {
        Self {
            dx: (to.x - from.x).signum(),
            dy: (to.y - from.y).signum(),
        }
    }

    /// Dot product with another facing. Negative means the two facings
    /// oppose each other (head-on), positive means they roughly agree.
    pub fn dot(self, other: Facing) -> i32 {
        self.dx * other.dx + self.dy * other.dy
    }
}

impl Default for Facing {
    fn default() -> Self {
        // Arbitrary but stable: face +y until the first step.
        Self { dx: 0, dy: 1 }
    }
}

/// Category of a tile, driving the landed-tile handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileKind {
    #[default]
    Normal,
    Start,
    Battle,
    Chance,
    Event,
    Swap,
    Positive,
    Negative,
    Store,
}

impl TileKind {
    /// Kinds whose concrete behavior is game content supplied through the
    /// runtime's tile hook rather than core rules.
    pub fn is_content_hook(self) -> bool {
        matches!(
            self,
            TileKind::Battle | TileKind::Chance | TileKind::Event | TileKind::Swap | TileKind::Store
        )
    }
}

/// Effect attached to a tile, applied in list order when an actor lands.
///
/// A closed set of policies rather than a scripting surface: the game only
/// ever shipped these three.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileEffect {
    Heal { amount: i32 },
    Damage { amount: i32 },
    Recruit { template: TemplateId, to_front: bool },
}

/// One node of the board graph.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileNode {
    pub id: TileId,
    pub kind: TileKind,
    pub position: Position,
    /// Outgoing edges, in authoring order.
    pub next: Vec<TileId>,
    pub effects: Vec<TileEffect>,
    /// Recruitable templates; only meaningful when `kind` is `Start`.
    pub partner_pool: Vec<TemplateId>,
}

impl TileNode {
    pub fn new(id: TileId, kind: TileKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            next: Vec::new(),
            effects: Vec::new(),
            partner_pool: Vec::new(),
        }
    }

    pub fn with_next(mut self, next: impl IntoIterator<Item = TileId>) -> Self {
        self.next = next.into_iter().collect();
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = TileEffect>) -> Self {
        self.effects = effects.into_iter().collect();
        self
    }

    pub fn with_partner_pool(mut self, pool: impl IntoIterator<Item = TemplateId>) -> Self {
        self.partner_pool = pool.into_iter().collect();
        self
    }
}

/// Validation failures over authored board data.
///
/// These indicate bad content, not runtime faults; callers log them and
/// degrade rather than abort the match.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("tile {tile} references unknown neighbor {missing}")]
    DanglingEdge { tile: TileId, missing: TileId },

    #[error("tile {tile} is reachable from a start tile but has no outgoing edges")]
    DeadEnd { tile: TileId },

    #[error("board has no start tile")]
    NoStartTile,

    #[error("duplicate tile id {0}")]
    DuplicateTile(TileId),
}

/// Directed tile graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardGraph {
    nodes: HashMap<TileId, TileNode>,
}

impl BoardGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from nodes, rejecting duplicate ids.
    pub fn from_nodes(nodes: impl IntoIterator<Item = TileNode>) -> Result<Self, BoardError> {
        let mut graph = Self::new();
        for node in nodes {
            if graph.nodes.contains_key(&node.id) {
                return Err(BoardError::DuplicateTile(node.id));
            }
            graph.nodes.insert(node.id, node);
        }
        Ok(graph)
    }

    pub fn tile(&self, id: TileId) -> Option<&TileNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &TileNode> {
        self.nodes.values()
    }

    /// Candidate next tiles when standing on `current` having arrived from
    /// `previous`.
    ///
    /// The arrived-from tile is excluded so movement does not oscillate at
    /// forks, unless excluding it would leave nothing to step onto (dead end
    /// or two-node loop), in which case backtracking is allowed. An unknown
    /// or edge-less `current` yields an empty list; the caller treats that
    /// as a terminal state.
    pub fn candidates_from(&self, current: TileId, previous: Option<TileId>) -> Vec<TileId> {
        let Some(node) = self.nodes.get(&current) else {
            return Vec::new();
        };

        let filtered: Vec<TileId> = node
            .next
            .iter()
            .copied()
            .filter(|&id| Some(id) != previous)
            .collect();

        if filtered.is_empty() {
            node.next.clone()
        } else {
            filtered
        }
    }

    /// Checks authored content for structural problems: dangling edges,
    /// missing start tiles, and dead ends reachable from any start tile.
    pub fn validate(&self) -> Result<(), Vec<BoardError>> {
        let mut errors = Vec::new();

        for node in self.nodes.values() {
            for &next in &node.next {
                if !self.nodes.contains_key(&next) {
                    errors.push(BoardError::DanglingEdge {
                        tile: node.id,
                        missing: next,
                    });
                }
            }
        }

        let starts: Vec<TileId> = self
            .nodes
            .values()
            .filter(|n| n.kind == TileKind::Start)
            .map(|n| n.id)
            .collect();
        if starts.is_empty() {
            errors.push(BoardError::NoStartTile);
        }

        // Every node reachable from a start tile must keep movement alive.
        let mut visited: HashSet<TileId> = HashSet::new();
        let mut stack = starts;
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if node.next.is_empty() {
                errors.push(BoardError::DeadEnd { tile: id });
            }
            for &next in &node.next {
                stack.push(next);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(id: u32, next: &[u32]) -> TileNode {
        TileNode::new(TileId(id), TileKind::Normal, Position::new(id as i32, 0))
            .with_next(next.iter().map(|&n| TileId(n)))
    }

    #[test]
    fn candidates_exclude_previous_tile() {
        let graph =
            BoardGraph::from_nodes([tile(0, &[1]), tile(1, &[0, 2]), tile(2, &[1])]).unwrap();

        let candidates = graph.candidates_from(TileId(1), Some(TileId(0)));
        assert_eq!(candidates, vec![TileId(2)]);
    }

    #[test]
    fn forced_backtrack_when_exclusion_empties_candidates() {
        // Two-node oscillation: 1 only leads back to 0.
        let graph = BoardGraph::from_nodes([tile(0, &[1]), tile(1, &[0])]).unwrap();

        let candidates = graph.candidates_from(TileId(1), Some(TileId(0)));
        assert_eq!(candidates, vec![TileId(0)]);
    }

    #[test]
    fn dead_end_yields_no_candidates() {
        let graph = BoardGraph::from_nodes([tile(0, &[1]), tile(1, &[])]).unwrap();
        assert!(graph.candidates_from(TileId(1), Some(TileId(0))).is_empty());
    }

    #[test]
    fn validate_flags_dead_ends_reachable_from_start() {
        let start = TileNode::new(TileId(0), TileKind::Start, Position::new(0, 0))
            .with_next([TileId(1)]);
        let graph = BoardGraph::from_nodes([start, tile(1, &[])]).unwrap();

        let errors = graph.validate().unwrap_err();
        assert!(errors.contains(&BoardError::DeadEnd { tile: TileId(1) }));
    }

    #[test]
    fn validate_flags_dangling_edges() {
        let start = TileNode::new(TileId(0), TileKind::Start, Position::new(0, 0))
            .with_next([TileId(7)]);
        let graph = BoardGraph::from_nodes([start]).unwrap();

        let errors = graph.validate().unwrap_err();
        assert!(errors.contains(&BoardError::DanglingEdge {
            tile: TileId(0),
            missing: TileId(7),
        }));
    }

    #[test]
    fn facing_between_positions_is_signum() {
        let facing = Facing::between(Position::new(0, 0), Position::new(3, -2));
        assert_eq!(facing, Facing { dx: 1, dy: -1 });
        assert_eq!(facing.dot(Facing { dx: -1, dy: 1 }), -2);
    }
}
