//! Buildings on the board and the rules for where new ones may go.

use crate::board::Board;
use crate::player::{PlayerColor, PlayerId};
use crate::topology::{EdgeId, Topology, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Kind of piece a player can place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingKind {
    Road,
    Settlement,
    City,
}

impl BuildingKind {
    pub fn name(&self) -> &'static str {
        match self {
            BuildingKind::Road => "road",
            BuildingKind::Settlement => "settlement",
            BuildingKind::City => "city",
        }
    }
}

/// A placed piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    #[serde(rename = "type")]
    pub kind: BuildingKind,
    pub owner_id: PlayerId,
    pub owner_color: PlayerColor,
}

impl Building {
    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner_id == player
    }
}

/// Everything built so far, keyed by canonical site id.
///
/// Vertex and edge ids share the `t-i` form, so they live in separate maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buildings {
    pub vertices: BTreeMap<VertexId, Building>,
    pub edges: BTreeMap<EdgeId, Building>,
}

impl Buildings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_vertex(&self, id: &VertexId) -> Option<&Building> {
        self.vertices.get(id)
    }

    pub fn at_edge(&self, id: &EdgeId) -> Option<&Building> {
        self.edges.get(id)
    }

    /// Put a settlement or city on a vertex, replacing what was there
    pub fn set_vertex(&mut self, id: VertexId, building: Building) {
        self.vertices.insert(id, building);
    }

    pub fn set_edge(&mut self, id: EdgeId, building: Building) {
        self.edges.insert(id, building);
    }

    fn has_road_of(&self, id: &EdgeId, player: PlayerId) -> bool {
        self.edges
            .get(id)
            .is_some_and(|b| b.kind == BuildingKind::Road && b.is_owned_by(player))
    }

    /// Settlements owned by `player`, in id order
    pub fn settlements_of(&self, player: PlayerId) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .iter()
            .filter(move |(_, b)| b.kind == BuildingKind::Settlement && b.is_owned_by(player))
            .map(|(id, _)| *id)
    }
}

/// Legal sites for one player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidPlacements {
    pub vertices: Vec<VertexId>,
    pub edges: Vec<EdgeId>,
    /// Own settlements that can become cities
    pub cities: Vec<VertexId>,
}

/// Which set of placement rules applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// Opening draft, settlement step
    InitialSettlement,
    /// Opening draft, road step: only next to the settlement just placed
    InitialRoad { last_settlement: Option<VertexId> },
    /// Regular play: everything must connect to the player's network
    Main,
}

/// Read-only view answering "may this player build here?"
///
/// All ids are resolved to their canonical form first; ids that are not on
/// the board are never legal.
pub struct PlacementValidator<'a> {
    board: &'a Board,
    topology: &'a Topology,
    buildings: &'a Buildings,
}

impl<'a> PlacementValidator<'a> {
    pub fn new(board: &'a Board, topology: &'a Topology, buildings: &'a Buildings) -> Self {
        Self {
            board,
            topology,
            buildings,
        }
    }

    /// Canonical id of a vertex touching land
    pub fn land_vertex(&self, id: &VertexId) -> Option<VertexId> {
        self.topology
            .canonical_vertex(id)
            .filter(|v| self.board.is_land(v.tile))
    }

    /// Canonical id of an edge touching land
    pub fn land_edge(&self, id: &EdgeId) -> Option<EdgeId> {
        self.topology
            .canonical_edge(id)
            .filter(|e| self.board.is_land(e.tile))
    }

    /// Unoccupied, and no settlement or city on a neighboring vertex
    fn satisfies_distance_rule(&self, vertex: &VertexId) -> bool {
        self.buildings.at_vertex(vertex).is_none()
            && self
                .topology
                .adjacent_vertices(vertex)
                .iter()
                .all(|n| self.buildings.at_vertex(n).is_none())
    }

    fn touches_own_road(&self, vertex: &VertexId, player: PlayerId) -> bool {
        self.topology
            .adjacent_edges(vertex)
            .iter()
            .any(|e| self.buildings.has_road_of(e, player))
    }

    /// One of the edge's endpoints holds the player's building or touches
    /// one of the player's roads
    fn joins_network(&self, edge: &EdgeId, player: PlayerId) -> bool {
        self.topology.connected_vertices(edge).iter().any(|v| {
            self.buildings
                .at_vertex(v)
                .is_some_and(|b| b.is_owned_by(player))
                || self.touches_own_road(v, player)
        })
    }

    /// Settlement legality. Returns the canonical vertex on success.
    pub fn settlement_site(
        &self,
        player: PlayerId,
        id: &VertexId,
        regime: Regime,
    ) -> Option<VertexId> {
        let vertex = self.land_vertex(id)?;
        if !self.satisfies_distance_rule(&vertex) {
            return None;
        }
        match regime {
            Regime::InitialSettlement => Some(vertex),
            Regime::Main => self.touches_own_road(&vertex, player).then_some(vertex),
            Regime::InitialRoad { .. } => None,
        }
    }

    /// Road legality. Returns the canonical edge on success.
    pub fn road_site(&self, player: PlayerId, id: &EdgeId, regime: Regime) -> Option<EdgeId> {
        let edge = self.land_edge(id)?;
        if self.buildings.at_edge(&edge).is_some() {
            return None;
        }
        match regime {
            Regime::InitialRoad { last_settlement } => {
                let settlement = last_settlement?;
                self.topology
                    .adjacent_edges(&settlement)
                    .contains(&edge)
                    .then_some(edge)
            }
            Regime::Main => self.joins_network(&edge, player).then_some(edge),
            Regime::InitialSettlement => None,
        }
    }

    /// City legality: the vertex holds one of the player's settlements
    pub fn city_site(&self, player: PlayerId, id: &VertexId) -> Option<VertexId> {
        let vertex = self.topology.canonical_vertex(id)?;
        self.buildings
            .at_vertex(&vertex)
            .filter(|b| b.kind == BuildingKind::Settlement && b.is_owned_by(player))
            .map(|_| vertex)
    }

    fn land_vertices(&self) -> BTreeSet<VertexId> {
        self.board
            .land_tiles()
            .flat_map(|t| (0..6).map(move |c| VertexId::new(t.id, c)))
            .filter_map(|v| self.land_vertex(&v))
            .collect()
    }

    fn land_edges(&self) -> BTreeSet<EdgeId> {
        self.board
            .land_tiles()
            .flat_map(|t| (0..6).map(move |s| EdgeId::new(t.id, s)))
            .filter_map(|e| self.land_edge(&e))
            .collect()
    }

    /// Every legal site for `player` under `regime`, recomputed from scratch
    pub fn valid_placements(&self, player: PlayerId, regime: Regime) -> ValidPlacements {
        match regime {
            Regime::InitialSettlement => ValidPlacements {
                vertices: self
                    .land_vertices()
                    .into_iter()
                    .filter(|v| self.settlement_site(player, v, regime).is_some())
                    .collect(),
                ..Default::default()
            },
            Regime::InitialRoad { last_settlement } => {
                let edges = last_settlement
                    .map(|s| {
                        self.topology
                            .adjacent_edges(&s)
                            .iter()
                            .filter_map(|e| self.road_site(player, e, regime))
                            .collect()
                    })
                    .unwrap_or_default();
                ValidPlacements {
                    edges,
                    ..Default::default()
                }
            }
            Regime::Main => ValidPlacements {
                vertices: self
                    .land_vertices()
                    .into_iter()
                    .filter(|v| self.settlement_site(player, v, regime).is_some())
                    .collect(),
                edges: self
                    .land_edges()
                    .into_iter()
                    .filter(|e| self.road_site(player, e, regime).is_some())
                    .collect(),
                cities: self.buildings.settlements_of(player).collect(),
            },
        }
    }
}
