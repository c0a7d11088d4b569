//! Vertex/edge identities and their neighbor relationships.
//!
//! Placement sites are named relative to a tile: vertex `t-c` is corner `c`
//! of tile `t`, edge `t-e` is the side from corner `e` to corner `e + 1`.
//! The tile-local relations are pure functions of the id (see
//! [`VertexId::tile_neighbors`] and friends).
//!
//! [`Topology`] is the adjacency table built once per board. Under
//! [`Adjacency::TileLocal`] it reproduces the tile-local relations exactly.
//! Under [`Adjacency::Shared`] every alias of a physical corner or side
//! collapses to one canonical id and neighbors span tile boundaries.

use crate::board::{Board, TileId};
use crate::hex::{CornerKey, SideKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A site id that is not of the form `tile-index` with index 0..=5
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed site id `{0}`")]
pub struct ParseSiteIdError(pub String);

fn parse_site(s: &str) -> Result<(TileId, u8), ParseSiteIdError> {
    let malformed = || ParseSiteIdError(s.to_string());
    let (tile, index) = s.split_once('-').ok_or_else(malformed)?;
    let tile: TileId = tile.trim().parse().map_err(|_| malformed())?;
    let index: u8 = index.trim().parse().map_err(|_| malformed())?;
    if index > 5 {
        return Err(malformed());
    }
    Ok((tile, index))
}

/// Corner `corner` of tile `tile`, written `tile-corner`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VertexId {
    pub tile: TileId,
    pub corner: u8,
}

impl VertexId {
    pub fn new(tile: TileId, corner: u8) -> Self {
        Self {
            tile,
            corner: corner % 6,
        }
    }

    /// The two neighboring corners on the same tile
    pub fn tile_neighbors(&self) -> [VertexId; 2] {
        [
            VertexId::new(self.tile, self.corner + 5),
            VertexId::new(self.tile, self.corner + 1),
        ]
    }

    /// The two sides of the same tile that meet at this corner
    pub fn tile_edges(&self) -> [EdgeId; 2] {
        [
            EdgeId::new(self.tile, self.corner + 5),
            EdgeId::new(self.tile, self.corner),
        ]
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.tile, self.corner)
    }
}

impl FromStr for VertexId {
    type Err = ParseSiteIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_site(s).map(|(tile, corner)| VertexId { tile, corner })
    }
}

impl TryFrom<String> for VertexId {
    type Error = ParseSiteIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VertexId> for String {
    fn from(id: VertexId) -> Self {
        id.to_string()
    }
}

/// Side `side` of tile `tile`, written `tile-side`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EdgeId {
    pub tile: TileId,
    pub side: u8,
}

impl EdgeId {
    pub fn new(tile: TileId, side: u8) -> Self {
        Self {
            tile,
            side: side % 6,
        }
    }

    /// The two corners this side connects
    pub fn tile_endpoints(&self) -> [VertexId; 2] {
        [
            VertexId::new(self.tile, self.side),
            VertexId::new(self.tile, self.side + 1),
        ]
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.tile, self.side)
    }
}

impl FromStr for EdgeId {
    type Err = ParseSiteIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_site(s).map(|(tile, side)| EdgeId { tile, side })
    }
}

impl TryFrom<String> for EdgeId {
    type Error = ParseSiteIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EdgeId> for String {
    fn from(id: EdgeId) -> Self {
        id.to_string()
    }
}

/// How corners and sides relate across tile boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjacency {
    /// Every tile owns its six corners and sides; nothing is shared
    #[default]
    TileLocal,
    /// Corners and sides shared by neighboring tiles are one site
    Shared,
}

/// Precomputed relations of one vertex
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLinks {
    pub canonical: VertexId,
    pub adjacent_vertices: Vec<VertexId>,
    pub adjacent_edges: Vec<EdgeId>,
    pub adjacent_tiles: Vec<TileId>,
}

/// Precomputed relations of one edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLinks {
    pub canonical: EdgeId,
    pub connected_vertices: Vec<VertexId>,
}

/// Adjacency table for one board
#[derive(Debug, Clone)]
pub struct Topology {
    adjacency: Adjacency,
    vertices: HashMap<VertexId, VertexLinks>,
    edges: HashMap<EdgeId, EdgeLinks>,
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

impl Topology {
    /// Build the table for every corner and side of every tile on `board`
    pub fn build(board: &Board, adjacency: Adjacency) -> Self {
        // Land aliases win, then the lowest tile id, then the lowest index.
        let rank = |tile: TileId, index: u8| (!board.is_land(tile), tile, index);

        let mut corner_classes: HashMap<CornerKey, Vec<VertexId>> = HashMap::new();
        let mut side_classes: HashMap<SideKey, Vec<EdgeId>> = HashMap::new();
        let mut vertex_classes: Vec<Vec<VertexId>> = Vec::new();
        let mut edge_classes: Vec<Vec<EdgeId>> = Vec::new();

        for tile in board.tiles() {
            for i in 0..6 {
                let vertex = VertexId::new(tile.id, i);
                let edge = EdgeId::new(tile.id, i);
                match adjacency {
                    Adjacency::TileLocal => {
                        vertex_classes.push(vec![vertex]);
                        edge_classes.push(vec![edge]);
                    }
                    Adjacency::Shared => {
                        corner_classes
                            .entry(tile.coord.corner_key(i))
                            .or_default()
                            .push(vertex);
                        side_classes
                            .entry(tile.coord.side_key(i))
                            .or_default()
                            .push(edge);
                    }
                }
            }
        }
        vertex_classes.extend(corner_classes.into_values());
        edge_classes.extend(side_classes.into_values());

        let mut vertex_canon = HashMap::new();
        for class in &mut vertex_classes {
            class.sort_by_key(|v| rank(v.tile, v.corner));
            for alias in class.iter() {
                vertex_canon.insert(*alias, class[0]);
            }
        }
        let mut edge_canon = HashMap::new();
        for class in &mut edge_classes {
            class.sort_by_key(|e| rank(e.tile, e.side));
            for alias in class.iter() {
                edge_canon.insert(*alias, class[0]);
            }
        }

        let mut vertices = HashMap::new();
        for class in &vertex_classes {
            let canonical = class[0];
            let mut links = VertexLinks {
                canonical,
                adjacent_vertices: Vec::new(),
                adjacent_edges: Vec::new(),
                adjacent_tiles: Vec::new(),
            };
            for alias in class {
                for neighbor in alias.tile_neighbors() {
                    if let Some(n) = vertex_canon.get(&neighbor) {
                        if *n != canonical {
                            push_unique(&mut links.adjacent_vertices, *n);
                        }
                    }
                }
                for edge in alias.tile_edges() {
                    if let Some(e) = edge_canon.get(&edge) {
                        push_unique(&mut links.adjacent_edges, *e);
                    }
                }
                push_unique(&mut links.adjacent_tiles, alias.tile);
            }
            for alias in class {
                vertices.insert(*alias, links.clone());
            }
        }

        let mut edges = HashMap::new();
        for class in &edge_classes {
            let canonical = class[0];
            let connected_vertices = canonical
                .tile_endpoints()
                .iter()
                .filter_map(|v| vertex_canon.get(v).copied())
                .collect();
            let links = EdgeLinks {
                canonical,
                connected_vertices,
            };
            for alias in class {
                edges.insert(*alias, links.clone());
            }
        }

        Self {
            adjacency,
            vertices,
            edges,
        }
    }

    pub fn adjacency(&self) -> Adjacency {
        self.adjacency
    }

    /// Relations of a vertex, looked up by any of its aliases
    pub fn vertex(&self, id: &VertexId) -> Option<&VertexLinks> {
        self.vertices.get(id)
    }

    /// Relations of an edge, looked up by any of its aliases
    pub fn edge(&self, id: &EdgeId) -> Option<&EdgeLinks> {
        self.edges.get(id)
    }

    /// The id under which a vertex is stored, or None if it is off the board
    pub fn canonical_vertex(&self, id: &VertexId) -> Option<VertexId> {
        self.vertex(id).map(|l| l.canonical)
    }

    /// The id under which an edge is stored, or None if it is off the board
    pub fn canonical_edge(&self, id: &EdgeId) -> Option<EdgeId> {
        self.edge(id).map(|l| l.canonical)
    }

    pub fn adjacent_vertices(&self, id: &VertexId) -> &[VertexId] {
        self.vertex(id).map_or(&[], |l| &l.adjacent_vertices)
    }

    pub fn adjacent_edges(&self, id: &VertexId) -> &[EdgeId] {
        self.vertex(id).map_or(&[], |l| &l.adjacent_edges)
    }

    pub fn adjacent_tiles(&self, id: &VertexId) -> &[TileId] {
        self.vertex(id).map_or(&[], |l| &l.adjacent_tiles)
    }

    pub fn connected_vertices(&self, id: &EdgeId) -> &[VertexId] {
        self.edge(id).map_or(&[], |l| &l.connected_vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board() -> Board {
        Board::standard_with_rng(&mut StdRng::seed_from_u64(7))
    }

    fn v(s: &str) -> VertexId {
        s.parse().unwrap()
    }

    fn e(s: &str) -> EdgeId {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(v("10-2"), VertexId::new(10, 2));
        assert_eq!(e("0-5").to_string(), "0-5");
        assert!("10-6".parse::<VertexId>().is_err());
        assert!("10".parse::<VertexId>().is_err());
        assert!("a-1".parse::<EdgeId>().is_err());
        assert!("-1-2".parse::<EdgeId>().is_err());
    }

    #[test]
    fn test_serde_uses_string_form() {
        let json = serde_json::to_string(&v("12-4")).unwrap();
        assert_eq!(json, "\"12-4\"");
        let back: EdgeId = serde_json::from_str("\"3-1\"").unwrap();
        assert_eq!(back, EdgeId::new(3, 1));
        assert!(serde_json::from_str::<VertexId>("\"3-9\"").is_err());
    }

    #[test]
    fn test_tile_local_relations_wrap_around() {
        assert_eq!(v("4-0").tile_neighbors(), [v("4-5"), v("4-1")]);
        assert_eq!(v("4-0").tile_edges(), [e("4-5"), e("4-0")]);
        assert_eq!(e("4-5").tile_endpoints(), [v("4-5"), v("4-0")]);
    }

    #[test]
    fn test_tile_local_table_matches_pure_relations() {
        let topology = Topology::build(&board(), Adjacency::TileLocal);
        let vertex = v("10-2");

        assert_eq!(topology.canonical_vertex(&vertex), Some(vertex));
        assert_eq!(topology.adjacent_vertices(&vertex), &[v("10-1"), v("10-3")]);
        assert_eq!(topology.adjacent_edges(&vertex), &[e("10-1"), e("10-2")]);
        assert_eq!(topology.adjacent_tiles(&vertex), &[10]);
        assert_eq!(topology.connected_vertices(&e("10-5")), &[v("10-5"), v("10-0")]);
    }

    #[test]
    fn test_unknown_tile_has_no_links() {
        let topology = Topology::build(&board(), Adjacency::TileLocal);
        assert_eq!(topology.canonical_vertex(&v("37-0")), None);
        assert!(topology.adjacent_vertices(&v("99-1")).is_empty());
        assert!(topology.connected_vertices(&e("99-1")).is_empty());
    }

    #[test]
    fn test_shared_corner_collapses_aliases() {
        let topology = Topology::build(&board(), Adjacency::Shared);

        // Tiles 11, 17 and 18 meet at one corner.
        for alias in ["11-3", "17-1", "18-5"] {
            assert_eq!(topology.canonical_vertex(&v(alias)), Some(v("11-3")));
        }
        assert_eq!(topology.adjacent_tiles(&v("18-5")), &[11, 17, 18]);
        assert_eq!(topology.adjacent_vertices(&v("11-3")).len(), 3);
        assert_eq!(topology.adjacent_edges(&v("11-3")).len(), 3);
        assert!(topology
            .adjacent_vertices(&v("11-3"))
            .contains(&topology.canonical_vertex(&v("18-0")).unwrap()));
    }

    #[test]
    fn test_shared_prefers_land_alias() {
        let topology = Topology::build(&board(), Adjacency::Shared);
        // Top corner of tile 5 also belongs to water tiles 0 and 1.
        assert_eq!(topology.canonical_vertex(&v("0-2")), Some(v("5-0")));
        assert_eq!(topology.adjacent_tiles(&v("5-0")), &[5, 0, 1]);
    }

    #[test]
    fn test_shared_edge_collapses_aliases() {
        let topology = Topology::build(&board(), Adjacency::Shared);
        assert_eq!(topology.canonical_edge(&e("18-4")), Some(e("17-1")));

        let ends = topology.connected_vertices(&e("18-4"));
        assert_eq!(ends.len(), 2);
        for end in ends {
            assert!(topology.adjacent_edges(end).contains(&e("17-1")));
        }
    }
}
