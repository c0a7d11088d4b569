//! Resource production from dice rolls and starting settlements.

use crate::board::{Board, Resource, TileId};
use crate::placement::{BuildingKind, Buildings};
use crate::player::PlayerId;
use crate::topology::{Topology, VertexId};

/// One grant from the bank: (player, resource, amount)
pub type Payout = (PlayerId, Resource, u32);

/// Resources produced by a roll of `total`.
///
/// Every tile showing `total` pays its resource to each settlement (1) and
/// city (2) on its six corners, unless the robber sits on it. Tiles are
/// visited in id order and corners in index order.
pub fn roll_payouts(
    board: &Board,
    topology: &Topology,
    buildings: &Buildings,
    robber: TileId,
    total: u8,
) -> Vec<Payout> {
    let mut payouts = Vec::new();
    for tile in board.tiles() {
        if tile.number != Some(total) || tile.id == robber {
            continue;
        }
        let Some(resource) = tile.resource() else {
            continue;
        };
        for corner in 0..6 {
            let Some(vertex) = topology.canonical_vertex(&VertexId::new(tile.id, corner)) else {
                continue;
            };
            let Some(building) = buildings.at_vertex(&vertex) else {
                continue;
            };
            let amount = match building.kind {
                BuildingKind::Settlement => 1,
                BuildingKind::City => 2,
                BuildingKind::Road => continue,
            };
            payouts.push((building.owner_id, resource, amount));
        }
    }
    payouts
}

/// One unit of each resource tile touching a freshly placed settlement
pub fn starting_resources(board: &Board, topology: &Topology, vertex: &VertexId) -> Vec<Resource> {
    topology
        .adjacent_tiles(vertex)
        .iter()
        .filter_map(|id| board.get_tile(*id))
        .filter_map(|tile| tile.resource())
        .collect()
}
