//! Integration tests for the Hexhaven game engine.
//!
//! These tests drive complete sessions from the lobby through the opening
//! draft, main-game turns and victory.

use hexhaven_core::*;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

fn seeded_session(rules: RulesConfig) -> Session {
    let board = Board::standard_with_rng(&mut StdRng::seed_from_u64(2024));
    Session::with_board("TEST01".to_string(), rules, board)
}

/// A started three-player session
fn started(rules: RulesConfig) -> (Session, Vec<PlayerId>) {
    let mut session = seeded_session(rules);
    let players: Vec<PlayerId> = (0..3).map(|_| Uuid::new_v4()).collect();
    for (i, id) in players.iter().enumerate() {
        session.add_player(*id, format!("p{i}")).unwrap();
    }
    session.start(players[0]).unwrap();
    (session, players)
}

fn place(session: &mut Session, player: PlayerId, kind: BuildingKind, site: &str) -> Vec<GameEvent> {
    session
        .apply_action(
            player,
            GameAction::PlaceBuilding {
                kind,
                position: site.to_string(),
            },
        )
        .unwrap()
}

/// Settlement corners used for the draft, in visiting order. Each road
/// goes on side 5, which touches corner 0.
const DRAFT_TILES: [u32; 6] = [5, 10, 23, 26, 30, 16];

fn run_draft(session: &mut Session, players: &[PlayerId]) {
    let order = [0, 1, 2, 2, 1, 0];
    for (tile, seat) in DRAFT_TILES.iter().zip(order) {
        let player = players[seat];
        place(session, player, BuildingKind::Settlement, &format!("{tile}-0"));
        place(session, player, BuildingKind::Road, &format!("{tile}-5"));
        assert_vp_invariant(session);
    }
}

/// Draft by always taking the first offered site
fn run_draft_greedy(session: &mut Session) {
    while session.turn.game_phase == GamePhase::InitialPlacement {
        let (player, options) = session.pending_placements().unwrap();
        if let Some(vertex) = options.vertices.first() {
            place(session, player, BuildingKind::Settlement, &vertex.to_string());
        } else {
            let edge = options.edges.first().unwrap();
            place(session, player, BuildingKind::Road, &edge.to_string());
        }
        assert_vp_invariant(session);
    }
}

fn assert_vp_invariant(session: &Session) {
    for player in &session.players {
        assert_eq!(player.victory_points, player.building_points());
        assert_eq!(player.building_points(), player.settlements + 2 * player.cities);
        assert_eq!(player.total_cards, player.resources.total());
    }
}

fn player<'a>(session: &'a Session, id: PlayerId) -> &'a Player {
    session.player(id).unwrap()
}

/// Jump straight into a main-game phase with no buildings on the board
fn main_game(phase: TurnPhase) -> (Session, Vec<PlayerId>) {
    let (mut session, players) = started(RulesConfig::default());
    session.turn.game_phase = GamePhase::MainGame;
    session.turn.turn_phase = phase;
    (session, players)
}

fn building(kind: BuildingKind, owner: &Player) -> Building {
    Building {
        kind,
        owner_id: owner.id,
        owner_color: owner.color,
    }
}

// ==================== Opening Draft ====================

#[test]
fn test_start_opens_draft_with_first_player() {
    let (session, players) = started(RulesConfig::default());
    assert_eq!(session.status, SessionStatus::Playing);
    assert_eq!(session.turn.current_player_index, 0);
    assert_eq!(session.turn.turn_phase, TurnPhase::PlaceSettlement);
    assert_eq!(session.turn.initial_placement_round, 1);

    let (next, options) = session.pending_placements().unwrap();
    assert_eq!(next, players[0]);
    assert!(!options.vertices.is_empty());
    assert!(options.edges.is_empty());
}

#[test]
fn test_road_options_follow_settlement() {
    let (mut session, players) = started(RulesConfig::default());
    place(&mut session, players[0], BuildingKind::Settlement, "10-2");

    assert_eq!(session.turn.turn_phase, TurnPhase::PlaceRoad);
    let options = session.valid_placements(players[0]);
    let edges: Vec<String> = options.edges.iter().map(|e| e.to_string()).collect();
    assert_eq!(edges, vec!["10-1", "10-2"]);
    assert!(options.vertices.is_empty());

    let err = session
        .apply_action(
            players[0],
            GameAction::PlaceBuilding {
                kind: BuildingKind::Road,
                position: "10-4".to_string(),
            },
        )
        .unwrap_err();
    assert_eq!(err, GameError::InvalidPlacement("road".into()));
}

#[test]
fn test_full_snake_draft() {
    let (mut session, players) = started(RulesConfig::default());
    run_draft(&mut session, &players);

    assert_eq!(session.turn.game_phase, GamePhase::MainGame);
    assert_eq!(session.turn.turn_phase, TurnPhase::Roll);
    assert_eq!(session.turn.current_player_index, 0);
    assert_eq!(session.turn.initial_placement_round, 2);

    // Round-2 settlements: p2 on 26, p1 on 30, p0 on 16
    for (seat, tile) in [(0, 16), (1, 30), (2, 26)] {
        let p = player(&session, players[seat]);
        assert_eq!(p.settlements, 2);
        assert_eq!(p.roads, 2);
        assert_eq!(p.victory_points, 2);

        let resource = session.board.get_tile(tile).unwrap().resource().unwrap();
        assert_eq!(p.resources, ResourceHand::single(resource, 1));
    }
    assert_eq!(session.buildings.vertices.len(), 6);
    assert_eq!(session.buildings.edges.len(), 6);
}

#[test]
fn test_draft_visit_order_is_forward_then_backward() {
    let (mut session, players) = started(RulesConfig::default());
    let mut visits = Vec::new();
    let order = [0, 1, 2, 2, 1, 0];
    for (tile, seat) in DRAFT_TILES.iter().zip(order) {
        visits.push(session.turn.current_player_index);
        place(&mut session, players[seat], BuildingKind::Settlement, &format!("{tile}-0"));
        assert_eq!(session.turn.current_player_index, seat);
        place(&mut session, players[seat], BuildingKind::Road, &format!("{tile}-5"));
    }
    assert_eq!(visits, vec![0, 1, 2, 2, 1, 0]);
}

#[test]
fn test_first_round_settlement_grants_nothing() {
    let (mut session, players) = started(RulesConfig::default());
    place(&mut session, players[0], BuildingKind::Settlement, "5-0");
    assert!(player(&session, players[0]).resources.is_empty());
}

#[test]
fn test_distance_rule_holds_after_draft() {
    let (mut session, players) = started(RulesConfig::default());
    run_draft(&mut session, &players);

    let occupied: Vec<VertexId> = session.buildings.vertices.keys().copied().collect();
    for id in &players {
        let options = session.valid_placements(*id);
        for vertex in &occupied {
            for neighbor in session.topology.adjacent_vertices(vertex) {
                assert!(!options.vertices.contains(neighbor), "{neighbor} offered");
            }
        }
    }
}

#[test]
fn test_rejected_command_changes_nothing() {
    let (mut session, players) = started(RulesConfig::default());
    place(&mut session, players[0], BuildingKind::Settlement, "10-2");
    let before = session.snapshot();

    assert_eq!(
        session.apply_action(players[1], GameAction::EndTurn),
        Err(GameError::NotYourTurn)
    );
    assert_eq!(
        session.apply_action(players[0], GameAction::RollDice),
        Err(GameError::InvalidPhase)
    );
    assert_eq!(
        session.apply_action(
            players[0],
            GameAction::PlaceBuilding {
                kind: BuildingKind::Road,
                position: "11-0".to_string()
            }
        ),
        Err(GameError::InvalidPlacement("road".into()))
    );
    assert_eq!(
        session.apply_action(Uuid::new_v4(), GameAction::EndTurn),
        Err(GameError::PlayerNotFound)
    );

    assert_eq!(session.snapshot(), before);
}

// ==================== Dice and Robber ====================

#[test]
fn test_roll_eight_pays_settlements_and_cities() {
    let (mut session, players) = main_game(TurnPhase::Roll);
    let tile = session
        .board
        .tiles()
        .iter()
        .find(|t| t.number == Some(8))
        .unwrap()
        .clone();
    let resource = tile.resource().unwrap();

    let p0 = player(&session, players[0]).clone();
    let p1 = player(&session, players[1]).clone();
    let p2 = player(&session, players[2]).clone();
    session
        .buildings
        .set_vertex(VertexId::new(tile.id, 0), building(BuildingKind::Settlement, &p0));
    session
        .buildings
        .set_vertex(VertexId::new(tile.id, 3), building(BuildingKind::City, &p1));
    // Desert never pays
    session.buildings.set_vertex(
        VertexId::new(session.board.desert_id(), 0),
        building(BuildingKind::Settlement, &p2),
    );

    let events = session.resolve_roll(players[0], (4, 4)).unwrap();

    assert_eq!(session.turn.turn_phase, TurnPhase::Build);
    assert_eq!(session.dice, (4, 4));
    assert_eq!(player(&session, players[0]).resources, ResourceHand::single(resource, 1));
    assert_eq!(player(&session, players[1]).resources, ResourceHand::single(resource, 2));
    assert!(player(&session, players[2]).resources.is_empty());
    assert_eq!(player(&session, players[1]).total_cards, 2);
    assert_eq!(
        events[1],
        GameEvent::ResourcesDistributed {
            distributions: vec![(players[0], resource, 1), (players[1], resource, 2)],
        }
    );
}

#[test]
fn test_robber_suppresses_payout() {
    let (mut session, players) = main_game(TurnPhase::Roll);
    let tile = session
        .board
        .tiles()
        .iter()
        .find(|t| t.number == Some(6))
        .unwrap()
        .clone();
    let p0 = player(&session, players[0]).clone();
    session
        .buildings
        .set_vertex(VertexId::new(tile.id, 1), building(BuildingKind::City, &p0));
    session.robber_tile = tile.id;

    session.resolve_roll(players[0], (1, 5)).unwrap();
    assert!(player(&session, players[0]).resources.is_empty());
}

#[test]
fn test_seven_then_robber_move() {
    let (mut session, players) = main_game(TurnPhase::Roll);
    session.resolve_roll(players[0], (3, 4)).unwrap();
    assert_eq!(session.turn.turn_phase, TurnPhase::Robber);
    assert!(session.pending_placements().is_none());
    assert_eq!(
        session.apply_action(players[0], GameAction::EndTurn),
        Err(GameError::InvalidPhase)
    );

    let events = session
        .apply_action(players[0], GameAction::MoveRobber { tile_id: 12 })
        .unwrap();
    assert_eq!(session.robber_tile, 12);
    assert_eq!(session.turn.turn_phase, TurnPhase::Build);
    assert_eq!(
        events,
        vec![GameEvent::RobberMoved {
            player: players[0],
            from: 18,
            to: 12
        }]
    );
}

#[test]
fn test_every_non_seven_total_goes_to_build() {
    for (a, b) in [(1, 1), (1, 2), (2, 3), (5, 6), (6, 6), (2, 6)] {
        let (mut session, players) = main_game(TurnPhase::Roll);
        session.resolve_roll(players[0], (a, b)).unwrap();
        assert_eq!(session.turn.turn_phase, TurnPhase::Build, "roll {a}+{b}");
    }
}

#[test]
fn test_turns_rotate_through_all_players() {
    let (mut session, players) = started(RulesConfig::default());
    run_draft(&mut session, &players);

    for round in 0..2 {
        for seat in 0..3 {
            assert_eq!(session.turn.current_player_index, seat, "round {round}");
            session.resolve_roll(players[seat], (1, 2)).unwrap();
            session
                .apply_action(players[seat], GameAction::EndTurn)
                .unwrap();
            assert_eq!(session.turn.turn_phase, TurnPhase::Roll);
            assert_eq!(session.turn.current_player_index, (seat + 1) % 3);
        }
    }
}

// ==================== Main-Game Building ====================

#[test]
fn test_building_needs_resources_and_build_phase() {
    let (mut session, players) = started(RulesConfig::default());
    run_draft(&mut session, &players);

    let road = GameAction::PlaceBuilding {
        kind: BuildingKind::Road,
        position: "5-4".to_string(),
    };
    assert_eq!(
        session.apply_action(players[0], road.clone()),
        Err(GameError::InvalidPhase)
    );

    session.resolve_roll(players[0], (6, 6)).unwrap();
    session.players[0].resources = ResourceHand::new();
    session.players[0].total_cards = 0;
    assert_eq!(
        session.apply_action(players[0], road),
        Err(GameError::InsufficientResources)
    );
}

#[test]
fn test_extend_network_then_settle() {
    let (mut session, players) = started(RulesConfig::default());
    run_draft(&mut session, &players);
    session.resolve_roll(players[0], (6, 6)).unwrap();

    session.players[0].resources = ResourceHand::with_amounts(2, 2, 1, 1, 0);
    session.players[0].total_cards = 6;

    // Not connected to p0's network
    assert_eq!(
        session.apply_action(
            players[0],
            GameAction::PlaceBuilding {
                kind: BuildingKind::Road,
                position: "12-0".to_string()
            }
        ),
        Err(GameError::InvalidPlacement("road".into()))
    );
    // A rejected site costs nothing
    assert_eq!(
        player(&session, players[0]).resources,
        ResourceHand::with_amounts(2, 2, 1, 1, 0)
    );
    assert_eq!(player(&session, players[0]).total_cards, 6);

    place(&mut session, players[0], BuildingKind::Road, "5-4");
    assert_eq!(
        player(&session, players[0]).resources,
        ResourceHand::with_amounts(1, 1, 1, 1, 0)
    );
    assert_eq!(player(&session, players[0]).total_cards, 4);
    assert!(session
        .valid_placements(players[0])
        .vertices
        .contains(&VertexId::new(5, 4)));
    place(&mut session, players[0], BuildingKind::Settlement, "5-4");

    let p0 = player(&session, players[0]);
    assert_eq!(p0.roads, 3);
    assert_eq!(p0.settlements, 3);
    assert_eq!(p0.victory_points, 3);
    assert_eq!(p0.resources, ResourceHand::with_amounts(0, 0, 0, 0, 0));
    assert_eq!(p0.total_cards, 0);
    assert_vp_invariant(&session);

    let owner = session.buildings.vertices[&VertexId::new(5, 4)];
    assert_eq!(owner.owner_id, players[0]);
    assert_eq!(owner.kind, BuildingKind::Settlement);
}

#[test]
fn test_city_upgrade_rules() {
    let (mut session, players) = started(RulesConfig::default());
    run_draft(&mut session, &players);
    session.resolve_roll(players[0], (6, 6)).unwrap();
    session.players[0].resources = ResourceHand::with_amounts(0, 0, 4, 0, 6);
    session.players[0].total_cards = 10;

    // p1's settlement
    let err = session
        .place_building(players[0], BuildingKind::City, "10-0")
        .unwrap_err();
    assert_eq!(err, GameError::NotYourSettlement);
    assert_eq!(err.to_string(), "Can only upgrade your own settlements to cities");

    place(&mut session, players[0], BuildingKind::City, "5-0");
    let p0 = player(&session, players[0]);
    assert_eq!((p0.settlements, p0.cities, p0.victory_points), (1, 1, 3));
    assert_eq!(p0.resources, ResourceHand::with_amounts(0, 0, 2, 0, 3));

    // Already a city
    assert_eq!(
        session.place_building(players[0], BuildingKind::City, "5-0"),
        Err(GameError::NotYourSettlement)
    );
    assert_eq!(
        session.valid_placements(players[0]).cities,
        vec![VertexId::new(16, 0)]
    );
}

// ==================== Victory ====================

fn on_the_brink(rules: RulesConfig) -> (Session, Vec<PlayerId>) {
    let (mut session, players) = started(rules);
    run_draft(&mut session, &players);
    session.resolve_roll(players[0], (6, 6)).unwrap();

    // Seven more settlements' worth of points, already on the board
    let p0 = &mut session.players[0];
    p0.settlements += 7;
    p0.victory_points += 7;
    p0.resources = ResourceHand::with_amounts(0, 0, 2, 0, 3);
    p0.total_cards = 5;
    (session, players)
}

#[test]
fn test_city_reaching_ten_finishes_game() {
    let (mut session, players) = on_the_brink(RulesConfig::default());
    let events = place(&mut session, players[0], BuildingKind::City, "5-0");

    assert_eq!(session.turn.game_phase, GamePhase::Finished);
    assert_eq!(player(&session, players[0]).victory_points, 10);
    assert_eq!(
        events.last(),
        Some(&GameEvent::GameWon {
            player: players[0],
            victory_points: 10
        })
    );
    assert!(session
        .log
        .entries()
        .any(|line| line.ends_with("p0 wins with 10 victory points!")));

    // Without lockout the game keeps accepting commands
    session
        .apply_action(players[0], GameAction::EndTurn)
        .unwrap();
    assert_eq!(session.turn.game_phase, GamePhase::Finished);
    assert_eq!(session.turn.current_player_index, 1);
}

#[test]
fn test_lockout_after_victory() {
    let (mut session, players) = on_the_brink(RulesConfig {
        lock_after_victory: true,
        ..RulesConfig::default()
    });
    place(&mut session, players[0], BuildingKind::City, "5-0");

    assert_eq!(
        session.apply_action(players[0], GameAction::EndTurn),
        Err(GameError::GameOver)
    );
    assert_eq!(
        session.apply_action(players[1], GameAction::RollDice),
        Err(GameError::GameOver)
    );
    // Chat is not a game command
    assert!(session.post_chat(players[1], "gg".into()).is_ok());
}

#[test]
fn test_lower_target_from_config() {
    let rules = RulesConfig::from_json_str(r#"{"victory_points_to_win": 3}"#).unwrap();
    let (mut session, players) = started(rules);
    run_draft(&mut session, &players);
    assert_eq!(session.turn.game_phase, GamePhase::MainGame);

    session.resolve_roll(players[0], (6, 6)).unwrap();
    session.players[0].resources = ResourceHand::with_amounts(2, 2, 1, 1, 0);
    session.players[0].total_cards = 6;
    place(&mut session, players[0], BuildingKind::Road, "5-4");
    let events = place(&mut session, players[0], BuildingKind::Settlement, "5-4");

    assert_eq!(session.turn.game_phase, GamePhase::Finished);
    assert!(matches!(
        events.last(),
        Some(GameEvent::GameWon { victory_points: 3, .. })
    ));
}

// ==================== Shared Adjacency ====================

#[test]
fn test_shared_adjacency_full_draft() {
    let (mut session, _players) = started(RulesConfig {
        adjacency: Adjacency::Shared,
        ..RulesConfig::default()
    });
    run_draft_greedy(&mut session);

    assert_eq!(session.turn.game_phase, GamePhase::MainGame);
    assert_eq!(session.turn.turn_phase, TurnPhase::Roll);
    assert_eq!(session.buildings.vertices.len(), 6);
    assert_eq!(session.buildings.edges.len(), 6);

    // Every stored id is canonical, and no two settlements are neighbors
    let occupied: Vec<VertexId> = session.buildings.vertices.keys().copied().collect();
    for vertex in &occupied {
        assert_eq!(session.topology.canonical_vertex(vertex), Some(*vertex));
        for neighbor in session.topology.adjacent_vertices(vertex) {
            assert!(!occupied.contains(neighbor));
        }
    }
}

#[test]
fn test_shared_alias_is_the_same_site() {
    let (mut session, players) = started(RulesConfig {
        adjacency: Adjacency::Shared,
        ..RulesConfig::default()
    });
    place(&mut session, players[0], BuildingKind::Settlement, "18-5");
    assert!(session.buildings.vertices.contains_key(&VertexId::new(11, 3)));

    // A road named from the desert side lands on the canonical edge
    let edges = session.valid_placements(players[0]).edges;
    assert_eq!(edges.len(), 3);
    place(&mut session, players[0], BuildingKind::Road, "18-4");
    assert!(session.buildings.edges.contains_key(&EdgeId::new(17, 1)));

    // p1 cannot settle on the same corner under another name
    assert_eq!(
        session.place_building(players[1], BuildingKind::Settlement, "17-1"),
        Err(GameError::InvalidPlacement("settlement".into()))
    );
}

// ==================== Snapshot ====================

#[test]
fn test_snapshot_round_trips_through_json() {
    let (mut session, players) = started(RulesConfig::default());
    run_draft(&mut session, &players);
    session.post_chat(players[1], "hello".into()).unwrap();

    let snapshot = session.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: GameSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["buildings"]["vertices"]["5-0"]["type"], "settlement");
    assert_eq!(value["buildings"]["edges"]["5-5"]["type"], "road");
    assert_eq!(value["buildings"]["vertices"]["5-0"]["ownerColor"], "#e74c3c");
    assert_eq!(value["chatMessages"][0]["playerName"], "p1");
    assert!(value["gameLog"].as_array().unwrap().len() <= 20);
}
