//! Rules engine: placement, movement, combat, turns and win detection.

use bastion_server::game::{
    catalog::UnitKind,
    error::RuleError,
    geometry::{all_cells, manhattan_distance, Pos},
    logic::{GameState, Intent},
    types::{Phase, PlayerId},
};

const P1: PlayerId = PlayerId::One;
const P2: PlayerId = PlayerId::Two;

fn at(row: u8, col: u8) -> Pos {
    Pos::new(row, col)
}

/// Both bases down: P1 at `b1`, P2 at `b2`, back on P1's turn with 5 energy.
fn with_bases(b1: Pos, b2: Pos) -> GameState {
    let mut g = GameState::new();
    g.place_base(P1, b1).unwrap();
    g.end_turn(P1).unwrap();
    g.place_base(P2, b2).unwrap();
    g.end_turn(P2).unwrap();
    g
}

fn pass_round(g: &mut GameState, player: PlayerId) {
    g.end_turn(player).unwrap();
    g.end_turn(player.opponent()).unwrap();
}

#[test]
fn fresh_game_waits_for_player_one_base() {
    let g = GameState::new();
    assert_eq!(g.phase(), Phase::AwaitingBasePlacement(P1));
    assert_eq!(g.current_player(), P1);
    assert_eq!(g.turn(), 1);
    for p in [P1, P2] {
        assert_eq!(g.player(p).energy, 5);
        assert!(g.player(p).undo_available);
        assert!(!g.player(p).base_placed);
    }
    assert!(g.board().pieces().next().is_none());
}

#[test]
fn placing_base_costs_three_and_switches_phase() {
    let mut g = GameState::new();
    let snap = g.place_base(P1, at(3, 3)).unwrap();

    assert_eq!(g.player(P1).energy, 2);
    assert!(g.player(P1).base_placed);
    assert_eq!(g.player(P1).base_position, Some(at(3, 3)));
    assert_eq!(g.phase(), Phase::AwaitingAction(P1));
    let cell = snap.cell(3, 3).unwrap();
    assert_eq!(cell.kind, UnitKind::Base);
    assert_eq!(cell.health, 8);
    assert!(g.undo_record().is_none());
}

#[test]
fn second_base_is_refused() {
    let mut g = GameState::new();
    g.place_base(P1, at(3, 3)).unwrap();
    assert_eq!(g.place_base(P1, at(0, 0)), Err(RuleError::BaseAlreadyPlaced));
}

#[test]
fn base_on_occupied_cell_is_illegal() {
    let mut g = GameState::new();
    g.place_base(P1, at(3, 3)).unwrap();
    g.end_turn(P1).unwrap();
    assert_eq!(
        g.place_base(P2, at(3, 3)),
        Err(RuleError::IllegalPlacement { pos: at(3, 3) })
    );
    assert_eq!(g.player(P2).energy, 5);
}

#[test]
fn off_board_positions_are_rejected() {
    let mut g = GameState::new();
    assert_eq!(
        g.place_base(P1, at(8, 0)),
        Err(RuleError::OutOfBounds { pos: at(8, 0) })
    );
}

#[test]
fn acting_out_of_turn_is_rejected() {
    let mut g = GameState::new();
    assert_eq!(g.place_base(P2, at(0, 0)), Err(RuleError::NotYourTurn));
    assert_eq!(g.end_turn(P2), Err(RuleError::NotYourTurn));
    assert_eq!(g.undo(P2), Err(RuleError::NotYourTurn));
}

#[test]
fn unit_before_base_is_rejected() {
    let mut g = GameState::new();
    assert_eq!(
        g.place_unit(P1, at(3, 4), UnitKind::Warrior),
        Err(RuleError::BaseNotYetPlaced)
    );
}

#[test]
fn insufficient_energy_leaves_state_untouched() {
    let mut g = GameState::new();
    g.place_base(P1, at(3, 3)).unwrap();
    let before = g.clone();

    assert_eq!(
        g.place_unit(P1, at(3, 4), UnitKind::Warrior),
        Err(RuleError::InsufficientEnergy {
            needed: 3,
            available: 2
        })
    );
    assert_eq!(g.player(P1).energy, 2);
    assert_eq!(g, before);
}

#[test]
fn deployment_is_limited_to_the_ring_around_the_base() {
    let mut g = with_bases(at(0, 0), at(7, 7));

    let zone = g.deployment_zone(P1);
    assert_eq!(zone, vec![at(0, 1), at(1, 0), at(1, 1)]);

    assert_eq!(
        g.place_unit(P1, at(2, 2), UnitKind::Warrior),
        Err(RuleError::OutOfDeploymentZone { pos: at(2, 2) })
    );
    // Next to an ally unit but not to the base still doesn't count.
    g.place_unit(P1, at(1, 1), UnitKind::Warrior).unwrap();
    assert_eq!(g.player(P1).energy, 2);
    pass_round(&mut g, P1);
    assert_eq!(
        g.place_unit(P1, at(2, 2), UnitKind::Archer),
        Err(RuleError::OutOfDeploymentZone { pos: at(2, 2) })
    );
    // The rest of the ring stays open.
    assert!(g.deployment_zone(P1).contains(&at(0, 1)));
}

#[test]
fn deploying_onto_a_piece_or_as_a_base_fails() {
    let mut g = with_bases(at(3, 3), at(3, 4));
    assert_eq!(
        g.place_unit(P1, at(3, 4), UnitKind::Warrior),
        Err(RuleError::CellOccupied { pos: at(3, 4) })
    );
    assert_eq!(
        g.place_unit(P1, at(2, 2), UnitKind::Base),
        Err(RuleError::BaseIsNotAUnit)
    );
}

#[test]
fn placed_unit_fills_a_previously_empty_cell() {
    let mut g = with_bases(at(3, 3), at(7, 7));
    for kind in [UnitKind::Warrior, UnitKind::Tank] {
        let target = g.deployment_zone(P1)[0];
        assert!(g.board().is_empty(target));
        g.place_unit(P1, target, kind).unwrap();
        let pc = g.piece_at(target).unwrap();
        assert_eq!(pc.kind, kind);
        assert_eq!(pc.owner, P1);
        assert_eq!(pc.health, kind.spec().max_health);
        assert!(!pc.special_used);
        pass_round(&mut g, P1);
    }
}

#[test]
fn units_move_one_orthogonal_step_and_keep_their_state() {
    let mut g = with_bases(at(3, 3), at(7, 7));
    g.place_unit(P1, at(3, 4), UnitKind::Warrior).unwrap();

    g.move_unit(P1, at(3, 4), at(3, 5)).unwrap();
    assert!(g.board().is_empty(at(3, 4)));
    let moved = g.piece_at(at(3, 5)).unwrap();
    assert_eq!(moved.kind, UnitKind::Warrior);
    assert_eq!(moved.health, 4);
    assert_eq!(g.player(P1).energy, 1);
}

#[test]
fn move_never_succeeds_unless_distance_is_exactly_one() {
    let mut g = with_bases(at(3, 3), at(7, 7));
    g.place_unit(P1, at(3, 4), UnitKind::Warrior).unwrap();
    let from = at(3, 4);

    for to in all_cells() {
        let mut trial = g.clone();
        let ok = trial.move_unit(P1, from, to).is_ok();
        let expected = manhattan_distance(from, to) == 1 && g.board().is_empty(to);
        assert_eq!(ok, expected, "move {from} -> {to}");
    }
}

#[test]
fn illegal_moves_report_why() {
    let mut g = with_bases(at(3, 3), at(4, 4));
    g.place_unit(P1, at(3, 4), UnitKind::Warrior).unwrap();

    // diagonal
    assert_eq!(
        g.move_unit(P1, at(3, 4), at(2, 5)),
        Err(RuleError::InvalidDestination { pos: at(2, 5) })
    );
    // occupied by the enemy base
    assert_eq!(
        g.move_unit(P1, at(3, 4), at(4, 4)),
        Err(RuleError::InvalidDestination { pos: at(4, 4) })
    );
    // bases never move
    assert_eq!(
        g.move_unit(P1, at(3, 3), at(2, 3)),
        Err(RuleError::NotYourPiece { pos: at(3, 3) })
    );
    // not ours
    assert_eq!(
        g.move_unit(P1, at(4, 4), at(5, 4)),
        Err(RuleError::NotYourPiece { pos: at(4, 4) })
    );
    // empty source
    assert_eq!(
        g.move_unit(P1, at(0, 0), at(0, 1)),
        Err(RuleError::NotYourPiece { pos: at(0, 0) })
    );
}

#[test]
fn attack_deals_attack_power_and_charges_two() {
    let mut g = with_bases(at(3, 3), at(3, 5));
    g.place_unit(P1, at(3, 4), UnitKind::Warrior).unwrap();
    g.attack(P1, at(3, 4), at(3, 5)).unwrap();

    assert_eq!(g.piece_at(at(3, 5)).unwrap().health, 7);
    assert_eq!(g.player(P1).energy, 0);
}

#[test]
fn zero_attack_power_still_hits_for_one() {
    let mut g = with_bases(at(3, 3), at(3, 5));
    g.place_unit(P1, at(3, 4), UnitKind::Healer).unwrap();
    g.attack(P1, at(3, 4), at(3, 5)).unwrap();
    assert_eq!(g.piece_at(at(3, 5)).unwrap().health, 7);
}

#[test]
fn attack_range_is_manhattan() {
    let mut g = with_bases(at(0, 0), at(2, 3));
    g.place_unit(P1, at(1, 1), UnitKind::Archer).unwrap();
    // distance 3: |1-2| + |1-3|
    assert_eq!(
        g.attack(P1, at(1, 1), at(2, 3)),
        Err(RuleError::OutOfRange { pos: at(2, 3) })
    );
    pass_round(&mut g, P1);
    g.move_unit(P1, at(1, 1), at(1, 2)).unwrap();
    // distance 2 now, within archer range
    g.attack(P1, at(1, 2), at(2, 3)).unwrap();
    assert_eq!(g.piece_at(at(2, 3)).unwrap().health, 7);
    assert_eq!(g.attack_targets(at(1, 2)), vec![at(2, 3)]);
}

#[test]
fn attack_rejects_allies_empty_cells_and_foreign_attackers() {
    let mut g = with_bases(at(3, 3), at(5, 5));
    g.place_unit(P1, at(3, 4), UnitKind::Warrior).unwrap();
    assert_eq!(
        g.attack(P1, at(3, 4), at(3, 3)),
        Err(RuleError::TargetIsAlly { pos: at(3, 3) })
    );
    assert_eq!(
        g.attack(P1, at(3, 4), at(3, 5)),
        Err(RuleError::NoEligibleTarget)
    );
    assert_eq!(
        g.attack(P1, at(5, 5), at(3, 4)),
        Err(RuleError::NotYourPiece { pos: at(5, 5) })
    );
}

#[test]
fn lethal_hit_removes_non_base_piece() {
    // P2's base chips away at P1's archer (3 health).
    let mut g = with_bases(at(1, 1), at(1, 3));
    g.place_unit(P1, at(1, 2), UnitKind::Archer).unwrap();
    g.end_turn(P1).unwrap();

    g.attack(P2, at(1, 3), at(1, 2)).unwrap();
    g.attack(P2, at(1, 3), at(1, 2)).unwrap();
    assert_eq!(g.piece_at(at(1, 2)).unwrap().health, 1);
    pass_round(&mut g, P2);

    g.attack(P2, at(1, 3), at(1, 2)).unwrap();
    assert!(g.board().is_empty(at(1, 2)));
    assert!(g.winner().is_none());
}

#[test]
fn eighth_hit_on_base_resolves_the_game() {
    let mut g = with_bases(at(1, 1), at(2, 3));
    g.place_unit(P1, at(2, 2), UnitKind::Warrior).unwrap();
    g.attack(P1, at(2, 2), at(2, 3)).unwrap();
    let mut hits = 1;

    while hits < 7 {
        pass_round(&mut g, P1);
        g.attack(P1, at(2, 2), at(2, 3)).unwrap();
        g.attack(P1, at(2, 2), at(2, 3)).unwrap();
        hits += 2;
    }
    assert_eq!(g.piece_at(at(2, 3)).unwrap().health, 1);
    assert!(g.winner().is_none());

    pass_round(&mut g, P1);
    let snap = g.attack(P1, at(2, 2), at(2, 3)).unwrap();

    assert_eq!(g.winner(), Some(P1));
    assert_eq!(g.phase(), Phase::Resolved(P1));
    assert_eq!(snap.winner, Some(P1));
    // the base stays on the board at its lethal value
    assert_eq!(g.piece_at(at(2, 3)).unwrap().health, 0);
    assert_eq!(g.piece_at(at(2, 3)).unwrap().kind, UnitKind::Base);

    // nothing mutates a resolved game
    let frozen = g.clone();
    for intent in [
        Intent::EndTurn,
        Intent::Undo,
        Intent::Move {
            from: at(2, 2),
            to: at(3, 2),
        },
        Intent::UseSpecial { unit: at(2, 2) },
    ] {
        assert_eq!(g.apply(P1, &intent), Err(RuleError::GameOver));
        assert_eq!(g.apply(P2, &intent), Err(RuleError::GameOver));
    }
    assert_eq!(g, frozen);
}

#[test]
fn end_turn_archives_log_and_resets_economy() {
    let mut g = GameState::new();
    g.place_base(P1, at(3, 3)).unwrap();
    assert_eq!(g.turn_log().len(), 1);

    let snap = g.end_turn(P1).unwrap();
    assert!(snap.turn_log.is_empty());
    assert_eq!(snap.last_turn_log.len(), 2);
    assert!(snap.last_turn_log[0].contains("placed Base at (3,3)"));
    assert!(snap.last_turn_log[1].contains("ended turn 1"));
    assert_eq!(g.current_player(), P2);
    assert_eq!(g.turn(), 2);
    assert_eq!(g.player(P2).energy, 5);
    // P1 keeps whatever was left until their next turn begins
    assert_eq!(g.player(P1).energy, 2);

    g.end_turn(P2).unwrap();
    assert_eq!(g.player(P1).energy, 5);
}

#[test]
fn apply_routes_intents() {
    let mut g = GameState::new();
    g.apply(P1, &Intent::PlaceBase { pos: at(3, 3) }).unwrap();
    g.apply(P1, &Intent::EndTurn).unwrap();
    g.apply(P2, &Intent::PlaceBase { pos: at(5, 5) }).unwrap();
    g.apply(P2, &Intent::EndTurn).unwrap();
    g.apply(
        P1,
        &Intent::PlaceUnit {
            pos: at(3, 4),
            kind: UnitKind::Archer,
        },
    )
    .unwrap();
    assert_eq!(g.piece_at(at(3, 4)).unwrap().kind, UnitKind::Archer);
}

#[test]
fn highlight_queries_follow_the_rules() {
    let mut g = with_bases(at(3, 3), at(3, 5));
    g.place_unit(P1, at(3, 4), UnitKind::Warrior).unwrap();

    assert_eq!(g.move_targets(at(3, 4)), vec![at(2, 4), at(4, 4)]);
    assert!(g.move_targets(at(3, 3)).is_empty(), "bases never move");
    assert_eq!(g.attack_targets(at(3, 4)), vec![at(3, 5)]);
    assert_eq!(g.attack_targets(at(3, 5)), vec![at(3, 4)]);
    assert!(g.attack_targets(at(0, 0)).is_empty());
}
