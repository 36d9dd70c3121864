//! The authoritative rules engine.
//!
//! [`GameState`] owns the board, both players' economy, turn order and the
//! undo slot. Every entry point validates the full precondition set before
//! touching anything, so a rejected intent leaves the state exactly as it
//! was. Nothing in here blocks, logs or knows about transport.

use crate::game::{
    board::Board,
    catalog::{SpecialEffect, UnitKind, ATTACK_COST, MOVE_COST, SPECIAL_COST, TURN_ENERGY},
    error::RuleError,
    geometry::{
        cells_within_range, chebyshev_distance, is_in_bounds, manhattan_distance,
        orthogonal_adjacent, orthogonal_neighbours, ring, Pos,
    },
    snapshot::Snapshot,
    turn_log::TurnLog,
    types::{Phase, Piece, PlayerId, PlayerState, UndoRecord},
};
use serde::{Deserialize, Serialize};

/// Player intent, one variant per entry point.
///
/// Intents only ever name positions and kinds; outcomes such as damage or
/// resulting health are always derived here.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "action")]
pub enum Intent {
    PlaceBase { pos: Pos },
    PlaceUnit { pos: Pos, kind: UnitKind },
    Move { from: Pos, to: Pos },
    Attack { attacker: Pos, target: Pos },
    UseSpecial { unit: Pos },
    Undo,
    EndTurn,
}

pub type RuleResult = Result<Snapshot, RuleError>;

/// Aggregate root of one game.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameState {
    board: Board,
    players: [PlayerState; 2],
    current_player: PlayerId,
    turn: u32,
    undo: Option<UndoRecord>,
    turn_log: TurnLog,
    last_turn_log: Vec<String>,
    winner: Option<PlayerId>,
}

impl Default for GameState {
    fn default() -> Self {
        GameState {
            board: Board::new(),
            players: [PlayerState::new(TURN_ENERGY), PlayerState::new(TURN_ENERGY)],
            current_player: PlayerId::One,
            turn: 1,
            undo: None,
            turn_log: TurnLog::default(),
            last_turn_log: Vec::new(),
            winner: None,
        }
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------- read side ----------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece_at(&self, pos: Pos) -> Option<&Piece> {
        self.board.get(pos)
    }

    pub fn player(&self, player: PlayerId) -> &PlayerState {
        &self.players[player.index()]
    }

    pub fn players(&self) -> &[PlayerState; 2] {
        &self.players
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn undo_record(&self) -> Option<&UndoRecord> {
        self.undo.as_ref()
    }

    pub fn turn_log(&self) -> &TurnLog {
        &self.turn_log
    }

    pub fn last_turn_log(&self) -> &[String] {
        &self.last_turn_log
    }

    pub fn phase(&self) -> Phase {
        match self.winner {
            Some(w) => Phase::Resolved(w),
            None if !self.player(self.current_player).base_placed => {
                Phase::AwaitingBasePlacement(self.current_player)
            }
            None => Phase::AwaitingAction(self.current_player),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from(self)
    }

    // ---------- highlight queries ----------

    /// Empty cells where `player` may deploy a unit right now.
    pub fn deployment_zone(&self, player: PlayerId) -> Vec<Pos> {
        let mut zone: Vec<Pos> = self
            .board
            .base_cells(player)
            .into_iter()
            .flat_map(ring)
            .filter(|&p| self.board.is_empty(p))
            .collect();
        zone.sort();
        zone.dedup();
        zone
    }

    /// Empty cells the piece at `from` could step to. Bases never move.
    pub fn move_targets(&self, from: Pos) -> Vec<Pos> {
        match self.board.get(from) {
            Some(pc) if !pc.kind.is_base() => orthogonal_neighbours(from)
                .into_iter()
                .filter(|&p| self.board.is_empty(p))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Enemy-occupied cells within the range of the piece at `from`.
    pub fn attack_targets(&self, from: Pos) -> Vec<Pos> {
        let Some(attacker) = self.board.get(from) else {
            return Vec::new();
        };
        cells_within_range(from, attacker.kind.spec().range)
            .into_iter()
            .filter(|&p| {
                self.board
                    .get(p)
                    .is_some_and(|target| target.owner != attacker.owner)
            })
            .collect()
    }

    /// Who the special of the piece at `unit` would hit (or heal) right now.
    ///
    /// Damage specials take the first enemy in row-major order regardless of
    /// range. Heals go to the most wounded allied non-base piece; ties keep
    /// the row-major first.
    pub fn special_target(&self, unit: Pos) -> Option<Pos> {
        let piece = self.board.get(unit)?;
        let special = piece.kind.spec().special?;
        match special.effect {
            SpecialEffect::Damage => self
                .board
                .pieces()
                .find(|(_, pc)| pc.owner != piece.owner)
                .map(|(p, _)| p),
            SpecialEffect::Heal => self
                .board
                .pieces_of(piece.owner)
                .filter(|(_, pc)| !pc.kind.is_base() && pc.health < pc.kind.spec().max_health)
                .min_by_key(|(_, pc)| pc.health)
                .map(|(p, _)| p),
        }
    }

    // ---------- entry points ----------

    /// Routes an intent to its entry point.
    pub fn apply(&mut self, player: PlayerId, intent: &Intent) -> RuleResult {
        match *intent {
            Intent::PlaceBase { pos } => self.place_base(player, pos),
            Intent::PlaceUnit { pos, kind } => self.place_unit(player, pos, kind),
            Intent::Move { from, to } => self.move_unit(player, from, to),
            Intent::Attack { attacker, target } => self.attack(player, attacker, target),
            Intent::UseSpecial { unit } => self.use_special(player, unit),
            Intent::Undo => self.undo(player),
            Intent::EndTurn => self.end_turn(player),
        }
    }

    pub fn place_base(&mut self, player: PlayerId, pos: Pos) -> RuleResult {
        self.ensure_turn(player)?;
        ensure_in_bounds(pos)?;
        if self.player(player).base_placed {
            return Err(RuleError::BaseAlreadyPlaced);
        }
        if !self.board.is_empty(pos) {
            return Err(RuleError::IllegalPlacement { pos });
        }
        let cost = UnitKind::Base.spec().energy_cost;
        self.ensure_energy(player, cost)?;

        self.board.set(pos, Some(Piece::new(UnitKind::Base, player)));
        let ps = &mut self.players[player.index()];
        ps.energy -= cost;
        ps.base_placed = true;
        ps.base_position = Some(pos);
        self.undo = None;
        self.turn_log.push(format!("{player} placed Base at {pos}"));
        Ok(self.snapshot())
    }

    pub fn place_unit(&mut self, player: PlayerId, pos: Pos, kind: UnitKind) -> RuleResult {
        self.ensure_turn(player)?;
        ensure_in_bounds(pos)?;
        if kind.is_base() {
            return Err(RuleError::BaseIsNotAUnit);
        }
        if !self.player(player).base_placed {
            return Err(RuleError::BaseNotYetPlaced);
        }
        if !self.board.is_empty(pos) {
            return Err(RuleError::CellOccupied { pos });
        }
        let in_zone = self
            .board
            .base_cells(player)
            .into_iter()
            .any(|b| chebyshev_distance(b, pos) == 1);
        if !in_zone {
            return Err(RuleError::OutOfDeploymentZone { pos });
        }
        let cost = kind.spec().energy_cost;
        self.ensure_energy(player, cost)?;

        self.board.set(pos, Some(Piece::new(kind, player)));
        self.players[player.index()].energy -= cost;
        self.undo = Some(UndoRecord::PlaceUnit { pos, kind });
        self.turn_log.push(format!("{player} deployed {kind} at {pos}"));
        Ok(self.snapshot())
    }

    pub fn move_unit(&mut self, player: PlayerId, from: Pos, to: Pos) -> RuleResult {
        self.ensure_turn(player)?;
        ensure_in_bounds(from)?;
        ensure_in_bounds(to)?;
        let piece = match self.board.get(from) {
            Some(pc) if pc.owner == player && !pc.kind.is_base() => *pc,
            _ => return Err(RuleError::NotYourPiece { pos: from }),
        };
        if !orthogonal_adjacent(from, to) || !self.board.is_empty(to) {
            return Err(RuleError::InvalidDestination { pos: to });
        }
        self.ensure_energy(player, MOVE_COST)?;

        self.board.set(from, None);
        self.board.set(to, Some(piece));
        self.players[player.index()].energy -= MOVE_COST;
        self.undo = Some(UndoRecord::Move { from, to, piece });
        self.turn_log
            .push(format!("{player} moved {} {from} -> {to}", piece.kind));
        Ok(self.snapshot())
    }

    pub fn attack(&mut self, player: PlayerId, attacker: Pos, target: Pos) -> RuleResult {
        self.ensure_turn(player)?;
        ensure_in_bounds(attacker)?;
        ensure_in_bounds(target)?;
        let striker = match self.board.get(attacker) {
            Some(pc) if pc.owner == player => *pc,
            _ => return Err(RuleError::NotYourPiece { pos: attacker }),
        };
        let before = match self.board.get(target) {
            None => return Err(RuleError::NoEligibleTarget),
            Some(pc) if pc.owner == player => return Err(RuleError::TargetIsAlly { pos: target }),
            Some(pc) => *pc,
        };
        if manhattan_distance(attacker, target) > striker.kind.spec().range {
            return Err(RuleError::OutOfRange { pos: target });
        }
        self.ensure_energy(player, ATTACK_COST)?;

        self.players[player.index()].energy -= ATTACK_COST;
        let damage = striker.kind.damage();
        let remaining = self.wound(player, target, damage);
        self.turn_log.push(format!(
            "{player} {} {attacker} hit {} {target} for {damage} ({})",
            striker.kind,
            before.kind,
            describe_remaining(remaining),
        ));
        self.undo = if self.winner.is_some() {
            None
        } else {
            Some(UndoRecord::Attack { target, before })
        };
        Ok(self.snapshot())
    }

    pub fn use_special(&mut self, player: PlayerId, unit: Pos) -> RuleResult {
        self.ensure_turn(player)?;
        ensure_in_bounds(unit)?;
        let piece = match self.board.get(unit) {
            Some(pc) if pc.owner == player => *pc,
            _ => return Err(RuleError::NotYourPiece { pos: unit }),
        };
        let Some(special) = piece.kind.spec().special else {
            return Err(RuleError::NoSpecialAbility { pos: unit });
        };
        if piece.special_used {
            return Err(RuleError::SpecialAlreadyUsed);
        }
        let target = self
            .special_target(unit)
            .ok_or(RuleError::NoEligibleTarget)?;
        self.ensure_energy(player, SPECIAL_COST)?;

        self.players[player.index()].energy -= SPECIAL_COST;
        if let Some(pc) = self.board.get_mut(unit) {
            pc.special_used = true;
        }
        let target_kind = self.board.get(target).map(|pc| pc.kind);
        let outcome = match special.effect {
            SpecialEffect::Damage => {
                let remaining = self.wound(player, target, special.power);
                format!("for {} ({})", special.power, describe_remaining(remaining))
            }
            SpecialEffect::Heal => {
                let healed = self.mend(target, special.power);
                format!("healing {healed}")
            }
        };
        if let Some(kind) = target_kind {
            self.turn_log.push(format!(
                "{player} {} {unit} used {} on {kind} {target} {outcome}",
                piece.kind, special.name,
            ));
        }
        self.undo = None;
        Ok(self.snapshot())
    }

    pub fn undo(&mut self, player: PlayerId) -> RuleResult {
        self.ensure_turn(player)?;
        if !self.player(player).undo_available {
            return Err(RuleError::NothingToUndo);
        }
        let record = self.undo.take().ok_or(RuleError::NothingToUndo)?;

        match &record {
            UndoRecord::PlaceUnit { pos, .. } => {
                self.board.remove(*pos);
            }
            UndoRecord::Move { from, to, piece } => {
                self.board.remove(*to);
                self.board.set(*from, Some(*piece));
            }
            UndoRecord::Attack { target, before } => {
                self.board.set(*target, Some(*before));
            }
        }
        let ps = &mut self.players[player.index()];
        ps.energy += record.refund();
        ps.undo_available = false;
        self.turn_log.retract();
        Ok(self.snapshot())
    }

    pub fn end_turn(&mut self, player: PlayerId) -> RuleResult {
        self.ensure_turn(player)?;
        let actions = self.turn_log.len();
        self.turn_log.push(format!(
            "{player} ended turn {} after {actions} action(s)",
            self.turn
        ));
        self.last_turn_log = self.turn_log.take();

        let next = player.opponent();
        self.current_player = next;
        self.turn += 1;
        let ps = &mut self.players[next.index()];
        ps.energy = TURN_ENERGY;
        ps.undo_available = true;
        self.undo = None;
        Ok(self.snapshot())
    }

    // ---------- helpers ----------

    fn ensure_turn(&self, player: PlayerId) -> Result<(), RuleError> {
        if self.winner.is_some() {
            return Err(RuleError::GameOver);
        }
        if player != self.current_player {
            return Err(RuleError::NotYourTurn);
        }
        Ok(())
    }

    fn ensure_energy(&self, player: PlayerId, cost: u32) -> Result<(), RuleError> {
        let available = self.player(player).energy;
        if cost > available {
            return Err(RuleError::InsufficientEnergy {
                needed: cost,
                available,
            });
        }
        Ok(())
    }

    /// Applies `damage` to the piece at `target` on behalf of `by`. A base
    /// at ≤0 ends the game and stays on the board; anything else at ≤0 is
    /// removed. Returns the target's health after the hit.
    fn wound(&mut self, by: PlayerId, target: Pos, damage: i32) -> i32 {
        let Some(pc) = self.board.get_mut(target) else {
            return 0;
        };
        pc.health -= damage;
        let (remaining, alive, is_base) = (pc.health, pc.is_alive(), pc.kind.is_base());
        if !alive {
            if is_base {
                self.winner = Some(by);
            } else {
                self.board.remove(target);
            }
        }
        remaining
    }

    /// Heals the piece at `target` up to its kind's max. Returns the amount restored.
    fn mend(&mut self, target: Pos, power: i32) -> i32 {
        let Some(pc) = self.board.get_mut(target) else {
            return 0;
        };
        let healed = (pc.health + power).min(pc.kind.spec().max_health);
        let gained = healed - pc.health;
        pc.health = healed;
        gained
    }
}

fn ensure_in_bounds(pos: Pos) -> Result<(), RuleError> {
    if is_in_bounds(pos) {
        Ok(())
    } else {
        Err(RuleError::OutOfBounds { pos })
    }
}

fn describe_remaining(remaining: i32) -> String {
    if remaining > 0 {
        format!("{remaining} left")
    } else {
        "destroyed".to_string()
    }
}
