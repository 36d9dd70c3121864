//! Static unit archetypes and the energy price list.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Energy every player starts a turn with.
pub const TURN_ENERGY: u32 = 5;

/// Price of a single orthogonal step.
pub const MOVE_COST: u32 = 1;

/// Price of a regular attack.
pub const ATTACK_COST: u32 = 2;

/// Price of any special ability, independent of the unit's own cost.
pub const SPECIAL_COST: u32 = 2;

/// Highest `max_health` in the catalog (the Tank's). Health bars are drawn
/// against this so widths compare across kinds.
pub const GLOBAL_MAX_HEALTH: i32 = 12;

/// The base plus the four deployable archetypes.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Base,
    Warrior,
    Archer,
    Tank,
    Healer,
}

/// Whether a special hurts the first enemy found or patches up an ally.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SpecialEffect {
    Damage,
    Heal,
}

/// One-shot ability descriptor.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct Special {
    pub name: &'static str,
    pub power: i32,
    pub effect: SpecialEffect,
}

/// Immutable catalog row.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct UnitSpec {
    pub icon: &'static str,
    pub move_distance: u32,
    pub attack_power: i32,
    pub max_health: i32,
    pub range: u32,
    pub energy_cost: u32,
    pub special: Option<Special>,
}

impl UnitKind {
    /// Every kind, base first.
    pub const ALL: [UnitKind; 5] = [
        UnitKind::Base,
        UnitKind::Warrior,
        UnitKind::Archer,
        UnitKind::Tank,
        UnitKind::Healer,
    ];

    pub fn spec(self) -> UnitSpec {
        match self {
            UnitKind::Base => UnitSpec {
                icon: "🏰",
                move_distance: 0,
                attack_power: 1,
                max_health: 8,
                range: 1,
                energy_cost: 3,
                special: None,
            },
            UnitKind::Warrior => UnitSpec {
                icon: "🗡️",
                move_distance: 1,
                attack_power: 1,
                max_health: 4,
                range: 1,
                energy_cost: 3,
                special: Some(Special {
                    name: "Cleave",
                    power: 2,
                    effect: SpecialEffect::Damage,
                }),
            },
            UnitKind::Archer => UnitSpec {
                icon: "🏹",
                move_distance: 1,
                attack_power: 1,
                max_health: 3,
                range: 2,
                energy_cost: 3,
                special: Some(Special {
                    name: "Volley",
                    power: 2,
                    effect: SpecialEffect::Damage,
                }),
            },
            UnitKind::Tank => UnitSpec {
                icon: "🛡️",
                move_distance: 1,
                attack_power: 1,
                max_health: 12,
                range: 1,
                energy_cost: 4,
                special: Some(Special {
                    name: "Shield Bash",
                    power: 3,
                    effect: SpecialEffect::Damage,
                }),
            },
            UnitKind::Healer => UnitSpec {
                icon: "🩹",
                move_distance: 1,
                attack_power: 0,
                max_health: 3,
                range: 1,
                energy_cost: 3,
                special: Some(Special {
                    name: "Mend",
                    power: 2,
                    effect: SpecialEffect::Heal,
                }),
            },
        }
    }

    /// Damage dealt by a regular attack. A zero attack power still hits for 1.
    pub fn damage(self) -> i32 {
        match self.spec().attack_power {
            p if p > 0 => p,
            _ => 1,
        }
    }

    pub fn is_base(self) -> bool {
        matches!(self, UnitKind::Base)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitKind::Base => "Base",
            UnitKind::Warrior => "Warrior",
            UnitKind::Archer => "Archer",
            UnitKind::Tank => "Tank",
            UnitKind::Healer => "Healer",
        };
        f.write_str(name)
    }
}

/// Width of a health bar as a fraction of [`GLOBAL_MAX_HEALTH`], clamped to `[0, 1]`.
pub fn health_fraction(health: i32) -> f32 {
    (health.max(0) as f32 / GLOBAL_MAX_HEALTH as f32).min(1.0)
}
