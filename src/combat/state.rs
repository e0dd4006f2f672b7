//! Per-encounter mutable state. Built fresh from immutable templates at the start of
//! every encounter and dropped when it resolves; templates are never mutated.
//!
//! Hit points are only reachable through clamping mutators, so `0 <= hp <= max`
//! holds after every change.

use serde::Serialize;

use crate::combat::dice::AttackOutcome;
use crate::data::monsters::MonsterTemplate;
use crate::data::party::{AllyTemplate, Role, RoleKit, SlotTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Ally(Role),
    Monster,
}

impl Actor {
    pub fn is_ally(self) -> bool {
        matches!(self, Self::Ally(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarriorResources {
    pub technique_dice: u32,
    pub action_surges: u32,
    pub second_wind_ready: bool,
    /// Granted by a technique hit; consumed by the next swing.
    pub advantage_next: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardResources {
    pub slots: SlotTable,
    pub shield_ready: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllyResources {
    Warrior(WarriorResources),
    Healer { slots: SlotTable },
    Rogue { uncanny_dodge_ready: bool },
    Wizard(WizardResources),
}

impl AllyResources {
    pub fn fresh(kit: &RoleKit) -> Self {
        match kit {
            RoleKit::Warrior(kit) => Self::Warrior(WarriorResources {
                technique_dice: kit.technique_dice,
                action_surges: kit.action_surges,
                second_wind_ready: kit.second_wind.is_some(),
                advantage_next: false,
            }),
            RoleKit::Healer(kit) => Self::Healer { slots: kit.slots },
            RoleKit::Rogue(_) => Self::Rogue {
                uncanny_dodge_ready: true,
            },
            RoleKit::Wizard(kit) => Self::Wizard(WizardResources {
                slots: kit.slots,
                shield_ready: true,
            }),
        }
    }

    /// Once-per-round reactions come back at every round boundary.
    pub fn reset_round(&mut self) {
        match self {
            Self::Rogue {
                uncanny_dodge_ready,
            } => *uncanny_dodge_ready = true,
            Self::Wizard(wizard) => wizard.shield_ready = true,
            Self::Warrior(_) | Self::Healer { .. } => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct AllyState<'a> {
    pub template: &'a AllyTemplate,
    hp: i32,
    pub resources: AllyResources,
}

impl<'a> AllyState<'a> {
    pub fn new(template: &'a AllyTemplate) -> Self {
        Self {
            template,
            hp: template.stats.max_hp,
            resources: AllyResources::fresh(&template.kit),
        }
    }

    pub fn role(&self) -> Role {
        self.template.role()
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.template.stats.max_hp
    }

    pub fn armor_class(&self) -> i32 {
        self.template.stats.armor_class
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn is_injured(&self) -> bool {
        self.hp < self.max_hp()
    }

    pub fn hp_fraction(&self) -> f64 {
        f64::from(self.hp) / f64::from(self.max_hp().max(1))
    }

    /// Returns the damage actually removed.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp - amount.max(0)).clamp(0, self.max_hp());
        before - self.hp
    }

    /// Returns the hit points actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).clamp(0, self.max_hp());
        self.hp - before
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreathState {
    pub ready: bool,
    pub charges: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummonState {
    pub triggered: bool,
    pub rounds_left: u32,
}

#[derive(Debug, Clone)]
pub struct MonsterState<'a> {
    pub template: &'a MonsterTemplate,
    hp: i32,
    pub breath: Option<BreathState>,
    pub counter_ready: bool,
    pub summon: Option<SummonState>,
}

impl<'a> MonsterState<'a> {
    pub fn new(template: &'a MonsterTemplate) -> Self {
        Self {
            template,
            hp: template.stats.max_hp,
            breath: template.breath.as_ref().map(|breath| BreathState {
                ready: true,
                charges: breath.charges,
            }),
            counter_ready: template.counter_on_miss,
            summon: template.wolf_summon.map(|_| SummonState {
                triggered: false,
                rounds_left: 0,
            }),
        }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.template.stats.max_hp
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp - amount.max(0)).clamp(0, self.max_hp());
        before - self.hp
    }

    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).clamp(0, self.max_hp());
        self.hp - before
    }

    fn reset_round(&mut self) {
        self.counter_ready = self.template.counter_on_miss;
    }
}

/// Runs of consecutive critical hits by one attacker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakTracker {
    current: u32,
    closed: Vec<u32>,
}

impl StreakTracker {
    /// A critical extends the open run; anything else closes it.
    pub fn record(&mut self, outcome: AttackOutcome) {
        if outcome.is_critical() {
            self.current += 1;
        } else {
            self.close();
        }
    }

    /// Closes a run still open when the encounter ends.
    pub fn close(&mut self) {
        if self.current > 0 {
            self.closed.push(self.current);
            self.current = 0;
        }
    }

    pub fn closed(&self) -> &[u32] {
        &self.closed
    }

    pub fn max(&self) -> u32 {
        self.closed.iter().copied().max().unwrap_or(0).max(self.current)
    }

    pub fn into_closed(mut self) -> Vec<u32> {
        self.close();
        self.closed
    }
}

/// Latching encounter-level flags read by the aggregator.
#[derive(Debug, Clone, Default)]
pub struct Observables {
    pub allies_first: bool,
    pub warrior_first_attack: Option<AttackOutcome>,
    pub monster_first_attack_crit: Option<bool>,
    pub streaks: StreakTracker,
}

impl Observables {
    pub fn record_warrior_attack(&mut self, outcome: AttackOutcome) {
        self.warrior_first_attack.get_or_insert(outcome);
        self.streaks.record(outcome);
    }

    pub fn record_monster_attack(&mut self, critical: bool) {
        self.monster_first_attack_crit.get_or_insert(critical);
    }
}

#[derive(Debug, Clone)]
pub struct EncounterState<'a> {
    allies: Vec<AllyState<'a>>,
    pub monster: MonsterState<'a>,
    order: Vec<Actor>,
    round: u32,
    acted_this_round: Vec<Role>,
    pub observed: Observables,
}

impl<'a> EncounterState<'a> {
    pub fn new(party: &'a [AllyTemplate], monster: &'a MonsterTemplate, order: Vec<Actor>) -> Self {
        let allies_first = order.first().is_some_and(|actor| actor.is_ally());
        Self {
            allies: party.iter().map(AllyState::new).collect(),
            monster: MonsterState::new(monster),
            order,
            round: 0,
            acted_this_round: Vec::with_capacity(party.len()),
            observed: Observables {
                allies_first,
                ..Observables::default()
            },
        }
    }

    pub fn order(&self) -> &[Actor] {
        &self.order
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn allies(&self) -> &[AllyState<'a>] {
        &self.allies
    }

    pub fn ally(&self, index: usize) -> &AllyState<'a> {
        &self.allies[index]
    }

    pub fn ally_mut(&mut self, index: usize) -> &mut AllyState<'a> {
        &mut self.allies[index]
    }

    pub fn ally_index(&self, role: Role) -> Option<usize> {
        self.allies.iter().position(|ally| ally.role() == role)
    }

    pub fn living_ally_count(&self) -> usize {
        self.allies.iter().filter(|ally| ally.is_alive()).count()
    }

    pub fn allies_defeated(&self) -> bool {
        self.allies.iter().all(|ally| !ally.is_alive())
    }

    pub fn is_resolved(&self) -> bool {
        !self.monster.is_alive() || self.allies_defeated()
    }

    pub fn allies_won(&self) -> bool {
        !self.monster.is_alive() && !self.allies_defeated()
    }

    /// Round boundary: once-per-round resources come back.
    pub fn begin_round(&mut self) {
        self.round += 1;
        self.acted_this_round.clear();
        for ally in &mut self.allies {
            ally.resources.reset_round();
        }
        self.monster.reset_round();
    }

    pub fn mark_acted(&mut self, role: Role) {
        if !self.acted_this_round.contains(&role) {
            self.acted_this_round.push(role);
        }
    }

    /// Whether any ally other than `role` has taken a turn this round.
    pub fn other_ally_acted(&self, role: Role) -> bool {
        self.acted_this_round.iter().any(|&acted| acted != role)
    }

    /// Living ally with the fewest hit points; ties go to the squishier role.
    pub fn weakest_living_ally(&self) -> Option<usize> {
        self.allies
            .iter()
            .enumerate()
            .filter(|(_, ally)| ally.is_alive())
            .min_by_key(|(_, ally)| (ally.hp(), ally.role().target_priority()))
            .map(|(index, _)| index)
    }

    pub fn damage_ally(&mut self, index: usize, amount: i32) -> i32 {
        self.allies[index].take_damage(amount)
    }

    pub fn heal_ally(&mut self, index: usize, amount: i32) -> i32 {
        self.allies[index].heal(amount)
    }

    pub fn damage_monster(&mut self, amount: i32) -> i32 {
        self.monster.take_damage(amount)
    }
}
