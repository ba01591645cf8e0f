//! # Agent
//!
//! A single colony member. Workers and the queen share this type; everything
//! that differs between them lives in the [`RoleConfig`] profile the agent was
//! spawned with, plus the queen-only nest preemption in [`Agent::decide`].
//!
//! ## Terrain interaction
//!
//! Agents stand in an air voxel directly above a solid one. They change the
//! terrain in three ways, all through [`World::set_block_at`]:
//!
//! - **Dig** replaces the block below with air and drops one voxel.
//! - **Climb** places the role's climb block in the current voxel and rises one.
//! - **Nest** (queen only) places a nest block in the current voxel and rises one.
//!
//! A write the world rejects leaves the agent where it is and reports
//! [`StepOutcome::Blocked`].

use cgmath::{Point3, Vector3};
use serde::Serialize;

use crate::{
    config::RoleConfig,
    engine_state::voxels::{block::block_type::BlockType, world::World},
};

use super::colony::ColonySnapshot;

/// Index of an agent in the colony arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AgentId(pub usize);

/// The two kinds of colony member.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Role {
    /// Forages, feeds the queen and climbs with mulch.
    Worker,
    /// Lays nests and climbs with stone.
    Queen,
}

/// Horizontal axis of a single step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Axis {
    /// World X.
    X,
    /// World Z.
    Z,
}

impl Axis {
    /// Unit offset along this axis, `sign` being `1` or `-1`.
    pub fn offset(self, sign: i32) -> Vector3<i32> {
        match self {
            Axis::X => Vector3::new(sign, 0, 0),
            Axis::Z => Vector3::new(0, 0, sign),
        }
    }

    fn random(rng: &mut fastrand::Rng) -> Self {
        if rng.bool() {
            Axis::X
        } else {
            Axis::Z
        }
    }
}

/// What an agent chose to do with its turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AgentAction {
    /// Queen only: lay a nest block and rise on top of it.
    ProduceNest,
    /// Cooldown or no target: one step in a random direction.
    Wander {
        /// Axis of the step.
        axis: Axis,
        /// Direction along the axis, `1` or `-1`.
        sign: i32,
    },
    /// Exchange health with a member standing in the same voxel.
    Share {
        /// The colocated member.
        partner: AgentId,
    },
    /// Dig the mulch block underfoot.
    Forage,
    /// One greedy step toward another member's position.
    Advance {
        /// Position of the targeted member.
        target: Point3<i32>,
    },
}

/// How the terrain responded to a movement or dig.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum StepOutcome {
    /// Moved one column, possibly one voxel up or down.
    Moved,
    /// Placed the climb block and rose one voxel.
    Climbed,
    /// Removed the block below and dropped one voxel.
    Dug,
    /// Nothing changed.
    Blocked,
}

/// Record of one agent's turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TurnSummary {
    /// The agent that acted.
    pub agent: AgentId,
    /// The branch of the decision engine that was taken.
    pub action: AgentAction,
    /// Terrain result, if the action touched the terrain.
    pub step: Option<StepOutcome>,
    /// Health that changed hands during a share.
    pub health_shared: i32,
    /// Whether the end-of-turn damage killed the agent.
    pub died: bool,
}

/// A colony member.
#[derive(Clone, Debug)]
pub struct Agent {
    id: AgentId,
    role: Role,
    profile: RoleConfig,
    /// The air voxel the agent occupies.
    pub position: Point3<i32>,
    health: i32,
    alive: bool,
    /// Turns of forced wandering left after a donation.
    pub cooldown_turns: u32,
    /// Total health donated to other members.
    pub given_health: i32,
    /// Total health received from other members.
    pub received_health: i32,
    /// Total health gained from digging mulch.
    pub mulch_recovered: i32,
    /// Nest blocks placed.
    pub nests_produced: u32,
}

impl Agent {
    /// Creates a live agent.
    ///
    /// # Arguments
    ///
    /// * `id` - Arena index assigned by the colony
    /// * `role` - Worker or queen
    /// * `profile` - Role constants
    /// * `position` - The voxel the agent stands in
    /// * `health` - Starting health, clamped to `[0, max_health]`
    pub fn new(
        id: AgentId,
        role: Role,
        profile: RoleConfig,
        position: Point3<i32>,
        health: i32,
    ) -> Self {
        let health = health.clamp(0, profile.max_health);
        Agent {
            id,
            role,
            profile,
            position,
            health,
            alive: health > 0,
            cooldown_turns: 0,
            given_health: 0,
            received_health: 0,
            mulch_recovered: 0,
            nests_produced: 0,
        }
    }

    /// Arena index.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Worker or queen.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Role constants the agent was spawned with.
    pub fn profile(&self) -> &RoleConfig {
        &self.profile
    }

    /// Current health.
    pub fn health(&self) -> i32 {
        self.health
    }

    /// The role's health ceiling.
    pub fn max_health(&self) -> i32 {
        self.profile.max_health
    }

    /// Health as a fraction of the role's maximum.
    pub fn health_ratio(&self) -> f64 {
        self.health as f64 / self.profile.max_health as f64
    }

    /// Whether the agent is still alive.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Sets health, clamped to `[0, max_health]`. Reaching zero kills the agent
    /// for good; a dead agent is never revived.
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.profile.max_health);
        if self.health == 0 {
            self.alive = false;
        }
    }

    /// The voxel directly beneath the agent.
    pub fn below_position(&self) -> Point3<i32> {
        self.position - Vector3::unit_y()
    }

    /// The block directly beneath the agent.
    pub fn below_type(&self, world: &World) -> BlockType {
        world.get_block_at(self.below_position())
    }

    /// Restores the standing invariant after other agents changed the terrain.
    ///
    /// An agent buried by a colocated climber rises out of the block; an agent
    /// whose support was dug away falls until it lands on something solid or
    /// reaches the floor.
    pub fn settle(&mut self, world: &World) {
        while self.position.y < world.height() && world.get_block_at(self.position).is_solid() {
            self.position.y += 1;
        }
        while self.position.y > 0 && !self.below_type(world).is_solid() {
            self.position.y -= 1;
        }
    }

    /// Chooses this turn's action.
    ///
    /// # Arguments
    ///
    /// * `below` - The block underfoot, read at the start of the turn
    /// * `snapshot` - Positions and health of every live member
    /// * `turn` - The current turn number
    /// * `rng` - Shared simulation RNG
    pub fn decide(
        &self,
        below: BlockType,
        snapshot: &ColonySnapshot,
        turn: u64,
        rng: &mut fastrand::Rng,
    ) -> AgentAction {
        if self.role == Role::Queen {
            if let Some(interval) = self.profile.nest_interval {
                if interval > 0 && turn % interval == 0 {
                    return AgentAction::ProduceNest;
                }
            }
        }

        if self.cooldown_turns > 0 {
            return Self::wander(rng);
        }

        if let Some(partner) = snapshot.colocated_with(self.id, self.position) {
            return AgentAction::Share { partner };
        }

        let hungry = self.health < self.profile.max_health - self.profile.mulch_health_recovery;
        if below == BlockType::Mulch && hungry && rng.f64() < self.profile.dig_probability {
            return AgentAction::Forage;
        }

        match snapshot.target_for(self.id) {
            Some(target) => AgentAction::Advance {
                target: target.position,
            },
            None => Self::wander(rng),
        }
    }

    fn wander(rng: &mut fastrand::Rng) -> AgentAction {
        let axis = Axis::random(rng);
        let sign = if rng.bool() { 1 } else { -1 };
        AgentAction::Wander { axis, sign }
    }

    /// One greedy Manhattan step toward `target`.
    ///
    /// Returns `None` when the agent already shares the target's column.
    pub fn advance_toward(
        &mut self,
        target: Point3<i32>,
        world: &mut World,
        rng: &mut fastrand::Rng,
    ) -> Option<StepOutcome> {
        let dx = target.x - self.position.x;
        let dz = target.z - self.position.z;

        let (axis, sign) = match (dx, dz) {
            (0, 0) => return None,
            (0, _) => (Axis::Z, dz.signum()),
            (_, 0) => (Axis::X, dx.signum()),
            _ => match Axis::random(rng) {
                Axis::X => (Axis::X, dx.signum()),
                Axis::Z => (Axis::Z, dz.signum()),
            },
        };

        Some(self.step_along(axis, sign, world))
    }

    /// Moves one column along `axis`, following the terrain.
    ///
    /// The surface height difference between the destination and current
    /// column decides the move: within one voxel the agent walks up, level or
    /// down; two or more above it climbs in place; two or more below it digs in
    /// place.
    pub fn step_along(&mut self, axis: Axis, sign: i32, world: &mut World) -> StepOutcome {
        let destination = self.position + axis.offset(sign);
        let current = world.surface_height(self.position.x, self.position.z);
        let target = world.surface_height(destination.x, destination.z);

        let (Some(current), Some(target)) = (current, target) else {
            return StepOutcome::Blocked;
        };

        match target - current {
            difference @ -1..=1 => {
                self.position = destination + Vector3::new(0, difference, 0);
                // Overhangs can leave the new voxel solid or unsupported.
                self.settle(world);
                StepOutcome::Moved
            }
            difference if difference >= 2 => self.climb(world),
            _ => self.dig(world),
        }
    }

    /// Removes the block below and drops into its place.
    ///
    /// Containers cannot be dug. Digging mulch restores health up to the
    /// maximum; only the health actually gained is recorded.
    pub fn dig(&mut self, world: &mut World) -> StepOutcome {
        let below = self.below_position();
        let below_type = world.get_block_at(below);

        if !below_type.is_solid() || !below_type.is_diggable() {
            return StepOutcome::Blocked;
        }
        if world.set_block_at(below, BlockType::Air).is_err() {
            return StepOutcome::Blocked;
        }

        self.position = below;
        if below_type == BlockType::Mulch {
            let gained = self
                .profile
                .mulch_health_recovery
                .min(self.profile.max_health - self.health)
                .max(0);
            self.health += gained;
            self.mulch_recovered += gained;
        }
        StepOutcome::Dug
    }

    /// Places the climb block in the current voxel and rises onto it.
    pub fn climb(&mut self, world: &mut World) -> StepOutcome {
        if world
            .set_block_at(self.position, self.profile.climb_block)
            .is_err()
        {
            return StepOutcome::Blocked;
        }
        self.position.y += 1;
        StepOutcome::Climbed
    }

    /// Places a nest block in the current voxel, rises onto it and pays a third
    /// of the current health (rounded). Nothing happens if the world rejects
    /// the block.
    pub fn produce_nest(&mut self, world: &mut World) -> StepOutcome {
        if world.set_block_at(self.position, BlockType::Nest).is_err() {
            return StepOutcome::Blocked;
        }
        self.position.y += 1;

        let cost = (self.health as f64 / 3.0).round() as i32;
        self.set_health(self.health - cost);
        self.nests_produced += 1;
        log::debug!(
            "{:?} {:?} laid nest #{} at {:?}, health now {}",
            self.role,
            self.id,
            self.nests_produced,
            self.position,
            self.health
        );
        StepOutcome::Climbed
    }

    /// Applies end-of-turn damage and ticks the cooldown.
    ///
    /// Damage doubles when the agent started the turn standing on acid.
    /// Returns `true` if this killed the agent.
    pub fn end_turn(&mut self, below: BlockType) -> bool {
        let damage = if below == BlockType::Acid {
            self.profile.turn_damage.saturating_mul(2)
        } else {
            self.profile.turn_damage
        };

        let was_alive = self.alive;
        self.set_health(self.health.saturating_sub(damage));
        self.cooldown_turns = self.cooldown_turns.saturating_sub(1);
        was_alive && !self.alive
    }
}

/// Moves health from the healthier of two members to the other.
///
/// The transfer is `draw`, capped by the recipient's headroom and by what the
/// donor can give without dying. Equal health means no transfer. The donor's
/// cooldown starts only if health actually changed hands.
///
/// Returns the amount transferred.
pub fn share_health(first: &mut Agent, second: &mut Agent, draw: i32) -> i32 {
    let (donor, recipient) = match first.health.cmp(&second.health) {
        std::cmp::Ordering::Greater => (first, second),
        std::cmp::Ordering::Less => (second, first),
        std::cmp::Ordering::Equal => return 0,
    };

    let amount = draw
        .min(recipient.max_health() - recipient.health)
        .min(donor.health - 1)
        .max(0);
    if amount == 0 {
        return 0;
    }

    donor.health -= amount;
    recipient.health += amount;
    donor.given_health += amount;
    recipient.received_health += amount;
    donor.cooldown_turns = donor.profile.cooldown_duration;
    amount
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;

    /// 16x16x16 world: container floor, stone up to `y = 3`, surface at 4.
    fn flat_world() -> World {
        let mut world = World::with_chunks(Vector3::new(2, 2, 2), 8);
        for x in 0..world.size_x() {
            for z in 0..world.size_z() {
                world.set_block_at(Point3::new(x, 0, z), BlockType::Container).unwrap();
                for y in 1..=3 {
                    world.set_block_at(Point3::new(x, y, z), BlockType::Stone).unwrap();
                }
            }
        }
        world
    }

    fn worker_at(position: Point3<i32>, health: i32) -> Agent {
        Agent::new(AgentId(1), Role::Worker, RoleConfig::worker(), position, health)
    }

    #[test]
    fn level_step_moves_one_column() {
        let mut world = flat_world();
        let mut agent = worker_at(Point3::new(5, 4, 5), 100);

        assert_eq!(agent.step_along(Axis::X, 1, &mut world), StepOutcome::Moved);
        assert_eq!(agent.position, Point3::new(6, 4, 5));
    }

    #[test]
    fn one_voxel_ledge_is_walked_up() {
        let mut world = flat_world();
        world.set_block_at(Point3::new(5, 4, 6), BlockType::Grass).unwrap();
        let mut agent = worker_at(Point3::new(5, 4, 5), 100);

        assert_eq!(agent.step_along(Axis::Z, 1, &mut world), StepOutcome::Moved);
        assert_eq!(agent.position, Point3::new(5, 5, 6));
    }

    #[test]
    fn wall_is_climbed_with_the_role_block() {
        let mut world = flat_world();
        world.set_block_at(Point3::new(6, 4, 5), BlockType::Stone).unwrap();
        world.set_block_at(Point3::new(6, 5, 5), BlockType::Stone).unwrap();
        let mut agent = worker_at(Point3::new(5, 4, 5), 100);

        assert_eq!(agent.step_along(Axis::X, 1, &mut world), StepOutcome::Climbed);
        assert_eq!(agent.position, Point3::new(5, 5, 5));
        assert_eq!(world.get_block_at(Point3::new(5, 4, 5)), BlockType::Mulch);
    }

    #[test]
    fn drop_is_dug_in_place() {
        let mut world = flat_world();
        world.set_block_at(Point3::new(5, 4, 5), BlockType::Grass).unwrap();
        world.set_block_at(Point3::new(5, 5, 5), BlockType::Grass).unwrap();
        let mut agent = worker_at(Point3::new(5, 6, 5), 100);

        assert_eq!(agent.step_along(Axis::X, -1, &mut world), StepOutcome::Dug);
        assert_eq!(agent.position, Point3::new(5, 5, 5));
        assert_eq!(world.get_block_at(Point3::new(5, 5, 5)), BlockType::Air);
    }

    #[test]
    fn containers_cannot_be_dug() {
        let mut world = flat_world();
        world.set_block_at(Point3::new(5, 3, 5), BlockType::Container).unwrap();
        let mut agent = worker_at(Point3::new(5, 4, 5), 100);

        assert_eq!(agent.dig(&mut world), StepOutcome::Blocked);
        assert_eq!(agent.position, Point3::new(5, 4, 5));
        assert_eq!(world.get_block_at(Point3::new(5, 3, 5)), BlockType::Container);
    }

    #[test]
    fn mulch_recovery_is_capped_at_max_health() {
        let mut world = flat_world();
        world.set_block_at(Point3::new(5, 4, 5), BlockType::Mulch).unwrap();
        let mut agent = worker_at(Point3::new(5, 5, 5), 340);

        assert_eq!(agent.dig(&mut world), StepOutcome::Dug);
        assert_eq!(agent.health(), 350);
        assert_eq!(agent.mulch_recovered, 10);
    }

    #[test]
    fn stepping_off_the_world_is_blocked() {
        let mut world = flat_world();
        let mut agent = worker_at(Point3::new(0, 4, 0), 100);

        assert_eq!(agent.step_along(Axis::X, -1, &mut world), StepOutcome::Blocked);
        assert_eq!(agent.position, Point3::new(0, 4, 0));
    }

    #[test]
    fn nest_costs_a_third_of_health() {
        let mut world = flat_world();
        let mut queen = Agent::new(
            AgentId(0),
            Role::Queen,
            RoleConfig::queen(),
            Point3::new(5, 4, 5),
            500,
        );

        assert_eq!(queen.produce_nest(&mut world), StepOutcome::Climbed);
        assert_eq!(world.get_block_at(Point3::new(5, 4, 5)), BlockType::Nest);
        assert_eq!(queen.position, Point3::new(5, 5, 5));
        assert_eq!(queen.health(), 333);
        assert_eq!(queen.nests_produced, 1);
    }

    #[test]
    fn acid_doubles_damage_and_death_is_permanent() {
        let mut agent = worker_at(Point3::new(5, 4, 5), 12);

        assert!(!agent.end_turn(BlockType::Acid));
        assert_eq!(agent.health(), 2);
        assert!(agent.end_turn(BlockType::Stone));
        assert_eq!(agent.health(), 0);
        assert!(!agent.is_alive());

        agent.set_health(100);
        assert!(!agent.is_alive());
    }

    #[test]
    fn overwhelming_acid_damage_kills_outright() {
        let profile = RoleConfig {
            turn_damage: i32::MAX,
            ..RoleConfig::worker()
        };
        let mut agent = Agent::new(AgentId(1), Role::Worker, profile, Point3::new(5, 4, 5), 250);

        assert!(agent.end_turn(BlockType::Acid));
        assert_eq!(agent.health(), 0);
    }

    #[test]
    fn settle_drops_onto_support_and_rises_out_of_blocks() {
        let world = flat_world();
        let mut floating = worker_at(Point3::new(5, 9, 5), 100);
        floating.settle(&world);
        assert_eq!(floating.position, Point3::new(5, 4, 5));

        let mut buried = worker_at(Point3::new(5, 2, 5), 100);
        buried.settle(&world);
        assert_eq!(buried.position, Point3::new(5, 4, 5));
    }

    #[test]
    fn share_never_kills_the_donor_or_overfills_the_recipient() {
        let mut recipient = worker_at(Point3::new(5, 4, 5), 340);
        let mut donor = worker_at(Point3::new(5, 4, 5), 350);

        // The healthier one donates, whichever argument it is.
        assert_eq!(share_health(&mut recipient, &mut donor, 100), 10);
        assert_eq!(recipient.health(), 350);
        assert_eq!(donor.health(), 340);
        assert_eq!(donor.cooldown_turns, 20);
        assert_eq!(recipient.cooldown_turns, 0);

        let mut poor = worker_at(Point3::new(5, 4, 5), 5);
        let mut poorer = worker_at(Point3::new(5, 4, 5), 2);
        assert_eq!(share_health(&mut poor, &mut poorer, 100), 4);
        assert_eq!(poor.health(), 1);
        assert_eq!(poorer.health(), 6);
    }

    #[test]
    fn equal_health_shares_nothing() {
        let mut first = worker_at(Point3::new(5, 4, 5), 100);
        let mut second = worker_at(Point3::new(5, 4, 5), 100);

        assert_eq!(share_health(&mut first, &mut second, 70), 0);
        assert_eq!(first.cooldown_turns, 0);
        assert_eq!(second.cooldown_turns, 0);
    }
}
