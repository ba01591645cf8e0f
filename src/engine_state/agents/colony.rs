//! # Colony
//!
//! The colony owns every agent of a generation in an arena indexed by
//! [`AgentId`]. The queen is always slot 0; workers follow in spawn order. Dead
//! workers stay in the arena but are pruned from the live roster at the start
//! of each turn, so membership only ever shrinks.
//!
//! Agents never hold references to each other. At the start of its turn an
//! agent receives a [`ColonySnapshot`] of every live member, and any
//! cross-agent effect (health sharing) is applied by the colony itself.

use cgmath::Point3;
use log::{debug, trace};
use thiserror::Error;

use crate::{
    config::{RoleConfig, SimulationConfig},
    engine_state::voxels::{generation::random_interior_column, world::World},
};

use super::agent::{share_health, Agent, AgentAction, AgentId, Role, TurnSummary};

/// Spawning failed to find free columns for every agent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    /// No free standable interior column was found within the attempt budget.
    #[error("could not place agent {placed} of {requested} after {attempts} attempts")]
    NoFreeColumn {
        /// Agents placed before giving up.
        placed: usize,
        /// Agents requested, queen included.
        requested: usize,
        /// Column draws spent.
        attempts: usize,
    },
}

/// Read-only view of one live member.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MemberView {
    /// The member's arena index.
    pub id: AgentId,
    /// Worker or queen.
    pub role: Role,
    /// The voxel the member stands in.
    pub position: Point3<i32>,
    /// Current health.
    pub health: i32,
    /// Health ceiling of the member's role.
    pub max_health: i32,
    /// Turns left before the member can share health again.
    pub cooldown_turns: u32,
}

impl MemberView {
    /// Health as a fraction of the role's maximum.
    pub fn health_ratio(&self) -> f64 {
        self.health as f64 / self.max_health as f64
    }
}

impl From<&Agent> for MemberView {
    fn from(agent: &Agent) -> Self {
        MemberView {
            id: agent.id(),
            role: agent.role(),
            position: agent.position,
            health: agent.health(),
            max_health: agent.max_health(),
            cooldown_turns: agent.cooldown_turns,
        }
    }
}

/// Every live member at one instant, queen first then workers in roster order.
#[derive(Clone, Debug, Default)]
pub struct ColonySnapshot {
    members: Vec<MemberView>,
}

impl ColonySnapshot {
    /// Builds a snapshot from members already in dispatch order.
    pub fn new(members: Vec<MemberView>) -> Self {
        ColonySnapshot { members }
    }

    /// The live members in dispatch order.
    pub fn members(&self) -> &[MemberView] {
        &self.members
    }

    /// The queen, if she is alive.
    pub fn queen(&self) -> Option<&MemberView> {
        self.members.iter().find(|member| member.role == Role::Queen)
    }

    /// The member with the lowest health ratio, skipping `exclude`.
    ///
    /// Ties go to the first member in dispatch order.
    pub fn lowest_health(&self, exclude: Option<AgentId>) -> Option<&MemberView> {
        let mut lowest: Option<&MemberView> = None;
        for member in self.members.iter().filter(|member| Some(member.id) != exclude) {
            if lowest.map_or(true, |current| member.health_ratio() < current.health_ratio()) {
                lowest = Some(member);
            }
        }
        lowest
    }

    /// The member `id` should walk toward.
    ///
    /// The queen targets the weakest member other than herself. A worker
    /// targets the weakest member unless that is itself or the queen, in which
    /// case it heads for the queen.
    pub fn target_for(&self, id: AgentId) -> Option<&MemberView> {
        let me = self.members.iter().find(|member| member.id == id)?;
        match me.role {
            Role::Queen => self.lowest_health(Some(id)),
            Role::Worker => {
                let lowest = self.lowest_health(None)?;
                if lowest.id == id || lowest.role == Role::Queen {
                    self.queen()
                } else {
                    Some(lowest)
                }
            }
        }
    }

    /// The first other member standing exactly at `position` that is not
    /// cooling down from a donation.
    ///
    /// A member that just donated is skipped, so a colocated pair shares at
    /// most once: the recipient acting later in the same turn cannot hand the
    /// health straight back.
    pub fn colocated_with(&self, id: AgentId, position: Point3<i32>) -> Option<AgentId> {
        self.members
            .iter()
            .find(|member| {
                member.id != id && member.position == position && member.cooldown_turns == 0
            })
            .map(|member| member.id)
    }
}

/// The agents of one generation.
#[derive(Clone, Debug)]
pub struct Colony {
    agents: Vec<Agent>,
    workers: Vec<AgentId>,
}

impl Colony {
    const QUEEN: AgentId = AgentId(0);

    /// Creates a colony holding only its queen.
    pub fn new(queen_profile: RoleConfig, position: Point3<i32>, health: i32) -> Self {
        Colony {
            agents: vec![Agent::new(Self::QUEEN, Role::Queen, queen_profile, position, health)],
            workers: Vec::new(),
        }
    }

    /// Adds a worker to the end of the roster.
    pub fn add_worker(&mut self, profile: RoleConfig, position: Point3<i32>, health: i32) -> AgentId {
        let id = AgentId(self.agents.len());
        self.agents.push(Agent::new(id, Role::Worker, profile, position, health));
        self.workers.push(id);
        id
    }

    /// Spawns the queen and `config.initial_population` workers on distinct
    /// random interior columns, each standing on the surface.
    ///
    /// # Errors
    /// Returns [`SpawnError::NoFreeColumn`] if the attempt budget runs out
    /// before every agent has a column.
    pub fn spawn(
        config: &SimulationConfig,
        world: &World,
        rng: &mut fastrand::Rng,
    ) -> Result<Self, SpawnError> {
        let requested = config.initial_population + 1;
        let interior_columns = ((world.size_x() - 2).max(0) * (world.size_z() - 2).max(0)) as usize;
        let mut placer = ColumnPlacer {
            world,
            taken: Vec::with_capacity(requested),
            attempts: 0,
            budget: 64 * interior_columns.max(1),
            requested,
        };

        let position = placer.place(rng)?;
        let mut colony = Colony::new(config.queen, position, random_health(&config.queen, rng));

        for _ in 0..config.initial_population {
            let position = placer.place(rng)?;
            colony.add_worker(config.worker, position, random_health(&config.worker, rng));
        }

        debug!(
            "Spawned queen and {} workers in {} column draws",
            config.initial_population, placer.attempts
        );
        Ok(colony)
    }

    /// Id of the queen.
    pub fn queen_id(&self) -> AgentId {
        Self::QUEEN
    }

    /// The queen, dead or alive.
    pub fn queen(&self) -> &Agent {
        &self.agents[Self::QUEEN.0]
    }

    /// Any agent ever spawned in this generation.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.0)
    }

    /// Mutable access to any agent of this generation.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.0)
    }

    /// The worker roster in dispatch order. May still hold workers that died
    /// this turn.
    pub fn worker_ids(&self) -> &[AgentId] {
        &self.workers
    }

    /// Live members, queen first then workers in roster order.
    pub fn live_members(&self) -> impl Iterator<Item = &Agent> + '_ {
        std::iter::once(Self::QUEEN)
            .chain(self.workers.iter().copied())
            .filter_map(|id| self.agents.get(id.0))
            .filter(|agent| agent.is_alive())
    }

    /// Number of live members, queen included.
    pub fn size(&self) -> usize {
        self.live_members().count()
    }

    /// Nests laid by the queen this generation.
    pub fn nests_produced(&self) -> u32 {
        self.queen().nests_produced
    }

    /// A view of every live member for targeting and colocation.
    pub fn snapshot(&self) -> ColonySnapshot {
        ColonySnapshot::new(self.live_members().map(MemberView::from).collect())
    }

    /// Drops dead workers from the roster. Returns how many were removed.
    pub fn prune_dead(&mut self) -> usize {
        let agents = &self.agents;
        let before = self.workers.len();
        self.workers.retain(|id| agents[id.0].is_alive());
        before - self.workers.len()
    }

    /// Runs one agent's turn against the live world.
    ///
    /// The agent settles onto the terrain, reads the block underfoot, picks an
    /// action from a fresh snapshot, carries it out and then takes end-of-turn
    /// damage. Returns `None` for unknown or dead agents, which do not act.
    pub fn act(
        &mut self,
        id: AgentId,
        world: &mut World,
        turn: u64,
        rng: &mut fastrand::Rng,
    ) -> Option<TurnSummary> {
        if !self.agent(id)?.is_alive() {
            return None;
        }
        let snapshot = self.snapshot();

        let agent = &mut self.agents[id.0];
        agent.settle(world);
        let below = agent.below_type(world);
        let action = agent.decide(below, &snapshot, turn, rng);

        let mut health_shared = 0;
        let step = match action {
            AgentAction::ProduceNest => Some(agent.produce_nest(world)),
            AgentAction::Wander { axis, sign } => Some(agent.step_along(axis, sign, world)),
            AgentAction::Forage => Some(agent.dig(world)),
            AgentAction::Advance { target } => agent.advance_toward(target, world, rng),
            AgentAction::Share { partner } => {
                health_shared = self.share(id, partner, rng);
                None
            }
        };

        let agent = &mut self.agents[id.0];
        let died = agent.end_turn(below);
        if died {
            debug!("{:?} {:?} died at {:?}", agent.role(), id, agent.position);
        }

        let summary = TurnSummary {
            agent: id,
            action,
            step,
            health_shared,
            died,
        };
        trace!("{summary:?}");
        Some(summary)
    }

    /// Lets `id` share health with `partner`, the donation drawn from the
    /// donor's configured range.
    fn share(&mut self, id: AgentId, partner: AgentId, rng: &mut fastrand::Rng) -> i32 {
        let Some((first, second)) = pair_mut(&mut self.agents, id.0, partner.0) else {
            return 0;
        };
        if !second.is_alive() || first.health() == second.health() {
            return 0;
        }

        let donor = if first.health() > second.health() { &*first } else { &*second };
        let [low, high] = donor.profile().health_donation_range;
        let draw = rng.i32(low..=high.max(low));
        share_health(first, second, draw)
    }
}

/// Two distinct mutable elements of a slice.
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> Option<(&mut T, &mut T)> {
    if a == b || a >= items.len() || b >= items.len() {
        return None;
    }
    if a < b {
        let (left, right) = items.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = items.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}

fn random_health(profile: &RoleConfig, rng: &mut fastrand::Rng) -> i32 {
    profile.initial_health - rng.i32(0..=profile.initial_health_jitter.max(0))
}

/// Draws spawn columns, rejecting occupied and unstandable ones.
struct ColumnPlacer<'a> {
    world: &'a World,
    taken: Vec<(i32, i32)>,
    attempts: usize,
    budget: usize,
    requested: usize,
}

impl ColumnPlacer<'_> {
    fn place(&mut self, rng: &mut fastrand::Rng) -> Result<Point3<i32>, SpawnError> {
        while self.attempts < self.budget {
            self.attempts += 1;
            let (x, z) = random_interior_column(self.world, rng);
            if !self.world.is_interior_column(x, z) || self.taken.contains(&(x, z)) {
                continue;
            }
            let Some(y) = self.world.surface_height(x, z) else {
                continue;
            };
            if y >= self.world.height() {
                continue;
            }

            self.taken.push((x, z));
            return Ok(Point3::new(x, y, z));
        }

        Err(SpawnError::NoFreeColumn {
            placed: self.taken.len(),
            requested: self.requested,
            attempts: self.attempts,
        })
    }
}
