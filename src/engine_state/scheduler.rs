//! # Scheduler
//!
//! Drives the simulation one discrete turn at a time. Within a turn the queen
//! acts first, then every live worker in roster order, each against the world
//! as the previous agents left it. Time only advances through [`Scheduler::step`];
//! pacing between turns is left to the [`Presenter`].

use log::{debug, info};
use web_time::Instant;

use super::{
    telemetry::{GenerationReport, TurnReport},
    voxels::world::World,
    EngineError, EngineState,
};
use crate::config::SimulationConfig;

/// Receives the simulation after every turn and generation.
pub trait Presenter {
    /// Called after every turn.
    ///
    /// The world is handed over mutably so a renderer can rebuild and clear the
    /// chunks flagged for redraw. Implementations also own pacing, e.g. by
    /// sleeping until the next turn is due.
    fn present(&mut self, report: &TurnReport, world: &mut World);

    /// Called once a generation has ended.
    fn generation_finished(&mut self, _report: &GenerationReport) {}
}

/// A presenter that ignores everything and never waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl Presenter for Headless {
    fn present(&mut self, _report: &TurnReport, _world: &mut World) {}
}

impl<F> Presenter for F
where
    F: FnMut(&TurnReport, &mut World),
{
    fn present(&mut self, report: &TurnReport, world: &mut World) {
        self(report, world)
    }
}

/// Runs turns and generations on an [`EngineState`].
pub struct Scheduler {
    state: EngineState,
}

impl Scheduler {
    /// Creates the first generation from `config`.
    ///
    /// # Errors
    ///
    /// See [`EngineState::new`].
    pub fn new(config: SimulationConfig) -> Result<Self, EngineError> {
        Ok(Self::from_state(EngineState::new(config)?))
    }

    /// Schedules an existing state.
    pub fn from_state(state: EngineState) -> Self {
        Scheduler { state }
    }

    /// The simulation being scheduled.
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Mutable access to the simulation being scheduled.
    pub fn state_mut(&mut self) -> &mut EngineState {
        &mut self.state
    }

    /// Gives the state back.
    pub fn into_state(self) -> EngineState {
        self.state
    }

    /// Plays one turn.
    ///
    /// The turn counter advances, dead workers are pruned, the queen acts and
    /// then every live worker acts in roster order.
    ///
    /// The generation ends at the exact turn the queen dies. If she bleeds out
    /// during her own action, no worker acts on that turn at all, so the
    /// report holds only her summary. Workers are never given a final move
    /// after the queen is gone.
    pub fn step(&mut self) -> TurnReport {
        let EngineState {
            world,
            colony,
            rng,
            turn,
            ..
        } = &mut self.state;

        *turn += 1;
        let pruned = colony.prune_dead();
        let mut summaries = Vec::with_capacity(colony.worker_ids().len() + 1);

        if let Some(summary) = colony.act(colony.queen_id(), world, *turn, rng) {
            summaries.push(summary);
        }

        if colony.queen().is_alive() {
            let roster = colony.worker_ids().to_vec();
            for id in roster {
                if let Some(summary) = colony.act(id, world, *turn, rng) {
                    summaries.push(summary);
                }
            }
        } else {
            debug!("The queen died on turn {}", turn);
        }

        TurnReport {
            telemetry: self.state.telemetry(),
            summaries,
            pruned,
        }
    }

    /// Plays the current generation until its queen dies.
    pub fn run_generation<P: Presenter>(&mut self, presenter: &mut P) -> GenerationReport {
        let start = Instant::now();
        info!(
            "Generation {} begins with {} agents",
            self.state.generation(),
            self.state.colony.size()
        );

        while !self.state.is_generation_over() {
            let report = self.step();
            presenter.present(&report, &mut self.state.world);
        }

        let report = GenerationReport {
            generation: self.state.generation(),
            turns: self.state.turn(),
            nests_produced: self.state.colony.nests_produced(),
            surviving_workers: self.state.colony.size(),
            elapsed: start.elapsed(),
        };
        info!(
            "Generation {} ended after {} turns with {} nests and {} surviving workers ({:?})",
            report.generation,
            report.turns,
            report.nests_produced,
            report.surviving_workers,
            report.elapsed
        );
        presenter.generation_finished(&report);
        report
    }

    /// Plays `generations` generations back to back, starting with the current
    /// one.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if a later generation cannot be created.
    pub fn run<P: Presenter>(
        &mut self,
        generations: u32,
        presenter: &mut P,
    ) -> Result<Vec<GenerationReport>, EngineError> {
        let mut reports = Vec::with_capacity(generations as usize);
        for index in 0..generations {
            if index > 0 {
                self.state.next_generation()?;
            }
            reports.push(self.run_generation(presenter));
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Point3, Vector3};

    use super::*;
    use crate::{
        config::RoleConfig,
        engine_state::{
            agents::colony::Colony,
            voxels::block::block_type::BlockType,
        },
    };

    /// Container floor and stone up to `y = 2`, surface at 3.
    fn flat_world() -> World {
        let mut world = World::with_chunks(Vector3::new(2, 1, 2), 8);
        for x in 0..world.size_x() {
            for z in 0..world.size_z() {
                world.set_block_at(Point3::new(x, 0, z), BlockType::Container).unwrap();
                for y in 1..=2 {
                    world.set_block_at(Point3::new(x, y, z), BlockType::Stone).unwrap();
                }
            }
        }
        world
    }

    fn frail(profile: RoleConfig) -> RoleConfig {
        RoleConfig {
            nest_interval: None,
            turn_damage: 10,
            ..profile
        }
    }

    fn scheduler(queen_health: i32) -> Scheduler {
        let mut colony = Colony::new(frail(RoleConfig::queen()), Point3::new(3, 3, 3), queen_health);
        colony.add_worker(frail(RoleConfig::worker()), Point3::new(10, 3, 10), 200);
        colony.add_worker(frail(RoleConfig::worker()), Point3::new(12, 3, 4), 15);
        let state = EngineState::from_parts(SimulationConfig::default(), flat_world(), colony, 5);
        Scheduler::from_state(state)
    }

    #[test]
    fn step_advances_the_turn_and_dispatches_everyone() {
        let mut scheduler = scheduler(300);

        let report = scheduler.step();

        assert_eq!(report.telemetry.turn, 1);
        assert_eq!(report.summaries.len(), 3);
        assert_eq!(report.summaries[0].agent, scheduler.state().colony.queen_id());
    }

    #[test]
    fn dead_workers_are_pruned_next_turn() {
        let mut scheduler = scheduler(300);

        let first = scheduler.step();
        assert_eq!(first.deaths(), 0);
        let second = scheduler.step();
        assert_eq!(second.deaths(), 1);
        assert_eq!(second.telemetry.colony_size, 2);

        let third = scheduler.step();
        assert_eq!(third.pruned, 1);
        assert_eq!(third.summaries.len(), 2);
    }

    #[test]
    fn workers_do_not_act_once_the_queen_is_dead() {
        let mut scheduler = scheduler(10);

        let report = scheduler.step();

        assert_eq!(report.summaries.len(), 1);
        assert!(report.summaries[0].died);
        assert!(scheduler.state().is_generation_over());
        assert_eq!(report.telemetry.queen_health, 0);

        // Neither worker moved or took damage on the queen's last turn.
        let colony = &scheduler.state().colony;
        let workers: Vec<_> = colony
            .worker_ids()
            .iter()
            .filter_map(|id| colony.agent(*id))
            .map(|agent| (agent.position, agent.health()))
            .collect();
        assert_eq!(
            workers,
            vec![(Point3::new(10, 3, 10), 200), (Point3::new(12, 3, 4), 15)]
        );
    }

    #[test]
    fn run_generation_presents_every_turn_until_the_queen_dies() {
        let mut scheduler = scheduler(95);
        let mut presented = Vec::new();

        let report = scheduler.run_generation(&mut |report: &TurnReport, _world: &mut World| {
            presented.push(report.telemetry.turn)
        });

        assert_eq!(report.turns, presented.len() as u64);
        assert_eq!(presented.first(), Some(&1));
        assert!(scheduler.state().is_generation_over());
    }
}
