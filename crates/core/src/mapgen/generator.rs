//! Level generation state machine: seeding, anchors, carving, walling, panning
//! and the post-boss final path.

mod final_path;
mod pipeline;
mod stitch;

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, GeneratorConfig};
use crate::placer::{PlacementLog, Placer, Recorder};
use crate::schedule::{Scheduler, TaskId};
use crate::types::{EntityKind, Pos, TileState};

use super::branches::BranchQueue;
use super::context::GenContext;
use super::grid::TileGrid;
use super::model::GeneratedLevel;
use super::random::RandomSource;
use super::rooms::Room;
use super::seed::SeedChoice;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Seeding,
    PlacingAnchors,
    Carving,
    Walling,
    Panning,
    Ready,
    FinalPath,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhaseError {
    #[error("boss defeat signalled during {0}; a level must be ready first")]
    NotReady(Phase),
    #[error("the final path is already open on this level")]
    FinalPathOpen,
}

/// Something the clock fired on behalf of an earlier request.
#[derive(Clone, Debug, PartialEq)]
pub enum ClockEvent {
    Regenerated(GeneratedLevel),
    Panned(Pos),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Deferred {
    Regenerate,
    Pan(Pos),
}

pub struct LevelGenerator<P: Placer> {
    config: GeneratorConfig,
    placer: P,
    phase: Phase,
    grid: TileGrid,
    rng: RandomSource,
    branches: BranchQueue,
    rooms: Vec<Room>,
    log: PlacementLog,
    scheduler: Scheduler<Deferred>,
    level: Option<GeneratedLevel>,
    final_path_open: bool,
}

impl<P: Placer> LevelGenerator<P> {
    pub fn new(config: GeneratorConfig, placer: P) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            grid: TileGrid::new(config.grid_size),
            rng: RandomSource::new(0),
            config,
            placer,
            phase: Phase::Idle,
            branches: BranchQueue::new(),
            rooms: Vec::new(),
            log: PlacementLog::default(),
            scheduler: Scheduler::new(),
            level: None,
            final_path_open: false,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The most recent finished level, if any.
    pub fn level(&self) -> Option<&GeneratedLevel> {
        self.level.as_ref()
    }

    pub fn placer(&self) -> &P {
        &self.placer
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Tears down the current level and builds a new one. `seed` overrides the
    /// configured seed; with neither, a fresh seed is drawn and logged.
    pub fn generate(&mut self, seed: Option<u64>) -> GeneratedLevel {
        self.scheduler.cancel_all();

        self.enter(Phase::Seeding);
        let choice = SeedChoice::resolve(seed, self.config.seed);
        info!(seed = choice.value(), source = ?choice, "generating level");
        self.log.clear(&mut self.placer);
        self.grid = TileGrid::new(self.config.grid_size);
        self.rng.reseed(choice.value());
        self.branches.clear();
        self.rooms.clear();
        self.final_path_open = false;
        self.level = None;

        self.enter(Phase::PlacingAnchors);
        pipeline::place_anchors(&mut self.context());

        self.enter(Phase::Carving);
        pipeline::carve_level(&mut self.context());
        let joined = stitch::join_stray_floor(&mut self.context());
        if joined > 0 {
            debug!(joined, "joined stray floor regions to the start");
        }

        self.enter(Phase::Walling);
        pipeline::wall_level(&mut self.context());

        self.enter(Phase::Panning);
        let pan_target = pipeline::place_pan_anchor(&mut self.context());

        self.enter(Phase::Ready);
        let level = self.snapshot(choice.value(), pan_target, None);
        info!(
            seed = level.seed,
            floor = level.count_tiles(TileState::Floor),
            enemies = level.enemies().count(),
            "level ready"
        );
        self.level = Some(level.clone());
        level
    }

    /// Regenerates with the configured seed, or a fresh one when none is pinned.
    pub fn regenerate(&mut self) -> GeneratedLevel {
        self.generate(None)
    }

    /// Schedules [`Self::regenerate`] after `delay`, replacing any pending work.
    pub fn regenerate_after(&mut self, delay: Duration) -> TaskId {
        self.scheduler.cancel_all();
        self.scheduler.schedule(delay, Deferred::Regenerate)
    }

    pub fn cancel(&mut self, task: TaskId) -> bool {
        self.scheduler.cancel(task).is_some()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Advances the deferred-work clock and runs whatever came due.
    pub fn advance_clock(&mut self, elapsed: Duration) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        for task in self.scheduler.advance(elapsed) {
            match task {
                Deferred::Regenerate => {
                    events.push(ClockEvent::Regenerated(self.regenerate()));
                    // Anything else due belonged to the level just replaced.
                    break;
                }
                Deferred::Pan(target) => {
                    self.pan_to(target);
                    events.push(ClockEvent::Panned(target));
                }
            }
        }
        events
    }

    /// Clears every enemy, tramples a path to a random corner and opens the
    /// portal there. The camera pans to it after the configured delay.
    pub fn on_boss_defeated(&mut self) -> Result<GeneratedLevel, PhaseError> {
        if self.phase != Phase::Ready {
            return Err(PhaseError::NotReady(self.phase));
        }
        if self.final_path_open {
            return Err(PhaseError::FinalPathOpen);
        }

        self.enter(Phase::FinalPath);
        let portal = final_path::open_final_path(&mut self.context());
        self.final_path_open = true;
        let delay = Duration::from_millis(self.config.final_path.pan_delay_ms);
        self.scheduler.schedule(delay, Deferred::Pan(portal));

        self.enter(Phase::Ready);
        let pan_target = self.level.as_ref().and_then(|level| level.pan_target);
        let level = self.snapshot(self.rng.seed(), pan_target, Some(portal));
        self.level = Some(level.clone());
        Ok(level)
    }

    fn pan_to(&mut self, target: Pos) {
        let anchors = self.log.handles_where(|placement| placement.kind == EntityKind::CinematicAnchor);
        let mut ctx = self.context();
        for handle in anchors {
            ctx.remove(handle);
        }
        ctx.spawn(EntityKind::CinematicAnchor, target);
        if let Some(level) = self.level.as_mut() {
            level.pan_target = Some(target);
            level.placements = self.log.placements().copied().collect();
        }
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "phase");
        self.phase = phase;
    }

    fn context(&mut self) -> GenContext<'_> {
        GenContext {
            config: &self.config,
            grid: &mut self.grid,
            rng: &mut self.rng,
            branches: &mut self.branches,
            rooms: &mut self.rooms,
            placer: Recorder::new(&mut self.placer, &mut self.log),
        }
    }

    fn snapshot(&self, seed: u64, pan_target: Option<Pos>, portal: Option<Pos>) -> GeneratedLevel {
        GeneratedLevel {
            seed,
            size: self.grid.size(),
            tile_scale: self.config.tile_scale,
            tiles: self.grid.states(),
            placements: self.log.placements().copied().collect(),
            rooms: self.rooms.clone(),
            player_start: Pos::ORIGIN,
            pan_target,
            portal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placer::SlotPlacer;
    use crate::types::{DoorKind, EnemyKind, PickupKind};

    fn generator() -> LevelGenerator<SlotPlacer> {
        LevelGenerator::new(GeneratorConfig::default(), SlotPlacer::new())
            .expect("default config is valid")
    }

    #[test]
    fn invalid_configs_are_rejected_before_generation() {
        let config = GeneratorConfig { grid_size: 40, ..GeneratorConfig::default() };
        assert!(matches!(
            LevelGenerator::new(config, SlotPlacer::new()),
            Err(ConfigError::EvenGridSize(40))
        ));
    }

    #[test]
    fn generation_walks_every_phase_and_ends_ready() {
        let mut generator = generator();
        assert_eq!(generator.phase(), Phase::Idle);
        let level = generator.generate(Some(42));
        assert_eq!(generator.phase(), Phase::Ready);
        assert_eq!(level.seed, 42);
        assert_eq!(level.count_tiles(TileState::Empty), 0);
        assert_eq!(level.tile_at(Pos::ORIGIN), TileState::Floor);
        assert_eq!(generator.level(), Some(&level));
    }

    #[test]
    fn anchors_are_always_present() {
        let mut generator = generator();
        for seed in [1_u64, 2, 3, 500, 65_535] {
            let level = generator.generate(Some(seed));
            assert_eq!(level.count_of(EntityKind::Player), 1);
            assert_eq!(level.count_of(EntityKind::Camera), 1);
            assert_eq!(level.count_of(EntityKind::Enemy(EnemyKind::Boss)), 1);
            assert_eq!(level.count_of(EntityKind::Door(DoorKind::Gold)), 1);
            assert_eq!(level.count_of(EntityKind::Pickup(PickupKind::SilverKey)), 1);
            assert_eq!(level.count_of(EntityKind::Pickup(PickupKind::GoldKey)), 1);
            assert_eq!(level.count_of(EntityKind::CinematicAnchor), 1);
            assert_eq!(level.count_of(EntityKind::Portal), 0);
        }
    }

    #[test]
    fn regenerating_replaces_every_previous_placement() {
        let mut generator = generator();
        let first = generator.generate(Some(10));
        assert_eq!(generator.placer().len(), first.placements.len());
        let second = generator.generate(Some(11));
        assert_eq!(generator.placer().len(), second.placements.len());
        assert_ne!(first.canonical_bytes(), second.canonical_bytes());
    }

    #[test]
    fn boss_defeat_requires_a_ready_level_and_happens_once() {
        let mut generator = generator();
        assert_eq!(generator.on_boss_defeated(), Err(PhaseError::NotReady(Phase::Idle)));
        generator.generate(Some(7));
        let opened = generator.on_boss_defeated().expect("ready level accepts boss defeat");
        assert!(opened.portal.is_some());
        assert_eq!(opened.count_of(EntityKind::Enemy(EnemyKind::Boss)), 0);
        assert_eq!(opened.count_of(EntityKind::Portal), 1);
        assert_eq!(generator.on_boss_defeated(), Err(PhaseError::FinalPathOpen));
    }

    #[test]
    fn delayed_regeneration_fires_once_and_cancels_stale_pans() {
        let mut generator = generator();
        generator.generate(Some(3));
        generator.on_boss_defeated().expect("ready level accepts boss defeat");
        assert_eq!(generator.pending_tasks(), 1);

        generator.regenerate_after(Duration::from_secs(2));
        assert_eq!(generator.pending_tasks(), 1);
        assert!(generator.advance_clock(Duration::from_secs(1)).is_empty());
        let events = generator.advance_clock(Duration::from_secs(1));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ClockEvent::Regenerated(_)));
        assert_eq!(generator.pending_tasks(), 0);
    }

    #[test]
    fn final_pan_moves_the_cinematic_anchor_to_the_portal() {
        let mut generator = generator();
        generator.generate(Some(99));
        let opened = generator.on_boss_defeated().expect("ready level accepts boss defeat");
        let portal = opened.portal.expect("portal placed");
        let delay = Duration::from_millis(generator.config().final_path.pan_delay_ms);

        let events = generator.advance_clock(delay);
        assert_eq!(events, vec![ClockEvent::Panned(portal)]);
        let level = generator.level().expect("level exists");
        assert_eq!(level.pan_target, Some(portal));
        assert_eq!(level.count_of(EntityKind::CinematicAnchor), 1);
    }
}
