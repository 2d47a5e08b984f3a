//! Mutable generation state lent to every carving collaborator for one phase.

use tracing::trace;

use crate::config::GeneratorConfig;
use crate::placer::{EntityHandle, Placer, Recorder};
use crate::types::{EntityKind, Pos, TileState};

use super::branches::BranchQueue;
use super::grid::TileGrid;
use super::random::RandomSource;
use super::rooms::Room;
use super::zones::{EnemyTier, Mode};

pub(super) struct GenContext<'a> {
    pub(super) config: &'a GeneratorConfig,
    pub(super) grid: &'a mut TileGrid,
    pub(super) rng: &'a mut RandomSource,
    pub(super) branches: &'a mut BranchQueue,
    /// Rooms committed while carving, in commit order.
    pub(super) rooms: &'a mut Vec<Room>,
    pub(super) placer: Recorder<'a>,
}

impl<'a> GenContext<'a> {
    pub(super) fn mode_at(&self, pos: Pos) -> &'a Mode {
        let config: &'a GeneratorConfig = self.config;
        config.zones.select(pos)
    }

    pub(super) fn get(&self, pos: Pos) -> TileState {
        self.grid.get(pos)
    }

    pub(super) fn is_empty_at(&self, pos: Pos) -> bool {
        self.grid.is_empty_at(pos)
    }

    pub(super) fn set_floor(&mut self, pos: Pos) -> bool {
        self.grid.set_floor(&mut self.placer, pos)
    }

    pub(super) fn set_wall(&mut self, pos: Pos) -> bool {
        self.grid.set_wall(&mut self.placer, pos)
    }

    pub(super) fn delete(&mut self, pos: Pos) -> bool {
        self.grid.delete(&mut self.placer, pos)
    }

    pub(super) fn spawn(&mut self, kind: EntityKind, pos: Pos) -> EntityHandle {
        trace!(?kind, x = pos.x, y = pos.y, "spawn");
        self.placer.spawn(kind, pos)
    }

    pub(super) fn remove(&mut self, handle: EntityHandle) {
        self.placer.remove(handle);
    }

    pub(super) fn enqueue(&mut self, pos: Pos) -> bool {
        self.branches.enqueue(self.grid, pos)
    }

    pub(super) fn dequeue(&mut self) -> Option<Pos> {
        self.branches.dequeue(self.grid)
    }

    /// Spawns a random concrete enemy of `tier` at `pos`.
    pub(super) fn spawn_enemy(&mut self, tier: EnemyTier, pos: Pos) -> EntityHandle {
        let kind = self.rng.pick(tier.variants());
        self.spawn(EntityKind::Enemy(kind), pos)
    }
}
