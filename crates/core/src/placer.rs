//! The spawning collaborator the generator talks to, plus the bookkeeping that
//! keeps generated output independent of any particular collaborator.

use std::collections::{BTreeMap, HashMap};

use slotmap::{SlotMap, new_key_type};

use crate::types::{EntityKind, Placement, Pos};

new_key_type! {
    pub struct EntityHandle;
}

/// Spawns and removes typed objects on behalf of the generator.
pub trait Placer {
    fn spawn(&mut self, kind: EntityKind, pos: Pos) -> EntityHandle;
    fn remove(&mut self, handle: EntityHandle);
}

/// In-memory placer that just remembers what is alive.
#[derive(Debug, Default)]
pub struct SlotPlacer {
    entities: SlotMap<EntityHandle, Placement>,
}

impl SlotPlacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&Placement> {
        self.entities.get(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &Placement)> {
        self.entities.iter()
    }
}

impl Placer for SlotPlacer {
    fn spawn(&mut self, kind: EntityKind, pos: Pos) -> EntityHandle {
        self.entities.insert(Placement { kind, pos })
    }

    fn remove(&mut self, handle: EntityHandle) {
        self.entities.remove(handle);
    }
}

/// Ordered record of every live placement the generator has issued.
#[derive(Debug, Default)]
pub(crate) struct PlacementLog {
    next_seq: u64,
    entries: BTreeMap<u64, (EntityHandle, Placement)>,
    by_handle: HashMap<EntityHandle, u64>,
}

impl PlacementLog {
    fn record(&mut self, handle: EntityHandle, placement: Placement) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(seq, (handle, placement));
        self.by_handle.insert(handle, seq);
    }

    fn forget(&mut self, handle: EntityHandle) {
        if let Some(seq) = self.by_handle.remove(&handle) {
            self.entries.remove(&seq);
        }
    }

    pub(crate) fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.entries.values().map(|(_, placement)| placement)
    }

    pub(crate) fn handles_where(&self, keep: impl Fn(&Placement) -> bool) -> Vec<EntityHandle> {
        self.entries
            .values()
            .filter(|(_, placement)| keep(placement))
            .map(|(handle, _)| *handle)
            .collect()
    }

    /// First live placement of `kind` in spawn order.
    pub(crate) fn first_of(&self, kind: EntityKind) -> Option<Pos> {
        self.placements().find(|placement| placement.kind == kind).map(|placement| placement.pos)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Removes every recorded placement through `placer`, newest first.
    pub(crate) fn clear(&mut self, placer: &mut dyn Placer) {
        while let Some((_, (handle, _))) = self.entries.pop_last() {
            placer.remove(handle);
        }
        self.by_handle.clear();
    }
}

/// Forwards to the real collaborator while keeping the log in step.
pub(crate) struct Recorder<'a> {
    inner: &'a mut dyn Placer,
    log: &'a mut PlacementLog,
}

impl<'a> Recorder<'a> {
    pub(crate) fn new(inner: &'a mut dyn Placer, log: &'a mut PlacementLog) -> Self {
        Self { inner, log }
    }

    pub(crate) fn log(&self) -> &PlacementLog {
        &*self.log
    }
}

impl Placer for Recorder<'_> {
    fn spawn(&mut self, kind: EntityKind, pos: Pos) -> EntityHandle {
        let handle = self.inner.spawn(kind, pos);
        self.log.record(handle, Placement { kind, pos });
        handle
    }

    fn remove(&mut self, handle: EntityHandle) {
        self.inner.remove(handle);
        self.log.forget(handle);
    }
}
