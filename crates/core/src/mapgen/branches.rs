//! FIFO of unexplored continuation points.

use std::collections::VecDeque;

use crate::types::Pos;

use super::grid::TileGrid;

#[derive(Debug, Default)]
pub struct BranchQueue {
    queue: VecDeque<Pos>,
}

impl BranchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queues `pos` when it is floor. Returns whether it was queued.
    pub fn enqueue(&mut self, grid: &TileGrid, pos: Pos) -> bool {
        if !grid.is_floor(pos) {
            return false;
        }
        self.queue.push_back(pos);
        true
    }

    /// Oldest queued position that is still floor.
    pub fn dequeue(&mut self, grid: &TileGrid) -> Option<Pos> {
        while let Some(pos) = self.queue.pop_front() {
            if grid.is_floor(pos) {
                return Some(pos);
            }
        }
        None
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
