//! Bounded tile map addressed by signed coordinates around the map centre.

use std::mem;

use crate::placer::{EntityHandle, Placer};
use crate::types::{EntityKind, Pos, TileState};

#[derive(Clone, Copy, Debug, Default)]
struct Cell {
    state: TileState,
    handle: Option<EntityHandle>,
}

/// Odd-sized square grid spanning `[-size/2, size/2]` on both axes.
///
/// Cells live in a flat array; `(x, y)` maps to `(y + half) * size + (x + half)`,
/// which is the same as `y * size + x + size * size / 2`. Anything outside the
/// span reads as `Wall` without being stored.
pub struct TileGrid {
    size: i32,
    half: i32,
    cells: Vec<Cell>,
}

impl TileGrid {
    pub fn new(size: i32) -> Self {
        debug_assert!(size > 0 && size % 2 == 1, "grid size must be odd");
        let half = size / 2;
        Self { size, half, cells: vec![Cell::default(); (size * size) as usize] }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn half(&self) -> i32 {
        self.half
    }

    pub fn is_out_of_bounds(&self, pos: Pos) -> bool {
        pos.x.abs() > self.half || pos.y.abs() > self.half
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        if self.is_out_of_bounds(pos) {
            return None;
        }
        Some(((pos.y + self.half) * self.size + pos.x + self.half) as usize)
    }

    pub fn get(&self, pos: Pos) -> TileState {
        self.index(pos).map_or(TileState::Wall, |index| self.cells[index].state)
    }

    pub fn is_empty_at(&self, pos: Pos) -> bool {
        self.get(pos) == TileState::Empty
    }

    pub fn is_floor(&self, pos: Pos) -> bool {
        self.get(pos) == TileState::Floor
    }

    /// Marks an empty cell as floor and spawns its object. Returns whether anything changed.
    pub fn set_floor(&mut self, placer: &mut dyn Placer, pos: Pos) -> bool {
        self.place(placer, pos, TileState::Floor, EntityKind::Floor)
    }

    pub fn set_wall(&mut self, placer: &mut dyn Placer, pos: Pos) -> bool {
        self.place(placer, pos, TileState::Wall, EntityKind::Wall)
    }

    fn place(&mut self, placer: &mut dyn Placer, pos: Pos, state: TileState, kind: EntityKind) -> bool {
        let Some(index) = self.index(pos) else {
            return false;
        };
        if self.cells[index].state != TileState::Empty {
            return false;
        }
        let handle = placer.spawn(kind, pos);
        self.cells[index] = Cell { state, handle: Some(handle) };
        true
    }

    /// Clears a cell back to empty, removing whatever was spawned there.
    pub fn delete(&mut self, placer: &mut dyn Placer, pos: Pos) -> bool {
        let Some(index) = self.index(pos) else {
            return false;
        };
        let cell = mem::take(&mut self.cells[index]);
        if let Some(handle) = cell.handle {
            placer.remove(handle);
        }
        cell.state != TileState::Empty
    }

    /// A cell is reachable once any 4-neighbour is floor or lies off the map.
    pub fn is_tile_reachable(&self, pos: Pos) -> bool {
        pos.neighbors()
            .into_iter()
            .any(|next| self.is_out_of_bounds(next) || self.get(next) == TileState::Floor)
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let half = self.half;
        (-half..=half).flat_map(move |y| (-half..=half).map(move |x| Pos::new(x, y)))
    }

    /// Row-major states, south row first.
    pub fn states(&self) -> Vec<TileState> {
        self.cells.iter().map(|cell| cell.state).collect()
    }

    pub fn count(&self, state: TileState) -> usize {
        self.cells.iter().filter(|cell| cell.state == state).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placer::SlotPlacer;

    #[test]
    fn out_of_bounds_reads_as_wall_and_cannot_be_written() {
        let mut placer = SlotPlacer::new();
        let mut grid = TileGrid::new(7);
        assert_eq!(grid.get(Pos::new(4, 0)), TileState::Wall);
        assert_eq!(grid.get(Pos::new(0, -4)), TileState::Wall);
        assert_eq!(grid.get(Pos::new(3, 3)), TileState::Empty);
        assert!(!grid.set_floor(&mut placer, Pos::new(-4, 0)));
        assert!(!grid.delete(&mut placer, Pos::new(9, 9)));
        assert!(placer.is_empty());
    }

    #[test]
    fn placing_never_overwrites_a_non_empty_cell() {
        let mut placer = SlotPlacer::new();
        let mut grid = TileGrid::new(5);
        let pos = Pos::new(1, -1);
        assert!(grid.set_floor(&mut placer, pos));
        assert!(!grid.set_wall(&mut placer, pos));
        assert!(!grid.set_floor(&mut placer, pos));
        assert_eq!(grid.get(pos), TileState::Floor);
        assert_eq!(placer.len(), 1);
    }

    #[test]
    fn delete_clears_the_cell_and_its_spawned_object() {
        let mut placer = SlotPlacer::new();
        let mut grid = TileGrid::new(5);
        let pos = Pos::new(0, 2);
        grid.set_floor(&mut placer, pos);
        assert!(grid.delete(&mut placer, pos));
        assert_eq!(grid.get(pos), TileState::Empty);
        assert!(placer.is_empty());
        assert!(grid.set_wall(&mut placer, pos));
    }

    #[test]
    fn flat_index_matches_midpoint_offset() {
        let grid = TileGrid::new(41);
        let midpoint = (41 * 41) / 2;
        for pos in [Pos::new(0, 0), Pos::new(-20, -20), Pos::new(20, 20), Pos::new(-3, 17)] {
            assert_eq!(grid.index(pos), Some((pos.y * 41 + pos.x + midpoint) as usize));
        }
        assert_eq!(grid.positions().count(), 41 * 41);
    }

    #[test]
    fn reachability_counts_floor_neighbours_and_the_map_edge() {
        let mut placer = SlotPlacer::new();
        let mut grid = TileGrid::new(7);
        assert!(!grid.is_tile_reachable(Pos::new(0, 0)));
        assert!(grid.is_tile_reachable(Pos::new(3, 0)));
        grid.set_floor(&mut placer, Pos::new(1, 0));
        assert!(grid.is_tile_reachable(Pos::new(0, 0)));
    }
}
