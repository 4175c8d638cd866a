//! Dense tile grid backing the maze.

use donut_panic_core::{CellCoord, TileKind};

/// Static walkable/wall map plus the walls created by sleeping monsters.
///
/// The grid is mutable in exactly one direction: a floor cell can be
/// permanently converted into a wall when a monster falls asleep on it.
/// No removal operation exists.
#[derive(Clone, Debug)]
pub struct Grid {
    columns: u32,
    rows: u32,
    tiles: Vec<TileKind>,
}

impl Grid {
    pub(crate) fn new(columns: u32, rows: u32, tiles: Vec<TileKind>) -> Self {
        debug_assert_eq!(tiles.len(), columns as usize * rows as usize);
        Self {
            columns,
            rows,
            tiles,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile stored at the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileKind> {
        self.index(cell).map(|index| self.tiles[index])
    }

    /// Reports whether an agent may occupy the provided cell.
    ///
    /// Out-of-bounds cells and walls are not walkable; floor and goal
    /// cells are.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        matches!(self.tile(cell), Some(TileKind::Floor) | Some(TileKind::Goal))
    }

    /// Permanently converts the provided cell into a wall.
    ///
    /// Used when a monster falls asleep; the conversion is never reverted
    /// within a session. Out-of-bounds cells are ignored.
    pub(crate) fn mark_unwalkable(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            self.tiles[index] = TileKind::Wall;
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
