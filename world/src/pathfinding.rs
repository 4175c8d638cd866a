//! Grid A* search used by every moving agent.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use donut_panic_core::CellCoord;

use crate::grid::Grid;

/// Computes a shortest route between two cells.
///
/// The returned sequence excludes the start cell and includes the end cell.
/// It is empty when the start equals the end, the end is not walkable, or no
/// route exists; callers treat an empty route as "no move". Search is
/// 4-directional with unit edge cost and a Manhattan heuristic, so the
/// result is a shortest path (not necessarily the unique one). Ties between
/// equal f-scores resolve deterministically toward the lowest
/// (f, column, row) triple.
#[must_use]
pub fn find_path(grid: &Grid, start: CellCoord, end: CellCoord) -> Vec<CellCoord> {
    if start == end || !grid.is_walkable(end) {
        return Vec::new();
    }

    let width = grid.columns() as usize;
    let cell_count = width * grid.rows() as usize;
    if cell_count == 0 {
        return Vec::new();
    }

    let mut g_scores = vec![u32::MAX; cell_count];
    let mut came_from: Vec<Option<CellCoord>> = vec![None; cell_count];
    let mut frontier = BinaryHeap::new();

    let Some(start_index) = index(width, grid.rows(), start) else {
        return Vec::new();
    };
    g_scores[start_index] = 0;
    frontier.push(Reverse(OpenNode {
        f_score: heuristic(start, end),
        cell: start,
    }));

    while let Some(Reverse(node)) = frontier.pop() {
        let Some(node_index) = index(width, grid.rows(), node.cell) else {
            continue;
        };

        let g_score = g_scores[node_index];
        if g_score == u32::MAX || node.f_score != g_score + heuristic(node.cell, end) {
            // Stale frontier entry superseded by a cheaper route.
            continue;
        }

        if node.cell == end {
            return reconstruct(&came_from, width, grid.rows(), start, end);
        }

        let tentative = g_score + 1;
        for neighbor in neighbors(node.cell, grid.columns(), grid.rows()) {
            if !grid.is_walkable(neighbor) {
                continue;
            }

            let Some(neighbor_index) = index(width, grid.rows(), neighbor) else {
                continue;
            };

            if tentative >= g_scores[neighbor_index] {
                continue;
            }

            g_scores[neighbor_index] = tentative;
            came_from[neighbor_index] = Some(node.cell);
            frontier.push(Reverse(OpenNode {
                f_score: tentative + heuristic(neighbor, end),
                cell: neighbor,
            }));
        }
    }

    Vec::new()
}

fn reconstruct(
    came_from: &[Option<CellCoord>],
    width: usize,
    rows: u32,
    start: CellCoord,
    end: CellCoord,
) -> Vec<CellCoord> {
    let mut path = Vec::new();
    let mut cursor = end;
    while cursor != start {
        path.push(cursor);
        let Some(cursor_index) = index(width, rows, cursor) else {
            return Vec::new();
        };
        match came_from[cursor_index] {
            Some(previous) => cursor = previous,
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

fn heuristic(from: CellCoord, to: CellCoord) -> u32 {
    from.manhattan_distance(to)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenNode {
    f_score: u32,
    cell: CellCoord,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.f_score, self.cell.column(), self.cell.row()).cmp(&(
            other.f_score,
            other.cell.column(),
            other.cell.row(),
        ))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn neighbors(cell: CellCoord, columns: u32, rows: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < columns {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < rows {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn index(width: usize, rows: u32, cell: CellCoord) -> Option<usize> {
    if cell.row() >= rows || cell.column() as usize >= width {
        return None;
    }
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
