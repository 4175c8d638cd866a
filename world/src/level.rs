//! Level blueprint validation.
//!
//! Blueprints arrive from outside the engine (bundled stages or files) and
//! are consumed exactly once at load time. Validation happens here rather
//! than deep inside the session so that a malformed level can never corrupt
//! a running game: `apply(LoadLevel)` either swaps in a fully constructed
//! [`Level`] or reports a [`LevelError`] and leaves the session untouched.

use donut_panic_core::{
    CellCoord, DonutInventory, LevelBlueprint, LevelError, MonsterBreed, TileKind,
};

use crate::grid::Grid;

/// Fully validated level ready to seed a session.
#[derive(Clone, Debug)]
pub struct Level {
    name: String,
    grid: Grid,
    player_start: CellCoord,
    goal: CellCoord,
    monster_starts: Vec<(CellCoord, MonsterBreed)>,
    inventory: DonutInventory,
}

impl Level {
    /// Display name carried over from the blueprint.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runtime tile grid with all spawn markers resolved to floor.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Cell the player starts on.
    #[must_use]
    pub const fn player_start(&self) -> CellCoord {
        self.player_start
    }

    /// Cell the player must reach.
    #[must_use]
    pub const fn goal(&self) -> CellCoord {
        self.goal
    }

    /// Monster spawn cells paired with their breeds, in marker scan order.
    #[must_use]
    pub fn monster_starts(&self) -> &[(CellCoord, MonsterBreed)] {
        &self.monster_starts
    }

    /// Donut counts the player starts with.
    #[must_use]
    pub const fn inventory(&self) -> DonutInventory {
        self.inventory
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        String,
        Grid,
        CellCoord,
        CellCoord,
        Vec<(CellCoord, MonsterBreed)>,
        DonutInventory,
    ) {
        (
            self.name,
            self.grid,
            self.player_start,
            self.goal,
            self.monster_starts,
            self.inventory,
        )
    }
}

/// Validates a blueprint into a [`Level`].
///
/// Checks grid shape, the symbol alphabet, and the marker constraints:
/// exactly one player start, exactly one goal, any number of monster
/// starts. Marker cells become floor (goal cells keep their goal tile).
pub fn validate(blueprint: &LevelBlueprint) -> Result<Level, LevelError> {
    let rows = &blueprint.rows;
    if rows.is_empty() {
        return Err(LevelError::EmptyGrid);
    }

    let width = rows[0].chars().count();
    if width == 0 {
        return Err(LevelError::EmptyGrid);
    }

    let mut tiles = Vec::with_capacity(width * rows.len());
    let mut player_start = None;
    let mut goal = None;
    let mut monster_starts = Vec::new();

    for (row_index, row) in rows.iter().enumerate() {
        let row_index = row_index as u32;
        if row.chars().count() != width {
            return Err(LevelError::RaggedRow { row: row_index });
        }

        for (column_index, symbol) in row.chars().enumerate() {
            let cell = CellCoord::new(column_index as u32, row_index);
            let tile = match symbol {
                '#' => TileKind::Wall,
                '.' => TileKind::Floor,
                'P' => {
                    if player_start.replace(cell).is_some() {
                        return Err(LevelError::DuplicatePlayerStart);
                    }
                    TileKind::Floor
                }
                'G' => {
                    if goal.replace(cell).is_some() {
                        return Err(LevelError::DuplicateGoal);
                    }
                    TileKind::Goal
                }
                'M' => {
                    monster_starts.push((cell, MonsterBreed::Normal));
                    TileKind::Floor
                }
                'D' => {
                    monster_starts.push((cell, MonsterBreed::Dash));
                    TileKind::Floor
                }
                other => {
                    return Err(LevelError::UnknownSymbol {
                        symbol: other,
                        column: cell.column(),
                        row: cell.row(),
                    })
                }
            };
            tiles.push(tile);
        }
    }

    let player_start = player_start.ok_or(LevelError::MissingPlayerStart)?;
    let goal = goal.ok_or(LevelError::MissingGoal)?;

    Ok(Level {
        name: blueprint.name.clone(),
        grid: Grid::new(width as u32, rows.len() as u32, tiles),
        player_start,
        goal,
        monster_starts,
        inventory: blueprint.donuts,
    })
}
