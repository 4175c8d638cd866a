//! Plain-text frame renderer for terminal output.

use donut_panic_core::{CellCoord, DonutKind, MonsterBreed, MonsterState, Outcome, TileKind};
use donut_panic_rendering::Scene;
use donut_panic_system_ranking::format_time;

/// Draws a scene as a character board followed by a status line.
pub(crate) fn draw(scene: &Scene) -> String {
    let columns = scene.grid.columns as usize;
    let rows = scene.grid.rows as usize;

    let mut board = vec![vec![' '; columns]; rows];
    for (row_index, row) in board.iter_mut().enumerate() {
        for (column_index, glyph) in row.iter_mut().enumerate() {
            let cell = CellCoord::new(column_index as u32, row_index as u32);
            *glyph = match scene.grid.tile(cell) {
                Some(TileKind::Wall) => '#',
                Some(TileKind::Goal) => 'G',
                _ => '.',
            };
        }
    }

    for donut in &scene.donuts {
        plot(&mut board, donut.cell, 'o');
    }

    for monster in &scene.monsters {
        let glyph = match monster.state {
            MonsterState::Sleep => 'z',
            MonsterState::Eating => 'e',
            MonsterState::Lured => '!',
            MonsterState::Patrol | MonsterState::Chase => match monster.breed {
                MonsterBreed::Normal => 'm',
                MonsterBreed::Dash => 'd',
            },
        };
        plot(&mut board, monster.cell, glyph);
    }

    let player_glyph = if scene.player.alive { 'P' } else { 'x' };
    plot(&mut board, scene.player.cell, player_glyph);

    let mut text = String::with_capacity((columns + 1) * rows + 64);
    for row in &board {
        text.extend(row.iter());
        text.push('\n');
    }

    let hud = &scene.hud;
    text.push_str(&format!(
        "time {}  donuts c:{} s:{} m:{}  {}",
        format_time(hud.elapsed),
        hud.inventory.count(DonutKind::Choco),
        hud.inventory.count(DonutKind::Strawberry),
        hud.inventory.count(DonutKind::Matcha),
        outcome_label(hud.outcome),
    ));
    if let Some(rank) = hud.rank {
        if rank > 0 {
            text.push_str(&format!("  ranked #{rank}"));
        }
    }

    text
}

fn plot(board: &mut [Vec<char>], cell: CellCoord, glyph: char) {
    if let Some(slot) = board
        .get_mut(cell.row() as usize)
        .and_then(|row| row.get_mut(cell.column() as usize))
    {
        *slot = glyph;
    }
}

const fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Playing => "playing",
        Outcome::Cleared => "cleared",
        Outcome::GameOver => "game over",
    }
}
