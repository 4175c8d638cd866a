//! Bundled level blueprints.

use donut_panic_core::{DonutInventory, LevelBlueprint};

/// Blueprint of the bundled first stage.
///
/// A 10×12 maze with two normal monsters. Guaranteed to pass
/// [`crate::level::validate`].
#[must_use]
pub fn first_stage() -> LevelBlueprint {
    LevelBlueprint {
        name: "Stage 1: First Donut".to_owned(),
        rows: vec![
            "##########".to_owned(),
            "#...#...M#".to_owned(),
            "#.#.#.#..#".to_owned(),
            "#.#...##.#".to_owned(),
            "#...#....#".to_owned(),
            "##.##.#.##".to_owned(),
            "#.....#..#".to_owned(),
            "#.#.#....#".to_owned(),
            "#.#.#.##.#".to_owned(),
            "#......M.#".to_owned(),
            "#P......G#".to_owned(),
            "##########".to_owned(),
        ],
        donuts: DonutInventory::new(3, 3, 3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level;
    use donut_panic_core::{CellCoord, DonutKind, MonsterBreed};

    #[test]
    fn first_stage_validates() {
        let level = level::validate(&first_stage()).expect("bundled stage is valid");
        assert_eq!(level.player_start(), CellCoord::new(1, 10));
        assert_eq!(level.goal(), CellCoord::new(8, 10));
        assert_eq!(
            level.monster_starts(),
            &[
                (CellCoord::new(8, 1), MonsterBreed::Normal),
                (CellCoord::new(7, 9), MonsterBreed::Normal),
            ]
        );
        assert_eq!(level.inventory().count(DonutKind::Strawberry), 3);
    }

    #[test]
    fn first_stage_goal_is_reachable_from_the_start() {
        let level = level::validate(&first_stage()).expect("bundled stage is valid");
        let route = crate::pathfinding::find_path(level.grid(), level.player_start(), level.goal());
        assert!(!route.is_empty());
    }
}
