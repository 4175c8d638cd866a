//! Per-monster behavior state machine.

use std::time::Duration;

use donut_panic_core::{
    CellCoord, CellPoint, DonutId, Event, MonsterBreed, MonsterId, MonsterState, TileKind,
    CHASE_SIGHT_RANGE, PATROL_REDIRECT_INTERVAL,
};

use crate::donut::Donut;
use crate::grid::Grid;
use crate::motion::Motion;
use crate::next_random;
use crate::pathfinding::find_path;

/// Ticks between successive path recomputations while chasing the player.
const CHASE_REPLAN_PERIOD: u64 = 10;

/// Ticks between successive path recomputations while approaching a donut.
const LURE_REPLAN_PERIOD: u64 = 15;

/// Attempts made to find a walkable patrol target before giving up.
const PATROL_TARGET_ATTEMPTS: u32 = 10;

/// A patrolling, chasing, or dormant maze inhabitant.
///
/// The behavior machine is a closed enumeration evaluated exhaustively once
/// per tick; `Sleep` has no outgoing transitions. The targeted donut is held
/// as an id resolved against the canonical donut list every tick, so a
/// donut invalidated mid-pursuit is discovered gracefully.
#[derive(Clone, Debug)]
pub(crate) struct Monster {
    pub(crate) id: MonsterId,
    pub(crate) breed: MonsterBreed,
    pub(crate) cell: CellCoord,
    pub(crate) position: CellPoint,
    pub(crate) state: MonsterState,
    pub(crate) target_donut: Option<DonutId>,
    motion: Motion,
    patrol_timer: Duration,
    patrol_target: Option<CellCoord>,
    eat_timer: Duration,
    ticks: u64,
}

impl Monster {
    pub(crate) fn new(id: MonsterId, breed: MonsterBreed, cell: CellCoord) -> Self {
        Self {
            id,
            breed,
            cell,
            position: CellPoint::from_cell(cell),
            state: MonsterState::Patrol,
            target_donut: None,
            motion: Motion::idle(),
            patrol_timer: Duration::ZERO,
            patrol_target: None,
            eat_timer: Duration::ZERO,
            ticks: 0,
        }
    }

    /// Runs one tick of the behavior machine.
    ///
    /// The session never calls this for sleeping monsters; the `Sleep` arm
    /// exists so the machine stays exhaustive.
    pub(crate) fn update(
        &mut self,
        dt: Duration,
        grid: &mut Grid,
        player_cell: CellCoord,
        donuts: &mut [Donut],
        rng: &mut u64,
        out_events: &mut Vec<Event>,
    ) {
        self.ticks = self.ticks.wrapping_add(1);

        match self.state {
            MonsterState::Patrol => {
                self.update_patrol(dt, grid, player_cell, donuts, rng, out_events);
            }
            MonsterState::Chase => self.update_chase(dt, grid, player_cell, donuts, out_events),
            MonsterState::Lured => self.update_lured(dt, grid, donuts, out_events),
            MonsterState::Eating => self.update_eating(dt, grid, out_events),
            MonsterState::Sleep => {}
        }
    }

    fn update_patrol(
        &mut self,
        dt: Duration,
        grid: &Grid,
        player_cell: CellCoord,
        donuts: &mut [Donut],
        rng: &mut u64,
        out_events: &mut Vec<Event>,
    ) {
        if self.seek_lure(grid, donuts, out_events) {
            return;
        }

        if self.sees_player(grid, player_cell) {
            self.transition(MonsterState::Chase, out_events);
            return;
        }

        self.patrol_timer = self.patrol_timer.saturating_add(dt);
        let arrived = self.patrol_target.map_or(true, |target| target == self.cell);
        if self.patrol_timer >= PATROL_REDIRECT_INTERVAL || arrived {
            self.patrol_timer = Duration::ZERO;
            self.pick_patrol_target(grid, rng);
        }

        self.step(dt, self.breed.patrol_speed(), out_events);
    }

    fn update_chase(
        &mut self,
        dt: Duration,
        grid: &Grid,
        player_cell: CellCoord,
        donuts: &mut [Donut],
        out_events: &mut Vec<Event>,
    ) {
        if self.seek_lure(grid, donuts, out_events) {
            return;
        }

        if !self.sees_player(grid, player_cell) {
            // Force an immediate retarget once patrol resumes.
            self.patrol_timer = PATROL_REDIRECT_INTERVAL;
            self.transition(MonsterState::Patrol, out_events);
            return;
        }

        if self.ticks % CHASE_REPLAN_PERIOD == 0 {
            self.motion.follow(find_path(grid, self.cell, player_cell));
        }

        self.step(dt, self.breed.chase_speed(), out_events);
    }

    fn update_lured(
        &mut self,
        dt: Duration,
        grid: &Grid,
        donuts: &mut [Donut],
        out_events: &mut Vec<Event>,
    ) {
        let target = self
            .target_donut
            .and_then(|id| donuts.iter().position(|donut| donut.id() == id));
        let Some(index) = target else {
            self.abandon_lure(out_events);
            return;
        };

        let donut_cell = donuts[index].cell();
        if !donuts[index].is_active() || donuts[index].reserved_by() != Some(self.id) {
            self.abandon_lure(out_events);
            return;
        }

        if self.cell == donut_cell {
            let donut = &mut donuts[index];
            donut.consume();
            self.eat_timer = donut.eat_duration();
            out_events.push(Event::DonutConsumed {
                donut: donut.id(),
                by: self.id,
            });
            self.motion.clear();
            self.transition(MonsterState::Eating, out_events);
            return;
        }

        if self.ticks % LURE_REPLAN_PERIOD == 0 {
            self.motion.follow(find_path(grid, self.cell, donut_cell));
        }

        self.step(dt, self.breed.patrol_speed(), out_events);
    }

    fn update_eating(&mut self, dt: Duration, grid: &mut Grid, out_events: &mut Vec<Event>) {
        self.eat_timer = self.eat_timer.saturating_sub(dt);
        if !self.eat_timer.is_zero() {
            return;
        }

        self.transition(MonsterState::Sleep, out_events);
        grid.mark_unwalkable(self.cell);
        self.target_donut = None;
        self.motion.clear();
        out_events.push(Event::MonsterSlept {
            monster: self.id,
            cell: self.cell,
        });
    }

    /// Scans for the nearest donut this monster may pursue.
    ///
    /// Candidates are active donuts that are unreserved or already held by
    /// this monster, within their effective lure radius. Distance ties keep
    /// the first donut in list scan order, which makes same-tick contention
    /// deterministic: monsters update in list order and reservations are
    /// written immediately, so a later monster already observes the donut
    /// as reserved-by-other.
    fn seek_lure(&mut self, grid: &Grid, donuts: &mut [Donut], out_events: &mut Vec<Event>) -> bool {
        let mut best: Option<(usize, u32)> = None;
        for (index, donut) in donuts.iter().enumerate() {
            if !donut.is_active() {
                continue;
            }
            if donut
                .reserved_by()
                .is_some_and(|holder| holder != self.id)
            {
                continue;
            }

            let distance = self.cell.manhattan_distance(donut.cell());
            if distance as f32 > donut.lure_radius() {
                continue;
            }

            if best.map_or(true, |(_, closest)| distance < closest) {
                best = Some((index, distance));
            }
        }

        let Some((index, _)) = best else {
            return false;
        };

        let donut = &mut donuts[index];
        let newly_reserved = donut.reserved_by().is_none();
        if donut.reserve(self.id) && newly_reserved {
            out_events.push(Event::DonutReserved {
                donut: donut.id(),
                by: self.id,
            });
        }

        self.target_donut = Some(donut.id());
        self.motion.follow(find_path(grid, self.cell, donut.cell()));
        self.transition(MonsterState::Lured, out_events);
        true
    }

    /// Line-of-sight test against the player.
    ///
    /// The player is visible when within [`CHASE_SIGHT_RANGE`] Manhattan
    /// distance and the straight ray toward them, sampled at each integer
    /// step, crosses no wall cell.
    fn sees_player(&self, grid: &Grid, player_cell: CellCoord) -> bool {
        if self.cell.manhattan_distance(player_cell) > CHASE_SIGHT_RANGE {
            return false;
        }
        ray_is_clear(grid, self.cell, player_cell)
    }

    fn pick_patrol_target(&mut self, grid: &Grid, rng: &mut u64) {
        for _ in 0..PATROL_TARGET_ATTEMPTS {
            let column = i64::from(self.cell.column()) + random_span_offset(rng);
            let row = i64::from(self.cell.row()) + random_span_offset(rng);
            let (Ok(column), Ok(row)) = (u32::try_from(column), u32::try_from(row)) else {
                continue;
            };

            let target = CellCoord::new(column, row);
            if !grid.is_walkable(target) {
                continue;
            }

            self.patrol_target = Some(target);
            self.motion.follow(find_path(grid, self.cell, target));
            return;
        }
    }

    fn abandon_lure(&mut self, out_events: &mut Vec<Event>) {
        self.target_donut = None;
        self.motion.clear();
        self.transition(MonsterState::Patrol, out_events);
    }

    fn step(&mut self, dt: Duration, speed: f32, out_events: &mut Vec<Event>) {
        if let Some(step) = self
            .motion
            .advance(&mut self.position, &mut self.cell, speed, dt)
        {
            out_events.push(Event::MonsterMoved {
                monster: self.id,
                from: step.from,
                to: step.to,
            });
        }
    }

    fn transition(&mut self, to: MonsterState, out_events: &mut Vec<Event>) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        out_events.push(Event::MonsterStateChanged {
            monster: self.id,
            from,
            to,
        });
    }
}

fn ray_is_clear(grid: &Grid, from: CellCoord, to: CellCoord) -> bool {
    let dx = i64::from(to.column()) - i64::from(from.column());
    let dy = i64::from(to.row()) - i64::from(from.row());
    let steps = dx.abs().max(dy.abs());

    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        let column = (from.column() as f32 + dx as f32 * t).round();
        let row = (from.row() as f32 + dy as f32 * t).round();
        if column < 0.0 || row < 0.0 {
            continue;
        }

        let sample = CellCoord::new(column as u32, row as u32);
        if grid.tile(sample) == Some(TileKind::Wall) {
            return false;
        }
    }

    true
}

/// Uniform offset in `-2..=2` drawn from the session RNG.
fn random_span_offset(rng: &mut u64) -> i64 {
    (next_random(rng) % 5) as i64 - 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use donut_panic_core::DonutKind;

    fn grid_from_rows(rows: &[&str]) -> Grid {
        let tiles = rows
            .iter()
            .flat_map(|row| {
                row.chars().map(|symbol| match symbol {
                    '#' => TileKind::Wall,
                    _ => TileKind::Floor,
                })
            })
            .collect();
        Grid::new(rows[0].len() as u32, rows.len() as u32, tiles)
    }

    fn monster_at(column: u32, row: u32) -> Monster {
        Monster::new(
            MonsterId::new(0),
            MonsterBreed::Normal,
            CellCoord::new(column, row),
        )
    }

    #[test]
    fn sight_requires_range_and_a_clear_ray() {
        let open = grid_from_rows(&["......."]);
        let monster = monster_at(0, 0);
        assert!(monster.sees_player(&open, CellCoord::new(5, 0)));
        assert!(!monster.sees_player(&open, CellCoord::new(6, 0)));

        let blocked = grid_from_rows(&[".#....."]);
        assert!(!monster.sees_player(&blocked, CellCoord::new(5, 0)));
    }

    #[test]
    fn sight_holds_on_shared_cell() {
        let grid = grid_from_rows(&["..."]);
        let monster = monster_at(1, 0);
        assert!(monster.sees_player(&grid, CellCoord::new(1, 0)));
    }

    #[test]
    fn seek_lure_prefers_the_nearest_candidate() {
        let grid = grid_from_rows(&[".......", "......."]);
        let mut monster = monster_at(0, 0);
        let mut donuts = vec![
            Donut::new(DonutId::new(0), DonutKind::Choco, CellCoord::new(3, 0)),
            Donut::new(DonutId::new(1), DonutKind::Choco, CellCoord::new(1, 0)),
        ];
        let mut events = Vec::new();

        assert!(monster.seek_lure(&grid, &mut donuts, &mut events));
        assert_eq!(monster.state, MonsterState::Lured);
        assert_eq!(monster.target_donut, Some(DonutId::new(1)));
        assert_eq!(donuts[1].reserved_by(), Some(monster.id));
        assert_eq!(donuts[0].reserved_by(), None);
    }

    #[test]
    fn seek_lure_ties_keep_scan_order() {
        let grid = grid_from_rows(&["...", "...", "..."]);
        let mut monster = monster_at(1, 1);
        let mut donuts = vec![
            Donut::new(DonutId::new(0), DonutKind::Choco, CellCoord::new(0, 1)),
            Donut::new(DonutId::new(1), DonutKind::Choco, CellCoord::new(2, 1)),
        ];
        let mut events = Vec::new();

        assert!(monster.seek_lure(&grid, &mut donuts, &mut events));
        assert_eq!(monster.target_donut, Some(DonutId::new(0)));
    }

    #[test]
    fn seek_lure_skips_donuts_reserved_by_others() {
        let grid = grid_from_rows(&["...."]);
        let mut monster = monster_at(0, 0);
        let mut donuts = vec![Donut::new(
            DonutId::new(0),
            DonutKind::Choco,
            CellCoord::new(2, 0),
        )];
        assert!(donuts[0].reserve(MonsterId::new(9)));

        let mut events = Vec::new();
        assert!(!monster.seek_lure(&grid, &mut donuts, &mut events));
        assert_eq!(monster.state, MonsterState::Patrol);
    }

    #[test]
    fn seek_lure_respects_the_effective_radius() {
        let grid = grid_from_rows(&["........"]);
        let mut monster = monster_at(0, 0);
        // Strawberry reaches 4.5 tiles; choco only 3.
        let mut far_choco = vec![Donut::new(
            DonutId::new(0),
            DonutKind::Choco,
            CellCoord::new(4, 0),
        )];
        let mut events = Vec::new();
        assert!(!monster.seek_lure(&grid, &mut far_choco, &mut events));

        let mut far_strawberry = vec![Donut::new(
            DonutId::new(1),
            DonutKind::Strawberry,
            CellCoord::new(4, 0),
        )];
        assert!(monster.seek_lure(&grid, &mut far_strawberry, &mut events));
    }

    #[test]
    fn lured_monster_abandons_a_vanished_donut() {
        let mut grid = grid_from_rows(&["...."]);
        let mut monster = monster_at(0, 0);
        let mut donuts = vec![Donut::new(
            DonutId::new(0),
            DonutKind::Choco,
            CellCoord::new(3, 0),
        )];
        let mut events = Vec::new();
        assert!(monster.seek_lure(&grid, &mut donuts, &mut events));

        donuts[0].consume();
        let mut rng = 1;
        monster.update(
            Duration::from_millis(16),
            &mut grid,
            CellCoord::new(3, 0),
            &mut donuts,
            &mut rng,
            &mut events,
        );

        assert_eq!(monster.state, MonsterState::Patrol);
        assert_eq!(monster.target_donut, None);
    }

    #[test]
    fn arrival_on_the_donut_cell_starts_eating() {
        let mut grid = grid_from_rows(&["...."]);
        let mut monster = monster_at(2, 0);
        let mut donuts = vec![Donut::new(
            DonutId::new(0),
            DonutKind::Choco,
            CellCoord::new(2, 0),
        )];
        let mut events = Vec::new();
        assert!(monster.seek_lure(&grid, &mut donuts, &mut events));

        let mut rng = 1;
        monster.update(
            Duration::from_millis(16),
            &mut grid,
            CellCoord::new(0, 0),
            &mut donuts,
            &mut rng,
            &mut events,
        );

        assert_eq!(monster.state, MonsterState::Eating);
        assert!(!donuts[0].is_active());
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::DonutConsumed { .. })));
    }

    #[test]
    fn finished_eating_marks_the_cell_as_a_wall() {
        let mut grid = grid_from_rows(&["...."]);
        let mut monster = monster_at(1, 0);
        monster.state = MonsterState::Eating;
        monster.eat_timer = Duration::from_millis(100);

        let mut donuts = Vec::new();
        let mut rng = 1;
        let mut events = Vec::new();
        monster.update(
            Duration::from_millis(150),
            &mut grid,
            CellCoord::new(3, 0),
            &mut donuts,
            &mut rng,
            &mut events,
        );

        assert_eq!(monster.state, MonsterState::Sleep);
        assert!(!grid.is_walkable(CellCoord::new(1, 0)));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::MonsterSlept { .. })));
    }

    #[test]
    fn patrol_targets_are_walkable_and_nearby() {
        let grid = grid_from_rows(&[
            "#####", //
            "#...#", //
            "#...#", //
            "#...#", //
            "#####",
        ]);
        let mut monster = monster_at(2, 2);
        let mut rng = 0x5eed;

        let mut picked = 0;
        for _ in 0..20 {
            monster.pick_patrol_target(&grid, &mut rng);
            if let Some(target) = monster.patrol_target {
                picked += 1;
                assert!(grid.is_walkable(target));
                assert!(monster.cell.manhattan_distance(target) <= 4);
            }
        }
        assert!(picked > 0, "open floor should yield patrol targets");
    }

    #[test]
    fn lost_sight_forces_an_immediate_patrol_retarget() {
        let mut grid = grid_from_rows(&["........."]);
        let mut monster = monster_at(0, 0);
        monster.state = MonsterState::Chase;

        let mut donuts = Vec::new();
        let mut rng = 1;
        let mut events = Vec::new();
        // Player far outside sight range.
        monster.update(
            Duration::from_millis(16),
            &mut grid,
            CellCoord::new(8, 0),
            &mut donuts,
            &mut rng,
            &mut events,
        );

        assert_eq!(monster.state, MonsterState::Patrol);
        assert_eq!(monster.patrol_timer, PATROL_REDIRECT_INTERVAL);
    }
}
