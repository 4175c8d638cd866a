#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Donut Panic.
//!
//! The session owns the grid, the player, the monsters, and the placed
//! donuts. Adapters mutate it exclusively through [`apply`]; every tick
//! runs the same fixed sequence (player motion, donut lifetimes, monsters
//! in list order, then the win/lose checks) and that ordering is a
//! contract: a monster reacts to a donut placed or expired earlier in the
//! same tick, and outcome evaluation always sees post-movement positions.

use std::time::Duration;

use donut_panic_core::{
    CellCoord, CellPoint, Command, Direction, DonutId, DonutInventory, DonutKind, DonutRejection,
    Event, MonsterBreed, MonsterId, MonsterState, MoveRejection, Outcome, TileKind,
    MAX_ACTIVE_MONSTERS, MAX_FRAME_DELTA, MIN_REINFORCEMENT_DISTANCE, PLAYER_SPEED,
};

mod donut;
mod grid;
pub mod level;
pub mod levels;
mod monster;
mod motion;
pub mod pathfinding;

pub use grid::Grid;

use donut::Donut;
use monster::Monster;
use motion::Motion;

const PATROL_RNG_SEED: u64 = 0x9d6a_77f2_1c03_5b41;

/// Represents the authoritative Donut Panic session state.
#[derive(Debug)]
pub struct World {
    name: String,
    grid: Grid,
    goal: CellCoord,
    player: Player,
    monsters: Vec<Monster>,
    donuts: Vec<Donut>,
    inventory: DonutInventory,
    elapsed: Duration,
    outcome: Outcome,
    tick_index: u64,
    rng_state: u64,
    next_monster_id: u32,
    next_donut_id: u32,
}

impl World {
    /// Creates a session running the bundled first stage.
    #[must_use]
    pub fn new() -> Self {
        let level =
            level::validate(&levels::first_stage()).expect("bundled stage blueprint is valid");
        Self::from_level(level)
    }

    /// Creates a session from a validated level.
    #[must_use]
    pub fn from_level(level: level::Level) -> Self {
        let (name, grid, player_start, goal, monster_starts, inventory) = level.into_parts();

        let mut monsters = Vec::with_capacity(monster_starts.len());
        let mut next_monster_id = 0;
        for (cell, breed) in monster_starts {
            monsters.push(Monster::new(MonsterId::new(next_monster_id), breed, cell));
            next_monster_id += 1;
        }

        Self {
            name,
            grid,
            goal,
            player: Player::new(player_start),
            monsters,
            donuts: Vec::new(),
            inventory,
            elapsed: Duration::ZERO,
            outcome: Outcome::Playing,
            tick_index: 0,
            rng_state: PATROL_RNG_SEED,
            next_monster_id,
            next_donut_id: 0,
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.outcome != Outcome::Playing {
            return;
        }

        let dt = dt.min(MAX_FRAME_DELTA);
        self.tick_index = self.tick_index.saturating_add(1);
        self.elapsed = self.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        self.player.update(dt, out_events);

        for donut in &mut self.donuts {
            if donut.tick(dt) {
                out_events.push(Event::DonutExpired { donut: donut.id() });
            }
        }

        let player_cell = self.player.cell;
        for monster in self.monsters.iter_mut() {
            if monster.state == MonsterState::Sleep {
                continue;
            }
            monster.update(
                dt,
                &mut self.grid,
                player_cell,
                &mut self.donuts,
                &mut self.rng_state,
                out_events,
            );
        }

        self.resolve_outcome(out_events);
    }

    fn resolve_outcome(&mut self, out_events: &mut Vec<Event>) {
        if self.player.cell == self.goal {
            self.outcome = Outcome::Cleared;
            out_events.push(Event::LevelCleared {
                elapsed: self.elapsed,
            });
            return;
        }

        let caught_by = self
            .monsters
            .iter()
            .find(|monster| monster.state.can_catch_player() && monster.cell == self.player.cell);
        if let Some(monster) = caught_by {
            self.outcome = Outcome::GameOver;
            self.player.alive = false;
            out_events.push(Event::PlayerCaught { by: monster.id });
        }
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let mut reject = |reason| {
            out_events.push(Event::PlayerMoveRejected { direction, reason });
        };

        if self.outcome != Outcome::Playing {
            reject(MoveRejection::SessionOver);
            return;
        }

        if self.player.is_moving() {
            reject(MoveRejection::MoveInFlight);
            return;
        }

        let Some(target) = direction.step_from(self.player.cell) else {
            reject(MoveRejection::OutOfBounds);
            return;
        };

        let Some(tile) = self.grid.tile(target) else {
            reject(MoveRejection::OutOfBounds);
            return;
        };

        // A sleeping monster's cell is also a wall in the grid; report the
        // more specific reason first.
        if self
            .monsters
            .iter()
            .any(|monster| monster.state == MonsterState::Sleep && monster.cell == target)
        {
            reject(MoveRejection::SleepingMonster);
            return;
        }

        if tile == TileKind::Wall {
            reject(MoveRejection::Wall);
            return;
        }

        // Adjacent walkable targets always yield a one-step path.
        let _ = self.player.set_target(&self.grid, target);
    }

    fn place_donut(&mut self, kind: DonutKind, out_events: &mut Vec<Event>) {
        let cell = self.player.cell;
        let mut reject = |reason| {
            out_events.push(Event::DonutRejected { kind, cell, reason });
        };

        if self.outcome != Outcome::Playing {
            reject(DonutRejection::SessionOver);
            return;
        }

        if self
            .donuts
            .iter()
            .any(|donut| donut.is_active() && donut.cell() == cell)
        {
            reject(DonutRejection::CellOccupied);
            return;
        }

        if !self.inventory.take(kind) {
            reject(DonutRejection::OutOfStock);
            return;
        }

        let id = DonutId::new(self.next_donut_id);
        self.next_donut_id += 1;
        self.donuts.push(Donut::new(id, kind, cell));
        out_events.push(Event::DonutPlaced {
            donut: id,
            kind,
            cell,
        });
    }

    fn spawn_monster(&mut self, cell: CellCoord, breed: MonsterBreed, out_events: &mut Vec<Event>) {
        // Ineligible spawns are skipped silently; the reinforcement system
        // retries on its next interval.
        if !self.spawn_cell_eligible(cell) {
            return;
        }

        let id = MonsterId::new(self.next_monster_id);
        self.next_monster_id += 1;
        self.monsters.push(Monster::new(id, breed, cell));
        out_events.push(Event::MonsterSpawned {
            monster: id,
            breed,
            cell,
        });
    }

    fn awake_monster_count(&self) -> usize {
        self.monsters
            .iter()
            .filter(|monster| monster.state != MonsterState::Sleep)
            .count()
    }

    fn spawn_cell_eligible(&self, cell: CellCoord) -> bool {
        self.outcome == Outcome::Playing
            && self.awake_monster_count() < MAX_ACTIVE_MONSTERS
            && self.grid.is_walkable(cell)
            && cell != self.goal
            && self.player.cell.manhattan_distance(cell) >= MIN_REINFORCEMENT_DISTANCE
            && !self.monsters.iter().any(|monster| monster.cell == cell)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the session, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { blueprint } => match level::validate(&blueprint) {
            Ok(level) => {
                *world = World::from_level(level);
                out_events.push(Event::LevelLoaded {
                    name: world.name.clone(),
                });
                for monster in &world.monsters {
                    out_events.push(Event::MonsterSpawned {
                        monster: monster.id,
                        breed: monster.breed,
                        cell: monster.cell,
                    });
                }
            }
            Err(reason) => out_events.push(Event::LevelRejected { reason }),
        },
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::PlaceDonut { kind } => world.place_donut(kind, out_events),
        Command::SpawnMonster { cell, breed } => world.spawn_monster(cell, breed, out_events),
    }
}

pub(crate) fn next_random(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1);
    *state
}

#[derive(Clone, Debug)]
struct Player {
    cell: CellCoord,
    position: CellPoint,
    motion: Motion,
    alive: bool,
}

impl Player {
    fn new(cell: CellCoord) -> Self {
        Self {
            cell,
            position: CellPoint::from_cell(cell),
            motion: Motion::idle(),
            alive: true,
        }
    }

    fn is_moving(&self) -> bool {
        self.motion.is_moving()
    }

    /// Computes a fresh route to the target and begins motion only when a
    /// non-empty path comes back.
    fn set_target(&mut self, grid: &Grid, target: CellCoord) -> bool {
        let path = pathfinding::find_path(grid, self.cell, target);
        if path.is_empty() {
            return false;
        }
        self.motion.follow(path);
        true
    }

    fn update(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if let Some(step) = self
            .motion
            .advance(&mut self.position, &mut self.cell, PLAYER_SPEED, dt)
        {
            out_events.push(Event::PlayerMoved {
                from: step.from,
                to: step.to,
            });
        }

        if !self.motion.is_moving() {
            self.motion.clear();
        }
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use super::{pathfinding, Grid, World};
    use donut_panic_core::{
        CellCoord, DonutInventory, DonutSnapshot, DonutView, MonsterSnapshot, MonsterView, Outcome,
        PlayerSnapshot,
    };
    use std::time::Duration;

    /// Display name of the loaded level.
    #[must_use]
    pub fn level_name(world: &World) -> &str {
        &world.name
    }

    /// Provides read-only access to the session's tile grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Cell the player must reach to clear the level.
    #[must_use]
    pub fn goal(world: &World) -> CellCoord {
        world.goal
    }

    /// Current result state of the session.
    #[must_use]
    pub fn outcome(world: &World) -> Outcome {
        world.outcome
    }

    /// Simulated time accumulated since the level was loaded.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Donut counts remaining in the player's inventory.
    #[must_use]
    pub fn inventory(world: &World) -> DonutInventory {
        world.inventory
    }

    /// Captures a read-only snapshot of the player.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            cell: world.player.cell,
            position: world.player.position,
            moving: world.player.is_moving(),
            alive: world.player.alive,
        }
    }

    /// Captures a read-only view of the monsters inhabiting the maze.
    #[must_use]
    pub fn monster_view(world: &World) -> MonsterView {
        MonsterView::from_snapshots(
            world
                .monsters
                .iter()
                .map(|monster| MonsterSnapshot {
                    id: monster.id,
                    breed: monster.breed,
                    cell: monster.cell,
                    position: monster.position,
                    state: monster.state,
                    target_donut: monster.target_donut,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the placed donuts.
    #[must_use]
    pub fn donut_view(world: &World) -> DonutView {
        DonutView::from_snapshots(
            world
                .donuts
                .iter()
                .map(|donut| DonutSnapshot {
                    id: donut.id(),
                    kind: donut.kind(),
                    cell: donut.cell(),
                    active: donut.is_active(),
                    reserved_by: donut.reserved_by(),
                    remaining: donut.remaining(),
                })
                .collect(),
        )
    }

    /// Enumerates the cells where a reinforcement monster may appear.
    ///
    /// A cell qualifies when the session is live, the awake-monster cap has
    /// headroom, the cell is walkable, is not the goal, holds no monster,
    /// and keeps the minimum distance from the player.
    #[must_use]
    pub fn reinforcement_candidates(world: &World) -> Vec<CellCoord> {
        let mut candidates = Vec::new();
        for row in 0..world.grid.rows() {
            for column in 0..world.grid.columns() {
                let cell = CellCoord::new(column, row);
                if world.spawn_cell_eligible(cell) {
                    candidates.push(cell);
                }
            }
        }
        candidates
    }

    /// Shortest route from the player's cell to the goal, if one exists.
    #[must_use]
    pub fn route_to_goal(world: &World) -> Vec<CellCoord> {
        pathfinding::find_path(&world.grid, world.player.cell, world.goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use donut_panic_core::LevelBlueprint;

    fn blueprint(rows: &[&str], donuts: DonutInventory) -> LevelBlueprint {
        LevelBlueprint {
            name: "test".to_owned(),
            rows: rows.iter().map(|row| (*row).to_owned()).collect(),
            donuts,
        }
    }

    fn world_from(rows: &[&str], donuts: DonutInventory) -> World {
        let level = level::validate(&blueprint(rows, donuts)).expect("test level is valid");
        World::from_level(level)
    }

    fn tick_events(world: &mut World, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::Tick { dt }, &mut events);
        events
    }

    const FRAME: Duration = Duration::from_millis(50);

    #[test]
    fn load_level_reports_spawned_monsters() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadLevel {
                blueprint: blueprint(&["P.M.G"], DonutInventory::default()),
            },
            &mut events,
        );

        assert_eq!(
            events[0],
            Event::LevelLoaded {
                name: "test".to_owned()
            }
        );
        assert!(matches!(events[1], Event::MonsterSpawned { .. }));
        assert_eq!(query::monster_view(&world).into_vec().len(), 1);
    }

    #[test]
    fn invalid_level_is_rejected_without_touching_the_session() {
        let mut world = world_from(&["P.G"], DonutInventory::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadLevel {
                blueprint: blueprint(&["..."], DonutInventory::default()),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::LevelRejected {
                reason: donut_panic_core::LevelError::MissingPlayerStart
            }]
        );
        assert_eq!(query::level_name(&world), "test");
        assert_eq!(query::outcome(&world), Outcome::Playing);
    }

    #[test]
    fn frame_delta_is_clamped() {
        let mut world = world_from(&["P.G"], DonutInventory::default());
        let events = tick_events(&mut world, Duration::from_secs(5));

        assert_eq!(events, vec![Event::TimeAdvanced { dt: MAX_FRAME_DELTA }]);
        assert_eq!(query::elapsed(&world), MAX_FRAME_DELTA);
    }

    #[test]
    fn moves_into_walls_are_rejected() {
        let mut world = world_from(&["P#G", "..."], DonutInventory::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::PlayerMoveRejected {
                direction: Direction::East,
                reason: MoveRejection::Wall
            }]
        );
    }

    #[test]
    fn moves_off_the_grid_are_rejected() {
        let mut world = world_from(&["P.G"], DonutInventory::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::North,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::South,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::PlayerMoveRejected {
                    direction: Direction::North,
                    reason: MoveRejection::OutOfBounds
                },
                Event::PlayerMoveRejected {
                    direction: Direction::South,
                    reason: MoveRejection::OutOfBounds
                },
            ]
        );
    }

    #[test]
    fn a_second_move_while_in_flight_is_rejected() {
        let mut world = world_from(&["P..G"], DonutInventory::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );
        assert!(events.is_empty(), "accepted moves emit no immediate event");

        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::PlayerMoveRejected {
                direction: Direction::East,
                reason: MoveRejection::MoveInFlight
            }]
        );

        // Four clamped frames at 5 tiles/s cover the one-tile step.
        let mut arrived = false;
        for _ in 0..4 {
            arrived = tick_events(&mut world, FRAME)
                .iter()
                .any(|event| matches!(event, Event::PlayerMoved { .. }));
        }
        assert!(arrived);
        assert_eq!(query::player(&world).cell, CellCoord::new(1, 0));
        assert!(!query::player(&world).moving);
    }

    #[test]
    fn donut_placement_consumes_inventory_and_rejects_stacking() {
        let mut world = world_from(&["P..G"], DonutInventory::new(0, 2, 0));
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceDonut {
                kind: DonutKind::Strawberry,
            },
            &mut events,
        );
        assert!(matches!(events[0], Event::DonutPlaced { .. }));
        assert_eq!(query::inventory(&world).count(DonutKind::Strawberry), 1);

        events.clear();
        apply(
            &mut world,
            Command::PlaceDonut {
                kind: DonutKind::Strawberry,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::DonutRejected {
                kind: DonutKind::Strawberry,
                cell: CellCoord::new(0, 0),
                reason: DonutRejection::CellOccupied
            }]
        );
    }

    #[test]
    fn empty_inventory_rejects_placement() {
        let mut world = world_from(&["P..G"], DonutInventory::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceDonut {
                kind: DonutKind::Choco,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::DonutRejected {
                kind: DonutKind::Choco,
                cell: CellCoord::new(0, 0),
                reason: DonutRejection::OutOfStock
            }]
        );
    }

    #[test]
    fn reaching_the_goal_clears_and_freezes_the_session() {
        let mut world = world_from(&["P.G"], DonutInventory::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );
        for _ in 0..4 {
            let _ = tick_events(&mut world, FRAME);
        }
        // Not yet: the player stands one cell short of the goal.
        assert_eq!(query::outcome(&world), Outcome::Playing);

        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );
        let mut cleared = Vec::new();
        for _ in 0..4 {
            cleared.extend(tick_events(&mut world, FRAME));
        }

        assert_eq!(query::outcome(&world), Outcome::Cleared);
        assert!(cleared
            .iter()
            .any(|event| matches!(event, Event::LevelCleared { .. })));

        // The simulation is frozen: further ticks emit nothing.
        assert!(tick_events(&mut world, FRAME).is_empty());
    }

    #[test]
    fn a_chasing_monster_on_the_player_cell_ends_the_session() {
        let mut world = world_from(&["P.M..G"], DonutInventory::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );

        // The monster spots the player immediately, replans on its chase
        // cadence, and closes the single-tile gap.
        let mut all_events = Vec::new();
        for _ in 0..24 {
            all_events.extend(tick_events(&mut world, FRAME));
        }

        assert_eq!(query::outcome(&world), Outcome::GameOver);
        assert!(!query::player(&world).alive);
        assert!(all_events
            .iter()
            .any(|event| matches!(event, Event::PlayerCaught { .. })));
    }

    #[test]
    fn spawn_commands_respect_eligibility() {
        let mut world = world_from(
            &["P.........", "..........", ".........G"],
            DonutInventory::default(),
        );
        let mut events = Vec::new();

        // Too close to the player.
        apply(
            &mut world,
            Command::SpawnMonster {
                cell: CellCoord::new(2, 0),
                breed: MonsterBreed::Normal,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert!(query::monster_view(&world).into_vec().is_empty());

        // Far enough away.
        apply(
            &mut world,
            Command::SpawnMonster {
                cell: CellCoord::new(8, 2),
                breed: MonsterBreed::Normal,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::MonsterSpawned {
                monster: MonsterId::new(0),
                breed: MonsterBreed::Normal,
                cell: CellCoord::new(8, 2)
            }]
        );

        // Occupied cells are skipped.
        events.clear();
        apply(
            &mut world,
            Command::SpawnMonster {
                cell: CellCoord::new(8, 2),
                breed: MonsterBreed::Normal,
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn reinforcement_candidates_keep_their_distance() {
        let world = world_from(
            &["P.........", "..........", ".........G"],
            DonutInventory::default(),
        );
        let player = query::player(&world).cell;
        let candidates = query::reinforcement_candidates(&world);

        assert!(!candidates.is_empty());
        for cell in candidates {
            assert!(query::grid(&world).is_walkable(cell));
            assert!(player.manhattan_distance(cell) >= MIN_REINFORCEMENT_DISTANCE);
        }
    }

    #[test]
    fn identical_command_sequences_replay_identically() {
        let script = |world: &mut World| {
            let mut events = Vec::new();
            apply(
                world,
                Command::MovePlayer {
                    direction: Direction::South,
                },
                &mut events,
            );
            apply(
                world,
                Command::PlaceDonut {
                    kind: DonutKind::Strawberry,
                },
                &mut events,
            );
            for _ in 0..120 {
                apply(world, Command::Tick { dt: FRAME }, &mut events);
            }
            events
        };

        let mut first = World::new();
        let mut second = World::new();
        assert_eq!(script(&mut first), script(&mut second));
    }

    #[test]
    fn goal_cell_is_never_a_spawn_candidate() {
        let world = world_from(
            &["P.........", "..........", ".........G"],
            DonutInventory::default(),
        );
        let goal = query::goal(&world);
        assert!(!query::reinforcement_candidates(&world).contains(&goal));
    }
}
