#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Donut Panic engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the session executes those commands
//! via its `apply` entry point, and then broadcasts [`Event`] values for
//! systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base lure radius measured in tiles before kind multipliers apply.
pub const DEFAULT_LURE_RADIUS: f32 = 3.0;

/// Base duration a monster spends consuming a donut before kind multipliers.
pub const DEFAULT_EAT_DURATION: Duration = Duration::from_secs(3);

/// Eat duration used when a donut kind drops the monster straight into sleep.
pub const INSTANT_SLEEP_EAT_DURATION: Duration = Duration::from_millis(500);

/// Lifetime of a placed donut before it expires and vanishes.
pub const DONUT_LIFETIME: Duration = Duration::from_secs(10);

/// Player movement speed measured in tiles per second.
pub const PLAYER_SPEED: f32 = 5.0;

/// Manhattan distance within which a monster can spot the player.
pub const CHASE_SIGHT_RANGE: u32 = 5;

/// Interval after which a patrolling monster picks a fresh wander target.
pub const PATROL_REDIRECT_INTERVAL: Duration = Duration::from_secs(2);

/// Upper bound applied to a single frame delta to prevent teleport jumps.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(50);

/// Maximum number of awake monsters a session will host at once.
pub const MAX_ACTIVE_MONSTERS: usize = 6;

/// Minimum Manhattan distance between the player and a reinforcement spawn.
pub const MIN_REINFORCEMENT_DISTANCE: u32 = 4;

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the entire session with a freshly validated level.
    LoadLevel {
        /// Level description to validate and instantiate.
        blueprint: LevelBlueprint,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player advance one tile in the given direction.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests placement of a donut at the player's current cell.
    PlaceDonut {
        /// Kind of donut drawn from the inventory.
        kind: DonutKind,
    },
    /// Requests that a reinforcement monster join the session.
    SpawnMonster {
        /// Cell the monster should appear on.
        cell: CellCoord,
        /// Breed to assign to the spawned monster.
        breed: MonsterBreed,
    },
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a level was validated and the session rebuilt.
    LevelLoaded {
        /// Display name carried by the level blueprint.
        name: String,
    },
    /// Reports that a level blueprint failed validation and was discarded.
    LevelRejected {
        /// Specific reason the blueprint was rejected.
        reason: LevelError,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Clamped duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player arrived on a new grid cell.
    PlayerMoved {
        /// Cell the player occupied before the step completed.
        from: CellCoord,
        /// Cell the player occupies after the step completed.
        to: CellCoord,
    },
    /// Reports that a player movement intent was rejected.
    PlayerMoveRejected {
        /// Direction provided in the movement request.
        direction: Direction,
        /// Specific reason the movement failed.
        reason: MoveRejection,
    },
    /// Confirms that a donut was placed into the maze.
    DonutPlaced {
        /// Identifier assigned to the donut by the session.
        donut: DonutId,
        /// Kind of donut that was placed.
        kind: DonutKind,
        /// Cell the donut occupies.
        cell: CellCoord,
    },
    /// Reports that a donut placement request was rejected.
    DonutRejected {
        /// Kind of donut requested for placement.
        kind: DonutKind,
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: DonutRejection,
    },
    /// Confirms that a monster claimed exclusive pursuit of a donut.
    DonutReserved {
        /// Identifier of the reserved donut.
        donut: DonutId,
        /// Monster now holding the reservation.
        by: MonsterId,
    },
    /// Confirms that a monster began consuming a donut.
    DonutConsumed {
        /// Identifier of the consumed donut.
        donut: DonutId,
        /// Monster performing the consumption.
        by: MonsterId,
    },
    /// Reports that a donut's lifetime ran out before being eaten.
    DonutExpired {
        /// Identifier of the expired donut.
        donut: DonutId,
    },
    /// Confirms that a monster joined the session.
    MonsterSpawned {
        /// Identifier assigned to the monster by the session.
        monster: MonsterId,
        /// Breed assigned to the monster.
        breed: MonsterBreed,
        /// Cell the monster occupies after spawning.
        cell: CellCoord,
    },
    /// Confirms that a monster arrived on a new grid cell.
    MonsterMoved {
        /// Identifier of the monster that advanced.
        monster: MonsterId,
        /// Cell the monster occupied before the step completed.
        from: CellCoord,
        /// Cell the monster occupies after the step completed.
        to: CellCoord,
    },
    /// Announces a monster state machine transition.
    MonsterStateChanged {
        /// Identifier of the monster that transitioned.
        monster: MonsterId,
        /// State the monster left.
        from: MonsterState,
        /// State the monster entered.
        to: MonsterState,
    },
    /// Reports that a monster fell asleep and its cell became a wall.
    MonsterSlept {
        /// Identifier of the dormant monster.
        monster: MonsterId,
        /// Cell that was permanently marked unwalkable.
        cell: CellCoord,
    },
    /// Announces that the player reached the goal and the session froze.
    LevelCleared {
        /// Total simulated time the run took.
        elapsed: Duration,
    },
    /// Announces that a monster caught the player and the session froze.
    PlayerCaught {
        /// Identifier of the monster that reached the player's cell.
        by: MonsterId,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Continuous position expressed in tile units, used for rendering and
/// sub-tile interpolation between grid cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPoint {
    x: f32,
    y: f32,
}

impl CellPoint {
    /// Creates a new continuous position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Creates a continuous position aligned exactly with a grid cell.
    #[must_use]
    pub fn from_cell(cell: CellCoord) -> Self {
        Self {
            x: cell.column() as f32,
            y: cell.row() as f32,
        }
    }

    /// Horizontal position measured in tile units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical position measured in tile units.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Returns the cell one step away in this direction, if it exists.
    ///
    /// Steps that would leave the coordinate space (negative indices)
    /// produce `None`; upper grid bounds are the caller's concern.
    #[must_use]
    pub fn step_from(self, cell: CellCoord) -> Option<CellCoord> {
        match self {
            Self::North => cell
                .row()
                .checked_sub(1)
                .map(|row| CellCoord::new(cell.column(), row)),
            Self::East => cell
                .column()
                .checked_add(1)
                .map(|column| CellCoord::new(column, cell.row())),
            Self::South => cell
                .row()
                .checked_add(1)
                .map(|row| CellCoord::new(cell.column(), row)),
            Self::West => cell
                .column()
                .checked_sub(1)
                .map(|column| CellCoord::new(column, cell.row())),
        }
    }
}

/// Unique identifier assigned to a monster, never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(u32);

impl MonsterId {
    /// Creates a new monster identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a donut, never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DonutId(u32);

impl DonutId {
    /// Creates a new donut identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Runtime tile classification of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Traversable floor.
    Floor,
    /// Impassable wall, including cells claimed by sleeping monsters.
    Wall,
    /// Traversable goal cell the player must reach.
    Goal,
}

/// Flavors of donut the player can place as lures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DonutKind {
    /// Baseline donut with no special effects.
    Choco,
    /// Wide-radius donut that keeps monsters eating twice as long.
    Strawberry,
    /// Donut that drops its eater straight into sleep.
    Matcha,
}

impl DonutKind {
    /// Every donut kind in inventory order.
    pub const ALL: [DonutKind; 3] = [Self::Choco, Self::Strawberry, Self::Matcha];

    /// Factor applied to [`DEFAULT_LURE_RADIUS`] for this kind.
    #[must_use]
    pub const fn lure_radius_multiplier(self) -> f32 {
        match self {
            Self::Choco | Self::Matcha => 1.0,
            Self::Strawberry => 1.5,
        }
    }

    /// Factor applied to [`DEFAULT_EAT_DURATION`] for this kind.
    #[must_use]
    pub const fn eat_duration_multiplier(self) -> f32 {
        match self {
            Self::Choco | Self::Matcha => 1.0,
            Self::Strawberry => 2.0,
        }
    }

    /// Whether eating this kind sends the monster to sleep almost instantly.
    #[must_use]
    pub const fn instant_sleep(self) -> bool {
        matches!(self, Self::Matcha)
    }

    /// Effective lure radius in tiles for donuts of this kind.
    #[must_use]
    pub fn lure_radius(self) -> f32 {
        DEFAULT_LURE_RADIUS * self.lure_radius_multiplier()
    }

    /// Time a monster spends eating a donut of this kind.
    #[must_use]
    pub fn eat_duration(self) -> Duration {
        if self.instant_sleep() {
            INSTANT_SLEEP_EAT_DURATION
        } else {
            DEFAULT_EAT_DURATION.mul_f32(self.eat_duration_multiplier())
        }
    }
}

/// Breeds of monster, differing only in movement speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterBreed {
    /// Standard patrolling monster.
    Normal,
    /// Faster monster seeded from dedicated level markers.
    Dash,
}

impl MonsterBreed {
    /// Wandering speed measured in tiles per second.
    #[must_use]
    pub const fn patrol_speed(self) -> f32 {
        match self {
            Self::Normal => 1.8,
            Self::Dash => 2.6,
        }
    }

    /// Pursuit speed measured in tiles per second.
    #[must_use]
    pub const fn chase_speed(self) -> f32 {
        match self {
            Self::Normal => 2.8,
            Self::Dash => 3.6,
        }
    }
}

/// States of the monster behavior machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MonsterState {
    /// Wandering between random nearby targets.
    Patrol,
    /// Pursuing the player after a line-of-sight detection.
    Chase,
    /// Approaching a reserved donut.
    Lured,
    /// Consuming a donut on the spot.
    Eating,
    /// Terminal dormancy; the monster acts as a permanent wall.
    Sleep,
}

impl MonsterState {
    /// Whether a monster in this state can trigger the loss condition.
    ///
    /// A monster mid-consumption or dormant cannot catch the player even
    /// when sharing the player's cell.
    #[must_use]
    pub const fn can_catch_player(self) -> bool {
        !matches!(self, Self::Eating | Self::Sleep)
    }
}

/// Reasons a player movement intent may be rejected by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// The session already concluded; the simulation is frozen.
    SessionOver,
    /// A previous step is still in flight.
    MoveInFlight,
    /// The target cell lies outside the grid.
    OutOfBounds,
    /// The target cell is a wall.
    Wall,
    /// The target cell holds a sleeping monster.
    SleepingMonster,
}

/// Reasons a donut placement request may be rejected by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DonutRejection {
    /// The session already concluded; the simulation is frozen.
    SessionOver,
    /// The inventory holds no donuts of the requested kind.
    OutOfStock,
    /// An active donut already occupies the player's cell.
    CellOccupied,
}

/// Overall result state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The session is live and accepting input.
    Playing,
    /// The player reached the goal; the simulation is frozen.
    Cleared,
    /// A monster caught the player; the simulation is frozen.
    GameOver,
}

/// Per-kind donut counts carried by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DonutInventory {
    choco: u32,
    strawberry: u32,
    matcha: u32,
}

impl DonutInventory {
    /// Creates an inventory with explicit per-kind counts.
    #[must_use]
    pub const fn new(choco: u32, strawberry: u32, matcha: u32) -> Self {
        Self {
            choco,
            strawberry,
            matcha,
        }
    }

    /// Remaining donuts of the provided kind.
    #[must_use]
    pub const fn count(&self, kind: DonutKind) -> u32 {
        match kind {
            DonutKind::Choco => self.choco,
            DonutKind::Strawberry => self.strawberry,
            DonutKind::Matcha => self.matcha,
        }
    }

    /// Removes one donut of the provided kind.
    ///
    /// Returns `false` without mutating the inventory when the kind is out
    /// of stock.
    pub fn take(&mut self, kind: DonutKind) -> bool {
        let slot = match kind {
            DonutKind::Choco => &mut self.choco,
            DonutKind::Strawberry => &mut self.strawberry,
            DonutKind::Matcha => &mut self.matcha,
        };
        match slot.checked_sub(1) {
            Some(remaining) => {
                *slot = remaining;
                true
            }
            None => false,
        }
    }
}

/// Externally supplied level description awaiting validation.
///
/// Rows are symbol strings consumed once at load time: `#` wall, `.` floor,
/// `P` player start, `G` goal, `M` monster start, `D` dash monster start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBlueprint {
    /// Display name of the level.
    pub name: String,
    /// Symbol rows describing the tile grid and spawn markers.
    pub rows: Vec<String>,
    /// Donut counts the player starts with.
    pub donuts: DonutInventory,
}

/// Reasons a level blueprint fails validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The blueprint contains no rows or a zero-width row.
    #[error("level grid is empty")]
    EmptyGrid,
    /// A row's length differs from the first row's length.
    #[error("row {row} does not match the grid width")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: u32,
    },
    /// A row contains a symbol outside the blueprint alphabet.
    #[error("unknown symbol {symbol:?} at column {column}, row {row}")]
    UnknownSymbol {
        /// Symbol that failed to parse.
        symbol: char,
        /// Zero-based column index of the symbol.
        column: u32,
        /// Zero-based row index of the symbol.
        row: u32,
    },
    /// No `P` marker was found.
    #[error("level has no player start marker")]
    MissingPlayerStart,
    /// More than one `P` marker was found.
    #[error("level has more than one player start marker")]
    DuplicatePlayerStart,
    /// No `G` marker was found.
    #[error("level has no goal marker")]
    MissingGoal,
    /// More than one `G` marker was found.
    #[error("level has more than one goal marker")]
    DuplicateGoal,
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Grid cell currently occupied by the player.
    pub cell: CellCoord,
    /// Continuous position used for rendering interpolation.
    pub position: CellPoint,
    /// Indicates whether a step is currently in flight.
    pub moving: bool,
    /// Indicates whether the player has not been caught.
    pub alive: bool,
}

/// Immutable representation of a single monster's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterSnapshot {
    /// Unique identifier assigned to the monster.
    pub id: MonsterId,
    /// Breed assigned to the monster.
    pub breed: MonsterBreed,
    /// Grid cell currently occupied by the monster.
    pub cell: CellCoord,
    /// Continuous position used for rendering interpolation.
    pub position: CellPoint,
    /// Current behavior state.
    pub state: MonsterState,
    /// Donut the monster is pursuing, if any.
    pub target_donut: Option<DonutId>,
}

/// Read-only snapshot describing all monsters within the maze.
#[derive(Clone, Debug, Default)]
pub struct MonsterView {
    snapshots: Vec<MonsterSnapshot>,
}

impl MonsterView {
    /// Creates a new monster view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MonsterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured monster snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &MonsterSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MonsterSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single donut's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DonutSnapshot {
    /// Unique identifier assigned to the donut.
    pub id: DonutId,
    /// Kind of the donut.
    pub kind: DonutKind,
    /// Grid cell the donut occupies.
    pub cell: CellCoord,
    /// Whether the donut still attracts monsters.
    pub active: bool,
    /// Monster holding the exclusive reservation, if any.
    pub reserved_by: Option<MonsterId>,
    /// Lifetime remaining before the donut expires.
    pub remaining: Duration,
}

/// Read-only snapshot describing all donuts within the maze.
#[derive(Clone, Debug, Default)]
pub struct DonutView {
    snapshots: Vec<DonutSnapshot>,
}

impl DonutView {
    /// Creates a new donut view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<DonutSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured donut snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &DonutSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<DonutSnapshot> {
        self.snapshots
    }
}
