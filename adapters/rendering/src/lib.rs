#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Donut Panic adapters.
//!
//! The simulation emits no pixels. Backends consume [`Scene`] descriptors
//! carrying per-entity grid positions, continuous positions, and visual
//! state tags, and decide for themselves how to draw them.

use anyhow::Result as AnyResult;
use donut_panic_core::{
    CellCoord, CellPoint, Direction, DonutInventory, DonutKind, DonutSnapshot, MonsterBreed,
    MonsterId, MonsterSnapshot, MonsterState, Outcome, PlayerSnapshot, TileKind, DONUT_LIFETIME,
};
use glam::Vec2;
use std::time::Duration;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Fixed palette shared by backends.
pub mod palette {
    use super::Color;

    /// Backdrop behind the maze.
    pub const BACKGROUND: Color = Color::from_rgb_u8(0x1a, 0x0a, 0x2e);
    /// Light floor tile.
    pub const FLOOR: Color = Color::from_rgb_u8(0xf5, 0xe6, 0xc8);
    /// Dark floor tile used for the checker pattern.
    pub const FLOOR_ALT: Color = Color::from_rgb_u8(0xed, 0xd9, 0xb5);
    /// Wall fill.
    pub const WALL: Color = Color::from_rgb_u8(0xc4, 0x93, 0x5a);
    /// Goal marker.
    pub const GOAL: Color = Color::from_rgb_u8(0xff, 0x88, 0xaa);
    /// Chocolate donut body.
    pub const CHOCO: Color = Color::from_rgb_u8(0x6b, 0x42, 0x26);
    /// Strawberry donut body.
    pub const STRAWBERRY: Color = Color::from_rgb_u8(0xcc, 0x33, 0x77);
    /// Matcha donut body.
    pub const MATCHA: Color = Color::from_rgb_u8(0x7b, 0xa0, 0x5b);
}

/// Body color for a donut of the provided kind.
#[must_use]
pub const fn donut_color(kind: DonutKind) -> Color {
    match kind {
        DonutKind::Choco => palette::CHOCO,
        DonutKind::Strawberry => palette::STRAWBERRY,
        DonutKind::Matcha => palette::MATCHA,
    }
}

/// Input snapshot gathered by backends before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Direction the player asked to step toward this frame, if any.
    pub move_player: Option<Direction>,
    /// Donut kind the player asked to place this frame, if any.
    pub place_donut: Option<DonutKind>,
}

/// Describes the tile grid that composes the play area.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single square tile expressed in world units.
    pub tile_length: f32,
    /// Row-major tile classifications.
    pub tiles: Vec<TileKind>,
}

impl TileGridPresentation {
    /// Creates a new tile grid descriptor.
    #[must_use]
    pub fn new(columns: u32, rows: u32, tile_length: f32, tiles: Vec<TileKind>) -> Self {
        Self {
            columns,
            rows,
            tile_length,
            tiles,
        }
    }

    /// Tile stored at the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileKind> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
        self.tiles.get(index).copied()
    }

    /// Total width of the grid measured in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Total height of the grid measured in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }
}

/// Overlay effect drawn above a monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MonsterEffect {
    /// Exclamation mark shown while pursuing a donut.
    Alert,
    /// Heart shown while eating.
    Heart,
    /// Sleeping indicator shown while dormant.
    Zzz,
}

/// Maps a behavior state to its overlay effect, if any.
#[must_use]
pub const fn effect_for(state: MonsterState) -> Option<MonsterEffect> {
    match state {
        MonsterState::Patrol | MonsterState::Chase => None,
        MonsterState::Lured => Some(MonsterEffect::Alert),
        MonsterState::Eating => Some(MonsterEffect::Heart),
        MonsterState::Sleep => Some(MonsterEffect::Zzz),
    }
}

/// Player drawn at a continuous position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// Authoritative grid cell.
    pub cell: CellCoord,
    /// Continuous position in tile units.
    pub position: Vec2,
    /// Whether a step is currently in flight.
    pub moving: bool,
    /// Whether the player has not been caught.
    pub alive: bool,
}

impl PlayerPresentation {
    /// Builds the presentation from a session snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &PlayerSnapshot) -> Self {
        Self {
            cell: snapshot.cell,
            position: to_vec2(snapshot.position),
            moving: snapshot.moving,
            alive: snapshot.alive,
        }
    }
}

/// Monster drawn at a continuous position with a visual state tag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterPresentation {
    /// Identifier used for stable color variation.
    pub id: MonsterId,
    /// Breed of the monster.
    pub breed: MonsterBreed,
    /// Authoritative grid cell.
    pub cell: CellCoord,
    /// Continuous position in tile units.
    pub position: Vec2,
    /// Behavior state driving the sprite selection.
    pub state: MonsterState,
    /// Overlay effect derived from the state.
    pub effect: Option<MonsterEffect>,
}

impl MonsterPresentation {
    /// Builds the presentation from a session snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &MonsterSnapshot) -> Self {
        Self {
            id: snapshot.id,
            breed: snapshot.breed,
            cell: snapshot.cell,
            position: to_vec2(snapshot.position),
            state: snapshot.state,
            effect: effect_for(snapshot.state),
        }
    }
}

/// Donut drawn on its grid cell with a lifetime indicator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DonutPresentation {
    /// Kind determining the body color.
    pub kind: DonutKind,
    /// Grid cell the donut occupies.
    pub cell: CellCoord,
    /// Fraction of the lifetime remaining, in 0.0..=1.0.
    pub remaining_fraction: f32,
}

impl DonutPresentation {
    /// Builds the presentation from an active donut snapshot.
    ///
    /// Inactive donuts are not drawn; callers filter them out beforehand.
    #[must_use]
    pub fn from_snapshot(snapshot: &DonutSnapshot) -> Self {
        let fraction = snapshot.remaining.as_secs_f32() / DONUT_LIFETIME.as_secs_f32();
        Self {
            kind: snapshot.kind,
            cell: snapshot.cell,
            remaining_fraction: fraction.clamp(0.0, 1.0),
        }
    }
}

/// Heads-up display content shown alongside the maze.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HudPresentation {
    /// Remaining donut counts.
    pub inventory: DonutInventory,
    /// Simulated time since the level started.
    pub elapsed: Duration,
    /// Session result state.
    pub outcome: Outcome,
    /// Rank achieved by the latest cleared run, if known.
    pub rank: Option<u32>,
}

/// Scene description combining the grid and its inhabitants.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile grid that composes the play area.
    pub grid: TileGridPresentation,
    /// Donuts currently visible.
    pub donuts: Vec<DonutPresentation>,
    /// The player.
    pub player: PlayerPresentation,
    /// Monsters in deterministic id order.
    pub monsters: Vec<MonsterPresentation>,
    /// Heads-up display content.
    pub hud: HudPresentation,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Donut Panic scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, and may mutate the scene
    /// before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

fn to_vec2(point: CellPoint) -> Vec2 {
    Vec2::new(point.x(), point.y())
}
