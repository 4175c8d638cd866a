#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Donut Panic sessions headless.
//!
//! The adapter loads a level, steers the player toward the goal one step at
//! a time, drops donuts at scripted frames, pumps the reinforcement and
//! ranking systems, and presents the session through a terminal rendering
//! backend. Every run is fully deterministic for a given level, seed, and
//! script.

mod backend;
mod render;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use donut_panic_core::{
    CellCoord, Command, Direction, DonutKind, Event, LevelBlueprint, Outcome, TileKind,
};
use donut_panic_rendering::{
    palette, DonutPresentation, HudPresentation, MonsterPresentation, PlayerPresentation,
    Presentation, RenderingBackend, Scene, TileGridPresentation,
};
use donut_panic_system_ranking::{LocalScores, Ranking};
use donut_panic_system_reinforcement::{Config, Reinforcement, DEFAULT_REINFORCEMENT_INTERVAL};
use donut_panic_world::{self as world, levels, query, World};

use backend::TextBackend;

const FRAME: Duration = Duration::from_millis(50);
const TILE_LENGTH: f32 = 32.0;

/// Runs a deterministic, scripted Donut Panic session and prints the result.
#[derive(Debug, Parser)]
#[command(name = "donut-panic")]
struct Args {
    /// TOML level file; the bundled stage is used when omitted.
    #[arg(long)]
    level: Option<PathBuf>,
    /// Maximum number of 50 ms frames to simulate.
    #[arg(long, default_value_t = 2400)]
    frames: u32,
    /// Seed for the reinforcement schedule.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Frames at which a strawberry donut is dropped on the player's cell.
    #[arg(long = "drop-donut", value_name = "FRAME")]
    drop_donut: Vec<u32>,
    /// Print the board every N frames in addition to the final frame.
    #[arg(long, default_value_t = 0)]
    print_every: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let blueprint = match &args.level {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading level file {}", path.display()))?;
            toml::from_str::<LevelBlueprint>(&text).context("parsing level file")?
        }
        None => levels::first_stage(),
    };

    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::LoadLevel { blueprint }, &mut events);
    if let Some(Event::LevelRejected { reason }) = events
        .iter()
        .find(|event| matches!(event, Event::LevelRejected { .. }))
    {
        bail!("invalid level: {reason}");
    }

    let level_name = query::level_name(&world).to_owned();
    let mut reinforcement = Reinforcement::new(Config::seeded_for_level(
        DEFAULT_REINFORCEMENT_INTERVAL,
        args.seed,
        &level_name,
    ));
    let mut ranking = Ranking::new();
    let mut scores = LocalScores::new();

    let presentation = Presentation::new(
        level_name.clone(),
        palette::BACKGROUND,
        capture_scene(&world, None),
    );

    let drop_schedule = args.drop_donut.clone();
    let mut frame = 0u32;

    let text_backend = TextBackend::new(args.frames, args.print_every, FRAME);
    text_backend.run(presentation, move |dt, input, scene| {
        if query::outcome(&world) != Outcome::Playing {
            return;
        }

        let mut frame_events = Vec::new();

        if let Some(direction) = input.move_player {
            world::apply(&mut world, Command::MovePlayer { direction }, &mut frame_events);
        } else if !query::player(&world).moving {
            if let Some(direction) = autopilot_direction(&world) {
                world::apply(&mut world, Command::MovePlayer { direction }, &mut frame_events);
            }
        }

        if let Some(kind) = input.place_donut {
            world::apply(&mut world, Command::PlaceDonut { kind }, &mut frame_events);
        } else if drop_schedule.contains(&frame) {
            world::apply(
                &mut world,
                Command::PlaceDonut {
                    kind: DonutKind::Strawberry,
                },
                &mut frame_events,
            );
        }

        world::apply(&mut world, Command::Tick { dt }, &mut frame_events);

        let candidates = query::reinforcement_candidates(&world);
        let mut commands = Vec::new();
        reinforcement.handle(&frame_events, &candidates, &mut commands);
        for command in commands {
            world::apply(&mut world, command, &mut frame_events);
        }

        ranking.handle(&frame_events, &level_name, &mut scores);

        frame += 1;
        *scene = capture_scene(&world, ranking.last_rank());
    })
}

/// Next step of the shortest route from the player to the goal.
fn autopilot_direction(world: &World) -> Option<Direction> {
    let route = query::route_to_goal(world);
    let next = route.first().copied()?;
    direction_between(query::player(world).cell, next)
}

fn direction_between(from: CellCoord, to: CellCoord) -> Option<Direction> {
    let column_diff = from.column().abs_diff(to.column());
    let row_diff = from.row().abs_diff(to.row());
    if column_diff + row_diff != 1 {
        return None;
    }

    if column_diff == 1 {
        if to.column() > from.column() {
            Some(Direction::East)
        } else {
            Some(Direction::West)
        }
    } else if to.row() > from.row() {
        Some(Direction::South)
    } else {
        Some(Direction::North)
    }
}

/// Captures the current session state as a renderable scene.
fn capture_scene(world: &World, rank: Option<u32>) -> Scene {
    let grid = query::grid(world);
    let mut tiles = Vec::with_capacity((grid.columns() * grid.rows()) as usize);
    for row in 0..grid.rows() {
        for column in 0..grid.columns() {
            tiles.push(
                grid.tile(CellCoord::new(column, row))
                    .unwrap_or(TileKind::Wall),
            );
        }
    }

    Scene {
        grid: TileGridPresentation::new(grid.columns(), grid.rows(), TILE_LENGTH, tiles),
        donuts: query::donut_view(world)
            .iter()
            .filter(|donut| donut.active)
            .map(DonutPresentation::from_snapshot)
            .collect(),
        player: PlayerPresentation::from_snapshot(&query::player(world)),
        monsters: query::monster_view(world)
            .iter()
            .map(MonsterPresentation::from_snapshot)
            .collect(),
        hud: HudPresentation {
            inventory: query::inventory(world),
            elapsed: query::elapsed(world),
            outcome: query::outcome(world),
            rank,
        },
    }
}
