//! nav-demo: agents crossing a small tile world.
//!
//! Builds a nav grid from an ASCII map, sends every agent's path request
//! through a `PathDispatcher`, then runs a fixed-step loop that ticks the
//! dispatcher and walks agents along their corridors. Usage:
//!
//! ```text
//! RUST_LOG=debug nav-demo [seed] [agents]
//! ```

mod agent;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tilenav_core::{Point, Vec2};
use tilenav_paths::{
    GROUND, GridConfig, MUD, NavConfig, NavGrid, PathDispatcher, ROAD, TileLayer, TileLegend,
};

use agent::{Agent, AgentState};

const WORLD: &[&str] = &[
    "................................",
    "..######......~~~~~.............",
    "..#....#.....~~~~~~~....####....",
    "..#....#.....~~~~~~~....#..#....",
    "..##.###......~~~~~.....#..#....",
    "........................##.#....",
    "================================",
    "......#.........#...............",
    "......#...~~~...#....######.....",
    "......#..~~~~~..#.........#.....",
    "......####~~~~..#####.....#.....",
    "...........~~.............#.....",
    "....   .............#######.....",
    "....   .........................",
];

const DT: f32 = 1.0 / 30.0;
const MAX_FRAMES: usize = 30 * 120;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().map(|s| s.parse::<u64>()).transpose()?.unwrap_or(7);
    let agent_count = args.next().map(|s| s.parse::<usize>()).transpose()?.unwrap_or(12);

    let layer = TileLayer::parse(WORLD, &TileLegend::default(), 1.0, Vec2::ZERO)?;
    let config = NavConfig {
        grid: layer.grid_config(
            GridConfig::default()
                .with_terrain_penalty(GROUND, 5)
                .with_terrain_penalty(MUD, 40)
                .with_terrain_penalty(ROAD, 0)
                .with_blur_radius(2),
        ),
        ..NavConfig::default()
    };
    config.validate()?;

    let grid = Arc::new(NavGrid::build(&config.grid, &layer)?);
    let (min, max) = grid.penalty_range();
    log::info!(
        "world {}x{}, penalties {min}..={max}, seed {seed}",
        grid.width(),
        grid.height()
    );

    let open: Vec<Vec2> = grid
        .cells()
        .iter()
        .filter(|c| c.walkable)
        .map(|c| c.world)
        .collect();
    if open.is_empty() {
        return Err("world has no walkable cells".into());
    }

    let dispatcher = PathDispatcher::new(Arc::clone(&grid), config.dispatcher.clone())?;
    let (results_tx, results_rx) = crossbeam_channel::unbounded();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut agents: Vec<Agent> = (0..agent_count)
        .map(|id| {
            let start = open[rng.random_range(0..open.len())];
            let goal = open[rng.random_range(0..open.len())];
            Agent::new(id, start, goal, rng.random_range(2.0..5.0))
        })
        .collect();

    for agent in &agents {
        let tx = results_tx.clone();
        let id = agent.id;
        dispatcher.request(agent.pos, agent.goal, move |waypoints, success| {
            // The receiver lives for the whole run.
            let _ = tx.send((id, waypoints, success));
        });
    }
    log::info!(
        "{} request(s) queued on {} worker(s)",
        dispatcher.in_flight(),
        dispatcher.workers()
    );

    let mut frame = 0;
    while frame < MAX_FRAMES {
        dispatcher.tick();
        for (id, waypoints, success) in results_rx.try_iter() {
            agents[id].receive_path(waypoints, success, &config.corridor);
        }
        for agent in agents.iter_mut() {
            agent.step(DT);
        }
        if agents.iter().all(Agent::is_settled) {
            break;
        }
        frame += 1;
        if frame % 30 == 0 {
            let moving = agents
                .iter()
                .filter(|a| matches!(a.state, AgentState::Following(_)))
                .count();
            log::debug!(
                "t={:.1}s: {moving} moving, {} request(s) in flight",
                frame as f32 * DT,
                dispatcher.in_flight()
            );
        }
    }

    let arrived = agents
        .iter()
        .filter(|a| matches!(a.state, AgentState::Arrived))
        .count();
    let stranded = agents
        .iter()
        .filter(|a| matches!(a.state, AgentState::Stranded))
        .count();
    log::info!(
        "done after {:.1}s: {arrived} arrived, {stranded} stranded, {} still moving",
        frame as f32 * DT,
        agents.len() - arrived - stranded
    );

    for line in render(&grid, &agents) {
        log::info!("{line}");
    }
    Ok(())
}

/// The map with agent trails (`*`) and final positions (agent id, base 36).
fn render(grid: &NavGrid, agents: &[Agent]) -> Vec<String> {
    let mut canvas: Vec<Vec<char>> = WORLD.iter().map(|row| row.chars().collect()).collect();
    let mut plot = |p: Point, ch: char| {
        if let Some(row) = canvas.get_mut(p.y as usize) {
            if let Some(cell) = row.get_mut(p.x as usize) {
                *cell = ch;
            }
        }
    };
    for agent in agents {
        for &pos in &agent.trail {
            plot(grid.cell_from_world(pos), '*');
        }
    }
    for agent in agents {
        let mark = std::char::from_digit((agent.id % 36) as u32, 36).unwrap_or('@');
        plot(grid.cell_from_world(agent.pos), mark);
    }
    // First row is y = 0; print with y growing upwards.
    canvas
        .into_iter()
        .rev()
        .map(|row| row.into_iter().collect())
        .collect()
}
