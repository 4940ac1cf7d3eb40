//! Walk an agent across a small town map.
//!
//! Demonstrates the full pipeline: layer compositing, walkable filtering,
//! weighted costs with a mode toggle, asynchronous planning, and timed
//! path execution.

use std::sync::Arc;
use std::time::Duration;

use tilenav_core::{GridBuilder, MapLayer, Point, TileClass, TraversalGrid};
use tilenav_motion::{AgentState, MoveEvent, PathExecutor};
use tilenav_paths::{CostMode, CostModel, MoveRule, Path, PlanOutcome, PlanRequest, Planner};

const GRASS: TileClass = TileClass::new(1);
const ROAD: TileClass = TileClass::new(2);
const MUD: TileClass = TileClass::new(3);
const TREE: TileClass = TileClass::new(16);
const HOUSE: TileClass = TileClass::new(49);

// '.' grass, '=' road, '~' mud on the ground layer;
// 'T' trees and 'H' houses on the overlay.
const GROUND: &str = "\
....................
..==============....
..=..............=..
..=....~~~~~.....=..
..=....~~~~~.....=..
..=....~~~~~.....=..
..==============.=..
.................=..
.................=..
....................";

const OVERLAY: &str = "\
....................
....................
......TT......HH....
......TT......HH....
....................
..............T.....
....................
...T.T..............
...THT..............
....................";

fn parse_ground(art: &str) -> MapLayer {
    parse_layer(art, |ch| match ch {
        '.' => Some(GRASS),
        '=' => Some(ROAD),
        '~' => Some(MUD),
        _ => None,
    })
}

fn parse_overlay(art: &str) -> MapLayer {
    parse_layer(art, |ch| match ch {
        'T' => Some(TREE),
        'H' => Some(HOUSE),
        _ => None,
    })
}

fn parse_layer(art: &str, classify: impl Fn(char) -> Option<TileClass>) -> MapLayer {
    let rows: Vec<&str> = art.lines().collect();
    let mut layer = MapLayer::new(rows[0].len() as i32, rows.len() as i32);
    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            layer.set(Point::new(x as i32, y as i32), classify(ch));
        }
    }
    layer
}

fn render(grid: &TraversalGrid, path: &Path, agent: Point) {
    for y in 0..grid.height() {
        let mut row = String::new();
        for x in 0..grid.width() {
            let p = Point::new(x, y);
            let ch = if p == agent {
                '@'
            } else if path.steps().contains(&p) {
                '+'
            } else if !grid.is_walkable(p) {
                '#'
            } else if grid.class_at(p) == Some(MUD) {
                '~'
            } else {
                '.'
            };
            row.push(ch);
        }
        println!("  {row}");
    }
}

fn plan_or_exit(planner: &Planner, grid: &Arc<TraversalGrid>, costs: &CostModel, request: PlanRequest) -> Path {
    let ticket = planner
        .plan(grid.clone(), costs, request)
        .unwrap_or_else(|err| {
            eprintln!("rejected: {err}");
            std::process::exit(1);
        });
    match ticket.wait() {
        PlanOutcome::Found(path) => path,
        PlanOutcome::NotFound => {
            eprintln!("no path from {} to {}", request.start, request.goal);
            std::process::exit(1);
        }
    }
}

fn walk(path: Path, grid: &TraversalGrid) {
    let mut exec = PathExecutor::new();
    let mut agent = AgentState::at(path.start());
    let handle = exec.begin(&mut agent, path.clone(), Duration::from_millis(200));

    let tick = Duration::from_millis(50);
    let mut elapsed = Duration::ZERO;
    loop {
        let event = exec.tick(&mut agent, tick);
        elapsed += tick;
        if elapsed.as_millis() % 400 == 0 {
            let pos = agent.position();
            println!(
                "  t={:>4}ms  waypoint {:>2}  at ({:.2}, {:.2})",
                elapsed.as_millis(),
                agent.waypoint_index(),
                pos.x,
                pos.y
            );
        }
        match event {
            Some(MoveEvent::Completed(h)) if h == handle => break,
            _ => {}
        }
    }
    let goal = path.goal();
    render(grid, &path, goal);
}

fn main() {
    let ground = parse_ground(GROUND);
    let overlay = parse_overlay(OVERLAY);
    let grid = Arc::new(
        GridBuilder::new()
            .walkable([GRASS, ROAD, MUD])
            .build(&[&ground, &overlay])
            .expect("layer sizes match"),
    );

    let mut costs = CostModel::new();
    costs
        .seed_overrides([(ROAD, Some(1)), (MUD, Some(5)), (GRASS, None)])
        .expect("seed costs are positive");

    let planner = Planner::new(MoveRule::FourWay);
    let request = PlanRequest::new(Point::new(0, 0), Point::new(19, 9));

    println!("default costs, every tile is 1:");
    let path = plan_or_exit(&planner, &grid, &costs, request);
    println!(
        "  {} waypoints, cost {}",
        path.len(),
        path.total_cost(&grid, &costs.snapshot())
    );
    walk(path, &grid);

    println!();
    println!("weighted costs, mud is 5:");
    costs.set_mode(CostMode::Weighted);
    let path = plan_or_exit(&planner, &grid, &costs, request);
    println!(
        "  {} waypoints, cost {}",
        path.len(),
        path.total_cost(&grid, &costs.snapshot())
    );
    walk(path, &grid);
}
