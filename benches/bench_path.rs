use criterion::*;

use grid_navigator::{GridSettings, NavGraph, PathAgent};

fn create_grid(size: u32, walls: bool) -> NavGraph {
    let rows: Vec<String> = (0..size)
        .map(|y| {
            (0..size)
                .map(|x| {
                    // Vertical walls with a gap alternating between top and bottom.
                    let gap = if x % 8 == 2 { size - 1 } else { 0 };
                    if walls && x % 4 == 2 && y != gap {
                        '0'
                    } else {
                        '1'
                    }
                })
                .collect()
        })
        .collect();

    NavGraph::from_grid(&rows, &GridSettings::new().with_cell_size(1.0))
}

fn bench_path(c: &mut Criterion) {
    let small_open = create_grid(10, false);
    let small_maze = create_grid(10, true);

    let medium_open = create_grid(100, false);
    let medium_maze = create_grid(100, true);

    let mut small_open_group = c.benchmark_group("Small Open Grid");
    small_open_group.bench_function("long", |b| {
        b.iter(|| small_open.find_path(small_open.node_at(0, 0), small_open.node_at(9, 9)))
    });
    small_open_group.bench_function("short", |b| {
        b.iter(|| small_open.find_path(small_open.node_at(2, 2), small_open.node_at(4, 5)))
    });
    small_open_group.finish();

    let mut small_maze_group = c.benchmark_group("Small Maze Grid");
    small_maze_group.bench_function("long", |b| {
        b.iter(|| small_maze.find_path(small_maze.node_at(0, 0), small_maze.node_at(9, 9)))
    });
    small_maze_group.finish();

    let mut medium_open_group = c.benchmark_group("Medium Open Grid");
    medium_open_group.measurement_time(core::time::Duration::from_secs(15));
    medium_open_group.bench_function("long", |b| {
        b.iter(|| medium_open.find_path(medium_open.node_at(0, 0), medium_open.node_at(99, 99)))
    });
    medium_open_group.bench_function("short", |b| {
        b.iter(|| medium_open.find_path(medium_open.node_at(25, 25), medium_open.node_at(45, 30)))
    });
    medium_open_group.finish();

    let mut medium_maze_group = c.benchmark_group("Medium Maze Grid");
    medium_maze_group.measurement_time(core::time::Duration::from_secs(15));
    medium_maze_group.bench_function("long", |b| {
        b.iter(|| medium_maze.find_path(medium_maze.node_at(0, 0), medium_maze.node_at(99, 99)))
    });
    medium_maze_group.finish();

    let mut build_group = c.benchmark_group("Build");
    build_group.bench_function("medium maze", |b| b.iter(|| create_grid(100, true)));
    build_group.finish();
}

fn bench_agent(c: &mut Criterion) {
    let nav_graph = create_grid(100, true);
    let start = nav_graph.node_at(0, 0).unwrap();
    let goal = nav_graph.node_at(99, 99);

    c.bench_function("Agent walk", |b| {
        b.iter(|| {
            let mut agent = PathAgent::new(&nav_graph, start, 64.0).unwrap();
            agent.go_to_node(&nav_graph, goal);
            for _ in 0..1000 {
                agent.advance(&nav_graph, black_box(1.0 / 60.0));
            }
            agent.position()
        })
    });
}

criterion_group!(benches, bench_path, bench_agent);
criterion_main!(benches);
