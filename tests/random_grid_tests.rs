mod common;

use common::{assert_sound, bfs_distance, visualize_path};
use gridnav::pathfinding::{format_path, path_length};
use gridnav::{Grid, GridPathfinder, Position, OBSTACLE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const OBSTACLE_DENSITY: f64 = 0.3;

fn random_grid(rng: &mut StdRng, width: i32, height: i32) -> Grid {
    let mut grid = Grid::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if rng.gen_bool(OBSTACLE_DENSITY) {
                grid.set_cell(x, y, OBSTACLE);
            }
        }
    }
    grid
}

fn random_free_cell(rng: &mut StdRng, grid: &Grid) -> Option<Position> {
    let free: Vec<Position> = (0..grid.height)
        .flat_map(|y| (0..grid.width).map(move |x| Position::new(x, y)))
        .filter(|p| !grid.is_obstacle(p.x, p.y))
        .collect();
    if free.is_empty() {
        return None;
    }
    Some(free[rng.gen_range(0..free.len())])
}

/// Compare every answer against breadth-first search on the same grid
fn check_against_bfs(seed: u64, rounds: usize, sizes: std::ops::RangeInclusive<i32>) {
    let mut rng = StdRng::seed_from_u64(seed);

    for round in 0..rounds {
        let width = rng.gen_range(sizes.clone());
        let height = rng.gen_range(sizes.clone());
        let grid = random_grid(&mut rng, width, height);

        let (Some(start), Some(end)) = (random_free_cell(&mut rng, &grid), random_free_cell(&mut rng, &grid)) else {
            continue;
        };

        let pathfinder = GridPathfinder::with_grid(grid.clone());
        let path = pathfinder.find_path(start, end);
        let expected = bfs_distance(&grid, start, end);

        match (&path, expected) {
            (Some(path), Some(distance)) => {
                assert_eq!(
                    path_length(path),
                    distance,
                    "round {}: {:?} -> {:?} not shortest\n{}\n{}",
                    round,
                    start,
                    end,
                    format_path(path),
                    visualize_path(&grid, path)
                );
                assert_eq!(path.first(), Some(&start));
                assert_eq!(path.last(), Some(&end));
                assert_sound(&grid, path);
            }
            (None, None) => {}
            (found, expected) => panic!(
                "round {}: {:?} -> {:?} returned {:?}, reachable: {}\n{}",
                round,
                start,
                end,
                found,
                expected.is_some(),
                visualize_path(&grid, &[start, end])
            ),
        }
    }
}

#[test]
fn test_random_small_grids_match_bfs() {
    check_against_bfs(7, 5000, 3..=6);
}

#[test]
fn test_random_medium_grids_match_bfs() {
    check_against_bfs(42, 1500, 4..=11);
}
