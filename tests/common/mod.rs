#![allow(dead_code)]

use gridnav::{Grid, Position, OBSTACLE};
use std::collections::VecDeque;

/// Parse an ASCII grid: '■' is an obstacle, anything else is free.
/// Line index is the y coordinate, character index is x.
pub fn parse_grid(layout: &str) -> Grid {
    let lines: Vec<&str> = layout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let height = lines.len() as i32;
    let width = lines.first().map_or(0, |l| l.chars().count()) as i32;

    let mut grid = Grid::new(width, height);
    for (y, line) in lines.iter().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            if ch == '■' {
                grid.set_cell(x as i32, y as i32, OBSTACLE);
            }
        }
    }
    grid
}

/// Every cell a path visits, waypoints and the cells between them
pub fn path_cells(path: &[Position]) -> Vec<Position> {
    let mut cells: Vec<Position> = path.first().copied().into_iter().collect();
    for leg in path.windows(2) {
        let (a, b) = (leg[0], leg[1]);
        let (sx, sy) = ((b.x - a.x).signum(), (b.y - a.y).signum());
        for i in 1..=a.chebyshev(&b) as i32 {
            cells.push(Position::new(a.x + sx * i, a.y + sy * i));
        }
    }
    cells
}

/// Length of the shortest 8-connected route by breadth-first search,
/// diagonal moves allowed past blocked corners
pub fn bfs_distance(grid: &Grid, start: Position, end: Position) -> Option<u32> {
    if grid.is_obstacle(start.x, start.y) || grid.is_obstacle(end.x, end.y) {
        return None;
    }

    let mut dist = vec![None; grid.cells.len()];
    let mut queue = VecDeque::new();
    dist[grid.get_id(start.x, start.y) as usize] = Some(0);
    queue.push_back(start);

    while let Some(cur) = queue.pop_front() {
        let d = dist[grid.get_id(cur.x, cur.y) as usize]?;
        if cur == end {
            return Some(d);
        }
        for dx in -1..=1 {
            for dy in -1..=1 {
                let next = cur.offset(dx, dy);
                if grid.is_obstacle(next.x, next.y) {
                    continue;
                }
                let id = grid.get_id(next.x, next.y) as usize;
                if dist[id].is_none() {
                    dist[id] = Some(d + 1);
                    queue.push_back(next);
                }
            }
        }
    }
    None
}

/// Every waypoint is a free in-bounds cell and every leg is a straight,
/// unobstructed 8-directional run
pub fn assert_sound(grid: &Grid, path: &[Position]) {
    for pos in path {
        assert!(grid.in_bounds(pos.x, pos.y), "waypoint {:?} out of bounds", pos);
        assert!(!grid.is_obstacle(pos.x, pos.y), "waypoint {:?} is an obstacle", pos);
    }

    for leg in path.windows(2) {
        let (a, b) = (leg[0], leg[1]);
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        assert!(
            dx == 0 || dy == 0 || dx.abs() == dy.abs(),
            "leg {:?} -> {:?} is not a straight line",
            a,
            b
        );

        let steps = dx.abs().max(dy.abs());
        assert!(steps > 0, "repeated waypoint {:?}", a);
        for i in 1..=steps {
            let x = a.x + dx.signum() * i;
            let y = a.y + dy.signum() * i;
            assert!(!grid.is_obstacle(x, y), "leg {:?} -> {:?} crosses obstacle at ({},{})", a, b, x, y);
        }
    }
}

/// Render a path over the grid for failure messages
pub fn visualize_path(grid: &Grid, path: &[Position]) -> String {
    let mut result = String::new();
    for y in 0..grid.height {
        for x in 0..grid.width {
            let pos = Position::new(x, y);
            let symbol = if path.first() == Some(&pos) {
                'S'
            } else if path.last() == Some(&pos) {
                'D'
            } else if path.contains(&pos) {
                '*'
            } else if grid.is_obstacle(x, y) {
                '■'
            } else {
                '.'
            };
            result.push(symbol);
        }
        result.push('\n');
    }
    result
}
