use crate::error::GridError;
use crate::grid::{Grid, OBSTACLE};
use log::{debug, trace, warn};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::path::{Path, PathBuf};

/// Expansion order: the four cardinals, then the four diagonals
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// A position on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Position::new(self.x + dx, self.y + dy)
    }

    /// Minimum number of 8-directional unit steps between two cells
    pub fn chebyshev(&self, other: &Position) -> u32 {
        (self.x - other.x).unsigned_abs().max((self.y - other.y).unsigned_abs())
    }
}

/// Where a grid comes from
#[derive(Debug, Clone)]
pub enum GridSource {
    /// Column-major terrain codes (`doc[x][y]`), adopted directly
    Array(Vec<Vec<i32>>),
    /// A JSON grid document, or an image if it does not parse as JSON
    File(PathBuf),
    /// A monochrome image
    Image(PathBuf),
}

impl GridSource {
    fn resolve(self) -> Result<Grid, GridError> {
        match self {
            GridSource::Array(columns) => Grid::from_columns(&columns),
            GridSource::Image(path) => Grid::from_image_file(&path),
            GridSource::File(path) => match Grid::from_json_file(&path) {
                Ok(grid) => Ok(grid),
                Err(
                    err @ (GridError::Io { .. }
                    | GridError::NotRectangular { .. }
                    | GridError::TooLarge { .. }),
                ) => Err(err),
                Err(json_err) => match Grid::from_image_file(&path) {
                    Ok(grid) => Ok(grid),
                    Err(image_err) => Err(GridError::Unrecognized {
                        path,
                        json: json_err.to_string(),
                        image: image_err.to_string(),
                    }),
                },
            },
        }
    }
}

/// Search-field annotation for one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldCell {
    Unvisited,
    Obstacle,
    Destination,
    /// Best known cost from the start, for cells discovered as jump points
    Cost(u32),
}

/// A jump point awaiting expansion
#[derive(Debug, Clone, Copy)]
struct QueuedPoint {
    priority: u32,
    seq: u64,
    position: Position,
}

impl PartialEq for QueuedPoint {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for QueuedPoint {}

impl PartialOrd for QueuedPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; earlier insertion wins ties
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue, FIFO among equal priorities
#[derive(Default)]
struct JumpQueue {
    heap: BinaryHeap<QueuedPoint>,
    next_seq: u64,
}

impl JumpQueue {
    fn push(&mut self, position: Position, priority: u32) {
        self.heap.push(QueuedPoint {
            priority,
            seq: self.next_seq,
            position,
        });
        self.next_seq += 1;
    }

    fn pop(&mut self) -> Option<Position> {
        self.heap.pop().map(|q| q.position)
    }
}

/// Per-query scratch state: search field, predecessors and open queue
struct SearchContext {
    width: i32,
    height: i32,
    field: Vec<FieldCell>,
    sources: Vec<Option<Position>>,
    expanded: Vec<bool>,
    queue: JumpQueue,
    goal: Position,
}

impl SearchContext {
    fn new(grid: &Grid, start: Position, goal: Position) -> Self {
        let field = grid
            .cells
            .iter()
            .map(|&c| if c == OBSTACLE { FieldCell::Obstacle } else { FieldCell::Unvisited })
            .collect();

        let mut ctx = SearchContext {
            width: grid.width,
            height: grid.height,
            field,
            sources: vec![None; grid.cells.len()],
            expanded: vec![false; grid.cells.len()],
            queue: JumpQueue::default(),
            goal,
        };
        ctx.set(start, FieldCell::Cost(0));
        ctx.set(goal, FieldCell::Destination);
        ctx
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height {
            Some((pos.x + pos.y * self.width) as usize)
        } else {
            None
        }
    }

    fn get(&self, pos: Position) -> FieldCell {
        self.index(pos).map_or(FieldCell::Obstacle, |i| self.field[i])
    }

    fn set(&mut self, pos: Position, cell: FieldCell) {
        if let Some(i) = self.index(pos) {
            self.field[i] = cell;
        }
    }

    fn cost(&self, pos: Position) -> u32 {
        match self.get(pos) {
            FieldCell::Cost(c) => c,
            _ => 0,
        }
    }

    fn is_blocked(&self, pos: Position) -> bool {
        self.get(pos) == FieldCell::Obstacle
    }

    /// `side` is blocked while the cell diagonally ahead of it is open
    fn is_forced(&self, side: Position, ahead: Position) -> bool {
        self.is_blocked(side) && !self.is_blocked(ahead)
    }

    /// Walk in a cardinal direction until the goal, a forced neighbour, or a wall
    fn jump_cardinal(&self, from: Position, dx: i32, dy: i32) -> Option<Position> {
        let mut cur = from;

        loop {
            cur = cur.offset(dx, dy);
            if self.is_blocked(cur) {
                return None;
            }
            if cur == self.goal {
                return Some(cur);
            }

            let forced = if dx == 0 {
                self.is_forced(cur.offset(1, 0), cur.offset(1, dy))
                    || self.is_forced(cur.offset(-1, 0), cur.offset(-1, dy))
            } else {
                self.is_forced(cur.offset(0, 1), cur.offset(dx, 1))
                    || self.is_forced(cur.offset(0, -1), cur.offset(dx, -1))
            };
            if forced {
                return Some(cur);
            }
        }
    }

    /// Walk diagonally; a cell is a jump point when it has a forced neighbour
    /// or when either cardinal walk leaving it finds one
    fn jump_diagonal(&self, from: Position, dx: i32, dy: i32) -> Option<Position> {
        let mut cur = from;

        loop {
            cur = cur.offset(dx, dy);
            if self.is_blocked(cur) {
                return None;
            }
            if cur == self.goal {
                return Some(cur);
            }

            // Forced when an axis neighbour behind us is blocked and the cell past it is open
            if self.is_forced(cur.offset(-dx, 0), cur.offset(-dx, dy))
                || self.is_forced(cur.offset(0, -dy), cur.offset(dx, -dy))
            {
                return Some(cur);
            }

            if self.jump_cardinal(cur, dx, 0).is_some() || self.jump_cardinal(cur, 0, dy).is_some() {
                return Some(cur);
            }
        }
    }

    /// Record `pos` as reached from `source`; cells keep the cheapest arrival
    fn relax(&mut self, pos: Position, cost: u32, source: Position) {
        let Some(i) = self.index(pos) else {
            return;
        };
        match self.field[i] {
            FieldCell::Obstacle => return,
            FieldCell::Cost(best) if best <= cost => return,
            _ => {}
        }

        self.field[i] = FieldCell::Cost(cost);
        self.sources[i] = Some(source);

        let priority = cost + pos.chebyshev(&self.goal);
        trace!("[jps] jump point ({},{}) priority {}", pos.x, pos.y, priority);
        self.queue.push(pos, priority);
    }

    fn run(&mut self, start: Position) -> Option<Vec<Position>> {
        self.queue.push(start, start.chebyshev(&self.goal));

        while let Some(p) = self.queue.pop() {
            let i = self.index(p)?;
            if self.expanded[i] {
                continue;
            }
            self.expanded[i] = true;

            // First dequeue of the goal carries its final cost
            if p == self.goal {
                return self.reconstruct(start);
            }

            let cost = self.cost(p);
            for &(dx, dy) in &DIRECTIONS {
                let next = if dx == 0 || dy == 0 {
                    self.jump_cardinal(p, dx, dy)
                } else {
                    self.jump_diagonal(p, dx, dy)
                };
                if let Some(next) = next {
                    self.relax(next, cost + p.chebyshev(&next), p);
                }
            }
        }
        None
    }

    /// Walk predecessor links back from the goal
    fn reconstruct(&self, start: Position) -> Option<Vec<Position>> {
        let mut path = Vec::new();
        let mut cur = self.goal;

        while cur != start {
            path.push(cur);
            cur = self.sources[self.index(cur)?]?;
        }
        path.push(start);
        path.reverse();
        Some(path)
    }
}

/// Owns one occupancy grid and answers shortest-path queries with Jump Point Search
#[derive(Debug, Clone, Default)]
pub struct GridPathfinder {
    grid: Option<Grid>,
}

impl GridPathfinder {
    pub fn new() -> Self {
        GridPathfinder { grid: None }
    }

    pub fn with_grid(grid: Grid) -> Self {
        GridPathfinder { grid: Some(grid) }
    }

    pub fn set_grid(&mut self, grid: Grid) {
        self.grid = Some(grid);
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn has_grid(&self) -> bool {
        self.grid.is_some()
    }

    /// Load a grid, logging (not returning) any failure.
    /// On failure the currently held grid, if any, is kept.
    pub fn load_grid(&mut self, source: GridSource) {
        if let Err(e) = self.try_load_grid(source) {
            warn!("Can't load grid: {}", e);
        }
    }

    pub fn try_load_grid(&mut self, source: GridSource) -> Result<(), GridError> {
        let grid = source.resolve()?;
        debug!("Loaded {}x{} grid", grid.width, grid.height);
        self.grid = Some(grid);
        Ok(())
    }

    /// Save the grid as JSON; does nothing when no grid is loaded
    pub fn save_grid(&self, path: &Path) -> Result<(), GridError> {
        match &self.grid {
            Some(grid) => grid.save_json(path),
            None => Ok(()),
        }
    }

    /// Path query in real-valued grid space; coordinates are truncated to cells
    pub fn get_path(&self, start: (f32, f32), end: (f32, f32)) -> Option<Vec<Position>> {
        let start = Position::new(start.0.trunc() as i32, start.1.trunc() as i32);
        let end = Position::new(end.0.trunc() as i32, end.1.trunc() as i32);
        self.find_path(start, end)
    }

    /// Shortest 8-connected path from `start` to `end` as a list of jump points,
    /// or None when there is no grid, an endpoint is blocked, or no route exists
    pub fn find_path(&self, start: Position, end: Position) -> Option<Vec<Position>> {
        let grid = self.grid.as_ref()?;

        if !grid.in_bounds(start.x, start.y) || !grid.in_bounds(end.x, end.y) {
            debug!("[jps] endpoint out of bounds: {:?} -> {:?}", start, end);
            return None;
        }
        if grid.is_obstacle(start.x, start.y) || grid.is_obstacle(end.x, end.y) {
            debug!("[jps] endpoint is an obstacle: {:?} -> {:?}", start, end);
            return None;
        }
        if start == end {
            return Some(vec![start]);
        }

        let path = SearchContext::new(grid, start, end).run(start);
        match &path {
            Some(p) => debug!("[jps] found path: {}", format_path(p)),
            None => debug!("[jps] no path ({},{}) -> ({},{})", start.x, start.y, end.x, end.y),
        }
        path
    }
}

/// Total length of a path in unit 8-directional steps
pub fn path_length(path: &[Position]) -> u32 {
    path.windows(2).map(|w| w[0].chebyshev(&w[1])).sum()
}

/// Format path for display
pub fn format_path(path: &[Position]) -> String {
    if path.is_empty() {
        return "No path".to_string();
    }

    path.iter()
        .map(|pos| format!("({},{})", pos.x, pos.y))
        .collect::<Vec<_>>()
        .join(" -> ")
}
