use arboard::Clipboard;
use gridnav::config::{AgentConfig, Config};
use gridnav::follower::steer;
use gridnav::pathfinding::{format_path, path_length};
use gridnav::{Grid, GridPathfinder, GridSource, PathFollower, Position, FREE, OBSTACLE};
use log::{error, info, warn};
use macroquad::prelude::*;
use std::path::PathBuf;

/// A steered agent walking from the start cell to the end cell, in world space
struct Walker {
    follower: PathFollower,
    position: (f32, f32),
    velocity: (f32, f32),
    max_speed: f32,
    gain: f32,
}

impl Walker {
    fn spawn(config: &AgentConfig, cell: Position) -> Self {
        let follower = PathFollower::from_config(config);
        let position = (
            cell.x as f32 - follower.world_offset.0,
            cell.y as f32 - follower.world_offset.1,
        );
        Walker {
            follower,
            position,
            velocity: (0.0, 0.0),
            max_speed: config.max_speed,
            gain: config.steering_gain,
        }
    }

    fn update(&mut self, pathfinder: &GridPathfinder, goal_cell: Position, dt: f32) {
        let (ox, oy) = self.follower.world_offset;
        let goal = (goal_cell.x as f32 - ox, goal_cell.y as f32 - oy);

        let target = self.follower.update(pathfinder, self.position, goal);
        let accel = steer(self.position, self.velocity, target, self.max_speed, self.gain);
        self.velocity.0 += accel.0;
        self.velocity.1 += accel.1;
        self.position.0 += self.velocity.0 * dt;
        self.position.1 += self.velocity.1 * dt;
    }

    /// Position in grid space
    fn grid_position(&self) -> (f32, f32) {
        (
            self.position.0 + self.follower.world_offset.0,
            self.position.1 + self.follower.world_offset.1,
        )
    }
}

/// Visualization state
struct VisState {
    pathfinder: GridPathfinder,
    grid_path: PathBuf,
    start: Position,
    end: Position,
    path: Option<Vec<Position>>,
    /// (grid revision, start, end) the cached path was computed for
    path_key: Option<(u64, Position, Position)>,
    walker: Option<Walker>,
    cell_size: f32,
    background: Color,
}

impl VisState {
    fn new(config: &Config, grid_path: PathBuf) -> Self {
        let mut pathfinder = GridPathfinder::new();
        pathfinder.load_grid(GridSource::File(grid_path.clone()));
        if !pathfinder.has_grid() {
            info!(
                "Starting with a blank {}x{} grid",
                config.grid.width, config.grid.height
            );
            pathfinder.set_grid(Grid::new(config.grid.width, config.grid.height));
        }

        let mut state = VisState {
            pathfinder,
            grid_path,
            start: Position::new(0, 0),
            end: Position::new(0, 0),
            path: None,
            path_key: None,
            walker: None,
            cell_size: config.viewer.cell_size,
            background: Color::from_rgba(
                config.viewer.background_r,
                config.viewer.background_g,
                config.viewer.background_b,
                255,
            ),
        };
        if let Some(grid) = state.pathfinder.grid() {
            state.end = Position::new(grid.width - 1, grid.height - 1);
        }
        state.update_path();
        state
    }

    fn grid_size(&self) -> (i32, i32) {
        self.pathfinder
            .grid()
            .map_or((0, 0), |g| (g.width, g.height))
    }

    /// Screen position to grid cell; grid rows are drawn world-up
    fn cell_at(&self, mouse_x: f32, mouse_y: f32) -> Option<Position> {
        let (width, height) = self.grid_size();
        let x = (mouse_x / self.cell_size).floor() as i32;
        let row = (mouse_y / self.cell_size).floor() as i32;
        let y = height - 1 - row;

        (x >= 0 && x < width && y >= 0 && y < height).then(|| Position::new(x, y))
    }

    fn handle_click(&mut self, mouse_x: f32, mouse_y: f32) {
        let Some(cell) = self.cell_at(mouse_x, mouse_y) else {
            return;
        };

        // Left click: toggle obstacle
        if is_mouse_button_pressed(MouseButton::Left) {
            let mut grid = match self.pathfinder.grid() {
                Some(g) => g.clone(),
                None => return,
            };
            let value = if grid.is_obstacle(cell.x, cell.y) { FREE } else { OBSTACLE };
            grid.set_cell(cell.x, cell.y, value);
            self.pathfinder.set_grid(grid);
        }
        // Right click: move start, shift + right click: move end
        else if is_mouse_button_pressed(MouseButton::Right) {
            if is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift) {
                self.end = cell;
            } else {
                self.start = cell;
            }
        }
        self.update_path();
    }

    fn update_path(&mut self) {
        let revision = self.pathfinder.grid().map_or(0, |g| g.get_revision());
        let key = (revision, self.start, self.end);
        if self.path_key == Some(key) {
            return;
        }

        self.path = self.pathfinder.find_path(self.start, self.end);
        self.path_key = Some(key);
    }

    /// Drop a fresh agent on the start cell, or remove the current one
    fn toggle_walker(&mut self, config: &AgentConfig) {
        self.walker = match self.walker {
            Some(_) => None,
            None => {
                info!("Agent spawned at ({}, {})", self.start.x, self.start.y);
                Some(Walker::spawn(config, self.start))
            }
        };
    }

    fn update_walker(&mut self, dt: f32) {
        if let Some(walker) = &mut self.walker {
            walker.update(&self.pathfinder, self.end, dt);
        }
    }

    fn save(&self) {
        match self.pathfinder.save_grid(&self.grid_path) {
            Ok(()) => info!("Grid saved to {}", self.grid_path.display()),
            Err(e) => error!("Failed to save grid: {}", e),
        }
    }

    fn reload(&mut self) {
        self.pathfinder.load_grid(GridSource::File(self.grid_path.clone()));
        // Loaded grids restart at revision 0
        self.path_key = None;
        self.update_path();
    }

    fn grid_to_string(&self) -> String {
        let Some(grid) = self.pathfinder.grid() else {
            return String::new();
        };
        let path = self.path.as_deref().unwrap_or(&[]);
        let mut result = String::new();

        for y in (0..grid.height).rev() {
            for x in 0..grid.width {
                let pos = Position::new(x, y);
                let symbol = if pos == self.start {
                    'S'
                } else if pos == self.end {
                    'D'
                } else if path.contains(&pos) {
                    '*'
                } else if grid.is_obstacle(x, y) {
                    '■'
                } else {
                    '□'
                };
                result.push(symbol);
            }
            result.push('\n');
        }

        result.push_str(&format!("Path: {}\n", format_path(path)));
        result
    }

    fn copy_to_clipboard(&self) {
        let grid_string = self.grid_to_string();
        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(&grid_string) {
                    warn!("Failed to copy to clipboard: {}", e);
                } else {
                    info!("Grid layout copied to clipboard");
                    // Keep clipboard alive for a moment so clipboard managers can capture it
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
            Err(e) => {
                warn!("Failed to access clipboard: {}", e);
            }
        }
    }

    fn cell_rect(&self, pos: Position) -> (f32, f32) {
        let (_, height) = self.grid_size();
        (
            pos.x as f32 * self.cell_size,
            (height - 1 - pos.y) as f32 * self.cell_size,
        )
    }

    fn draw(&self) {
        clear_background(self.background);

        let Some(grid) = self.pathfinder.grid() else {
            return;
        };

        for y in 0..grid.height {
            for x in 0..grid.width {
                let pos = Position::new(x, y);
                let (px, py) = self.cell_rect(pos);

                let color = if pos == self.start {
                    BLUE
                } else if pos == self.end {
                    ORANGE
                } else if grid.is_obstacle(x, y) {
                    RED
                } else {
                    Color::from_rgba(60, 60, 60, 255)
                };

                draw_rectangle(px, py, self.cell_size - 1.0, self.cell_size - 1.0, color);
            }
        }

        // Jump points joined by straight segments
        let half = self.cell_size / 2.0;
        if let Some(path) = &self.path {
            for pair in path.windows(2) {
                let (x1, y1) = self.cell_rect(pair[0]);
                let (x2, y2) = self.cell_rect(pair[1]);
                draw_line(x1 + half, y1 + half, x2 + half, y2 + half, 2.0, GREEN);
            }
            for &pos in path {
                let (px, py) = self.cell_rect(pos);
                draw_circle(px + half, py + half, half * 0.5, GREEN);
            }
        }

        if let Some(walker) = &self.walker {
            let (gx, gy) = walker.grid_position();
            let (_, height) = self.grid_size();
            let px = gx * self.cell_size + half;
            let py = (height as f32 - 1.0 - gy) * self.cell_size + half;
            draw_circle(px, py, half * 0.8, YELLOW);
        }

        let summary = match &self.path {
            Some(p) => format!("{} jump points, length {}", p.len(), path_length(p)),
            None => "No path".to_string(),
        };
        let info = format!(
            "Start: ({}, {})  End: ({}, {})  {}\nLeft click: toggle obstacle | Right click: start | Shift+Right: end\nA: agent  S: save  R: reload  C: copy grid  Esc: close",
            self.start.x, self.start.y, self.end.x, self.end.y, summary
        );
        let mut line_y = 20.0;
        for line in info.lines() {
            draw_text(line, 10.0, line_y, 20.0, WHITE);
            line_y += 20.0;
        }
    }
}

#[macroquad::main("GridNav - Jump Point Search")]
async fn main() {
    let config = Config::load();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();

    // Optional grid file argument overrides the configured one
    let grid_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(&config.grid.path), PathBuf::from);

    let mut state = VisState::new(&config, grid_path);

    loop {
        // Handle input
        if is_mouse_button_pressed(MouseButton::Left) || is_mouse_button_pressed(MouseButton::Right) {
            let (mouse_x, mouse_y) = mouse_position();
            state.handle_click(mouse_x, mouse_y);
        }

        if is_key_pressed(KeyCode::S) {
            state.save();
        }
        if is_key_pressed(KeyCode::R) {
            state.reload();
        }
        if is_key_pressed(KeyCode::C) {
            state.copy_to_clipboard();
        }
        if is_key_pressed(KeyCode::A) {
            state.toggle_walker(&config.agent);
        }

        state.update_walker(get_frame_time());

        // Close window on Escape
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        state.draw();

        next_frame().await
    }
}
