use crate::error::GridError;
use image::{DynamicImage, GenericImageView};
use std::fs;
use std::path::Path;

/// Terrain code for a traversable cell
pub const FREE: i32 = -1;
/// Terrain code for an impassable cell
pub const OBSTACLE: i32 = -10;

/// Red-channel brightness at or above which an image pixel becomes an obstacle
pub const OBSTACLE_THRESHOLD: f32 = 0.5;

/// Largest cell count a grid may hold; cell ids are `i32`
pub const MAX_CELLS: usize = i32::MAX as usize;

/// Occupancy grid storing one terrain code per cell
/// Cell values: -1=free, -10=obstacle (any other value is treated as free)
#[derive(Clone, Debug)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    pub cells: Vec<i32>,
    /// Revision number - incremented whenever grid cells change
    pub revision: u64,
}

impl Grid {
    /// Create a new grid with all cells set to FREE
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Grid {
            width,
            height,
            cells: vec![FREE; (width as usize).saturating_mul(height as usize)],
            revision: 0,
        }
    }

    /// Create an all-FREE grid from external dimensions, rejecting ones whose
    /// cell ids would not fit in an `i32`
    pub fn try_new(width: usize, height: usize) -> Result<Self, GridError> {
        match width.checked_mul(height) {
            Some(cells) if cells <= MAX_CELLS && width.max(height) <= MAX_CELLS => Ok(Self::new(width as i32, height as i32)),
            _ => Err(GridError::TooLarge { width, height }),
        }
    }

    /// Create a grid with specific obstacle cells
    pub fn with_obstacles(width: i32, height: i32, obstacles: &[(i32, i32)]) -> Self {
        let mut grid = Self::new(width, height);
        for &(x, y) in obstacles {
            grid.set_cell(x, y, OBSTACLE);
        }
        grid.revision = 0;
        grid
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Check if a cell at (x, y) is an obstacle
    pub fn is_obstacle(&self, x: i32, y: i32) -> bool {
        self.get_cell(x, y) == OBSTACLE
    }

    /// Convert (x, y) coordinates to cell ID
    pub fn get_id(&self, x: i32, y: i32) -> i32 {
        x + y * self.width
    }

    /// Get cell value at (x, y)
    pub fn get_cell(&self, x: i32, y: i32) -> i32 {
        if !self.in_bounds(x, y) {
            return OBSTACLE; // Out of bounds is treated as blocked
        }
        self.cells[self.get_id(x, y) as usize]
    }

    /// Set cell value at (x, y)
    pub fn set_cell(&mut self, x: i32, y: i32, value: i32) {
        if self.in_bounds(x, y) {
            let id = self.get_id(x, y) as usize;
            if self.cells[id] != value {
                self.cells[id] = value;
                self.revision += 1;
            }
        }
    }

    /// Get current grid revision number
    pub fn get_revision(&self) -> u64 {
        self.revision
    }

    /// Build a grid from a column-major document (`doc[x][y]`)
    pub fn from_columns(columns: &[Vec<i32>]) -> Result<Self, GridError> {
        let width = columns.len();
        let height = columns.first().map_or(0, Vec::len);

        if let Some((column, col)) = columns.iter().enumerate().find(|(_, c)| c.len() != height) {
            return Err(GridError::NotRectangular {
                column,
                expected: height,
                found: col.len(),
            });
        }

        let mut grid = Grid::try_new(width, height)?;
        for (x, col) in columns.iter().enumerate() {
            for (y, &value) in col.iter().enumerate() {
                let id = grid.get_id(x as i32, y as i32) as usize;
                grid.cells[id] = value;
            }
        }
        Ok(grid)
    }

    /// Export as a column-major document (`doc[x][y]`)
    pub fn to_columns(&self) -> Vec<Vec<i32>> {
        (0..self.width)
            .map(|x| (0..self.height).map(|y| self.get_cell(x, y)).collect())
            .collect()
    }

    /// Load from a JSON document
    pub fn from_json_file(path: &Path) -> Result<Self, GridError> {
        let bytes = fs::read(path).map_err(|source| GridError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let columns: Vec<Vec<i32>> = serde_json::from_slice(&bytes)?;
        Self::from_columns(&columns)
    }

    /// Save as a JSON document
    pub fn save_json(&self, path: &Path) -> Result<(), GridError> {
        let json = serde_json::to_string(&self.to_columns())?;
        fs::write(path, json).map_err(|source| GridError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from a monochrome image file
    pub fn from_image_file(path: &Path) -> Result<Self, GridError> {
        let img = image::open(path)?;
        Self::from_image(&img)
    }

    /// Threshold an image into FREE/OBSTACLE cells.
    ///
    /// Image rows run top-down while grid y runs world-up, so the vertical
    /// axis is flipped: pixel row 0 becomes grid row `height - 1`.
    pub fn from_image(img: &DynamicImage) -> Result<Self, GridError> {
        let (width, height) = img.dimensions();
        let mut grid = Grid::try_new(width as usize, height as usize)?;
        let rgb = img.to_rgb8();

        for (px, py, pixel) in rgb.enumerate_pixels() {
            let red = f32::from(pixel[0]) / 255.0;
            if red >= OBSTACLE_THRESHOLD {
                let id = grid.get_id(px as i32, (height - 1 - py) as i32) as usize;
                grid.cells[id] = OBSTACLE;
            }
        }
        Ok(grid)
    }
}
