use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing an occupancy grid
#[derive(Debug, Error)]
pub enum GridError {
    #[error("Failed to access grid file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid grid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid grid image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Grid column {column} has {found} cells, expected {expected}")]
    NotRectangular {
        column: usize,
        expected: usize,
        found: usize,
    },

    #[error("Grid of {width}x{height} cells is too large")]
    TooLarge { width: usize, height: usize },

    #[error("'{}' is neither a JSON grid ({json}) nor an image ({image})", path.display())]
    Unrecognized {
        path: PathBuf,
        json: String,
        image: String,
    },
}
