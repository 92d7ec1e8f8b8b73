use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_grid_path")]
    pub path: String,
    /// Size of the blank grid used when `path` cannot be loaded
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
}

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    /// Added to world positions to land the playable area on non-negative cells
    #[serde(default = "default_world_offset")]
    pub world_offset_x: f32,
    #[serde(default = "default_world_offset")]
    pub world_offset_y: f32,
    #[serde(default = "default_arrival_radius")]
    pub arrival_radius: f32,
    #[serde(default = "default_path_lifetime")]
    pub path_lifetime: f32,
    #[serde(default = "default_lifetime_decay")]
    pub lifetime_decay: f32,
    /// Cells per second
    #[serde(default = "default_max_speed")]
    pub max_speed: f32,
    #[serde(default = "default_steering_gain")]
    pub steering_gain: f32,
}

#[derive(Debug, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    #[serde(default = "default_bg")]
    pub background_r: u8,
    #[serde(default = "default_bg")]
    pub background_g: u8,
    #[serde(default = "default_bg")]
    pub background_b: u8,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Default env_logger filter, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_grid_path() -> String { "NavMeshes/defaultnavmesh.json".to_string() }
fn default_width() -> i32 { 100 }
fn default_height() -> i32 { 100 }
fn default_world_offset() -> f32 { 50.0 }
fn default_arrival_radius() -> f32 { 1.5 }
fn default_path_lifetime() -> f32 { 5.0 }
fn default_lifetime_decay() -> f32 { 0.02 }
fn default_max_speed() -> f32 { 6.0 }
fn default_steering_gain() -> f32 { 0.2 }
fn default_cell_size() -> f32 { 8.0 }
fn default_bg() -> u8 { 30 }
fn default_log_level() -> String { "info".to_string() }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            path: default_grid_path(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            world_offset_x: default_world_offset(),
            world_offset_y: default_world_offset(),
            arrival_radius: default_arrival_radius(),
            path_lifetime: default_path_lifetime(),
            lifetime_decay: default_lifetime_decay(),
            max_speed: default_max_speed(),
            steering_gain: default_steering_gain(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            background_r: default_bg(),
            background_g: default_bg(),
            background_b: default_bg(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            agent: AgentConfig::default(),
            viewer: ViewerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from config.toml, or use defaults if it doesn't exist
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    warn!("Using default configuration");
                    Config::default()
                }
            },
            Err(_) => {
                info!("No {} found, using default configuration", path.display());
                Config::default()
            }
        }
    }
}
