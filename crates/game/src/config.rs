//! Game configuration (playfield, sizes, seeding). Loaded from config.ron at startup.

use physics::DRONE_SIZE;
use procgen::{obstacle_slots, TerrainConfig, DEFAULT_AREA_PER_OBSTACLE, DEFAULT_TARGET_SIZE};
use serde::{Deserialize, Serialize};

/// Persistent game settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Playfield width in tiles (x).
    #[serde(default = "default_map_size_x")]
    pub map_size_x: u32,
    /// Playfield depth in tiles (z).
    #[serde(default = "default_map_size_z")]
    pub map_size_z: u32,
    /// Highest altitude the drone may reach. Also sets the boost multiplier (ceiling / 5).
    #[serde(default = "default_map_ceiling")]
    pub map_ceiling: f32,
    /// Ground area per obstacle slot; lower means denser terrain.
    #[serde(default = "default_obstacle_area")]
    pub obstacle_area_per_obstacle: u32,
    #[serde(default = "default_drone_size")]
    pub drone_size: f32,
    #[serde(default = "default_target_size")]
    pub target_size: f32,
    /// Fixed placement seed. Random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Stop placing a package after this many draws and report the terrain as too dense.
    /// Absent means retry until placement succeeds.
    #[serde(default)]
    pub placement_attempt_cap: Option<u32>,
    /// Frames simulated by the headless driver.
    #[serde(default = "default_headless_frames")]
    pub headless_frames: u32,
}

fn default_map_size_x() -> u32 {
    110
}
fn default_map_size_z() -> u32 {
    100
}
fn default_map_ceiling() -> f32 {
    15.0
}
fn default_obstacle_area() -> u32 {
    DEFAULT_AREA_PER_OBSTACLE
}
fn default_drone_size() -> f32 {
    DRONE_SIZE
}
fn default_target_size() -> f32 {
    DEFAULT_TARGET_SIZE
}
fn default_headless_frames() -> u32 {
    3600
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_size_x: default_map_size_x(),
            map_size_z: default_map_size_z(),
            map_ceiling: default_map_ceiling(),
            obstacle_area_per_obstacle: default_obstacle_area(),
            drone_size: default_drone_size(),
            target_size: default_target_size(),
            seed: None,
            placement_attempt_cap: None,
            headless_frames: default_headless_frames(),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            return Self::parse(&data).unwrap_or_else(|e| {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            });
        }
        Self::default()
    }

    /// Parse a RON document. Missing fields take their defaults.
    pub fn parse(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    /// Whether a `config.ron` exists to load from.
    pub fn exists() -> bool {
        config_path().is_file()
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(&path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }

    /// Number of obstacle slots for the configured playfield.
    pub fn obstacle_count(&self) -> usize {
        obstacle_slots(self.map_size_x, self.map_size_z, self.obstacle_area_per_obstacle)
    }

    pub fn terrain_config(&self) -> TerrainConfig {
        TerrainConfig {
            size_x: self.map_size_x,
            size_z: self.map_size_z,
            obstacle_count: self.obstacle_count(),
            target_size: self.target_size,
            drone_size: self.drone_size,
            attempt_cap: self.placement_attempt_cap,
            seed: self.seed,
        }
    }
}

fn config_path() -> std::path::PathBuf {
    std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from(".")).join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_playfield() {
        let config = GameConfig::default();
        assert_eq!(config.obstacle_count(), 275);
        assert_eq!(
            config.terrain_config().obstacle_count,
            TerrainConfig::default().obstacle_count
        );
        assert_eq!(config.terrain_config().attempt_cap, None);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config = GameConfig::parse("(map_size_x: 20, seed: Some(7))").unwrap();
        assert_eq!(config.map_size_x, 20);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.map_size_z, 100);
        assert_eq!(config.headless_frames, 3600);
        assert_eq!(config.obstacle_count(), 20 * 100 / 40);
    }

    #[test]
    fn pretty_output_parses_back() {
        let config = GameConfig {
            placement_attempt_cap: Some(500),
            ..Default::default()
        };
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        assert_eq!(GameConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(GameConfig::parse("not ron at all {").is_err());
    }

    #[test]
    fn zero_area_does_not_divide_by_zero() {
        let config = GameConfig {
            obstacle_area_per_obstacle: 0,
            map_size_x: 4,
            map_size_z: 5,
            ..Default::default()
        };
        assert_eq!(config.obstacle_count(), 20);
    }
}
