//! Scene-level configuration.
//!
//! Layers presentation tuning (petals, motion) on top of the generator's
//! [`VerseConfig`]. Both live in the same `memverse.toml`: the generator
//! sections (`[placement]`, `[tree]`, `[agents]`, `[general]`) sit next to
//! `[petals]`, `[motion]` and `[demo]`.

use memverse_core::config::VerseConfig;
use memverse_core::error::{Result, VerseError};
use serde::{Deserialize, Serialize};

/// Full scene configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Generator settings.
    #[serde(flatten)]
    pub verse: VerseConfig,
    /// Falling petal particles.
    #[serde(default)]
    pub petals: PetalConfig,
    /// Per-frame motion of the memory shell and frames.
    #[serde(default)]
    pub motion: MotionConfig,
    /// Demo data generated when no memories are supplied.
    #[serde(default)]
    pub demo: DemoConfig,
}

impl SceneConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `VerseError::Config` if the TOML is invalid or fails
    /// validation.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| VerseError::Config(e.to_string()))?;
        config.verse.validate()?;
        if config.petals.speed_min > config.petals.speed_max {
            return Err(VerseError::Config(
                "petals.speed_min must not exceed petals.speed_max".to_string(),
            ));
        }
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// Falling petal particles around the canopy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetalConfig {
    /// Number of petals.
    #[serde(default = "default_200")]
    pub count: usize,
    /// Initial spawn half-extent on X and Z.
    #[serde(default = "default_10_0")]
    pub spawn_half_extent: f32,
    /// Lowest initial spawn height.
    #[serde(default = "default_8_0")]
    pub spawn_min_y: f32,
    /// Height petals restart from after hitting the floor; also the highest
    /// initial spawn height.
    #[serde(default = "default_18_0")]
    pub respawn_y: f32,
    /// Respawn half-extent on X and Z.
    #[serde(default = "default_7_5")]
    pub respawn_half_extent: f32,
    /// Petals below this height respawn.
    #[serde(default)]
    pub floor_y: f32,
    /// Slowest fall per frame.
    #[serde(default = "default_0_01")]
    pub speed_min: f32,
    /// Fastest fall per frame (exclusive).
    #[serde(default = "default_0_05")]
    pub speed_max: f32,
    /// Spin per frame is drawn from `[-rotation_speed_max, rotation_speed_max)`.
    #[serde(default = "default_0_025")]
    pub rotation_speed_max: f32,
    /// Horizontal sway per frame.
    #[serde(default = "default_0_01")]
    pub sway: f32,
    /// Sway frequency (rad/s).
    #[serde(default = "default_0_5")]
    pub sway_frequency: f32,
    /// Uniform petal scale.
    #[serde(default = "default_0_25")]
    pub scale: f32,
}

impl Default for PetalConfig {
    fn default() -> Self {
        Self {
            count: 200,
            spawn_half_extent: 10.0,
            spawn_min_y: 8.0,
            respawn_y: 18.0,
            respawn_half_extent: 7.5,
            floor_y: 0.0,
            speed_min: 0.01,
            speed_max: 0.05,
            rotation_speed_max: 0.025,
            sway: 0.01,
            sway_frequency: 0.5,
            scale: 0.25,
        }
    }
}

/// Per-frame motion tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Memory shell rotation around Y per frame (radians).
    #[serde(default = "default_0_0005")]
    pub spin_y: f32,
    /// Memory shell rotation around Z per frame (radians).
    #[serde(default = "default_0_0002")]
    pub spin_z: f32,
    /// Amplitude of the frame bobbing offset.
    #[serde(default = "default_0_5")]
    pub bob_amplitude: f32,
    /// Frame scale multiplier while hovered.
    #[serde(default = "default_1_5")]
    pub hover_scale: f32,
    /// Frames with a base scale above this get a tether line to the tree.
    #[serde(default = "default_5_0")]
    pub tether_min_scale: f32,
    /// Vertical offset of the tree group so the canopy sits near the origin.
    #[serde(default = "default_neg_8_0")]
    pub tree_offset_y: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            spin_y: 0.0005,
            spin_z: 0.0002,
            bob_amplitude: 0.5,
            hover_scale: 1.5,
            tether_min_scale: 5.0,
            tree_offset_y: -8.0,
        }
    }
}

/// Demo data set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Number of placeholder memories.
    #[serde(default = "default_100")]
    pub memory_count: usize,
    /// Date of the first placeholder memory (`YYYY-MM-DD`).
    #[serde(default = "default_start_date")]
    pub start_date: String,
    /// Days between consecutive placeholder memories.
    #[serde(default = "default_5_u64")]
    pub spacing_days: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            memory_count: 100,
            start_date: default_start_date(),
            spacing_days: 5,
        }
    }
}

fn default_start_date() -> String { "2020-01-01".to_string() }
fn default_0_0002() -> f32 { 0.0002 }
fn default_0_0005() -> f32 { 0.0005 }
fn default_0_01() -> f32 { 0.01 }
fn default_0_025() -> f32 { 0.025 }
fn default_0_05() -> f32 { 0.05 }
fn default_0_25() -> f32 { 0.25 }
fn default_0_5() -> f32 { 0.5 }
fn default_1_5() -> f32 { 1.5 }
fn default_5_0() -> f32 { 5.0 }
fn default_7_5() -> f32 { 7.5 }
fn default_8_0() -> f32 { 8.0 }
fn default_10_0() -> f32 { 10.0 }
fn default_18_0() -> f32 { 18.0 }
fn default_neg_8_0() -> f32 { -8.0 }
fn default_5_u64() -> u64 { 5 }
fn default_100() -> usize { 100 }
fn default_200() -> usize { 200 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_file_configures_generator_and_scene() {
        let config = SceneConfig::from_toml(
            r#"
            [general]
            seed = 7

            [tree]
            levels = 3

            [petals]
            count = 50

            [motion]
            hover_scale = 2.0
            "#,
        )
        .expect("parse");
        assert_eq!(config.verse.general.seed, Some(7));
        assert_eq!(config.verse.tree.levels, 3);
        assert_eq!(config.petals.count, 50);
        assert!((config.motion.hover_scale - 2.0).abs() < f32::EPSILON);
        assert_eq!(config.demo.memory_count, 100);
    }

    #[test]
    fn generator_validation_still_applies() {
        assert!(SceneConfig::from_toml("[tree]\nlength_decay = 1.5\n").is_err());
    }

    #[test]
    fn petal_speed_band_validated() {
        let err = SceneConfig::from_toml("[petals]\nspeed_min = 1.0\nspeed_max = 0.5\n").unwrap_err();
        assert!(err.to_string().contains("petals.speed_min"));
    }
}
