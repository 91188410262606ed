//! Configuration for the memverse world generator.
//!
//! Maps directly to `memverse.toml`. Every field has a default, so an empty
//! file (or a file with only the sections you care about) is valid.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerseError};

/// Top-level generator configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerseConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Timeline sphere placement.
    #[serde(default)]
    pub placement: PlacementConfig,
    /// Procedural tree shape.
    #[serde(default)]
    pub tree: TreeConfig,
    /// Wandering agents.
    #[serde(default)]
    pub agents: AgentConfig,
}

impl VerseConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `VerseError::Config` if the TOML is invalid or the values are
    /// inconsistent (see [`VerseConfig::validate`]).
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| VerseError::Config(e.to_string()))?;
        config.validate()?;
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

    /// Reject values the generators cannot work with.
    ///
    /// # Errors
    /// Returns `VerseError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let p = &self.placement;
        if !(p.min_radius >= 0.0 && p.min_radius <= p.max_radius) {
            return Err(VerseError::Config(format!(
                "placement.min_radius ({}) must be in [0, max_radius ({})]",
                p.min_radius, p.max_radius
            )));
        }
        if p.scale_min > p.scale_max {
            return Err(VerseError::Config(
                "placement.scale_min must not exceed placement.scale_max".to_string(),
            ));
        }

        let t = &self.tree;
        if !(t.length_decay > 0.0 && t.length_decay < 1.0) {
            return Err(VerseError::Config(
                "tree.length_decay must be in (0, 1)".to_string(),
            ));
        }
        if !(t.radius_decay > 0.0 && t.radius_decay < 1.0) {
            return Err(VerseError::Config(
                "tree.radius_decay must be in (0, 1)".to_string(),
            ));
        }
        if !(t.taper > 0.0 && t.taper <= 1.0) {
            return Err(VerseError::Config(
                "tree.taper must be in (0, 1]".to_string(),
            ));
        }
        if t.min_children == 0 {
            return Err(VerseError::Config(
                "tree.min_children must be at least 1".to_string(),
            ));
        }
        if t.leaf_scale_min > t.leaf_scale_max {
            return Err(VerseError::Config(
                "tree.leaf_scale_min must not exceed tree.leaf_scale_max".to_string(),
            ));
        }

        let a = &self.agents;
        if a.speed <= 0.0 || a.arrival_distance <= 0.0 {
            return Err(VerseError::Config(
                "agents.speed and agents.arrival_distance must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Fixed world seed. `None` draws a fresh seed per run.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            seed: None,
        }
    }
}

/// Timeline sphere placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Radius of the oldest memory's shell.
    #[serde(default = "default_12_0")]
    pub min_radius: f32,
    /// Radius the newest memories approach.
    #[serde(default = "default_70_0")]
    pub max_radius: f32,
    /// Lower bound of the cosmetic frame scale.
    #[serde(default = "default_5_0")]
    pub scale_min: f32,
    /// Upper bound (exclusive) of the cosmetic frame scale.
    #[serde(default = "default_6_5")]
    pub scale_max: f32,
    /// Frames spin at a random rate in `[-spin_speed_max, spin_speed_max)`.
    #[serde(default = "default_0_001")]
    pub spin_speed_max: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min_radius: 12.0,
            max_radius: 70.0,
            scale_min: 5.0,
            scale_max: 6.5,
            spin_speed_max: 0.001,
        }
    }
}

/// Procedural tree shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Recursion depth below the trunk.
    #[serde(default = "default_5_u32")]
    pub levels: u32,
    /// Trunk length.
    #[serde(default = "default_4_0")]
    pub trunk_length: f32,
    /// Trunk bottom radius.
    #[serde(default = "default_1_0")]
    pub trunk_radius: f32,
    /// Max perturbation (radians) applied on the X and Z axes per child.
    #[serde(default = "default_0_55")]
    pub branch_angle: f32,
    /// Child length multiplier.
    #[serde(default = "default_0_85")]
    pub length_decay: f32,
    /// Child radius multiplier.
    #[serde(default = "default_0_7")]
    pub radius_decay: f32,
    /// Segment top radius as a fraction of its bottom radius.
    #[serde(default = "default_0_7")]
    pub taper: f32,
    /// Children every non-terminal branch always spawns.
    #[serde(default = "default_2_u32")]
    pub min_children: u32,
    /// Probability of one extra child.
    #[serde(default = "default_0_5")]
    pub extra_child_chance: f64,
    /// Leaves per terminal branch.
    #[serde(default = "default_8_usize")]
    pub leaf_cluster_size: usize,
    /// Half-extent of the cube leaves are scattered in.
    #[serde(default = "default_1_5")]
    pub leaf_spread: f32,
    /// Lower bound of the leaf scale.
    #[serde(default = "default_0_2")]
    pub leaf_scale_min: f32,
    /// Upper bound (exclusive) of the leaf scale.
    #[serde(default = "default_0_4")]
    pub leaf_scale_max: f32,
}

impl TreeConfig {
    /// Largest number of children a branch can spawn.
    #[must_use]
    pub fn max_children(&self) -> u32 {
        if self.extra_child_chance > 0.0 {
            self.min_children + 1
        } else {
            self.min_children
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            levels: 5,
            trunk_length: 4.0,
            trunk_radius: 1.0,
            branch_angle: 0.55,
            length_decay: 0.85,
            radius_decay: 0.7,
            taper: 0.7,
            min_children: 2,
            extra_child_chance: 0.5,
            leaf_cluster_size: 8,
            leaf_spread: 1.5,
            leaf_scale_min: 0.2,
            leaf_scale_max: 0.4,
        }
    }
}

/// Wandering agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Number of agents in the scene.
    #[serde(default = "default_3_usize")]
    pub count: usize,
    /// Travel speed in units per second.
    #[serde(default = "default_5_0")]
    pub speed: f32,
    /// Distance at which a moving agent counts as arrived.
    #[serde(default = "default_0_5_f32")]
    pub arrival_distance: f32,
    /// Seconds an agent points at its target before moving on.
    #[serde(default = "default_3_0")]
    pub point_duration: f32,
    /// Offset from a memory's position to the spot the agent stands on.
    #[serde(default = "default_anchor_offset")]
    pub anchor_offset: [f32; 3],
    /// Roll oscillation frequency while pointing (rad/s).
    #[serde(default = "default_10_0")]
    pub wobble_frequency: f32,
    /// Roll oscillation amplitude while pointing (radians).
    #[serde(default = "default_0_1")]
    pub wobble_amplitude: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            count: 3,
            speed: 5.0,
            arrival_distance: 0.5,
            point_duration: 3.0,
            anchor_offset: default_anchor_offset(),
            wobble_frequency: 10.0,
            wobble_amplitude: 0.1,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_log_level() -> String { "info".to_string() }
fn default_anchor_offset() -> [f32; 3] { [0.0, -2.0, 2.0] }
fn default_0_001() -> f32 { 0.001 }
fn default_0_1() -> f32 { 0.1 }
fn default_0_2() -> f32 { 0.2 }
fn default_0_4() -> f32 { 0.4 }
fn default_0_5() -> f64 { 0.5 }
fn default_0_5_f32() -> f32 { 0.5 }
fn default_0_55() -> f32 { 0.55 }
fn default_0_7() -> f32 { 0.7 }
fn default_0_85() -> f32 { 0.85 }
fn default_1_0() -> f32 { 1.0 }
fn default_1_5() -> f32 { 1.5 }
fn default_3_0() -> f32 { 3.0 }
fn default_4_0() -> f32 { 4.0 }
fn default_5_0() -> f32 { 5.0 }
fn default_6_5() -> f32 { 6.5 }
fn default_10_0() -> f32 { 10.0 }
fn default_12_0() -> f32 { 12.0 }
fn default_70_0() -> f32 { 70.0 }
fn default_2_u32() -> u32 { 2 }
fn default_5_u32() -> u32 { 5 }
fn default_3_usize() -> usize { 3 }
fn default_8_usize() -> usize { 8 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = VerseConfig::from_toml("").expect("parse");
        assert!((config.placement.min_radius - 12.0).abs() < f32::EPSILON);
        assert_eq!(config.tree.levels, 5);
        assert_eq!(config.tree.leaf_cluster_size, 8);
        assert_eq!(config.agents.count, 3);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = VerseConfig::from_toml(
            r#"
            [placement]
            max_radius = 40.0

            [tree]
            levels = 3
            "#,
        )
        .expect("parse");
        assert!((config.placement.max_radius - 40.0).abs() < f32::EPSILON);
        assert!((config.placement.min_radius - 12.0).abs() < f32::EPSILON);
        assert_eq!(config.tree.levels, 3);
        assert!((config.tree.length_decay - 0.85).abs() < f32::EPSILON);
    }

    #[test]
    fn inverted_radii_rejected() {
        let err = VerseConfig::from_toml(
            r#"
            [placement]
            min_radius = 80.0
            max_radius = 10.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, VerseError::Config(_)));
    }

    #[test]
    fn non_shrinking_branches_rejected() {
        let err = VerseConfig::from_toml("[tree]\nradius_decay = 1.0\n").unwrap_err();
        assert!(err.to_string().contains("radius_decay"));
    }

    #[test]
    fn widening_taper_rejected() {
        let err = VerseConfig::from_toml("[tree]\ntaper = 1.2\n").unwrap_err();
        assert!(err.to_string().contains("tree.taper"));
        assert!(VerseConfig::from_toml("[tree]\ntaper = 0.0\n").is_err());
        assert!(VerseConfig::from_toml("[tree]\ntaper = 1.0\n").is_ok());
    }

    #[test]
    fn max_children_tracks_extra_chance() {
        let mut tree = TreeConfig::default();
        assert_eq!(tree.max_children(), 3);
        tree.extra_child_chance = 0.0;
        assert_eq!(tree.max_children(), 2);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("memverse.toml");
        std::fs::write(&path, "[general]\nseed = 42\n").expect("write");
        let config = VerseConfig::from_file(&path).expect("load");
        assert_eq!(config.general.seed, Some(42));
    }
}
