//! Procedural branching generator for the central tree.
//!
//! Each call emits one cylinder segment from `start` along `direction`, then
//! either scatters a blossom cluster at the tip (level 0) or recurses into
//! two or three children that are tilted, twisted around the vertical axis,
//! and shrunk by the configured decay factors.
//!
//! The recursion is pure: every call returns its own [`TreeSkeleton`] and
//! the caller adopts the children's skeletons, re-basing their indices.
//! Depth strictly decreases, so generation terminates for any random draws.

use std::f32::consts::{PI, TAU};

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::TreeConfig;
use crate::error::{Result, VerseError};
use crate::random::{symmetric, uniform};

/// Deepest recursion [`grow_tree`] will run. `3^13` segments is already far
/// past anything a renderer can draw.
pub const MAX_LEVELS: u32 = 12;

/// One straight cylindrical piece of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BranchSegment {
    /// Centre of the cylinder.
    pub midpoint: Vec3,
    /// Rotation taking +Y onto the branch direction.
    pub orientation: Quat,
    /// Cylinder height.
    pub length: f32,
    /// Radius at the tip.
    pub radius_top: f32,
    /// Radius at the base.
    pub radius_bottom: f32,
    /// Remaining recursion depth when this segment was emitted. Zero marks a
    /// terminal branch.
    pub level: u32,
    /// Index of the segment this one grows out of. `None` for the trunk.
    pub parent: Option<usize>,
}

impl BranchSegment {
    /// Unit vector from base to tip.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Centre of the base cap.
    #[must_use]
    pub fn start_point(&self) -> Vec3 {
        self.midpoint - self.direction() * (self.length * 0.5)
    }

    /// Centre of the tip cap.
    #[must_use]
    pub fn end_point(&self) -> Vec3 {
        self.midpoint + self.direction() * (self.length * 0.5)
    }

    /// Whether this segment ends in blossoms instead of children.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.level == 0
    }
}

/// One blossom in a terminal cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeafPlacement {
    /// Blossom centre.
    pub position: Vec3,
    /// Euler angles (XYZ, radians).
    pub rotation: Vec3,
    /// Uniform scale.
    pub scale: f32,
    /// Index of the terminal segment that spawned this blossom.
    pub branch: usize,
}

/// Output of one generator run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeSkeleton {
    /// Segments in depth-first order; the trunk comes first.
    pub segments: Vec<BranchSegment>,
    /// Blossoms at terminal branches.
    pub leaves: Vec<LeafPlacement>,
}

impl TreeSkeleton {
    /// Whether the run produced nothing (degenerate input).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Indices of all terminal segments.
    pub fn terminal_segments(&self) -> impl Iterator<Item = usize> + '_ {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_terminal())
            .map(|(i, _)| i)
    }

    /// Blossoms spawned by segment `branch`.
    pub fn leaves_of(&self, branch: usize) -> impl Iterator<Item = &LeafPlacement> + '_ {
        self.leaves.iter().filter(move |l| l.branch == branch)
    }

    /// Number of segments on the path from the trunk to `index`, inclusive.
    #[must_use]
    pub fn path_len(&self, index: usize) -> usize {
        let mut len = 0;
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            len += 1;
            cursor = self.segments.get(i).and_then(|s| s.parent);
        }
        len
    }

    /// Encode for shipping to a renderer process.
    ///
    /// # Errors
    /// Returns [`VerseError::Serialization`] if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| VerseError::Serialization(e.to_string()))
    }

    /// Decode a skeleton produced by [`TreeSkeleton::to_bytes`].
    ///
    /// # Errors
    /// Returns [`VerseError::Serialization`] on malformed input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| VerseError::Serialization(e.to_string()))
    }

    /// Append a child run, hanging its root off `parent`.
    fn adopt(&mut self, child: TreeSkeleton, parent: usize) {
        let base = self.segments.len();
        self.segments.extend(child.segments.into_iter().map(|mut s| {
            s.parent = Some(s.parent.map_or(parent, |p| p + base));
            s
        }));
        self.leaves.extend(child.leaves.into_iter().map(|mut l| {
            l.branch += base;
            l
        }));
    }
}

/// Upper bound on segment count: `Σ_{k=0..=levels} max_children^k`.
#[must_use]
pub fn max_segment_count(levels: u32, max_children: u32) -> usize {
    let fanout = max_children as usize;
    let mut total: usize = 0;
    let mut layer: usize = 1;
    for _ in 0..=levels {
        total = total.saturating_add(layer);
        layer = layer.saturating_mul(fanout);
    }
    total
}

/// Grow the full tree from the configured trunk at the origin, pointing up.
pub fn grow_tree<R: Rng + ?Sized>(config: &TreeConfig, rng: &mut R) -> TreeSkeleton {
    let levels = if config.levels > MAX_LEVELS {
        warn!(requested = config.levels, max = MAX_LEVELS, "Clamping tree depth");
        MAX_LEVELS
    } else {
        config.levels
    };

    let skeleton = grow_branch(
        Vec3::ZERO,
        Vec3::Y,
        config.trunk_length,
        config.trunk_radius,
        levels,
        config,
        rng,
    );

    debug!(
        levels,
        segments = skeleton.segments.len(),
        leaves = skeleton.leaves.len(),
        "Grew tree skeleton"
    );
    skeleton
}

/// Grow one branch and everything above it.
///
/// Returns an empty skeleton for non-positive or non-finite `length` /
/// `radius`, or a zero-length `direction`.
pub fn grow_branch<R: Rng + ?Sized>(
    start: Vec3,
    direction: Vec3,
    length: f32,
    radius: f32,
    level: u32,
    config: &TreeConfig,
    rng: &mut R,
) -> TreeSkeleton {
    if !(length.is_finite() && length > 0.0 && radius.is_finite() && radius > 0.0)
        || !start.is_finite()
    {
        return TreeSkeleton::default();
    }
    let Some(direction) = direction.try_normalize() else {
        return TreeSkeleton::default();
    };

    let end = start + direction * length;
    let mut skeleton = TreeSkeleton {
        segments: vec![BranchSegment {
            midpoint: (start + end) * 0.5,
            orientation: Quat::from_rotation_arc(Vec3::Y, direction),
            length,
            radius_top: radius * config.taper,
            radius_bottom: radius,
            level,
            parent: None,
        }],
        leaves: Vec::new(),
    };

    if level == 0 {
        skeleton.leaves = blossom_cluster(end, config, rng);
        return skeleton;
    }

    let extra = rng.gen_bool(config.extra_child_chance.clamp(0.0, 1.0));
    let children = config.min_children + u32::from(extra);
    for _ in 0..children {
        let child_direction = perturb(direction, config.branch_angle, rng);
        let child = grow_branch(
            end,
            child_direction,
            length * config.length_decay,
            radius * config.radius_decay,
            level - 1,
            config,
            rng,
        );
        skeleton.adopt(child, 0);
    }
    skeleton
}

/// Tilt `direction` by up to `max_angle` around X and Z, then twist it a
/// random full turn around +Y so siblings don't share a plane.
fn perturb<R: Rng + ?Sized>(direction: Vec3, max_angle: f32, rng: &mut R) -> Vec3 {
    let tilt = Quat::from_euler(
        EulerRot::XYZ,
        symmetric(rng, max_angle),
        0.0,
        symmetric(rng, max_angle),
    );
    let tilted = (tilt * direction).try_normalize().unwrap_or(direction);
    let twist = Quat::from_rotation_y(uniform(rng, 0.0, TAU));
    (twist * tilted).try_normalize().unwrap_or(tilted)
}

fn blossom_cluster<R: Rng + ?Sized>(
    tip: Vec3,
    config: &TreeConfig,
    rng: &mut R,
) -> Vec<LeafPlacement> {
    (0..config.leaf_cluster_size)
        .map(|_| LeafPlacement {
            position: tip
                + Vec3::new(
                    symmetric(rng, config.leaf_spread),
                    symmetric(rng, config.leaf_spread),
                    symmetric(rng, config.leaf_spread),
                ),
            rotation: Vec3::new(uniform(rng, 0.0, PI), uniform(rng, 0.0, PI), 0.0),
            scale: uniform(rng, config.leaf_scale_min, config.leaf_scale_max),
            branch: 0,
        })
        .collect()
}
