//! Timeline sphere placement (Fibonacci / golden-angle distribution).
//!
//! Items arrive sorted oldest first. Item `i` of `n` sits on a shell whose
//! radius grows linearly with `i / n`, at the `i`-th point of a Fibonacci
//! spiral running from the north pole (`y = 1`) to the south pole
//! (`y = -1`). The golden-angle step keeps neighbours apart without banding:
//!
//! ```text
//! y      = 1 - 2 i / (n - 1)
//! r(y)   = sqrt(1 - y²)
//! theta  = i · π (3 - √5)
//! R      = min + (i / n) (max - min)
//! pos    = (cos(theta) r(y) R, y R, sin(theta) r(y) R)
//! ```
//!
//! Scale and spin jitter are cosmetic and drawn after the geometry, so they
//! can never reorder items or move them off their shell.

use std::f32::consts::PI;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PlacementConfig;
use crate::random::{symmetric, uniform};

/// Where one memory ended up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Position in chronological order.
    pub index: usize,
    /// Point on the shell.
    pub position: Vec3,
    /// Shell radius (distance from the tree at the origin).
    pub radius: f32,
    /// Cosmetic frame scale.
    pub scale: f32,
    /// Cosmetic spin rate of the frame.
    pub spin_speed: f32,
}

/// `π (3 - √5)`, about 2.39996 rad.
#[must_use]
pub fn golden_angle() -> f32 {
    PI * (3.0 - 5.0_f32.sqrt())
}

/// Shell radius for item `index` of `total`.
///
/// Linear in `index / total`, so the first item sits exactly on `min` and
/// the last one stops one step short of `max`. A single item gets `min`.
#[must_use]
pub fn radius_for(index: usize, total: usize, min: f32, max: f32) -> f32 {
    if total <= 1 {
        return min;
    }
    let progress = index as f32 / total as f32;
    min + progress * (max - min)
}

/// Position of item `index` of `total`.
///
/// Total over all inputs: `total == 0` yields the origin, `total == 1`
/// puts the item on the +Y axis at `min`, and out-of-range indices are
/// clamped to the south pole.
#[must_use]
pub fn position_for(index: usize, total: usize, min: f32, max: f32) -> Vec3 {
    if total == 0 {
        return Vec3::ZERO;
    }
    let radius = radius_for(index, total, min, max);
    if total == 1 {
        return Vec3::new(0.0, radius, 0.0);
    }

    let y = (1.0 - (index as f32 / (total - 1) as f32) * 2.0).clamp(-1.0, 1.0);
    let radius_at_y = (1.0 - y * y).max(0.0).sqrt();
    let theta = golden_angle() * index as f32;

    Vec3::new(
        theta.cos() * radius_at_y * radius,
        y * radius,
        theta.sin() * radius_at_y * radius,
    )
}

/// Lay out `total` chronologically sorted memories.
///
/// Returns an empty vector for `total == 0`.
pub fn place_memories<R: Rng + ?Sized>(
    total: usize,
    config: &PlacementConfig,
    rng: &mut R,
) -> Vec<Placement> {
    let placements: Vec<Placement> = (0..total)
        .map(|index| Placement {
            index,
            position: position_for(index, total, config.min_radius, config.max_radius),
            radius: radius_for(index, total, config.min_radius, config.max_radius),
            scale: uniform(rng, config.scale_min, config.scale_max),
            spin_speed: symmetric(rng, config.spin_speed_max),
        })
        .collect();

    debug!(
        count = placements.len(),
        outer_radius = placements.last().map_or(0.0, |p| p.radius),
        "Placed memories on timeline sphere"
    );
    placements
}
