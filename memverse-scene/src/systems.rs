//! Per-frame systems.
//!
//! Standalone functions over plain state; [`crate::universe::MemoryUniverse`]
//! calls them in order from its `tick`.
//!
//! | System          | Runs           |
//! |-----------------|----------------|
//! | Group spin      | Every frame    |
//! | Frame bobbing   | On draw        |
//! | Agent update    | Every frame    |
//! | Petal fall      | Every frame    |

use glam::Vec3;
use memverse_core::agent::Agent;
use memverse_core::config::AgentConfig;
use memverse_core::types::FrameTick;
use rand::Rng;

use crate::config::MotionConfig;

/// Rotate the memory group by one frame's worth of spin.
pub fn spin_memory_group(rotation: &mut Vec3, motion: &MotionConfig) {
    rotation.y += motion.spin_y;
    rotation.z += motion.spin_z;
}

/// Vertical bob for a frame resting at `anchor`. Frames at different
/// distances drift out of phase.
#[must_use]
pub fn bob_offset(anchor: Vec3, elapsed: f32, amplitude: f32) -> f32 {
    (elapsed + anchor.length()).sin() * amplitude
}

/// Scale a frame is drawn with.
#[must_use]
pub fn frame_scale(base_scale: f32, hovered: bool, hover_scale: f32) -> f32 {
    if hovered { base_scale * hover_scale } else { base_scale }
}

/// Move every agent one frame along its tour.
pub fn run_agents<R: Rng + ?Sized>(
    agents: &mut [Agent],
    tick: FrameTick,
    targets: &[Vec3],
    config: &AgentConfig,
    rng: &mut R,
) {
    for agent in agents {
        agent.update(tick, targets, config, rng);
    }
}
