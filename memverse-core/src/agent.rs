//! Wandering helper agents.
//!
//! Each agent walks to a spot just below and in front of a memory, points
//! at it for a few seconds, then picks another memory. The two rules live in
//! [`AgentState::next`] so they can be exercised without a render loop;
//! [`Agent::update`] adds movement and facing on top.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::AgentConfig;
use crate::types::FrameTick;

/// Behaviour state of one agent. `target` indexes the memory pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AgentState {
    /// Walking toward the target's anchor.
    Moving {
        /// Memory being walked to.
        target: usize,
    },
    /// Standing at the anchor, pointing at the memory.
    Pointing {
        /// Memory being pointed at.
        target: usize,
        /// Seconds spent pointing so far.
        elapsed: f32,
    },
}

impl AgentState {
    /// The memory this state is about.
    #[must_use]
    pub fn target(&self) -> usize {
        match *self {
            Self::Moving { target } | Self::Pointing { target, .. } => target,
        }
    }

    /// Whether the agent is walking.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        matches!(self, Self::Moving { .. })
    }

    /// Apply one tick of the transition rules.
    ///
    /// - `Moving` becomes `Pointing { elapsed: 0 }` once the anchor is closer
    ///   than `arrival_distance`.
    /// - `Pointing` accumulates `dt`; after `point_duration` it becomes
    ///   `Moving` toward a different memory (the same one only when the pool
    ///   holds a single memory).
    #[must_use]
    pub fn next<R: Rng + ?Sized>(
        self,
        distance_to_anchor: f32,
        dt: f32,
        pool_len: usize,
        config: &AgentConfig,
        rng: &mut R,
    ) -> Self {
        match self {
            Self::Moving { target } if distance_to_anchor < config.arrival_distance => {
                Self::Pointing {
                    target,
                    elapsed: 0.0,
                }
            }
            Self::Moving { .. } => self,
            Self::Pointing { target, elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= config.point_duration {
                    Self::Moving {
                        target: pick_next_target(target, pool_len, rng),
                    }
                } else {
                    Self::Pointing { target, elapsed }
                }
            }
        }
    }
}

/// Uniform random memory index other than `current`.
///
/// A collision is bumped to the next index, so with a single memory the
/// agent keeps its target. An empty pool yields `0`.
pub fn pick_next_target<R: Rng + ?Sized>(current: usize, pool_len: usize, rng: &mut R) -> usize {
    if pool_len == 0 {
        return 0;
    }
    let next = rng.gen_range(0..pool_len);
    if next == current {
        (next + 1) % pool_len
    } else {
        next
    }
}

/// One helper agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Stable identifier, starting at 1.
    pub id: u32,
    /// Colour slot for the renderer (0, 1, 2 cycling).
    pub palette: u8,
    /// Current position.
    pub position: Vec3,
    /// Point the agent is facing.
    pub look_at: Vec3,
    /// Cosmetic roll around the facing axis (radians).
    pub roll: f32,
    /// Behaviour state.
    pub state: AgentState,
}

impl Agent {
    /// Spawn an agent at the origin heading for a random memory.
    pub fn spawn<R: Rng + ?Sized>(id: u32, pool_len: usize, rng: &mut R) -> Self {
        let target = if pool_len == 0 { 0 } else { rng.gen_range(0..pool_len) };
        Self {
            id,
            palette: ((id.saturating_sub(1)) % 3) as u8,
            position: Vec3::ZERO,
            look_at: Vec3::ZERO,
            roll: 0.0,
            state: AgentState::Moving { target },
        }
    }

    /// Where an agent stands to point at a memory at `memory_position`.
    #[must_use]
    pub fn anchor(memory_position: Vec3, config: &AgentConfig) -> Vec3 {
        memory_position + Vec3::from_array(config.anchor_offset)
    }

    /// Advance by one frame.
    ///
    /// `targets` holds the memory positions in pool order. With an empty
    /// pool the agent idles.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        tick: FrameTick,
        targets: &[Vec3],
        config: &AgentConfig,
        rng: &mut R,
    ) {
        if targets.is_empty() {
            return;
        }
        if self.state.target() >= targets.len() {
            // The pool shrank under us.
            self.state = AgentState::Moving {
                target: rng.gen_range(0..targets.len()),
            };
        }

        let anchor = Self::anchor(targets[self.state.target()], config);
        let distance = self.position.distance(anchor);

        if self.state.is_moving() && distance >= config.arrival_distance {
            let step = (config.speed * tick.delta).min(distance);
            self.position += (anchor - self.position) / distance * step;
        }

        let previous = self.state;
        self.state = self
            .state
            .next(distance, tick.delta, targets.len(), config, rng);
        if previous.is_moving() != self.state.is_moving() {
            trace!(agent = self.id, from = ?previous, to = ?self.state, "Agent transition");
        }

        let memory = targets[self.state.target()];
        match self.state {
            AgentState::Moving { .. } => {
                self.look_at = Self::anchor(memory, config);
                self.roll = 0.0;
            }
            AgentState::Pointing { .. } => {
                self.look_at = memory;
                self.roll =
                    (tick.elapsed * config.wobble_frequency).sin() * config.wobble_amplitude;
            }
        }
    }
}

/// Spawn `config.count` agents with ids `1..=count`.
pub fn spawn_agents<R: Rng + ?Sized>(
    config: &AgentConfig,
    pool_len: usize,
    rng: &mut R,
) -> Vec<Agent> {
    (1u32..)
        .zip(0..config.count)
        .map(|(id, _)| Agent::spawn(id, pool_len, rng))
        .collect()
}
