//! Falling petals around the canopy.
//!
//! Petals live in tree space. Each frame they drop by their own speed,
//! sway on X, spin on X and Y, and restart above the canopy once they pass
//! the floor.

use glam::Vec3;
use memverse_core::random::{symmetric, uniform};
use memverse_core::types::FrameTick;
use rand::Rng;

use crate::components::PetalInstance;
use crate::config::PetalConfig;

/// One petal's simulation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Petal {
    /// Position in tree space.
    pub position: Vec3,
    /// Euler rotation; X and Y advance together.
    pub rotation: Vec3,
    /// Fall per frame.
    pub speed: f32,
    /// Spin per frame.
    pub rotation_speed: f32,
}

/// The whole petal particle system.
#[derive(Debug, Clone, PartialEq)]
pub struct PetalField {
    petals: Vec<Petal>,
    config: PetalConfig,
}

impl PetalField {
    /// Scatter `config.count` petals through the canopy volume.
    pub fn spawn<R: Rng + ?Sized>(config: &PetalConfig, rng: &mut R) -> Self {
        let petals = (0..config.count)
            .map(|_| Petal {
                position: Vec3::new(
                    symmetric(rng, config.spawn_half_extent),
                    uniform(rng, config.spawn_min_y, config.respawn_y),
                    symmetric(rng, config.spawn_half_extent),
                ),
                rotation: Vec3::ZERO,
                speed: uniform(rng, config.speed_min, config.speed_max),
                rotation_speed: symmetric(rng, config.rotation_speed_max),
            })
            .collect();
        Self {
            petals,
            config: config.clone(),
        }
    }

    /// Advance every petal by one frame.
    pub fn step<R: Rng + ?Sized>(&mut self, tick: FrameTick, rng: &mut R) {
        let config = &self.config;
        for (i, petal) in self.petals.iter_mut().enumerate() {
            petal.position.y -= petal.speed;
            petal.position.x +=
                (tick.elapsed * config.sway_frequency + i as f32).sin() * config.sway;

            if petal.position.y < config.floor_y {
                petal.position = Vec3::new(
                    symmetric(rng, config.respawn_half_extent),
                    config.respawn_y,
                    symmetric(rng, config.respawn_half_extent),
                );
            }

            petal.rotation.x += petal.rotation_speed;
            petal.rotation.y += petal.rotation_speed;
        }
    }

    /// Simulation state, one entry per petal.
    #[must_use]
    pub fn petals(&self) -> &[Petal] {
        &self.petals
    }

    /// Draw descriptors for the current state.
    #[must_use]
    pub fn instances(&self) -> Vec<PetalInstance> {
        self.petals
            .iter()
            .map(|p| PetalInstance {
                position: p.position,
                rotation: p.rotation,
                scale: self.config.scale,
            })
            .collect()
    }
}
