//! Property-based tests for per-frame scene motion.

use glam::Vec3;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use memverse_core::types::FrameTick;
use memverse_scene::config::PetalConfig;
use memverse_scene::petals::PetalField;
use memverse_scene::systems::{bob_offset, frame_scale};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn petals_stay_between_floor_and_respawn(seed in any::<u64>(), frames in 1..600usize) {
        let config = PetalConfig { count: 40, ..PetalConfig::default() };
        let mut rng = StdRng::seed_from_u64(seed);
        let mut field = PetalField::spawn(&config, &mut rng);
        let mut tick = FrameTick::default();
        for _ in 0..frames {
            tick = tick.advance(1.0 / 60.0);
            field.step(tick, &mut rng);
        }
        for petal in field.petals() {
            prop_assert!(petal.position.y >= config.floor_y);
            prop_assert!(petal.position.y <= config.respawn_y);
            prop_assert!(petal.position.is_finite());
        }
    }
}

proptest! {
    #[test]
    fn bob_never_exceeds_amplitude(
        x in -70.0..70.0f32,
        y in -70.0..70.0f32,
        z in -70.0..70.0f32,
        elapsed in 0.0..10_000.0f32,
        amplitude in 0.0..2.0f32,
    ) {
        prop_assert!(bob_offset(Vec3::new(x, y, z), elapsed, amplitude).abs() <= amplitude + 1e-6);
    }
}

proptest! {
    #[test]
    fn hover_only_ever_enlarges(base in 0.1..10.0f32, hover in 1.0..3.0f32) {
        prop_assert!(frame_scale(base, true, hover) >= frame_scale(base, false, hover));
        prop_assert!((frame_scale(base, false, hover) - base).abs() < f32::EPSILON);
    }
}
