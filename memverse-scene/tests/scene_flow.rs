//! A scene driven the way an engine drives it: ticks, pointer events and a
//! user adding a memory mid-session.

use memverse_core::timeline::Timeline;
use memverse_core::types::{FrameTick, MemoryId, MemoryItem};
use memverse_scene::config::SceneConfig;
use memverse_scene::{MemoryUniverse, PointerEvent, SceneEvent};

fn config() -> SceneConfig {
    SceneConfig::from_toml(
        r#"
        [general]
        seed = 2024

        [demo]
        memory_count = 30
        "#,
    )
    .expect("config")
}

fn run(universe: &mut MemoryUniverse, frames: usize, mut tick: FrameTick) -> FrameTick {
    for _ in 0..frames {
        tick = tick.advance(1.0 / 60.0);
        universe.tick(tick);
    }
    tick
}

#[test]
fn seeded_scene_is_reproducible() {
    let mut a = MemoryUniverse::with_demo_memories(config()).expect("scene");
    let mut b = MemoryUniverse::with_demo_memories(config()).expect("scene");
    run(&mut a, 120, FrameTick::default());
    run(&mut b, 120, FrameTick::default());
    assert_eq!(a.frame(), b.frame());
}

#[test]
fn added_memory_joins_timeline_in_order() {
    let mut universe = MemoryUniverse::with_demo_memories(config()).expect("scene");
    let tick = run(&mut universe, 60, FrameTick::default());

    let date = MemoryItem::parse_date("2020-01-03").expect("date");
    let item = MemoryItem::new("blob:upload", "beach day", date);
    let id = item.id.clone();
    assert_eq!(
        universe.add_memory(item).expect("fresh id"),
        SceneEvent::MemoryAdded { id: id.clone(), index: 1 }
    );
    assert!(universe.timeline().is_chronological());
    assert_eq!(universe.placements().len(), 31);

    run(&mut universe, 60, tick);
    let frame = universe.frame();
    assert_eq!(frame.memories.len(), 31);
    assert_eq!(frame.memories[1].id, id);

    assert_eq!(
        universe.on_pointer(PointerEvent::Click(id.clone())),
        Some(SceneEvent::Selected(id))
    );
    assert_eq!(
        universe.selected_memory().map(|m| m.description.as_str()),
        Some("beach day")
    );
}

#[test]
fn empty_universe_still_animates() {
    let mut universe = MemoryUniverse::new(config(), Timeline::new());
    run(&mut universe, 30, FrameTick::default());
    let frame = universe.frame();
    assert!(frame.memories.is_empty());
    assert_eq!(frame.petals.len(), 200);
    assert_eq!(frame.agents.len(), 3);
    assert!(frame.agents.iter().all(|a| a.position == glam::Vec3::ZERO));
    assert_eq!(universe.on_pointer(PointerEvent::Over(MemoryId::from("mem-0"))), None);
}
