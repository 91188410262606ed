//! The composed memory universe.
//!
//! [`MemoryUniverse`] owns every piece of scene state and is the only thing
//! an engine talks to: feed it ticks and pointer events, read back a
//! [`SceneFrame`] to draw.

use glam::Vec3;
use memverse_core::agent::{Agent, spawn_agents};
use memverse_core::branching::{TreeSkeleton, grow_tree};
use memverse_core::error::Result;
use memverse_core::placement::Placement;
use memverse_core::random::world_rng;
use memverse_core::timeline::Timeline;
use memverse_core::types::{FrameTick, MemoryId, MemoryItem};
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::components::{
    AgentSprite, BlossomInstance, BranchMesh, MemoryFrame, SceneFrame,
};
use crate::config::SceneConfig;
use crate::events::{PointerEvent, SceneEvent};
use crate::hooks::Interaction;
use crate::petals::PetalField;
use crate::systems;

/// Tree, memories, helpers and petals plus the interaction state tying them
/// together.
#[derive(Debug)]
pub struct MemoryUniverse {
    config: SceneConfig,
    rng: StdRng,
    timeline: Timeline,
    placements: Vec<Placement>,
    targets: Vec<Vec3>,
    tree: TreeSkeleton,
    agents: Vec<Agent>,
    petals: PetalField,
    rotation: Vec3,
    interaction: Interaction,
    clock: FrameTick,
    frames: u64,
}

impl MemoryUniverse {
    /// Build a universe around an existing timeline.
    #[must_use]
    pub fn new(config: SceneConfig, timeline: Timeline) -> Self {
        let rng = world_rng(config.verse.general.seed);
        Self::build(config, rng, timeline)
    }

    /// Build a universe populated with the demo memories from
    /// `config.demo`.
    ///
    /// # Errors
    /// Returns `VerseError::InvalidDate` if `demo.start_date` is malformed.
    pub fn with_demo_memories(config: SceneConfig) -> Result<Self> {
        let start = MemoryItem::parse_date(&config.demo.start_date)?;
        let mut rng = world_rng(config.verse.general.seed);
        let timeline = Timeline::placeholder(
            config.demo.memory_count,
            start,
            config.demo.spacing_days,
            &mut rng,
        );
        Ok(Self::build(config, rng, timeline))
    }

    fn build(config: SceneConfig, mut rng: StdRng, mut timeline: Timeline) -> Self {
        let tree = grow_tree(&config.verse.tree, &mut rng);
        let placements = timeline.layout(&config.verse.placement, &mut rng);
        let targets = timeline.positions();
        let agents = spawn_agents(&config.verse.agents, targets.len(), &mut rng);
        let petals = PetalField::spawn(&config.petals, &mut rng);

        info!(
            memories = timeline.len(),
            branches = tree.segments.len(),
            blossoms = tree.leaves.len(),
            agents = agents.len(),
            petals = petals.petals().len(),
            "Memory universe built"
        );

        Self {
            config,
            rng,
            timeline,
            placements,
            targets,
            tree,
            agents,
            petals,
            rotation: Vec3::ZERO,
            interaction: Interaction::default(),
            clock: FrameTick::default(),
            frames: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Frame loop
    // -----------------------------------------------------------------------

    /// Advance the scene by one rendered frame.
    pub fn tick(&mut self, tick: FrameTick) {
        self.clock = tick;
        self.frames += 1;
        systems::spin_memory_group(&mut self.rotation, &self.config.motion);
        systems::run_agents(
            &mut self.agents,
            tick,
            &self.targets,
            &self.config.verse.agents,
            &mut self.rng,
        );
        self.petals.step(tick, &mut self.rng);
    }

    /// Draw descriptors for the current state.
    #[must_use]
    pub fn frame(&self) -> SceneFrame {
        let motion = &self.config.motion;
        let memories = self
            .timeline
            .items()
            .iter()
            .zip(&self.placements)
            .map(|(item, placement)| {
                let hovered = self.interaction.is_hovered(&item.id);
                let bob = systems::bob_offset(
                    placement.position,
                    self.clock.elapsed,
                    motion.bob_amplitude,
                );
                MemoryFrame {
                    id: item.id.clone(),
                    url: item.url.clone(),
                    label: item.date.format("%Y-%m-%d").to_string(),
                    anchor: placement.position,
                    position: placement.position + Vec3::Y * bob,
                    base_scale: placement.scale,
                    scale: systems::frame_scale(placement.scale, hovered, motion.hover_scale),
                    spin: placement.spin_speed * self.frames as f32,
                    hovered,
                    opacity: MemoryFrame::opacity_for(hovered),
                    tethered: placement.scale > motion.tether_min_scale,
                }
            })
            .collect();

        SceneFrame {
            tree_offset: Vec3::new(0.0, motion.tree_offset_y, 0.0),
            memory_rotation: self.rotation,
            branches: self.tree.segments.iter().map(BranchMesh::from).collect(),
            blossoms: self.tree.leaves.iter().map(BlossomInstance::from).collect(),
            petals: self.petals.instances(),
            memories,
            agents: self.agents.iter().map(AgentSprite::from).collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Interaction
    // -----------------------------------------------------------------------

    /// Route a pointer event. Events naming an unknown memory are dropped.
    pub fn on_pointer(&mut self, event: PointerEvent) -> Option<SceneEvent> {
        if let Some(id) = event.memory() {
            if self.timeline.find(id).is_none() {
                debug!(id = %id, "Pointer event for unknown memory ignored");
                return None;
            }
        }
        self.interaction.on_pointer(event)
    }

    /// Close the detail view.
    pub fn close_detail(&mut self) -> Option<SceneEvent> {
        self.interaction.close_detail()
    }

    /// Memory shown in the detail view.
    #[must_use]
    pub fn selected_memory(&self) -> Option<&MemoryItem> {
        self.interaction
            .selected()
            .and_then(|id| self.timeline.find(id))
    }

    /// Memory under the pointer.
    #[must_use]
    pub fn hovered_memory(&self) -> Option<&MemoryItem> {
        self.interaction
            .hovered()
            .and_then(|id| self.timeline.find(id))
    }

    // -----------------------------------------------------------------------
    // Memories
    // -----------------------------------------------------------------------

    /// Add a memory in chronological order and lay the shell out again.
    ///
    /// # Errors
    /// Returns `VerseError::DuplicateMemory` if a memory with the same ID is
    /// already shown; the scene is left untouched.
    pub fn add_memory(&mut self, item: MemoryItem) -> Result<SceneEvent> {
        let id = item.id.clone();
        let index = self.timeline.insert(item)?;
        self.relayout();
        info!(id = %id, index, total = self.timeline.len(), "Memory added");
        Ok(SceneEvent::MemoryAdded { id, index })
    }

    /// Remove a memory and lay the shell out again.
    pub fn remove_memory(&mut self, id: &MemoryId) -> Option<MemoryItem> {
        let removed = self.timeline.remove(id)?;
        self.interaction.forget(id);
        self.relayout();
        info!(id = %id, total = self.timeline.len(), "Memory removed");
        Some(removed)
    }

    fn relayout(&mut self) {
        self.placements = self
            .timeline
            .layout(&self.config.verse.placement, &mut self.rng);
        self.targets = self.timeline.positions();
        debug!(placed = self.placements.len(), "Memory shell laid out");
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The chronological memory list.
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Current placements, index-aligned with the timeline.
    #[must_use]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// The generated tree.
    #[must_use]
    pub fn tree(&self) -> &TreeSkeleton {
        &self.tree
    }

    /// Helper agents.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Petal particles.
    #[must_use]
    pub fn petals(&self) -> &PetalField {
        &self.petals
    }

    /// Euler rotation of the memory group.
    #[must_use]
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// The last tick seen.
    #[must_use]
    pub fn clock(&self) -> FrameTick {
        self.clock
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(memories: usize) -> MemoryUniverse {
        let mut config = SceneConfig::default();
        config.verse.general.seed = Some(99);
        config.demo.memory_count = memories;
        MemoryUniverse::with_demo_memories(config).expect("demo universe")
    }

    #[test]
    fn demo_universe_matches_config() {
        let universe = seeded(100);
        assert_eq!(universe.timeline().len(), 100);
        assert_eq!(universe.placements().len(), 100);
        assert_eq!(universe.agents().len(), 3);
        assert_eq!(universe.petals().petals().len(), 200);
        assert!(!universe.tree().is_empty());
    }

    #[test]
    fn bad_demo_date_is_rejected() {
        let mut config = SceneConfig::default();
        config.demo.start_date = "2020-13-01".to_string();
        assert!(MemoryUniverse::with_demo_memories(config).is_err());
    }

    #[test]
    fn tick_spins_the_memory_group() {
        let mut universe = seeded(5);
        let mut tick = FrameTick::default();
        for _ in 0..10 {
            tick = tick.advance(1.0 / 60.0);
            universe.tick(tick);
        }
        assert!((universe.rotation().y - 0.005).abs() < 1e-6);
        assert!((universe.rotation().z - 0.002).abs() < 1e-6);
        assert_eq!(universe.frame().memory_rotation, universe.rotation());
    }

    #[test]
    fn hover_scales_the_frame() {
        let mut universe = seeded(10);
        let id = MemoryId::from("mem-3");
        universe.on_pointer(PointerEvent::Over(id.clone()));
        let frame = universe.frame();
        let hovered = frame.memories.iter().find(|m| m.id == id).expect("frame");
        assert!(hovered.hovered);
        assert!((hovered.scale - hovered.base_scale * 1.5).abs() < 1e-5);
        assert!((hovered.opacity - 1.0).abs() < f32::EPSILON);
        assert_eq!(frame.memories.iter().filter(|m| m.hovered).count(), 1);
        assert_eq!(universe.hovered_memory().map(|m| &m.id), Some(&id));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut universe = seeded(3);
        assert_eq!(universe.on_pointer(PointerEvent::Click(MemoryId::from("nope"))), None);
        assert!(universe.selected_memory().is_none());
    }

    #[test]
    fn click_then_close_detail() {
        let mut universe = seeded(3);
        let id = MemoryId::from("mem-1");
        assert_eq!(
            universe.on_pointer(PointerEvent::Click(id.clone())),
            Some(SceneEvent::Selected(id.clone()))
        );
        assert_eq!(universe.selected_memory().map(|m| &m.id), Some(&id));
        assert_eq!(universe.close_detail(), Some(SceneEvent::SelectionCleared));
        assert!(universe.selected_memory().is_none());
    }

    #[test]
    fn frames_bob_around_their_anchor() {
        let mut universe = seeded(4);
        universe.tick(FrameTick::new(2.0, 1.0 / 60.0));
        for frame in universe.frame().memories {
            let expected = (2.0 + frame.anchor.length()).sin() * 0.5;
            assert!((frame.position.y - frame.anchor.y - expected).abs() < 1e-4);
            assert!((frame.position.x - frame.anchor.x).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn frame_carries_tree_and_offset() {
        let universe = seeded(2);
        let frame = universe.frame();
        assert_eq!(frame.tree_offset, Vec3::new(0.0, -8.0, 0.0));
        assert_eq!(frame.branches.len(), universe.tree().segments.len());
        assert_eq!(frame.blossoms.len(), universe.tree().leaves.len());
        assert!(frame.branches.iter().all(|b| b.radial_segments == 6));
        assert_eq!(frame.agents.len(), 3);
        assert_eq!(frame.memories[0].label, "2020-01-01");
    }

    #[test]
    fn remove_memory_clears_selection() {
        let mut universe = seeded(5);
        let id = MemoryId::from("mem-2");
        universe.on_pointer(PointerEvent::Click(id.clone()));
        assert!(universe.remove_memory(&id).is_some());
        assert!(universe.selected_memory().is_none());
        assert_eq!(universe.placements().len(), 4);
        assert!(universe.remove_memory(&id).is_none());
    }

    #[test]
    fn duplicate_memory_is_not_added() {
        let mut universe = seeded(5);
        let date = MemoryItem::parse_date("2021-06-01").expect("date");
        universe
            .add_memory(MemoryItem::with_id("x", "a.jpg", "", date))
            .expect("first add");
        let err = universe
            .add_memory(MemoryItem::with_id("x", "b.jpg", "", date))
            .expect_err("duplicate");
        assert!(matches!(err, memverse_core::VerseError::DuplicateMemory(_)));
        assert_eq!(universe.timeline().len(), 6);
        assert_eq!(universe.placements().len(), 6);

        universe.on_pointer(PointerEvent::Over(MemoryId::from("x")));
        let hovered = universe.frame().memories.iter().filter(|m| m.hovered).count();
        assert_eq!(hovered, 1);
    }
}
