//! Renderer-agnostic draw descriptors.
//!
//! Each descriptor carries exactly what an engine needs to instance one
//! mesh: a transform plus the few material switches the scene uses. The
//! engine owns geometry and materials; nothing here allocates GPU state.

use glam::{Quat, Vec3};
use memverse_core::agent::Agent;
use memverse_core::branching::{BranchSegment, LeafPlacement};
use memverse_core::types::MemoryId;

/// Radial segments used for branch cylinders.
pub const BRANCH_RADIAL_SEGMENTS: u32 = 6;

/// One branch cylinder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchMesh {
    /// Cylinder centre.
    pub position: Vec3,
    /// Rotation taking +Y onto the branch axis.
    pub rotation: Quat,
    /// Radius at the tip.
    pub radius_top: f32,
    /// Radius at the base.
    pub radius_bottom: f32,
    /// Cylinder height.
    pub height: f32,
    /// Radial segment count.
    pub radial_segments: u32,
}

impl From<&BranchSegment> for BranchMesh {
    fn from(segment: &BranchSegment) -> Self {
        Self {
            position: segment.midpoint,
            rotation: segment.orientation,
            radius_top: segment.radius_top,
            radius_bottom: segment.radius_bottom,
            height: segment.length,
            radial_segments: BRANCH_RADIAL_SEGMENTS,
        }
    }
}

/// One blossom in a canopy cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlossomInstance {
    /// Position in tree space.
    pub position: Vec3,
    /// Euler rotation (XYZ).
    pub rotation: Vec3,
    /// Uniform scale.
    pub scale: f32,
}

impl From<&LeafPlacement> for BlossomInstance {
    fn from(leaf: &LeafPlacement) -> Self {
        Self {
            position: leaf.position,
            rotation: leaf.rotation,
            scale: leaf.scale,
        }
    }
}

/// A floating image frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryFrame {
    /// Memory shown in the frame.
    pub id: MemoryId,
    /// Image URL.
    pub url: String,
    /// Date label shown while hovered.
    pub label: String,
    /// Resting position on the shell, in memory-group space.
    pub anchor: Vec3,
    /// Anchor plus the current bob offset.
    pub position: Vec3,
    /// Base scale from placement.
    pub base_scale: f32,
    /// Scale to draw with this frame.
    pub scale: f32,
    /// Accumulated roll from the frame's own spin speed (radians).
    pub spin: f32,
    /// Whether the pointer is over this frame.
    pub hovered: bool,
    /// Image opacity.
    pub opacity: f32,
    /// Whether to draw a faint tether from the frame to the origin.
    pub tethered: bool,
}

impl MemoryFrame {
    /// Image opacity for a frame.
    #[must_use]
    pub fn opacity_for(hovered: bool) -> f32 {
        if hovered { 1.0 } else { 0.8 }
    }
}

/// One helper agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSprite {
    /// Agent id, starting at 1.
    pub id: u32,
    /// Colour slot (0, 1, 2).
    pub palette: u8,
    /// World position.
    pub position: Vec3,
    /// Point to face.
    pub look_at: Vec3,
    /// Roll around the facing axis.
    pub roll: f32,
    /// Whether the pointing animation should play.
    pub pointing: bool,
}

impl From<&Agent> for AgentSprite {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id,
            palette: agent.palette,
            position: agent.position,
            look_at: agent.look_at,
            roll: agent.roll,
            pointing: !agent.state.is_moving(),
        }
    }
}

/// One falling petal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PetalInstance {
    /// Position in tree space.
    pub position: Vec3,
    /// Euler rotation (XYZ).
    pub rotation: Vec3,
    /// Uniform scale.
    pub scale: f32,
}

/// Everything to draw for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneFrame {
    /// Translation of the tree group (branches, blossoms, petals).
    pub tree_offset: Vec3,
    /// Euler rotation of the memory group.
    pub memory_rotation: Vec3,
    /// Branch cylinders.
    pub branches: Vec<BranchMesh>,
    /// Canopy blossoms.
    pub blossoms: Vec<BlossomInstance>,
    /// Falling petals.
    pub petals: Vec<PetalInstance>,
    /// Memory frames in chronological order.
    pub memories: Vec<MemoryFrame>,
    /// Helper agents.
    pub agents: Vec<AgentSprite>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_mesh_uses_six_sides() {
        let segment = BranchSegment {
            midpoint: Vec3::new(0.0, 2.0, 0.0),
            orientation: Quat::IDENTITY,
            length: 4.0,
            radius_top: 0.7,
            radius_bottom: 1.0,
            level: 5,
            parent: None,
        };
        let mesh = BranchMesh::from(&segment);
        assert_eq!(mesh.radial_segments, 6);
        assert_eq!(mesh.position, segment.midpoint);
        assert!((mesh.height - 4.0).abs() < f32::EPSILON);
        assert!(mesh.radius_top < mesh.radius_bottom);
    }

    #[test]
    fn hover_opacity() {
        assert!((MemoryFrame::opacity_for(true) - 1.0).abs() < f32::EPSILON);
        assert!((MemoryFrame::opacity_for(false) - 0.8).abs() < f32::EPSILON);
    }
}
