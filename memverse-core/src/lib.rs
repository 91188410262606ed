//! # memverse core
//!
//! Renderer-agnostic world generator for the memory universe:
//!
//! - **Timeline**: memories kept in chronological order
//! - **Placement**: golden-angle Fibonacci sphere whose radius grows with age
//! - **Branching**: recursive tree skeleton with blossom clusters at the tips
//! - **Agents**: helpers that wander between memories and point at them
//!
//! Every generator takes its random source as a parameter, so a seeded
//! `StdRng` reproduces a world exactly. Nothing here touches a renderer or
//! the network; the scene crate turns this output into draw calls.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod agent;
pub mod branching;
pub mod config;
pub mod error;
pub mod placement;
pub mod random;
pub mod timeline;
pub mod types;

pub use agent::{Agent, AgentState};
pub use branching::{BranchSegment, LeafPlacement, TreeSkeleton};
pub use config::VerseConfig;
pub use error::VerseError;
pub use placement::Placement;
pub use timeline::Timeline;
pub use types::*;
