//! # memverse-scene: headless scene layer for the memory universe
//!
//! Turns the generator output of `memverse-core` into something a
//! rendering engine can drive frame by frame, without depending on any
//! particular engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │            Rendering engine               │
//! │   FrameTick / PointerEvent ──┐            │
//! │                              ▼            │
//! │  ┌────────────────────────────────────┐   │
//! │  │        memverse-scene              │   │
//! │  │  ┌─────────┐ ┌───────┐ ┌────────┐  │   │
//! │  │  │ Systems │ │ Hooks │ │ Petals │  │   │
//! │  │  └────┬────┘ └───┬───┘ └───┬────┘  │   │
//! │  │       ▼          ▼         ▼       │   │
//! │  │    ┌──────────────────────────┐    │   │
//! │  │    │      memverse-core       │    │   │
//! │  │    └──────────────────────────┘    │   │
//! │  └────────────────────────────────────┘   │
//! │                              │            │
//! │        SceneFrame (draw) ◄───┘            │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `components`: draw descriptors (branches, blossoms, frames, agents, petals)
//! - `systems`: per-frame motion (group spin, bobbing, agents)
//! - `events`: engine input and scene output events
//! - `hooks`: hover and selection tracking
//! - `petals`: falling petal particles
//! - `universe`: the composed scene

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod components;
pub mod config;
pub mod events;
pub mod hooks;
pub mod petals;
pub mod systems;
pub mod universe;

pub use config::SceneConfig;
pub use events::{PointerEvent, SceneEvent};
pub use universe::MemoryUniverse;
