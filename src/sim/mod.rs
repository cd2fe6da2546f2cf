//! Simulation core
//!
//! Everything that moves lives here. This module has no rendering or
//! platform dependencies:
//! - Time is whatever dt the host passes in (ms)
//! - Randomness comes from a seeded RNG owned by the world
//! - Entities are visited in storage order; spawns append

pub mod behavior;
pub mod collision;
pub mod entity;
pub mod quadtree;
pub mod session;
pub mod world;

pub use behavior::StepContext;
pub use collision::{Bounds, circles_overlap, segment_hits_circle};
pub use entity::{Entity, EntityId, EntityKind, Kind, Shield};
pub use quadtree::{MAX_DEPTH, MAX_OBJECTS, QuadTree};
pub use session::{FrameClock, HudStatus, Session, SessionEvent, asteroids_for_level};
pub use world::{UserInput, World};
