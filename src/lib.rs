//! Shardfall - a wrap-around arena space-combat simulation
//!
//! Core modules:
//! - `sim`: Simulation core (spatial index, entities, world tick, session policy)
//! - `render`: Drawing-surface boundary consumed by a host renderer
//! - `config`: Tuning record threaded through the simulation
//! - `error`: Configuration errors

pub mod config;
pub mod error;
pub mod render;
pub mod sim;

pub use config::SimConfig;
pub use error::ConfigError;

use glam::Vec2;

/// Wrap an angle to [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(std::f32::consts::TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= std::f32::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

/// Unit vector a ship with the given rotation points along.
///
/// Rotation 0 faces up the screen (negative y).
#[inline]
pub fn facing(rotation: f32) -> Vec2 {
    Vec2::new(rotation.sin(), -rotation.cos())
}

/// Wrap a coordinate into [-margin, extent + margin)
#[inline]
pub fn wrap_coord(value: f32, extent: f32, margin: f32) -> f32 {
    let span = extent + 2.0 * margin;
    let wrapped = (value + margin).rem_euclid(span);
    if wrapped >= span {
        -margin
    } else {
        wrapped - margin
    }
}
