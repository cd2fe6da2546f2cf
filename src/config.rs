//! Simulation tuning
//!
//! One immutable record holds every magic number the simulation uses. It is
//! built once at setup and passed by value into the world and session.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tuning constants for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Arena ===
    /// Visible arena width in pixels
    pub world_width: f32,
    /// Visible arena height in pixels
    pub world_height: f32,
    /// Scales every dt-based integration step
    pub world_speed_multiplier: f32,

    // === Asteroids ===
    /// Spawn speed range numerator (divided by log10 of area)
    pub asteroid_speed_multiplier: f32,
    /// Pixels of radius per outline vertex
    pub asteroid_edge_multiplier: f32,
    /// Side length of a freshly seeded asteroid; also the wrap margin
    pub asteroid_max_size: f32,
    /// Scales projectile velocity into asteroid destruct velocity
    pub asteroid_damage_speed_multiplier: f32,
    /// Hit points of a freshly seeded asteroid
    pub asteroid_max_hit_points: f32,
    /// Asteroids with area at or below this do not fragment
    pub asteroid_min_area: f32,
    /// Maximum tumble per tick, drawn symmetric around zero
    pub asteroid_max_rotation_rate: f32,
    /// Children spawned by a fragmenting asteroid
    pub asteroid_fragments: usize,

    // === Debris ===
    /// Upper bound of a debris particle's lifetime (ms)
    pub particle_max_ttl_ms: f32,
    /// Particles spawned per destroyed asteroid or ship
    pub debris_burst: usize,
    /// Side length of a debris particle
    pub particle_size: f32,

    // === Projectiles ===
    pub projectile_damage: f32,
    /// Projectile lifetime (ms)
    pub projectile_ttl_ms: f32,
    /// Muzzle speed added to the ship's velocity
    pub projectile_speed_multiplier: f32,
    pub projectile_size: f32,

    // === Starship ===
    pub starship_width: f32,
    pub starship_height: f32,
    pub starship_hit_points: f32,
    /// Initial shield charge, drained by dt (ms) while raised
    pub starship_shield_points: f32,
    /// Side of the square collision envelope while the shield is up
    pub starship_shield_diameter: f32,
    /// Scales ship velocity into asteroid destruct velocity on contact
    pub starship_damage_speed_multiplier: f32,
    /// Damage both sides take on ship/asteroid contact
    pub starship_collision_damage: f32,
    /// Minimum time between shots (ms)
    pub starship_fire_delay_ms: f32,
    /// Rotation per scaled ms while a rotate key is held
    pub starship_turn_rate: f32,
    /// Acceleration per scaled ms while thrusting
    pub starship_thrust_multiplier: f32,

    // === Session ===
    /// Delay between losing a ship and its replacement appearing (ms)
    pub respawn_delay_ms: f32,
    pub starting_lives: u32,
    /// Frame time cap applied by the frame clock (ms)
    pub max_frame_ms: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_width: 800.0,
            world_height: 600.0,
            world_speed_multiplier: 0.1,

            asteroid_speed_multiplier: 5.0,
            asteroid_edge_multiplier: 4.0,
            asteroid_max_size: 100.0,
            asteroid_damage_speed_multiplier: 0.1,
            asteroid_max_hit_points: 40.0,
            asteroid_min_area: 700.0,
            asteroid_max_rotation_rate: 0.05,
            asteroid_fragments: 3,

            particle_max_ttl_ms: 3000.0,
            debris_burst: 25,
            particle_size: 2.0,

            projectile_damage: 5.0,
            projectile_ttl_ms: 500.0,
            projectile_speed_multiplier: 15.0,
            projectile_size: 5.0,

            starship_width: 30.0,
            starship_height: 50.0,
            starship_hit_points: 1.0,
            starship_shield_points: 1000.0,
            starship_shield_diameter: 100.0,
            starship_damage_speed_multiplier: 0.5,
            starship_collision_damage: 10.0,
            starship_fire_delay_ms: 100.0,
            starship_turn_rate: 0.03,
            starship_thrust_multiplier: 0.1,

            respawn_delay_ms: 1000.0,
            starting_lives: 3,
            max_frame_ms: 100.0,
        }
    }
}

impl SimConfig {
    /// Config for an arena of the given size, other values at their defaults
    pub fn with_world_size(width: f32, height: f32) -> Self {
        Self {
            world_width: width,
            world_height: height,
            ..Self::default()
        }
    }

    /// Parse a JSON document; missing fields take their default values
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("world_speed_multiplier", self.world_speed_multiplier),
            ("asteroid_max_size", self.asteroid_max_size),
            ("asteroid_edge_multiplier", self.asteroid_edge_multiplier),
            ("starship_width", self.starship_width),
            ("starship_height", self.starship_height),
            ("projectile_size", self.projectile_size),
            ("particle_size", self.particle_size),
            ("max_frame_ms", self.max_frame_ms),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                log::warn!("Rejecting config: {} = {}", field, value);
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be positive",
                });
            }
        }

        let non_negative = [
            ("particle_max_ttl_ms", self.particle_max_ttl_ms),
            ("projectile_ttl_ms", self.projectile_ttl_ms),
            ("starship_fire_delay_ms", self.starship_fire_delay_ms),
            ("starship_shield_points", self.starship_shield_points),
            ("respawn_delay_ms", self.respawn_delay_ms),
            ("asteroid_min_area", self.asteroid_min_area),
            ("asteroid_max_rotation_rate", self.asteroid_max_rotation_rate),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                log::warn!("Rejecting config: {} = {}", field, value);
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be negative",
                });
            }
        }

        Ok(())
    }

    /// Distance an entity may travel past a visible edge before wrapping
    #[inline]
    pub fn wrap_margin(&self) -> f32 {
        self.asteroid_max_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json_str(r#"{ "world_width": 1024.0, "starting_lives": 5 }"#)
            .unwrap();
        assert_eq!(config.world_width, 1024.0);
        assert_eq!(config.starting_lives, 5);
        assert_eq!(config.world_height, SimConfig::default().world_height);
    }

    #[test]
    fn test_rejects_degenerate_arena() {
        let err = SimConfig::from_json_str(r#"{ "world_height": 0.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "world_height",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_negative_cooldown() {
        let config = SimConfig {
            starship_fire_delay_ms: -1.0,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        let err = SimConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
