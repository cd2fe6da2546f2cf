//! Simulated objects
//!
//! Every object shares one state record; what differs per kind lives in
//! [`EntityKind`] and is dispatched by `match` in the behavior module.

use glam::Vec2;
use rand::Rng;

use super::collision::Bounds;
use crate::config::SimConfig;
use crate::{wrap_angle, wrap_coord};

/// World-unique entity identifier
pub type EntityId = u32;

/// Interaction tag for collision rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Ship,
    Asteroid,
    Projectile,
    Debris,
}

/// Ship-only shield state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shield {
    /// Remaining charge in ms of use; never negative
    pub charge: f32,
    pub active: bool,
}

impl Shield {
    pub fn new(charge: f32) -> Self {
        Self {
            charge,
            active: false,
        }
    }

    /// Drain by `dt` while raised. Drops on the tick charge runs out.
    pub fn raise(&mut self, dt: f32) {
        if self.charge > 0.0 {
            self.charge = (self.charge - dt).max(0.0);
        }
        self.active = self.charge > 0.0;
    }

    pub fn lower(&mut self) {
        self.active = false;
    }
}

/// Per-kind payload
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Ship { shield: Shield },
    /// Outline vertices relative to the center, for rendering
    Asteroid { outline: Vec<Vec2> },
    Projectile {
        /// Top-left before this tick's integration
        last_pos: Vec2,
        expires_at: f64,
    },
    Debris { expires_at: f64 },
}

/// A simulated object
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    /// Top-left of the bounding box
    pub pos: Vec2,
    pub size: Vec2,
    /// Radians, kept in [0, 2π) by wrap-around
    pub rotation: f32,
    pub vel: Vec2,
    /// Added to rotation every tick
    pub rotation_rate: f32,
    pub hit_points: f32,
    /// Hit points at spawn
    pub max_hit_points: f32,
    pub pending_removal: bool,
    /// Velocity handed to debris and fragments; set once, at death
    pub destruct_vel: Vec2,
    pub kind: EntityKind,
}

impl Entity {
    fn base(id: EntityId, pos: Vec2, size: Vec2, kind: EntityKind) -> Self {
        Self {
            id,
            pos,
            size,
            rotation: 0.0,
            vel: Vec2::ZERO,
            rotation_rate: 0.0,
            hit_points: 0.0,
            max_hit_points: 0.0,
            pending_removal: false,
            destruct_vel: Vec2::ZERO,
            kind,
        }
    }

    /// Player ship at rest with a full shield
    pub fn ship(id: EntityId, pos: Vec2, config: &SimConfig) -> Self {
        let mut ship = Self::base(
            id,
            pos,
            Vec2::new(config.starship_width, config.starship_height),
            EntityKind::Ship {
                shield: Shield::new(config.starship_shield_points),
            },
        );
        ship.hit_points = config.starship_hit_points;
        ship.max_hit_points = config.starship_hit_points;
        ship
    }

    /// Asteroid with a random drift, tumble, and outline.
    ///
    /// Drift per axis is uniform in ±`asteroid_speed_multiplier / log10(area)`,
    /// so small rocks move faster.
    pub fn asteroid<R: Rng>(
        id: EntityId,
        pos: Vec2,
        size: Vec2,
        hit_points: f32,
        config: &SimConfig,
        rng: &mut R,
    ) -> Self {
        let area = size.x * size.y;
        let range = config.asteroid_speed_multiplier / area.log10().max(1.0);
        let radius = size.x.max(size.y) / 2.0;

        let mut asteroid = Self::base(
            id,
            pos,
            size,
            EntityKind::Asteroid {
                outline: generate_outline(radius, config.asteroid_edge_multiplier, rng),
            },
        );
        asteroid.vel = random_velocity(range, rng);
        asteroid.rotation_rate = symmetric(config.asteroid_max_rotation_rate, rng);
        asteroid.hit_points = hit_points;
        asteroid.max_hit_points = hit_points;
        asteroid
    }

    /// Projectile centered on `center`
    pub fn projectile(
        id: EntityId,
        center: Vec2,
        vel: Vec2,
        rotation: f32,
        now_ms: f64,
        config: &SimConfig,
    ) -> Self {
        let size = Vec2::splat(config.projectile_size);
        let pos = center - size / 2.0;
        let mut projectile = Self::base(
            id,
            pos,
            size,
            EntityKind::Projectile {
                last_pos: pos,
                expires_at: now_ms + config.projectile_ttl_ms as f64,
            },
        );
        projectile.vel = vel;
        projectile.rotation = rotation;
        projectile
    }

    /// Debris particle living a random fraction of the maximum lifetime
    pub fn debris<R: Rng>(
        id: EntityId,
        pos: Vec2,
        vel: Vec2,
        now_ms: f64,
        config: &SimConfig,
        rng: &mut R,
    ) -> Self {
        let ttl = config.particle_max_ttl_ms * rng.random::<f32>();
        let mut debris = Self::base(
            id,
            pos,
            Vec2::splat(config.particle_size),
            EntityKind::Debris {
                expires_at: now_ms + ttl as f64,
            },
        );
        debris.vel = vel;
        debris
    }

    pub fn kind_tag(&self) -> Kind {
        match self.kind {
            EntityKind::Ship { .. } => Kind::Ship,
            EntityKind::Asteroid { .. } => Kind::Asteroid,
            EntityKind::Projectile { .. } => Kind::Projectile,
            EntityKind::Debris { .. } => Kind::Debris,
        }
    }

    #[inline]
    pub fn is(&self, kind: Kind) -> bool {
        self.kind_tag() == kind
    }

    /// Bounding box
    #[inline]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Bounding circle radius
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size.x.max(self.size.y) / 2.0
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.size.x * self.size.y
    }

    pub fn shield(&self) -> Option<&Shield> {
        match &self.kind {
            EntityKind::Ship { shield } => Some(shield),
            _ => None,
        }
    }

    pub fn shield_mut(&mut self) -> Option<&mut Shield> {
        match &mut self.kind {
            EntityKind::Ship { shield } => Some(shield),
            _ => None,
        }
    }

    pub fn shield_active(&self) -> bool {
        self.shield().is_some_and(|s| s.active)
    }

    /// Envelope used for contact checks. A raised shield swaps the ship's box
    /// for a square of the shield's diameter around the same center.
    pub fn contact_bounds(&self, config: &SimConfig) -> Bounds {
        if self.shield_active() {
            Bounds::centered(self.center(), config.starship_shield_diameter)
        } else {
            self.bounds()
        }
    }

    /// Bounds handed to the spatial index: the square around whatever circle
    /// this entity collides with.
    pub fn index_bounds(&self, config: &SimConfig) -> Bounds {
        self.contact_bounds(config).circle_box()
    }

    /// Bounds to query the index with this tick. Movers cover the box they
    /// will sweep before their contact checks run.
    pub fn query_bounds(&self, dt: f32, config: &SimConfig) -> Bounds {
        let bounds = self.index_bounds(config);
        let travel = match self.kind {
            EntityKind::Projectile { .. } => self.vel * dt * config.world_speed_multiplier,
            EntityKind::Ship { .. } => self.vel,
            _ => return bounds,
        };
        bounds.union(&bounds.translated(travel))
    }

    /// Apply damage. Reaching zero marks the entity for removal and records
    /// the destruct velocity. A shielded ship ignores hits entirely.
    pub fn hit(&mut self, amount: f32, destruct_vel: Vec2) {
        if self.shield_active() {
            return;
        }
        self.hit_points -= amount.max(0.0);
        if self.hit_points <= 0.0 {
            self.destroy(destruct_vel);
        }
    }

    /// Mark for removal regardless of hit points
    pub fn destroy(&mut self, destruct_vel: Vec2) {
        if !self.pending_removal {
            self.pending_removal = true;
            self.destruct_vel = destruct_vel;
        }
    }

    /// Base movement rule: tumble by `rotation_rate`, drift by velocity
    pub fn integrate(&mut self, dt: f32, config: &SimConfig) {
        let dt = dt * config.world_speed_multiplier;
        self.pos += self.vel * dt;
        self.rotation += self.rotation_rate;
    }

    /// Toroidal edge handling. Entities may drift one margin past an edge
    /// before reappearing on the other side.
    pub fn wrap_around(&mut self, config: &SimConfig) {
        let margin = config.wrap_margin();
        self.pos.x = wrap_coord(self.pos.x, config.world_width, margin);
        self.pos.y = wrap_coord(self.pos.y, config.world_height, margin);
        self.rotation = wrap_angle(self.rotation);
    }

    /// Has this timed entity outlived its expiry?
    pub fn expired(&self, now_ms: f64) -> bool {
        match self.kind {
            EntityKind::Projectile { expires_at, .. } | EntityKind::Debris { expires_at } => {
                now_ms > expires_at
            }
            _ => false,
        }
    }
}

/// Uniform in [-range, range)
fn symmetric<R: Rng>(range: f32, rng: &mut R) -> f32 {
    rng.random::<f32>() * range * 2.0 - range
}

fn random_velocity<R: Rng>(range: f32, rng: &mut R) -> Vec2 {
    Vec2::new(symmetric(range, rng), symmetric(range, rng))
}

/// Jagged polygon: one vertex at a random angle inside each equal slice
fn generate_outline<R: Rng>(radius: f32, edge_multiplier: f32, rng: &mut R) -> Vec<Vec2> {
    let edge_count = ((radius / edge_multiplier).ceil() as usize).max(3);
    let slice = std::f32::consts::TAU / edge_count as f32;
    (0..edge_count)
        .map(|i| {
            let angle = rng.random::<f32>() * slice + i as f32 * slice;
            crate::facing(angle) * radius
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rock(hit_points: f32) -> Entity {
        let mut rng = Pcg32::seed_from_u64(1);
        Entity::asteroid(
            1,
            Vec2::new(100.0, 100.0),
            Vec2::splat(100.0),
            hit_points,
            &SimConfig::default(),
            &mut rng,
        )
    }

    #[test]
    fn test_hit_to_zero_marks_removal() {
        let mut asteroid = rock(10.0);
        asteroid.hit(5.0, Vec2::new(1.0, 0.0));
        assert!(!asteroid.pending_removal);
        assert_eq!(asteroid.destruct_vel, Vec2::ZERO);

        asteroid.hit(5.0, Vec2::new(2.0, 3.0));
        assert!(asteroid.pending_removal);
        assert_eq!(asteroid.destruct_vel, Vec2::new(2.0, 3.0));
    }

    #[test]
    fn test_destruct_velocity_set_once() {
        let mut asteroid = rock(5.0);
        asteroid.hit(5.0, Vec2::new(1.0, 1.0));
        asteroid.hit(5.0, Vec2::new(9.0, 9.0));
        assert_eq!(asteroid.destruct_vel, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_shielded_ship_absorbs_hits() {
        let config = SimConfig::default();
        let mut ship = Entity::ship(1, Vec2::ZERO, &config);
        ship.shield_mut().unwrap().raise(16.0);
        assert!(ship.shield_active());

        ship.hit(1000.0, Vec2::new(5.0, 5.0));
        assert_eq!(ship.hit_points, config.starship_hit_points);
        assert!(!ship.pending_removal);

        ship.shield_mut().unwrap().lower();
        ship.hit(10.0, Vec2::new(5.0, 5.0));
        assert!(ship.pending_removal);
    }

    #[test]
    fn test_shield_drains_to_zero_and_drops() {
        let mut shield = Shield::new(40.0);
        shield.raise(16.0);
        assert!(shield.active);
        shield.raise(16.0);
        assert!(shield.active);
        shield.raise(16.0);
        assert_eq!(shield.charge, 0.0);
        assert!(!shield.active);
        // Still held, still down
        shield.raise(16.0);
        assert_eq!(shield.charge, 0.0);
        assert!(!shield.active);
    }

    #[test]
    fn test_shield_envelope_is_centered() {
        let config = SimConfig::default();
        let mut ship = Entity::ship(1, Vec2::new(100.0, 100.0), &config);
        assert_eq!(ship.contact_bounds(&config), ship.bounds());

        ship.shield_mut().unwrap().raise(1.0);
        // 30x50 ship: the classic (x - 35, y - 25, 100, 100) box
        assert_eq!(
            ship.contact_bounds(&config),
            Bounds::new(65.0, 75.0, 100.0, 100.0)
        );
    }

    #[test]
    fn test_projectile_query_covers_flight_path() {
        let config = SimConfig::default();
        let shot = Entity::projectile(1, Vec2::new(100.0, 100.0), Vec2::new(20.0, 0.0), 0.0, 0.0, &config);
        let query = shot.query_bounds(16.0, &config);
        // 20 * 16 * 0.1 = 32 px of travel
        assert_eq!(query, Bounds::new(97.5, 97.5, 37.0, 5.0));

        // Drifters only query where they are
        let asteroid = rock(10.0);
        assert_eq!(asteroid.query_bounds(16.0, &config), asteroid.index_bounds(&config));
    }

    #[test]
    fn test_integrate_scales_by_world_speed() {
        let config = SimConfig::default();
        let mut asteroid = rock(40.0);
        asteroid.vel = Vec2::new(2.0, -1.0);
        asteroid.rotation_rate = 0.01;
        asteroid.rotation = 0.0;
        asteroid.integrate(10.0, &config);
        assert!((asteroid.pos - Vec2::new(102.0, 99.0)).length() < 1e-4);
        assert!((asteroid.rotation - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_around_reenters_opposite_edge() {
        let config = SimConfig::default();
        let mut asteroid = rock(40.0);
        asteroid.pos = Vec2::new(config.world_width + config.wrap_margin() + 5.0, -150.0);
        asteroid.rotation = -0.5;
        asteroid.wrap_around(&config);

        assert!((asteroid.pos.x - (5.0 - config.wrap_margin())).abs() < 1e-3);
        assert!((asteroid.pos.y - (config.world_height + 50.0)).abs() < 1e-3);
        assert!(asteroid.rotation >= 0.0 && asteroid.rotation < std::f32::consts::TAU);
    }

    #[test]
    fn test_asteroid_tumble_is_bounded() {
        let config = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(42);
        for id in 0..100 {
            let a = Entity::asteroid(id, Vec2::ZERO, Vec2::splat(50.0), 20.0, &config, &mut rng);
            assert!(a.rotation_rate.abs() <= config.asteroid_max_rotation_rate);
            let range = config.asteroid_speed_multiplier / 2500f32.log10();
            assert!(a.vel.x.abs() <= range && a.vel.y.abs() <= range);
            if let EntityKind::Asteroid { outline } = &a.kind {
                assert_eq!(outline.len(), 7); // ceil(25 / 4)
            }
        }
    }

    #[test]
    fn test_expiry() {
        let config = SimConfig::default();
        let p = Entity::projectile(1, Vec2::ZERO, Vec2::X, 0.0, 1000.0, &config);
        assert!(!p.expired(1500.0));
        assert!(p.expired(1500.5));
        assert!(!rock(1.0).expired(f64::MAX));
    }

    proptest! {
        #[test]
        fn prop_hit_never_heals(
            start in 0.5f32..100.0,
            hits in prop::collection::vec(-20.0f32..20.0, 1..20),
        ) {
            let mut asteroid = rock(start);
            for amount in hits {
                let before = asteroid.hit_points;
                asteroid.hit(amount, Vec2::ONE);
                prop_assert!(asteroid.hit_points <= before);
                if asteroid.hit_points <= 0.0 {
                    prop_assert!(asteroid.pending_removal);
                }
            }
        }

        #[test]
        fn prop_shielded_ship_is_untouched(amount in -50.0f32..5000.0) {
            let config = SimConfig::default();
            let mut ship = Entity::ship(1, Vec2::ZERO, &config);
            ship.shield_mut().unwrap().raise(1.0);
            ship.hit(amount, Vec2::ONE);
            prop_assert_eq!(ship.hit_points, config.starship_hit_points);
            prop_assert!(!ship.pending_removal);
        }
    }
}
