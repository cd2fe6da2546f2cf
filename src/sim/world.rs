//! World state and the per-tick update
//!
//! A tick runs in a fixed order: advance the clock (and respawn a pending
//! ship), rebuild the quadtree, resolve player input, update every entity,
//! purge the dead, wrap the survivors, then report level/death flags.
//! Collisions are computed before wrapping so nothing collides across the
//! wrap seam.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::behavior::{self, StepContext};
use super::collision::{Bounds, circles_overlap};
use super::entity::{Entity, EntityId, Kind};
use super::quadtree::QuadTree;
use crate::config::SimConfig;
use crate::facing;

/// Player intents for a single tick, written by the host's input layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserInput {
    pub forward: bool,
    pub backward: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub fire: bool,
    pub shield: bool,
}

impl UserInput {
    /// Release every key
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Every live entity plus the bookkeeping a tick needs
#[derive(Debug, Clone)]
pub struct World {
    config: SimConfig,
    rng: Pcg32,
    entities: Vec<Entity>,
    /// Alias into `entities`; `None` while dead or awaiting respawn
    player: Option<EntityId>,
    quadtree: QuadTree,
    level_over: bool,
    player_dead: bool,
    /// Simulation clock: the sum of every dt stepped so far (ms)
    clock_ms: f64,
    last_fire_ms: Option<f64>,
    respawn_at: Option<f64>,
    next_id: EntityId,
}

impl World {
    /// Empty world seeded for reproducible spawns
    pub fn new(config: SimConfig, seed: u64) -> Self {
        let region = index_region(&config);
        Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            entities: Vec::new(),
            player: None,
            quadtree: QuadTree::new(region),
            level_over: false,
            player_dead: false,
            clock_ms: 0.0,
            last_fire_ms: None,
            respawn_at: None,
            next_id: 1,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Live entities, for drawing and HUD readouts
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[cfg(test)]
    pub(crate) fn entities_mut(&mut self) -> &mut Vec<Entity> {
        &mut self.entities
    }

    pub fn player(&self) -> Option<&Entity> {
        let id = self.player?;
        self.entities.iter().find(|e| e.id == id)
    }

    fn player_index(&self) -> Option<usize> {
        let id = self.player?;
        self.entities.iter().position(|e| e.id == id)
    }

    /// Set once only the player (or nothing else) remains
    pub fn level_over(&self) -> bool {
        self.level_over
    }

    /// Set when the player ship is destroyed; cleared by [`World::reset_player`]
    pub fn player_dead(&self) -> bool {
        self.player_dead
    }

    pub fn respawn_pending(&self) -> bool {
        self.respawn_at.is_some()
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Index built at the start of the last tick
    pub fn quadtree(&self) -> &QuadTree {
        &self.quadtree
    }

    pub fn count(&self, kind: Kind) -> usize {
        self.entities.iter().filter(|e| e.is(kind)).count()
    }

    /// Visible arena
    pub fn arena(&self) -> Bounds {
        Bounds::new(0.0, 0.0, self.config.world_width, self.config.world_height)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an entity. The first ship added while no player exists becomes the player.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        if entity.is(Kind::Ship) && self.player.is_none() {
            self.player = Some(id);
        }
        self.entities.push(entity);
        id
    }

    /// Spawn an asteroid with a random drift and tumble
    pub fn spawn_asteroid(&mut self, pos: Vec2, size: Vec2, hit_points: f32) -> EntityId {
        let id = self.next_entity_id();
        let asteroid = Entity::asteroid(id, pos, size, hit_points, &self.config, &mut self.rng);
        self.add_entity(asteroid)
    }

    /// Advance the world by `dt` milliseconds
    pub fn step(&mut self, input: &UserInput, dt: f32) {
        self.clock_ms += dt as f64;
        if self.respawn_at.is_some_and(|at| self.clock_ms >= at) {
            self.respawn_at = None;
            self.init_player();
        }

        self.rebuild_index();

        if self.player.is_some() {
            self.resolve_player_input(input, dt);
        }

        // Entities appended during the pass are visited too
        let mut resolved = vec![false; self.entities.len()];
        let mut i = 0;
        while i < self.entities.len() {
            if !self.entities[i].pending_removal {
                let query = self.entities[i].query_bounds(dt, &self.config);
                let nearby = self.quadtree.query_near(&query);
                let ctx = StepContext {
                    input,
                    dt,
                    now_ms: self.clock_ms,
                    config: &self.config,
                };
                behavior::update(&mut self.entities, i, &nearby, &ctx);

                for slot in std::iter::once(i).chain(nearby) {
                    if self.entities[slot].pending_removal && !resolved[slot] {
                        resolved[slot] = true;
                        self.on_removed(slot);
                    }
                }
                resolved.resize(self.entities.len(), false);
            }
            i += 1;
        }

        self.entities.retain(|e| !e.pending_removal);
        for entity in &mut self.entities {
            entity.wrap_around(&self.config);
        }

        if self.entities.len() == 1 {
            self.level_over = true;
        }
    }

    fn rebuild_index(&mut self) {
        let mut quadtree = QuadTree::new(index_region(&self.config));
        let config = &self.config;
        quadtree.extend(
            self.entities
                .iter()
                .enumerate()
                .map(|(slot, e)| (slot, e.index_bounds(config))),
        );
        self.quadtree = quadtree;
    }

    fn fire_ready(&self) -> bool {
        let delay = self.config.starship_fire_delay_ms as f64;
        self.last_fire_ms
            .is_none_or(|last| self.clock_ms - last >= delay)
    }

    fn resolve_player_input(&mut self, input: &UserInput, dt: f32) {
        let Some(idx) = self.player_index() else {
            return;
        };

        if input.fire && self.fire_ready() {
            self.last_fire_ms = Some(self.clock_ms);

            let ship = &self.entities[idx];
            let dir = facing(ship.rotation);
            let nose = ship.center() + dir * ship.size.y / 2.0;
            let vel = dir * self.config.projectile_speed_multiplier + ship.vel;
            let rotation = ship.rotation;

            let id = self.next_entity_id();
            let projectile =
                Entity::projectile(id, nose, vel, rotation, self.clock_ms, &self.config);
            log::debug!("Ship fired projectile {} at t={:.0}ms", id, self.clock_ms);
            self.entities.push(projectile);
        }

        if let Some(shield) = self.entities[idx].shield_mut() {
            if input.shield {
                shield.raise(dt);
            } else if shield.active {
                shield.lower();
            }
        }
    }

    /// Death side effects for the entity in `slot`
    fn on_removed(&mut self, slot: usize) {
        let parent = &self.entities[slot];
        match parent.kind_tag() {
            Kind::Asteroid => {
                let parent = parent.clone();
                if parent.area() > self.config.asteroid_min_area {
                    let fragments = self.fragment(&parent);
                    log::debug!(
                        "Asteroid {} split into {} fragments",
                        parent.id,
                        fragments.len()
                    );
                    self.entities.extend(fragments);
                }
                let debris = self.debris_burst(&parent);
                self.entities.extend(debris);
            }
            Kind::Ship if self.player == Some(parent.id) => {
                let parent = parent.clone();
                log::info!("Player ship {} destroyed", parent.id);
                self.player_dead = true;
                self.player = None;
                let debris = self.debris_burst(&parent);
                self.entities.extend(debris);
            }
            _ => {}
        }
    }

    /// Half-size children with half of the parent's remaining hit points,
    /// carrying the parent's momentum plus its destruct velocity
    fn fragment(&mut self, parent: &Entity) -> Vec<Entity> {
        let size = parent.size / 2.0;
        let hit_points = parent.hit_points / 2.0;
        (0..self.config.asteroid_fragments)
            .map(|_| {
                let id = self.next_entity_id();
                let mut child =
                    Entity::asteroid(id, parent.pos, size, hit_points, &self.config, &mut self.rng);
                child.vel += parent.vel + parent.destruct_vel;
                child
            })
            .collect()
    }

    /// Sparks scattered over the parent's box
    fn debris_burst(&mut self, parent: &Entity) -> Vec<Entity> {
        let center = parent.center();
        (0..self.config.debris_burst)
            .map(|_| {
                let id = self.next_entity_id();
                let offset = Vec2::new(
                    self.rng.random::<f32>() * parent.size.x - parent.size.x / 2.0,
                    self.rng.random::<f32>() * parent.size.y - parent.size.y / 2.0,
                );
                let vel = parent.vel
                    + Vec2::new(
                        self.rng.random::<f32>() * parent.destruct_vel.x * 2.0,
                        self.rng.random::<f32>() * parent.destruct_vel.y * 2.0,
                    );
                Entity::debris(
                    id,
                    center + offset,
                    vel,
                    self.clock_ms,
                    &self.config,
                    &mut self.rng,
                )
            })
            .collect()
    }

    /// Seed a new level: `asteroids` full-size rocks at random positions,
    /// nudged off the player until none overlap it
    pub fn init_level(&mut self, asteroids: usize) {
        self.level_over = false;

        let size = Vec2::splat(self.config.asteroid_max_size);
        let hit_points = self.config.asteroid_max_hit_points;
        let first = self.entities.len();
        for _ in 0..asteroids {
            let pos = Vec2::new(
                self.rng.random::<f32>() * self.config.world_width,
                self.rng.random::<f32>() * self.config.world_height,
            );
            self.spawn_asteroid(pos, size, hit_points);
        }

        if let Some(player) = self.player() {
            let player_bounds = player.bounds();
            let mut seeded = QuadTree::new(index_region(&self.config));
            seeded.extend(
                (first..self.entities.len()).map(|slot| (slot, self.entities[slot].index_bounds(&self.config))),
            );
            for slot in seeded.query_near(&player_bounds.circle_box()) {
                let asteroid = &mut self.entities[slot];
                while circles_overlap(&player_bounds, &asteroid.bounds()) {
                    asteroid.pos += asteroid.size / 2.0;
                }
            }
        }

        log::info!("Level seeded with {} asteroids", asteroids);
    }

    /// Place a fresh ship at the arena center, nudged off any asteroid it
    /// overlaps, and make it the player
    pub fn init_player(&mut self) {
        let id = self.next_entity_id();
        let size = Vec2::new(self.config.starship_width, self.config.starship_height);
        let center = Vec2::new(self.config.world_width, self.config.world_height) / 2.0;
        let mut ship = Entity::ship(id, center - size / 2.0, &self.config);

        let mut index = QuadTree::new(index_region(&self.config));
        let config = &self.config;
        index.extend(
            self.entities
                .iter()
                .enumerate()
                .map(|(slot, e)| (slot, e.index_bounds(config))),
        );
        for slot in index.query_near(&ship.index_bounds(config)) {
            let other = &self.entities[slot];
            if !other.is(Kind::Asteroid) {
                continue;
            }
            while circles_overlap(&ship.bounds(), &other.bounds()) {
                ship.pos += other.size / 2.0;
            }
        }

        log::info!("Player ship {} spawned at ({:.0}, {:.0})", id, ship.pos.x, ship.pos.y);
        self.player = Some(id);
        self.entities.push(ship);
    }

    /// Acknowledge a player death and schedule the replacement ship
    pub fn reset_player(&mut self) {
        self.player_dead = false;
        if self.player.is_some() {
            log::warn!("reset_player called while a player ship is alive");
            return;
        }
        let at = self.clock_ms + self.config.respawn_delay_ms as f64;
        log::info!("Respawn scheduled for t={:.0}ms", at);
        self.respawn_at = Some(at);
    }
}

/// The arena grown by the wrap margin, so entities in the margin band are indexed
fn index_region(config: &SimConfig) -> Bounds {
    Bounds::new(0.0, 0.0, config.world_width, config.world_height).expanded(config.wrap_margin())
}
