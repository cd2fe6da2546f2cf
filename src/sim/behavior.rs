//! Per-kind update rules
//!
//! Each tick the world calls [`update`] once per entity with the candidate
//! neighbors the quadtree returned. Kinds that only drift use the base
//! integration; the ship and projectiles layer their own motion and contact
//! rules on top.
//!
//! Entities already pending removal are skipped by every contact check, so a
//! rock destroyed earlier in the tick cannot be hit twice.

use glam::Vec2;

use super::collision::{circles_overlap, segment_hits_circle};
use super::entity::{Entity, EntityKind, Kind};
use super::world::UserInput;
use crate::config::SimConfig;
use crate::facing;

/// Everything an update rule may read besides the entities themselves
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub input: &'a UserInput,
    /// Elapsed time this tick (ms)
    pub dt: f32,
    /// Simulation clock after this tick's advance (ms)
    pub now_ms: f64,
    pub config: &'a SimConfig,
}

/// Advance `entities[subject]` by one tick
pub fn update(entities: &mut [Entity], subject: usize, nearby: &[usize], ctx: &StepContext) {
    match entities[subject].kind_tag() {
        Kind::Ship => update_ship(entities, subject, nearby, ctx),
        Kind::Asteroid => entities[subject].integrate(ctx.dt, ctx.config),
        Kind::Projectile => update_projectile(entities, subject, nearby, ctx),
        Kind::Debris => {
            let debris = &mut entities[subject];
            debris.integrate(ctx.dt, ctx.config);
            if debris.expired(ctx.now_ms) {
                debris.destroy(Vec2::ZERO);
            }
        }
    }
}

/// Thrust, turn, and ram asteroids.
///
/// Unlike asteroids the ship ignores `rotation_rate`: turning sets rotation
/// directly. Thrust already carries the time scaling, so position advances by
/// the raw velocity.
fn update_ship(entities: &mut [Entity], subject: usize, nearby: &[usize], ctx: &StepContext) {
    let config = ctx.config;
    let input = ctx.input;
    let dt = ctx.dt * config.world_speed_multiplier;

    let ship = &mut entities[subject];
    let thrust = facing(ship.rotation) * dt * config.starship_thrust_multiplier;
    if input.forward {
        ship.vel += thrust;
    }
    if input.backward {
        ship.vel -= thrust;
    }
    if input.rotate_right {
        ship.rotation += dt * config.starship_turn_rate;
    }
    if input.rotate_left {
        ship.rotation -= dt * config.starship_turn_rate;
    }
    ship.pos += ship.vel;

    for &other in nearby {
        if other == subject || entities[subject].pending_removal {
            continue;
        }
        let ship_bounds = entities[subject].contact_bounds(config);
        let ship_vel = entities[subject].vel;

        let asteroid = &mut entities[other];
        if !asteroid.is(Kind::Asteroid) || asteroid.pending_removal {
            continue;
        }
        if !circles_overlap(&ship_bounds, &asteroid.bounds()) {
            continue;
        }

        // Mutual contact: the rock always breaks, the ship takes the same hit
        let rock_destruct = ship_vel * config.starship_damage_speed_multiplier;
        asteroid.hit(config.starship_collision_damage, rock_destruct);
        asteroid.destroy(rock_destruct);
        let rock_vel = asteroid.vel;

        entities[subject].hit(config.starship_collision_damage, rock_vel);
    }
}

/// Fly, expire, and sweep for asteroid hits
fn update_projectile(
    entities: &mut [Entity],
    subject: usize,
    nearby: &[usize],
    ctx: &StepContext,
) {
    let config = ctx.config;

    let projectile = &mut entities[subject];
    let start = projectile.center();
    if let EntityKind::Projectile { last_pos, .. } = &mut projectile.kind {
        *last_pos = projectile.pos;
    }
    projectile.integrate(ctx.dt, config);
    if projectile.expired(ctx.now_ms) {
        projectile.destroy(Vec2::ZERO);
        return;
    }
    let end = projectile.center();
    let destruct = projectile.vel * config.asteroid_damage_speed_multiplier;

    for &other in nearby {
        if other == subject {
            continue;
        }
        let target = &mut entities[other];
        if !target.is(Kind::Asteroid) || target.pending_removal {
            continue;
        }
        if segment_hits_circle(start, end, target.center(), target.radius()) {
            target.hit(config.projectile_damage, destruct);
            entities[subject].destroy(Vec2::ZERO);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ctx<'a>(input: &'a UserInput, config: &'a SimConfig, now_ms: f64) -> StepContext<'a> {
        StepContext {
            input,
            dt: 16.0,
            now_ms,
            config,
        }
    }

    fn rock_at(id: u32, pos: Vec2, hit_points: f32, config: &SimConfig) -> Entity {
        let mut rng = Pcg32::seed_from_u64(id as u64);
        let mut rock = Entity::asteroid(id, pos, Vec2::splat(40.0), hit_points, config, &mut rng);
        rock.vel = Vec2::ZERO;
        rock.rotation_rate = 0.0;
        rock
    }

    #[test]
    fn test_ship_thrust_and_turn() {
        let config = SimConfig::default();
        let input = UserInput {
            forward: true,
            rotate_right: true,
            ..Default::default()
        };
        let mut entities = vec![Entity::ship(1, Vec2::new(400.0, 300.0), &config)];
        update(&mut entities, 0, &[], &ctx(&input, &config, 16.0));

        let ship = &entities[0];
        // dt 16 * 0.1 = 1.6 scaled ms; thrust 1.6 * 0.1 straight up
        assert!((ship.vel.y + 0.16).abs() < 1e-5);
        assert!(ship.vel.x.abs() < 1e-5);
        assert!((ship.pos.y - (300.0 - 0.16)).abs() < 1e-4);
        assert!((ship.rotation - 1.6 * 0.03).abs() < 1e-6);
        // Ship never tumbles on its own
        assert_eq!(ship.rotation_rate, 0.0);
    }

    #[test]
    fn test_ship_asteroid_contact_is_mutual() {
        let config = SimConfig::default();
        let input = UserInput::default();
        let mut ship = Entity::ship(1, Vec2::new(100.0, 100.0), &config);
        ship.vel = Vec2::new(2.0, 0.0);
        let mut rock = rock_at(2, Vec2::new(120.0, 100.0), 40.0, &config);
        rock.vel = Vec2::new(-1.0, 0.5);
        let mut entities = vec![ship, rock];

        update(&mut entities, 0, &[0, 1], &ctx(&input, &config, 16.0));

        let rock = &entities[1];
        assert!(rock.pending_removal);
        assert_eq!(rock.hit_points, 30.0);
        assert_eq!(rock.destruct_vel, Vec2::new(1.0, 0.0));

        let ship = &entities[0];
        assert!(ship.pending_removal);
        assert_eq!(ship.destruct_vel, Vec2::new(-1.0, 0.5));
    }

    #[test]
    fn test_shielded_ship_breaks_rocks_unharmed() {
        let config = SimConfig::default();
        let input = UserInput::default();
        let mut ship = Entity::ship(1, Vec2::new(100.0, 100.0), &config);
        ship.shield_mut().unwrap().raise(16.0);
        // Out of reach of the bare hull, inside the shield envelope
        let rock = rock_at(2, Vec2::new(160.0, 105.0), 40.0, &config);
        assert!(!circles_overlap(&ship.bounds(), &rock.bounds()));
        let mut entities = vec![ship, rock];

        update(&mut entities, 0, &[1], &ctx(&input, &config, 16.0));

        assert!(entities[1].pending_removal);
        assert!(!entities[0].pending_removal);
        assert_eq!(entities[0].hit_points, config.starship_hit_points);
    }

    #[test]
    fn test_dead_ship_stops_ramming() {
        let config = SimConfig::default();
        let input = UserInput::default();
        let ship = Entity::ship(1, Vec2::new(100.0, 100.0), &config);
        let first = rock_at(2, Vec2::new(100.0, 100.0), 40.0, &config);
        let second = rock_at(3, Vec2::new(105.0, 105.0), 40.0, &config);
        let mut entities = vec![ship, first, second];

        update(&mut entities, 0, &[1, 2], &ctx(&input, &config, 16.0));

        assert!(entities[0].pending_removal);
        assert!(entities[1].pending_removal);
        assert!(!entities[2].pending_removal);
        assert_eq!(entities[2].hit_points, 40.0);
    }

    #[test]
    fn test_projectile_sweeps_through_thin_rock() {
        let config = SimConfig::default();
        let input = UserInput::default();
        // 200 px/scaled-ms * 1.6 = 320 px this tick, rock sits mid-path
        let shot = Entity::projectile(1, Vec2::new(0.0, 300.0), Vec2::new(200.0, 0.0), 0.0, 0.0, &config);
        let mut rock = rock_at(2, Vec2::new(150.0, 290.0), 10.0, &config);
        rock.size = Vec2::splat(20.0);
        let mut entities = vec![shot, rock];

        update(&mut entities, 0, &[1], &ctx(&input, &config, 16.0));

        assert!(entities[0].pending_removal);
        let rock = &entities[1];
        assert_eq!(rock.hit_points, 5.0);
        assert!(!rock.pending_removal);

        if let EntityKind::Projectile { last_pos, .. } = entities[0].kind {
            assert_eq!(last_pos, Vec2::new(-2.5, 297.5));
        } else {
            panic!("not a projectile");
        }
    }

    #[test]
    fn test_projectile_skips_pending_rocks() {
        let config = SimConfig::default();
        let input = UserInput::default();
        let shot = Entity::projectile(1, Vec2::new(0.0, 300.0), Vec2::new(200.0, 0.0), 0.0, 0.0, &config);
        let mut dying = rock_at(2, Vec2::new(150.0, 280.0), 10.0, &config);
        dying.destroy(Vec2::ZERO);
        let mut entities = vec![shot, dying];

        update(&mut entities, 0, &[1], &ctx(&input, &config, 16.0));

        assert!(!entities[0].pending_removal);
        assert_eq!(entities[1].hit_points, 10.0);
    }

    #[test]
    fn test_projectile_kills_and_passes_destruct_velocity() {
        let config = SimConfig::default();
        let input = UserInput::default();
        let shot = Entity::projectile(1, Vec2::new(0.0, 300.0), Vec2::new(200.0, 0.0), 0.0, 0.0, &config);
        let rock = rock_at(2, Vec2::new(150.0, 280.0), 5.0, &config);
        let mut entities = vec![shot, rock];

        update(&mut entities, 0, &[0, 1], &ctx(&input, &config, 16.0));

        assert!(entities[1].pending_removal);
        assert!((entities[1].destruct_vel - Vec2::new(20.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_projectile_expires() {
        let config = SimConfig::default();
        let input = UserInput::default();
        let shot = Entity::projectile(1, Vec2::new(0.0, 300.0), Vec2::new(1.0, 0.0), 0.0, 0.0, &config);
        let mut entities = vec![shot];

        update(&mut entities, 0, &[], &ctx(&input, &config, 400.0));
        assert!(!entities[0].pending_removal);
        update(&mut entities, 0, &[], &ctx(&input, &config, 501.0));
        assert!(entities[0].pending_removal);
    }

    #[test]
    fn test_debris_drifts_and_expires() {
        let config = SimConfig::default();
        let input = UserInput::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let debris = Entity::debris(1, Vec2::ZERO, Vec2::new(10.0, 0.0), 0.0, &config, &mut rng);
        let mut entities = vec![debris];

        update(&mut entities, 0, &[], &ctx(&input, &config, 0.0));
        assert!((entities[0].pos.x - 16.0).abs() < 1e-4);

        update(&mut entities, 0, &[], &ctx(&input, &config, config.particle_max_ttl_ms as f64 + 1.0));
        assert!(entities[0].pending_removal);
    }
}
