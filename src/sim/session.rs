//! Game session policy
//!
//! The world only reports what happened in a tick. The session turns those
//! flags into a game: advancing levels, spending lives, scheduling respawns,
//! and ending the run.

use std::time::Instant;

use serde::Serialize;

use super::world::{UserInput, World};
use crate::config::SimConfig;

/// Notable transitions from one [`Session::advance`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new asteroid field was seeded
    LevelStarted { level: u32 },
    /// The ship was lost and a replacement is on its way
    LifeLost { lives_left: u32 },
    /// The last ship was lost
    GameOver,
}

/// Values the host paints as HUD text
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HudStatus {
    pub level: u32,
    pub lives: u32,
    /// `None` while no ship is on the field
    pub hit_points: Option<f32>,
    pub shield_charge: Option<f32>,
    pub game_over: bool,
}

/// Asteroids seeded for a level: two to start, then one per level number
pub fn asteroids_for_level(level: u32) -> usize {
    level.max(2) as usize
}

/// One run of the game: a world plus level and life counters
#[derive(Debug, Clone)]
pub struct Session {
    world: World,
    level: u32,
    lives: u32,
    game_over: bool,
}

impl Session {
    /// Start at level 1 with a ship at the arena center
    pub fn new(config: SimConfig, seed: u64) -> Self {
        let lives = config.starting_lives;
        let mut world = World::new(config, seed);
        world.init_player();
        world.init_level(asteroids_for_level(1));
        log::info!("Session started with seed {} and {} lives", seed, lives);
        Self {
            world,
            level: 1,
            lives,
            game_over: false,
        }
    }

    /// Start with a random seed
    pub fn from_entropy(config: SimConfig) -> Self {
        Self::new(config, rand::random())
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Step the world and apply level and life policy.
    ///
    /// After game over the world keeps drifting, so debris can finish
    /// animating, but no further transitions happen.
    pub fn advance(&mut self, input: &UserInput, dt: f32) -> Vec<SessionEvent> {
        self.world.step(input, dt);

        let mut events = Vec::new();
        if self.game_over {
            return events;
        }

        if self.world.level_over() {
            self.level += 1;
            self.world.init_level(asteroids_for_level(self.level));
            log::info!("Level {} started", self.level);
            events.push(SessionEvent::LevelStarted { level: self.level });
        } else if self.world.player_dead() {
            self.lives = self.lives.saturating_sub(1);
            if self.lives == 0 {
                self.game_over = true;
                log::info!("Game over at level {}", self.level);
                events.push(SessionEvent::GameOver);
            } else {
                self.world.reset_player();
                log::info!("Life lost, {} remaining", self.lives);
                events.push(SessionEvent::LifeLost {
                    lives_left: self.lives,
                });
            }
        }
        events
    }

    pub fn hud(&self) -> HudStatus {
        let player = self.world.player();
        HudStatus {
            level: self.level,
            lives: self.lives,
            hit_points: player.map(|p| p.hit_points),
            shield_charge: player.and_then(|p| p.shield()).map(|s| s.charge),
            game_over: self.game_over,
        }
    }
}

/// Wall-clock frame timer producing per-tick dt in milliseconds
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    max_frame_ms: f32,
}

impl FrameClock {
    pub fn new(max_frame_ms: f32) -> Self {
        Self {
            last: None,
            max_frame_ms,
        }
    }

    /// Milliseconds since the previous call, capped so a stalled frame
    /// cannot launch entities across the arena. The first call returns 0.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f32() * 1000.0,
            None => 0.0,
        };
        self.last = Some(now);
        dt.min(self.max_frame_ms)
    }
}
