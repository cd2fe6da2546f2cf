//! Drawing boundary
//!
//! The simulation never owns a canvas. A host implements [`Surface`] over
//! whatever it paints with (2D canvas, GPU batch, test recorder) and calls
//! [`draw_world`] once per frame after stepping.

use glam::Vec2;

use crate::config::SimConfig;
use crate::sim::collision::Bounds;
use crate::sim::entity::{Entity, EntityKind};
use crate::sim::world::World;

/// RGBA, each channel 0..1
pub type Rgba = [f32; 4];

pub const SHIP_COLOR: Rgba = [0.9, 0.9, 0.95, 1.0];
pub const SHIELD_COLOR: Rgba = [0.3, 0.7, 1.0, 0.8];
pub const ASTEROID_COLOR: Rgba = [0.55, 0.5, 0.45, 1.0];
pub const PROJECTILE_COLOR: Rgba = [1.0, 0.85, 0.3, 1.0];
pub const DEBRIS_COLOR: Rgba = [1.0, 0.5, 0.2, 1.0];

/// Immediate-mode 2D drawing surface with a transform stack
pub trait Surface {
    /// Push the current transform
    fn save(&mut self);
    /// Pop back to the last saved transform
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    /// Clockwise radians in a y-down frame
    fn rotate(&mut self, angle: f32);
    fn fill_rect(&mut self, bounds: Bounds, color: Rgba);
    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
}

impl Entity {
    /// Draw rotated about the center
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, config: &SimConfig) {
        let center = self.center();
        surface.save();
        surface.translate(center);
        surface.rotate(self.rotation);
        surface.translate(-center);
        self.render(surface, config);
        surface.restore();
    }

    /// Paint in world coordinates, ignoring rotation
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, config: &SimConfig) {
        match &self.kind {
            EntityKind::Ship { shield } => {
                let nose = Vec2::new(self.pos.x + self.size.x / 2.0, self.pos.y);
                let left = Vec2::new(self.pos.x, self.pos.y + self.size.y);
                let right = self.pos + self.size;
                surface.fill_polygon(&[nose, right, left], SHIP_COLOR);
                if shield.active {
                    surface.stroke_circle(
                        self.center(),
                        config.starship_shield_diameter / 2.0,
                        SHIELD_COLOR,
                    );
                }
            }
            EntityKind::Asteroid { outline } => {
                let center = self.center();
                let points: Vec<Vec2> = outline.iter().map(|v| center + *v).collect();
                surface.fill_polygon(&points, ASTEROID_COLOR);
            }
            EntityKind::Projectile { .. } => surface.fill_rect(self.bounds(), PROJECTILE_COLOR),
            EntityKind::Debris { .. } => surface.fill_rect(self.bounds(), DEBRIS_COLOR),
        }
    }
}

/// Paint every live entity in storage order
pub fn draw_world<S: Surface + ?Sized>(world: &World, surface: &mut S) {
    let config = world.config();
    for entity in world.entities() {
        entity.draw(surface, config);
    }
}
