//! Collision predicates
//!
//! All collision math approximates an entity by its bounding circle: centered
//! on its bounding box, radius half of the larger side. Slow bodies use a
//! plain overlap test; projectiles sweep their motion segment because a fast
//! shot can cross a thin asteroid inside a single tick.

use glam::Vec2;

/// Axis-aligned box, top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of side `side` centered on `center`
    pub fn centered(center: Vec2, side: f32) -> Self {
        let half = side / 2.0;
        Self::new(center.x - half, center.y - half, side, side)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Radius of the bounding circle
    #[inline]
    pub fn radius(&self) -> f32 {
        self.width.max(self.height) / 2.0
    }

    /// Square enclosing the bounding circle
    pub fn circle_box(&self) -> Self {
        Self::centered(self.center(), self.radius() * 2.0)
    }

    /// Closed-interval box overlap
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }

    /// True if `other` lies entirely inside this box
    pub fn contains(&self, other: &Bounds) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }

    /// Smallest box covering both
    pub fn union(&self, other: &Bounds) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Self::new(x, y, right - x, bottom - y)
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Grow by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// True if the bounding circles of `a` and `b` touch or overlap
pub fn circles_overlap(a: &Bounds, b: &Bounds) -> bool {
    let distance = a.center().distance(b.center());
    distance <= a.radius() + b.radius()
}

/// Swept test: does the segment `start -> end` cross the circle's perimeter?
///
/// Solves `a·t² + b·t + c = 0` for the segment parametrized over `t ∈ [0, 1]`
/// relative to the circle center. A hit needs a positive discriminant and a
/// root strictly inside `(0, 1)`. Assumes the target moves much slower than
/// the segment, so the target is treated as stationary for the tick.
pub fn segment_hits_circle(start: Vec2, end: Vec2, center: Vec2, radius: f32) -> bool {
    let d = end - start;
    let f = start - center;

    let a = d.length_squared();
    if a == 0.0 {
        // No motion this tick
        return false;
    }
    let b = 2.0 * f.dot(d);
    let c = f.length_squared() - radius * radius;

    let disc = b * b - 4.0 * a * c;
    if disc <= 0.0 {
        return false;
    }

    let sqrt_disc = disc.sqrt();
    let t1 = (-b + sqrt_disc) / (2.0 * a);
    let t2 = (-b - sqrt_disc) / (2.0 * a);

    (0.0 < t1 && t1 < 1.0) || (0.0 < t2 && t2 < 1.0)
}
