//! A single raindrop on the glass

use raindrop_math::Vec2;
use slotmap::new_key_type;

new_key_type! {
    /// Key to a raindrop in the simulator
    ///
    /// Generational, so a key held across a merge that removed its drop
    /// returns None instead of pointing at whatever reused the slot.
    pub struct DropKey;
}

/// A drop of water in screen space
#[derive(Clone, Debug, PartialEq)]
pub struct Raindrop {
    /// Center in pixels (y grows downward)
    pub position: Vec2,
    /// Pixels per second
    pub velocity: Vec2,
    /// Radius in pixels
    pub radius: f32,
    /// Seconds since the drop appeared
    pub age: f32,
}

impl Raindrop {
    /// A drop at rest
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius,
            age: 0.0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Relative mass (proportional to the covered area)
    #[inline]
    pub fn mass(&self) -> f32 {
        self.radius * self.radius
    }

    /// Whether the two drops touch
    pub fn overlaps(&self, other: &Raindrop) -> bool {
        let reach = self.radius + other.radius;
        (other.position - self.position).length_squared() < reach * reach
    }

    /// Absorb `other`, keeping total area and momentum
    pub fn absorb(&mut self, other: &Raindrop) {
        let (m1, m2) = (self.mass(), other.mass());
        let total = m1 + m2;
        if total <= 0.0 {
            return;
        }
        self.position = (self.position * m1 + other.position * m2) * (1.0 / total);
        self.velocity = (self.velocity * m1 + other.velocity * m2) * (1.0 / total);
        self.radius = total.sqrt();
        self.age = self.age.max(other.age);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlaps() {
        let a = Raindrop::new(Vec2::new(0.0, 0.0), 5.0);
        let b = Raindrop::new(Vec2::new(9.0, 0.0), 5.0);
        let c = Raindrop::new(Vec2::new(10.5, 0.0), 5.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_absorb_preserves_area() {
        let mut a = Raindrop::new(Vec2::new(0.0, 0.0), 3.0);
        let b = Raindrop::new(Vec2::new(4.0, 0.0), 4.0);
        a.absorb(&b);
        assert!((a.radius - 5.0).abs() < 1e-5);
        // Center moves toward the heavier drop
        assert!(a.position.x > 2.0);
    }

    #[test]
    fn test_absorb_conserves_momentum() {
        let mut a = Raindrop::new(Vec2::ZERO, 1.0).with_velocity(Vec2::new(0.0, 10.0));
        let b = Raindrop::new(Vec2::ZERO, 1.0);
        a.absorb(&b);
        assert!((a.velocity.y - 5.0).abs() < 1e-5);
    }
}
