//! Raindrop simulation world

use raindrop_core::{FrameClock, Rect, Simulator, SimulatorOptions, Viewport};
use raindrop_math::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotmap::SlotMap;

use crate::raindrop::{DropKey, Raindrop};

/// Radius lost per pixel slid (water left behind on the glass)
const TRAIL_LOSS_PER_PIXEL: f32 = 0.002;

/// Sideways wander of sliding drops, in pixels per second
const WANDER_SPEED: f32 = 25.0;

/// All raindrops on the glass plus the rules that move them
pub struct RaindropSimulator {
    drops: SlotMap<DropKey, Raindrop>,
    options: SimulatorOptions,
    bounds: Rect,
    rng: StdRng,
    /// Fractional drops carried between frames
    spawn_budget: f32,
}

impl RaindropSimulator {
    /// Create a simulator over the given viewport
    pub fn with_options(options: SimulatorOptions, viewport: Viewport) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            drops: SlotMap::with_key(),
            options,
            bounds: viewport.bounds(),
            rng,
            spawn_budget: 0.0,
        }
    }

    /// Place a drop directly; returns None when the drop limit is reached
    pub fn spawn_drop(&mut self, drop: Raindrop) -> Option<DropKey> {
        if self.drops.len() >= self.options.max_drops {
            return None;
        }
        Some(self.drops.insert(drop))
    }

    pub fn get(&self, key: DropKey) -> Option<&Raindrop> {
        self.drops.get(key)
    }

    /// Iterate over every live drop
    pub fn raindrops(&self) -> impl Iterator<Item = &Raindrop> + '_ {
        self.drops.values()
    }

    pub fn drop_count(&self) -> usize {
        self.drops.len()
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn options(&self) -> &SimulatorOptions {
        &self.options
    }

    /// Remove every drop
    pub fn clear(&mut self) {
        self.drops.clear();
        self.spawn_budget = 0.0;
    }

    /// Advance the simulation by `dt` seconds
    ///
    /// 1. Spawn new drops at the configured rate
    /// 2. Slide heavy drops under gravity and friction
    /// 3. Merge overlapping drops
    /// 4. Remove drops that left the glass or wore away
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 || self.bounds.is_empty() {
            return;
        }

        self.spawn(dt);
        self.integrate(dt);
        if self.options.merge {
            self.merge_overlapping();
        }
        self.cull();
    }

    fn spawn(&mut self, dt: f32) {
        self.spawn_budget += self.options.spawn_rate * dt;
        while self.spawn_budget >= 1.0 {
            self.spawn_budget -= 1.0;
            let position = Vec2::new(
                self.rng.gen_range(self.bounds.x..=self.bounds.x + self.bounds.width),
                self.rng.gen_range(self.bounds.y..=self.bounds.y + self.bounds.height),
            );
            let radius = self
                .rng
                .gen_range(self.options.min_radius..=self.options.max_radius);
            if self.spawn_drop(Raindrop::new(position, radius)).is_none() {
                // Full; drop the rest of this frame's budget
                self.spawn_budget = self.spawn_budget.fract();
                break;
            }
        }
    }

    fn integrate(&mut self, dt: f32) {
        let options = &self.options;
        let damping = (1.0 - options.friction * dt).max(0.0);
        let span = (options.max_radius - options.slide_threshold).max(f32::EPSILON);

        for drop in self.drops.values_mut() {
            drop.age += dt;
            if drop.radius < options.slide_threshold {
                drop.velocity = Vec2::ZERO;
                continue;
            }

            // Heavier drops overcome more of the glass's grip
            let weight = ((drop.radius - options.slide_threshold) / span).clamp(0.1, 1.0);
            drop.velocity.y += options.gravity * weight * dt;
            drop.velocity.x += self.rng.gen_range(-1.0..=1.0) * WANDER_SPEED * dt;
            drop.velocity *= damping;
            drop.velocity.y = drop.velocity.y.min(options.terminal_velocity);

            let displacement = drop.velocity * dt;
            drop.position += displacement;
            drop.radius -= displacement.length() * TRAIL_LOSS_PER_PIXEL;
        }
    }

    /// Sweep along x, letting the larger drop of each touching pair absorb the smaller
    fn merge_overlapping(&mut self) {
        let mut order: Vec<(DropKey, f32, f32)> = self
            .drops
            .iter()
            .map(|(key, drop)| (key, drop.position.x - drop.radius, drop.position.x + drop.radius))
            .collect();
        order.sort_by(|a, b| a.1.total_cmp(&b.1));

        for i in 0..order.len() {
            let (key_a, _, max_a) = order[i];
            for &(key_b, min_b, _) in &order[i + 1..] {
                if min_b > max_a {
                    break;
                }
                // Either side may have been absorbed earlier in the sweep
                let (Some(a), Some(b)) = (self.drops.get(key_a), self.drops.get(key_b)) else {
                    continue;
                };
                if !a.overlaps(b) {
                    continue;
                }

                let (keep, gone) = if a.radius >= b.radius {
                    (key_a, key_b)
                } else {
                    (key_b, key_a)
                };
                if let Some(absorbed) = self.drops.remove(gone) {
                    if let Some(survivor) = self.drops.get_mut(keep) {
                        survivor.absorb(&absorbed);
                    }
                }
                if gone == key_a {
                    break;
                }
            }
        }
    }

    fn cull(&mut self) {
        let visible = self.bounds.expanded(self.options.max_radius);
        let min_radius = self.options.min_radius;
        let before = self.drops.len();
        self.drops
            .retain(|_, drop| drop.radius >= min_radius && visible.contains(drop.position));
        let removed = before - self.drops.len();
        if removed > 0 {
            log::trace!("Culled {} raindrops", removed);
        }
    }
}

impl Simulator for RaindropSimulator {
    fn new(options: &SimulatorOptions, viewport: Viewport) -> Self {
        Self::with_options(options.clone(), viewport)
    }

    fn update(&mut self, clock: FrameClock) {
        self.step(clock.dt);
    }

    fn resize(&mut self, viewport: Viewport) {
        self.bounds = viewport.bounds();
        self.cull();
    }

    fn destroy(&mut self) {
        self.clear();
    }
}
