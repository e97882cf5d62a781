//! Cosmetic sparks and background particles. Nothing here feeds back into the simulation.

use std::f32::consts::{PI, TAU};

use rand::Rng;

use crate::hunter::CaptureEvent;
use crate::mover::Point;

const SPARKS_PER_BURST: usize = 3;
/// Tile size the particle speeds are tuned for.
const PARTICLE_TILE: f32 = 24.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Spark {
    pub position: Point,
    pub radius: f32,
    pub life: f32,
    pub rotation: f32,
    spin: f32,
    flight_angle: f32,
    velocity: f32,
    tile_size: f32,
}

impl Spark {
    pub fn new(position: Point, tile_size: f32, offset: f32, rng: &mut impl Rng) -> Self {
        Self {
            position,
            radius: tile_size * 0.18,
            life: 0.55 + rng.gen::<f32>() * 0.25,
            rotation: rng.gen::<f32>() * PI,
            spin: (rng.gen::<f32>() - 0.5) * 3.0,
            flight_angle: offset * TAU,
            velocity: tile_size * (0.35 + rng.gen::<f32>() * 0.3),
            tile_size,
        }
    }

    pub fn update(&mut self, delta: f32) {
        self.life -= delta;
        self.radius += delta * self.tile_size * 1.25;
        self.position.x += self.flight_angle.cos() * self.velocity * delta;
        self.position.y += self.flight_angle.sin() * self.velocity * delta;
        self.velocity *= 0.9;
        self.rotation += self.spin * delta;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Point,
    pub speed: f32,
    pub size: f32,
    pub hue: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone)]
pub struct ParticleField {
    count: usize,
    width: f32,
    height: f32,
    scale: f32,
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new(count: usize, rng: &mut impl Rng) -> Self {
        let mut field = Self {
            count,
            width: 800.0,
            height: 800.0,
            scale: 1.0,
            particles: Vec::new(),
        };
        field.regenerate(rng);
        field
    }

    /// Resets the field to cover `width` x `height` world units, with speeds scaled to `tile_size`.
    pub fn set_bounds(&mut self, width: f32, height: f32, tile_size: f32, rng: &mut impl Rng) {
        self.width = width;
        self.height = height;
        self.scale = tile_size / PARTICLE_TILE;
        self.regenerate(rng);
    }

    fn regenerate(&mut self, rng: &mut impl Rng) {
        self.particles = (0..self.count)
            .map(|_| Particle {
                position: Point::new(rng.gen::<f32>() * self.width, rng.gen::<f32>() * self.height),
                speed: (10.0 + rng.gen::<f32>() * 20.0) * self.scale,
                size: rng.gen::<f32>() * 1.4 + 0.4,
                hue: 200.0 + rng.gen::<f32>() * 60.0,
                alpha: 0.05 + rng.gen::<f32>() * 0.15,
            })
            .collect();
    }

    pub fn update(&mut self, delta: f32, rng: &mut impl Rng) {
        for p in self.particles.iter_mut() {
            p.position.y += p.speed * delta;
            if p.position.y > self.height {
                p.position.x = rng.gen::<f32>() * self.width;
                p.position.y = -10.0 * self.scale;
            }
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

#[derive(Debug, Clone)]
pub struct Effects {
    sparks: Vec<Spark>,
    particles: ParticleField,
}

impl Effects {
    pub fn new(particle_count: usize, rng: &mut impl Rng) -> Self {
        Self {
            sparks: Vec::new(),
            particles: ParticleField::new(particle_count, rng),
        }
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn resize(&mut self, width: f32, height: f32, tile_size: f32, rng: &mut impl Rng) {
        self.particles.set_bounds(width, height, tile_size, rng);
        self.sparks.clear();
    }

    pub fn burst(&mut self, position: Point, tile_size: f32, rng: &mut impl Rng) {
        for i in 0..SPARKS_PER_BURST {
            let offset = i as f32 / SPARKS_PER_BURST as f32;
            self.sparks.push(Spark::new(position, tile_size, offset, rng));
        }
    }

    pub fn absorb(&mut self, events: &[CaptureEvent], tile_size: f32, rng: &mut impl Rng) {
        for event in events {
            self.burst(event.position, tile_size, rng);
        }
    }

    pub fn update(&mut self, delta: f32, rng: &mut impl Rng) {
        self.particles.update(delta, rng);
        for spark in self.sparks.iter_mut() {
            spark.update(delta);
        }
        self.sparks.retain(Spark::is_alive);
    }
}
