use std::collections::VecDeque;

use rand::Rng;
use tracing::debug;

use crate::config::SimulationConfig;
use crate::direction::Dir;
use crate::maze::{Cell, Maze};
use crate::mover::{tile_center, GridEntity, GridMover, Point, TurnPolicy};
use crate::prey::Prey;

const TRAIL_LIFE: f32 = 0.5;
const TRAIL_DECAY: f32 = 0.9;
const HIGHLIGHT_DECAY: f32 = 2.8;
const MUNCH_DECAY: f32 = 2.6;
const MOUTH_RATE: f32 = 5.5;
const EYE_RATE: f32 = 3.2;

/// Emitted once per capture, for the renderer's spark bursts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureEvent {
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSegment {
    pub position: Point,
    pub life: f32,
}

#[derive(Debug, Clone)]
pub struct Hunter {
    mover: GridMover,
    capture_radius: f32,
    trail: VecDeque<TrailSegment>,
    max_trail: usize,
    highlight: f32,
    munch_burst: f32,
    mouth_phase: f32,
    eye_phase: f32,
}

impl Hunter {
    pub fn new(maze: &Maze, config: &SimulationConfig, rng: &mut impl Rng) -> Self {
        let start = maze.random_open_cell(rng);
        Self {
            mover: GridMover::new(start, config.hunter_speed, TurnPolicy::NoReverse, maze, rng),
            capture_radius: config.capture_radius,
            trail: VecDeque::with_capacity(config.trail_length + 1),
            max_trail: config.trail_length,
            highlight: 0.0,
            munch_burst: 0.0,
            mouth_phase: 0.0,
            eye_phase: rng.gen_range(0.0..std::f32::consts::TAU),
        }
    }

    pub fn mover(&self) -> &GridMover {
        &self.mover
    }

    pub fn facing(&self) -> Dir {
        self.mover.direction()
    }

    pub fn highlight(&self) -> f32 {
        self.highlight
    }

    pub fn munch_burst(&self) -> f32 {
        self.munch_burst
    }

    pub fn mouth_phase(&self) -> f32 {
        self.mouth_phase
    }

    pub fn eye_phase(&self) -> f32 {
        self.eye_phase
    }

    pub fn trail(&self) -> impl Iterator<Item = &TrailSegment> {
        self.trail.iter()
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }

    /// Puts the hunter on `cell` and picks a fresh heading from there.
    pub fn relocate(&mut self, cell: Cell, maze: &Maze, rng: &mut impl Rng) {
        self.mover.relocate(cell, maze, rng);
        self.trail.clear();
    }

    /// Moves one frame and eats whatever is in reach, before and after the move.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        delta: f32,
        prey: &mut [Prey],
        time: f64,
        maze: &Maze,
        tile_size: f32,
        rng: &mut impl Rng,
        events: &mut Vec<CaptureEvent>,
    ) {
        self.mouth_phase += delta * MOUTH_RATE;
        self.eye_phase += delta * EYE_RATE;
        self.highlight = (self.highlight - delta * HIGHLIGHT_DECAY).max(0.0);
        self.munch_burst = (self.munch_burst - delta * MUNCH_DECAY).max(0.0);

        self.consume(prey, time, tile_size, rng, events);

        let trail = &mut self.trail;
        let max_trail = self.max_trail;
        self.mover.advance(delta, maze, rng, |cell: Cell| {
            trail.push_front(TrailSegment {
                position: tile_center(cell, tile_size),
                life: TRAIL_LIFE,
            });
            trail.truncate(max_trail);
        });

        for segment in self.trail.iter_mut() {
            segment.life = (segment.life - delta * TRAIL_DECAY).max(0.0);
        }
        self.trail.retain(|segment| segment.life > 0.0);

        self.consume(prey, time, tile_size, rng, events);
    }

    fn consume(
        &mut self,
        prey: &mut [Prey],
        time: f64,
        tile_size: f32,
        rng: &mut impl Rng,
        events: &mut Vec<CaptureEvent>,
    ) {
        let position = self.position(tile_size);
        let radius = self.capture_radius * tile_size;
        for target in prey.iter_mut().filter(|p| !p.is_eaten()) {
            let prey_position = target.position(tile_size);
            if !within_capture(position, prey_position, radius) {
                continue;
            }
            target.mark_eaten(time, rng);
            self.highlight = 1.0;
            self.munch_burst = 1.0;
            events.push(CaptureEvent {
                position: prey_position,
            });
            debug!(cell = ?target.cell(), time, "prey captured");
        }
    }
}

pub fn within_capture(hunter: Point, prey: Point, radius: f32) -> bool {
    hunter.distance(prey) < radius
}

impl GridEntity for Hunter {
    fn cell(&self) -> Cell {
        self.mover.current()
    }

    fn position(&self, tile_size: f32) -> Point {
        self.mover.position(tile_size)
    }
}
