//! The simulation: one maze, one hunter, a flock of prey and a clock.
//!
//! Every frame runs in a fixed order: advance time, move the hunter and let it
//! eat, rebuild occupancy from the prey still standing, then update each prey
//! (which respawns against that fresh occupancy). A prey eaten this frame is
//! therefore never counted as occupying its old cell.

use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::hunter::{CaptureEvent, Hunter};
use crate::maze::{Maze, Occupancy};
use crate::prey::Prey;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub frames: u64,
    pub captures: u64,
    pub respawns: u64,
}

#[derive(Debug, Clone)]
pub struct Screensaver {
    maze: Maze,
    hunter: Hunter,
    prey: Vec<Prey>,
    tile_size: f32,
    elapsed: f64,
    max_delta: f32,
    events: Vec<CaptureEvent>,
    stats: Stats,
}

impl Screensaver {
    pub fn new(config: &SimulationConfig, rng: &mut impl Rng) -> Result<Self> {
        config.validate()?;
        let maze = Maze::generate(config.rows, config.cols, config.loop_density, rng)?;
        let hunter = Hunter::new(&maze, config, rng);

        let mut seeded = Occupancy::new();
        let prey = (0..config.prey_count)
            .map(|_| Prey::spawn_new(&maze, &mut seeded, config, rng))
            .collect();

        info!(
            rows = maze.rows(),
            cols = maze.cols(),
            prey = config.prey_count,
            "screensaver ready"
        );
        Ok(Self {
            maze,
            hunter,
            prey,
            tile_size: config.tile_size,
            elapsed: 0.0,
            max_delta: config.max_delta,
            events: Vec::new(),
            stats: Stats::default(),
        })
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn hunter(&self) -> &Hunter {
        &self.hunter
    }

    pub fn prey(&self) -> &[Prey] {
        &self.prey
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn active_prey(&self) -> usize {
        self.prey.iter().filter(|p| !p.is_eaten()).count()
    }

    /// Rescales drawing only. Topology and entity cells are untouched.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.tile_size = (width / self.maze.cols() as f32).min(height / self.maze.rows() as f32);
        self.hunter.clear_trail();
    }

    /// Hands out the capture events raised since the last call and forgets them.
    pub fn drain_events(&mut self) -> Vec<CaptureEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn update(&mut self, delta: f32, rng: &mut impl Rng) {
        let delta = delta.clamp(0.0, self.max_delta);
        self.elapsed += f64::from(delta);
        self.stats.frames += 1;

        let before = self.events.len();
        self.hunter.update(
            delta,
            &mut self.prey,
            self.elapsed,
            &self.maze,
            self.tile_size,
            rng,
            &mut self.events,
        );
        self.stats.captures += (self.events.len() - before) as u64;

        let mut occupied: Occupancy = self
            .prey
            .iter()
            .filter(|p| !p.is_eaten())
            .map(|p| p.key(&self.maze))
            .collect();

        for prey in self.prey.iter_mut() {
            if prey.update(delta, self.elapsed, &self.maze, &mut occupied, rng) {
                self.stats.respawns += 1;
            }
        }
    }
}
