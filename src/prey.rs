use std::f32::consts::TAU;

use rand::Rng;
use tracing::trace;

use crate::config::SimulationConfig;
use crate::maze::{Cell, CellKey, Maze, Occupancy};
use crate::mover::{GridEntity, GridMover, Point, TurnPolicy};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreyState {
    Active,
    Eaten { respawn_at: f64 },
}

#[derive(Debug, Clone)]
pub struct Prey {
    mover: GridMover,
    state: PreyState,
    float_phase: f32,
    respawn_min: f32,
    respawn_max: f32,
    spawn_attempts: usize,
}

impl Prey {
    /// Places a new prey, preferring a cell nobody in `occupied` holds yet.
    pub fn spawn_new(
        maze: &Maze,
        occupied: &mut Occupancy,
        config: &SimulationConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let cell = pick_spawn_cell(maze, occupied, config.spawn_attempts, rng);
        let mover = GridMover::new(cell, config.prey_speed, TurnPolicy::Wander, maze, rng);
        occupied.insert(maze.cell_key(cell));
        Self {
            mover,
            state: PreyState::Active,
            float_phase: rng.gen_range(0.0..TAU),
            respawn_min: config.respawn_min,
            respawn_max: config.respawn_max,
            spawn_attempts: config.spawn_attempts,
        }
    }

    pub fn state(&self) -> PreyState {
        self.state
    }

    pub fn is_eaten(&self) -> bool {
        matches!(self.state, PreyState::Eaten { .. })
    }

    pub fn respawn_at(&self) -> Option<f64> {
        match self.state {
            PreyState::Eaten { respawn_at } => Some(respawn_at),
            PreyState::Active => None,
        }
    }

    pub fn float_phase(&self) -> f32 {
        self.float_phase
    }

    /// Vertical bob offset for drawing.
    pub fn bob(&self, tile_size: f32) -> f32 {
        (self.float_phase * 2.0).sin() * tile_size * 0.08
    }

    pub fn key(&self, maze: &Maze) -> CellKey {
        maze.cell_key(self.mover.current())
    }

    pub fn mover(&self) -> &GridMover {
        &self.mover
    }

    pub fn mark_eaten(&mut self, time: f64, rng: &mut impl Rng) {
        let delay = rng.gen_range(self.respawn_min..self.respawn_max);
        self.state = PreyState::Eaten {
            respawn_at: time + f64::from(delay),
        };
    }

    pub fn update(
        &mut self,
        delta: f32,
        time: f64,
        maze: &Maze,
        occupied: &mut Occupancy,
        rng: &mut impl Rng,
    ) -> bool {
        self.float_phase += delta;
        match self.state {
            PreyState::Eaten { respawn_at } if time >= respawn_at => {
                self.respawn(maze, occupied, rng);
                true
            }
            PreyState::Eaten { .. } => false,
            PreyState::Active => {
                self.mover.advance(delta, maze, rng, |_| {});
                false
            }
        }
    }

    fn respawn(&mut self, maze: &Maze, occupied: &mut Occupancy, rng: &mut impl Rng) {
        let cell = pick_spawn_cell(maze, occupied, self.spawn_attempts, rng);
        self.mover.relocate(cell, maze, rng);
        self.state = PreyState::Active;
        self.float_phase = rng.gen_range(0.0..TAU);
        occupied.insert(maze.cell_key(cell));
        trace!(?cell, "prey respawned");
    }
}

impl GridEntity for Prey {
    fn cell(&self) -> Cell {
        self.mover.current()
    }

    fn position(&self, tile_size: f32) -> Point {
        self.mover.position(tile_size)
    }
}

fn pick_spawn_cell(
    maze: &Maze,
    occupied: &Occupancy,
    attempts: usize,
    rng: &mut impl Rng,
) -> Cell {
    let mut cell = maze.random_open_cell(rng);
    for _ in 1..attempts {
        if !occupied.contains(&maze.cell_key(cell)) {
            break;
        }
        cell = maze.random_open_cell(rng);
    }
    cell
}
