use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::direction::Dir;
use crate::maze::{Cell, Maze};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

pub fn tile_center(cell: Cell, tile_size: f32) -> Point {
    Point {
        x: (cell.col as f32 + 0.5) * tile_size,
        y: (cell.row as f32 + 0.5) * tile_size,
    }
}

/// Anything that sits on a maze cell and has a continuous on-screen position.
pub trait GridEntity {
    fn cell(&self) -> Cell;
    fn position(&self, tile_size: f32) -> Point;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPolicy {
    /// Never double back unless the current cell is a dead end.
    NoReverse,
    /// Any open neighbour, reversing included.
    Wander,
}

#[derive(Debug, Clone)]
pub struct GridMover {
    current: Cell,
    target: Cell,
    progress: f32,
    direction: Dir,
    speed: f32,
    policy: TurnPolicy,
}

impl GridMover {
    pub fn new(
        start: Cell,
        speed: f32,
        policy: TurnPolicy,
        maze: &Maze,
        rng: &mut impl Rng,
    ) -> Self {
        let mut mover = Self {
            current: start,
            target: start,
            progress: 0.0,
            direction: Dir::Right,
            speed,
            policy,
        };
        mover.choose_next(maze, rng);
        mover
    }

    pub fn current(&self) -> Cell {
        self.current
    }

    pub fn target(&self) -> Cell {
        self.target
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn direction(&self) -> Dir {
        self.direction
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Moves along the current edge, calling `on_commit` each time `current` is replaced by `target`.
    pub fn advance(
        &mut self,
        delta: f32,
        maze: &Maze,
        rng: &mut impl Rng,
        mut on_commit: impl FnMut(Cell),
    ) {
        self.progress += delta * self.speed;
        while self.progress >= 1.0 {
            self.progress -= 1.0;
            self.current = self.target;
            on_commit(self.current);
            self.choose_next(maze, rng);
        }
    }

    pub fn relocate(&mut self, cell: Cell, maze: &Maze, rng: &mut impl Rng) {
        self.current = cell;
        self.target = cell;
        self.progress = 0.0;
        self.choose_next(maze, rng);
    }

    pub fn choose_next(&mut self, maze: &Maze, rng: &mut impl Rng) {
        let mut options = maze.neighbors(self.current);
        if options.is_empty() {
            let restart = maze.random_open_cell(rng);
            debug!(
                from = ?self.current,
                to = ?restart,
                "mover stranded, relocating"
            );
            self.current = restart;
            self.target = restart;
            self.progress = 0.0;
            options = maze.neighbors(restart);
            if options.is_empty() {
                // single-cell maze: nowhere to go
                return;
            }
        }

        let candidates = self.candidates(&options);
        let Some(&dir) = candidates.choose(rng) else {
            return;
        };
        if let Some(next) = maze.step(self.current, dir) {
            self.direction = dir;
            self.target = next;
        }
    }

    /// Directions the policy allows out of `options`.
    pub fn candidates(&self, options: &[Dir]) -> Vec<Dir> {
        match self.policy {
            TurnPolicy::Wander => options.to_vec(),
            TurnPolicy::NoReverse if options.len() > 1 => {
                let reverse = self.direction.reverse();
                options.iter().copied().filter(|d| *d != reverse).collect()
            }
            TurnPolicy::NoReverse => options.to_vec(),
        }
    }
}

impl GridEntity for GridMover {
    fn cell(&self) -> Cell {
        self.current
    }

    fn position(&self, tile_size: f32) -> Point {
        let from = tile_center(self.current, tile_size);
        let to = tile_center(self.target, tile_size);
        from.lerp(to, self.progress)
    }
}
