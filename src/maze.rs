use std::collections::{HashSet, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::direction::Dir;
use crate::error::{Result, ScreensaverError};

pub const DEFAULT_LOOP_DENSITY: f32 = 0.12;

const CARVE_STEPS: [(isize, isize); 4] = [(0, 2), (0, -2), (2, 0), (-2, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Open,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

pub type CellKey = usize;

/// Cells held by active prey during one frame.
pub type Occupancy = HashSet<CellKey>;

#[derive(Debug, Clone)]
pub struct Maze {
    rows: usize,
    cols: usize,
    grid: Vec<Vec<Tile>>,
    open_cells: Vec<Cell>,
    navigable: Vec<Cell>,
}

impl Maze {
    /// Builds a connected maze. Even dimensions are bumped to the next odd value.
    pub fn generate(
        rows: usize,
        cols: usize,
        loop_density: f32,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let (rows, cols) = normalize_dimensions(rows, cols)?;
        let mut grid = vec![vec![Tile::Blocked; cols]; rows];

        carve_spanning_tree(&mut grid, rng);
        let attempts = ((rows * cols) as f32 * loop_density).floor() as usize;
        let loops = add_loops(&mut grid, attempts, rng);
        let room = carve_room(&mut grid);
        let repaired = ensure_connected(&mut grid);

        let maze = Self::from_grid(grid);
        debug!(
            rows,
            cols,
            loops,
            room,
            repaired,
            open = maze.open_cells.len(),
            "maze generated"
        );
        Ok(maze)
    }

    /// Builds a maze from a fixed layout where `#` marks a blocked cell.
    pub fn parse(layout: &[&str]) -> Result<Self> {
        let rows = layout.len();
        let cols = layout.first().map(|line| line.chars().count()).unwrap_or(0);
        if rows < 3 || cols < 3 {
            return Err(ScreensaverError::InvalidConfig(format!(
                "maze layout must be at least 3x3, got {rows}x{cols}"
            )));
        }

        let mut grid = Vec::with_capacity(rows);
        for (row, line) in layout.iter().enumerate() {
            let tiles: Vec<Tile> = line
                .chars()
                .map(|ch| if ch == '#' { Tile::Blocked } else { Tile::Open })
                .collect();
            if tiles.len() != cols {
                return Err(ScreensaverError::InvalidConfig(format!(
                    "maze layout row {row} has {} cells, expected {cols}",
                    tiles.len()
                )));
            }
            grid.push(tiles);
        }

        let maze = Self::from_grid(grid);
        if maze.open_cells.iter().any(|cell| maze.on_border(*cell)) {
            return Err(ScreensaverError::InvalidConfig(
                "maze layout border must be blocked".into(),
            ));
        }
        if maze.open_cells.is_empty() {
            return Err(ScreensaverError::InvalidConfig(
                "maze layout has no open cells".into(),
            ));
        }
        Ok(maze)
    }

    fn from_grid(grid: Vec<Vec<Tile>>) -> Self {
        let rows = grid.len();
        let cols = grid[0].len();
        let mut maze = Self {
            rows,
            cols,
            grid,
            open_cells: Vec::new(),
            navigable: Vec::new(),
        };
        maze.open_cells = maze.collect_open_cells();
        maze.navigable = maze
            .open_cells
            .iter()
            .copied()
            .filter(|cell| !maze.neighbors(*cell).is_empty())
            .collect();
        maze
    }

    fn collect_open_cells(&self) -> Vec<Cell> {
        let mut cells = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if self.grid[row][col] == Tile::Open {
                    cells.push(Cell { row, col });
                }
            }
        }
        cells
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn tile(&self, cell: Cell) -> Tile {
        self.grid[cell.row][cell.col]
    }

    pub fn is_open(&self, row: isize, col: isize) -> bool {
        if row < 0 || col < 0 {
            return false;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.rows || col >= self.cols {
            return false;
        }
        self.grid[row][col] == Tile::Open
    }

    pub fn is_open_cell(&self, cell: Cell) -> bool {
        self.is_open(cell.row as isize, cell.col as isize)
    }

    /// The adjacent open cell in `dir`, if any.
    pub fn step(&self, cell: Cell, dir: Dir) -> Option<Cell> {
        let (dx, dy) = dir.delta();
        let row = cell.row as isize + dy;
        let col = cell.col as isize + dx;
        if self.is_open(row, col) {
            Some(Cell::new(row as usize, col as usize))
        } else {
            None
        }
    }

    pub fn neighbors(&self, cell: Cell) -> Vec<Dir> {
        Dir::ALL
            .into_iter()
            .filter(|dir| self.step(cell, *dir).is_some())
            .collect()
    }

    pub fn open_cells(&self) -> &[Cell] {
        &self.open_cells
    }

    /// Uniform over open cells with at least one open neighbour, so nothing spawns stranded.
    pub fn random_open_cell(&self, rng: &mut impl Rng) -> Cell {
        let pool = if self.navigable.is_empty() {
            &self.open_cells
        } else {
            &self.navigable
        };
        pool[rng.gen_range(0..pool.len())]
    }

    pub fn cell_key(&self, cell: Cell) -> CellKey {
        cell.row * self.cols + cell.col
    }

    fn on_border(&self, cell: Cell) -> bool {
        cell.row == 0 || cell.col == 0 || cell.row == self.rows - 1 || cell.col == self.cols - 1
    }

    pub fn reachable_from(&self, start: Cell) -> Vec<Vec<bool>> {
        flood(&self.grid, start)
    }

    pub fn is_connected(&self) -> bool {
        let Some(start) = self.open_cells.first() else {
            return true;
        };
        let reachable = self.reachable_from(*start);
        self.open_cells
            .iter()
            .all(|cell| reachable[cell.row][cell.col])
    }
}

fn normalize_dimensions(rows: usize, cols: usize) -> Result<(usize, usize)> {
    if rows < 2 || cols < 2 {
        return Err(ScreensaverError::InvalidDimensions { rows, cols });
    }
    let odd = |n: usize| if n % 2 == 0 { n + 1 } else { n };
    Ok((odd(rows), odd(cols)))
}

fn carve_spanning_tree(grid: &mut [Vec<Tile>], rng: &mut impl Rng) {
    let rows = grid.len() as isize;
    let cols = grid[0].len() as isize;
    grid[1][1] = Tile::Open;
    let mut stack = vec![(1isize, 1isize)];

    while let Some(&(row, col)) = stack.last() {
        let mut steps = CARVE_STEPS;
        steps.shuffle(rng);
        let next = steps.into_iter().find(|(dr, dc)| {
            let nr = row + dr;
            let nc = col + dc;
            nr > 0
                && nr < rows - 1
                && nc > 0
                && nc < cols - 1
                && grid[nr as usize][nc as usize] == Tile::Blocked
        });

        match next {
            Some((dr, dc)) => {
                let (nr, nc) = (row + dr, col + dc);
                grid[(row + dr / 2) as usize][(col + dc / 2) as usize] = Tile::Open;
                grid[nr as usize][nc as usize] = Tile::Open;
                stack.push((nr, nc));
            }
            None => {
                stack.pop();
            }
        }
    }
}

fn add_loops(grid: &mut [Vec<Tile>], attempts: usize, rng: &mut impl Rng) -> usize {
    let rows = grid.len();
    let cols = grid[0].len();
    let mut opened = 0;
    for _ in 0..attempts {
        let r = rng.gen_range(1..rows - 1);
        let c = rng.gen_range(1..cols - 1);
        if grid[r][c] != Tile::Blocked {
            continue;
        }
        let vertical = grid[r - 1][c] == Tile::Open && grid[r + 1][c] == Tile::Open;
        let horizontal = grid[r][c - 1] == Tile::Open && grid[r][c + 1] == Tile::Open;
        if vertical || horizontal {
            grid[r][c] = Tile::Open;
            opened += 1;
        }
    }
    opened
}

fn carve_room(grid: &mut [Vec<Tile>]) -> usize {
    let rows = grid.len();
    let cols = grid[0].len();
    let radius = (rows.min(cols) / 6) as isize;
    let center_row = (rows / 2) as isize;
    let center_col = (cols / 2) as isize;
    let mut carved = 0;

    for r in center_row - radius..=center_row + radius {
        for c in center_col - radius..=center_col + radius {
            if r <= 0 || c <= 0 || r >= rows as isize - 1 || c >= cols as isize - 1 {
                continue;
            }
            let dist = (((r - center_row).pow(2) + (c - center_col).pow(2)) as f32).sqrt();
            if dist <= radius as f32 && grid[r as usize][c as usize] == Tile::Blocked {
                grid[r as usize][c as usize] = Tile::Open;
                carved += 1;
            }
        }
    }
    carved
}

/// Opens walls between the reachable region and any stray open cells until everything joins up.
fn ensure_connected(grid: &mut [Vec<Tile>]) -> usize {
    let rows = grid.len();
    let cols = grid[0].len();
    let start = Cell::new(1, 1);
    let mut reachable = flood(grid, start);
    let mut carved = 0;

    while has_unreachable(grid, &reachable) && carved < rows * cols {
        let mut bridge = None;
        'search: for y in 1..rows - 1 {
            for x in 1..cols - 1 {
                if grid[y][x] != Tile::Blocked {
                    continue;
                }
                let mut has_reach = false;
                let mut has_unreach = false;
                for (dx, dy) in [(0isize, -1isize), (0, 1), (-1, 0), (1, 0)] {
                    let nx = (x as isize + dx) as usize;
                    let ny = (y as isize + dy) as usize;
                    if grid[ny][nx] != Tile::Open {
                        continue;
                    }
                    if reachable[ny][nx] {
                        has_reach = true;
                    } else {
                        has_unreach = true;
                    }
                }
                if has_reach && has_unreach {
                    bridge = Some((y, x));
                    break 'search;
                }
            }
        }

        match bridge {
            Some((y, x)) => {
                grid[y][x] = Tile::Open;
                carved += 1;
            }
            None => carved += carve_corridor_to_nearest(grid, &reachable),
        }
        reachable = flood(grid, start);
    }
    carved
}

/// Digs an L-shaped corridor from the closest stray open cell to the reachable region.
fn carve_corridor_to_nearest(grid: &mut [Vec<Tile>], reachable: &[Vec<bool>]) -> usize {
    let mut reached = Vec::new();
    let mut stray = Vec::new();
    for (y, row) in grid.iter().enumerate() {
        for (x, tile) in row.iter().enumerate() {
            if *tile != Tile::Open {
                continue;
            }
            if reachable[y][x] {
                reached.push(Cell::new(y, x));
            } else {
                stray.push(Cell::new(y, x));
            }
        }
    }

    let best = stray
        .iter()
        .flat_map(|s| reached.iter().map(move |r| (*s, *r)))
        .min_by_key(|(s, r)| s.row.abs_diff(r.row) + s.col.abs_diff(r.col));
    let Some((from, to)) = best else {
        return 0;
    };

    let mut carved = 0;
    let mut cursor = from;
    while cursor.col != to.col {
        cursor.col = if to.col > cursor.col { cursor.col + 1 } else { cursor.col - 1 };
        if grid[cursor.row][cursor.col] == Tile::Blocked {
            grid[cursor.row][cursor.col] = Tile::Open;
            carved += 1;
        }
    }
    while cursor.row != to.row {
        cursor.row = if to.row > cursor.row { cursor.row + 1 } else { cursor.row - 1 };
        if grid[cursor.row][cursor.col] == Tile::Blocked {
            grid[cursor.row][cursor.col] = Tile::Open;
            carved += 1;
        }
    }
    carved
}

fn has_unreachable(grid: &[Vec<Tile>], reachable: &[Vec<bool>]) -> bool {
    grid.iter().enumerate().any(|(y, row)| {
        row.iter()
            .enumerate()
            .any(|(x, tile)| *tile == Tile::Open && !reachable[y][x])
    })
}

fn flood(grid: &[Vec<Tile>], start: Cell) -> Vec<Vec<bool>> {
    let rows = grid.len();
    let cols = grid[0].len();
    let mut seen = vec![vec![false; cols]; rows];
    if grid[start.row][start.col] != Tile::Open {
        return seen;
    }
    let mut q = VecDeque::new();
    seen[start.row][start.col] = true;
    q.push_back(start);
    while let Some(pos) = q.pop_front() {
        for (dx, dy) in [(0isize, -1isize), (0, 1), (-1, 0), (1, 0)] {
            let nx = pos.col as isize + dx;
            let ny = pos.row as isize + dy;
            if nx < 0 || ny < 0 || nx >= cols as isize || ny >= rows as isize {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if seen[ny][nx] || grid[ny][nx] != Tile::Open {
                continue;
            }
            seen[ny][nx] = true;
            q.push_back(Cell::new(ny, nx));
        }
    }
    seen
}
