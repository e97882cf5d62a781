//! Property tests for maze generation and grid movement

use maze_screensaver::maze::{Maze, Tile, DEFAULT_LOOP_DENSITY};
use maze_screensaver::mover::{GridMover, TurnPolicy};
use maze_screensaver::Cell;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn odd(n: usize) -> usize {
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

fn adjacent(a: Cell, b: Cell) -> bool {
    a.row.abs_diff(b.row) + a.col.abs_diff(b.col) == 1
}

proptest! {
    #[test]
    fn generated_mazes_are_connected_and_walled(
        seed in any::<u64>(),
        rows in 2usize..40,
        cols in 2usize..40,
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let maze = Maze::generate(rows, cols, DEFAULT_LOOP_DENSITY, &mut rng).unwrap();

        prop_assert_eq!(maze.rows(), odd(rows));
        prop_assert_eq!(maze.cols(), odd(cols));
        prop_assert!(!maze.open_cells().is_empty());
        prop_assert!(maze.is_connected());

        for row in 0..maze.rows() {
            for col in 0..maze.cols() {
                let on_border = row == 0 || col == 0 || row == maze.rows() - 1 || col == maze.cols() - 1;
                if on_border {
                    prop_assert_eq!(maze.tile(Cell::new(row, col)), Tile::Blocked);
                }
            }
        }

        for _ in 0..20 {
            prop_assert!(maze.is_open_cell(maze.random_open_cell(&mut rng)));
        }
    }

    #[test]
    fn movers_only_walk_open_edges(
        seed in any::<u64>(),
        deltas in prop::collection::vec(0.0f32..0.05, 1..300),
        speed in 0.5f32..12.0,
        wander in any::<bool>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let maze = Maze::generate(15, 21, DEFAULT_LOOP_DENSITY, &mut rng).unwrap();
        let policy = if wander { TurnPolicy::Wander } else { TurnPolicy::NoReverse };
        let start = maze.random_open_cell(&mut rng);
        let mut mover = GridMover::new(start, speed, policy, &maze, &mut rng);

        for delta in deltas {
            let mut previous = mover.current();
            mover.advance(delta, &maze, &mut rng, |cell| {
                assert!(adjacent(previous, cell), "{previous:?} -> {cell:?} is not one step");
                previous = cell;
            });
            prop_assert!(maze.is_open_cell(mover.current()));
            prop_assert!(maze.is_open_cell(mover.target()));
            prop_assert!(adjacent(mover.current(), mover.target()));
            prop_assert!((0.0..1.0).contains(&mover.progress()));
        }
    }
}
