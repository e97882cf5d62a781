//! Long seeded runs of the whole screensaver

use maze_screensaver::{Config, GridEntity, Screensaver, SimulationConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const FRAME: f32 = 1.0 / 60.0;

fn run(seed: u64, config: &SimulationConfig, frames: usize) -> Screensaver {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut saver = Screensaver::new(config, &mut rng).unwrap();
    for _ in 0..frames {
        saver.update(FRAME, &mut rng);
        saver.drain_events();
    }
    saver
}

#[test]
fn test_hunter_and_prey_stay_on_open_cells() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut saver = Screensaver::new(&SimulationConfig::default(), &mut rng).unwrap();

    for _ in 0..6000 {
        let before = saver.hunter().mover().current();
        let target = saver.hunter().mover().target();
        saver.update(FRAME, &mut rng);

        let maze = saver.maze();
        let mover = saver.hunter().mover();
        // at most one commit per frame at this speed
        assert!(mover.current() == before || mover.current() == target);
        assert!(maze.is_open_cell(mover.current()));
        assert!(maze.is_open_cell(mover.target()));
        assert_eq!(
            mover.current().row.abs_diff(mover.target().row)
                + mover.current().col.abs_diff(mover.target().col),
            1
        );
        for prey in saver.prey() {
            assert!(maze.is_open_cell(prey.cell()));
        }
    }
}

#[test]
fn test_eaten_prey_return_inside_the_respawn_window() {
    let config = SimulationConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let mut saver = Screensaver::new(&config, &mut rng).unwrap();
    let mut pending: Vec<Option<f64>> = vec![None; saver.prey().len()];
    let mut returned = 0;

    for _ in 0..12_000 {
        saver.update(FRAME, &mut rng);
        let now = saver.elapsed();
        for (slot, prey) in pending.iter_mut().zip(saver.prey()) {
            match (*slot, prey.respawn_at()) {
                (None, Some(at)) => {
                    let wait = at - now;
                    assert!(wait >= f64::from(config.respawn_min) - 1e-3, "wait {wait}");
                    assert!(wait < f64::from(config.respawn_max) + 1e-3, "wait {wait}");
                    *slot = Some(at);
                }
                (Some(at), None) => {
                    assert!(now >= at, "respawned at {now}, due {at}");
                    returned += 1;
                    *slot = None;
                }
                (Some(at), Some(again)) => assert_eq!(at, again),
                (None, None) => {}
            }
        }
    }

    assert!(returned > 0);
    assert_eq!(saver.stats().respawns, returned);
}

#[test]
fn test_captures_are_reported_once_each() {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let mut saver = Screensaver::new(&SimulationConfig::default(), &mut rng).unwrap();
    let mut events = 0u64;
    for _ in 0..6000 {
        let active = saver.active_prey();
        saver.update(FRAME, &mut rng);
        let drained = saver.drain_events();
        assert!(drained.len() <= active);
        events += drained.len() as u64;
    }
    assert_eq!(events, saver.stats().captures);
    assert!(events > 0);
}

#[test]
fn test_same_seed_same_run() {
    let config = SimulationConfig::default();
    let a = run(99, &config, 3000);
    let b = run(99, &config, 3000);
    assert_eq!(a.stats(), b.stats());
    assert_eq!(a.hunter().cell(), b.hunter().cell());
    let cells_a: Vec<_> = a.prey().iter().map(|p| p.cell()).collect();
    let cells_b: Vec<_> = b.prey().iter().map(|p| p.cell()).collect();
    assert_eq!(cells_a, cells_b);
}

#[test]
fn test_wandering_prey_in_a_toml_configured_world() {
    let config = Config::from_toml(
        r#"
        seed = 7

        [simulation]
        rows = 12
        cols = 30
        prey_count = 6
        prey_speed = 1.5
        "#,
    )
    .unwrap();
    config.validate().unwrap();
    assert_eq!(config.seed, Some(7));

    let saver = run(7, &config.simulation, 4000);
    assert_eq!((saver.maze().rows(), saver.maze().cols()), (13, 31));
    assert_eq!(saver.prey().len(), 6);
    assert_eq!(saver.stats().frames, 4000);
    for prey in saver.prey() {
        assert!(saver.maze().is_open_cell(prey.cell()));
    }
}
