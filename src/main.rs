use std::fs::File;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use maze_screensaver::effects::Effects;
use maze_screensaver::frame_loop::FrameLoop;
use maze_screensaver::refresh::{setup_auto_refresh, IntervalTimers, ReloadSignal};
use maze_screensaver::render::{Renderer, CELL_W};
use maze_screensaver::{Config, Result, Screensaver};

const DEFAULT_LOG_FILTER: &str = "maze_screensaver=info,mazesaver=info";

/// Maze screensaver: a hunter roams a generated maze and eats the bugs living in it
#[derive(Parser, Debug)]
#[command(name = "mazesaver")]
struct Args {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Maze rows (even values are bumped to odd)
    #[arg(long)]
    rows: Option<usize>,

    /// Maze columns (even values are bumped to odd)
    #[arg(long)]
    cols: Option<usize>,

    /// Number of prey
    #[arg(long)]
    prey: Option<usize>,

    /// Frames per second
    #[arg(long)]
    fps: Option<u64>,

    /// Rebuild the screensaver every N seconds
    #[arg(long)]
    refresh_secs: Option<u64>,

    /// Never rebuild the screensaver
    #[arg(long, conflicts_with = "refresh_secs")]
    no_refresh: bool,

    /// Run without a terminal and print a JSON report
    #[arg(long)]
    headless: bool,

    /// Frames to simulate in headless mode
    #[arg(long, default_value_t = 3600)]
    frames: u64,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Serialize)]
struct HeadlessReport {
    seed: u64,
    frames: u64,
    elapsed: f64,
    captures: u64,
    respawns: u64,
    open_cells: usize,
    active_prey: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref(), args.headless)?;

    let config = build_config(&args)?;
    let seed = config.seed.unwrap_or_else(rand::random);
    info!(seed, headless = args.headless, "mazesaver starting");

    if args.headless {
        return run_headless(&config, seed, args.frames);
    }

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &config, seed);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn init_tracing(log_file: Option<&Path>, headless: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(File::create(path)?))
            .init(),
        None if headless => builder.with_writer(io::stderr).init(),
        // stderr would tear the alternate screen
        None => builder.with_writer(io::sink).init(),
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(rows) = args.rows {
        config.simulation.rows = rows;
    }
    if let Some(cols) = args.cols {
        config.simulation.cols = cols;
    }
    if let Some(prey) = args.prey {
        config.simulation.prey_count = prey;
    }
    if let Some(fps) = args.fps {
        config.display.fps = fps;
    }
    if let Some(secs) = args.refresh_secs {
        config.display.auto_refresh_secs = Some(secs);
    }
    if args.no_refresh {
        config.display.auto_refresh_secs = None;
    }
    config.validate()?;
    Ok(config)
}

fn run_headless(config: &Config, seed: u64, frames: u64) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut saver = Screensaver::new(&config.simulation, &mut rng)?;
    let delta = 1.0 / config.display.fps as f32;
    for _ in 0..frames {
        saver.update(delta, &mut rng);
        saver.drain_events();
    }

    let stats = saver.stats();
    let report = HeadlessReport {
        seed,
        frames: stats.frames,
        elapsed: saver.elapsed(),
        captures: stats.captures,
        respawns: stats.respawns,
        open_cells: saver.maze().open_cells().len(),
        active_prey: saver.active_prey(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run(stdout: &mut Stdout, config: &Config, seed: u64) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut saver = Screensaver::new(&config.simulation, &mut rng)?;
    let mut effects = Effects::new(config.display.particle_count, &mut rng);
    let mut renderer = Renderer::new(saver.maze().cols(), saver.maze().rows());
    let mut term_size = terminal::size()?;
    fit_viewport(&mut saver, &mut effects, term_size, &mut rng);

    let signal = ReloadSignal::new();
    let mut timers = IntervalTimers::new();
    if let Some(secs) = config.display.auto_refresh_secs {
        setup_auto_refresh(&signal.handle(), Duration::from_secs(secs), &mut timers)?;
    }

    let frame_time = Duration::from_micros(1_000_000 / config.display.fps.max(1));
    let started = Instant::now();
    let mut frames = FrameLoop::new();
    frames.start(started);

    while let Some(delta) = frames.begin_frame(Instant::now()) {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if is_quit(key.code, key.modifiers) {
                        frames.stop();
                    }
                }
                Event::Resize(w, h) => {
                    term_size = (w, h);
                    fit_viewport(&mut saver, &mut effects, term_size, &mut rng);
                    renderer.invalidate(saver.maze().cols(), saver.maze().rows());
                }
                _ => {}
            }
        }

        timers.fire_due(started.elapsed());
        if signal.take() {
            info!("auto refresh, rebuilding screensaver");
            saver = Screensaver::new(&config.simulation, &mut rng)?;
            effects = Effects::new(config.display.particle_count, &mut rng);
            fit_viewport(&mut saver, &mut effects, term_size, &mut rng);
            renderer.invalidate(saver.maze().cols(), saver.maze().rows());
        }

        saver.update(delta, &mut rng);
        let events = saver.drain_events();
        effects.absorb(&events, saver.tile_size(), &mut rng);
        effects.update(delta.min(config.simulation.max_delta), &mut rng);
        renderer.draw(stdout, &saver, &effects, term_size)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
    Ok(())
}

/// One maze cell per terminal row; the HUD takes the rows above and below.
/// Particles cover the maze itself, in the same world units as the simulation.
fn fit_viewport(
    saver: &mut Screensaver,
    effects: &mut Effects,
    (term_w, term_h): (u16, u16),
    rng: &mut ChaCha8Rng,
) {
    let width = (term_w as usize / CELL_W).max(1) as f32;
    let height = (term_h.saturating_sub(2)).max(1) as f32;
    saver.resize(width, height);

    let tile = saver.tile_size();
    let maze_w = saver.maze().cols() as f32 * tile;
    let maze_h = saver.maze().rows() as f32 * tile;
    effects.resize(maze_w, maze_h, tile, rng);
}

fn is_quit(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
