use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use simulation::{App, CrashReason, Flight, FlightOutcome, Scenario, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Evolves thrust programs that land a lander on the flat pad of a terrain.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Simulation json (lander and terrain), defaults to the built-in plateau
    #[arg(long, value_name = "FILE")]
    sim: Option<PathBuf>,

    /// Solver settings json, defaults to the built-in settings
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Overrides the seed of the settings
    #[arg(long)]
    seed: Option<u64>,

    /// Maximal number of generations to breed
    #[arg(long, short, default_value_t = 1000)]
    max_generations: usize,

    /// Writes the routes of the last generation as json
    #[arg(long, value_name = "FILE")]
    trajectories: Option<PathBuf>,
}

#[derive(Serialize)]
struct Telemetry {
    vx: f64,
    vy: f64,
    fuel: i32,
    angle: i32,
    power: i32,
}

#[derive(Serialize)]
enum FlightState {
    Flying,
    LandedCorrectly,
    OutOfMap,
    CrashedWrongTerrain,
    CrashedNotVertical,
    CrashedTooFastHorizontal,
    CrashedTooFastVertical,
    OutOfFuel,
}

impl From<FlightOutcome> for FlightState {
    fn from(value: FlightOutcome) -> Self {
        match value {
            FlightOutcome::Incomplete => Self::Flying,
            FlightOutcome::Landed => Self::LandedCorrectly,
            FlightOutcome::Crashed(reason) => match reason {
                CrashReason::OutOfMap => Self::OutOfMap,
                CrashReason::WrongTerrain => Self::CrashedWrongTerrain,
                CrashReason::NotVertical => Self::CrashedNotVertical,
                CrashReason::TooFastHorizontal => Self::CrashedTooFastHorizontal,
                CrashReason::TooFastVertical => Self::CrashedTooFastVertical,
                CrashReason::OutOfFuel => Self::OutOfFuel,
            },
        }
    }
}

#[derive(Serialize)]
struct Route {
    telemetry: Vec<Telemetry>,
    positions: Vec<(f64, f64)>,
    flight_state: FlightState,
    fitness: f64,
}

impl From<&Flight> for Route {
    fn from(flight: &Flight) -> Self {
        let states = flight.trajectory.states();
        Route {
            positions: states
                .iter()
                .map(|s| (s.position().x, s.position().y))
                .collect(),
            telemetry: states
                .iter()
                .map(|s| Telemetry {
                    vx: s.h_speed(),
                    vy: s.v_speed(),
                    fuel: s.fuel,
                    angle: s.angle,
                    power: s.power,
                })
                .collect(),
            flight_state: flight.outcome.into(),
            fitness: flight.fitness,
        }
    }
}

fn build_app(cli: &Cli) -> anyhow::Result<App> {
    let scenario = match &cli.sim {
        Some(path) => simulation::init::json::parse_sim(path)
            .with_context(|| format!("Loading simulation {}", path.display()))?,
        None => Scenario::default(),
    };
    let mut settings = match &cli.settings {
        Some(path) => simulation::init::json::parse_settings(path)
            .with_context(|| format!("Loading settings {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    info!(?settings, "Starting evolution");
    Ok(App::try_new(scenario, settings)?)
}

fn write_trajectories(app: &App, path: &Path) -> anyhow::Result<()> {
    let routes = app
        .get_population()
        .flights()
        .iter()
        .map(Route::from)
        .collect::<Vec<_>>();
    let file = File::create(path).with_context(|| format!("Creating {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), &routes)?;
    info!(path = %path.display(), routes = routes.len(), "Trajectories written");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let mut app = build_app(&cli)?;

    let now = std::time::Instant::now();
    let mut generations_left = cli.max_generations;
    while !app.is_solved() && generations_left > 0 {
        app.next_population()?;
        info!("{}", app.get_population());
        generations_left -= 1;
    }
    let elapsed = now.elapsed();

    match app.get_population().landed() {
        Some((chromosome, flight)) => {
            info!(generation = app.get_population_id(), ?elapsed, "Landed");
            println!("{chromosome}");
            println!("{}", flight.trajectory.pretty_to_string());
        }
        None => info!(
            generations = cli.max_generations,
            ?elapsed,
            "No landing found"
        ),
    }

    if let Some(path) = &cli.trajectories {
        write_trajectories(&app, path)?;
    }
    Ok(())
}
