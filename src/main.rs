mod config;
mod core;
mod data;
mod error;
mod forces;
mod layout;
mod render;
mod scale;
mod spatial;
mod types;
mod ui;

use std::{fs::File, path::PathBuf, str::FromStr};

use clap::{Parser, ValueEnum};
use log::{LevelFilter, debug, info, warn};

use crate::{
    config::Settings,
    core::{Simulation, store::EntityStore},
    data::ContinentNames,
    layout::{LayoutController, ModeEvent},
    types::{FillMode, LayoutMode, Vec2},
};

/// Population bubble chart in the terminal.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Country list (JSON array)
    #[arg(long, default_value = config::DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Continent code to name mapping (JSON object)
    #[arg(long, default_value = config::DEFAULT_CONTINENTS_PATH)]
    continents: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the seed used to scatter initial positions
    #[arg(long)]
    seed: Option<u64>,

    /// Layout selected at startup
    #[arg(long, value_enum, default_value_t = LayoutArg::Combine)]
    layout: LayoutArg,

    /// Fill mode selected at startup
    #[arg(long, value_enum, default_value_t = FillArg::Solid)]
    fill: FillArg,

    /// Run without a terminal UI and print final positions as JSON
    #[arg(long)]
    headless: bool,

    /// Tick limit for headless runs
    #[arg(long, default_value_t = 2_000)]
    ticks: u64,

    /// Write logs to this file (the TUI owns stderr otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    Combine,
    Geographic,
    Continents,
    Population,
}

impl From<LayoutArg> for LayoutMode {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Combine => LayoutMode::Combine,
            LayoutArg::Geographic => LayoutMode::Geographic,
            LayoutArg::Continents => LayoutMode::Categorical,
            LayoutArg::Population => LayoutMode::PopulationScatter,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FillArg {
    Solid,
    Texture,
}

impl From<FillArg> for FillMode {
    fn from(arg: FillArg) -> Self {
        match arg {
            FillArg::Solid => FillMode::Solid,
            FillArg::Texture => FillMode::Texture,
        }
    }
}

fn init_logging(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let requested = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", args.log_level);
        LevelFilter::Warn
    });

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    match (&args.log_file, args.headless) {
        (Some(path), _) => {
            let file = File::create(path)?;
            builder
                .target(env_logger::Target::Pipe(Box::new(file)))
                .filter_level(requested);
        }
        (None, true) => {
            builder.filter_level(requested);
        }
        // Anything on stderr would scribble over the alternate screen.
        (None, false) => {
            builder.filter_level(LevelFilter::Off);
        }
    }
    builder.init();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args)?;
    debug!("{args:?}");

    let mut settings = Settings::load_or_default(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        settings.simulation.seed = seed;
    }

    let inputs = data::load_countries(&args.data)?;
    let names = data::load_continent_names(&args.continents).unwrap_or_else(|err| {
        warn!("{err}; showing continent codes instead of names");
        ContinentNames::default()
    });
    let store = EntityStore::build(inputs, &settings.circles)?;
    info!(
        "{} countries in {} continents, radii up to {:.1}",
        store.len(),
        store.categories().len(),
        store.max_radius()
    );

    let sim = Simulation::new(store, &settings);
    let mut controller = LayoutController::new(sim.mode(), FillMode::default());
    controller.push(ModeEvent::Layout(args.layout.into()));
    controller.push(ModeEvent::Fill(args.fill.into()));

    let app = ui::App {
        sim,
        controller,
        names,
        canvas: Vec2::new(settings.canvas.width, settings.canvas.height),
    };

    if args.headless {
        println!("{}", ui::run_headless(app, args.ticks)?);
        Ok(())
    } else {
        ui::run(app)
    }
}
