use anyhow::Context;
use clap::{Parser, Subcommand};
use lsystem_engine::config::{AppConfig, ConfigManager};
use lsystem_engine::engines::stepping::{ConsoleStepObserver, StepObserver, SystemBuilder};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lsystem-engine", version, about = "Parametric L-system rewriting")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Step the system described by a TOML config
    Run {
        config: PathBuf,
        /// Override `system.iterations`
        #[arg(long)]
        steps: Option<usize>,
        /// Override `system.seed`
        #[arg(long)]
        seed: Option<u64>,
        /// Print every generation instead of only the last
        #[arg(long)]
        all: bool,
        /// Report step progress on stdout
        #[arg(long)]
        progress: bool,
    },
    /// Write a default config file
    Init { path: PathBuf },
    /// Print the config manifests as JSON
    Manifest,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            steps,
            seed,
            all,
            progress,
        } => {
            let manager = ConfigManager::new();
            manager
                .load_layered(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            run(&manager.get(), steps, seed, all, progress)
        }
        Command::Init { path } => {
            ConfigManager::new()
                .save_to_file(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote default config to {}", path.display());
            Ok(())
        }
        Command::Manifest => {
            let manifests = AppConfig::default().manifests();
            println!("{}", serde_json::to_string_pretty(&manifests)?);
            Ok(())
        }
    }
}

fn run(
    config: &AppConfig,
    steps: Option<usize>,
    seed: Option<u64>,
    all: bool,
    progress: bool,
) -> anyhow::Result<()> {
    let mut compiled = SystemBuilder::from_config(config)
        .build()
        .context("compiling rules")?;
    let globals = config.system.global_values();
    let steps = steps.unwrap_or(config.system.iterations);
    let seed = seed.unwrap_or(config.system.seed);

    let mut state = compiled.reset(&config.system.axiom, seed)?;
    log::info!(
        "Running {} steps from a {} symbol axiom with seed {}",
        steps,
        state.len(),
        seed
    );

    let mut console = ConsoleStepObserver;
    let mut silent = ();
    let observer: &mut dyn StepObserver = if progress { &mut console } else { &mut silent };

    if all {
        println!("{}", compiled.display(state.symbols()));
    }
    for _ in 0..steps {
        state = compiled
            .system
            .step_with(&state, &globals, observer, None)?;
        if all {
            println!("{}", compiled.display(state.symbols()));
        }
    }
    if !all {
        println!("{}", compiled.display(state.symbols()));
    }
    Ok(())
}
