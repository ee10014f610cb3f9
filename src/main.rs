//! Vismotor CLI - visuomotor map training
//!
//! Trains a gaze-indexed field of ring SOMs from recorded samples and
//! inspects the neighborhood kernel and configuration.

use clap::{Parser, Subcommand};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use log::{error, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;
use vismotor::field::read_samples;
use vismotor::{Config, NeighborhoodTable, Result, VisuomotorField};

#[derive(Parser)]
#[command(name = "vismotor")]
#[command(author = "Vismotor Contributors")]
#[command(version)]
#[command(about = "Visuomotor map learning with ring SOMs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a visual field from recorded gaze/posture samples
    Train {
        /// Sample file (az el ver j0 .. jN per line)
        #[arg(short, long)]
        samples: PathBuf,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Also train adjacent cells with this step multiplier
        #[arg(long)]
        spread: Option<f64>,

        /// Print learned weights of every trained cell
        #[arg(short, long)]
        dump: bool,
    },

    /// Print neighborhood weights by ring distance
    Neighborhood {
        /// Ring size
        #[arg(short = 'k', long, default_value = "10")]
        neurons: usize,

        /// Use the table with a repulsive lobe at distance 2
        #[arg(long)]
        repulsive: bool,
    },

    /// Print the default configuration as JSON
    Config,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let result = match cli.command {
        Commands::Train {
            samples,
            config,
            seed,
            spread,
            dump,
        } => train_field(samples, config, seed, spread, dump),

        Commands::Neighborhood { neurons, repulsive } => show_neighborhood(neurons, repulsive),

        Commands::Config => show_config(),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn train_field(
    samples_path: PathBuf,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
    spread: Option<f64>,
    dump: bool,
) -> Result<()> {
    let start_time = Instant::now();

    let mut config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if seed.is_some() {
        config.som.seed = seed;
    }
    if spread.is_some() {
        config.field.neighbor_spread = spread;
    }

    let file = File::open(&samples_path)?;
    let samples = read_samples(BufReader::new(file), config.som.input_dim)?;
    println!("Loaded {} samples from {}", samples.len(), samples_path.display());

    let mut field = VisuomotorField::new(&config)?;
    let [az, el, ver] = field.shape();
    println!(
        "Field: {}x{}x{} cells, {} neurons x {} joints each",
        az, el, ver, config.som.neurons, config.som.input_dim
    );

    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
        .unwrap()
        .progress_chars("█▓▒░  ");
    let pb = ProgressBar::new(samples.len() as u64);
    pb.set_style(bar_style);

    let mut used = 0usize;
    let mut skipped = 0usize;
    for sample in &samples {
        match field.train(&sample.gaze, &sample.posture)? {
            Some(_) => used += 1,
            None => {
                warn!("Sample gaze {:?} outside visual field", sample.gaze);
                skipped += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!("Trained on {} samples ({} outside the field)", used, skipped);
    println!("Cells trained: {}", field.trained_cells().count());
    println!("Final step size: {:.5}", field.current_step());

    if dump {
        for (cell, som, hits) in field.trained_cells() {
            println!("cell {} ({} samples)", cell, hits);
            for k in 0..som.neurons() {
                let row = som
                    .weights_of(k)
                    .map(|w| {
                        w.iter()
                            .map(|v| format!("{:.3}", v))
                            .collect::<Vec<_>>()
                            .join(" ")
                    })
                    .unwrap_or_default();
                println!("  {}: {}", k, row);
            }
        }
    }

    println!("Done in {}", HumanDuration(start_time.elapsed()));
    Ok(())
}

fn show_neighborhood(neurons: usize, repulsive: bool) -> Result<()> {
    let table = if repulsive {
        NeighborhoodTable::repulsive()
    } else {
        NeighborhoodTable::corrected()
    };
    let profile = table.profile(neurons)?;

    println!("Ring of {} neurons", neurons);
    println!("{:>8}  {:>8}", "distance", "weight");
    for (distance, weight) in profile {
        println!("{:>8}  {:>8.3}", distance, weight);
    }
    Ok(())
}

fn show_config() -> Result<()> {
    println!("{}", Config::default().to_json_pretty()?);
    Ok(())
}
