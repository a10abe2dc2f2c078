//! Command-line front end.
//!
//! `tsp-ga run` solves one instance with one seed, `tsp-ga scenario` repeats
//! the run over several seeds and writes a summary, `tsp-ga generate` writes a
//! synthetic instance and `tsp-ga exact` enumerates the optimum of a tiny one.

use crate::error::Result;
use crate::exact::{brute_force, MAX_BRUTE_FORCE_CITIES};
use crate::ga::{CrossoverKind, GaConfig, GaRunner, MutationKind};
use crate::instance::{self, CitySet, InstanceFormat, Shape};
use crate::metrics::percent_error;
use crate::report::{write_result_json, write_summary_csv, SummaryRow};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "tsp-ga")]
#[command(author, version, about = "Genetic algorithm benchmark for the Euclidean TSP")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the GA once and write the result record as JSON
    Run {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        ga: GaArgs,

        /// Output JSON path
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
    /// Run the GA for several seeds and write one JSON per seed plus summary.csv
    Scenario {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        ga: GaArgs,

        /// Instance name used in file names and the summary
        #[arg(long)]
        name: String,

        /// Seeds to run
        #[arg(long, num_args = 1.., required = true)]
        seeds: Vec<u64>,

        /// Known optimum for percent error
        #[arg(long)]
        optimum: Option<f64>,

        /// Compute the optimum by enumeration when the instance is small enough
        #[arg(long)]
        exact: bool,

        /// Directory for results, defaults to results/<name>
        #[arg(long, value_name = "DIR")]
        results_dir: Option<PathBuf>,
    },
    /// Generate a synthetic instance as an id,x,y CSV
    Generate {
        /// Number of cities
        #[arg(long)]
        n: usize,

        #[arg(long)]
        seed: u64,

        /// uniform, islands or ring_clusters
        #[arg(long)]
        shape: Shape,

        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
    /// Print the exact optimum of a small instance
    Exact {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Instance file (TSPLIB .tsp or CSV with x,y columns)
    #[arg(long, value_name = "FILE")]
    pub data: PathBuf,

    /// Force the file format instead of guessing from the extension
    #[arg(long)]
    pub format: Option<InstanceFormat>,
}

impl InputArgs {
    fn load(&self) -> Result<CitySet> {
        let cities = instance::load(&self.data, self.format)?;
        info!(path = %self.data.display(), cities = cities.len(), "instance loaded");
        Ok(cities)
    }
}

/// GA parameters; unset values fall back to the subcommand's preset.
#[derive(Args, Debug, Default)]
pub struct GaArgs {
    /// Population size
    #[arg(long = "pop")]
    pub population_size: Option<usize>,

    /// Number of generations
    #[arg(long)]
    pub max_iter: Option<usize>,

    /// OX or PMX
    #[arg(long)]
    pub crossover: Option<CrossoverKind>,

    /// Initial mutation probability
    #[arg(long)]
    pub pmut: Option<f64>,

    /// Elite fraction in [0, 1)
    #[arg(long)]
    pub elitism: Option<f64>,

    /// inversion or swap
    #[arg(long)]
    pub mutation: Option<MutationKind>,

    /// Tournament size
    #[arg(long)]
    pub tournament_k: Option<usize>,

    /// Seed (`run` only; `scenario` uses --seeds)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Evaluate tour lengths on a single thread
    #[arg(long)]
    pub sequential: bool,
}

impl GaArgs {
    pub fn apply(&self, mut config: GaConfig) -> GaConfig {
        if let Some(v) = self.population_size {
            config.population_size = v;
        }
        if let Some(v) = self.max_iter {
            config.max_iterations = v;
        }
        if let Some(v) = self.crossover {
            config.crossover = v;
        }
        if let Some(v) = self.pmut {
            config.mutation_rate = v;
        }
        if let Some(v) = self.elitism {
            config.elite_ratio = v;
        }
        if let Some(v) = self.mutation {
            config.mutation = v;
        }
        if let Some(v) = self.tournament_k {
            config.tournament_size = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if self.sequential {
            config.parallel = false;
        }
        config
    }
}

/// Executes a parsed command line.
pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run { input, ga, out } => {
            let cities = input.load()?;
            let config = ga.apply(GaConfig::default());
            let result = GaRunner::run(&cities, &config)?;
            write_result_json(&result, &out)?;
            println!(
                "best {:.4} after {} generations in {:.3}s -> {}",
                result.best.cost,
                result.generations,
                result.time_s,
                out.display()
            );
        }
        Command::Scenario {
            input,
            ga,
            name,
            seeds,
            optimum,
            exact,
            results_dir,
        } => {
            let cities = input.load()?;
            let dir = results_dir.unwrap_or_else(|| Path::new("results").join(&name));
            let optimum = match optimum {
                Some(v) => Some(v),
                None if exact => exact_optimum(&cities)?,
                None => None,
            };
            run_scenario(&cities, &ga.apply(GaConfig::scenario()), &name, &seeds, optimum, &dir)?;
        }
        Command::Generate { n, seed, shape, out } => {
            let cities = instance::generate(n, seed, shape)?;
            instance::write_csv(&cities, &out)?;
            println!("wrote {} {shape} cities to {}", cities.len(), out.display());
        }
        Command::Exact { input } => {
            let cities = input.load()?;
            let sol = brute_force(&cities)?;
            println!("optimum {:.6}", sol.objective);
            println!("tour {:?}", sol.tour);
        }
    }
    Ok(())
}

/// Enumerated optimum, or `None` when the instance is too large to enumerate.
fn exact_optimum(cities: &CitySet) -> Result<Option<f64>> {
    if cities.len() > MAX_BRUTE_FORCE_CITIES {
        warn!(
            cities = cities.len(),
            limit = MAX_BRUTE_FORCE_CITIES,
            "instance too large for enumeration, no optimum"
        );
        return Ok(None);
    }
    Ok(Some(brute_force(cities)?.objective))
}

/// Runs one GA per seed, writing `ga_seed{seed}.json` files and
/// `summary.csv` into `dir`. Returns the summary rows.
pub fn run_scenario(
    cities: &CitySet,
    base: &GaConfig,
    name: &str,
    seeds: &[u64],
    optimum: Option<f64>,
    dir: &Path,
) -> Result<Vec<SummaryRow>> {
    std::fs::create_dir_all(dir)?;
    let mut rows = Vec::with_capacity(seeds.len());

    for &seed in seeds {
        info!(instance = name, seed, "running GA");
        let config = base.clone().with_seed(seed);
        let result = GaRunner::run(cities, &config)?;

        let json_path = dir.join(format!("ga_seed{seed}.json"));
        write_result_json(&result, &json_path)?;

        let row = SummaryRow::from_result(name, &result, &json_path.display().to_string(), optimum);
        match optimum {
            Some(opt) => info!(
                seed,
                best = result.best.cost,
                pct_error = percent_error(result.best.cost, opt),
                "seed done"
            ),
            None => info!(seed, best = result.best.cost, "seed done"),
        }
        rows.push(row);
    }

    let summary = dir.join("summary.csv");
    write_summary_csv(&rows, &summary)?;
    info!(path = %summary.display(), rows = rows.len(), "summary written");
    Ok(rows)
}
