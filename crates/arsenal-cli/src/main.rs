mod input;
mod report;

use std::path::{Path, PathBuf};

use arsenal_solver::{PriceRange, SolutionStatus, SolverBackend, SolverConfig};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "arsenal")]
#[command(about = "Least-cost procurement with dual prices and price sensitivity", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Tolerance for feasibility and equality checks
    #[arg(long, default_value_t = 1e-6, global = true)]
    tolerance: f64,
    /// Simplex pivot rule
    #[arg(long, value_enum, default_value_t = Backend::Dantzig, global = true)]
    backend: Backend,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the primal and dual problems
    Solve {
        /// Problem file (JSON)
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Re-solve over a range of prices for one lot
    Sweep {
        /// Problem file (JSON)
        file: PathBuf,
        /// Lot whose unit cost is varied
        #[arg(short, long)]
        lot: String,
        /// Explicit prices, comma separated
        #[arg(long, value_delimiter = ',', conflicts_with_all = ["from", "to", "step"])]
        values: Option<Vec<f64>>,
        #[arg(long, requires_all = ["to", "step"])]
        from: Option<f64>,
        #[arg(long)]
        to: Option<f64>,
        #[arg(long)]
        step: Option<f64>,
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Check a problem file for errors
    Check {
        /// Problem file (JSON)
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    Dantzig,
    Bland,
}

impl From<Backend> for SolverBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Dantzig => SolverBackend::Dantzig,
            Backend::Bland => SolverBackend::Bland,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn load_or_exit(file: &Path) -> arsenal_solver::ProblemData {
    match input::load(file) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = SolverConfig::new()
        .with_tolerance(cli.tolerance)
        .with_backend(cli.backend.into());

    match cli.command {
        Commands::Solve { file, format } => {
            let data = load_or_exit(&file);
            let pair = match arsenal_solver::solve_pair(&data, &config) {
                Ok(pair) => pair,
                Err(e) => {
                    eprintln!("Solve error: {}", e);
                    std::process::exit(1);
                }
            };

            match format {
                Format::Json => print_json(&pair),
                Format::Pretty => report::print_pair(&data, &pair),
            }

            if pair.primal().status() == SolutionStatus::Infeasible {
                std::process::exit(2);
            }
        }
        Commands::Sweep {
            file,
            lot,
            values,
            from,
            to,
            step,
            format,
        } => {
            let data = load_or_exit(&file);
            let range = match (values, from, to, step) {
                (Some(values), _, _, _) => PriceRange::values(values),
                (None, Some(start), Some(end), Some(step)) => PriceRange::stepped(start, end, step),
                _ => {
                    eprintln!("Give either --values or --from, --to and --step");
                    std::process::exit(1);
                }
            };

            let trace = match arsenal_solver::sweep_with_duals(&data, &lot, &range, &config) {
                Ok(trace) => trace,
                Err(e) => {
                    eprintln!("Sweep error: {}", e);
                    std::process::exit(1);
                }
            };

            match format {
                Format::Json => print_json(&serde_json::json!({
                    "trace": trace,
                    "breakpoints": trace.breakpoints(),
                })),
                Format::Pretty => report::print_trace(&trace),
            }
        }
        Commands::Check { file } => match input::load(&file) {
            Ok(data) => {
                println!("✓ {} is valid", file.display());
                report::print_summary(&data);
            }
            Err(e) => {
                eprintln!("✗ {} has errors:", file.display());
                eprintln!("  {}", e);
                std::process::exit(1);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sweep_arguments() {
        let cli = Cli::try_parse_from(["arsenal", "sweep", "plan.json", "--lot", "L1", "--values", "1,2.5,4"]).unwrap();
        match cli.command {
            Commands::Sweep { lot, values, .. } => {
                assert_eq!(lot, "L1");
                assert_eq!(values, Some(vec![1.0, 2.5, 4.0]));
            }
            _ => panic!("expected sweep"),
        }
        assert!(Cli::try_parse_from(["arsenal", "sweep", "plan.json", "--lot", "L1", "--values", "1", "--step", "1"]).is_err());
    }

    #[test]
    fn test_load_from_path() {
        let path = std::env::temp_dir().join(format!("arsenal-load-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "costs": [10.0], "constraints": [[1.0]], "requirements": [3.0] }"#,
        )
        .unwrap();
        let data = load_or_exit(path.as_path());
        std::fs::remove_file(&path).unwrap();

        assert_eq!(data.num_lots(), 1);
        assert_eq!(data.requirements()[0].category, "Category 1");
    }
}
