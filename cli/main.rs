#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

// ========================================================================================
//
//                          The Command-Line Front End: cogni
//
// ========================================================================================
//
// This binary is a thin collaborator around the engine. It parses raw text from the
// command line, hands validated values to the `WorkflowController`, and prints what
// comes back. Reports go to stdout; diagnostics go to stderr through `env_logger`.

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use cogni::config::CalculatorConfig;
use cogni::prevalence::{band_for_age, parse_age};
use cogni::report::{self, BandTable};
use cogni::{LrKind, WorkflowController, WorkflowError, list_tests};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process;

mod session;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Toml,
}

#[derive(Args)]
pub struct CalculateArgs {
    /// Patient age in whole years
    #[arg(long, value_name = "AGE", allow_hyphen_values = true)]
    pub age: String,

    /// Clinical (pre-test) probability in percent; defaults to the age band's population risk
    #[arg(long, value_name = "PERCENT", allow_hyphen_values = true)]
    pub probability: Option<f64>,

    /// Published name of the biomarker test (see `cogni tests`)
    #[arg(long, value_name = "NAME")]
    pub test: String,

    /// Replace the published positive likelihood ratio
    #[arg(long, value_name = "LR", allow_hyphen_values = true)]
    pub positive_lr: Option<String>,

    /// Replace the published negative likelihood ratio
    #[arg(long, value_name = "LR", allow_hyphen_values = true)]
    pub negative_lr: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser)]
#[command(
    name = "cogni",
    version,
    about = "Pre/post-test probability calculator for Alzheimer's biomarker tests",
    long_about = "Combines an age-based population prevalence, a clinician-adjusted pre-test \
                 probability, and a biomarker test's likelihood ratios into post-test \
                 probabilities for a positive and a negative result. Decision support only."
)]
struct Cli {
    /// TOML file overriding decision thresholds and display precision
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the population prevalence for an age
    #[command(about = "Show the population risk for an age")]
    Prevalence {
        #[arg(value_name = "AGE", allow_hyphen_values = true)]
        age: String,
    },

    /// Print the population-risk-by-age reference table
    #[command(about = "Show the population risk table")]
    Bands,

    /// List the biomarker tests in the catalog
    #[command(about = "List available biomarker tests")]
    Tests,

    /// Run all three steps at once and print the result
    #[command(about = "Calculate post-test probabilities")]
    Calculate(CalculateArgs),

    /// Walk through the three steps interactively
    #[command(about = "Start an interactive guided session")]
    Session,

    /// Print the effective configuration as TOML
    #[command(about = "Print the effective configuration")]
    Config,
}

fn run_prevalence(raw_age: &str) -> Result<(), Box<dyn Error>> {
    let age = parse_age(raw_age)?;
    let band = band_for_age(age);
    println!(
        "Age {age} (group {}): population risk {:.1}%",
        band.label(),
        band.prevalence_percent
    );
    Ok(())
}

fn run_tests() -> Result<(), Box<dyn Error>> {
    for test in list_tests() {
        println!("{}", test.name);
        println!("  Threshold: {}", test.threshold);
        println!(
            "  LR+ {:.2}, LR- {:.2}",
            test.likelihood_ratios.positive, test.likelihood_ratios.negative
        );
        println!("  Source: {}", test.source);
        println!("  {}", test.source_url);
    }
    Ok(())
}

fn run_calculate(args: CalculateArgs, config: &CalculatorConfig) -> Result<(), Box<dyn Error>> {
    let mut controller = WorkflowController::new();
    controller.submit_age_text(&args.age)?;
    if let Some(percent) = args.probability {
        controller.adjust_probability(percent)?;
    }
    controller.advance()?;

    if controller.calculate(&args.test)?.is_none() {
        return Err(format!(
            "Unknown test '{}'. Run `cogni tests` to list the available tests.",
            args.test.trim()
        )
        .into());
    }

    let edits = [
        (LrKind::Positive, args.positive_lr.as_deref()),
        (LrKind::Negative, args.negative_lr.as_deref()),
    ];
    for (kind, raw) in edits {
        if let Some(raw) = raw {
            controller.edit_likelihood_ratio(kind, raw)?;
        }
    }

    let result = controller.result().ok_or(WorkflowError::NoCalculation)?;
    match args.format {
        OutputFormat::Text => print!("{}", report::render_text(result, config)),
        OutputFormat::Toml => print!("{}", report::render_toml(result, config)?),
    }
    Ok(())
}

fn run_session(config: &CalculatorConfig) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    session::run(stdin.lock(), stdout.lock(), config)?;
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<CalculatorConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(CalculatorConfig::load(path)?),
        None => Ok(CalculatorConfig::default()),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let Cli { config, command } = cli;

    let config = match load_config(config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    let result = match command {
        Some(Commands::Prevalence { age }) => run_prevalence(&age),
        Some(Commands::Bands) => {
            print!("{BandTable}");
            Ok(())
        }
        Some(Commands::Tests) => run_tests(),
        Some(Commands::Calculate(args)) => run_calculate(args, &config),
        Some(Commands::Session) => run_session(&config),
        Some(Commands::Config) => config
            .to_toml_string()
            .map(|text| print!("{text}"))
            .map_err(Into::into),
        None => {
            let mut command = Cli::command();
            command
                .print_help()
                .map(|()| println!())
                .map_err(Into::into)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
