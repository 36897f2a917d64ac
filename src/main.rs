//! maturity-tools: Maturity assessment scoring and recommendation engine
//!
//! Records survey answers per organization, scores them into per-dimension
//! maturity, and derives findings, recommendations and trend diagnostics.

#![allow(clippy::too_many_lines, clippy::needless_pass_by_value)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use maturity_tools::{
    cli::{self, CliContext},
    config::{AppConfig, Validatable},
    model::{AssessmentStatus, Dimension, RecommendationStatus},
    pipeline::exit_codes,
    reports::ReportFormat,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with scoring info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nDimensions:",
        "\n  performance, production_readiness, infrastructure_efficiency,",
        "\n  failure_resilience",
        "\n\nOutput Formats:",
        "\n  json, summary"
    )
}

#[derive(Parser)]
#[command(name = "maturity-tools")]
#[command(version, long_version = build_long_version())]
#[command(about = "Maturity assessment scoring and recommendation engine", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Overall maturity below --min-maturity
    3  Error occurred

EXAMPLES:
    # Create the database and seed the question catalog
    maturity-tools init

    # Record answers and complete an assessment
    maturity-tools org create \"Acme\" --domain acme.io
    maturity-tools assessment create 1 \"Q3 review\"
    maturity-tools answer 1 perf-01 150
    maturity-tools complete 1 --min-maturity 2.5

    # Export the full report as JSON
    maturity-tools report 1 -o json > report.json

    # Organization rollups
    maturity-tools org metrics 1
    maturity-tools org benchmark 1

    # Score an answer file without a database
    maturity-tools score answers.yaml")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true, env = "MATURITY_TOOLS_DB")]
    database: Option<PathBuf>,

    /// Use the extended question catalog (base questions plus 40 more)
    #[arg(long, global = true)]
    extended_catalog: bool,

    /// Output format (auto picks json for *.json output files, summary otherwise)
    #[arg(short, long, global = true, default_value = "auto")]
    output: ReportFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long, global = true)]
    output_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and seed the question catalog
    Init,

    /// List catalog questions
    Questions {
        /// Only questions of this dimension
        #[arg(long)]
        dimension: Option<Dimension>,
    },

    /// Manage organizations
    Org {
        #[command(subcommand)]
        action: OrgAction,
    },

    /// Manage assessments
    Assessment {
        #[command(subcommand)]
        action: AssessmentAction,
    },

    /// Record the answer to one question
    Answer {
        assessment: i64,
        question: String,
        /// Raw answer: option label, number, or JSON list of labels
        value: String,
    },

    /// Score, generate findings and recommendations, and mark completed
    Complete {
        assessment: i64,
        /// Exit with code 1 if overall maturity is below this value
        #[arg(long)]
        min_maturity: Option<f64>,
    },

    /// Render the report of an assessment
    Report {
        assessment: i64,
        /// Exit with code 1 if overall maturity is below this value
        #[arg(long)]
        min_maturity: Option<f64>,
    },

    /// Detect score anomalies against the organization's history
    Anomalies { assessment: i64 },

    /// Project overall maturity six months ahead
    Trend { assessment: i64 },

    /// Maturity timeline of an organization
    History { organization: i64 },

    /// Headline, workload, capacity and cost insights
    Insights { assessment: i64 },

    /// Compare dimension scores of two assessments
    Compare { baseline: i64, current: i64 },

    /// Manage recommendations
    Recommendation {
        #[command(subcommand)]
        action: RecommendationAction,
    },

    /// List notifications of an organization
    Notifications { organization: i64 },

    /// Score an answer workbook (YAML/JSON) without a database
    Score {
        workbook: PathBuf,
        /// Exit with code 1 if overall maturity is below this value
        #[arg(long)]
        min_maturity: Option<f64>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to this file instead of stdout
        path: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum OrgAction {
    /// Create an organization
    Create {
        name: String,
        #[arg(long)]
        domain: Option<String>,
    },
    /// List organizations
    List,
    /// Aggregate metrics over completed assessments
    Metrics { organization: i64 },
    /// Compare the latest completed assessment with the industry baseline
    Benchmark { organization: i64 },
}

#[derive(Subcommand)]
enum AssessmentAction {
    /// Create a draft assessment
    Create { organization: i64, name: String },
    /// List assessments
    List {
        #[arg(long)]
        organization: Option<i64>,
        #[arg(long)]
        status: Option<AssessmentStatus>,
    },
    /// Copy an assessment and its answers into a new draft
    Clone {
        source: i64,
        /// Name of the copy (defaults to "<name> (copy)")
        #[arg(long)]
        name: Option<String>,
    },
    /// Replace the notes of an assessment (omit the text to clear them)
    Notes { assessment: i64, text: Option<String> },
    /// Replace the tags of an assessment (no tags clears them)
    Tags { assessment: i64, tags: Vec<String> },
    /// Replace the custom fields of an assessment with a JSON object
    Fields { assessment: i64, json: String },
}

#[derive(Subcommand)]
enum RecommendationAction {
    /// Set the status of a recommendation
    Status {
        id: i64,
        /// pending, in_progress, completed or skipped
        status: RecommendationStatus,
    },
    /// Set one status on several recommendations; unknown ids are skipped
    BulkStatus {
        status: RecommendationStatus,
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .maturity-tools.yaml in the current directory
    Init,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_codes::ERROR);
        }
    }
}

/// Merge file configuration with command-line flags.
fn effective_config(cli: &Cli) -> AppConfig {
    let mut overrides = AppConfig::builder()
        .output_format(cli.output)
        .output_file(cli.output_file.clone())
        .no_color(cli.no_color)
        .extended_catalog(cli.extended_catalog);
    if let Some(db) = &cli.database {
        overrides = overrides.database_path(db.clone());
    }
    let (config, loaded_from) =
        AppConfig::from_file_with_overrides(cli.config.as_deref(), &overrides.build());
    if let Some(path) = loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }
    config
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let config = effective_config(&cli);
    let errors = config.validate();
    if !errors.is_empty() {
        for error in &errors {
            tracing::error!("Invalid configuration: {error}");
        }
        anyhow::bail!("configuration has {} error(s)", errors.len());
    }
    let ctx = CliContext::new(config, cli.quiet);

    // Dispatch to command handlers
    match cli.command {
        Commands::Init => cli::run_init(&ctx).map(|()| exit_codes::SUCCESS),
        Commands::Questions { dimension } => {
            cli::run_questions(&ctx, dimension).map(|()| exit_codes::SUCCESS)
        }

        Commands::Org { action } => {
            match action {
                OrgAction::Create { name, domain } => {
                    cli::run_org_create(&ctx, &name, domain.as_deref())?;
                }
                OrgAction::List => cli::run_org_list(&ctx)?,
                OrgAction::Metrics { organization } => cli::run_org_metrics(&ctx, organization)?,
                OrgAction::Benchmark { organization } => {
                    cli::run_org_benchmark(&ctx, organization)?;
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Assessment { action } => {
            match action {
                AssessmentAction::Create { organization, name } => {
                    cli::run_assessment_create(&ctx, organization, &name)?;
                }
                AssessmentAction::List {
                    organization,
                    status,
                } => cli::run_assessment_list(&ctx, organization, status)?,
                AssessmentAction::Clone { source, name } => {
                    cli::run_assessment_clone(&ctx, source, name.as_deref())?;
                }
                AssessmentAction::Notes { assessment, text } => {
                    cli::run_assessment_notes(&ctx, assessment, text.as_deref())?;
                }
                AssessmentAction::Tags { assessment, tags } => {
                    cli::run_assessment_tags(&ctx, assessment, &tags)?;
                }
                AssessmentAction::Fields { assessment, json } => {
                    cli::run_assessment_fields(&ctx, assessment, &json)?;
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Answer {
            assessment,
            question,
            value,
        } => cli::run_answer(&ctx, assessment, &question, &value).map(|()| exit_codes::SUCCESS),

        Commands::Complete {
            assessment,
            min_maturity,
        } => cli::run_complete(&ctx, assessment, min_maturity),

        Commands::Report {
            assessment,
            min_maturity,
        } => cli::run_report(&ctx, assessment, min_maturity),

        Commands::Anomalies { assessment } => {
            cli::run_anomalies(&ctx, assessment).map(|()| exit_codes::SUCCESS)
        }
        Commands::Trend { assessment } => {
            cli::run_trend(&ctx, assessment).map(|()| exit_codes::SUCCESS)
        }
        Commands::History { organization } => {
            cli::run_history(&ctx, organization).map(|()| exit_codes::SUCCESS)
        }
        Commands::Insights { assessment } => {
            cli::run_insights(&ctx, assessment).map(|()| exit_codes::SUCCESS)
        }
        Commands::Compare { baseline, current } => {
            cli::run_compare(&ctx, baseline, current).map(|()| exit_codes::SUCCESS)
        }

        Commands::Recommendation { action } => match action {
            RecommendationAction::Status { id, status } => {
                cli::run_recommendation_status(&ctx, id, status).map(|()| exit_codes::SUCCESS)
            }
            RecommendationAction::BulkStatus { status, ids } => {
                cli::run_recommendation_bulk_status(&ctx, &ids, status)
                    .map(|()| exit_codes::SUCCESS)
            }
        },

        Commands::Notifications { organization } => {
            cli::run_notifications(&ctx, organization).map(|()| exit_codes::SUCCESS)
        }

        Commands::Score {
            workbook,
            min_maturity,
        } => cli::run_score(&ctx, &workbook, min_maturity),

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "maturity-tools", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { path } => {
            let schema = maturity_tools::config::generate_json_schema()
                .context("failed to generate config schema")?;
            match path {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => run_config(action, cli.config.as_deref(), &ctx.config),
    }
}

fn run_config(
    action: ConfigAction,
    explicit: Option<&Path>,
    effective: &AppConfig,
) -> Result<i32> {
    match action {
        ConfigAction::Show => {
            match maturity_tools::config::discover_config_file(explicit) {
                Some(path) => eprintln!("# Loaded from: {}", path.display()),
                None => eprintln!("# No config file found; showing defaults"),
            }
            let yaml = serde_yaml::to_string(effective).context("failed to serialize config")?;
            print!("{yaml}");
        }
        ConfigAction::Path => {
            let search_paths: [Option<String>; 3] = [
                std::env::current_dir()
                    .ok()
                    .map(|p| p.display().to_string()),
                maturity_tools::config::user_config_dir().map(|p| p.display().to_string()),
                ::dirs::home_dir().map(|p| p.display().to_string()),
            ];
            eprintln!("Config file search paths (in order):");
            for path in search_paths.into_iter().flatten() {
                eprintln!("  {path}");
            }
            eprintln!();
            eprintln!("Recognized file names:");
            for name in maturity_tools::config::CONFIG_FILE_NAMES {
                eprintln!("  {name}");
            }
            eprintln!();
            match maturity_tools::config::discover_config_file(explicit) {
                Some(path) => eprintln!("Active config file: {}", path.display()),
                None => eprintln!("No config file found."),
            }
        }
        ConfigAction::Init => {
            let target = std::env::current_dir()
                .context("cannot determine current directory")?
                .join(".maturity-tools.yaml");
            if target.exists() {
                anyhow::bail!(
                    "{} already exists. Remove it first to re-initialize.",
                    target.display()
                );
            }
            let content = maturity_tools::config::generate_full_example_config();
            std::fs::write(&target, content)
                .with_context(|| format!("failed to write {}", target.display()))?;
            eprintln!("Created {}", target.display());
        }
    }
    Ok(exit_codes::SUCCESS)
}
