//! Relmap CLI - run and inspect the relationship scenarios

use clap::{Parser, Subcommand};
use relmap::config::{self, OutputFormat, RelmapConfig};
use relmap::scenario::{Report, RunOptions, Scenario};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "relmap")]
#[command(version)]
#[command(about = "Typed relationship mapping demonstrations over in-memory SQLite")]
#[command(long_about = r#"
Relmap runs small relationship scenarios against an ephemeral database:
  • many-to-many through an association table
  • one-to-many with a back-reference
  • one-to-many without a back-reference

Example usage:
  relmap list
  relmap run many-to-many
  relmap run all --format json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scenario, or `all`
    Run {
        /// Scenario name (many-to-many, one-to-many, one-to-many-unidirectional, all)
        scenario: String,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Always print the CREATE TABLE statements
        #[arg(long, conflicts_with = "no_schemas")]
        schemas: bool,

        /// Never print the CREATE TABLE statements
        #[arg(long)]
        no_schemas: bool,
    },

    /// List the available scenarios
    List,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    // Initialize logging
    let filter = if cli.verbose {
        Some("debug")
    } else {
        config.log_filter.as_deref()
    };
    relmap::logging::init(filter);

    match cli.command {
        Commands::Run {
            scenario,
            format,
            schemas,
            no_schemas,
        } => {
            let scenarios: Vec<Scenario> = if scenario.eq_ignore_ascii_case("all") {
                Scenario::all().to_vec()
            } else {
                vec![scenario.parse()?]
            };

            let show_schemas = if schemas {
                Some(true)
            } else if no_schemas {
                Some(false)
            } else {
                config.show_schemas
            };
            let options = RunOptions { show_schemas };

            let format = format.or(config.format).unwrap_or_default();

            let reports = scenarios
                .iter()
                .map(|s| s.run_with(&options))
                .collect::<relmap::Result<Vec<Report>>>()?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
                OutputFormat::Text => {
                    for report in reports {
                        print!("{}", report);
                    }
                }
            }
        }

        Commands::List => {
            println!("{}", relmap::ui::scenario_table(Scenario::all()));
        }

        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            let defaults = RelmapConfig {
                log_filter: Some(relmap::logging::DEFAULT_FILTER.to_string()),
                format: Some(OutputFormat::Text),
                show_schemas: None,
            };
            config::write_config(&path, &defaults, force)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}
