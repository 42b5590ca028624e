use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use congress_cards::apis::client::CongressClient;
use congress_cards::apis::create_source;
use congress_cards::cards::generate_cards;
use congress_cards::config::{api_key_from_env, Config};
use congress_cards::constants::{
    self, MEMBERS_TABLE, MODIFIED_MEMBERS_TABLE, RAW_DATA_CSV, VOTES_TABLE,
};
use congress_cards::export::export_raw_data;
use congress_cards::logging;
use congress_cards::pipeline::Pipeline;
use congress_cards::storage::{load_members, JsonFileStorage, Storage};
use congress_cards::types::Year;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info, warn, Instrument};

#[derive(Parser)]
#[command(name = "congress_cards")]
#[command(about = "Congress.gov member scraper, tenure ranker and card generator")]
#[command(version)]
struct Cli {
    /// Path to the TOML config (defaults are used when it doesn't exist)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory the JSON tables and CSV are read from and written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch source tables from the Congress.gov API
    Fetch {
        /// Sources to fetch (comma-separated). Available: members, house_votes
        #[arg(long)]
        apis: Option<String>,
    },
    /// Rank tenure and keep current members (congressmen.json -> congressmen_mod.json)
    Modify {
        /// Year to measure ongoing terms from (defaults to this year)
        #[arg(long)]
        year: Option<Year>,
    },
    /// Merge members with their votes into a CSV
    Export {
        /// Use the modified member table instead of the raw one
        #[arg(long)]
        modified: bool,
        /// CSV path (defaults to raw_data.csv in the output directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Render one SVG card per current member
    Cards {
        #[arg(long)]
        year: Option<Year>,
        /// Render only the first card
        #[arg(long)]
        test_card: bool,
        /// Directory for the cards (defaults to the configured cards_dir)
        #[arg(long)]
        cards_dir: Option<PathBuf>,
    },
    /// Fetch missing tables (asking before regenerating existing ones), then export
    Run {
        /// Regenerate existing tables without asking
        #[arg(long, conflicts_with = "no")]
        yes: bool,
        /// Keep existing tables without asking
        #[arg(long)]
        no: bool,
    },
}

fn current_year(year: Option<Year>) -> Year {
    year.unwrap_or_else(|| Local::now().year())
}

/// Asks until the user answers y or n. End of input counts as "no".
fn prompt_yes_no(prompt: &str) -> io::Result<bool> {
    let stdin = io::stdin();
    loop {
        print!("{prompt} (y/n): ");
        io::stdout().flush()?;
        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer)? == 0 {
            return Ok(false);
        }
        match answer.trim().to_lowercase().as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => println!("Invalid input. Please enter 'y' or 'n'."),
        }
    }
}

async fn fetch_sources(api_names: &[String], config: &Config, storage: &dyn Storage) -> Result<()> {
    let client = CongressClient::new(&config.api, api_key_from_env()?)?;

    for api_name in api_names {
        let Some(source) = create_source(api_name, client.clone(), config) else {
            warn!("Unknown API: {}", api_name);
            println!("⚠️  Unknown API: {} (available: {})", api_name, constants::get_supported_apis().join(", "));
            continue;
        };
        let span = tracing::info_span!("source", api = %api_name);
        match Pipeline::run_fetch(source.as_ref(), storage).instrument(span).await {
            Ok(result) => {
                println!("📥 {}: {} rows -> {}.json", result.api_name, result.rows, result.table);
            }
            Err(e) => {
                error!("Fetch failed for {}: {}", api_name, e);
                return Err(e.into());
            }
        }
    }
    Ok(())
}

/// Decides whether `table` needs (re)generating, asking when it already exists.
fn should_generate(storage: &dyn Storage, table: &str, yes: bool, no: bool) -> Result<bool> {
    match storage.modified_at(table)? {
        None => {
            println!("{table}.json does not exist. Generating...");
            Ok(true)
        }
        Some(modified) => {
            let created = modified.format("%a %b %e %H:%M:%S %Y");
            let regenerate = if yes {
                true
            } else if no {
                false
            } else {
                prompt_yes_no(&format!(
                    "{table}.json already exists, was created on {created}. Do you want to force regeneration?"
                ))?
            };
            if regenerate {
                println!("Regenerating {table}.json");
            } else {
                println!("Not regenerating, running with pre-existing {table}.json.");
            }
            Ok(regenerate)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = logging::init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(dir) = cli.output_dir {
        config.output.dir = dir;
    }
    let storage = JsonFileStorage::new(config.output.dir.clone());

    match cli.command {
        Commands::Fetch { apis } => {
            let api_names: Vec<String> = match apis {
                Some(list) => list.split(',').map(|s| s.trim().to_string()).collect(),
                None => constants::get_supported_apis().iter().map(|s| s.to_string()).collect(),
            };
            fetch_sources(&api_names, &config, &storage).await?;
        }
        Commands::Modify { year } => {
            let result = Pipeline::run_modify(&storage, current_year(year))
                .context("modifying congressmen.json")?;
            println!(
                "✅ Exported {} current members out of {} terms to {}",
                result.current_rows,
                result.total_rows,
                storage.table_path(MODIFIED_MEMBERS_TABLE).display()
            );
        }
        Commands::Export { modified, output } => {
            let members_table = if modified { MODIFIED_MEMBERS_TABLE } else { MEMBERS_TABLE };
            let path = output.unwrap_or_else(|| storage.dir().join(RAW_DATA_CSV));
            let rows = export_raw_data(&storage, members_table, &path)?;
            println!("✅ Merged {} rows into {}", rows, path.display());
        }
        Commands::Cards { year, test_card, cards_dir } => {
            let members = load_members(&storage, MODIFIED_MEMBERS_TABLE)
                .context("loading congressmen_mod.json; run `modify` first")?;
            if members.is_empty() {
                bail!("congressmen_mod.json has no members");
            }
            let out_dir = cards_dir.unwrap_or_else(|| config.output.cards_dir.clone());
            let report = generate_cards(&members, &out_dir, current_year(year), test_card)?;
            println!("🃏 Wrote {} cards to {}", report.written.len(), out_dir.display());
            if !report.errors.is_empty() {
                println!("\n⚠️  Issues:");
                for issue in &report.errors {
                    println!("   - {}", issue);
                }
            }
        }
        Commands::Run { yes, no } => {
            let mut to_fetch = Vec::new();
            for (api_name, table) in [
                (constants::MEMBERS_API, MEMBERS_TABLE),
                (constants::HOUSE_VOTES_API, VOTES_TABLE),
            ] {
                if should_generate(&storage, table, yes, no)? {
                    to_fetch.push(api_name.to_string());
                }
            }
            if !to_fetch.is_empty() {
                fetch_sources(&to_fetch, &config, &storage).await?;
            }

            let path = storage.dir().join(RAW_DATA_CSV);
            let rows = export_raw_data(&storage, MEMBERS_TABLE, &path)?;
            info!("Run finished with {} merged rows", rows);
            println!("Merging these JSONs, see result in {}", path.display());
        }
    }
    Ok(())
}
