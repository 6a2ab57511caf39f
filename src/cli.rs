use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::data::Catalog;
use crate::estimator::{estimate, validate_query, Estimate, EstimateError, FormNumber};
use crate::logging::init_logging;
use crate::server;

pub const USAGE: &str = "usage: villager-odds <serve|estimate|validate>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Estimate,
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Message,
    Json,
    Table,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("estimate") => Some(Command::Estimate),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return 1;
        }
    };
    init_logging(config.log_level);

    match command {
        Command::Serve => handle_serve(&config),
        Command::Estimate => handle_estimate(&config, args),
        Command::Validate => handle_validate(&config, args),
    }
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    let catalog = Catalog::from_path(path)
        .with_context(|| format!("loading villager catalog from {}", path.display()))?;
    info!(
        path = %path.display(),
        villagers = catalog.len(),
        species = catalog.species_count(),
        "catalog loaded"
    );
    Ok(catalog)
}

fn handle_serve(config: &Config) -> i32 {
    let catalog = match load_catalog(&config.catalog_path) {
        Ok(catalog) => catalog,
        Err(err) => {
            error!("{err:#}");
            eprintln!("server error: {err:#}");
            return 1;
        }
    };
    match server::run_server(&config.bind, catalog) {
        Ok(()) => 0,
        Err(err) => {
            error!(bind = %config.bind, "server error: {err}");
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_estimate(config: &Config, args: &[String]) -> i32 {
    let positional: Vec<&String> = args
        .iter()
        .skip(2)
        .filter(|arg| !arg.starts_with("--"))
        .collect();
    let format = if args.iter().any(|arg| arg == "--json") {
        OutputFormat::Json
    } else if args.iter().any(|arg| arg == "--table") {
        OutputFormat::Table
    } else {
        OutputFormat::Message
    };

    let Some(villager) = positional.first() else {
        eprintln!("usage: villager-odds estimate <villager> <tickets> <same_species> [--json|--table]");
        return 2;
    };
    let tickets = positional.get(1).map(|raw| FormNumber::parse(raw));
    let same_species = positional.get(2).map(|raw| FormNumber::parse(raw));

    let catalog = match load_catalog(&config.catalog_path) {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("estimate failed: {err:#}");
            return 1;
        }
    };

    let result = validate_query(Some(villager.as_str()), tickets, same_species)
        .and_then(|query| estimate(&catalog, &query));
    match result {
        Ok(result) => print_estimate(&result, format),
        Err(err @ (EstimateError::Validation(_) | EstimateError::NotFound(_))) => {
            eprintln!("{err}");
            1
        }
        Err(err) => {
            error!("estimate failed: {err}");
            eprintln!("estimate failed: {err}");
            1
        }
    }
}

fn print_estimate(result: &Estimate, format: OutputFormat) -> i32 {
    if result.held_clamped {
        warn!(
            species = %result.species,
            "same-species count meets or exceeds the species size"
        );
    }
    if result.series_sampled {
        warn!(
            points = result.series.len(),
            tickets = result.tickets,
            "chart series sampled evenly"
        );
    }
    match format {
        OutputFormat::Message => println!("{}", result.message()),
        OutputFormat::Json => match serde_json::to_string_pretty(result) {
            Ok(payload) => println!("{payload}"),
            Err(err) => {
                eprintln!("failed to serialize estimate: {err}");
                return 1;
            }
        },
        OutputFormat::Table => {
            println!("tickets\tprobability_pct");
            for point in &result.series {
                println!("{}\t{:.6}", point.tickets, point.probability_pct);
            }
            println!("{}\t{:.6}", result.tickets, result.tickets_pct());
        }
    }
    0
}

fn handle_validate(config: &Config, args: &[String]) -> i32 {
    let path = args
        .get(2)
        .map(Path::new)
        .unwrap_or(config.catalog_path.as_path());

    match Catalog::from_path(path) {
        Ok(catalog) => {
            println!(
                "catalog ok: villagers={}, species={}",
                catalog.len(),
                catalog.species_count()
            );
            0
        }
        Err(err) => {
            eprintln!("validation failed: {err}");
            1
        }
    }
}
