//! `kivu-graph`: populate the humanitarian graph and query it from the shell.
//!
//! # Usage
//!
//! ```text
//! kivu-graph [--config <path>] <command> [args…]
//!
//! Commands:
//!   populate <text…> [--entities <json>]   recognize, link and sync one text
//!   populate-file <path> [--sheet <name>]  text lines or spreadsheet text columns, batched
//!   build <intent> [slot=value…]           print the SPARQL query for an intent
//!   ask <intent> [slot=value…]             build, execute and format a reply
//!   intents                                list registered intents
//! ```
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Init logger at `info`
//!   3. Load config (`--config` or `config/default.toml`)
//!   4. Switch the logger to the configured level
//!   5. Run the command

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use serde_json::Value;
use tracing::{error, info};

use kivu_graph::config::{self, Config};
use kivu_graph::error::AppError;
use kivu_graph::logger;
use kivu_graph::ontology::hdx;
use kivu_graph::ontology::preprocess::prepare_sentences;
use kivu_graph::ontology::{ExternalEntity, GraphSynchronizer, Populator};
use kivu_graph::query::{QueryService, Slots, TemplateRegistry};

struct Args {
    config: Option<PathBuf>,
    command: Option<String>,
    rest: Vec<String>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    // Optional file; a missing .env is not an error.
    let _ = dotenvy::dotenv();

    let log = logger::init("info")?;
    let args = parse_args();

    let loaded = match &args.config {
        Some(path) => config::load_path(path),
        None => config::load(),
    };
    let config = loaded.inspect_err(|e| error!(error = %e, "config load failed"))?;
    log.set_level(&config.log_level)?;

    info!(
        backend = ?config.store.backend,
        store = %config.store.base_url,
        dataset = %config.store.dataset,
        locale = %config.locale,
        "config loaded"
    );

    let Some(command) = args.command.as_deref() else {
        print_help();
        return Err(AppError::Usage("no command given".into()));
    };

    match command {
        "populate" => populate(&config, &args.rest),
        "populate-file" => populate_file(&config, &args.rest),
        "build" => build(&args.rest),
        "ask" => ask(&config, &args.rest),
        "intents" => {
            for intent in TemplateRegistry::builtin().intents() {
                println!("{intent}");
            }
            Ok(())
        }
        other => Err(AppError::Usage(format!("unknown command '{other}'"))),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn populator(config: &Config) -> Result<Populator, AppError> {
    let sync = GraphSynchronizer::from_config(&config.store)
        .map_err(|e| AppError::Config(e.to_string()))?;
    Ok(Populator::new(sync))
}

fn populate(config: &Config, rest: &[String]) -> Result<(), AppError> {
    let mut words = Vec::new();
    let mut external = Vec::new();
    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        if arg == "--entities" {
            let raw = iter
                .next()
                .ok_or_else(|| AppError::Usage("--entities needs a JSON array".into()))?;
            let doc: Value = serde_json::from_str(raw)?;
            external = ExternalEntity::from_json_list(&doc);
        } else {
            words.push(arg.as_str());
        }
    }
    if words.is_empty() {
        return Err(AppError::Usage("populate needs some text".into()));
    }

    let report = populator(config)?.populate_text(&words.join(" "), &external);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn populate_file(config: &Config, rest: &[String]) -> Result<(), AppError> {
    let mut path = None;
    let mut sheet = None;
    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        if arg == "--sheet" {
            let name = iter
                .next()
                .ok_or_else(|| AppError::Usage("--sheet needs a sheet name".into()))?;
            sheet = Some(name.as_str());
        } else {
            path = Some(Path::new(arg));
        }
    }
    let path = path.ok_or_else(|| AppError::Usage("populate-file needs a path".into()))?;

    let texts: Vec<String> = if hdx::is_spreadsheet(path) {
        hdx::read_sheet_texts(path, sheet).map_err(|e| AppError::Sheet(e.to_string()))?
    } else {
        fs::read_to_string(path)?.lines().map(str::to_string).collect()
    };
    let sentences = prepare_sentences(&texts);

    let report = populator(config)?.populate_sentences(&sentences);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn build(rest: &[String]) -> Result<(), AppError> {
    let (intent, slots) = intent_and_slots(rest)?;
    match TemplateRegistry::builtin().build(intent, &slots) {
        Some(query) => {
            println!("{query}");
            Ok(())
        }
        None => Err(AppError::Usage(format!("could not build a query for '{intent}'"))),
    }
}

fn ask(config: &Config, rest: &[String]) -> Result<(), AppError> {
    let (intent, slots) = intent_and_slots(rest)?;
    let service = QueryService::from_config(config).map_err(|e| AppError::Config(e.to_string()))?;
    println!("{}", service.respond(intent, &slots, &[]));
    Ok(())
}

/// `<intent> [slot=value…]`
fn intent_and_slots(rest: &[String]) -> Result<(&str, Slots), AppError> {
    let (intent, pairs) = rest
        .split_first()
        .ok_or_else(|| AppError::Usage("missing intent name".into()))?;
    let mut slots = Slots::new();
    for pair in pairs {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| AppError::Usage(format!("expected slot=value, got '{pair}'")))?;
        slots.insert(name.to_string(), value.to_string());
    }
    Ok((intent.as_str(), slots))
}

// ── Arguments ─────────────────────────────────────────────────────────────────

fn parse_args() -> Args {
    let mut config = None;
    let mut command = None;
    let mut rest = Vec::new();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" if command.is_none() => {
                config = iter.next().map(PathBuf::from);
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--" => {
                rest.extend(iter);
                break;
            }
            _ if command.is_none() => command = Some(arg),
            _ => rest.push(arg),
        }
    }

    Args { config, command, rest }
}

fn print_help() {
    eprintln!("usage: kivu-graph [--config <path>] <command> [args…]");
    eprintln!();
    eprintln!("commands:");
    eprintln!("  populate <text…> [--entities <json>]   recognize, link and sync one text");
    eprintln!("  populate-file <path> [--sheet <name>]  batch-populate lines or sheet text");
    eprintln!("  build <intent> [slot=value…]           print the query for an intent");
    eprintln!("  ask <intent> [slot=value…]             answer an intent from the store");
    eprintln!("  intents                                list registered intents");
    eprintln!();
    eprintln!("flags:");
    eprintln!("  --config, -c <path>   config file (default: config/default.toml)");
    eprintln!("  --help,   -h          print this help");
    eprintln!();
    eprintln!("env overrides: KIVU_STORE_URL, KIVU_LOG_LEVEL");
}
