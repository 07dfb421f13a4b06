//! The link-grammar command-line interface.
//!
//! A thin caller of the session API: `info` prints the engine version and the
//! dictionary language, `parse` parses one sentence and draws a linkage, and
//! `languages` lists the dictionaries under the data directory.

use std::{fs, path::Path, process};

use clap::Parser;
use tracing::debug;

use crate::{
    catalog::{CatalogConfig, DictionaryCatalog},
    error::{LinkGrammarError, Result},
    logging,
    options::ParseOptions,
    session::ParserSession,
};

pub mod args;
pub mod output;

use args::{Command, LinkGrammarArgs, ParseArgs};

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() {
    let args = LinkGrammarArgs::parse();
    logging::init(args.verbose);

    if let Err(e) = dispatch(args) {
        output::print_error(e);
        process::exit(1);
    }
}

fn dispatch(args: LinkGrammarArgs) -> Result<()> {
    let catalog = match &args.data_dir {
        Some(dir) => DictionaryCatalog::new(CatalogConfig::with_search_root(dir)?),
        None => DictionaryCatalog::default(),
    };
    debug!(root = %catalog.search_root().display(), "catalog ready");

    match args.command.unwrap_or(Command::Info) {
        Command::Info => run_info(&catalog, &args.language),
        Command::Parse(parse) => run_parse(&catalog, &args.language, &parse),
        Command::Languages => {
            output::print_list(&catalog.available_languages()?);
            Ok(())
        }
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_info(catalog: &DictionaryCatalog, language: &str) -> Result<()> {
    let session = ParserSession::create_in(catalog, language)?;
    println!("{}", session.version()?);
    println!("{}", session.dictionary()?);
    Ok(())
}

fn run_parse(catalog: &DictionaryCatalog, language: &str, args: &ParseArgs) -> Result<()> {
    let mut session = ParserSession::create_in(catalog, language)?;
    session.set_options(options_for(args)?)?;

    let summary = session.parse(&args.sentence)?;
    if args.json {
        let json = serde_json::to_string_pretty(&summary).map_err(|e| {
            LinkGrammarError::configuration(format!("cannot encode summary: {}", e))
        })?;
        println!("{}", json);
    } else {
        output::print_summary(&summary);
    }

    if summary.num_linkages == 0 {
        return Ok(());
    }
    session.select_linkage(args.linkage)?;
    if !args.json {
        output::print_diagram(args.linkage, &session.diagram()?);
    }
    if let Some(path) = &args.postscript {
        write_postscript(path, &session.postscript()?)?;
    }
    Ok(())
}

/// Options from `--config`, with explicit flags taking precedence.
fn options_for(args: &ParseArgs) -> Result<ParseOptions> {
    let mut options = match &args.config {
        Some(path) => load_options(path)?,
        None => ParseOptions::new(),
    };
    if let Some(n) = args.max_linkages {
        options.set_max_linkages(n)?;
    }
    if let Some(secs) = args.time_limit {
        options.set_parse_time_limit_seconds(secs);
    }
    if let Some(n) = args.max_null_count {
        options.set_max_null_count(n);
    }
    if let Some(level) = args.diagram_verbosity {
        options.set_verbosity(level);
    }
    if args.no_walls {
        options.set_display_walls(false);
    }
    Ok(options)
}

fn load_options(path: &Path) -> Result<ParseOptions> {
    let text = fs::read_to_string(path).map_err(|e| {
        LinkGrammarError::configuration(format!("cannot read {}: {}", path.display(), e))
    })?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => ParseOptions::from_json_str(&text),
        _ => ParseOptions::from_yaml_str(&text),
    }
}

fn write_postscript(path: &Path, document: &str) -> Result<()> {
    fs::write(path, document).map_err(|e| {
        LinkGrammarError::configuration(format!("cannot write {}: {}", path.display(), e))
    })?;
    debug!(path = %path.display(), bytes = document.len(), "postscript written");
    Ok(())
}
