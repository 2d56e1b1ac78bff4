mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::SearchArgs;
use quire_config::Config;
use quire_logger::LogLevel;

/// Document text engine: statistics, search and replace, versioned saves
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the XDG config file)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Document store directory (overrides config)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Print the session log to stderr, including debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show word counts, reading time and readability
    Stats {
        /// Document as rich-document JSON or plain text
        file: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the matches of a query
    Find {
        file: PathBuf,
        query: String,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Replace every match of a query
    Replace {
        file: PathBuf,
        query: String,
        replacement: String,

        #[command(flatten)]
        search: SearchArgs,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the heading outline
    Outline { file: PathBuf },

    /// Save a document into the store
    Save {
        file: PathBuf,

        /// Overwrite an existing document instead of creating one
        #[arg(long)]
        id: Option<String>,
    },

    /// List saved documents
    List,

    /// Show version history, most recent first
    History {
        /// Only versions of this document
        #[arg(long)]
        document: Option<String>,
    },

    /// Print a saved document
    Show {
        id: String,

        /// Print the serialized tree instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Delete a saved document (its history is kept)
    Delete { id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };
    init_logging(&config, cli.verbose);

    let result = run(cli.command, cli.store, &config);
    if let Err(err) = &result {
        quire_logger::error("cli", format!("{:#}", err));
    }
    if cli.verbose {
        print_log();
    }
    result
}

fn run(command: Command, store: Option<PathBuf>, config: &Config) -> Result<()> {
    let store_dir = match store {
        Some(dir) => dir,
        None => config.storage_dir()?,
    };

    let mut out = std::io::stdout().lock();
    match command {
        Command::Stats { file, json } => {
            let doc = commands::read_document(&file)?;
            commands::stats(&doc, config, json, &mut out)
        }
        Command::Find {
            file,
            query,
            search,
        } => {
            let doc = commands::read_document(&file)?;
            let options = search.options(&config.search);
            commands::find(&doc, &query, &options, &mut out).map(|_| ())
        }
        Command::Replace {
            file,
            query,
            replacement,
            search,
            output,
        } => {
            let mut doc = commands::read_document(&file)?;
            let options = search.options(&config.search);
            let count = commands::replace(&mut doc, &query, &replacement, &options)?;
            match output {
                Some(path) => commands::write_document(&path, &doc)?,
                None => commands::print_text(&doc, &mut out)?,
            }
            eprintln!("Replaced {} matches", count);
            Ok(())
        }
        Command::Outline { file } => {
            let doc = commands::read_document(&file)?;
            commands::outline(&doc, &mut out)
        }
        Command::Save { file, id } => {
            let doc = commands::read_document(&file)?;
            let mut session = commands::open_session(config, &store_dir, doc);
            commands::save(&mut session, id, &mut out)
        }
        Command::List => {
            let session = commands::open_session(config, &store_dir, Default::default());
            commands::list(&session, &mut out)
        }
        Command::History { document } => {
            let session = commands::open_session(config, &store_dir, Default::default());
            commands::history(&session, document.as_deref(), &mut out)
        }
        Command::Show { id, json } => {
            let mut session = commands::open_session(config, &store_dir, Default::default());
            commands::show(&mut session, &id, json, &mut out)
        }
        Command::Delete { id } => {
            let mut session = commands::open_session(config, &store_dir, Default::default());
            commands::delete(&mut session, &id, &mut out)
        }
    }
}

fn init_logging(config: &Config, verbose: bool) {
    let level = if verbose {
        LogLevel::Debug
    } else {
        config
            .logging
            .min_level
            .parse::<LogLevel>()
            .unwrap_or(LogLevel::Info)
    };
    let file_path = config.logging.file_path.as_ref().map(PathBuf::from);
    quire_logger::init(file_path, config.logging.max_entries, level);
}

fn print_log() {
    for entry in quire_logger::get_entries() {
        eprintln!(
            "[{}] {} {}: {}",
            entry.timestamp,
            entry.level.to_str(),
            entry.target,
            entry.message
        );
    }
}
