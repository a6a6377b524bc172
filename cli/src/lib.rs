use anyhow::{Error, Result};
use clap::{Parser, Subcommand};
use log::info;
use ontotree::api::Browser;
use ontotree::config::Config;
use ontotree::errors::BrowseError;
use ontotree::export::ExportFormat;
use ontotree::request::{parse_sources, Request};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ontotree")]
#[command(about = "Compare ontology hierarchies from several sources side by side")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Verbose mode - sets the RUST_LOG level to info, defaults to warning level
    #[clap(long, short, action, default_value = "false", global = true)]
    verbose: bool,
    /// Debug mode - sets the RUST_LOG level to debug, defaults to warning level
    #[clap(long, action, default_value = "false", global = true)]
    debug: bool,
    /// JSON configuration file; command line flags override its values
    #[clap(long, short, global = true)]
    config: Option<PathBuf>,
    /// Directory holding one database per source
    #[clap(long = "db-dir", global = true)]
    db_dir: Option<PathBuf>,
    /// Build each source's column on its own thread
    #[clap(long, action, global = true)]
    parallel: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render the comparison page for a term
    Page {
        /// Comma-separated source names, in display order
        #[clap(long, short)]
        sources: String,
        /// The term to show, defaults to the class root
        #[clap(long)]
        id: Option<String>,
        /// Write the page to this file instead of stdout
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
    /// Search the first source's labels and synonyms, printing JSON
    Search {
        /// Comma-separated source names; only the first is searched
        #[clap(long, short)]
        sources: String,
        /// The text to look for
        #[clap(long, short)]
        text: String,
    },
    /// Answer one CGI request from QUERY_STRING
    Cgi,
    /// List the sources found in the database directory
    Sources {
        /// Print the list as JSON
        #[clap(long, action)]
        json: bool,
    },
    /// Print a term's stanza as RDF
    Stanza {
        /// The source to read from
        #[clap(long, short)]
        source: String,
        /// The term whose stanza to print
        #[clap(long)]
        id: String,
        /// Output format: turtle or ntriples
        #[clap(long, short, default_value = "turtle")]
        format: String,
    },
}

pub fn run() -> Result<()> {
    ontotree::api::init_logging();
    let cmd = Cli::parse();
    execute(cmd)
}

pub fn run_from_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    ontotree::api::init_logging();
    let cmd = Cli::try_parse_from(args).map_err(Error::from)?;
    execute(cmd)
}

fn load_config(cmd: &Cli) -> Result<Config> {
    let mut config = match &cmd.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(dir) = &cmd.db_dir {
        config.database_dir = dir.clone();
    }
    if cmd.parallel {
        config.parallel = true;
    }
    Ok(config)
}

fn execute(cmd: Cli) -> Result<()> {
    // CLI flags take precedence over RUST_LOG (possibly set from ONTOTREE_LOG); default is "warn".
    if cmd.debug {
        std::env::set_var("RUST_LOG", "debug");
    } else if cmd.verbose {
        std::env::set_var("RUST_LOG", "info");
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    let _ = env_logger::try_init();

    let config = load_config(&cmd)?;
    if cmd.verbose || cmd.debug {
        config.print();
    }
    let browser = Browser::new(config)?;

    match cmd.command {
        Commands::Page {
            sources,
            id,
            output,
        } => {
            let sources = parse_sources(&sources)?;
            let id = id.unwrap_or_else(|| browser.config().vocabulary.class_root.clone());
            let html = browser.page(&sources, &id)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, html)?;
                    info!("Wrote page for {} to {}", id, path.display());
                }
                None => println!("{html}"),
            }
        }
        Commands::Search { sources, text } => {
            let sources = parse_sources(&sources)?;
            let value = browser.search_json(&sources, &text);
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Commands::Cgi => {
            let query = std::env::var("QUERY_STRING").unwrap_or_default();
            let request = Request::from_query(&query, &browser.config().vocabulary)?;
            let response = browser.handle(&request)?;
            let mut stdout = std::io::stdout().lock();
            write!(stdout, "Content-Type: {}\r\n\r\n", response.content_type)?;
            stdout.write_all(response.body.as_bytes())?;
            stdout.flush()?;
        }
        Commands::Sources { json } => {
            let sources = browser.list_sources()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sources)?);
            } else {
                for source in sources {
                    println!("{source}");
                }
            }
        }
        Commands::Stanza { source, id, format } => {
            let format: ExportFormat = format.parse()?;
            print!("{}", browser.export_stanza(&source, &id, format)?);
        }
    }

    Ok(())
}

/// Exit status for a failed run: 2 for a malformed request, 1 otherwise.
pub fn exit_code(error: &Error) -> i32 {
    match error.downcast_ref::<BrowseError>() {
        Some(BrowseError::MissingParameter(_))
        | Some(BrowseError::EmptySourceList)
        | Some(BrowseError::InvalidSourceName(_)) => 2,
        _ => 1,
    }
}
