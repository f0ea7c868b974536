//! # Lunai CLI (`lunai`)
//!
//! The `lunai` binary is the command-line interface to the Lunai ingestion
//! service. Every command reads `config.json` for the customer name and the
//! service host, performs one operation, and prints the result to stdout.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lunai get-customer` | Show the customer named in the config |
//! | `lunai ingest [folder]` | Mirror a folder into the datastore and purge stale documents |
//! | `lunai ingest-web <domain>` | Crawl a website with route rules |
//! | `lunai vec-dstore` | Vectorize all ingested documents |
//! | `lunai vec-web` | Vectorize all ingested websites |
//! | `lunai query "<text>"` | Query the vector store |
//! | `lunai create-project <title> <topic>` | Create a project and remember it |
//! | `lunai get-project` | Show the current project |
//! | `lunai generate-ideas` | Interactively generate project ideas |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lunai::config;
use lunai::progress::ProgressMode;
use lunai::{ingest, project, session, vectorstore, websites};

/// Lunai CLI: sync documents and websites into the Lunai service and query
/// the resulting vector store.
#[derive(Parser)]
#[command(
    name = "lunai",
    about = "Lunai: sync documents and websites into the Lunai service and query its vector store",
    version
)]
struct Cli {
    /// Path to the configuration file (JSON).
    ///
    /// Holds `name` (the customer), `currentProjectId` and optionally `host`.
    #[arg(long, global = true, default_value = "./config.json")]
    config: PathBuf,

    /// Enable debug logging (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Progress output on stderr. Defaults to `human` on a terminal, `off` otherwise.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Gets a customer based on the name in config.json.
    GetCustomer,

    /// Ingest all documents with the same folder structure as the passed folder.
    ///
    /// Running it again on the same folder after changes keeps the remote
    /// store in sync: new content is uploaded, unchanged content is skipped,
    /// and documents no longer present locally are purged.
    Ingest {
        /// Folder to construct the document store from.
        #[arg(default_value = "./docstore")]
        folder: PathBuf,
    },

    /// Ingest a website and its pages based on the rules provided.
    IngestWeb {
        /// Domain to parse. Must include the protocol (http/https).
        domain: String,

        /// Insert the website into the database instead of only listing the pages.
        #[arg(long)]
        insert: bool,

        /// A comma-separated list of regexps that page routes MUST match.
        #[arg(long, default_value = "")]
        whitelist: String,

        /// A comma-separated list of regexps that page routes can NOT match.
        #[arg(long, default_value = "")]
        blacklist: String,
    },

    /// Vectorize all ingested documents.
    VecDstore,

    /// Vectorize all ingested websites.
    VecWeb,

    /// Queries the vector store, returning document and website page matches.
    Query {
        /// The query text.
        query: String,

        /// How many of each type to return from the vector query.
        #[arg(long, default_value_t = 3)]
        k: u32,

        /// Include the entire content of each match in the response.
        #[arg(long)]
        include: bool,
    },

    /// Creates a project for the customer and writes its id to the config file.
    CreateProject { title: String, topic: String },

    /// Gets the project named by `currentProjectId` in the config file.
    GetProject,

    /// Generate project ideas, refining them with feedback until an empty line.
    GenerateIdeas {
        /// How many project ideas to generate.
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=5))]
        k: u8,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lunai=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lunai=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::GetCustomer => {
            session::run_get_customer(&cfg)?;
        }
        Commands::Ingest { folder } => {
            let progress = cli.progress.unwrap_or_else(ProgressMode::default_for_tty);
            ingest::run_ingest(&cfg, &folder, progress)?;
        }
        Commands::IngestWeb {
            domain,
            insert,
            whitelist,
            blacklist,
        } => {
            websites::run_ingest_web(&cfg, &domain, insert, &whitelist, &blacklist)?;
        }
        Commands::VecDstore => {
            ingest::run_vectorize_documents(&cfg)?;
        }
        Commands::VecWeb => {
            websites::run_vectorize_websites(&cfg)?;
        }
        Commands::Query { query, k, include } => {
            vectorstore::run_query(&cfg, &query, k, include)?;
        }
        Commands::CreateProject { title, topic } => {
            project::run_create_project(&cli.config, &cfg, &title, &topic)?;
        }
        Commands::GetProject => {
            project::run_get_project(&cfg)?;
        }
        Commands::GenerateIdeas { k } => {
            project::run_generate_ideas(&cfg, k)?;
        }
    }

    Ok(())
}
