//! Vitae CLI - professional knowledge graph on the command line.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vitae")]
#[command(author, version, about = "Vitae - local professional knowledge graph", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (sets the log filter to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new Vitae project
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Ingest entities and relationships from a JSON file
    Ingest {
        /// JSON file with entities and relationships
        file: String,
    },

    /// Rank entities against a request context
    Match {
        /// Entity types to look for (e.g., "skill,role")
        #[arg(short, long)]
        types: Option<String>,

        /// Intent keywords (comma-separated)
        #[arg(short, long)]
        keywords: Option<String>,

        /// Context weight in [0, 1]
        #[arg(short = 'w', long)]
        weight: Option<f64>,

        /// Sibling field values already filled in (comma-separated)
        #[arg(short, long)]
        siblings: Option<String>,

        /// Maximum results to return
        #[arg(short, long)]
        max_results: Option<usize>,
    },

    /// Fuzzy-search entities by label
    Search {
        /// Search query
        query: String,

        /// Minimum similarity in [0, 1]
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Record a verdict on a past suggestion and learn from it
    Feedback {
        /// Entity the suggestion came from (uuid)
        #[arg(short, long)]
        entity: String,

        /// Field the suggestion filled
        #[arg(short, long)]
        field: String,

        /// The suggestion that was made
        #[arg(short, long)]
        suggestion: String,

        /// Verdict: correct, partiallycorrect, incorrect, or ignored
        #[arg(long)]
        verdict: String,

        /// What the user changed the suggestion to
        #[arg(long)]
        edit: Option<String>,

        /// Other entities the suggestion drew on (comma-separated uuids)
        #[arg(long)]
        affected: Option<String>,
    },

    /// Replay the full feedback history against the graph
    Learn,

    /// Show per-field accuracy patterns and improvement suggestions
    Patterns,

    /// Show graph and feedback statistics
    Stats,

    /// Save the current profile under a name
    Save {
        /// Snapshot name
        name: String,
    },

    /// Load a named profile snapshot
    Load {
        /// Snapshot name
        name: String,
    },

    /// List saved snapshots
    Snapshots,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Ingest { file } => commands::ingest::run(&file),
        Commands::Match {
            types,
            keywords,
            weight,
            siblings,
            max_results,
        } => commands::matching::run(types, keywords, weight, siblings, max_results),
        Commands::Search { query, threshold } => commands::search::run(&query, threshold),
        Commands::Feedback {
            entity,
            field,
            suggestion,
            verdict,
            edit,
            affected,
        } => commands::feedback::run(&entity, &field, &suggestion, &verdict, edit, affected),
        Commands::Learn => commands::learn::run(),
        Commands::Patterns => commands::patterns::run(),
        Commands::Stats => commands::stats::run(),
        Commands::Save { name } => commands::session::save(&name),
        Commands::Load { name } => commands::session::load(&name),
        Commands::Snapshots => commands::session::list(),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
