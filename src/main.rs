//! basket-rules CLI: mine and inspect association rules from order files.
//!
//! # Usage
//!
//! ```bash
//! # Mine rules, print the top 20 as JSON
//! basket-rules mine orders.json --min-support 0.02 --top 20
//!
//! # Top rules by each metric
//! basket-rules analyze orders.json --top 5
//!
//! # Show the formulas for one pair
//! basket-rules explain orders.json coffee filter
//!
//! # What to suggest next to an item
//! basket-rules recommend orders.json coffee
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use basket_rules::analysis::{analyze, explain_pair, list_rules, recommend_for, Listing};
use basket_rules::transaction::load_transactions;
use basket_rules::{AssociationRuleEngine, MiningConfig, Result, Transaction};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "basket-rules")]
#[command(about = "Frequently-bought-together association rules from order history")]
#[command(version)]
struct Cli {
    /// JSON config file with thresholds and caps
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mine rules and print them as JSON
    Mine {
        /// Orders or raw transactions (JSON)
        input: PathBuf,

        /// Override minimum support
        #[arg(long)]
        min_support: Option<f64>,

        /// Override minimum confidence
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Print only the first N rules (all when omitted)
        #[arg(long)]
        top: Option<usize>,
    },

    /// Print the top rules by support, confidence and lift
    Analyze {
        /// Orders or raw transactions (JSON)
        input: PathBuf,

        /// Rules per metric
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Recompute support, confidence and lift for one pair
    Explain {
        /// Orders or raw transactions (JSON)
        input: PathBuf,

        /// First item
        item_a: String,

        /// Second item
        item_b: String,
    },

    /// Suggest items to show next to ITEM
    Recommend {
        /// Orders or raw transactions (JSON)
        input: PathBuf,

        /// Item already in the basket
        item: String,

        /// Maximum suggestions
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => MiningConfig::load(path)?,
        None => MiningConfig::default(),
    };

    match cli.command {
        Commands::Mine {
            input,
            min_support,
            min_confidence,
            top,
        } => {
            let config = MiningConfig {
                min_support: min_support.unwrap_or(config.min_support),
                min_confidence: min_confidence.unwrap_or(config.min_confidence),
                ..config
            };
            cmd_mine(&input, config, top)
        }
        Commands::Analyze { input, top } => cmd_analyze(&input, config, top),
        Commands::Explain {
            input,
            item_a,
            item_b,
        } => cmd_explain(&input, config, &item_a, &item_b),
        Commands::Recommend { input, item, limit } => cmd_recommend(&input, config, &item, limit),
    }
}

fn load(input: &Path, engine: &AssociationRuleEngine) -> Result<Vec<Transaction>> {
    let transactions = load_transactions(input, &engine.extractor())?;
    tracing::info!(
        path = %input.display(),
        transactions = transactions.len(),
        "loaded transactions"
    );
    Ok(transactions)
}

fn cmd_mine(input: &Path, config: MiningConfig, top: Option<usize>) -> Result<()> {
    let engine = AssociationRuleEngine::in_memory(config)?;
    let transactions = load(input, &engine)?;
    let rules = engine.mine(&transactions);

    let listing = top.map_or(Listing::All, Listing::Top);
    let rules = list_rules(&rules, listing);
    println!("{}", serde_json::to_string_pretty(&rules)?);
    Ok(())
}

fn cmd_analyze(input: &Path, config: MiningConfig, top: usize) -> Result<()> {
    let engine = AssociationRuleEngine::in_memory(config)?;
    let transactions = load(input, &engine)?;
    let analysis = analyze(&engine.mine(&transactions), top);
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

fn cmd_explain(input: &Path, config: MiningConfig, item_a: &str, item_b: &str) -> Result<()> {
    let engine = AssociationRuleEngine::in_memory(config)?;
    let transactions = load(input, &engine)?;
    let explanation = explain_pair(&transactions, item_a, item_b);

    println!("Pair Breakdown");
    println!("==============");
    println!("Transactions: {}", explanation.total_transactions);
    println!();
    print!("{explanation}");
    Ok(())
}

fn cmd_recommend(input: &Path, config: MiningConfig, item: &str, limit: usize) -> Result<()> {
    let engine = AssociationRuleEngine::in_memory(config)?;
    let transactions = load(input, &engine)?;
    let suggestions = recommend_for(&engine.mine(&transactions), item, limit);

    if suggestions.is_empty() {
        println!("No rules fire for {item}");
    } else {
        for (rank, suggestion) in suggestions.iter().enumerate() {
            println!("{:>2}. {suggestion}", rank + 1);
        }
    }
    Ok(())
}
