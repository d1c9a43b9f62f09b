//! Stocky mood pipeline CLI
//!
//! Resolves stock tags, fetches headlines, and scores their sentiment.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stocky::{
    config::Config,
    news::NewsFetcher,
    pipeline::{load_blocks, Pipeline},
    reference::update_reference,
    resolver::match_stock_names,
    scorer::{assign_sentiment_weights, score_mood},
    types::NewsDigest,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stocky")]
#[command(about = "Score stock sentiment from news headlines")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (defaults apply when absent)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole pipeline for a blocks file
    Run {
        /// JSON array of blocks, each with an optional `tag`
        #[arg(short, long)]
        blocks: PathBuf,
        /// Write the full report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Search results read per stock
        #[arg(short, long)]
        max_results: Option<usize>,
    },
    /// Map block tags to stock names
    Resolve {
        #[arg(short, long)]
        blocks: PathBuf,
    },
    /// Fetch headlines for stock names
    News {
        names: Vec<String>,
        #[arg(short, long)]
        max_results: Option<usize>,
    },
    /// Fetch headlines and describe their mood with the language model
    Describe {
        names: Vec<String>,
    },
    /// Score a mood description from 1 to 5
    Score {
        text: String,
    },
    /// Scrape the top stocks table and rewrite the reference file
    UpdateReference {
        /// Ranking page to scrape instead of the configured source
        #[arg(short, long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    match cli.command {
        Commands::Run {
            blocks,
            output,
            max_results,
        } => run_pipeline(config, blocks, output, max_results).await,
        Commands::Resolve { blocks } => resolve(config, blocks),
        Commands::News { names, max_results } => show_news(config, names, max_results).await,
        Commands::Describe { names } => describe(config, names).await,
        Commands::Score { text } => {
            let weight = score_mood(&text);
            println!("{} ({})", weight, weight.label());
            Ok(())
        }
        Commands::UpdateReference { url } => refresh_reference(config, url).await,
    }
}

async fn run_pipeline(
    mut config: Config,
    blocks: PathBuf,
    output: Option<PathBuf>,
    max_results: Option<usize>,
) -> anyhow::Result<()> {
    if let Some(max) = max_results {
        config.news.max_results = max;
    }

    let blocks = load_blocks(&blocks)?;
    tracing::info!("Loaded {} blocks", blocks.len());

    let pipeline = Pipeline::from_config(config)?;
    let report = pipeline.run(&blocks).await;

    println!("\nStock sentiment\n");
    println!("{:<8} {:<40} {:>9} {}", "TAG", "NAME", "HEADLINES", "WEIGHT");
    println!("{}", "-".repeat(72));
    for line in report.summary_lines() {
        println!("{}", line);
    }
    if report.moods.is_fallback() {
        println!("\nNote: language model unavailable, moods are the neutral fallback.");
    }

    if let Some(path) = output {
        report.write_json(&path)?;
        tracing::info!("Report written to {}", path.display());
    }

    Ok(())
}

async fn refresh_reference(config: Config, url: Option<String>) -> anyhow::Result<()> {
    let stocks = update_reference(&config.reference, url.as_deref()).await?;

    println!("{:<5} {:<8} {:<40} {:>12} {:>12}", "RANK", "TAG", "NAME", "PRICE", "MARKET CAP");
    println!("{}", "-".repeat(81));
    for stock in &stocks {
        println!(
            "{:<5} {:<8} {:<40} {:>12} {:>12}",
            stock.rank.unwrap_or_default(),
            stock.tag,
            stock.name,
            stock.stock_price.as_deref().unwrap_or("-"),
            stock.market_cap.as_deref().unwrap_or("-")
        );
    }
    println!("\nSaved {} stocks to {}", stocks.len(), config.reference.resolved_path().display());

    Ok(())
}

fn resolve(config: Config, blocks: PathBuf) -> anyhow::Result<()> {
    let blocks = load_blocks(&blocks)?;
    let mapping = match_stock_names(&blocks, config.reference.resolved_path());

    if mapping.is_empty() {
        println!("No tags resolved.");
    }
    for (tag, name) in &mapping {
        println!("{:<8} {}", tag, name);
    }

    Ok(())
}

async fn fetch(config: &Config, names: &[String], max_results: Option<usize>) -> anyhow::Result<NewsDigest> {
    let fetcher = NewsFetcher::new(&config.news)?;
    let max_results = max_results.unwrap_or(config.news.max_results);
    Ok(fetcher.find_top_news(names, max_results).await)
}

async fn show_news(config: Config, names: Vec<String>, max_results: Option<usize>) -> anyhow::Result<()> {
    let news = fetch(&config, &names, max_results).await?;

    for (stock_name, articles) in &news {
        println!("\n{} ({} articles)", stock_name, articles.len());
        for article in articles {
            println!("  - {}\n    {}", article.title, article.url);
        }
    }

    Ok(())
}

async fn describe(config: Config, names: Vec<String>) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let news = pipeline
        .fetcher()
        .find_top_news(&names, pipeline.config().news.max_results)
        .await;
    let moods = pipeline.describe(&news).await;
    let weights = assign_sentiment_weights(&moods.moods);

    for (stock_name, mood) in &moods.moods {
        let weight = weights.get(stock_name).copied().unwrap_or_default();
        println!("\n{} [{}]\n{}", stock_name, weight, mood);
    }
    if moods.is_fallback() {
        println!("\nNote: language model unavailable, moods are the neutral fallback.");
    }

    Ok(())
}
