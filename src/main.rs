use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use theme_mapper::config::Config;
use theme_mapper::llm::openai::OpenAiGenerator;
use theme_mapper::llm::{ChatMessage, GenerationOptions, TextGenerator};

/// Theme Mapper: group article summaries into a small set of named themes.
///
/// Articles are sent to a chat model batch by batch; each batch sees the
/// themes created by every batch before it, so related articles end up
/// under the same name instead of near-duplicates.
#[derive(Parser)]
#[command(name = "theme-mapper", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster summarized articles (CSV or JSON with Id, Summary, Link) into themes
    Cluster {
        /// Input table (.csv or .json)
        input: PathBuf,

        /// Articles per request (default: THEME_MAPPER_BATCH_SIZE or 5)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Only cluster the first N articles
        #[arg(long)]
        limit: Option<usize>,

        /// Output directory (default: THEME_MAPPER_OUTPUT_DIR or ./results)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Classification model (default: THEME_MAPPER_MODEL or gpt-4)
        #[arg(long)]
        model: Option<String>,

        /// Fail on the first malformed response instead of attempting a repair
        #[arg(long)]
        no_repair: bool,
    },

    /// Validate configuration and the API key with a minimal request
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("theme_mapper=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Cluster {
            input,
            batch_size,
            limit,
            out,
            model,
            no_repair,
        } => {
            let mut config = Config::load()?;
            if let Some(batch_size) = batch_size {
                config.batch_size = batch_size;
            }
            if let Some(out) = out {
                config.output_dir = out;
            }
            if let Some(model) = model {
                config.model = model;
            }
            config.require_openai()?;
            config.require_valid_batching()?;

            let rows = theme_mapper::articles::loader::load_rows(&input, limit)
                .with_context(|| format!("Failed to load articles from {}", input.display()))?;
            println!("Loaded {} articles from {}", rows.len(), input.display());

            let generator = create_generator(&config, &config.model)?;
            let repair = if no_repair {
                None
            } else {
                Some(create_generator(&config, &config.repair_model)?)
            };

            let cancel = CancellationToken::new();
            let on_ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, stopping after the current batch");
                    on_ctrl_c.cancel();
                }
            });

            let options = theme_mapper::pipeline::ClusterOptions {
                batch_size: config.batch_size,
                temperature: config.temperature,
                pacing: config.pacing,
                show_progress: true,
            };

            println!(
                "Clustering with {} ({} per batch)...",
                config.model, config.batch_size
            );
            let run = theme_mapper::pipeline::cluster::run(
                rows,
                &generator,
                repair.as_ref().map(|g| g as &dyn TextGenerator),
                &options,
                cancel,
            )
            .await
            .context("Clustering failed")?;

            theme_mapper::output::terminal::display_theme_groups(&run.groups, &run.articles);
            theme_mapper::output::terminal::display_anomalies(&run.consolidation.anomalies);

            let (themes_path, summary_path) = theme_mapper::output::json::save_results(
                &config.output_dir,
                &run.groups,
                &run.articles,
            )?;

            println!("{}", "Clustering complete.".bold());
            println!("  Batches: {}", run.consolidation.batches);
            println!("  Themes: {}", run.groups.len());
            println!("  Saved: {}", themes_path.display());
            println!("  Saved: {}", summary_path.display());
        }

        Commands::Check => {
            let config = Config::load()?;
            config.require_openai()?;
            config.require_valid_batching()?;

            println!("Endpoint: {}", config.openai_base_url);
            for model in [&config.model, &config.repair_model] {
                let generator = create_generator(&config, model)?;
                let options = GenerationOptions {
                    temperature: 0.0,
                    max_tokens: Some(1),
                };
                generator
                    .generate(&[ChatMessage::user("test")], &options)
                    .await
                    .with_context(|| format!("API key check failed for model {model}"))?;
                info!(generator = generator.name(), "Credential check passed");
                println!("  {} {}", "ok".green(), generator.model());
            }
            println!("\n{}", "Configuration looks good.".bold());
        }
    }

    Ok(())
}

fn create_generator(config: &Config, model: &str) -> Result<OpenAiGenerator> {
    OpenAiGenerator::new(
        config.openai_api_key.clone(),
        &config.openai_base_url,
        model,
        config.request_timeout,
    )
    .context("Failed to create chat client")
}
