// Clustering pipeline: rows -> articles -> batches -> themes -> groups.
//
// Owns exactly one run. Structural problems (bad rows, bad batch size) are
// caught before the first call to the service; after that the engine runs
// batch by batch and either returns fully merged state or fails.

use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::articles::{build_articles, Article, ArticleRow};
use crate::error::RunError;
use crate::llm::{PacingPolicy, TextGenerator};
use crate::themes::batcher::batch;
use crate::themes::classifier::{Classifier, DEFAULT_TEMPERATURE};
use crate::themes::parser::ResponseParser;
use crate::themes::reshape::reshape;
use crate::themes::{Consolidation, ConsolidationEngine, ThemeGroups};

/// Knobs for one clustering run.
#[derive(Debug, Clone)]
pub struct ClusterOptions {
    pub batch_size: usize,
    pub temperature: f64,
    pub pacing: PacingPolicy,
    /// Draw an indicatif progress bar on stderr
    pub show_progress: bool,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            batch_size: crate::config::DEFAULT_BATCH_SIZE,
            temperature: DEFAULT_TEMPERATURE,
            pacing: PacingPolicy::none(),
            show_progress: false,
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct ClusterRun {
    pub articles: Vec<Article>,
    pub consolidation: Consolidation,
    pub groups: ThemeGroups,
}

/// Run the whole clustering pipeline over raw input rows.
///
/// `repair` enables the repair pass on malformed responses; pass `None`
/// for strict decoding only.
pub async fn run(
    rows: Vec<ArticleRow>,
    generator: &dyn TextGenerator,
    repair: Option<&dyn TextGenerator>,
    options: &ClusterOptions,
    cancel: CancellationToken,
) -> Result<ClusterRun, RunError> {
    let articles = build_articles(rows)?;
    let batches = batch(&articles, options.batch_size)?;


    let pb = if options.show_progress {
        ProgressBar::new(batches.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    if let Ok(style) = ProgressStyle::default_bar().template("  Batches [{bar:30}] {pos}/{len} {msg}") {
        pb.set_style(style);
    }

    let parser = match repair {
        Some(repair) => ResponseParser::with_repair(repair),
        None => ResponseParser::strict(),
    };
    info!(
        articles = articles.len(),
        batches = batches.len(),
        batch_size = options.batch_size,
        generator = generator.name(),
        repair = parser.has_repair(),
        "Starting clustering run"
    );

    let progress = pb.clone();
    let mut engine = ConsolidationEngine::new(
        Classifier::with_temperature(generator, options.temperature),
        parser,
    )
    .with_pacing(options.pacing)
    .with_cancellation(cancel)
    .with_observer(move |p| {
        progress.set_position(p.batch_index as u64);
        progress.set_message(format!("{} themes", p.vocabulary.len()));
    });

    let result = engine.run(&batches).await;
    pb.finish_and_clear();
    let consolidation = result?;

    let groups = reshape(&consolidation.assignment);
    info!(
        themes = groups.len(),
        anomalies = consolidation.anomalies.len(),
        "Clustering run complete"
    );

    Ok(ClusterRun {
        articles,
        consolidation,
        groups,
    })
}
