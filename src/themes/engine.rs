// Consolidation engine: folds per-batch theme maps into run-wide state.
//
// Batches are processed strictly in order, one at a time. Each prompt
// embeds the vocabulary produced by all earlier batches, which is what lets
// the service reuse themes instead of fragmenting near-duplicates across
// batches. Any classify/parse failure aborts the whole run: skipping a
// batch would silently orphan its articles.

use std::collections::HashSet;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::articles::Article;
use crate::error::{BatchFailure, BatchProcessingError, ConsolidationError};
use crate::llm::{Pacer, PacingPolicy};

use super::classifier::Classifier;
use super::models::{GlobalAssignment, ThemeMap, ThemeVocabulary};
use super::parser::ResponseParser;
use super::prompt::render_prompt;

/// Where the engine is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    /// 1-based batch index
    ProcessingBatch(usize),
    Done,
    Failed,
}

/// A later batch moved an article to a different theme.
///
/// Not an error: the latest write wins. It signals overlapping batches or a
/// confused response and is reported so it can be looked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentOverwriteAnomaly {
    pub article_id: String,
    pub previous: String,
    pub replacement: String,
    pub batch_index: usize,
}

/// What merging one batch changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Names that were not in the vocabulary before this batch
    pub added_themes: Vec<String>,
    /// Themes used in doc_to_theme without being declared anywhere
    pub implicit_themes: Vec<String>,
    pub overwrites: Vec<AssignmentOverwriteAnomaly>,
    /// Ids in the response that are not part of this run's input
    pub unknown_ids: Vec<String>,
    /// Batch articles still without a theme after the merge
    pub missing: Vec<String>,
}

/// The mutable state of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationState {
    vocabulary: ThemeVocabulary,
    assignment: GlobalAssignment,
}

impl ConsolidationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vocabulary(&self) -> &ThemeVocabulary {
        &self.vocabulary
    }

    pub fn assignment(&self) -> &GlobalAssignment {
        &self.assignment
    }

    /// Merge one batch's theme map.
    ///
    /// Batch articles are written first, in batch order, so the assignment's
    /// iteration order follows input order. Extra ids follow in id order:
    /// those belonging to the run are written (moves to a different theme
    /// are reported), anything else is dropped.
    pub fn merge(
        &mut self,
        batch_index: usize,
        batch: &[Article],
        known_ids: &HashSet<&str>,
        map: ThemeMap,
    ) -> MergeReport {
        let mut report = MergeReport::default();
        let ThemeMap {
            mut doc_to_theme,
            new_theme_names,
        } = map;

        for name in new_theme_names {
            if !self.vocabulary.contains(&name) {
                report.added_themes.push(name.clone());
                self.vocabulary.insert(name);
            }
        }

        for article in batch {
            match doc_to_theme.remove(article.id()) {
                Some(theme) => self.write(batch_index, article.id().to_string(), theme, &mut report),
                None if self.assignment.contains(article.id()) => {}
                None => report.missing.push(article.id().to_string()),
            }
        }

        for (article_id, theme) in doc_to_theme {
            if known_ids.contains(article_id.as_str()) {
                self.write(batch_index, article_id, theme, &mut report);
            } else {
                warn!(batch = batch_index, article_id = %article_id, "Response assigned an unknown article id, ignoring");
                report.unknown_ids.push(article_id);
            }
        }

        report
    }

    fn write(&mut self, batch_index: usize, article_id: String, theme: String, report: &mut MergeReport) {
        if !self.vocabulary.contains(&theme) {
            warn!(batch = batch_index, theme = %theme, "Theme used without being declared, adding to vocabulary");
            self.vocabulary.insert(theme.clone());
            report.added_themes.push(theme.clone());
            report.implicit_themes.push(theme.clone());
        }

        match self.assignment.assign(article_id.clone(), theme.clone()) {
            Some(previous) if previous == theme => {
                debug!(batch = batch_index, article_id = %article_id, "Article reassigned to the same theme");
            }
            Some(previous) => {
                warn!(
                    batch = batch_index,
                    article_id = %article_id,
                    previous = %previous,
                    replacement = %theme,
                    "Article reassigned by a later batch"
                );
                report.overwrites.push(AssignmentOverwriteAnomaly {
                    article_id,
                    previous,
                    replacement: theme,
                    batch_index,
                });
            }
            None => {}
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Consolidation {
    pub vocabulary: ThemeVocabulary,
    pub assignment: GlobalAssignment,
    pub anomalies: Vec<AssignmentOverwriteAnomaly>,
    pub batches: usize,
}

/// Progress snapshot handed to the observer after each merged batch.
pub struct BatchProgress<'s> {
    pub batch_index: usize,
    pub total_batches: usize,
    pub vocabulary: &'s ThemeVocabulary,
    pub assigned: usize,
}

type Observer<'a> = Box<dyn FnMut(&BatchProgress<'_>) + Send + 'a>;

/// Drives the batch loop. One engine per run.
pub struct ConsolidationEngine<'a> {
    classifier: Classifier<'a>,
    parser: ResponseParser<'a>,
    pacer: Pacer,
    cancel: CancellationToken,
    observer: Option<Observer<'a>>,
    phase: RunPhase,
}

impl<'a> ConsolidationEngine<'a> {
    pub fn new(classifier: Classifier<'a>, parser: ResponseParser<'a>) -> Self {
        Self {
            classifier,
            parser,
            pacer: Pacer::new(PacingPolicy::none()),
            cancel: CancellationToken::new(),
            observer: None,
            phase: RunPhase::Idle,
        }
    }

    pub fn with_pacing(mut self, policy: PacingPolicy) -> Self {
        self.pacer = Pacer::new(policy);
        self
    }

    /// Stop at the next batch boundary once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_observer(mut self, observer: impl FnMut(&BatchProgress<'_>) + Send + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Run every batch in order, starting from empty state.
    ///
    /// On failure or cancellation the partial state is dropped; only a
    /// fully merged run is ever returned.
    pub async fn run(&mut self, batches: &[&[Article]]) -> Result<Consolidation, ConsolidationError> {
        let known_ids: HashSet<&str> = batches.iter().flat_map(|b| b.iter().map(Article::id)).collect();
        let total = batches.len();
        let mut state = ConsolidationState::new();
        let mut anomalies = Vec::new();

        info!(batches = total, articles = known_ids.len(), "Consolidating themes");

        for (i, batch) in batches.iter().enumerate() {
            let batch_index = i + 1;

            let cancelled = tokio::select! {
                _ = self.cancel.cancelled() => true,
                _ = self.pacer.pace() => self.cancel.is_cancelled(),
            };
            if cancelled {
                self.phase = RunPhase::Failed;
                warn!(completed = i, "Run cancelled at batch boundary");
                return Err(ConsolidationError::Cancelled { completed_batches: i });
            }

            self.phase = RunPhase::ProcessingBatch(batch_index);
            let processed = self.process_batch(&mut state, batch_index, batch, &known_ids).await;
            self.pacer.finish();
            let report = match processed {
                Ok(report) => report,
                Err(e) => {
                    self.phase = RunPhase::Failed;
                    return Err(e.into());
                }
            };
            anomalies.extend(report.overwrites);

            info!(
                batch = batch_index,
                total = total,
                themes = state.vocabulary().len(),
                new_themes = report.added_themes.len(),
                "Processed batch"
            );

            if let Some(observer) = self.observer.as_mut() {
                observer(&BatchProgress {
                    batch_index,
                    total_batches: total,
                    vocabulary: state.vocabulary(),
                    assigned: state.assignment().len(),
                });
            }
            self.phase = RunPhase::Idle;
        }

        self.phase = RunPhase::Done;
        let ConsolidationState {
            vocabulary,
            assignment,
        } = state;
        Ok(Consolidation {
            vocabulary,
            assignment,
            anomalies,
            batches: total,
        })
    }

    /// Classify, parse and merge one batch into `state`.
    pub async fn process_batch(
        &self,
        state: &mut ConsolidationState,
        batch_index: usize,
        batch: &[Article],
        known_ids: &HashSet<&str>,
    ) -> Result<MergeReport, BatchProcessingError> {
        let fail = |cause: BatchFailure| BatchProcessingError { batch_index, cause };

        let prompt = render_prompt(state.vocabulary(), batch);
        let raw = self
            .classifier
            .classify(&prompt)
            .await
            .map_err(|e| fail(e.into()))?;
        let map = self.parser.parse(&raw).await.map_err(|e| fail(e.into()))?;

        debug!(
            batch = batch_index,
            assignments = map.doc_to_theme.len(),
            declared = map.new_theme_names.len(),
            "Decoded theme map"
        );

        let report = state.merge(batch_index, batch, known_ids, map);
        if !report.missing.is_empty() {
            return Err(fail(BatchFailure::IncompleteAssignment {
                missing: report.missing,
            }));
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn articles(ids: &[&str]) -> Vec<Article> {
        ids.iter().map(|id| Article::new(*id, format!("summary {id}"), None)).collect()
    }

    fn theme_map(pairs: &[(&str, &str)], new: &[&str]) -> ThemeMap {
        ThemeMap {
            doc_to_theme: pairs
                .iter()
                .map(|(id, t)| (id.to_string(), t.to_string()))
                .collect::<BTreeMap<_, _>>(),
            new_theme_names: new.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn merge_follows_batch_order_not_response_order() {
        let batch = articles(&["10", "2", "7"]);
        let known: HashSet<&str> = batch.iter().map(Article::id).collect();
        let mut state = ConsolidationState::new();
        let report = state.merge(
            1,
            &batch,
            &known,
            theme_map(&[("7", "A"), ("2", "B"), ("10", "A")], &["A", "B"]),
        );
        assert!(report.missing.is_empty());
        let order: Vec<&str> = state.assignment().iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec!["10", "2", "7"]);
    }

    #[test]
    fn duplicate_new_theme_names_are_no_ops() {
        let batch = articles(&["0"]);
        let known: HashSet<&str> = batch.iter().map(Article::id).collect();
        let mut state = ConsolidationState::new();
        state.vocabulary.insert("A");
        let report = state.merge(2, &batch, &known, theme_map(&[("0", "A")], &["A", "A"]));
        assert!(report.added_themes.is_empty());
        assert_eq!(state.vocabulary().len(), 1);
    }

    #[test]
    fn undeclared_theme_is_added_implicitly() {
        let batch = articles(&["0", "1"]);
        let known: HashSet<&str> = batch.iter().map(Article::id).collect();
        let mut state = ConsolidationState::new();
        let report = state.merge(
            1,
            &batch,
            &known,
            theme_map(&[("0", "Sleep"), ("1", "Sleep")], &[]),
        );
        assert_eq!(report.implicit_themes, vec!["Sleep".to_string()]);
        assert!(state.vocabulary().contains("Sleep"));
    }

    #[test]
    fn unknown_ids_are_dropped() {
        let batch = articles(&["0"]);
        let known: HashSet<&str> = batch.iter().map(Article::id).collect();
        let mut state = ConsolidationState::new();
        let report = state.merge(1, &batch, &known, theme_map(&[("0", "A"), ("99", "A")], &["A"]));
        assert_eq!(report.unknown_ids, vec!["99".to_string()]);
        assert!(!state.assignment().contains("99"));
    }

    #[test]
    fn missing_batch_articles_are_reported() {
        let batch = articles(&["0", "1", "2"]);
        let known: HashSet<&str> = batch.iter().map(Article::id).collect();
        let mut state = ConsolidationState::new();
        let report = state.merge(1, &batch, &known, theme_map(&[("1", "A")], &["A"]));
        assert_eq!(report.missing, vec!["0".to_string(), "2".to_string()]);
    }

    #[test]
    fn overwrite_latest_wins_and_is_reported() {
        let first = articles(&["0", "1"]);
        let second = articles(&["2"]);
        let known: HashSet<&str> = first.iter().chain(second.iter()).map(Article::id).collect();
        let mut state = ConsolidationState::new();
        state.merge(1, &first, &known, theme_map(&[("0", "A"), ("1", "A")], &["A"]));
        let report = state.merge(2, &second, &known, theme_map(&[("2", "B"), ("0", "B")], &["B"]));
        assert_eq!(state.assignment().get("0"), Some("B"));
        assert_eq!(
            report.overwrites,
            vec![AssignmentOverwriteAnomaly {
                article_id: "0".to_string(),
                previous: "A".to_string(),
                replacement: "B".to_string(),
                batch_index: 2,
            }]
        );
    }

    #[test]
    fn same_theme_rewrite_is_not_an_anomaly() {
        let first = articles(&["0"]);
        let second = articles(&["1"]);
        let known: HashSet<&str> = first.iter().chain(second.iter()).map(Article::id).collect();
        let mut state = ConsolidationState::new();
        state.merge(1, &first, &known, theme_map(&[("0", "A")], &["A"]));
        let report = state.merge(2, &second, &known, theme_map(&[("1", "A"), ("0", "A")], &[]));
        assert!(report.overwrites.is_empty());
        assert_eq!(state.assignment().get("0"), Some("A"));
        assert_eq!(state.assignment().len(), 2);
    }
}
