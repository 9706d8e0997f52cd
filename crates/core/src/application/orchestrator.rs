// Search Orchestrator - drives one SearchSpec across its configured sources
//
// Five ordered phases: prepare, connect, per-source collection, result
// processing, finalize. Cancellation is checked after phases 1 and 2 and
// before each source; an in-flight source batch finishes and is persisted
// before the unwind.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::activity::ActivityRecorder;
use crate::application::cancel::CancelToken;
use crate::application::registry::ProgressReporter;
use crate::domain::progress::TOTAL_STEPS;
use crate::domain::{
    CompensationRange, ExecutionId, ProgressSnapshot, RawListing, ResultRecord, ReviewState,
    SearchSpec,
};
use crate::error::Result;
use crate::port::{IdProvider, MatchScorer, ResultRepository, SourceAdapter, TimeProvider};

/// Named set of source adapters available to the engine.
///
/// Built by the host (daemon wires one adapter per configured feed); the
/// orchestrator resolves spec source names against it.
pub struct AdapterSet {
    adapters: HashMap<String, Arc<dyn SourceAdapter>>,
}

impl AdapterSet {
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        self.adapters.insert(adapter.name().to_string(), adapter);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.adapters.keys().cloned().collect()
    }
}

impl Default for AdapterSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Final counters of one orchestrated run
#[derive(Debug, Clone, Copy, Default)]
pub struct OrchestratorOutcome {
    /// True when the run unwound at a cancellation checkpoint
    pub cancelled: bool,
    pub total: i64,
    pub new: i64,
    pub duplicates: i64,
}

/// Orchestrates one execution of a SearchSpec
pub struct SearchOrchestrator {
    result_repo: Arc<dyn ResultRepository>,
    scorer: Arc<dyn MatchScorer>,
    adapters: Arc<AdapterSet>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    activity: ActivityRecorder,
}

impl SearchOrchestrator {
    pub fn new(
        result_repo: Arc<dyn ResultRepository>,
        scorer: Arc<dyn MatchScorer>,
        adapters: Arc<AdapterSet>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        activity: ActivityRecorder,
    ) -> Self {
        Self {
            result_repo,
            scorer,
            adapters,
            id_provider,
            time_provider,
            activity,
        }
    }

    /// Run the spec to completion or cancellation.
    ///
    /// Per-source failures are contained here; an Err return is a genuine
    /// orchestration failure that the manager records as FAILED.
    pub async fn run(
        &self,
        spec: &SearchSpec,
        execution_id: &ExecutionId,
        progress: &ProgressReporter,
        cancel: &CancelToken,
    ) -> Result<OrchestratorOutcome> {
        let started = self.time_provider.now_millis();
        let mut outcome = OrchestratorOutcome::default();

        // Phase 1: parameter preparation
        self.step(progress, "preparing search parameters", 0, 0, None)
            .await;
        spec.validate()?;

        // Dedup keys of previously captured results, when the spec asks
        // for advisory pre-filtering
        let mut seen_keys: HashSet<String> = if spec.prefilter_duplicates {
            self.result_repo.existing_dedup_keys(&spec.id).await?
        } else {
            HashSet::new()
        };

        self.activity.info(
            execution_id,
            format!("Starting search: {}", spec.params.summary()),
            serde_json::json!({
                "search_id": spec.id,
                "sources": spec.sources,
                "max_results_per_source": spec.max_results_per_source,
            }),
        );
        self.step(progress, "parameters prepared", 1, 0, None).await;

        if cancel.is_cancelled() {
            return Ok(self.observe_cancellation(execution_id, outcome));
        }

        // Phase 2: connection to sources
        self.step(progress, "connecting to sources", 1, 0, None).await;
        let mut resolved: Vec<(String, Arc<dyn SourceAdapter>)> = Vec::new();
        for name in &spec.sources {
            match self.adapters.get(name) {
                Some(adapter) => resolved.push((name.clone(), adapter)),
                None => {
                    self.activity.error(
                        execution_id,
                        format!("Unknown source '{}', skipping", name),
                        serde_json::json!({ "source": name }),
                    );
                }
            }
        }
        self.step(progress, "sources connected", 2, 0, None).await;

        if cancel.is_cancelled() {
            return Ok(self.observe_cancellation(execution_id, outcome));
        }

        // Phase 3: per-source result collection (the dominant phase)
        let source_count = resolved.len();
        let mut per_source_counts: HashMap<String, i64> = HashMap::new();

        for (index, (name, adapter)) in resolved.into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(self.observe_cancellation(execution_id, outcome));
            }

            self.step(
                progress,
                &format!("collecting from {} ({}/{})", name, index + 1, source_count),
                2,
                outcome.total,
                Some(name.clone()),
            )
            .await;

            self.activity.info(
                execution_id,
                format!("Querying {} for \"{}\"", name, spec.params.summary()),
                serde_json::json!({
                    "source": name,
                    "max_results": spec.max_results_per_source,
                    "delay_ms": spec.delay.inter_item_delay_ms,
                }),
            );

            let raw = match adapter
                .fetch(
                    &spec.params,
                    spec.max_results_per_source,
                    &spec.delay,
                    cancel,
                )
                .await
            {
                Ok(raw) => raw,
                Err(e) => {
                    // Non-fatal: record and move to the next source
                    self.activity.error(
                        execution_id,
                        format!("Source {} failed: {}", name, e),
                        serde_json::json!({ "source": name, "error": e.to_string() }),
                    );
                    continue;
                }
            };

            let batch =
                self.normalize_batch(spec, execution_id, &name, &raw, &mut seen_keys, outcome.total);

            if batch.is_empty() {
                self.activity.success(
                    execution_id,
                    format!("{}: no matching listings", name),
                    serde_json::json!({ "source": name, "count": 0 }),
                );
                continue;
            }

            let batch_dupes = batch.iter().filter(|r| r.is_duplicate).count() as i64;
            let stats = batch_stats(&batch);

            // One batch insert per source, immediately after its loop, so a
            // later cancellation or crash cannot lose this source's results
            match self.result_repo.insert_batch(&spec.id, &batch).await {
                Ok(()) => {
                    outcome.total += batch.len() as i64;
                    outcome.duplicates += batch_dupes;
                    outcome.new += batch.len() as i64 - batch_dupes;
                    per_source_counts.insert(name.clone(), batch.len() as i64);

                    self.step(
                        progress,
                        &format!("collected from {} ({}/{})", name, index + 1, source_count),
                        2,
                        outcome.total,
                        Some(name.clone()),
                    )
                    .await;

                    self.activity.success(
                        execution_id,
                        format!("{}: {} listings captured", name, batch.len()),
                        serde_json::json!({
                            "source": name,
                            "count": batch.len(),
                            "duplicates": batch_dupes,
                            "distinct_organizations": stats.distinct_organizations,
                            "compensation_min": stats.compensation_min,
                            "compensation_max": stats.compensation_max,
                        }),
                    );
                }
                Err(e) => {
                    // Persistence outage for one source's batch is non-fatal
                    self.activity.error(
                        execution_id,
                        format!("Failed to store batch from {}: {}", name, e),
                        serde_json::json!({ "source": name, "error": e.to_string() }),
                    );
                }
            }
        }

        // The in-flight batch above was allowed to finish and persist;
        // observe a cancellation that arrived during the final source here
        if cancel.is_cancelled() {
            return Ok(self.observe_cancellation(execution_id, outcome));
        }

        // Phase 4: cross-source result processing
        self.step(progress, "processing results", 3, outcome.total, None)
            .await;
        self.activity.info(
            execution_id,
            format!(
                "Processed {} results across {} sources",
                outcome.total,
                per_source_counts.len()
            ),
            serde_json::json!({
                "total": outcome.total,
                "new": outcome.new,
                "duplicates": outcome.duplicates,
                "per_source": per_source_counts,
            }),
        );
        self.step(progress, "results processed", 4, outcome.total, None)
            .await;

        // Phase 5: finalization
        let elapsed = self.time_provider.now_millis() - started;
        self.activity.success(
            execution_id,
            format!("Search completed: {} results", outcome.total),
            serde_json::json!({
                "total": outcome.total,
                "new": outcome.new,
                "duplicates": outcome.duplicates,
                "elapsed_ms": elapsed,
            }),
        );
        self.step(progress, "completed", TOTAL_STEPS, outcome.total, None)
            .await;

        info!(
            execution_id = %execution_id,
            total = outcome.total,
            elapsed_ms = elapsed,
            "search execution finished"
        );
        Ok(outcome)
    }

    /// Convert one source's raw listings into scored, dedup-flagged records
    fn normalize_batch(
        &self,
        spec: &SearchSpec,
        execution_id: &ExecutionId,
        source: &str,
        raw: &[RawListing],
        seen_keys: &mut HashSet<String>,
        running_total: i64,
    ) -> Vec<ResultRecord> {
        let now = self.time_provider.now_millis();
        let mut batch = Vec::with_capacity(raw.len());

        for (index, listing) in raw.iter().enumerate() {
            let mut record = ResultRecord {
                id: self.id_provider.generate_id(),
                search_id: spec.id.clone(),
                source: source.to_string(),
                title: listing.title.clone(),
                organization: listing.organization.clone(),
                location: listing.location.clone(),
                compensation: listing.compensation.as_deref().and_then(parse_compensation),
                url: listing.url.clone(),
                description: listing.description.clone(),
                posted_at: listing.posted_at,
                match_score: self.scorer.score(&spec.params, listing),
                review_state: ReviewState::Unset,
                is_duplicate: false,
                captured_at: now,
            };

            if spec.prefilter_duplicates {
                let key = record.dedup_key();
                record.is_duplicate = !seen_keys.insert(key);
            }

            batch.push(record);

            // Periodic progress entry, not per item, to avoid flooding
            if (index + 1) % spec.delay.progress_log_every == 0 {
                self.activity.debug(
                    execution_id,
                    format!("{}: {} of {} listings processed", source, index + 1, raw.len()),
                    serde_json::json!({
                        "source": source,
                        "processed": index + 1,
                        "running_total": running_total + index as i64 + 1,
                    }),
                );
            }
        }

        batch
    }

    fn observe_cancellation(
        &self,
        execution_id: &ExecutionId,
        outcome: OrchestratorOutcome,
    ) -> OrchestratorOutcome {
        debug!(execution_id = %execution_id, "cancellation observed at checkpoint");
        self.activity.info(
            execution_id,
            "Cancellation observed, stopping",
            serde_json::json!({ "results_so_far": outcome.total }),
        );
        OrchestratorOutcome {
            cancelled: true,
            ..outcome
        }
    }

    async fn step(
        &self,
        progress: &ProgressReporter,
        label: &str,
        completed: u32,
        results_found: i64,
        current_source: Option<String>,
    ) {
        progress
            .update(ProgressSnapshot {
                current_step: label.to_string(),
                completed_steps: completed,
                total_steps: TOTAL_STEPS,
                results_found,
                current_source,
            })
            .await;
    }
}

struct BatchStats {
    distinct_organizations: usize,
    compensation_min: Option<i64>,
    compensation_max: Option<i64>,
}

fn batch_stats(batch: &[ResultRecord]) -> BatchStats {
    let distinct_organizations = batch
        .iter()
        .map(|r| r.organization.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut compensation_min = None;
    let mut compensation_max = None;
    for range in batch.iter().filter_map(|r| r.compensation.as_ref()) {
        if let Some(min) = range.min {
            compensation_min = Some(compensation_min.map_or(min, |m: i64| m.min(min)));
        }
        if let Some(max) = range.max {
            compensation_max = Some(compensation_max.map_or(max, |m: i64| m.max(max)));
        }
    }

    BatchStats {
        distinct_organizations,
        compensation_min,
        compensation_max,
    }
}

/// Parse advertised compensation text like "80000-110000 EUR" or "from
/// 95000 USD". Returns None when no figure is present.
fn parse_compensation(text: &str) -> Option<CompensationRange> {
    let mut numbers: Vec<i64> = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_ascii_digit() {
            current.push(ch);
        } else if !current.is_empty() {
            if let Ok(n) = current.parse() {
                numbers.push(n);
            }
            current.clear();
        }
    }
    if !current.is_empty() {
        if let Ok(n) = current.parse() {
            numbers.push(n);
        }
    }

    if numbers.is_empty() {
        return None;
    }

    let currency = text
        .split_whitespace()
        .rev()
        .find(|token| token.chars().all(|c| c.is_ascii_alphabetic()) && token.len() == 3)
        .unwrap_or("USD")
        .to_uppercase();

    Some(CompensationRange {
        min: numbers.first().copied(),
        max: numbers.get(1).copied().or_else(|| numbers.first().copied()),
        currency,
    })
}
