//! Ingest orchestrator
//!
//! Drives the per-article pipeline (fetch → parse → flatten → insert) over
//! an identifier list and produces the combined subject tree plus a run
//! summary. Fetch, parse, and flatten run on a bounded worker pool; every
//! insert happens on the consuming task, so the tree has a single writer.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::models::article_id::PmcId;
use crate::models::subject_path::SubjectPath;
use crate::models::subject_tree::SubjectTree;
use crate::services::record_parser::{parse_subject_forest, subject_paths};
use crate::services::registry_client::RegistryClient;

/// Why one input identifier contributed nothing to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    /// Identifier failed the PMC shape check; no request was made.
    ShapeRejected,
    /// All fetch attempts failed or the registry refused the request.
    FetchFailed,
    /// The response body was not well-formed XML.
    MalformedRecord,
}

/// Outcome of one article's pipeline pass, handed to the aggregation task.
enum ArticleOutcome {
    Parsed {
        id: PmcId,
        paths: Vec<SubjectPath>,
    },
    Skipped {
        reason: SkipReason,
    },
}

/// Totals for one aggregation run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Articles whose paths were merged into the tree.
    pub aggregated: usize,
    pub skipped_shape: usize,
    pub skipped_fetch: usize,
    pub skipped_parse: usize,
    /// Articles whose record carried no subject classification.
    pub empty_records: usize,
    pub paths_inserted: usize,
    /// Distinct topic labels observed across the run, owned by the caller.
    pub topic_labels: BTreeSet<String>,
}

impl RunSummary {
    pub fn skipped(&self) -> usize {
        self.skipped_shape + self.skipped_fetch + self.skipped_parse
    }
}

/// Subject aggregation orchestrator
pub struct Orchestrator {
    client: Arc<RegistryClient>,
    workers: usize,
}

impl Orchestrator {
    pub fn new(client: Arc<RegistryClient>, workers: usize) -> Self {
        Self {
            client,
            workers: workers.max(1),
        }
    }

    /// Run the full pipeline over `ids` and return the combined tree with a
    /// summary. Failures are logged per article and never abort the run.
    pub async fn run(&self, ids: &[String]) -> (SubjectTree, RunSummary) {
        let mut tree = SubjectTree::new();
        let mut summary = RunSummary::default();

        let outcomes = stream::iter(ids.iter().cloned())
            .map(|raw_id| {
                let client = Arc::clone(&self.client);
                async move { process_article(&client, &raw_id).await }
            })
            .buffered(self.workers);
        futures::pin_mut!(outcomes);

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                ArticleOutcome::Parsed { id, paths } => {
                    if paths.is_empty() {
                        tracing::info!(pmc_id = %id, "No subject classification in record");
                        summary.empty_records += 1;
                        continue;
                    }
                    for path in &paths {
                        tracing::debug!(pmc_id = %id, path = %path, "Inserting subject path");
                        tree.insert(path, &id);
                    }
                    summary.paths_inserted += paths.len();
                    summary.aggregated += 1;
                    tracing::info!(pmc_id = %id, paths = paths.len(), "Aggregated article");
                }
                ArticleOutcome::Skipped { reason } => match reason {
                    SkipReason::ShapeRejected => summary.skipped_shape += 1,
                    SkipReason::FetchFailed => summary.skipped_fetch += 1,
                    SkipReason::MalformedRecord => summary.skipped_parse += 1,
                },
            }
        }

        summary.topic_labels = tree.topic_labels();
        (tree, summary)
    }
}

async fn process_article(client: &RegistryClient, raw_id: &str) -> ArticleOutcome {
    let id = match PmcId::parse(raw_id) {
        Ok(id) => id,
        Err(err) => {
            tracing::warn!(id = raw_id, %err, "Skipping article: identifier rejected");
            return ArticleOutcome::Skipped {
                reason: SkipReason::ShapeRejected,
            };
        }
    };

    let body = match client.fetch_record(&id).await {
        Ok(body) => body,
        Err(err) => {
            tracing::warn!(pmc_id = %id, %err, "Skipping article: fetch failed");
            return ArticleOutcome::Skipped {
                reason: SkipReason::FetchFailed,
            };
        }
    };

    match parse_subject_forest(&body) {
        Ok(forest) => ArticleOutcome::Parsed {
            id,
            paths: subject_paths(&forest),
        },
        Err(err) => {
            tracing::warn!(pmc_id = %id, %err, "Skipping article: malformed record");
            ArticleOutcome::Skipped {
                reason: SkipReason::MalformedRecord,
            }
        }
    }
}
