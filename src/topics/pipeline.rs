// The end-to-end topic extraction pipeline.
//
// One call processes one batch: embed → cluster → class TF-IDF → label
// selection → rank by cluster size. Nothing persists between calls; the
// only shared state is the embedder itself, injected at construction and
// used read-only.
//
// Two conditions are deliberately not errors: a batch too small to
// cluster, and a vocabulary that collapses under filtering. Both return
// an empty topic list. Only embedding failures surface to the caller.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embedding::traits::Embedder;

use super::cluster::{self, cluster_count};
use super::ctfidf::{ClusterDocument, TermMatrix, TermModelError};
use super::label;

/// Batches beyond this are truncated (not rejected) to bound latency.
pub const MAX_MESSAGES: usize = 3000;

/// Below this there is not enough signal to cluster at all.
pub const MIN_MESSAGES: usize = 10;

/// One extracted topic: a label and how many messages were about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub label: String,
    pub count: usize,
}

/// Batch topic extraction over an injected embedder.
pub struct TopicPipeline {
    embedder: Arc<dyn Embedder>,
}

impl TopicPipeline {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Extract ranked topics from a batch of chat messages.
    ///
    /// Returns topics sorted by message count descending; clusters whose
    /// candidate terms all fail the label filters are absent. The result
    /// may be empty even for a large batch — that is a valid outcome, not
    /// an error.
    pub async fn extract_topics(
        &self,
        messages: &[String],
        extra_stopwords: &[String],
    ) -> Result<Vec<Topic>> {
        let messages = &messages[..messages.len().min(MAX_MESSAGES)];
        if messages.len() < MIN_MESSAGES {
            debug!(
                count = messages.len(),
                "Batch below minimum size, skipping extraction"
            );
            return Ok(Vec::new());
        }

        let embeddings = self
            .embedder
            .embed(messages)
            .await
            .context("Failed to embed message batch")?;

        let k = cluster_count(messages.len());
        let clusters = cluster::partition(&embeddings, k);
        info!(
            messages = messages.len(),
            clusters = k,
            "Partitioned batch into clusters"
        );

        // One document per non-empty cluster, carrying its id and size.
        let docs: Vec<ClusterDocument> = clusters
            .iter()
            .filter(|c| !c.members.is_empty())
            .map(|c| ClusterDocument {
                cluster_id: c.id,
                size: c.members.len(),
                text: c
                    .members
                    .iter()
                    .map(|&i| messages[i].as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            })
            .collect();
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let matrix = match TermMatrix::build(&docs) {
            Ok(matrix) => matrix,
            Err(TermModelError::DegenerateVocabulary) => {
                info!("Vocabulary collapsed under filtering, no topics extracted");
                return Ok(Vec::new());
            }
        };

        let filters = label::default_filters(extra_stopwords);
        let mut topics = Vec::new();
        for (row, doc) in docs.iter().enumerate() {
            match label::select_label(matrix.ranked_terms(row), &filters) {
                Some(found) => topics.push(Topic {
                    label: found,
                    count: doc.size,
                }),
                None => debug!(cluster = doc.cluster_id, "No label survived filtering"),
            }
        }

        // Stable sort: equal counts keep cluster-id order.
        topics.sort_by(|a, b| b.count.cmp(&a.count));

        info!(topics = topics.len(), "Topic extraction complete");
        Ok(topics)
    }
}
