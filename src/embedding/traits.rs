// Embedder trait — the pipeline's one external collaborator.
//
// The pipeline only ever asks for "one vector per message"; everything
// about models, tokenizers, and inference stays behind this seam, which
// also makes the pipeline trivially testable with a stub.

use anyhow::Result;
use async_trait::async_trait;

/// Converts a batch of texts into fixed-dimension numeric vectors.
///
/// Semantically similar inputs must yield vectors that are close in
/// distance, and the mapping must be deterministic for a fixed model.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch, returning one vector per input in the same order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>>;
}
