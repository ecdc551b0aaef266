// Sentence embeddings from a local all-MiniLM-L6-v2 model via ONNX.
//
// Texts are tokenized, padded into one batch, run through the BERT
// encoder, and mean-pooled over the attention mask to give a single
// 384-dimensional vector per text. Everything runs locally — no API
// calls, no rate limits.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::debug;

use super::traits::Embedder;

/// Embedding dimension for all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Local ONNX sentence embedder.
///
/// The session sits behind a mutex because ort sessions need exclusive
/// access to run; the tokenizer is shared read-only. Both are Arc'd so
/// inference can move into `spawn_blocking`.
pub struct OnnxEmbedder {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl OnnxEmbedder {
    /// Load `model.onnx` and `tokenizer.json` from the model directory.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() || !tokenizer_path.exists() {
            anyhow::bail!(
                "Embedding model not found in {}\nRun `banter download-model` to fetch it.",
                model_dir.display()
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load model from {}", model_path.display()))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        debug!("Loaded embedding model from {}", model_dir.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }
}

#[async_trait]
impl Embedder for OnnxEmbedder {
    /// Embed a batch of texts. CPU-bound inference runs under
    /// `spawn_blocking` to keep the async runtime responsive.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || infer_batch(&session, &tokenizer, &texts))
            .await
            .context("spawn_blocking panicked")?
    }
}

/// Padded BERT input for one batch: input ids, attention mask, and token
/// type ids, all flattened row-major as `[batch, max_len]`.
struct PaddedBatch {
    batch: usize,
    max_len: usize,
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
    token_type_ids: Vec<i64>,
}

fn pad_batch(tokenizer: &Tokenizer, texts: &[String]) -> Result<PaddedBatch> {
    let encodings: Vec<_> = texts
        .iter()
        .map(|t| {
            tokenizer
                .encode(t.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
        })
        .collect::<Result<Vec<_>>>()?;

    let batch = encodings.len();
    let max_len = encodings
        .iter()
        .map(|e| e.get_ids().len())
        .max()
        .unwrap_or(0);

    let mut input_ids = Vec::with_capacity(batch * max_len);
    let mut attention_mask = Vec::with_capacity(batch * max_len);
    let mut token_type_ids = Vec::with_capacity(batch * max_len);

    for enc in &encodings {
        let ids = enc.get_ids();
        let mask = enc.get_attention_mask();
        // Pad token id for BERT is 0; token type ids are all zeros for
        // single-sentence input.
        let pad = max_len - ids.len();
        input_ids.extend(ids.iter().map(|&id| id as i64));
        input_ids.extend(std::iter::repeat_n(0i64, pad));
        attention_mask.extend(mask.iter().map(|&m| m as i64));
        attention_mask.extend(std::iter::repeat_n(0i64, pad));
        token_type_ids.extend(std::iter::repeat_n(0i64, ids.len() + pad));
    }

    Ok(PaddedBatch {
        batch,
        max_len,
        input_ids,
        attention_mask,
        token_type_ids,
    })
}

/// Tokenize, run the encoder, and mean-pool — synchronous, called from
/// `spawn_blocking`.
fn infer_batch(
    session: &Arc<Mutex<Session>>,
    tokenizer: &Arc<Tokenizer>,
    texts: &[String],
) -> Result<Vec<Vec<f64>>> {
    let padded = pad_batch(tokenizer, texts)?;
    if padded.max_len == 0 {
        return Ok(vec![vec![0.0; EMBEDDING_DIM]; padded.batch]);
    }

    let shape = [padded.batch as i64, padded.max_len as i64];
    let input_ids = Tensor::from_array((shape, padded.input_ids))
        .context("Failed to create input_ids tensor")?;
    let attention_mask = Tensor::from_array((shape, padded.attention_mask.clone()))
        .context("Failed to create attention_mask tensor")?;
    let token_type_ids = Tensor::from_array((shape, padded.token_type_ids))
        .context("Failed to create token_type_ids tensor")?;

    // Output is last_hidden_state: [batch, max_len, EMBEDDING_DIM]
    let hidden = {
        let mut session = session
            .lock()
            .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

        let outputs = session
            .run(ort::inputs! {
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
                "token_type_ids" => token_type_ids
            })
            .context("Embedding inference failed")?;

        let (_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .context("Failed to extract output tensor")?;
        data.to_vec()
    };

    let vectors = mean_pool(&hidden, &padded.attention_mask, padded.batch, padded.max_len);

    debug!(
        batch = padded.batch,
        dim = EMBEDDING_DIM,
        "Computed sentence embeddings"
    );
    Ok(vectors)
}

/// Average token embeddings weighted by the attention mask, so padding
/// contributes nothing to the sentence vector.
fn mean_pool(hidden: &[f32], mask: &[i64], batch: usize, max_len: usize) -> Vec<Vec<f64>> {
    let mut vectors = Vec::with_capacity(batch);

    for row in 0..batch {
        let mut pooled = vec![0.0f64; EMBEDDING_DIM];
        let mut mask_total = 0.0f64;

        for tok in 0..max_len {
            let weight = mask[row * max_len + tok] as f64;
            if weight > 0.0 {
                mask_total += weight;
                let offset = (row * max_len + tok) * EMBEDDING_DIM;
                for (d, slot) in pooled.iter_mut().enumerate() {
                    *slot += hidden[offset + d] as f64 * weight;
                }
            }
        }

        if mask_total > 0.0 {
            for slot in &mut pooled {
                *slot /= mask_total;
            }
        }
        vectors.push(pooled);
    }

    vectors
}
