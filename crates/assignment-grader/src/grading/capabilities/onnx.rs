//! ONNX Runtime backends for the embedder and sentiment capabilities.
//!
//! Each model directory must hold `model.onnx` and `tokenizer.json`. The
//! embedder expects a sentence-transformers export (token embeddings as the
//! first output, mean-pooled here); the sentiment model expects a sequence
//! classifier with logits ordered negative, neutral, positive.

use std::fmt::Display;
use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};
use tracing::info;

use super::{CapabilityError, CapabilityKind, SentenceEmbedder, SentimentClassifier, SentimentLabel};

const EMBEDDER_MAX_TOKENS: usize = 256;
const SENTIMENT_MAX_TOKENS: usize = 512;
const SENTIMENT_LABELS: [&str; 3] = ["negative", "neutral", "positive"];

fn failure<E: Display>(kind: CapabilityKind) -> impl Fn(E) -> CapabilityError {
    move |err| CapabilityError::failed(kind, err)
}

fn load_parts(
    kind: CapabilityKind,
    model_dir: &Path,
    max_length: usize,
) -> Result<(Session, Tokenizer), CapabilityError> {
    let model_path = model_dir.join("model.onnx");
    let tokenizer_path = model_dir.join("tokenizer.json");
    for required in [&model_path, &tokenizer_path] {
        if !required.exists() {
            return Err(CapabilityError::failed(
                kind,
                format!("{} not found", required.display()),
            ));
        }
    }

    let session = Session::builder()
        .map_err(failure(kind))?
        .commit_from_file(&model_path)
        .map_err(failure(kind))?;

    let mut tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(failure(kind))?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(failure(kind))?;
    tokenizer.with_padding(Some(PaddingParams::default()));

    info!(capability = %kind, model = %model_path.display(), "loaded onnx model");
    Ok((session, tokenizer))
}

/// Batch encodings flattened into `[batch, seq_len]` id, mask and type buffers.
struct EncodedBatch {
    batch_size: usize,
    seq_len: usize,
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
    token_type_ids: Vec<i64>,
}

fn encode(
    kind: CapabilityKind,
    tokenizer: &Tokenizer,
    texts: &[&str],
) -> Result<EncodedBatch, CapabilityError> {
    let encodings = tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(failure(kind))?;
    let batch_size = encodings.len();
    let seq_len = encodings
        .iter()
        .map(|encoding| encoding.get_ids().len())
        .max()
        .unwrap_or(0);

    let mut batch = EncodedBatch {
        batch_size,
        seq_len,
        input_ids: vec![0; batch_size * seq_len],
        attention_mask: vec![0; batch_size * seq_len],
        token_type_ids: vec![0; batch_size * seq_len],
    };
    for (i, encoding) in encodings.iter().enumerate() {
        let offset = i * seq_len;
        for (j, &id) in encoding.get_ids().iter().enumerate() {
            batch.input_ids[offset + j] = i64::from(id);
        }
        for (j, &mask) in encoding.get_attention_mask().iter().enumerate() {
            batch.attention_mask[offset + j] = i64::from(mask);
        }
        for (j, &type_id) in encoding.get_type_ids().iter().enumerate() {
            batch.token_type_ids[offset + j] = i64::from(type_id);
        }
    }
    Ok(batch)
}

/// Mean-pooled sentence-transformers embeddings.
pub struct OnnxEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl OnnxEmbedder {
    pub fn load(model_dir: &Path) -> Result<Self, CapabilityError> {
        let (session, tokenizer) =
            load_parts(CapabilityKind::Embedder, model_dir, EMBEDDER_MAX_TOKENS)?;
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }
}

impl SentenceEmbedder for OnnxEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, CapabilityError> {
        const KIND: CapabilityKind = CapabilityKind::Embedder;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let batch = encode(KIND, &self.tokenizer, texts)?;
        let shape = [batch.batch_size as i64, batch.seq_len as i64];
        let ids = Tensor::from_array((shape, batch.input_ids.into_boxed_slice()))
            .map_err(failure(KIND))?;
        let mask = Tensor::from_array((shape, batch.attention_mask.clone().into_boxed_slice()))
            .map_err(failure(KIND))?;
        let types = Tensor::from_array((shape, batch.token_type_ids.into_boxed_slice()))
            .map_err(failure(KIND))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| CapabilityError::failed(KIND, "session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => ids,
                "attention_mask" => mask,
                "token_type_ids" => types,
            ])
            .map_err(failure(KIND))?;

        let (output_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(failure(KIND))?;
        let dims: &[i64] = output_shape;
        if dims.len() != 3 || dims[0] as usize != batch.batch_size {
            return Err(CapabilityError::failed(
                KIND,
                format!("unexpected output shape {dims:?}"),
            ));
        }
        let output_seq_len = dims[1] as usize;
        let dim = dims[2] as usize;

        let mut embeddings = Vec::with_capacity(batch.batch_size);
        for i in 0..batch.batch_size {
            let mut pooled = vec![0.0f32; dim];
            let mut token_count = 0.0f32;
            for j in 0..output_seq_len.min(batch.seq_len) {
                let weight = batch.attention_mask[i * batch.seq_len + j] as f32;
                if weight > 0.0 {
                    let offset = (i * output_seq_len + j) * dim;
                    for (d, value) in pooled.iter_mut().enumerate() {
                        *value += data[offset + d] * weight;
                    }
                    token_count += weight;
                }
            }
            if token_count > 0.0 {
                for value in &mut pooled {
                    *value /= token_count;
                }
            }
            normalize(&mut pooled);
            embeddings.push(pooled);
        }
        Ok(embeddings)
    }
}

/// Three-way sequence classifier; the argmax label and its softmax probability.
pub struct OnnxSentimentClassifier {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl OnnxSentimentClassifier {
    pub fn load(model_dir: &Path) -> Result<Self, CapabilityError> {
        let (session, tokenizer) =
            load_parts(CapabilityKind::Sentiment, model_dir, SENTIMENT_MAX_TOKENS)?;
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }
}

impl SentimentClassifier for OnnxSentimentClassifier {
    fn classify(&self, chunk: &str) -> Result<SentimentLabel, CapabilityError> {
        const KIND: CapabilityKind = CapabilityKind::Sentiment;

        let batch = encode(KIND, &self.tokenizer, &[chunk])?;
        let shape = [1_i64, batch.seq_len as i64];
        let ids = Tensor::from_array((shape, batch.input_ids.into_boxed_slice()))
            .map_err(failure(KIND))?;
        let mask = Tensor::from_array((shape, batch.attention_mask.into_boxed_slice()))
            .map_err(failure(KIND))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| CapabilityError::failed(KIND, "session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => ids,
                "attention_mask" => mask,
            ])
            .map_err(failure(KIND))?;
        let (_, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(failure(KIND))?;
        if logits.len() < SENTIMENT_LABELS.len() {
            return Err(CapabilityError::failed(
                KIND,
                format!("expected {} logits, got {}", SENTIMENT_LABELS.len(), logits.len()),
            ));
        }

        let probabilities = softmax(&logits[..SENTIMENT_LABELS.len()]);
        let (best, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |acc, (index, p)| if p > acc.1 { (index, p) } else { acc });

        Ok(SentimentLabel {
            label: SENTIMENT_LABELS[best].to_string(),
            confidence,
        })
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::MIN, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
