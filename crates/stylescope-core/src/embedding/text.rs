//! CLIP text encoder for label embeddings.
//!
//! Loads the CLIP text ONNX model and tokenizer and encodes label strings
//! into the same space as the visual encoder.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Value;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::error::ClassifyError;

use super::device::{build_session, Device};
use super::projection::{missing_output, normalized_rows, TEXT_EMBEDS};

/// CLIP's fixed context length.
const CONTEXT_LENGTH: usize = 77;

/// CLIP text encoder wrapper.
///
/// Uses the same `Mutex<Session>` pattern as the vision encoder.
pub struct ClipTextEncoder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    /// Whether the graph declares an `attention_mask` input.
    wants_attention_mask: bool,
}

impl ClipTextEncoder {
    /// Load the text encoder and tokenizer.
    pub fn load(
        model_path: &Path,
        tokenizer_path: &Path,
        device: Device,
    ) -> Result<Self, ClassifyError> {
        let (session, device) = build_session(model_path, device)?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path).map_err(|e| {
            ClassifyError::model(format!("Failed to load tokenizer {:?}: {e}", tokenizer_path))
        })?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(CONTEXT_LENGTH),
            pad_id: 0,
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: CONTEXT_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| ClassifyError::model(format!("Failed to configure truncation: {e}")))?;

        let wants_attention_mask = session
            .inputs()
            .iter()
            .any(|i| i.name() == "attention_mask");

        tracing::debug!(
            "Loaded CLIP text encoder on {} (inputs: {:?}, outputs: {:?})",
            device,
            session
                .inputs()
                .iter()
                .map(|i| i.name())
                .collect::<Vec<_>>(),
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            wants_attention_mask,
        })
    }

    /// Encode a batch of labels to normalized embeddings, one per input.
    pub fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ClassifyError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let batch_size = texts.len();

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| ClassifyError::model(format!("Tokenization failed: {e}")))?;

        let mut input_ids = vec![0i64; batch_size * CONTEXT_LENGTH];
        let mut attention_mask = vec![0i64; batch_size * CONTEXT_LENGTH];
        for (i, encoding) in encodings.iter().enumerate() {
            let row = i * CONTEXT_LENGTH;
            for (j, (&id, &mask)) in encoding
                .get_ids()
                .iter()
                .zip(encoding.get_attention_mask())
                .take(CONTEXT_LENGTH)
                .enumerate()
            {
                input_ids[row + j] = id as i64;
                attention_mask[row + j] = mask as i64;
            }
        }

        let shape = vec![batch_size as i64, CONTEXT_LENGTH as i64];
        let input_ids_value = Value::from_array((shape.clone(), input_ids))
            .map_err(|e| ClassifyError::model(format!("Failed to create input_ids tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ClassifyError::model(format!("Text encoder lock poisoned: {e}")))?;

        let run = if self.wants_attention_mask {
            let mask_value = Value::from_array((shape, attention_mask)).map_err(|e| {
                ClassifyError::model(format!("Failed to create attention_mask tensor: {e}"))
            })?;
            session.run(ort::inputs![
                "input_ids" => input_ids_value,
                "attention_mask" => mask_value
            ])
        } else {
            session.run(ort::inputs!["input_ids" => input_ids_value])
        };
        let outputs =
            run.map_err(|e| ClassifyError::model(format!("Text encoder inference failed: {e}")))?;

        let Some((_, embeds)) = outputs.iter().find(|(name, _)| *name == TEXT_EMBEDS) else {
            let available: Vec<String> = outputs.iter().map(|(name, _)| name.to_string()).collect();
            return Err(missing_output("Text encoder", TEXT_EMBEDS, &available));
        };

        let (shape, data) = embeds.try_extract_tensor::<f32>().map_err(|e| {
            ClassifyError::model(format!("Failed to extract text embeddings: {e}"))
        })?;

        normalized_rows(shape, data, batch_size, TEXT_EMBEDS)
    }
}
