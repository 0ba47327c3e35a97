//! CLIP visual encoder session.
//!
//! Runs the ONNX export of CLIP's vision tower and returns the projected,
//! L2-normalized image embedding.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::ClassifyError;

use super::device::{build_session, Device};
use super::projection::{missing_output, normalized_rows, IMAGE_EMBEDS};

/// Wraps an ONNX Runtime session for CLIP image embedding.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct ClipVisionSession {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
}

impl ClipVisionSession {
    /// Load the visual encoder, returning the device it ended up on.
    pub fn load(model_path: &Path, device: Device) -> Result<(Self, Device), ClassifyError> {
        let (session, device) = build_session(model_path, device)?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "pixel_values".to_string());

        tracing::debug!(
            "Loaded CLIP visual encoder from {:?} on {} (input: {:?}, outputs: {:?})",
            model_path,
            device,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok((
            Self {
                session: Mutex::new(session),
                input_name,
            },
            device,
        ))
    }

    /// Run inference on a preprocessed image tensor and return the embedding.
    ///
    /// Input shape: \[1, 3, image_size, image_size\] (NCHW, CLIP-normalized).
    pub fn embed(&self, preprocessed: &Array4<f32>) -> Result<Vec<f32>, ClassifyError> {
        let shape: Vec<i64> = preprocessed.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = preprocessed.iter().copied().collect();

        let input_value = Value::from_array((shape, flat_data))
            .map_err(|e| ClassifyError::model(format!("Failed to create image tensor: {e}")))?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self
            .session
            .lock()
            .map_err(|e| ClassifyError::model(format!("Vision session lock poisoned: {e}")))?;

        let outputs = session
            .run(inputs)
            .map_err(|e| ClassifyError::model(format!("Vision inference failed: {e}")))?;

        let Some((_, embeds)) = outputs.iter().find(|(name, _)| *name == IMAGE_EMBEDS) else {
            let available: Vec<String> = outputs.iter().map(|(name, _)| name.to_string()).collect();
            return Err(missing_output("Visual encoder", IMAGE_EMBEDS, &available));
        };

        let (shape, data) = embeds.try_extract_tensor::<f32>().map_err(|e| {
            ClassifyError::model(format!("Failed to extract image embedding: {e}"))
        })?;

        normalized_rows(shape, data, 1, IMAGE_EMBEDS)?
            .pop()
            .ok_or_else(|| ClassifyError::model("Visual encoder returned no embedding"))
    }
}
