//! Reading projected embeddings out of encoder outputs.
//!
//! Only the projection-head outputs live in CLIP's joint space. The encoders
//! also emit `pooler_output`, the unprojected hidden state; it is never used
//! as a substitute, even when its width happens to match.

use crate::error::ClassifyError;

/// Joint-space output of the vision tower.
pub(crate) const IMAGE_EMBEDS: &str = "image_embeds";
/// Joint-space output of the text tower.
pub(crate) const TEXT_EMBEDS: &str = "text_embeds";

/// Error for a graph exported without its projection head.
pub(crate) fn missing_output(encoder: &str, expected: &str, available: &[String]) -> ClassifyError {
    ClassifyError::model(format!(
        "{encoder} has no `{expected}` output (found {available:?}); \
         export the model with its projection head"
    ))
}

/// Split a `[rows, D]` tensor (or `[D]` for a single row) into
/// L2-normalized embeddings.
pub(crate) fn normalized_rows(
    shape: &[i64],
    data: &[f32],
    rows: usize,
    output: &str,
) -> Result<Vec<Vec<f32>>, ClassifyError> {
    let dim = match shape {
        [d] if rows == 1 => *d,
        [n, d] if *n as usize == rows => *d,
        _ => {
            return Err(ClassifyError::model(format!(
                "Unexpected `{output}` shape {shape:?} for {rows} input(s)"
            )))
        }
    };
    let dim = dim as usize;
    if dim == 0 || data.len() != rows * dim {
        return Err(ClassifyError::model(format!(
            "`{output}` holds {} values, expected {rows}x{dim}",
            data.len()
        )));
    }

    Ok(data.chunks(dim).map(crate::math::l2_normalize).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batched_rows_are_normalized() {
        let rows = normalized_rows(&[2, 2], &[3.0, 4.0, 0.0, 2.0], 2, TEXT_EMBEDS).unwrap();
        assert_eq!(rows, vec![vec![0.6, 0.8], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_flat_single_row() {
        let rows = normalized_rows(&[3], &[0.0, 0.0, 5.0], 1, IMAGE_EMBEDS).unwrap();
        assert_eq!(rows, vec![vec![0.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_row_count_must_match_inputs() {
        let err = normalized_rows(&[3, 2], &[1.0; 6], 2, TEXT_EMBEDS).unwrap_err();
        assert!(matches!(err, ClassifyError::ModelUnavailable { .. }));

        let err = normalized_rows(&[1, 4], &[1.0; 3], 1, IMAGE_EMBEDS).unwrap_err();
        assert!(err.to_string().contains("expected 1x4"));

        assert!(normalized_rows(&[1, 1, 4], &[1.0; 4], 1, IMAGE_EMBEDS).is_err());
    }

    #[test]
    fn test_missing_projection_names_expected_output() {
        let available = vec!["last_hidden_state".to_string(), "pooler_output".to_string()];
        let err = missing_output("Text encoder", TEXT_EMBEDS, &available);
        assert!(matches!(err, ClassifyError::ModelUnavailable { .. }));
        let message = err.to_string();
        assert!(message.contains("`text_embeds`"));
        assert!(message.contains("pooler_output"));
    }
}
