//! Configuration validation with range checks.

use crate::embedding::DevicePreference;
use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.model.image_size == 0 {
            return Err(ConfigError::ValidationError(
                "model.image_size must be > 0".into(),
            ));
        }
        if let Err(e) = DevicePreference::parse(&self.model.device) {
            return Err(ConfigError::ValidationError(format!("model.device: {e}")));
        }
        if !self.scoring.logit_scale.is_finite() || self.scoring.logit_scale <= 0.0 {
            return Err(ConfigError::ValidationError(
                "scoring.logit_scale must be a finite number > 0".into(),
            ));
        }
        if let Err(e) = self.label_vocabulary() {
            return Err(ConfigError::ValidationError(format!("vocabulary.labels: {e}")));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.embed_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.embed_timeout_ms must be > 0".into(),
            ));
        }
        let p = self.mock.dominant_probability;
        if !(p > 0.0 && p <= 1.0) {
            return Err(ConfigError::ValidationError(
                "mock.dominant_probability must be in (0.0, 1.0]".into(),
            ));
        }
        let labels = self.vocabulary.labels.len();
        if labels > 1 && p <= 1.0 / labels as f64 {
            return Err(ConfigError::ValidationError(format!(
                "mock.dominant_probability must exceed 1/{labels} for {labels} labels"
            )));
        }
        if self.fetch.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.timeout_ms must be > 0".into(),
            ));
        }
        if self.fetch.output_prefix.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "fetch.output_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_device() {
        let mut config = Config::default();
        config.model.device = "tpu".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("model.device"));
    }

    #[test]
    fn test_validate_rejects_non_positive_logit_scale() {
        let mut config = Config::default();
        config.scoring.logit_scale = 0.0;
        assert!(config.validate().is_err());

        config.scoring.logit_scale = f32::NAN;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logit_scale"));
    }

    #[test]
    fn test_validate_rejects_duplicate_labels() {
        let mut config = Config::default();
        config.vocabulary.labels = vec!["goth style".into(), "goth style".into()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("vocabulary.labels"));
    }

    #[test]
    fn test_validate_rejects_empty_labels() {
        let mut config = Config::default();
        config.vocabulary.labels.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.embed_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("embed_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_invalid_dominant_probability() {
        let mut config = Config::default();
        config.mock.dominant_probability = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dominant_probability"));

        config.mock.dominant_probability = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_dominant_probability_below_uniform() {
        let mut config = Config::default();
        let labels = config.vocabulary.labels.len() as f64;
        config.mock.dominant_probability = 1.0 / labels;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must exceed"));

        config.mock.dominant_probability = 0.5;
        assert!(config.validate().is_ok());
    }
}
