//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.normalize.max_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "normalize.max_dimension must be > 0".into(),
            ));
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
        if self.limits.max_alloc_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_alloc_mb must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.llm_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.llm_timeout_ms must be > 0".into(),
            ));
        }
        if self.bedrock.model_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "bedrock.model_id must not be empty".into(),
            ));
        }
        if self.bedrock.prompt.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "bedrock.prompt must not be empty".into(),
            ));
        }
        if self.bedrock.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "bedrock.max_tokens must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.bedrock.temperature) {
            return Err(ConfigError::ValidationError(
                "bedrock.temperature must be between 0.0 and 1.0".into(),
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
    fn test_validate_rejects_zero_max_dimension() {
        let mut config = Config::default();
        config.normalize.max_dimension = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("normalize.max_dimension"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.llm_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("llm_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_blank_model_id() {
        let mut config = Config::default();
        config.bedrock.model_id = "   ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("model_id"));
    }

    #[test]
    fn test_validate_rejects_invalid_temperature() {
        let mut config = Config::default();
        config.bedrock.temperature = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));

        config.bedrock.temperature = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }
}
