use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - A model is named and its HTTP timeout is not 0
/// - Generation tuning (see `GenerationConfig::validate`)
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.llm.model.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "llm.model cannot be empty".to_string(),
        ));
    }

    if config.llm.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "llm.timeout_secs must be greater than 0".to_string(),
        ));
    }

    config
        .generation
        .validate()
        .map_err(ConfigError::ValidationError)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, ServerConfig};
    use crate::generation::{GenerationConfig, LlmConfig};
    use std::net::IpAddr;

    fn config() -> Config {
        Config {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            llm: LlmConfig::new("gpt-4o-mini"),
            generation: GenerationConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = config();
        config.server = ServerConfig {
            host: "0.0.0.0".parse::<IpAddr>().unwrap(),
            port: 0,
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_empty_model_fails() {
        let mut config = config();
        config.llm.model = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_generation_settings() {
        let mut config = config();
        config.generation.temperature = -1.0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }
}
