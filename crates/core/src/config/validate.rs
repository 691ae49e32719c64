use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Pool capacity is at least 1
/// - Process timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.pool.capacity == 0 {
        return Err(ConfigError::ValidationError(
            "pool.capacity must be at least 1".to_string(),
        ));
    }

    if config.tools.process_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "tools.process_timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
