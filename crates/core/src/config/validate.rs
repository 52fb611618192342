use std::collections::HashSet;

use super::{types::Config, ConfigError};
use crate::dispatch::MAX_SCORE;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Confidence threshold leaves room for a dispatch
/// - At least one gate, with unique non-blank names
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.dispatch.confidence_threshold >= MAX_SCORE {
        return Err(ConfigError::ValidationError(format!(
            "dispatch.confidence_threshold must be below {} (scores never exceed it)",
            MAX_SCORE
        )));
    }

    if config.gates.defaults.is_empty() {
        return Err(ConfigError::ValidationError(
            "gates.defaults must name at least one gate".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for name in &config.gates.defaults {
        if name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "gates.defaults contains a blank name".to_string(),
            ));
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "gates.defaults contains duplicate gate '{}'",
                name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use std::net::IpAddr;

    fn with_gates(names: &[&str]) -> Config {
        let mut config = Config::default();
        config.gates.defaults = names.iter().map(|n| n.to_string()).collect();
        config
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_threshold_bounds() {
        let mut config = Config::default();
        config.dispatch.confidence_threshold = 98;
        assert!(validate_config(&config).is_ok());

        config.dispatch.confidence_threshold = 99;
        assert!(validate_config(&config).is_err());

        config.dispatch.confidence_threshold = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_gate_names() {
        assert!(validate_config(&with_gates(&[])).is_err());
        assert!(validate_config(&with_gates(&["A", " "])).is_err());
        assert!(validate_config(&with_gates(&["A", "B", "A"])).is_err());
        assert!(validate_config(&with_gates(&["North"])).is_ok());
    }
}
