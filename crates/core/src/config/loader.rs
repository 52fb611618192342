use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "VALET_CONFIG";

/// Config file used when `VALET_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn env_overrides() -> Env {
    // VALET_DISPATCH__CONFIDENCE_THRESHOLD=80 -> dispatch.confidence_threshold
    Env::prefixed("VALET_").split("__")
}

/// Load configuration from file with environment variable overrides.
///
/// `None` means no file: defaults plus environment only.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let figment = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.display().to_string()));
            }
            Figment::new().merge(Toml::file(path))
        }
        None => Figment::new(),
    };

    figment
        .merge(env_overrides())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScorerKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.server.port, 3008);
        assert_eq!(config.dispatch.confidence_threshold, 90);
        assert_eq!(config.dispatch.scorer, ScorerKind::Signal);
        assert_eq!(config.gates.defaults, vec!["A", "B", "C", "D"]);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[server]
port = 9000

[dispatch]
confidence_threshold = 75
scorer = "random"

[gates]
defaults = ["North", "South"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.dispatch.confidence_threshold, 75);
        assert_eq!(config.dispatch.scorer, ScorerKind::Random);
        assert_eq!(config.gates.defaults, vec!["North", "South"]);
    }

    #[test]
    fn test_load_config_from_str_bad_scorer() {
        let toml = r#"
[dispatch]
scorer = "oracle"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
host = "127.0.0.1"
port = 3100

[database]
path = "/tmp/valet-test.db"
"#
        )
        .unwrap();

        let config = load_config(Some(temp_file.path())).unwrap();
        assert_eq!(config.server.port, 3100);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.database.path.to_str(), Some("/tmp/valet-test.db"));
    }
}
