use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Every path in [`Config::path_fields`] is an existing directory
/// - Dormant period is not 0
///
/// All problems are reported together.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut problems = Vec::new();

    for (name, path) in config.path_fields() {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => problems.push(format!("{} is not a directory: '{}'", name, path.display())),
            Err(e) => problems.push(format!("{} '{}': {}", name, path.display(), e)),
        }
    }

    if config.dormant_period_secs == 0 {
        problems.push("dormant_period_secs cannot be 0".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(problems.join("; ")))
    }
}
