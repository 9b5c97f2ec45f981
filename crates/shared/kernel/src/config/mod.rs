use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable prefix for overrides (`FHUB__SERVER__PORT=8080`).
pub const ENV_PREFIX: &str = "FHUB";

/// Custom error type for config loading.
#[fhub_derive::fhub_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration from a file layered with environment overrides.
///
/// 1. **Base File**: any format the `config` crate understands (`server.toml`,
///    `server.yaml`, ...). Defaults to `server` in the working directory.
/// 2. **Environment Overrides**: variables prefixed with `FHUB__`, nested with
///    double underscores (`FHUB__WORKFLOW__MISSING_RATE=zero_cost` maps to
///    `workflow.missing_rate`).
///
/// # Errors
/// * The specified (or default) configuration file cannot be found.
/// * The content of the file does not match the structure of type `T`.
///
/// # Example
/// ```rust
/// use fhub_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .convert_case(config::Case::Snake),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhub_domain::config::{ApiConfig, MissingRatePolicy};
    use std::io::Write;

    #[test]
    fn loads_toml_file_with_defaults_for_missing_sections()
    -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("server.toml");
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, "[server]\nport = 9090\n\n[workflow]\nmissing_rate = \"zero_cost\"")?;

        let cfg: ApiConfig = load_config(Some(&path))?;
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.workflow.missing_rate, MissingRatePolicy::ZeroCost);
        assert_eq!(cfg.workflow.code_attempts, 16);
        assert_eq!(cfg.store.url, "mem://");
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let res = load_config::<ApiConfig>(Some("definitely/not/here.toml"));
        assert!(matches!(res, Err(ConfigError::Config { .. })));
    }
}
