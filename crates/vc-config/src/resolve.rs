//! Config resolution: CLI → env → XDG → defaults.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::settings::Config;
use crate::validate::{ValidationError, ValidationResult};

/// Env var naming a config file.
pub const CONFIG_ENV: &str = "VOTER_COUNT_CONFIG";
/// Env var overriding `point_source`.
pub const POINT_SOURCE_ENV: &str = "VOTER_COUNT_POINT_SOURCE";
/// Env var overriding `artifacts.scratch_dir`.
pub const SCRATCH_DIR_ENV: &str = "VOTER_COUNT_SCRATCH_DIR";

const CONFIG_DIR_NAME: &str = "voter-count";
const CONFIG_FILE_NAME: &str = "config.json";

/// Where the effective config came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ConfigSource {
    Cli(PathBuf),
    Env(PathBuf),
    Xdg(PathBuf),
    Defaults,
}

/// Effective configuration plus provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub config: Config,
    pub source: ConfigSource,
    /// Env overrides that were applied, by variable name.
    pub overrides: Vec<String>,
}

/// Resolve the effective configuration from the process environment.
pub fn resolve_config(cli_path: Option<&Path>) -> ValidationResult<ResolvedConfig> {
    resolve_with(cli_path, |key| std::env::var(key).ok(), dirs::config_dir())
}

/// Resolve with an explicit env lookup and config dir, for tests.
pub fn resolve_with(
    cli_path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
    config_dir: Option<PathBuf>,
) -> ValidationResult<ResolvedConfig> {
    let (mut config, source) = if let Some(path) = cli_path {
        (load_required(path)?, ConfigSource::Cli(path.to_path_buf()))
    } else if let Some(path) = env(CONFIG_ENV).filter(|v| !v.is_empty()) {
        let path = PathBuf::from(path);
        (load_required(&path)?, ConfigSource::Env(path))
    } else {
        match config_dir.map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)) {
            Some(path) if path.is_file() => (Config::from_file(&path)?, ConfigSource::Xdg(path)),
            _ => (Config::default(), ConfigSource::Defaults),
        }
    };

    let mut overrides = Vec::new();
    if let Some(source) = env(POINT_SOURCE_ENV).filter(|v| !v.is_empty()) {
        config.point_source = source;
        overrides.push(POINT_SOURCE_ENV.to_string());
    }
    if let Some(dir) = env(SCRATCH_DIR_ENV).filter(|v| !v.is_empty()) {
        config.artifacts.scratch_dir = Some(PathBuf::from(dir));
        overrides.push(SCRATCH_DIR_ENV.to_string());
    }

    config.validate()?;
    Ok(ResolvedConfig {
        config,
        source,
        overrides,
    })
}

fn load_required(path: &Path) -> ValidationResult<Config> {
    if !path.exists() {
        return Err(ValidationError::NotFound(path.to_path_buf()));
    }
    Config::from_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let resolved = resolve_with(None, env_of(&[]), Some(temp.path().to_path_buf())).unwrap();
        assert_eq!(resolved.source, ConfigSource::Defaults);
        assert_eq!(resolved.config, Config::default());
        assert!(resolved.overrides.is_empty());
    }

    #[test]
    fn cli_path_beats_env_and_xdg() {
        let temp = TempDir::new().unwrap();
        let cli = temp.path().join("cli.json");
        std::fs::write(&cli, r#"{"point_source": "cli.geojson"}"#).unwrap();
        let env_file = temp.path().join("env.json");
        std::fs::write(&env_file, r#"{"point_source": "env.geojson"}"#).unwrap();

        let resolved = resolve_with(
            Some(&cli),
            env_of(&[(CONFIG_ENV, env_file.to_str().unwrap())]),
            None,
        )
        .unwrap();
        assert_eq!(resolved.source, ConfigSource::Cli(cli));
        assert_eq!(resolved.config.point_source, "cli.geojson");
    }

    #[test]
    fn env_config_path_is_used() {
        let temp = TempDir::new().unwrap();
        let env_file = temp.path().join("env.json");
        std::fs::write(&env_file, r#"{"summary": {"sum_field": "total_voters"}}"#).unwrap();

        let resolved = resolve_with(None, env_of(&[(CONFIG_ENV, env_file.to_str().unwrap())]), None)
            .unwrap();
        assert_eq!(resolved.source, ConfigSource::Env(env_file));
        assert_eq!(resolved.config.summary.sum_field, "total_voters");
    }

    #[test]
    fn xdg_file_is_found() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(CONFIG_DIR_NAME);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE_NAME), r#"{"remote": {"page_size": 10}}"#).unwrap();

        let resolved = resolve_with(None, env_of(&[]), Some(temp.path().to_path_buf())).unwrap();
        assert!(matches!(resolved.source, ConfigSource::Xdg(_)));
        assert_eq!(resolved.config.remote.page_size, 10);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.json");
        let err = resolve_with(Some(&missing), env_of(&[]), None).unwrap_err();
        assert!(matches!(err, ValidationError::NotFound(_)));
    }

    #[test]
    fn env_overrides_apply_on_top_of_file() {
        let resolved = resolve_with(
            None,
            env_of(&[
                (POINT_SOURCE_ENV, "/data/points.geojson"),
                (SCRATCH_DIR_ENV, "/data/scratch"),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(resolved.config.point_source, "/data/points.geojson");
        assert_eq!(
            resolved.config.artifacts.scratch_dir,
            Some(PathBuf::from("/data/scratch"))
        );
        assert_eq!(resolved.overrides, vec![POINT_SOURCE_ENV, SCRATCH_DIR_ENV]);
    }

    #[test]
    fn invalid_file_fails_validation() {
        let temp = TempDir::new().unwrap();
        let cli = temp.path().join("bad.json");
        std::fs::write(&cli, r#"{"remote": {"page_size": 0}}"#).unwrap();
        let err = resolve_with(Some(&cli), env_of(&[]), None).unwrap_err();
        assert!(matches!(err, ValidationError::Invalid(_)));
    }
}
