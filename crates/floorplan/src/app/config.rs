use std::path::Path;

use fp_api::ApiConfig;
use miette::{Context, IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

pub const CONFIG_FILE_NAME: &str = "floorplan.toml";

pub const API_URL_ENV: &str = "FLOORPLAN_API_URL";
pub const STORAGE_URL_ENV: &str = "FLOORPLAN_STORAGE_URL";
pub const API_KEY_ENV: &str = "FLOORPLAN_API_KEY";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorplanConfig {
    pub api: ApiConfig,
}

impl FloorplanConfig {
    /// Reads `floorplan.toml` from `dir`. A missing file yields the defaults,
    /// which are written back so users have something to edit.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            let text = std::fs::read_to_string(&path)
                .into_diagnostic()
                .wrap_err("failed to read configuration file")?;
            let config = toml::from_str(&text)
                .into_diagnostic()
                .wrap_err(path.display().to_string())
                .wrap_err("failed to parse configuration file")?;
            info!(path = %path.display(), "configuration loaded");
            Ok(config)
        } else {
            let config = Self::default();
            match toml::to_string_pretty(&config) {
                Ok(text) => {
                    if let Err(e) = std::fs::write(&path, text) {
                        warn!(?e, path = %path.display(), "failed to write default configuration");
                    } else {
                        info!(path = %path.display(), "default configuration written");
                    }
                }
                Err(e) => warn!(?e, "failed to serialize default configuration"),
            }
            Ok(config)
        }
    }

    /// Applies the `FLOORPLAN_*` overrides found by `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(API_URL_ENV) {
            self.api.api_base_url = parse_url(API_URL_ENV, &url)?;
        }
        if let Some(url) = lookup(STORAGE_URL_ENV) {
            self.api.storage_url = parse_url(STORAGE_URL_ENV, &url)?;
        }
        if let Some(key) = lookup(API_KEY_ENV) {
            self.api.api_key = Some(key).filter(|k| !k.is_empty());
        }
        Ok(())
    }

    /// [`Self::load`] followed by the environment overrides.
    pub fn from_env(dir: &Path) -> Result<Self> {
        let mut config = Self::load(dir)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }
}

fn parse_url(var: &str, value: &str) -> Result<Url> {
    Url::parse(value)
        .into_diagnostic()
        .wrap_err_with(|| format!("{var} is not a valid url: `{value}`"))
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn scratch_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("floorplan-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_file_yields_defaults_and_is_written_back() {
        let dir = scratch_dir();
        let config = FloorplanConfig::load(&dir).unwrap();
        assert_eq!(config, FloorplanConfig::default());
        let written = std::fs::read_to_string(dir.join(CONFIG_FILE_NAME)).unwrap();
        assert!(written.contains("bucket = \"mappings\""));
        assert_eq!(FloorplanConfig::load(&dir).unwrap(), config);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = scratch_dir();
        std::fs::write(
            dir.join(CONFIG_FILE_NAME),
            "[api]\napi_base_url = \"https://registry.example.com/api\"\ntimeout_secs = 5\n",
        )
        .unwrap();
        let config = FloorplanConfig::load(&dir).unwrap();
        assert_eq!(
            config.api.api_base_url.as_str(),
            "https://registry.example.com/api"
        );
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.bucket, "mappings");
        assert_eq!(config.api.cache_control_secs, 3600);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = scratch_dir();
        std::fs::write(dir.join(CONFIG_FILE_NAME), "[api\n").unwrap();
        assert!(FloorplanConfig::load(&dir).is_err());
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn environment_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (API_URL_ENV, "https://registry.example.com"),
            (STORAGE_URL_ENV, "https://project.supabase.co/storage/v1"),
            (API_KEY_ENV, "anon-key"),
        ]);
        let mut config = FloorplanConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api.api_base_url.as_str(), "https://registry.example.com/");
        assert_eq!(config.api.api_key.as_deref(), Some("anon-key"));
    }

    #[rstest]
    #[case(API_URL_ENV)]
    #[case(STORAGE_URL_ENV)]
    fn invalid_url_override(#[case] var: &str) {
        let mut config = FloorplanConfig::default();
        assert!(config
            .apply_overrides(|key| (key == var).then(|| "not a url".to_string()))
            .is_err());
    }
}
