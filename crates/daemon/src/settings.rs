//! Daemon configuration
//!
//! Loaded from a YAML file and overridable through `HOOKTAIL__<SECTION>__<KEY>`
//! environment variables (e.g. `HOOKTAIL__LOKI__ENABLED=true`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::de::IgnoredAny;
use serde::Deserialize;

use hooktail_core::application::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_BATCH_WAIT, DEFAULT_PUSH_TIMEOUT, DEFAULT_SHIPPER_QUEUE_CAPACITY,
    DEFAULT_TAIL_LINES,
};
use hooktail_core::domain::hook::validate_hooks;
use hooktail_core::domain::{HookDefinition, LabelSet};
use hooktail_core::error::{AppError, Result};
use hooktail_infra_loki::LokiConfig;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const CONFIG_PATH_ENV: &str = "HOOKTAIL_CONFIG";
const ENV_PREFIX: &str = "HOOKTAIL";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub loki: LokiSettings,
    #[serde(default)]
    pub hooks: Vec<HookDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub tail: TailSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TailSettings {
    #[serde(default = "default_tail_lines")]
    pub lines: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LokiSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_batch_wait_seconds")]
    pub batch_wait_seconds: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9000
}

fn default_tail_lines() -> usize {
    DEFAULT_TAIL_LINES
}

fn default_batch_wait_seconds() -> u64 {
    DEFAULT_BATCH_WAIT.as_secs()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_PUSH_TIMEOUT.as_secs()
}

fn default_queue_capacity() -> usize {
    DEFAULT_SHIPPER_QUEUE_CAPACITY
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tail: TailSettings::default(),
        }
    }
}

impl Default for TailSettings {
    fn default() -> Self {
        Self {
            lines: default_tail_lines(),
        }
    }
}

impl Default for LokiSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            batch_wait_seconds: default_batch_wait_seconds(),
            batch_size: default_batch_size(),
            timeout_seconds: default_timeout_seconds(),
            queue_capacity: default_queue_capacity(),
            labels: BTreeMap::new(),
        }
    }
}

/// The `loki.labels` keys exactly as written in the YAML source
#[derive(Debug, Default, Deserialize)]
struct RawLabelKeys {
    #[serde(default)]
    loki: RawLoki,
}

#[derive(Debug, Default, Deserialize)]
struct RawLoki {
    #[serde(default)]
    labels: BTreeMap<String, IgnoredAny>,
}

/// Config file path: first CLI argument, then `HOOKTAIL_CONFIG`, then `config.yaml`
pub fn resolve_config_path(arg: Option<String>) -> PathBuf {
    let raw = arg
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

impl Settings {
    /// Read, merge environment overrides and validate
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

        let settings = Self::build(
            &yaml,
            Some(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            ),
        )
        .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Parse YAML text without environment overrides
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings = Self::build(yaml, None).map_err(AppError::Config)?;
        settings.validate()?;
        Ok(settings)
    }

    fn build(yaml: &str, env: Option<Environment>) -> std::result::Result<Self, String> {
        let mut builder = Config::builder().add_source(File::from_str(yaml, FileFormat::Yaml));
        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        let mut settings: Settings = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| e.to_string())?;

        // `config` folds keys to lowercase; label names are case-sensitive
        let raw: RawLabelKeys = serde_yml::from_str(yaml).map_err(|e| e.to_string())?;
        settings.loki.labels = restore_label_case(
            std::mem::take(&mut settings.loki.labels),
            raw.loki.labels.into_keys(),
        );

        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hooks.is_empty() {
            return Err(AppError::Config("no hooks configured".to_string()));
        }
        validate_hooks(&self.hooks)?;

        if self.loki.enabled {
            let loki = &self.loki;
            if loki.url.trim().is_empty() {
                return Err(AppError::Config("loki.url is required when loki is enabled".to_string()));
            }
            if loki.batch_size == 0 {
                return Err(AppError::Config("loki.batch_size must be at least 1".to_string()));
            }
            if loki.batch_wait_seconds == 0 {
                return Err(AppError::Config(
                    "loki.batch_wait_seconds must be at least 1".to_string(),
                ));
            }
            if loki.timeout_seconds == 0 {
                return Err(AppError::Config("loki.timeout_seconds must be at least 1".to_string()));
            }
            if loki.queue_capacity == 0 {
                return Err(AppError::Config("loki.queue_capacity must be at least 1".to_string()));
            }
            self.base_labels()?;
        }

        Ok(())
    }

    /// Hook definitions with `~` expanded in working directories
    pub fn hooks(&self) -> Vec<HookDefinition> {
        self.hooks
            .iter()
            .map(|hook| {
                let dir = hook.command_working_directory.to_string_lossy();
                HookDefinition {
                    command_working_directory: PathBuf::from(shellexpand::tilde(&dir).into_owned()),
                    ..hook.clone()
                }
            })
            .collect()
    }

    /// Static labels attached to every shipped line
    pub fn base_labels(&self) -> Result<LabelSet> {
        Ok(LabelSet::from_map(self.loki.labels.clone())?)
    }

    pub fn loki_config(&self) -> LokiConfig {
        LokiConfig {
            url: self.loki.url.clone(),
            batch_wait: Duration::from_secs(self.loki.batch_wait_seconds),
            batch_size: self.loki.batch_size,
            timeout: Duration::from_secs(self.loki.timeout_seconds),
            queue_capacity: self.loki.queue_capacity,
        }
    }
}

/// Rename folded label keys back to their spelling in the source file
fn restore_label_case(
    mut folded: BTreeMap<String, String>,
    original: impl IntoIterator<Item = String>,
) -> BTreeMap<String, String> {
    let mut restored = BTreeMap::new();
    for name in original {
        if let Some(value) = folded.remove(&name.to_lowercase()) {
            restored.insert(name, value);
        }
    }
    restored.append(&mut folded);
    restored
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    const FULL: &str = r#"
server:
  port: 9100
  tail:
    lines: 25
loki:
  enabled: true
  url: http://localhost:3100
  batch_wait_seconds: 2
  batch_size: 4
  timeout_seconds: 3
  labels:
    job: hooktail
hooks:
  - id: deploy
    execute-command: ./deploy.sh
    command-working-directory: /srv/app
  - id: backup
    execute-command: ./backup.sh
    command-working-directory: ~/backups
"#;

    #[test]
    fn test_full_config() {
        let settings = assert_ok!(Settings::from_yaml_str(FULL));

        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.tail.lines, 25);
        assert!(settings.loki.enabled);
        assert_eq!(settings.hooks.len(), 2);
        assert_eq!(settings.hooks[0].execute_command, "./deploy.sh");

        let loki = settings.loki_config();
        assert_eq!(loki.batch_wait, Duration::from_secs(2));
        assert_eq!(loki.batch_size, 4);
        assert_eq!(loki.timeout, Duration::from_secs(3));
        assert_eq!(loki.queue_capacity, DEFAULT_SHIPPER_QUEUE_CAPACITY);

        let labels = assert_ok!(settings.base_labels());
        assert_eq!(labels.get("job"), Some("hooktail"));
    }

    #[test]
    fn test_defaults_for_minimal_config() {
        let settings = assert_ok!(Settings::from_yaml_str(
            "hooks:\n  - id: a\n    execute-command: 'true'\n"
        ));

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.tail.lines, DEFAULT_TAIL_LINES);
        assert!(!settings.loki.enabled);
        assert_eq!(settings.hooks[0].command_working_directory, PathBuf::from("."));
    }

    #[test]
    fn test_label_names_keep_their_case() {
        let yaml = r#"
loki:
  enabled: true
  url: http://localhost:3100
  labels:
    serviceName: Api
    env: prod
hooks:
  - id: a
    execute-command: 'true'
"#;
        let settings = assert_ok!(Settings::from_yaml_str(yaml));
        let labels = assert_ok!(settings.base_labels());

        assert_eq!(labels.get("serviceName"), Some("Api"));
        assert_eq!(labels.get("servicename"), None);
        assert_eq!(labels.get("env"), Some("prod"));
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_restore_label_case_keeps_unmatched_keys() {
        let folded = BTreeMap::from([
            ("servicename".to_string(), "Api".to_string()),
            ("region".to_string(), "eu".to_string()),
        ]);

        let restored = restore_label_case(folded, ["serviceName".to_string()]);

        assert_eq!(restored.get("serviceName").map(String::as_str), Some("Api"));
        assert_eq!(restored.get("region").map(String::as_str), Some("eu"));
        assert_eq!(restored.len(), 2);
    }

    #[test]
    fn test_working_dir_tilde_is_expanded() {
        let settings = assert_ok!(Settings::from_yaml_str(FULL));
        let hooks = settings.hooks();

        assert_eq!(hooks[0].command_working_directory, PathBuf::from("/srv/app"));
        assert!(!hooks[1]
            .command_working_directory
            .to_string_lossy()
            .starts_with('~'));
    }

    #[test]
    fn test_rejects_duplicate_hook_ids() {
        let yaml = r#"
hooks:
  - id: a
    execute-command: 'true'
  - id: a
    execute-command: 'false'
"#;
        let err = assert_err!(Settings::from_yaml_str(yaml));
        assert!(err.to_string().contains("Duplicate hook id"));
    }

    #[test]
    fn test_rejects_missing_loki_url() {
        let yaml = r#"
loki:
  enabled: true
hooks:
  - id: a
    execute-command: 'true'
"#;
        let err = assert_err!(Settings::from_yaml_str(yaml));
        assert!(err.to_string().contains("loki.url"));
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let yaml = r#"
loki:
  enabled: true
  url: http://localhost:3100
  batch_size: 0
hooks:
  - id: a
    execute-command: 'true'
"#;
        let err = assert_err!(Settings::from_yaml_str(yaml));
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_disabled_loki_skips_shipping_checks() {
        let yaml = r#"
loki:
  enabled: false
  batch_size: 0
hooks:
  - id: a
    execute-command: 'true'
"#;
        assert_ok!(Settings::from_yaml_str(yaml));
    }

    #[test]
    fn test_rejects_empty_hook_list() {
        assert_err!(Settings::from_yaml_str("server:\n  port: 9000\n"));
    }

    #[test]
    fn test_resolve_config_path_prefers_argument() {
        assert_eq!(
            resolve_config_path(Some("/etc/hooktail.yaml".to_string())),
            PathBuf::from("/etc/hooktail.yaml")
        );
    }
}
