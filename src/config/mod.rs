use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod validator;

use crate::cli::Cli;
use crate::domain::FormDefinition;

pub use crate::DEFAULT_BASE_URL;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub drafts: DraftSettings,
    pub preferences: PreferenceSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DraftSettings {
    /// Directory holding `draft-{formId}.json` files
    pub dir: PathBuf,
    pub debounce_ms: u64,
}

impl DraftSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreferenceSettings {
    pub path: PathBuf,
}

/// Mock API server
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub forms_dir: PathBuf,
    pub options_dir: PathBuf,
}

/// An option list served by the mock API, keyed by dependency value
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OptionList {
    pub name: String,
    #[serde(default)]
    pub options: HashMap<String, Vec<Value>>,
}

impl Settings {
    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(&cli.config)?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(config_path: &Path) -> Result<Self, anyhow::Error> {
        let settings = Self::load(config_path)?;
        settings.validate()?;
        Ok(settings)
    }

    fn load(config_path: &Path) -> Result<Self, anyhow::Error> {
        let root = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let s = Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.timeout_secs", 30)?
            .set_default("drafts.dir", ".coverform/drafts")?
            .set_default("drafts.debounce_ms", 1000)?
            .set_default("preferences.path", ".coverform/preferences.json")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.forms_dir", "config/forms")?
            .set_default("server.options_dir", "config/options")?
            .add_source(File::from(config_path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("COVERFORM").separator("__"))
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;
        settings.resolve_paths(root);
        Ok(settings)
    }

    /// Relative paths are relative to the directory of the config file
    fn resolve_paths(&mut self, root: &Path) {
        for path in [
            &mut self.drafts.dir,
            &mut self.preferences.path,
            &mut self.server.forms_dir,
            &mut self.server.options_dir,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(base_url) = &cli.base_url {
            self.api.base_url = base_url.clone();
        }
        if let Some((host, port)) = cli.serve_overrides() {
            if let Some(host) = host {
                self.server.host = host.to_string();
            }
            if let Some(port) = port {
                self.server.port = port;
            }
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!("Configuration validation failed:\n{}", error_messages.join("\n"))
        })
    }
}

/// Reads every `*.json|*.yaml|*.yml` form definition in `path`
pub fn load_forms_from_dir(path: &Path) -> Result<Vec<FormDefinition>, anyhow::Error> {
    let forms: Vec<FormDefinition> = load_dir(path)?;

    validator::ConfigValidator::validate_forms(&forms).map_err(|errors| {
        let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        anyhow::anyhow!("Form validation failed:\n{}", error_messages.join("\n"))
    })?;

    Ok(forms)
}

/// Reads every option list in `path`, keyed by list name
pub fn load_option_lists_from_dir(path: &Path) -> Result<HashMap<String, OptionList>, anyhow::Error> {
    let lists: Vec<OptionList> = load_dir(path)?;
    Ok(lists.into_iter().map(|l| (l.name.clone(), l)).collect())
}

fn load_dir<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, anyhow::Error> {
    let pattern = format!("{}/*", path.display());
    let mut items = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) => {
                if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                    if matches!(ext, "json" | "yaml" | "yml") {
                        let content = std::fs::read_to_string(&path)?;
                        let item: T = if ext == "json" {
                            serde_json::from_str(&content)
                                .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?
                        } else {
                            serde_yaml::from_str(&content)
                                .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?
                        };
                        items.push(item);
                    }
                }
            }
            Err(e) => tracing::warn!("Failed to read glob entry: {}", e),
        }
    }
    Ok(items)
}
