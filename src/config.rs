use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "bootstrap.json";

/// Knobs for the bootstrap sequence. Every field falls back to the value
/// baked into the shipped bundle when `bootstrap.json` is absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Python version pinned for `uv python install`.
    pub python_version: String,
    /// Package index used for the first dependency sync.
    pub default_index: String,
    /// Entry point handed to `uv run`.
    pub entry: String,
    /// Bundle subdirectory holding the uv installer assets.
    pub assets_dir: String,
    /// Bundle subdirectory holding the application project.
    pub project_dir: String,
    /// Installer script inside the assets directory.
    pub installer_script: String,
    pub extras: ExtrasConfig,
}

/// The optional large-package install offered after the first sync.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtrasConfig {
    pub prompt: String,
    pub packages: Vec<String>,
    pub index_url: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            python_version: "3.11.9".to_string(),
            default_index: "https://pypi.tuna.tsinghua.edu.cn/simple".to_string(),
            entry: "app.py".to_string(),
            assets_dir: "uv".to_string(),
            project_dir: "python".to_string(),
            installer_script: "uv-installer.ps1".to_string(),
            extras: ExtrasConfig::default(),
        }
    }
}

impl Default for ExtrasConfig {
    fn default() -> Self {
        Self {
            prompt: "Install the CUDA build of PyTorch (2.3 GiB)? (y/n) \
                     The download is often slow even through the mirror."
                .to_string(),
            packages: vec![
                "torch".to_string(),
                "torchvision".to_string(),
                "torchaudio".to_string(),
            ],
            index_url: "https://mirror.nju.edu.cn/pytorch/whl/cu126".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("config field '{0}' must not be empty")]
    EmptyField(&'static str),
    #[error("python_version '{0}' is not a dotted version number")]
    InvalidPythonVersion(String),
    #[error("extras.packages entries must not be empty")]
    EmptyPackageName,
}

/// Load `bootstrap.json` from the bundle root when present, otherwise the
/// built-in defaults.
pub fn load_config(dir: &Path) -> anyhow::Result<BootstrapConfig> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(BootstrapConfig::default());
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    let config: BootstrapConfig = serde_json::from_str(&data)
        .with_context(|| format!("parsing config at {}", path.display()))?;
    validate_config(config).with_context(|| format!("validating config at {}", path.display()))
}

fn validate_config(config: BootstrapConfig) -> Result<BootstrapConfig, ConfigValidationError> {
    let required = [
        ("python_version", &config.python_version),
        ("default_index", &config.default_index),
        ("entry", &config.entry),
        ("assets_dir", &config.assets_dir),
        ("project_dir", &config.project_dir),
        ("installer_script", &config.installer_script),
        ("extras.index_url", &config.extras.index_url),
        ("extras.prompt", &config.extras.prompt),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigValidationError::EmptyField(field));
        }
    }

    if parse_version(&config.python_version).is_none() {
        return Err(ConfigValidationError::InvalidPythonVersion(
            config.python_version.clone(),
        ));
    }

    if config
        .extras
        .packages
        .iter()
        .any(|package| package.trim().is_empty())
    {
        return Err(ConfigValidationError::EmptyPackageName);
    }

    Ok(config)
}

fn parse_version(version: &str) -> Option<Vec<u64>> {
    let mut parts = Vec::new();
    for part in version.split('.') {
        parts.push(part.trim().parse::<u64>().ok()?);
    }
    Some(parts)
}
