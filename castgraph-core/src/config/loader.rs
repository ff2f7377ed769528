use crate::config::Config;
use crate::core::{CastGraphError, Result};
use std::fs;
use std::path::Path;

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML configuration format
    Toml,
    /// JSON configuration format
    Json,
    /// YAML configuration format
    Yaml,
}

impl ConfigFormat {
    /// Determine configuration format from file extension
    pub fn from_extension(path: &str) -> Self {
        let path = Path::new(path);
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => ConfigFormat::Toml,
            Some("json") => ConfigFormat::Json,
            Some("yaml" | "yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Toml, // Default
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &str) -> Result<Config> {
    let format = ConfigFormat::from_extension(path);

    if !Path::new(path).exists() {
        return Err(CastGraphError::Config {
            message: format!("Configuration file not found: {path}"),
        });
    }

    let content = fs::read_to_string(path)?;
    let config = parse_config(&content, format)?;
    tracing::debug!(path, ?format, "loaded configuration");
    Ok(config)
}

/// Parse configuration text in the given format
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Config> {
    match format {
        ConfigFormat::Toml => load_toml_config(content),
        ConfigFormat::Json => load_json_config(content),
        ConfigFormat::Yaml => load_yaml_config(content),
    }
}

#[cfg(feature = "toml-support")]
fn load_toml_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| CastGraphError::Config {
        message: format!("Failed to parse TOML config: {e}"),
    })
}

#[cfg(not(feature = "toml-support"))]
fn load_toml_config(_content: &str) -> Result<Config> {
    Err(CastGraphError::Config {
        message: "TOML support not enabled. Enable 'toml-support' feature.".to_string(),
    })
}

fn load_json_config(content: &str) -> Result<Config> {
    serde_json::from_str(content).map_err(|e| CastGraphError::Config {
        message: format!("Failed to parse JSON config: {e}"),
    })
}

#[cfg(feature = "yaml-support")]
fn load_yaml_config(content: &str) -> Result<Config> {
    serde_yaml::from_str(content).map_err(|e| CastGraphError::Config {
        message: format!("Failed to parse YAML config: {e}"),
    })
}

#[cfg(not(feature = "yaml-support"))]
fn load_yaml_config(_content: &str) -> Result<Config> {
    Err(CastGraphError::Config {
        message: "YAML support not enabled. Enable 'yaml-support' feature.".to_string(),
    })
}

/// Render configuration in the given format
pub fn render_config(config: &Config, format: ConfigFormat) -> Result<String> {
    match format {
        ConfigFormat::Toml => render_toml_config(config),
        ConfigFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        ConfigFormat::Yaml => render_yaml_config(config),
    }
}

#[cfg(feature = "toml-support")]
fn render_toml_config(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| CastGraphError::Config {
        message: format!("Failed to serialize TOML config: {e}"),
    })
}

#[cfg(not(feature = "toml-support"))]
fn render_toml_config(_config: &Config) -> Result<String> {
    Err(CastGraphError::Config {
        message: "TOML support not enabled. Enable 'toml-support' feature.".to_string(),
    })
}

#[cfg(feature = "yaml-support")]
fn render_yaml_config(config: &Config) -> Result<String> {
    serde_yaml::to_string(config).map_err(|e| CastGraphError::Config {
        message: format!("Failed to serialize YAML config: {e}"),
    })
}

#[cfg(not(feature = "yaml-support"))]
fn render_yaml_config(_config: &Config) -> Result<String> {
    Err(CastGraphError::Config {
        message: "YAML support not enabled. Enable 'yaml-support' feature.".to_string(),
    })
}

/// Save configuration to file
pub fn save_config(config: &Config, path: &str) -> Result<()> {
    let format = ConfigFormat::from_extension(path);
    let content = render_config(config, format)?;

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, content)?;
    tracing::info!(path, "configuration saved");
    Ok(())
}
