//! CLI configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Directory holding the config file and, by default, the tours
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".panotour")
}

pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    config_dir().join("tours")
}

/// Persistent settings from `~/.panotour/config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where tours are stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Keep landmark groups in exports unless told otherwise
    #[serde(default)]
    pub persist_landmarks: bool,

    /// Colocation radius in metres given to imported root groups without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_colocated_radius: Option<f64>,
}

impl Config {
    /// Read the config file, falling back to defaults when it is missing or
    /// unreadable
    pub fn load() -> Self {
        let path = config_file_path();
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config at {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &["data_dir", "persist_landmarks", "default_colocated_radius"]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_dir" => Some(
                self.data_dir
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| format!("{} (default)", default_data_dir().display())),
            ),
            "persist_landmarks" => Some(self.persist_landmarks.to_string()),
            "default_colocated_radius" => Some(
                self.default_colocated_radius
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "(not set)".to_string()),
            ),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "data_dir" => self.data_dir = Some(PathBuf::from(value)),
            "persist_landmarks" => {
                self.persist_landmarks = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("persist_landmarks must be true or false"))?
            }
            "default_colocated_radius" => {
                let radius: f64 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("default_colocated_radius must be a number"))?;
                if !radius.is_finite() || radius < 0.0 {
                    anyhow::bail!("default_colocated_radius must be a non-negative number");
                }
                self.default_colocated_radius = Some(radius);
            }
            _ => anyhow::bail!(
                "Unknown config key: {}. Available keys: {}",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }

    /// Tour directory unless overridden on the command line
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut config = Config::default();
        config.set("persist_landmarks", "true").unwrap();
        config.set("default_colocated_radius", "12.5").unwrap();
        config.set("data_dir", "/srv/tours").unwrap();

        assert_eq!(config.get("persist_landmarks").as_deref(), Some("true"));
        assert_eq!(config.get("default_colocated_radius").as_deref(), Some("12.5"));
        assert_eq!(config.data_dir(), PathBuf::from("/srv/tours"));
        assert!(config.get("colour").is_none());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("persist_landmarks", "maybe").is_err());
        assert!(config.set("default_colocated_radius", "-3").is_err());
        assert!(config.set("colour", "blue").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config {
            data_dir: None,
            persist_landmarks: true,
            default_colocated_radius: Some(20.0),
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("persist_landmarks = true"));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.default_colocated_radius, Some(20.0));
        assert!(parsed.data_dir.is_none());
    }
}
