use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::render::icons::ThreatIcon;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub maps: MapsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Location service host name, without scheme.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_scheme")]
    pub scheme: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Pre-encoded `user:password` in Base64, used when no username/password is set.
    #[serde(default)]
    pub basic_auth: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "cmxlocationsandbox.cisco.com".to_string()
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            scheme: default_scheme(),
            username: None,
            password: None,
            basic_auth: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    /// Directory searched (recursively) for floor plan images.
    #[serde(default = "default_floorplan_dir")]
    pub floorplan_dir: PathBuf,

    /// Image used when a client's floor plan is not available, relative to `floorplan_dir`.
    #[serde(default = "default_map")]
    pub default_map: String,

    #[serde(default = "default_icon_dir")]
    pub icon_dir: PathBuf,

    #[serde(default)]
    pub icon: ThreatIcon,

    /// Where annotated client maps are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("cmxtrack")
}

fn default_floorplan_dir() -> PathBuf {
    data_dir().join("floorplans")
}

fn default_map() -> String {
    "blankfloor.jpg".to_string()
}

fn default_icon_dir() -> PathBuf {
    data_dir().join("icons")
}

fn default_output_dir() -> PathBuf {
    data_dir().join("maps")
}

fn default_extensions() -> Vec<String> {
    vec![
        "jpg".to_string(),
        "jpeg".to_string(),
        "png".to_string(),
        "gif".to_string(),
        "bmp".to_string(),
    ]
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            floorplan_dir: default_floorplan_dir(),
            default_map: default_map(),
            icon_dir: default_icon_dir(),
            icon: ThreatIcon::default(),
            output_dir: default_output_dir(),
            extensions: default_extensions(),
        }
    }
}

impl MapsConfig {
    pub fn default_map_path(&self) -> PathBuf {
        self.floorplan_dir.join(&self.default_map)
    }

    pub fn icon_path(&self) -> PathBuf {
        self.icon_dir.join(self.icon.file_name())
    }
}

impl Config {
    /// Load from `CMXTRACK_CONFIG` or the default location, writing defaults on first run.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("CMXTRACK_CONFIG") {
            return Self::load_from(Path::new(&path));
        }

        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cmxtrack")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}
