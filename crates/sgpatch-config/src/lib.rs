//! sgpatch configuration
//!
//! Loads settings from `~/.config/sgpatch/config.toml` or an explicit path.
//! Every field has a default, so a partial file (or no file) is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use sgpatch_core::config::DEFAULT_SUFFIX;
use sgpatch_core::{RewriteConfig, RewriteError, RuleCatalogue, UV_CHANNELS};

/// Configuration directory name under the user config root
const CONFIG_DIR_NAME: &str = "sgpatch";
/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Which transforms run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Replace the instancing built-in with an explicit instance index
    pub instance_id: bool,
    /// Flag `NoInterpolation` custom interpolators as `nointerpolation`
    pub no_interpolation: bool,
    /// UV channel types: default, uint16, int16, uint or int
    pub uv0: String,
    pub uv1: String,
    pub uv2: String,
    pub uv3: String,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            instance_id: true,
            no_interpolation: true,
            uv0: "default".to_string(),
            uv1: "default".to_string(),
            uv2: "default".to_string(),
            uv3: "default".to_string(),
        }
    }
}

impl PatchConfig {
    pub fn uv_selectors(&self) -> [&str; UV_CHANNELS] {
        [&self.uv0, &self.uv1, &self.uv2, &self.uv3]
    }

    /// Mutable selector for a channel, `None` when out of range
    pub fn uv_selector_mut(&mut self, channel: usize) -> Option<&mut String> {
        match channel {
            0 => Some(&mut self.uv0),
            1 => Some(&mut self.uv1),
            2 => Some(&mut self.uv2),
            3 => Some(&mut self.uv3),
            _ => None,
        }
    }
}

/// Output naming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Appended to the shader name and to the output file stem
    pub suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

/// External graph-to-shader generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Program that prints generated shader text for a graph asset
    pub program: Option<String>,
    /// Arguments; `{input}` and `{name}` are substituted
    pub args: Vec<String>,
    /// Extra argument passed when the input is a sub-graph
    pub sub_graph_flag: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: None,
            args: vec!["{input}".to_string()],
            sub_graph_flag: "--subgraph".to_string(),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub patch: PatchConfig,
    pub output: OutputConfig,
    pub generator: GeneratorConfig,
    /// Marker overrides for other generator versions
    pub markers: RuleCatalogue,
}

impl Config {
    /// Load from the default location, falling back to defaults if absent
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from a specific path; the file must exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), Box::new(e)))?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Get the configuration directory path (~/.config/sgpatch/)
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(home.join(".config").join(CONFIG_DIR_NAME))
    }

    /// Get the configuration file path (~/.config/sgpatch/config.toml)
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Serialize with a header comment
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let toml_content = toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?;
        Ok(format!(
            "# sgpatch configuration\n\
             #\n\
             # [patch] uv0..uv3 accept: default, uint16, int16, uint, int\n\
             # [generator] args may use {{input}} and {{name}}\n\
             # [markers] only needs the entries that differ for your generator version\n\
             \n\
             {toml_content}"
        ))
    }

    /// Write the default configuration to `path`
    pub fn create_default_config(path: &Path, force: bool) -> Result<(), ConfigError> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDirError(dir.to_path_buf(), e))?;
        }

        let content = Config::default().to_toml_string()?;
        fs::write(path, content).map_err(|e| ConfigError::WriteError(path.to_path_buf(), e))?;

        log::info!("Created default configuration at {:?}", path);
        Ok(())
    }

    /// Build the engine configuration, validating UV selectors
    pub fn rewrite_config(&self) -> Result<RewriteConfig, ConfigError> {
        let config = RewriteConfig {
            patch_instance_id: self.patch.instance_id,
            patch_no_interpolation: self.patch.no_interpolation,
            name_suffix: self.output.suffix.clone(),
            ..RewriteConfig::default()
        }
        .with_uv_selectors(&self.patch.uv_selectors())?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Home directory not found
    NoHomeDirectory,
    /// Failed to read config file
    ReadError(PathBuf, std::io::Error),
    /// Failed to parse config file
    ParseError(PathBuf, Box<toml::de::Error>),
    /// Failed to serialize config
    SerializeError(toml::ser::Error),
    /// Failed to write config file
    WriteError(PathBuf, std::io::Error),
    /// Failed to create directory
    CreateDirError(PathBuf, std::io::Error),
    /// Refused to overwrite an existing config file
    AlreadyExists(PathBuf),
    /// A value was rejected by the rewrite engine
    Rewrite(RewriteError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoHomeDirectory => write!(f, "Could not determine home directory"),
            ConfigError::ReadError(path, e) => write!(f, "Failed to read {:?}: {}", path, e),
            ConfigError::ParseError(path, e) => write!(f, "Failed to parse {:?}: {}", path, e),
            ConfigError::SerializeError(e) => write!(f, "Failed to serialize config: {}", e),
            ConfigError::WriteError(path, e) => write!(f, "Failed to write {:?}: {}", path, e),
            ConfigError::CreateDirError(path, e) => write!(f, "Failed to create {:?}: {}", path, e),
            ConfigError::AlreadyExists(path) => {
                write!(f, "{:?} already exists (use --force to overwrite)", path)
            }
            ConfigError::Rewrite(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError(_, e)
            | ConfigError::WriteError(_, e)
            | ConfigError::CreateDirError(_, e) => Some(e),
            ConfigError::ParseError(_, e) => Some(e.as_ref()),
            ConfigError::SerializeError(e) => Some(e),
            ConfigError::Rewrite(e) => Some(e),
            ConfigError::NoHomeDirectory | ConfigError::AlreadyExists(_) => None,
        }
    }
}

impl From<RewriteError> for ConfigError {
    fn from(e: RewriteError) -> Self {
        ConfigError::Rewrite(e)
    }
}
