use serde::Deserialize;
use std::{env, fs, path::Path};

/// PIN assigned to new accounts when the config does not name one.
pub const DEFAULT_PARENT_PIN: i32 = 1234;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HS256 signing secret. `JWT_SECRET` in the environment takes precedence.
    #[serde(default)]
    pub jwt_secret: String,
    pub dev_cors_origin: Option<String>,
    pub listen_port: Option<u16>,
    pub default_parent_pin: Option<i32>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    MissingSecret,
    InvalidPin(i32),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Yaml(e) => write!(f, "YAML error: {}", e),
            ConfigError::MissingSecret => {
                write!(f, "jwt_secret is empty; set it in the config or via JWT_SECRET")
            }
            ConfigError::InvalidPin(p) => {
                write!(f, "default_parent_pin {} is not a 4-digit PIN", p)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(value: serde_yaml::Error) -> Self {
        ConfigError::Yaml(value)
    }
}

impl AppConfig {
    /// Loads `CONFIG_PATH` (default `config.yaml`) and applies environment
    /// overrides. A missing default file is tolerated so the server can run
    /// from the environment alone.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = env::var("CONFIG_PATH").ok();
        let path = explicit.clone().unwrap_or_else(|| "config.yaml".to_string());
        let cfg = match Self::load_from_path(&path) {
            Ok(cfg) => cfg,
            Err(ConfigError::Io(e))
                if explicit.is_none() && e.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::info!(path = %path, "config file not found; using defaults");
                AppConfig::default()
            }
            Err(e) => return Err(e),
        };
        cfg.with_overrides(|k| env::var(k).ok())
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(&path)?;
        let cfg: AppConfig = serde_yaml::from_str(&text)?;
        Ok(cfg)
    }

    /// Applies `JWT_SECRET` from `lookup` and validates the result.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            self.jwt_secret = secret;
        }
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if let Some(pin) = self.default_parent_pin
            && !(0..=9999).contains(&pin)
        {
            return Err(ConfigError::InvalidPin(pin));
        }
        Ok(self)
    }

    pub fn parent_pin(&self) -> i32 {
        self.default_parent_pin.unwrap_or(DEFAULT_PARENT_PIN)
    }
}
