use crate::error::{Result, SlidecastError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default voice used when neither the CLI nor the config specifies one.
pub const DEFAULT_VOICE: &str = "onyx";

/// Default synthesis model.
pub const DEFAULT_MODEL: &str = "tts-1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub default_voice: String,
    pub default_model: String,
    pub default_speed: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            default_voice: DEFAULT_VOICE.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            default_speed: 1.0,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<Config>(&contents) {
                    config = file_config;
                }
            }
        }

        // Override with environment variables
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.openai_api_key = Some(key);
        }
        if let Ok(voice) = std::env::var("SLIDECAST_VOICE") {
            config.default_voice = voice;
        }
        if let Ok(model) = std::env::var("SLIDECAST_MODEL") {
            config.default_model = model;
        }
        if let Ok(speed) = std::env::var("SLIDECAST_SPEED") {
            if let Ok(s) = speed.parse() {
                config.default_speed = s;
            }
        }

        Ok(config)
    }

    /// Fail unless an API key is available for operations that call the
    /// speech service.
    pub fn validate(&self) -> Result<()> {
        if self.openai_api_key.is_none() {
            return Err(SlidecastError::Config(
                "OPENAI_API_KEY not set. Export it with: export OPENAI_API_KEY=sk-...".to_string(),
            ));
        }
        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("slidecast").join("config.toml"))
    }
}
