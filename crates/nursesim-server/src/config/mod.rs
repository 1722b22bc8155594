//! Configuration loading for NurseSim.
//! Reads nursesim.toml from the current directory or path in NURSESIM_CONFIG env var.

use nursesim_llm::backend::{
    DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_TTS_MODEL, DEFAULT_VOICE,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "0.0.0.0:3000".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// NURSESIM_GEMINI_API_KEY overrides this at startup.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_voice")]
    pub voice: String,
}

fn default_model()       -> String { DEFAULT_TEXT_MODEL.to_string() }
fn default_tts_model()   -> String { DEFAULT_TTS_MODEL.to_string() }
fn default_image_model() -> String { DEFAULT_IMAGE_MODEL.to_string() }
fn default_voice()       -> String { DEFAULT_VOICE.to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String { "./data".to_string() }

mod tests;

impl Config {
    /// Load configuration from nursesim.toml.
    /// Checks NURSESIM_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("NURSESIM_CONFIG")
            .unwrap_or_else(|_| "nursesim.toml".to_string());

        if !Path::new(&path).exists() {
            anyhow::bail!(
                "Config file not found: {}\n\
                 Copy nursesim.example.toml to nursesim.toml and edit it.",
                path
            );
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
