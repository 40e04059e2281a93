use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub documents: DocumentsConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    pub server: ServerConfig,
    /// Topic token -> document filenames. Loaded from config rather than
    /// hardcoded so the matching policy can change without a rebuild.
    #[serde(default)]
    pub topics: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocumentsConfig {
    pub dir: PathBuf,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

fn default_extensions() -> Vec<String> {
    vec!["txt".to_string()]
}

fn default_max_upload_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_preview_chars() -> usize {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_chat_temperature")]
    pub chat_temperature: f32,
    #[serde(default = "default_chat_max_tokens")]
    pub chat_max_tokens: u32,
    #[serde(default = "default_qa_temperature")]
    pub qa_temperature: f32,
    #[serde(default = "default_qa_max_tokens")]
    pub qa_max_tokens: u32,
    #[serde(default = "default_context_chars")]
    pub context_chars_per_doc: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            chat_temperature: default_chat_temperature(),
            chat_max_tokens: default_chat_max_tokens(),
            qa_temperature: default_qa_temperature(),
            qa_max_tokens: default_qa_max_tokens(),
            context_chars_per_doc: default_context_chars(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_chat_temperature() -> f32 {
    0.7
}
fn default_chat_max_tokens() -> u32 {
    1000
}
fn default_qa_temperature() -> f32 {
    0.2
}
fn default_qa_max_tokens() -> u32 {
    800
}
fn default_context_chars() -> usize {
    1500
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate documents
    if config.documents.extensions.is_empty() {
        anyhow::bail!("documents.extensions must list at least one extension");
    }
    if config.documents.max_upload_bytes == 0 {
        anyhow::bail!("documents.max_upload_bytes must be > 0");
    }
    if config.documents.preview_chars == 0 {
        anyhow::bail!("documents.preview_chars must be > 0");
    }

    // Validate completion
    if config.completion.context_chars_per_doc == 0 {
        anyhow::bail!("completion.context_chars_per_doc must be > 0");
    }
    if config.completion.chat_max_tokens == 0 || config.completion.qa_max_tokens == 0 {
        anyhow::bail!("completion token limits must be > 0");
    }
    for temp in [
        config.completion.chat_temperature,
        config.completion.qa_temperature,
    ] {
        if !(0.0..=2.0).contains(&temp) {
            anyhow::bail!("completion temperatures must be in [0.0, 2.0]");
        }
    }

    match config.completion.provider.as_str() {
        "openai" | "disabled" => {}
        other => anyhow::bail!(
            "Unknown completion provider: '{}'. Must be openai or disabled.",
            other
        ),
    }

    // Topic keys are matched against lowercased queries, so they must be
    // lowercase themselves.
    for topic in config.topics.keys() {
        if topic.trim().is_empty() {
            anyhow::bail!("topics must not contain empty keys");
        }
        if topic.chars().any(|c| c.is_uppercase()) {
            anyhow::bail!("topic '{}' must be lowercase", topic);
        }
    }

    Ok(config)
}
