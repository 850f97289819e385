//! Generation configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Model client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name/identifier.
    pub model: String,
    /// API key. Falls back to `OPENAI_API_KEY` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL (for proxies or compatible gateways).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u32,
}

fn default_http_timeout() -> u32 {
    60
}

/// Environment variable consulted when the config carries no API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

impl LlmConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            api_base: None,
            timeout_secs: default_http_timeout(),
        }
    }

    /// The configured key, or `OPENAI_API_KEY` when the config has none.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key_or(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_or(&self, fallback: Option<String>) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or(fallback.filter(|k| !k.trim().is_empty()))
    }
}

/// Tuning for the content orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Token budget for script answers.
    #[serde(default = "default_script_max_tokens")]
    pub script_max_tokens: u32,
    /// Token budget for every auxiliary answer.
    #[serde(default = "default_asset_max_tokens")]
    pub asset_max_tokens: u32,
    /// Sampling temperature for all calls.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Image prompts requested per script section.
    #[serde(default = "default_prompts_per_section")]
    pub image_prompts_per_section: usize,
    /// Sections processed concurrently by the image prompt generator.
    #[serde(default = "default_image_concurrency")]
    pub image_prompt_concurrency: usize,
    /// Hard limit on any single model call, in seconds.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
}

fn default_script_max_tokens() -> u32 {
    4096
}

fn default_asset_max_tokens() -> u32 {
    1500
}

fn default_temperature() -> f32 {
    0.7
}

fn default_prompts_per_section() -> usize {
    3
}

fn default_image_concurrency() -> usize {
    4
}

fn default_call_timeout() -> u64 {
    90
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            script_max_tokens: default_script_max_tokens(),
            asset_max_tokens: default_asset_max_tokens(),
            temperature: default_temperature(),
            image_prompts_per_section: default_prompts_per_section(),
            image_prompt_concurrency: default_image_concurrency(),
            call_timeout_secs: default_call_timeout(),
        }
    }
}

impl GenerationConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "generation.temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }
        if self.script_max_tokens == 0 || self.asset_max_tokens == 0 {
            return Err("generation token budgets must be greater than 0".to_string());
        }
        if self.image_prompts_per_section == 0 {
            return Err("generation.image_prompts_per_section must be greater than 0".to_string());
        }
        if self.image_prompt_concurrency == 0 {
            return Err("generation.image_prompt_concurrency must be greater than 0".to_string());
        }
        if self.call_timeout_secs == 0 {
            return Err("generation.call_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}
