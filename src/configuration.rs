use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

const CONFIGURATION_FILE: &str = "configuration.yaml";

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub api_keys: ApiKeys,
    pub search: SearchSettings,
    pub llm: LlmSettings,
    pub browser: BrowserSettings,
    pub generation: GenerationSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct ApiKeys {
    pub serper: String,
    pub llm: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchSettings {
    pub endpoint: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            endpoint: "https://google.serper.dev/search".to_string(),
        }
    }
}

/// Any OpenAI compatible chat completion endpoint.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmSettings {
    pub api_base: String,
    pub model: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        LlmSettings {
            api_base: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-8b-8192".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub page_load_timeout_seconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub settle_seconds: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        BrowserSettings {
            webdriver_url: "http://localhost:4444".to_string(),
            page_load_timeout_seconds: 30,
            settle_seconds: 5,
        }
    }
}

impl BrowserSettings {
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_seconds)
    }

    pub fn settle_time(&self) -> Duration {
        Duration::from_secs(self.settle_seconds)
    }
}

/// Knobs of the search, judge and refine loop.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationSettings {
    /// Fraction of a batch that must be judged relevant to accept it.
    pub relevance_threshold: f64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_attempts: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub fetch_delay_seconds: u64,
    /// Results requested per wanted lead.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub oversample_factor: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_target_count: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            relevance_threshold: 0.6,
            max_attempts: 3,
            fetch_delay_seconds: 2,
            oversample_factor: 2,
            max_target_count: 20,
        }
    }
}

impl GenerationSettings {
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_secs(self.fetch_delay_seconds)
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    Config::builder()
        .add_source(File::new(CONFIGURATION_FILE, FileFormat::Yaml).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize::<Settings>()
}
