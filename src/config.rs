use std::time::Duration;

use chatgpt::config::ChatGPTEngine;

pub const API_KEY_VAR: &str = "CHATGPT_API_KEY";
pub const MODEL_VAR: &str = "QUIZ_MODEL";
pub const TIMEOUT_VAR: &str = "QUIZ_GENERATION_TIMEOUT_SECS";
pub const API_URL_VAR: &str = "QUIZ_API_URL";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    Gpt35Turbo,
    Gpt4,
    Gpt4_32k,
}

impl Model {
    pub fn parse(name: &str) -> Option<Model> {
        match name.trim() {
            "gpt-3.5-turbo" => Some(Model::Gpt35Turbo),
            "gpt-4" => Some(Model::Gpt4),
            "gpt-4-32k" => Some(Model::Gpt4_32k),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Model::Gpt35Turbo => "gpt-3.5-turbo",
            Model::Gpt4 => "gpt-4",
            Model::Gpt4_32k => "gpt-4-32k",
        }
    }

    pub fn engine(&self) -> ChatGPTEngine {
        match self {
            Model::Gpt35Turbo => ChatGPTEngine::Gpt35Turbo,
            Model::Gpt4 => ChatGPTEngine::Gpt4,
            Model::Gpt4_32k => ChatGPTEngine::Gpt4_32k,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` when the key is unset or blank; the quiz then runs on built-in questions.
    pub api_key: Option<String>,
    pub model: Model,
    pub generation_timeout: Duration,
    /// Chat completions endpoint override, for proxies. `None` keeps the OpenAI default.
    pub api_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: Model::Gpt35Turbo,
            generation_timeout: DEFAULT_TIMEOUT,
            api_url: None,
        }
    }
}

impl Config {
    /// Reads the process environment. Call `dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        config.api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        if let Some(name) = lookup(MODEL_VAR) {
            match Model::parse(&name) {
                Some(model) => config.model = model,
                None => log::warn!(
                    "Unknown {} {:?}, using {}",
                    MODEL_VAR,
                    name,
                    config.model.name()
                ),
            }
        }

        if let Some(secs) = lookup(TIMEOUT_VAR) {
            match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.generation_timeout = Duration::from_secs(secs),
                _ => log::warn!("Invalid {} {:?}, using {:?}", TIMEOUT_VAR, secs, DEFAULT_TIMEOUT),
            }
        }

        config.api_url = lookup(API_URL_VAR)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        config
    }
}
