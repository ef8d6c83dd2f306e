use std::future::Future;

use chatgpt::client::ChatGPT;
use chatgpt::config::ModelConfiguration;
use chatgpt::types::CompletionResponse;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::config::Config;
use crate::quiz::{Difficulty, Question, Topic, QUESTIONS_PER_ROUND};

/// Why no generation client could be built. The quiz still runs, on the
/// built-in questions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unavailable {
    #[error("no API key provided")]
    MissingKey,
    #[error("API key invalid or unauthorized")]
    InvalidKey,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Request(#[from] chatgpt::err::Error),
    #[error("malformed JSON in response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid question format: {0}")]
    InvalidFormat(String),
}

/// A text completion backend: prompt in, text out.
pub trait Completion: Send + Sync + 'static {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

impl Completion for ChatGPT {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let response: CompletionResponse = self.send_message(prompt).await?;
        Ok(response.message().clone().content)
    }
}

pub enum Generator<C> {
    Ready(QuizHelper<C>),
    Unavailable(Unavailable),
}

/// Builds the ChatGPT-backed generator from the configured key, or records why
/// it can't be used.
pub fn connect(config: &Config) -> Generator<ChatGPT> {
    let Some(key) = config.api_key.as_deref() else {
        log::info!("No API key configured, questions will come from the built-in bank");
        return Generator::Unavailable(Unavailable::MissingKey);
    };

    let mut model_config = ModelConfiguration {
        engine: config.model.engine(),
        timeout: config.generation_timeout,
        ..Default::default()
    };
    if let Some(url) = config.api_url.as_deref() {
        match url.parse() {
            Ok(url) => model_config.api_url = url,
            Err(err) => log::warn!("Ignoring invalid API URL {:?}: {}", url, err),
        }
    }

    match ChatGPT::new_with_config(key, model_config) {
        Ok(gpt) => {
            log::info!(
                "Question generation enabled with {} (timeout {:?})",
                config.model.name(),
                config.generation_timeout
            );
            Generator::Ready(QuizHelper::new(gpt, config.model.name()))
        }
        Err(err) => {
            log::warn!("Unable to initialize the ChatGPT client, API key may be invalid: {}", err);
            Generator::Unavailable(Unavailable::InvalidKey)
        }
    }
}

/// Random token embedded in each prompt so repeated requests don't get the same questions back.
pub fn seed_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(10)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

pub struct QuizHelper<C> {
    completion: C,
    model: &'static str,
}

impl<C: Completion> QuizHelper<C> {
    pub fn new(completion: C, model: &'static str) -> Self {
        Self { completion, model }
    }

    pub fn model(&self) -> &'static str {
        self.model
    }

    pub async fn generate_questions(
        &self,
        topic: Topic,
        difficulty: Difficulty,
        seed: &str,
    ) -> Result<Vec<Question>, GenerationError> {
        log::debug!(
            "Generating questions: topic={} difficulty={} seed={}",
            topic.as_str(),
            difficulty.as_str(),
            seed
        );
        let prompt = build_prompt(topic, difficulty, seed);

        let text = self.completion.complete(&prompt).await?;
        log::debug!("Completion: {:?}", text);

        parse_questions(&text)
    }
}

pub fn build_prompt(topic: Topic, difficulty: Difficulty, seed: &str) -> String {
    format!(
        "Generate {count} multiple choice questions about {topic} at {difficulty} level. \
        Ensure the questions are different from any you previously generated for this topic and difficulty; randomize wording and order. \
        Include this seed string to encourage variation: {seed}.\n\n\
        Return ONLY a JSON array in this exact format, nothing else:\n\
        [{{\n  \"question\": \"Question text\",\n  \"options\": [\"Option1\",\"Option2\",\"Option3\",\"Option4\"],\n  \"correctAnswer\": \"Option1\",\n  \"explanation\": \"Brief explanation\"\n}}]",
        count = QUESTIONS_PER_ROUND,
        topic = topic.as_str(),
        difficulty = difficulty.as_str(),
        seed = seed,
    )
}

/// Models like to wrap JSON in markdown code fences.
pub fn sanitize(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

pub fn parse_questions(text: &str) -> Result<Vec<Question>, GenerationError> {
    let value: serde_json::Value = serde_json::from_str(&sanitize(text))?;
    let items = match value {
        serde_json::Value::Array(items) if !items.is_empty() => items,
        serde_json::Value::Array(_) => {
            return Err(GenerationError::InvalidFormat("empty question list".to_string()))
        }
        _ => return Err(GenerationError::InvalidFormat("expected a JSON array".to_string())),
    };

    let mut questions = items
        .into_iter()
        .map(|item| serde_json::from_value::<Question>(item).map(Question::trimmed))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(bad) = questions.iter().position(|q| !q.is_well_formed()) {
        return Err(GenerationError::InvalidFormat(format!(
            "question {} needs 4 distinct, non-blank options including the correct answer",
            bad + 1
        )));
    }

    questions.truncate(QUESTIONS_PER_ROUND);
    Ok(questions)
}
