use crate::quiz::ai_helper::{self, Completion, Generator, Unavailable};
use crate::quiz::{fallback, Difficulty, Provenance, QuestionBatch, Topic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Ready,
    MissingKey,
    InvalidKey,
}

/// Supplies a round of questions, from the generator when it works and from
/// the built-in bank otherwise. Never fails.
pub struct QuestionSource<C> {
    generator: Generator<C>,
}

impl<C: Completion> QuestionSource<C> {
    pub fn new(generator: Generator<C>) -> Self {
        Self { generator }
    }

    pub fn availability(&self) -> Availability {
        match &self.generator {
            Generator::Ready(_) => Availability::Ready,
            Generator::Unavailable(Unavailable::MissingKey) => Availability::MissingKey,
            Generator::Unavailable(Unavailable::InvalidKey) => Availability::InvalidKey,
        }
    }

    pub async fn fetch_questions(&self, topic: Topic, difficulty: Difficulty) -> QuestionBatch {
        let seed = ai_helper::seed_token(&mut rand::thread_rng());
        log::info!(
            "Fetching questions: topic={} difficulty={} seed={}",
            topic.as_str(),
            difficulty.as_str(),
            seed
        );

        let helper = match &self.generator {
            Generator::Ready(helper) => helper,
            Generator::Unavailable(reason) => {
                return fallback_batch(topic, format!("{}; using built-in sample questions.", reason));
            }
        };

        match helper.generate_questions(topic, difficulty, &seed).await {
            Ok(questions) => {
                log::info!("Generated {} questions with {}", questions.len(), helper.model());
                QuestionBatch {
                    questions,
                    provenance: Provenance::Ai,
                    advisory: Some(format!("Questions generated via AI ({}).", helper.model())),
                }
            }
            Err(err) => {
                log::error!("Generation error: {}", err);
                fallback_batch(
                    topic,
                    format!("Using fallback questions due to generation error: {}", err),
                )
            }
        }
    }
}

fn fallback_batch(topic: Topic, advisory: String) -> QuestionBatch {
    QuestionBatch {
        questions: fallback::pick(topic.as_str(), &mut rand::thread_rng()),
        provenance: Provenance::Fallback,
        advisory: Some(advisory),
    }
}
