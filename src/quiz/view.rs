use crate::quiz::session::{Phase, Session};
use crate::quiz::source::Availability;
use crate::quiz::{Difficulty, Topic};

pub const START_QUIZ: &str = "▶ Start Quiz";
pub const RESTART_QUIZ: &str = "Restart Quiz";
const CHOOSE_HINT: &str = "Please choose one of the options below.";

/// A rendered screen: message text plus keyboard rows. No rows means the
/// keyboard should be hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub text: String,
    pub buttons: Vec<Vec<String>>,
}

impl View {
    fn new(text: String, buttons: Vec<Vec<String>>) -> Self {
        Self { text, buttons }
    }

    pub fn with_hint(mut self) -> Self {
        self.text = format!("{}\n\n{}", CHOOSE_HINT, self.text);
        self
    }
}

/// What a button press means in the current phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Start,
    Topic(Topic),
    Difficulty(Difficulty),
    Answer(String),
    Restart,
}

impl Intent {
    pub fn parse(session: &Session, text: &str) -> Option<Intent> {
        let text = text.trim();
        match session.phase() {
            Phase::Idle if text == START_QUIZ => Some(Intent::Start),
            Phase::PickingTopic => Topic::parse(text).map(Intent::Topic),
            Phase::PickingDifficulty => Difficulty::parse(text).map(Intent::Difficulty),
            Phase::Answering if !session.is_resolved() => session
                .current_question()
                .filter(|q| q.has_option(text))
                .map(|_| Intent::Answer(text.to_string())),
            Phase::ShowingResults if text == RESTART_QUIZ => Some(Intent::Restart),
            _ => None,
        }
    }
}

/// Whether the phase is waiting on the user, so a hint makes sense.
pub fn expects_input(session: &Session) -> bool {
    match session.phase() {
        Phase::Loading => false,
        Phase::Answering => !session.is_resolved(),
        _ => true,
    }
}

pub fn render(session: &Session, availability: Availability) -> View {
    match session.phase() {
        Phase::Idle => render_start(availability),
        Phase::PickingTopic => View::new(
            "Select a Topic".to_string(),
            Topic::ALL
                .chunks(3)
                .map(|row| row.iter().map(|t| t.as_str().to_string()).collect())
                .collect(),
        ),
        Phase::PickingDifficulty => View::new(
            "Select Difficulty".to_string(),
            vec![Difficulty::ALL.iter().map(|d| d.as_str().to_string()).collect()],
        ),
        Phase::Loading => View::new("Generating questions...".to_string(), Vec::new()),
        Phase::Answering => render_question(session),
        Phase::ShowingResults => render_results(session),
    }
}

fn render_start(availability: Availability) -> View {
    let mut text = "Web Dev Quiz\nTest your knowledge with AI-generated questions.".to_string();
    match availability {
        Availability::Ready => {}
        Availability::MissingKey => text.push_str(
            "\n\nNo API key detected. Set CHATGPT_API_KEY in the environment or a .env file and restart to enable AI generation.",
        ),
        Availability::InvalidKey => text.push_str(
            "\n\nAPI key appears invalid or lacks required permissions; quiz will use sample questions.",
        ),
    }
    View::new(text, vec![vec![START_QUIZ.to_string()]])
}

fn render_question(session: &Session) -> View {
    let Some(question) = session.current_question() else {
        return View::new(String::new(), Vec::new());
    };

    let mut text = String::new();
    if let Some(notice) = session.notice() {
        text.push_str(&format!("ℹ️ {}\n\n", notice));
    }
    text.push_str(&format!(
        "Question {}/{} • {} • {}\n⏱️ {}s\n\n{}",
        session.index() + 1,
        session.total(),
        session.topic().map(|t| t.as_str()).unwrap_or("-"),
        session.difficulty().map(|d| d.as_str()).unwrap_or("-"),
        session.remaining(),
        question.prompt
    ));

    match session.history().last().filter(|_| session.is_resolved()) {
        Some(record) => {
            if record.was_correct {
                text.push_str("\n\n✅ Correct!");
            } else if record.timed_out {
                text.push_str(&format!("\n\n⏱️ Time out! Correct answer: {}", record.correct_option));
            } else {
                text.push_str(&format!(
                    "\n\n❌ Incorrect. Correct answer: {}",
                    record.correct_option
                ));
            }
            if let Some(explanation) = &record.explanation {
                text.push_str(&format!("\n{}", explanation));
            }
            View::new(text, Vec::new())
        }
        None => View::new(
            text,
            question.options.iter().map(|o| vec![o.clone()]).collect(),
        ),
    }
}

fn render_results(session: &Session) -> View {
    let mut text = format!("Quiz Complete!\nScore: {}/{}", session.score(), session.total());
    for (i, record) in session.history().iter().enumerate() {
        let mark = if record.was_correct { "✅" } else { "❌" };
        text.push_str(&format!("\n\n{} Q{}: {}\nYour answer: {}", mark, i + 1, record.prompt, record.chosen_option));
        if !record.was_correct {
            text.push_str(&format!("\nCorrect answer: {}", record.correct_option));
        }
        if let Some(explanation) = &record.explanation {
            text.push_str(&format!("\n{}", explanation));
        }
    }
    View::new(text, vec![vec![RESTART_QUIZ.to_string()]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{Provenance, Question, QuestionBatch};

    fn loaded() -> Session {
        let mut session = Session::new();
        session.start();
        session.choose_topic(Topic::Css);
        session.choose_difficulty(Difficulty::Medium);
        session.load(QuestionBatch {
            questions: vec![
                Question::new("Which property sets text size?", ["font-size", "size", "text", "em"], "font-size", "It is font-size."),
                Question::new("Second?", ["x", "y", "z", "w"], "x", "x."),
            ],
            provenance: Provenance::Fallback,
            advisory: Some("no API key provided; using built-in sample questions.".to_string()),
        });
        session
    }

    #[test]
    fn start_screen_explains_missing_key() {
        let view = render(&Session::new(), Availability::MissingKey);

        assert!(view.text.contains("No API key detected"));
        assert_eq!(view.buttons, vec![vec![START_QUIZ.to_string()]]);
        assert!(!render(&Session::new(), Availability::Ready).text.contains("API key"));
    }

    #[test]
    fn topic_screen_lists_all_topics() {
        let mut session = Session::new();
        session.start();

        let view = render(&session, Availability::Ready);
        let labels: Vec<String> = view.buttons.concat();

        assert_eq!(labels, vec!["HTML", "CSS", "JavaScript", "React", "Python", "Java"]);
    }

    #[test]
    fn question_screen_shows_progress_timer_and_options() {
        let session = loaded();

        let view = render(&session, Availability::Ready);

        assert!(view.text.contains("Question 1/2 • CSS • Medium"));
        assert!(view.text.contains("60s"));
        assert!(view.text.contains("no API key provided"));
        assert_eq!(view.buttons.len(), 4);
        assert_eq!(view.buttons[0], vec!["font-size".to_string()]);
    }

    #[test]
    fn feedback_hides_the_options() {
        let mut session = loaded();
        session.choose("size");

        let view = render(&session, Availability::Ready);

        assert!(view.text.contains("❌ Incorrect. Correct answer: font-size"));
        assert!(view.text.contains("It is font-size."));
        assert!(view.buttons.is_empty());
    }

    #[test]
    fn results_report_every_answer() {
        let mut session = loaded();
        session.choose("font-size");
        session.advance();
        session.choose("y");
        session.advance();

        let view = render(&session, Availability::Ready);

        assert!(view.text.starts_with("Quiz Complete!\nScore: 1/2"));
        assert!(view.text.contains("Q1: Which property sets text size?\nYour answer: font-size"));
        assert!(view.text.contains("Q2: Second?\nYour answer: y\nCorrect answer: x"));
        assert_eq!(view.buttons, vec![vec![RESTART_QUIZ.to_string()]]);
    }

    #[test]
    fn intents_depend_on_phase() {
        let mut session = Session::new();
        assert_eq!(Intent::parse(&session, START_QUIZ), Some(Intent::Start));
        assert_eq!(Intent::parse(&session, "HTML"), None);

        session.start();
        assert_eq!(Intent::parse(&session, "HTML"), Some(Intent::Topic(Topic::Html)));
        assert_eq!(Intent::parse(&session, "Easy"), None);

        session.choose_topic(Topic::Html);
        assert_eq!(Intent::parse(&session, "Hard"), Some(Intent::Difficulty(Difficulty::Hard)));

        session.choose_difficulty(Difficulty::Hard);
        assert!(!expects_input(&session));
        assert_eq!(Intent::parse(&session, "Hard"), None);
    }

    #[test]
    fn answers_must_match_an_option() {
        let mut session = loaded();

        assert_eq!(Intent::parse(&session, "font-size"), Some(Intent::Answer("font-size".to_string())));
        assert_eq!(Intent::parse(&session, "bold"), None);

        session.choose("font-size");
        assert_eq!(Intent::parse(&session, "size"), None);
        assert!(!expects_input(&session));
    }
}
