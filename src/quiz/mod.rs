pub mod ai_helper;
pub mod driver;
pub mod fallback;
pub mod session;
pub mod source;
pub mod view;

pub const QUESTIONS_PER_ROUND: usize = 5;
pub const SECONDS_PER_QUESTION: u32 = 60;
/// Recorded as the chosen option when the countdown runs out.
pub const TIME_OUT: &str = "Time Out";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Html,
    Css,
    JavaScript,
    React,
    Python,
    Java,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::Html,
        Topic::Css,
        Topic::JavaScript,
        Topic::React,
        Topic::Python,
        Topic::Java,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Html => "HTML",
            Topic::Css => "CSS",
            Topic::JavaScript => "JavaScript",
            Topic::React => "React",
            Topic::Python => "Python",
            Topic::Java => "Java",
        }
    }

    /// Exact, case-sensitive match against the button labels.
    pub fn parse(label: &str) -> Option<Topic> {
        Self::ALL.into_iter().find(|t| t.as_str() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn parse(label: &str) -> Option<Difficulty> {
        Self::ALL.into_iter().find(|d| d.as_str() == label)
    }
}

/// One multiple-choice question. Field names on the wire follow the JSON
/// shape requested from the generation model.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_option: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    pub fn new(prompt: &str, options: [&str; 4], correct_option: &str, explanation: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_option: correct_option.to_string(),
            explanation: Some(explanation.to_string()),
        }
    }

    pub fn is_correct(&self, choice: &str) -> bool {
        choice == self.correct_option
    }

    pub fn has_option(&self, choice: &str) -> bool {
        self.options.iter().any(|o| o == choice)
    }

    /// Strips surrounding whitespace from every text field. Button labels
    /// come back trimmed, so options must match them exactly.
    pub fn trimmed(self) -> Self {
        Self {
            prompt: self.prompt.trim().to_string(),
            options: self.options.iter().map(|o| o.trim().to_string()).collect(),
            correct_option: self.correct_option.trim().to_string(),
            explanation: self
                .explanation
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
        }
    }

    /// A non-blank prompt and four distinct, non-blank options, one of which is
    /// the correct answer.
    pub fn is_well_formed(&self) -> bool {
        let distinct = self
            .options
            .iter()
            .enumerate()
            .all(|(i, o)| !self.options[..i].contains(o));

        !self.prompt.trim().is_empty()
            && self.options.len() == 4
            && self.options.iter().all(|o| !o.trim().is_empty())
            && distinct
            && self.has_option(&self.correct_option)
    }
}

/// Outcome of one question, appended to the session history and never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredRecord {
    pub prompt: String,
    pub chosen_option: String,
    pub correct_option: String,
    pub explanation: Option<String>,
    pub was_correct: bool,
    pub timed_out: bool,
}

impl AnsweredRecord {
    pub fn new(question: &Question, chosen_option: &str) -> Self {
        Self {
            prompt: question.prompt.clone(),
            chosen_option: chosen_option.to_string(),
            correct_option: question.correct_option.clone(),
            explanation: question.explanation.clone(),
            was_correct: question.is_correct(chosen_option),
            timed_out: false,
        }
    }

    /// The countdown ran out before a pick. Never correct.
    pub fn timed_out_on(question: &Question) -> Self {
        Self {
            was_correct: false,
            timed_out: true,
            ..Self::new(question, TIME_OUT)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Ai,
    Fallback,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Ai => "ai",
            Provenance::Fallback => "fallback",
        }
    }
}

/// What the question source hands to a session: a question set, where it came
/// from, and an optional advisory for the user.
#[derive(Debug, Clone)]
pub struct QuestionBatch {
    pub questions: Vec<Question>,
    pub provenance: Provenance,
    pub advisory: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_labels_are_exact() {
        for topic in Topic::ALL {
            assert_eq!(Topic::parse(topic.as_str()), Some(topic));
        }
        assert_eq!(Topic::parse("html"), None);
        assert_eq!(Topic::parse("Javascript"), None);
    }

    #[test]
    fn difficulty_labels_are_exact() {
        for difficulty in Difficulty::ALL {
            assert_eq!(Difficulty::parse(difficulty.as_str()), Some(difficulty));
        }
        assert_eq!(Difficulty::parse("easy"), None);
    }

    #[test]
    fn question_deserializes_from_wire_names() {
        let json = r#"{
            "question": "Which company developed React?",
            "options": ["Google", "Facebook", "Microsoft", "Apple"],
            "correctAnswer": "Facebook"
        }"#;
        let question: Question = serde_json::from_str(json).unwrap();

        assert_eq!(question.prompt, "Which company developed React?");
        assert_eq!(question.correct_option, "Facebook");
        assert_eq!(question.explanation, None);
        assert!(question.is_well_formed());
    }

    #[test]
    fn correct_option_must_be_listed() {
        let mut question = Question::new("Q?", ["a", "b", "c", "d"], "a", "because");
        assert!(question.is_well_formed());

        question.correct_option = "e".to_string();
        assert!(!question.is_well_formed());
    }

    #[test]
    fn blank_or_repeated_options_are_rejected() {
        let blank = Question::new("Q?", ["a", " ", "c", "d"], "a", "because");
        assert!(!blank.is_well_formed());

        let repeated = Question::new("Q?", ["a", "b", "a", "d"], "a", "because");
        assert!(!repeated.is_well_formed());
    }

    #[test]
    fn trimming_makes_padded_options_selectable() {
        let question = Question::new(" Q? ", [" a ", "b", "c ", "d"], "a  ", " ").trimmed();

        assert_eq!(question.prompt, "Q?");
        assert_eq!(question.options, vec!["a", "b", "c", "d"]);
        assert!(question.has_option("a"));
        assert!(question.is_correct("a"));
        assert_eq!(question.explanation, None);
        assert!(question.is_well_formed());
    }

    #[test]
    fn time_out_record_is_never_correct() {
        let mut question = Question::new("Q?", ["a", "b", "c", "d"], "a", "because");
        question.options[0] = TIME_OUT.to_string();
        question.correct_option = TIME_OUT.to_string();

        let record = AnsweredRecord::timed_out_on(&question);
        assert!(record.timed_out);
        assert_eq!(record.chosen_option, TIME_OUT);
        assert!(!record.was_correct);
    }

    #[test]
    fn option_named_time_out_can_be_picked() {
        let question = Question::new("Q?", [TIME_OUT, "b", "c", "d"], TIME_OUT, "because");

        let record = AnsweredRecord::new(&question, TIME_OUT);
        assert!(!record.timed_out);
        assert!(record.was_correct);
    }
}
