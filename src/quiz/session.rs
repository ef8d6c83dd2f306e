//! Quiz session state machine. Every operation is synchronous; the driver
//! owns the clock and calls `tick`/`advance` when its timers fire.

use tokio::task::AbortHandle;

use crate::quiz::{
    AnsweredRecord, Difficulty, Provenance, Question, QuestionBatch, Topic, SECONDS_PER_QUESTION,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    PickingTopic,
    PickingDifficulty,
    Loading,
    Answering,
    ShowingResults,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Countdown is still running with this many seconds left.
    Running(u32),
    /// The countdown hit zero and the question was resolved as a time out.
    TimedOut(AnsweredRecord),
    /// Nothing to count down.
    Stopped,
}

/// Handles for the tasks that act on a session later.
#[derive(Debug, Default)]
pub struct Timers {
    countdown: Option<AbortHandle>,
    settle: Option<AbortHandle>,
    notice: Option<AbortHandle>,
}

impl Timers {
    pub fn set_countdown(&mut self, handle: AbortHandle) {
        replace(&mut self.countdown, handle);
    }

    pub fn set_settle(&mut self, handle: AbortHandle) {
        replace(&mut self.settle, handle);
    }

    pub fn set_notice(&mut self, handle: AbortHandle) {
        replace(&mut self.notice, handle);
    }

    pub fn stop_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
    }

    /// Forget the countdown handle without aborting it. Used by the countdown
    /// task itself once it has finished its work.
    pub fn release_countdown(&mut self) {
        self.countdown = None;
    }

    pub fn release_settle(&mut self) {
        self.settle = None;
    }

    pub fn release_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_idle(&self) -> bool {
        self.countdown.is_none() && self.settle.is_none() && self.notice.is_none()
    }

    pub fn dispose(&mut self) {
        for handle in [self.countdown.take(), self.settle.take(), self.notice.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn replace(slot: &mut Option<AbortHandle>, handle: AbortHandle) {
    if let Some(old) = slot.replace(handle) {
        old.abort();
    }
}

#[derive(Debug)]
pub struct Session {
    phase: Phase,
    topic: Option<Topic>,
    difficulty: Option<Difficulty>,
    questions: Vec<Question>,
    provenance: Option<Provenance>,
    index: usize,
    remaining: u32,
    chosen: Option<String>,
    score: usize,
    history: Vec<AnsweredRecord>,
    notice: Option<String>,
    // Bumped on every load and restart so late timer callbacks can tell
    // they belong to an earlier round.
    round: u64,
    pub timers: Timers,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            topic: None,
            difficulty: None,
            questions: Vec::new(),
            provenance: None,
            index: 0,
            remaining: SECONDS_PER_QUESTION,
            chosen: None,
            score: 0,
            history: Vec::new(),
            notice: None,
            round: 0,
            timers: Timers::default(),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn topic(&self) -> Option<Topic> {
        self.topic
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn provenance(&self) -> Option<Provenance> {
        self.provenance
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn chosen(&self) -> Option<&str> {
        self.chosen.as_deref()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn history(&self) -> &[AnsweredRecord] {
        &self.history
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::Answering => self.questions.get(self.index),
            _ => None,
        }
    }

    /// The question is answered or timed out and waits for the settle delay.
    pub fn is_resolved(&self) -> bool {
        self.phase == Phase::Answering && self.chosen.is_some()
    }

    pub fn start(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.phase = Phase::PickingTopic;
        true
    }

    pub fn choose_topic(&mut self, topic: Topic) -> bool {
        if self.phase != Phase::PickingTopic {
            return false;
        }
        self.topic = Some(topic);
        self.phase = Phase::PickingDifficulty;
        true
    }

    /// Records the difficulty and moves to `Loading`. Returns what to fetch.
    pub fn choose_difficulty(&mut self, difficulty: Difficulty) -> Option<(Topic, Difficulty)> {
        if self.phase != Phase::PickingDifficulty {
            return None;
        }
        let topic = self.topic?;
        self.difficulty = Some(difficulty);
        self.phase = Phase::Loading;
        Some((topic, difficulty))
    }

    pub fn load(&mut self, batch: QuestionBatch) -> bool {
        if self.phase != Phase::Loading {
            return false;
        }
        self.round += 1;
        self.questions = batch.questions;
        self.provenance = Some(batch.provenance);
        self.notice = batch.advisory;
        self.index = 0;
        self.remaining = SECONDS_PER_QUESTION;
        self.chosen = None;
        self.score = 0;
        self.history.clear();
        self.phase = if self.questions.is_empty() {
            Phase::ShowingResults
        } else {
            Phase::Answering
        };
        true
    }

    /// Resolves the current question with the user's pick. Only the first
    /// pick per question counts, and it must be one of the options.
    pub fn choose(&mut self, option: &str) -> Option<AnsweredRecord> {
        let question = self.current_question()?;
        if self.chosen.is_some() || !question.has_option(option) {
            return None;
        }
        let record = AnsweredRecord::new(question, option);
        Some(self.resolve(record))
    }

    /// One second passed.
    pub fn tick(&mut self) -> Tick {
        if self.current_question().is_none() || self.chosen.is_some() {
            return Tick::Stopped;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return Tick::Running(self.remaining);
        }
        let record = AnsweredRecord::timed_out_on(&self.questions[self.index]);
        Tick::TimedOut(self.resolve(record))
    }

    fn resolve(&mut self, record: AnsweredRecord) -> AnsweredRecord {
        if record.was_correct {
            self.score += 1;
        }
        self.chosen = Some(record.chosen_option.clone());
        self.history.push(record.clone());
        record
    }

    /// Moves past a resolved question: next question, or the results.
    pub fn advance(&mut self) -> bool {
        if !self.is_resolved() {
            return false;
        }
        if self.index + 1 < self.questions.len() {
            self.index += 1;
            self.remaining = SECONDS_PER_QUESTION;
            self.chosen = None;
        } else {
            self.phase = Phase::ShowingResults;
        }
        true
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn restart(&mut self) {
        self.timers.dispose();
        let round = self.round + 1;
        *self = Session::default();
        self.round = round;
    }
}
