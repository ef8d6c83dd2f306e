//! Runs one quiz session: feeds user intents into the state machine, fetches
//! questions, and drives the countdown, settle delay and notice timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{interval_at, sleep, Instant};

use crate::quiz::ai_helper::Completion;
use crate::quiz::session::{Phase, Session, Tick};
use crate::quiz::source::QuestionSource;
use crate::quiz::view::{self, Intent, View};

/// Where rendered screens go.
pub trait Screen: Send + Sync + 'static {
    fn show(&self, view: View) -> impl Future<Output = ()> + Send;
}

const TICK: Duration = Duration::from_secs(1);
/// How long feedback stays up before the next question.
const SETTLE: Duration = Duration::from_millis(1500);
const NOTICE: Duration = Duration::from_secs(5);

struct Inner<C, S> {
    session: Mutex<Session>,
    source: Arc<QuestionSource<C>>,
    screen: S,
}

pub struct SessionDriver<C, S> {
    inner: Arc<Inner<C, S>>,
}

impl<C, S> Clone for SessionDriver<C, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Completion, S: Screen> SessionDriver<C, S> {
    pub fn new(source: Arc<QuestionSource<C>>, screen: S) -> Self {
        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(Session::new()),
                source,
                screen,
            }),
        }
    }

    pub async fn inspect<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        f(&*self.inner.session.lock().await)
    }

    fn render(&self, session: &Session) -> View {
        view::render(session, self.inner.source.availability())
    }

    /// Re-sends whatever the session currently shows.
    pub async fn show_current(&self) {
        let view = self.render(&*self.inner.session.lock().await);
        self.inner.screen.show(view).await;
    }

    /// Handles a raw button label. Input that means nothing in the current
    /// phase gets the current screen again with a hint.
    pub async fn handle_text(&self, text: &str) {
        let reprompt = {
            let session = self.inner.session.lock().await;
            match Intent::parse(&session, text) {
                Some(intent) => Ok(intent),
                None if view::expects_input(&session) => Err(Some(self.render(&session).with_hint())),
                None => Err(None),
            }
        };
        match reprompt {
            Ok(intent) => self.dispatch(intent).await,
            Err(Some(view)) => self.inner.screen.show(view).await,
            Err(None) => log::debug!("Ignoring {:?} while busy", text),
        }
    }

    pub async fn dispatch(&self, intent: Intent) {
        let view = match intent {
            Intent::Start => self.update(|session| session.start()).await,
            Intent::Topic(topic) => self.update(|session| session.choose_topic(topic)).await,
            Intent::Difficulty(difficulty) => {
                let request = {
                    let mut session = self.inner.session.lock().await;
                    session
                        .choose_difficulty(difficulty)
                        .map(|request| (request, self.render(&session)))
                };
                let Some(((topic, difficulty), loading)) = request else {
                    return;
                };
                self.inner.screen.show(loading).await;

                let batch = self.inner.source.fetch_questions(topic, difficulty).await;

                let mut session = self.inner.session.lock().await;
                let (count, provenance) = (batch.questions.len(), batch.provenance);
                if !session.load(batch) {
                    log::debug!("Discarding questions for a session that moved on");
                    return;
                }
                log::info!("Loaded {} questions ({})", count, provenance.as_str());
                if session.phase() == Phase::Answering {
                    self.arm_countdown(&mut session);
                }
                if session.notice().is_some() {
                    self.arm_notice(&mut session);
                }
                Some(self.render(&session))
            }
            Intent::Answer(option) => {
                let mut session = self.inner.session.lock().await;
                match session.choose(&option) {
                    Some(record) => {
                        log::debug!("Answered {:?}, correct: {}", record.chosen_option, record.was_correct);
                        session.timers.stop_countdown();
                        self.arm_settle(&mut session);
                        Some(self.render(&session))
                    }
                    None => None,
                }
            }
            Intent::Restart => self.update(|session| {
                if session.phase() != Phase::ShowingResults {
                    return false;
                }
                session.restart();
                true
            })
            .await,
        };

        if let Some(view) = view {
            self.inner.screen.show(view).await;
        }
    }

    /// Tears the session down: pending timers are cancelled and an in-flight
    /// fetch will find nothing to load into.
    pub async fn close(&self) {
        self.inner.session.lock().await.restart();
    }

    /// Back on the start screen with nothing scheduled, so the chat no longer
    /// needs to keep this driver around.
    pub async fn is_idle(&self) -> bool {
        let session = self.inner.session.lock().await;
        session.phase() == Phase::Idle && session.timers.is_idle()
    }

    async fn update(&self, f: impl FnOnce(&mut Session) -> bool) -> Option<View> {
        let mut session = self.inner.session.lock().await;
        f(&mut *session).then(|| self.render(&session))
    }

    fn arm_countdown(&self, session: &mut MutexGuard<'_, Session>) {
        let this = self.clone();
        let round = session.round();
        let index = session.index();
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                let view = {
                    let mut session = this.inner.session.lock().await;
                    if session.round() != round || session.index() != index {
                        return;
                    }
                    match session.tick() {
                        Tick::Running(_) => continue,
                        Tick::Stopped => {
                            session.timers.release_countdown();
                            return;
                        }
                        Tick::TimedOut(_) => {
                            log::debug!("Question {} timed out", index + 1);
                            session.timers.release_countdown();
                            this.arm_settle(&mut session);
                            this.render(&session)
                        }
                    }
                };
                this.inner.screen.show(view).await;
                return;
            }
        });
        session.timers.set_countdown(handle.abort_handle());
    }

    fn arm_settle(&self, session: &mut MutexGuard<'_, Session>) {
        let this = self.clone();
        let round = session.round();
        let index = session.index();
        let handle = tokio::spawn(async move {
            sleep(SETTLE).await;
            let view = {
                let mut session = this.inner.session.lock().await;
                if session.round() != round || session.index() != index {
                    return;
                }
                session.timers.release_settle();
                if !session.advance() {
                    return;
                }
                if session.phase() == Phase::Answering {
                    this.arm_countdown(&mut session);
                }
                this.render(&session)
            };
            this.inner.screen.show(view).await;
        });
        session.timers.set_settle(handle.abort_handle());
    }

    fn arm_notice(&self, session: &mut MutexGuard<'_, Session>) {
        let this = self.clone();
        let round = session.round();
        let handle = tokio::spawn(async move {
            sleep(NOTICE).await;
            let mut session = this.inner.session.lock().await;
            if session.round() == round {
                session.timers.release_notice();
                session.dismiss_notice();
            }
        });
        session.timers.set_notice(handle.abort_handle());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::ai_helper::tests::{questions_json, Scripted};
    use crate::quiz::ai_helper::{Generator, QuizHelper, Unavailable};
    use crate::quiz::view::{RESTART_QUIZ, START_QUIZ};
    use crate::quiz::{Provenance, SECONDS_PER_QUESTION, TIME_OUT};

    #[derive(Clone, Default)]
    struct Recorder {
        views: Arc<std::sync::Mutex<Vec<View>>>,
    }

    impl Recorder {
        fn count(&self) -> usize {
            self.views.lock().unwrap().len()
        }

        fn last(&self) -> View {
            self.views.lock().unwrap().last().cloned().expect("nothing shown")
        }
    }

    impl Screen for Recorder {
        async fn show(&self, view: View) {
            self.views.lock().unwrap().push(view);
        }
    }

    fn build(generator: Generator<Scripted>) -> (SessionDriver<Scripted, Recorder>, Recorder) {
        let recorder = Recorder::default();
        let source = Arc::new(QuestionSource::new(generator));
        (SessionDriver::new(source, recorder.clone()), recorder)
    }

    fn generated() -> (SessionDriver<Scripted, Recorder>, Recorder) {
        build(Generator::Ready(QuizHelper::new(
            Scripted::replying(&questions_json(5)),
            "test-model",
        )))
    }

    async fn begin(driver: &SessionDriver<Scripted, Recorder>) {
        driver.handle_text(START_QUIZ).await;
        driver.handle_text("HTML").await;
        driver.handle_text("Easy").await;
    }

    async fn wait(duration: Duration) {
        sleep(duration).await;
    }

    #[tokio::test(start_paused = true)]
    async fn scripted_round_scores_and_logs_in_order() {
        let (driver, screen) = generated();
        begin(&driver).await;
        assert_eq!(driver.inspect(|s| s.provenance()).await, Some(Provenance::Ai));

        driver.handle_text("right").await;
        wait(Duration::from_millis(1600)).await;
        assert_eq!(driver.inspect(|s| s.index()).await, 1);

        wait(Duration::from_secs(u64::from(SECONDS_PER_QUESTION) + 2)).await;
        assert_eq!(driver.inspect(|s| s.index()).await, 2);

        driver.handle_text("wrong 2").await;
        wait(Duration::from_millis(1600)).await;

        let (score, history) = driver
            .inspect(|s| (s.score(), s.history().to_vec()))
            .await;
        assert_eq!(score, 1);
        assert_eq!(history.len(), 3);
        assert_eq!(
            history.iter().map(|r| r.was_correct).collect::<Vec<_>>(),
            vec![true, false, false]
        );
        assert_eq!(history[1].chosen_option, TIME_OUT);
        assert_eq!(history[2].prompt, "Generated question 3?");
        assert!(screen.last().text.starts_with("Question 4/5"));
    }

    #[tokio::test(start_paused = true)]
    async fn double_click_counts_once() {
        let (driver, _screen) = generated();
        begin(&driver).await;

        driver.dispatch(Intent::Answer("right".to_string())).await;
        driver.dispatch(Intent::Answer("right".to_string())).await;
        driver.dispatch(Intent::Answer("wrong 1".to_string())).await;

        assert_eq!(driver.inspect(|s| (s.score(), s.history().len())).await, (1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_records_once_and_advances() {
        let (driver, screen) = generated();
        begin(&driver).await;

        wait(Duration::from_secs(u64::from(SECONDS_PER_QUESTION)) + Duration::from_millis(500)).await;
        let record = driver.inspect(|s| s.history().to_vec()).await;
        assert_eq!(record.len(), 1);
        assert_eq!(record[0].chosen_option, TIME_OUT);
        assert!(!record[0].was_correct);
        assert!(screen.last().text.contains("Time out!"));

        wait(Duration::from_millis(1700)).await;
        assert_eq!(
            driver.inspect(|s| (s.index(), s.remaining(), s.history().len())).await,
            (1, SECONDS_PER_QUESTION, 1)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn full_round_ends_with_results_and_restart_resets() {
        let (driver, screen) = generated();
        begin(&driver).await;

        for _ in 0..5 {
            driver.handle_text("right").await;
            wait(Duration::from_secs(2)).await;
        }
        assert_eq!(driver.inspect(|s| s.phase()).await, Phase::ShowingResults);
        assert!(screen.last().text.starts_with("Quiz Complete!\nScore: 5/5"));

        assert!(!driver.is_idle().await);
        driver.handle_text(RESTART_QUIZ).await;
        assert!(driver.is_idle().await);
        let cleared = driver
            .inspect(|s| {
                s.phase() == Phase::Idle
                    && s.score() == 0
                    && s.index() == 0
                    && s.history().is_empty()
                    && s.timers.is_idle()
            })
            .await;
        assert!(cleared);

        begin(&driver).await;
        driver.handle_text("wrong 1").await;
        assert_eq!(driver.inspect(|s| (s.score(), s.history().len())).await, (0, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn close_cancels_pending_timers() {
        let (driver, screen) = generated();
        begin(&driver).await;
        driver.handle_text("right").await;
        let shown = screen.count();

        driver.close().await;
        wait(Duration::from_secs(120)).await;

        assert_eq!(screen.count(), shown);
        assert_eq!(driver.inspect(|s| s.phase()).await, Phase::Idle);
        assert!(driver.inspect(|s| s.timers.is_idle()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn driver_is_idle_only_outside_a_round() {
        let (driver, _screen) = generated();
        assert!(driver.is_idle().await);

        driver.handle_text(START_QUIZ).await;
        assert!(!driver.is_idle().await);

        driver.handle_text("HTML").await;
        driver.handle_text("Easy").await;
        assert!(!driver.is_idle().await);

        driver.close().await;
        assert!(driver.is_idle().await);
    }

    #[tokio::test(start_paused = true)]
    async fn notice_clears_after_the_quiz_starts() {
        let (driver, screen) = build(Generator::Unavailable(Unavailable::MissingKey));
        begin(&driver).await;

        assert!(screen.last().text.contains("no API key provided"));
        assert_eq!(driver.inspect(|s| s.provenance()).await, Some(Provenance::Fallback));

        wait(Duration::from_secs(6)).await;
        assert_eq!(driver.inspect(|s| s.notice().map(str::to_string)).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn unexpected_text_reprompts_without_changing_state() {
        let (driver, screen) = generated();

        driver.handle_text("hello").await;

        assert!(screen.last().text.starts_with("Please choose one of the options below."));
        assert_eq!(driver.inspect(|s| s.phase()).await, Phase::Idle);
    }
}
