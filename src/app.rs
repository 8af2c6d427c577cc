//! Interactive application state.
//!
//! [`App`] wraps the pure [`transition`] function with everything a screen
//! needs but the state machine does not care about: form selections, scroll
//! offsets, the spinner, and the one generation request that may be in
//! flight.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{Difficulty, QuestionCount, QuizSettings, Topic, cycle};
use crate::provider::{self, ContentProvider, GenerationError, GenerationRequest, Mode, Payload};
use crate::runner::{QuizRunner, RunnerStep};
use crate::scoring::{ScoreReport, score};
use crate::state::{Effect, Event, Screen, transition};

type GenerationResult = Result<Payload, GenerationError>;

/// Field focused on the quiz setup form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetupField {
    #[default]
    Topic,
    Count,
    Difficulty,
}

impl SetupField {
    const ALL: [SetupField; 3] = [SetupField::Topic, SetupField::Count, SetupField::Difficulty];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuizForm {
    pub settings: QuizSettings,
    pub field: SetupField,
}

impl QuizForm {
    pub fn next_field(&mut self) {
        self.field = cycle(&SetupField::ALL, self.field, true);
    }

    pub fn previous_field(&mut self) {
        self.field = cycle(&SetupField::ALL, self.field, false);
    }

    /// Change the focused field's value.
    pub fn change(&mut self, forward: bool) {
        let s = &mut self.settings;
        match self.field {
            SetupField::Topic => s.topic = cycle(&Topic::ALL, s.topic, forward),
            SetupField::Count => {
                s.num_questions = cycle(&QuestionCount::ALL, s.num_questions, forward)
            }
            SetupField::Difficulty => {
                s.difficulty = cycle(&Difficulty::ALL, s.difficulty, forward)
            }
        }
    }
}

pub struct App {
    screen: Screen,
    provider: Arc<dyn ContentProvider>,
    pending: Option<oneshot::Receiver<GenerationResult>>,
    /// Correlates log lines of one quiz or lesson session.
    session_id: Option<Uuid>,
    pub menu_choice: Mode,
    pub quiz_form: QuizForm,
    pub lesson_topic: Topic,
    scroll: u16,
    tick: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        info!(provider = provider.name(), "Content provider ready");
        Self {
            screen: Screen::Menu,
            provider,
            pending: None,
            session_id: None,
            menu_choice: Mode::Quiz,
            quiz_form: QuizForm::default(),
            lesson_topic: Topic::default(),
            scroll: 0,
            tick: 0,
            should_quit: false,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Feed an event through the state machine and carry out its effect.
    pub fn dispatch(&mut self, event: Event) {
        let previous = std::mem::take(&mut self.screen);
        let was_generating = matches!(previous, Screen::Generating { .. });
        let from = previous.name();
        let (next, effect) = transition(previous, event);

        if next.name() != from {
            self.enter(&next, was_generating);
            info!(
                session = ?self.session_id,
                from,
                to = next.name(),
                "Screen changed"
            );
        }
        self.screen = next;

        if let Some(Effect::Generate(request)) = effect {
            self.start_generation(request);
        }
    }

    fn enter(&mut self, next: &Screen, was_generating: bool) {
        self.scroll = 0;
        match next {
            Screen::Menu => self.session_id = None,
            Screen::QuizSetup {
                last_settings: Some(settings),
                ..
            } => self.quiz_form.settings = *settings,
            Screen::LessonSetup {
                last_topic: Some(topic),
                ..
            } => self.lesson_topic = *topic,
            Screen::Generating { .. } => self.session_id = Some(Uuid::new_v4()),
            Screen::InQuiz { .. } if !was_generating => self.session_id = Some(Uuid::new_v4()),
            _ => {}
        }
    }

    fn start_generation(&mut self, request: GenerationRequest) {
        // The state machine only emits this on entering `Generating`, so
        // there is never an earlier request still pending.
        let provider = Arc::clone(&self.provider);
        let (tx, rx) = oneshot::channel();
        info!(session = ?self.session_id, ?request, "Requesting content");

        tokio::spawn(async move {
            let result = provider::generate(provider.as_ref(), &request).await;
            let _ = tx.send(result);
        });
        self.pending = Some(rx);
    }

    fn finish_generation(&mut self, result: GenerationResult) {
        let event = match result {
            Ok(payload) => Event::Generated(payload),
            Err(e) => {
                warn!(session = ?self.session_id, code = e.code(), error = %e, "Generation failed");
                Event::GenerationFailed(e)
            }
        };
        self.dispatch(event);
    }

    /// Apply a finished generation, if any. Never blocks.
    pub fn poll_generation(&mut self) {
        let Some(rx) = self.pending.as_mut() else {
            return;
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => Err(GenerationError::ProviderFailure(
                "generation task ended without a result".to_string(),
            )),
        };
        self.pending = None;
        self.finish_generation(result);
    }

    /// Wait for the pending generation, if any, and apply it.
    pub async fn wait_for_generation(&mut self) {
        let Some(rx) = self.pending.take() else {
            return;
        };

        let result = rx.await.unwrap_or_else(|_| {
            Err(GenerationError::ProviderFailure(
                "generation task ended without a result".to_string(),
            ))
        });
        self.finish_generation(result);
    }

    pub fn select_menu(&mut self) {
        self.dispatch(Event::SelectMode(self.menu_choice));
    }

    pub fn toggle_menu_choice(&mut self) {
        self.menu_choice = match self.menu_choice {
            Mode::Quiz => Mode::Lesson,
            Mode::Lesson => Mode::Quiz,
        };
    }

    pub fn submit_quiz(&mut self) {
        self.dispatch(Event::SubmitQuiz(self.quiz_form.settings));
    }

    pub fn submit_lesson(&mut self) {
        self.dispatch(Event::SubmitLesson(self.lesson_topic));
    }

    pub fn change_lesson_topic(&mut self, forward: bool) {
        self.lesson_topic = cycle(&Topic::ALL, self.lesson_topic, forward);
    }

    pub fn runner(&self) -> Option<&QuizRunner> {
        match &self.screen {
            Screen::InQuiz { runner, .. } => Some(runner),
            _ => None,
        }
    }

    fn with_runner(&mut self, op: impl FnOnce(&mut QuizRunner) -> RunnerStep) {
        let Screen::InQuiz { runner, .. } = &mut self.screen else {
            return;
        };

        match op(runner) {
            RunnerStep::Completed(answers) => {
                debug!(session = ?self.session_id, "Quiz completed");
                self.dispatch(Event::QuizCompleted(answers));
            }
            RunnerStep::Moved(index) => {
                debug!(session = ?self.session_id, index, "Next question");
            }
            RunnerStep::Answered | RunnerStep::Ignored => {}
        }
    }

    pub fn highlight_next(&mut self) {
        if let Screen::InQuiz { runner, .. } = &mut self.screen {
            runner.highlight_next();
        }
    }

    pub fn highlight_previous(&mut self) {
        if let Screen::InQuiz { runner, .. } = &mut self.screen {
            runner.highlight_previous();
        }
    }

    /// Answer with the highlighted option, or move on if already answered.
    pub fn confirm(&mut self) {
        let answered = self.runner().is_some_and(|r| r.is_answered());
        if answered {
            self.with_runner(QuizRunner::advance);
        } else {
            self.with_runner(QuizRunner::select_highlighted);
        }
    }

    pub fn select_option(&mut self, index: usize) {
        let Some(option) = self
            .runner()
            .and_then(|r| r.current_question())
            .and_then(|q| q.options.get(index))
            .cloned()
        else {
            return;
        };
        self.with_runner(|r| r.select(&option));
    }

    pub fn skip_question(&mut self) {
        self.with_runner(QuizRunner::skip);
    }

    pub fn advance_question(&mut self) {
        self.with_runner(QuizRunner::advance);
    }

    /// Score for the results screen.
    pub fn report(&self) -> Option<ScoreReport> {
        match &self.screen {
            Screen::Results {
                questions, answers, ..
            } => Some(score(questions, answers)),
            _ => None,
        }
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}
