//! View state machine.
//!
//! Each screen is one variant of [`Screen`] carrying exactly the data it
//! needs, and [`transition`] is a pure function from the current screen and
//! an [`Event`] to the next screen. The one side effect the machine can ask
//! for, starting a generation request, is returned as an [`Effect`] for the
//! caller to perform.

use std::fmt;

use crate::models::{Lesson, QuizQuestion, QuizSettings, Topic};
use crate::provider::{GenerationError, GenerationRequest, Mode, Payload};
use crate::runner::{AnswerRecord, QuizRunner};

/// Why a quiz is being taken. Decides where the results screen leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizContext {
    /// A generated quiz. Retrying asks for a fresh set with the same settings.
    Quiz(QuizSettings),
    /// A lesson's exam. Retrying replays the same fixed questions.
    Exam { topic: Topic, lesson: Lesson },
}

impl QuizContext {
    pub fn name(&self) -> &'static str {
        match self {
            QuizContext::Quiz(_) => "quiz",
            QuizContext::Exam { .. } => "exam",
        }
    }

    pub fn retry_label(&self) -> &'static str {
        match self {
            QuizContext::Quiz(_) => "Try Again",
            QuizContext::Exam { .. } => "Retake Exam",
        }
    }

    pub fn fresh_label(&self) -> &'static str {
        match self {
            QuizContext::Quiz(_) => "New Quiz",
            QuizContext::Exam { .. } => "New Lesson",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Menu,
    QuizSetup {
        error: Option<String>,
        last_settings: Option<QuizSettings>,
    },
    LessonSetup {
        error: Option<String>,
        last_topic: Option<Topic>,
    },
    Generating {
        request: GenerationRequest,
    },
    InLesson {
        topic: Topic,
        lesson: Lesson,
    },
    InQuiz {
        context: QuizContext,
        runner: QuizRunner,
    },
    Results {
        context: QuizContext,
        questions: Vec<QuizQuestion>,
        answers: AnswerRecord,
    },
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Menu => "menu",
            Screen::QuizSetup { .. } => "quiz_setup",
            Screen::LessonSetup { .. } => "lesson_setup",
            Screen::Generating { .. } => "generating",
            Screen::InLesson { .. } => "in_lesson",
            Screen::InQuiz { .. } => "in_quiz",
            Screen::Results { .. } => "results",
        }
    }

    /// Inline error shown on a setup screen.
    pub fn error(&self) -> Option<&str> {
        match self {
            Screen::QuizSetup { error, .. } | Screen::LessonSetup { error, .. } => {
                error.as_deref()
            }
            _ => None,
        }
    }

    /// Settings of the most recent quiz request, if this screen still knows them.
    pub fn current_settings(&self) -> Option<QuizSettings> {
        match self {
            Screen::QuizSetup { last_settings, .. } => *last_settings,
            Screen::Generating {
                request: GenerationRequest::Quiz(settings),
            } => Some(*settings),
            Screen::InQuiz {
                context: QuizContext::Quiz(settings),
                ..
            }
            | Screen::Results {
                context: QuizContext::Quiz(settings),
                ..
            } => Some(*settings),
            _ => None,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SelectMode(Mode),
    /// Leave a setup screen for the menu, or a lesson for topic selection.
    Back,
    SubmitQuiz(QuizSettings),
    SubmitLesson(Topic),
    Generated(Payload),
    GenerationFailed(GenerationError),
    StartExam,
    QuizCompleted(AnswerRecord),
    Retry,
    StartFresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Generate(GenerationRequest),
}

fn generating(request: GenerationRequest) -> (Screen, Option<Effect>) {
    let effect = Effect::Generate(request.clone());
    (Screen::Generating { request }, Some(effect))
}

fn setup_with_error(request: GenerationRequest, error: GenerationError) -> Screen {
    let message = Some(error.user_message(request.mode()));
    match request {
        GenerationRequest::Quiz(settings) => Screen::QuizSetup {
            error: message,
            last_settings: Some(settings),
        },
        GenerationRequest::Lesson(topic) => Screen::LessonSetup {
            error: message,
            last_topic: Some(topic),
        },
    }
}

fn start_quiz(context: QuizContext, questions: Vec<QuizQuestion>) -> Screen {
    Screen::InQuiz {
        context,
        runner: QuizRunner::new(questions),
    }
}

/// Compute the next screen. Events that make no sense on the current
/// screen leave it as it is.
pub fn transition(screen: Screen, event: Event) -> (Screen, Option<Effect>) {
    match (screen, event) {
        (Screen::Menu, Event::SelectMode(Mode::Quiz)) => (
            Screen::QuizSetup {
                error: None,
                last_settings: None,
            },
            None,
        ),
        (Screen::Menu, Event::SelectMode(Mode::Lesson)) => (
            Screen::LessonSetup {
                error: None,
                last_topic: None,
            },
            None,
        ),

        (Screen::QuizSetup { .. } | Screen::LessonSetup { .. }, Event::Back) => {
            (Screen::Menu, None)
        }
        (Screen::QuizSetup { .. }, Event::SubmitQuiz(settings)) => {
            generating(GenerationRequest::Quiz(settings))
        }
        (Screen::LessonSetup { .. }, Event::SubmitLesson(topic)) => {
            generating(GenerationRequest::Lesson(topic))
        }

        (Screen::Generating { request }, Event::Generated(payload)) => {
            let next = match (request, payload) {
                (GenerationRequest::Quiz(settings), Payload::Quiz(questions)) => {
                    if questions.is_empty() {
                        setup_with_error(
                            GenerationRequest::Quiz(settings),
                            GenerationError::EmptyResult,
                        )
                    } else {
                        start_quiz(QuizContext::Quiz(settings), questions)
                    }
                }
                (GenerationRequest::Lesson(topic), Payload::Lesson(lesson)) => {
                    Screen::InLesson { topic, lesson }
                }
                (request, _) => setup_with_error(
                    request,
                    GenerationError::ProviderFailure("unexpected payload kind".to_string()),
                ),
            };
            (next, None)
        }
        (Screen::Generating { request }, Event::GenerationFailed(error)) => {
            (setup_with_error(request, error), None)
        }

        (Screen::InLesson { topic, lesson }, Event::StartExam) => {
            let questions = lesson.exam.clone();
            (start_quiz(QuizContext::Exam { topic, lesson }, questions), None)
        }
        (Screen::InLesson { topic, .. }, Event::Back) => (
            Screen::LessonSetup {
                error: None,
                last_topic: Some(topic),
            },
            None,
        ),

        (Screen::InQuiz { context, runner }, Event::QuizCompleted(answers)) => (
            Screen::Results {
                context,
                questions: runner.into_questions(),
                answers,
            },
            None,
        ),

        (Screen::Results { context, questions, .. }, Event::Retry) => match context {
            QuizContext::Quiz(settings) => generating(GenerationRequest::Quiz(settings)),
            context @ QuizContext::Exam { .. } => (start_quiz(context, questions), None),
        },
        (Screen::Results { context, .. }, Event::StartFresh) => {
            let next = match context {
                QuizContext::Quiz(settings) => Screen::QuizSetup {
                    error: None,
                    last_settings: Some(settings),
                },
                QuizContext::Exam { topic, .. } => Screen::LessonSetup {
                    error: None,
                    last_topic: Some(topic),
                },
            };
            (next, None)
        }

        (screen, _) => (screen, None),
    }
}
