//! Pure conversation state machine.
//!
//! Every operation takes the user's current session (if any) and returns a
//! [`Transition`]: the session to store next, the replies to send in order,
//! and the quiz finished by this event. Nothing here touches a store or the
//! transport.

use std::sync::Arc;

use tracing::debug;

use crate::definition::QuizDefinition;
use crate::error::{ConversationError, ConversationResult};
use crate::reply::{ChoiceData, ChoiceTag, Reply};
use crate::state::{Session, Step};
use crate::storage::Quiz;

pub mod constructor;
pub mod runner;

pub const WELCOME: &str =
    "Welcome to the Quiz Bot! Type /quiz to take the quiz or /create to build your own.";

pub const CLOSED_QUESTION: &str = "That question is closed.";

/// Commands that change the conversation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Create,
    StartQuiz,
    Cancel,
}

/// What to store for the user after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    Keep(Session),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Next,
    pub replies: Vec<Reply>,
    pub created: Option<Quiz>,
}

impl Transition {
    pub fn keep(session: Session) -> Self {
        Self {
            next: Next::Keep(session),
            replies: Vec::new(),
            created: None,
        }
    }

    pub fn clear() -> Self {
        Self {
            next: Next::Clear,
            replies: Vec::new(),
            created: None,
        }
    }

    pub fn with_reply(mut self, reply: Reply) -> Self {
        self.replies.push(reply);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_reply(Reply::text(text))
    }

    pub fn with_created(mut self, quiz: Quiz) -> Self {
        self.created = Some(quiz);
        self
    }

    /// The session left behind, if the transition keeps one.
    pub fn session(&self) -> Option<&Session> {
        match &self.next {
            Next::Keep(session) => Some(session),
            Next::Clear => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversationStateMachine {
    definition: Arc<QuizDefinition>,
}

impl ConversationStateMachine {
    pub fn new(definition: Arc<QuizDefinition>) -> Self {
        Self { definition }
    }

    /// Starts or abandons a flow. Starting overwrites whatever was in progress.
    pub fn on_command(&self, session: Option<&Session>, command: Command) -> Transition {
        match command {
            Command::Create => {
                Transition::keep(Session::authoring()).with_text(constructor::TITLE_PROMPT)
            }
            Command::StartQuiz => runner::ask_question(&self.definition, Session::taking()),
            Command::Cancel => match session {
                Some(_) => Transition::clear()
                    .with_text("Cancelled. Type /quiz or /create to begin again."),
                None => Transition::clear().with_text("Nothing to cancel."),
            },
        }
    }

    /// Feeds free text into whichever step the session is at.
    pub fn on_text(&self, session: Option<Session>, text: &str) -> ConversationResult<Transition> {
        let session = session.ok_or(ConversationError::SessionNotFound)?;
        match session.step {
            Step::AwaitingAnswer => {
                let correct = self
                    .definition
                    .get(session.current_question_index)
                    .map(|item| item.is_correct(text));
                Ok(runner::record_answer(&self.definition, session, correct))
            }
            Step::Completed => Ok(runner::ask_question(&self.definition, session)),
            _ => constructor::on_text(session, text),
        }
    }

    /// Scores a multiple-choice button press. A button left over from an
    /// earlier question leaves the session untouched.
    pub fn on_choice(
        &self,
        session: Option<Session>,
        choice: ChoiceData,
    ) -> ConversationResult<Transition> {
        let session = session.ok_or(ConversationError::SessionNotFound)?;
        match session.step {
            Step::AwaitingAnswer if choice.question != session.current_question_index => {
                debug!(
                    pressed = choice.question,
                    current = session.current_question_index,
                    "stale choice ignored"
                );
                Ok(Transition::keep(session).with_text(CLOSED_QUESTION))
            }
            Step::AwaitingAnswer => {
                let correct = self
                    .definition
                    .get(session.current_question_index)
                    .map(|_| choice.tag == ChoiceTag::Correct);
                Ok(runner::record_answer(&self.definition, session, correct))
            }
            Step::Completed => Ok(runner::ask_question(&self.definition, session)),
            step => Err(ConversationError::InvalidStep {
                step,
                operation: "choice",
            }),
        }
    }

    /// Re-renders the prompt for the current quiz-taking position.
    pub fn ask_question(&self, session: Option<Session>) -> ConversationResult<Transition> {
        let session = session.ok_or(ConversationError::SessionNotFound)?;
        if session.step.is_authoring() {
            return Err(ConversationError::InvalidStep {
                step: session.step,
                operation: "ask_question",
            });
        }
        Ok(runner::ask_question(&self.definition, session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::QuizItem;
    use crate::storage::QuizSummary;

    fn machine() -> ConversationStateMachine {
        ConversationStateMachine::new(Arc::new(QuizDefinition::default()))
    }

    fn kept(transition: Transition) -> Session {
        match transition.next {
            Next::Keep(session) => session,
            Next::Clear => panic!("expected the session to be kept"),
        }
    }

    fn texts(transition: &Transition) -> Vec<&str> {
        transition.replies.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn steps_follow_the_authoring_table() {
        let machine = machine();
        let mut session = kept(machine.on_command(None, Command::Create));
        assert_eq!(session.step(), Step::AwaitingTitle);

        let expected = [
            ("Geo", Step::AwaitingDescription),
            ("Capitals of the world", Step::AwaitingFirstQuestion),
            ("Capital of France?", Step::AddingQuestions),
            ("Capital of Peru?", Step::AddingQuestions),
            ("Capital of Chad?", Step::AddingQuestions),
        ];
        for (text, step) in expected {
            session = kept(machine.on_text(Some(session), text).unwrap());
            assert_eq!(session.step(), step, "after {text:?}");
        }
        assert_eq!(session.questions().len(), 3);
        assert_eq!(session.description(), Some("Capitals of the world"));
    }

    #[test]
    fn geo_scenario_produces_expected_summary() {
        let machine = machine();
        let mut session = kept(machine.on_command(None, Command::Create));
        for text in ["Geo", "/skip", "Capital of France?"] {
            session = kept(machine.on_text(Some(session), text).unwrap());
        }

        let finished = machine.on_text(Some(session), "/finish").unwrap();
        assert_eq!(finished.next, Next::Clear);
        let quiz = finished.created.clone().unwrap();
        assert_eq!(
            quiz.summary(),
            QuizSummary {
                title: "Geo".into(),
                description: "No description".into(),
                question_count: 1,
            }
        );
        assert_eq!(
            texts(&finished),
            vec!["Quiz created!\nTitle: Geo\nDescription: No description\nQuestions: 1"]
        );
    }

    #[test]
    fn start_quiz_asks_first_question() {
        let transition = machine().on_command(None, Command::StartQuiz);
        assert_eq!(texts(&transition), vec!["Question 1: What is the capital of France?"]);
        let session = kept(transition);
        assert_eq!(session.step(), Step::AwaitingAnswer);
        assert_eq!(session.current_question_index(), 0);
    }

    #[test]
    fn command_overwrites_session_in_progress() {
        let machine = machine();
        let mut session = kept(machine.on_command(None, Command::Create));
        session = kept(machine.on_text(Some(session), "Geo").unwrap());

        let restarted = kept(machine.on_command(Some(&session), Command::StartQuiz));
        assert_eq!(restarted.step(), Step::AwaitingAnswer);
        assert_eq!(restarted.title(), None);
    }

    #[test]
    fn cancel_clears_session() {
        let machine = machine();
        let session = kept(machine.on_command(None, Command::Create));
        let cancelled = machine.on_command(Some(&session), Command::Cancel);
        assert_eq!(cancelled.next, Next::Clear);
        assert_eq!(texts(&cancelled), vec!["Cancelled. Type /quiz or /create to begin again."]);

        let nothing = machine.on_command(None, Command::Cancel);
        assert_eq!(texts(&nothing), vec!["Nothing to cancel."]);
    }

    #[test]
    fn text_without_session_is_not_found() {
        assert_eq!(
            machine().on_text(None, "hello"),
            Err(ConversationError::SessionNotFound)
        );
        assert_eq!(
            machine().ask_question(None),
            Err(ConversationError::SessionNotFound)
        );
        assert_eq!(
            machine().on_choice(None, ChoiceData::new(ChoiceTag::Correct, 0)),
            Err(ConversationError::SessionNotFound)
        );
    }

    #[test]
    fn answers_are_case_insensitive() {
        let machine = machine();
        for answer in ["paris", "PARIS", "Paris"] {
            let session = kept(machine.on_command(None, Command::StartQuiz));
            let transition = machine.on_text(Some(session), answer).unwrap();
            assert_eq!(transition.replies[0].text, "Correct!");
            assert_eq!(kept(transition).score(), 1);
        }
    }

    #[test]
    fn wrong_answer_reveals_the_correct_one() {
        let machine = machine();
        let session = kept(machine.on_command(None, Command::StartQuiz));
        let transition = machine.on_text(Some(session), "London").unwrap();
        assert_eq!(
            texts(&transition),
            vec![
                "Wrong! The correct answer is Paris.",
                "Question 2: What is 2 + 2?",
            ]
        );
        let session = kept(transition);
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_question_index(), 1);
    }

    #[test]
    fn completed_quiz_keeps_reporting_final_score() {
        let machine = machine();
        let mut session = kept(machine.on_command(None, Command::StartQuiz));
        for answer in ["Paris", "5", "jupiter"] {
            session = kept(machine.on_text(Some(session), answer).unwrap());
        }
        assert_eq!(session.step(), Step::Completed);
        assert_eq!(session.score(), 2);

        let again = machine.on_text(Some(session.clone()), "anything").unwrap();
        assert_eq!(texts(&again), vec!["Quiz over! Your score is 2/3"]);
        assert_eq!(kept(again), session);
    }

    #[test]
    fn ask_question_is_idempotent() {
        let machine = machine();
        let session = kept(machine.on_command(None, Command::StartQuiz));
        let first = machine.ask_question(Some(session.clone())).unwrap();
        let second = machine.ask_question(Some(session.clone())).unwrap();
        assert_eq!(first, second);
        assert_eq!(kept(first), session);
    }

    #[test]
    fn ask_question_rejects_authoring_session() {
        let err = machine().ask_question(Some(Session::authoring())).unwrap_err();
        assert_eq!(
            err,
            ConversationError::InvalidStep {
                step: Step::AwaitingTitle,
                operation: "ask_question",
            }
        );
    }

    #[test]
    fn choices_are_offered_and_scored_by_tag() {
        let definition = QuizDefinition::new(vec![
            QuizItem::new("2 + 2?", "4").with_choices(["3", "4"]),
            QuizItem::new("Largest planet?", "Jupiter"),
        ]);
        let machine = ConversationStateMachine::new(Arc::new(definition));

        let started = machine.on_command(None, Command::StartQuiz);
        assert_eq!(started.replies[0].choices.len(), 2);
        let correct = started.replies[0].choices[1].data;
        assert_eq!(correct, ChoiceData::new(ChoiceTag::Correct, 0));

        let answered = machine.on_choice(started.session().cloned(), correct).unwrap();
        assert_eq!(texts(&answered), vec!["Correct!", "Question 2: Largest planet?"]);
        assert!(answered.replies[1].choices.is_empty());
        assert_eq!(answered.session().unwrap().score(), 1);
    }

    #[test]
    fn button_from_an_answered_question_is_not_scored() {
        let definition = QuizDefinition::new(vec![
            QuizItem::new("2 + 2?", "4").with_choices(["3", "4"]),
            QuizItem::new("Largest planet?", "Jupiter"),
        ]);
        let machine = ConversationStateMachine::new(Arc::new(definition));

        let started = machine.on_command(None, Command::StartQuiz);
        let stale = started.replies[0].choices[1].data;
        let typed = kept(machine.on_text(started.session().cloned(), "3").unwrap());
        assert_eq!(typed.current_question_index(), 1);

        let pressed = machine.on_choice(Some(typed.clone()), stale).unwrap();
        assert_eq!(texts(&pressed), vec![CLOSED_QUESTION]);
        let session = kept(pressed);
        assert_eq!(session, typed);
        assert_eq!(session.score(), 0);
        assert_eq!(session.step(), Step::AwaitingAnswer);
    }

    #[test]
    fn button_from_before_a_restart_is_not_scored() {
        let machine = machine();
        let mut session = kept(machine.on_command(None, Command::StartQuiz));
        session = kept(machine.on_text(Some(session), "Paris").unwrap());
        assert_eq!(session.current_question_index(), 1);

        let restarted = kept(machine.on_command(Some(&session), Command::StartQuiz));
        let pressed = machine
            .on_choice(Some(restarted.clone()), ChoiceData::new(ChoiceTag::Correct, 1))
            .unwrap();
        assert_eq!(texts(&pressed), vec![CLOSED_QUESTION]);
        assert_eq!(kept(pressed), restarted);
    }

    #[test]
    fn choice_during_authoring_is_invalid() {
        let choice = ChoiceData::new(ChoiceTag::Wrong, 0);
        let result = machine().on_choice(Some(Session::authoring()), choice);
        assert!(matches!(result, Err(ConversationError::InvalidStep { .. })));
    }

    #[test]
    fn empty_definition_completes_immediately() {
        let machine = ConversationStateMachine::new(Arc::new(QuizDefinition::new(vec![])));
        let transition = machine.on_command(None, Command::StartQuiz);
        assert_eq!(texts(&transition), vec!["Quiz over! Your score is 0/0"]);
        assert_eq!(kept(transition).step(), Step::Completed);
    }
}
