//! Authoring flow: title, description, then questions until `/finish`.

use tracing::debug;

use super::Transition;
use crate::error::{ConversationError, ConversationResult};
use crate::state::{Session, Step};
use crate::storage::Quiz;

pub const SKIP_KEYWORD: &str = "/skip";
pub const FINISH_KEYWORD: &str = "/finish";

pub(crate) const TITLE_PROMPT: &str = "Let's start creating a new quiz! What's its title?";
const DESCRIPTION_PROMPT: &str =
    "OK. What is the new quiz about? Send /skip to leave it without a description.";
const FIRST_QUESTION_PROMPT: &str = "Great. Please enter the first question.";
const NEXT_QUESTION_PROMPT: &str =
    "Question added. Send another question or /finish to save the quiz.";

fn is_keyword(text: &str, keyword: &str) -> bool {
    text.eq_ignore_ascii_case(keyword)
}

pub(super) fn on_text(mut session: Session, text: &str) -> ConversationResult<Transition> {
    match session.step {
        Step::AwaitingTitle => {
            debug!(title = text, "received quiz title");
            session.title = Some(text.to_owned());
            session.step = Step::AwaitingDescription;
            Ok(Transition::keep(session).with_text(DESCRIPTION_PROMPT))
        }
        Step::AwaitingDescription => {
            if !is_keyword(text, SKIP_KEYWORD) {
                session.description = Some(text.to_owned());
            }
            session.step = Step::AwaitingFirstQuestion;
            Ok(Transition::keep(session).with_text(FIRST_QUESTION_PROMPT))
        }
        Step::AwaitingFirstQuestion => {
            session.questions.push(text.to_owned());
            session.step = Step::AddingQuestions;
            Ok(Transition::keep(session).with_text(NEXT_QUESTION_PROMPT))
        }
        Step::AddingQuestions if is_keyword(text, FINISH_KEYWORD) => {
            let quiz = Quiz::new(session.title, session.description, session.questions);
            let summary = quiz.summary();
            debug!(questions = summary.question_count, "quiz finished");
            Ok(Transition::clear()
                .with_text(summary.to_string())
                .with_created(quiz))
        }
        Step::AddingQuestions => {
            session.questions.push(text.to_owned());
            Ok(Transition::keep(session).with_text(NEXT_QUESTION_PROMPT))
        }
        step => Err(ConversationError::InvalidStep {
            step,
            operation: "authoring text",
        }),
    }
}
