//! Quiz-taking flow over the shared [`QuizDefinition`].

use tracing::debug;

use super::Transition;
use crate::definition::QuizDefinition;
use crate::reply::Reply;
use crate::state::{Session, Step};

fn final_score(session: &Session, definition: &QuizDefinition) -> String {
    format!("Quiz over! Your score is {}/{}", session.score, definition.len())
}

/// Prompt for the current position, or the final score once past the end.
pub(super) fn ask_question(definition: &QuizDefinition, mut session: Session) -> Transition {
    let index = session.current_question_index;
    match definition.get(index) {
        Some(item) if session.step == Step::AwaitingAnswer => {
            let text = format!("Question {}: {}", index + 1, item.question);
            let reply = Reply::with_choices(text, item.buttons(index));
            Transition::keep(session).with_reply(reply)
        }
        _ => {
            session.step = Step::Completed;
            let text = final_score(&session, definition);
            Transition::keep(session).with_text(text)
        }
    }
}

/// Scores the current question and moves on. `correct` is `None` when the
/// index already points past the definition.
pub(super) fn record_answer(
    definition: &QuizDefinition,
    mut session: Session,
    correct: Option<bool>,
) -> Transition {
    let Some(item) = definition.get(session.current_question_index) else {
        return ask_question(definition, session);
    };

    let verdict = if correct.unwrap_or(false) {
        session.score += 1;
        "Correct!".to_owned()
    } else {
        format!("Wrong! The correct answer is {}.", item.answer)
    };
    debug!(
        index = session.current_question_index,
        score = session.score,
        "answer recorded"
    );
    session.current_question_index += 1;

    let mut transition = ask_question(definition, session);
    transition.replies.insert(0, Reply::text(verdict));
    transition
}
