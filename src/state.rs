/// Opaque per-user identity supplied by the transport.
pub type UserId = u64;

/// Position of a session in its conversation script.
///
/// `Idle` has no variant: a user without a stored session is idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    // PART FOR --- CREATING QUIZ ---
    AwaitingTitle,
    AwaitingDescription,
    AwaitingFirstQuestion,
    AddingQuestions,

    // PART FOR --- TAKING QUIZ ---
    AwaitingAnswer,
    Completed,
}

impl Step {
    pub fn is_authoring(self) -> bool {
        matches!(
            self,
            Step::AwaitingTitle
                | Step::AwaitingDescription
                | Step::AwaitingFirstQuestion
                | Step::AddingQuestions
        )
    }
}

/// Per-user conversation progress.
///
/// A session at [`Step::AddingQuestions`] always holds at least one question,
/// and `score` never exceeds the number of questions answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub(crate) step: Step,
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) questions: Vec<String>,
    pub(crate) score: u32,
    pub(crate) current_question_index: usize,
}

impl Session {
    /// A fresh authoring session waiting for the quiz title.
    pub fn authoring() -> Self {
        Self::at(Step::AwaitingTitle)
    }

    /// A fresh quiz-taking session positioned on the first question.
    pub fn taking() -> Self {
        Self::at(Step::AwaitingAnswer)
    }

    fn at(step: Step) -> Self {
        Self {
            step,
            title: None,
            description: None,
            questions: Vec::new(),
            score: 0,
            current_question_index: 0,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }
}
