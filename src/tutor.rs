//! One learner turn: grade, transition, ask, restyle, gate.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::classifier::evaluate_step;
use crate::error::{ServiceError, TutorError};
use crate::lexicon::Language;
use crate::question::build_question;
use crate::safety::{
    accept_restyled, build_style_prompt, empathy_line, fallback_phrasing, is_emotional_message,
};
use crate::state::{transition, Evaluation, LearningState};

/// Rewrites a core question in a warmer voice.
#[async_trait]
pub trait Phraser: Send + Sync {
    async fn restyle(&self, prompt: &str) -> Result<String, ServiceError>;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnReply {
    pub text: String,
    pub learning_state: LearningState,
}

/// Everything about a turn that does not need the phrasing service.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedTurn {
    pub language: Language,
    pub evaluation: Evaluation,
    pub learning_state: LearningState,
    pub core_question: String,
    pub empathy: &'static str,
    pub style_prompt: String,
}

impl PlannedTurn {
    pub fn fallback_text(&self) -> String {
        fallback_phrasing(self.language, self.empathy, &self.core_question)
    }
}

pub fn plan_turn(
    problem_text: &str,
    message: &str,
    language: Language,
    prior: Option<LearningState>,
) -> PlannedTurn {
    let state = prior.unwrap_or_else(LearningState::initial);
    let evaluation = evaluate_step(&state, problem_text, message);
    let next = transition(state, evaluation);
    let core_question = build_question(language, &next, problem_text, message);
    let empathy = if is_emotional_message(message) {
        empathy_line(language)
    } else {
        ""
    };
    let style_prompt = build_style_prompt(language, &core_question, empathy, next.tone);

    debug!(
        step = next.step,
        hint_level = next.hint_level,
        tone = next.tone.as_str(),
        completed = next.completed,
        success = evaluation.is_success(),
        "Turn planned"
    );

    PlannedTurn {
        language,
        evaluation,
        learning_state: next,
        core_question,
        empathy,
        style_prompt,
    }
}

pub struct Tutor {
    phraser: Option<Arc<dyn Phraser>>,
    style_timeout: Duration,
}

impl Tutor {
    pub fn new(phraser: Arc<dyn Phraser>, style_timeout: Duration) -> Self {
        Self {
            phraser: Some(phraser),
            style_timeout,
        }
    }

    /// No phrasing service; every reply is the gated core question.
    pub fn deterministic() -> Self {
        Self {
            phraser: None,
            style_timeout: Duration::ZERO,
        }
    }

    pub async fn next_turn(
        &self,
        problem_text: &str,
        message: &str,
        language: Language,
        prior: Option<LearningState>,
    ) -> Result<TurnReply, TutorError> {
        if message.trim().is_empty() {
            return Err(TutorError::EmptyMessage);
        }

        let plan = plan_turn(problem_text, message, language, prior);
        let text = match self.restyle(&plan.style_prompt).await {
            Some(candidate) => accept_restyled(&candidate).unwrap_or_else(|| {
                warn!("Restyled question rejected, using core question");
                plan.fallback_text()
            }),
            None => plan.fallback_text(),
        };

        Ok(TurnReply {
            text,
            learning_state: plan.learning_state,
        })
    }

    async fn restyle(&self, prompt: &str) -> Option<String> {
        let phraser = self.phraser.as_ref()?;
        match tokio::time::timeout(self.style_timeout, phraser.restyle(prompt)).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(e)) => {
                warn!(error = %e, "Style rewrite failed");
                None
            }
            Err(_) => {
                warn!(timeout = ?self.style_timeout, "Style rewrite timed out");
                None
            }
        }
    }
}
