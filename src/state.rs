//! Per-session learning state and its turn-by-turn transition.

use serde::{Deserialize, Serialize};

pub const FINAL_STEP: u8 = 4;
pub const MAX_HINT_LEVEL: u8 = 2;
/// Consecutive failures at a step before the hint level goes up.
const FAILURES_PER_HINT: u32 = 2;
/// Streak length that switches the tone away from neutral.
const TONE_STREAK: u32 = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Neutral,
    Supportive,
    Energetic,
}

impl Tone {
    /// Failure streak is checked first.
    pub fn from_streaks(consecutive_success: u32, consecutive_failure: u32) -> Self {
        if consecutive_failure >= TONE_STREAK {
            Tone::Supportive
        } else if consecutive_success >= TONE_STREAK {
            Tone::Energetic
        } else {
            Tone::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Neutral => "neutral",
            Tone::Supportive => "supportive",
            Tone::Energetic => "energetic",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MistakeType {
    #[default]
    Unknown,
    Misunderstanding,
    CalculationError,
}

/// Outcome of grading one learner reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Evaluation {
    Success,
    Failure(MistakeType),
}

impl Evaluation {
    pub fn is_success(self) -> bool {
        matches!(self, Evaluation::Success)
    }
}

/// Keys missing from a caller-supplied state take their initial values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningState {
    pub step: u8,
    pub retry_count: u32,
    pub hint_level: u8,
    pub consecutive_success: u32,
    pub consecutive_failure: u32,
    pub tone: Tone,
    pub mistake_type: MistakeType,
    pub completed: bool,
}

impl LearningState {
    pub fn initial() -> Self {
        Self {
            step: 1,
            retry_count: 0,
            hint_level: 0,
            consecutive_success: 0,
            consecutive_failure: 0,
            tone: Tone::Neutral,
            mistake_type: MistakeType::Unknown,
            completed: false,
        }
    }
}

impl Default for LearningState {
    fn default() -> Self {
        Self::initial()
    }
}

pub fn transition(state: LearningState, evaluation: Evaluation) -> LearningState {
    let mut next = state;
    match evaluation {
        Evaluation::Success => {
            next.consecutive_success = next.consecutive_success.saturating_add(1);
            next.consecutive_failure = 0;
            next.retry_count = 0;
            next.hint_level = 0;
            if next.step < FINAL_STEP {
                next.step += 1;
            } else {
                next.completed = true;
            }
        }
        Evaluation::Failure(mistake) => {
            next.consecutive_failure = next.consecutive_failure.saturating_add(1);
            next.consecutive_success = 0;
            next.retry_count = next.retry_count.saturating_add(1);
            next.mistake_type = mistake;
            if next.retry_count >= FAILURES_PER_HINT && next.hint_level < MAX_HINT_LEVEL {
                next.hint_level += 1;
                next.retry_count = 0;
            }
        }
    }
    next.tone = Tone::from_streaks(next.consecutive_success, next.consecutive_failure);
    next
}
