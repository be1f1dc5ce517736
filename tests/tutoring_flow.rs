//! Multi-turn tutoring sessions through the public `Tutor` API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use worksheet_tutor::error::ServiceError;
use worksheet_tutor::question::build_question;
use worksheet_tutor::safety::is_unsafe_phrasing;
use worksheet_tutor::{Language, LearningState, MistakeType, Phraser, Tone, Tutor};

const PROBLEM: &str = "あわせて 3 つと 5 つでぜんぶで何個？";

/// Always answers with the same text.
struct Scripted(&'static str);

#[async_trait]
impl Phraser for Scripted {
    async fn restyle(&self, _prompt: &str) -> Result<String, ServiceError> {
        Ok(self.0.to_string())
    }
}

struct Failing;

#[async_trait]
impl Phraser for Failing {
    async fn restyle(&self, _prompt: &str) -> Result<String, ServiceError> {
        Err(ServiceError::Empty("Gemini"))
    }
}

struct Slow;

#[async_trait]
impl Phraser for Slow {
    async fn restyle(&self, _prompt: &str) -> Result<String, ServiceError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("Too late?".to_string())
    }
}

fn tutor_with(phraser: impl Phraser + 'static) -> Tutor {
    Tutor::new(Arc::new(phraser), Duration::from_millis(200))
}

#[tokio::test]
async fn naming_the_operation_moves_to_operands() {
    let tutor = Tutor::deterministic();
    let reply = tutor
        .next_turn(PROBLEM, "たす", Language::Japanese, None)
        .await
        .unwrap();

    let state = &reply.learning_state;
    assert_eq!(state.step, 2);
    assert_eq!(state.hint_level, 0);
    assert_eq!(state.tone, Tone::Neutral);
    assert_eq!(reply.text, "問題(もんだい)に出(で)てくる数(かず)は何(なん)と何(なに)かな？");
}

#[tokio::test]
async fn wrong_sum_is_a_calculation_error() {
    let tutor = Tutor::deterministic();
    let prior = LearningState {
        step: 3,
        consecutive_success: 2,
        tone: Tone::Energetic,
        ..LearningState::initial()
    };
    let reply = tutor
        .next_turn(PROBLEM, "9", Language::Japanese, Some(prior))
        .await
        .unwrap();

    let state = &reply.learning_state;
    assert_eq!(state.step, 3);
    assert_eq!(state.mistake_type, MistakeType::CalculationError);
    assert_eq!(state.consecutive_failure, 1);
    assert_eq!(state.consecutive_success, 0);
    assert_eq!(state.hint_level, 0);
    assert_eq!(state.tone, Tone::Neutral);
}

#[tokio::test]
async fn wrong_operand_total_is_rejected_right_total_advances() {
    // 7 is not 3 + 5, so only 8 moves the learner on to explaining.
    let tutor = Tutor::deterministic();
    let prior = LearningState { step: 3, ..LearningState::initial() };

    let miss = tutor
        .next_turn(PROBLEM, "7", Language::English, Some(prior.clone()))
        .await
        .unwrap();
    assert_eq!(miss.learning_state.step, 3);
    assert_eq!(miss.learning_state.mistake_type, MistakeType::CalculationError);

    let hit = tutor
        .next_turn(PROBLEM, "8", Language::English, Some(prior))
        .await
        .unwrap();
    assert_eq!(hit.learning_state.step, 4);
    assert_eq!(hit.learning_state.consecutive_success, 1);
}

#[tokio::test]
async fn full_session_reaches_completion() {
    let tutor = Tutor::deterministic();
    let mut state = None;
    for message in ["たす", "3 と 5", "8", "ぜんぶだから"] {
        let reply = tutor
            .next_turn(PROBLEM, message, Language::Japanese, state)
            .await
            .unwrap();
        assert!(!is_unsafe_phrasing(&reply.text), "{message}: {}", reply.text);
        state = Some(reply.learning_state);
    }
    let state = state.unwrap();
    assert!(state.completed);
    assert_eq!(state.consecutive_success, 4);
    assert_eq!(state.tone, Tone::Energetic);
}

#[tokio::test]
async fn repeated_failures_escalate_hints_and_soften_tone() {
    let tutor = Tutor::deterministic();
    let mut state = LearningState::initial();
    for _ in 0..2 {
        state = tutor
            .next_turn(PROBLEM, "えーと", Language::English, Some(state))
            .await
            .unwrap()
            .learning_state;
    }
    assert_eq!(state.hint_level, 1);
    assert_eq!(state.retry_count, 0);
    assert_eq!(state.tone, Tone::Supportive);

    let reply = tutor
        .next_turn(PROBLEM, "hmm", Language::English, Some(state))
        .await
        .unwrap();
    assert_eq!(
        reply.text,
        "You're doing great. Words like \"total\" often mean addition. Which is it?"
    );
}

#[test]
fn completed_session_offers_next_problem_on_yes() {
    let done = LearningState {
        step: 4,
        completed: true,
        ..LearningState::initial()
    };
    assert_eq!(
        build_question(Language::Japanese, &done, PROBLEM, "はい"),
        "次(つぎ)の問題(もんだい)に進(すす)む？"
    );
}

#[tokio::test]
async fn safe_restyle_is_used() {
    let tutor = tutor_with(Scripted("  どんな数(かず)が見(み)えるかな？ "));
    let reply = tutor
        .next_turn(PROBLEM, "たす", Language::Japanese, None)
        .await
        .unwrap();
    assert_eq!(reply.text, "どんな数(かず)が見(み)えるかな？");
}

#[tokio::test]
async fn answer_leak_falls_back_to_core_question() {
    let tutor = tutor_with(Scripted("The answer is 8."));
    let reply = tutor
        .next_turn(PROBLEM, "plus", Language::English, None)
        .await
        .unwrap();
    assert_eq!(reply.text, "What numbers appear in the problem?");
}

#[tokio::test]
async fn equation_in_restyle_is_rejected() {
    let tutor = tutor_with(Scripted("3 + 5 = ?"));
    let reply = tutor
        .next_turn(PROBLEM, "plus", Language::English, None)
        .await
        .unwrap();
    assert_eq!(reply.text, "What numbers appear in the problem?");
}

#[tokio::test]
async fn failing_or_slow_phraser_keeps_the_empathy_line() {
    for tutor in [tutor_with(Failing), tutor_with(Slow)] {
        let reply = tutor
            .next_turn(PROBLEM, "むずかしい", Language::Japanese, None)
            .await
            .unwrap();
        assert!(reply.text.starts_with("そうなんだね。"), "{}", reply.text);
        assert!(reply.text.ends_with("？"), "{}", reply.text);
        assert_eq!(reply.learning_state.mistake_type, MistakeType::Misunderstanding);
    }
}
