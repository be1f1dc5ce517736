//! Deterministic core questions.
//!
//! Every row of [`QUESTIONS`] carries the Japanese and English wording side by
//! side. Rows are searched in order and the first match wins, so each step lists
//! its specific hint rows before a catch-all row for that step.

use crate::arithmetic::{detect_operation, extract_numbers, Operation};
use crate::lexicon::{any_pack, Language};
use crate::state::{LearningState, Tone, FINAL_STEP, MAX_HINT_LEVEL};

#[derive(Clone, Copy, Debug)]
enum HintMatch {
    Level(u8),
    Any,
}

#[derive(Clone, Copy, Debug)]
enum OpMatch {
    Add,
    Sub,
    Any,
}

#[derive(Debug)]
struct Template {
    step: u8,
    hint: HintMatch,
    op: OpMatch,
    /// Row interpolates `{a}` and `{b}`, the first two numbers of the problem.
    needs_operands: bool,
    ja: &'static str,
    en: &'static str,
}

impl Template {
    const fn new(step: u8, hint: HintMatch, op: OpMatch, ja: &'static str, en: &'static str) -> Self {
        Self { step, hint, op, needs_operands: false, ja, en }
    }

    const fn with_operands(self) -> Self {
        Self { needs_operands: true, ..self }
    }

    fn matches(&self, step: u8, hint: u8, op: Operation, has_operands: bool) -> bool {
        let hint_ok = match self.hint {
            HintMatch::Level(level) => level == hint,
            HintMatch::Any => true,
        };
        let op_ok = match self.op {
            OpMatch::Add => op == Operation::Add,
            OpMatch::Sub => op == Operation::Sub,
            OpMatch::Any => true,
        };
        self.step == step && hint_ok && op_ok && (has_operands || !self.needs_operands)
    }

    fn text(&self, language: Language) -> &'static str {
        match language {
            Language::Japanese => self.ja,
            Language::English => self.en,
        }
    }
}

use self::HintMatch::{Any as AnyHint, Level};
use self::OpMatch::{Add, Any as AnyOp, Sub};

const EXPLAIN: Template = Template::new(
    4,
    AnyHint,
    AnyOp,
    "どうしてそう思(おも)ったのか、教(おし)えてくれる？",
    "Can you explain why your number makes sense?",
);

static QUESTIONS: &[Template] = &[
    Template::new(
        1,
        Level(0),
        AnyOp,
        "さいごは「ぜんぶ」？それとも「のこり」？",
        "Is this an addition or subtraction problem?",
    ),
    Template::new(
        1,
        Level(1),
        Add,
        "「ぜんぶ」や「あわせて」は足(た)し算(ざん)だよ。どっち？",
        "Words like \"total\" often mean addition. Which is it?",
    ),
    Template::new(
        1,
        Level(1),
        Sub,
        "「のこり」は引(ひ)き算(ざん)だよ。どっち？",
        "Words like \"remaining\" often mean subtraction. Which is it?",
    ),
    Template::new(
        1,
        AnyHint,
        AnyOp,
        "「ぜんぶ」か「のこり」の言葉(ことば)に注目(ちゅうもく)してみよう。どっち？",
        "Look for words like \"total\" or \"remaining\". Which operation fits?",
    ),
    Template::new(
        2,
        Level(0),
        AnyOp,
        "問題(もんだい)に出(で)てくる数(かず)は何(なん)と何(なに)かな？",
        "What numbers appear in the problem?",
    ),
    Template::new(
        2,
        Level(1),
        AnyOp,
        "{a}と{b}が出(で)てくるよ。言(い)える？",
        "I see {a} and {b}. Can you say them?",
    )
    .with_operands(),
    Template::new(
        2,
        AnyHint,
        AnyOp,
        "使(つか)う数(かず)を2つ言(い)ってみよう。どれとどれ？",
        "Which two numbers should we use?",
    ),
    Template::new(
        3,
        Level(0),
        AnyOp,
        "その2つで、ぜんぶ何(なん)になるかな？",
        "What do you get when you combine those numbers?",
    ),
    Template::new(
        3,
        Level(1),
        Add,
        "たし算(ざん)で計算(けいさん)してみよう。いくつ？",
        "Try adding the two numbers. What do you get?",
    ),
    Template::new(
        3,
        Level(1),
        Sub,
        "ひき算(ざん)で計算(けいさん)してみよう。いくつ？",
        "Try subtracting the numbers. What do you get?",
    ),
    Template::new(
        3,
        AnyHint,
        AnyOp,
        "2つの数(かず)で計算(けいさん)すると、いくつになるかな？",
        "Work it out one step at a time. What number do you get?",
    ),
    EXPLAIN,
];

const NEXT_PROBLEM: Template = Template::new(
    FINAL_STEP,
    AnyHint,
    AnyOp,
    "次(つぎ)の問題(もんだい)に進(すす)む？",
    "Ready for the next problem?",
);

const TRY_AGAIN: Template = Template::new(
    FINAL_STEP,
    AnyHint,
    AnyOp,
    "もう一度(いちど)やってみる？",
    "Want to try this one again?",
);

pub fn tone_prefix(tone: Tone, language: Language) -> &'static str {
    let pack = language.pack();
    match tone {
        Tone::Supportive => pack.supportive_prefix,
        Tone::Energetic => pack.energetic_prefix,
        Tone::Neutral => "",
    }
}

fn lookup(step: u8, hint: u8, op: Operation, has_operands: bool) -> &'static Template {
    let step = if (1..FINAL_STEP).contains(&step) { step } else { FINAL_STEP };
    let hint = hint.min(MAX_HINT_LEVEL);
    QUESTIONS
        .iter()
        .find(|t| t.matches(step, hint, op, has_operands))
        .unwrap_or(&EXPLAIN)
}

fn wants_next_problem(message: &str) -> bool {
    any_pack(message, |p| p.affirmative_cues) && !any_pack(message, |p| p.negative_cues)
}

/// The next question to ask, before any restyling. Once the session is
/// completed the learner's current message decides between moving on and
/// retrying.
pub fn build_question(
    language: Language,
    state: &LearningState,
    problem_text: &str,
    message: &str,
) -> String {
    let prefix = tone_prefix(state.tone, language);

    if state.completed {
        let template = if wants_next_problem(message) {
            &NEXT_PROBLEM
        } else {
            &TRY_AGAIN
        };
        return format!("{prefix}{}", template.text(language));
    }

    let numbers = extract_numbers(problem_text);
    let op = detect_operation(problem_text);
    let template = lookup(state.step, state.hint_level, op, numbers.len() >= 2);
    let mut body = template.text(language).to_string();
    if let (true, [a, b, ..]) = (template.needs_operands, numbers.as_slice()) {
        body = body.replace("{a}", &a.to_string()).replace("{b}", &b.to_string());
    }
    format!("{prefix}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safety::is_unsafe_phrasing;

    const ADD_PROBLEM: &str = "あわせて 3 つと 5 つでぜんぶで何個？";
    const SUB_PROBLEM: &str = "There were 9 birds. 4 flew away. How many are remaining?";
    const BARE_PROBLEM: &str = "How many apples?";

    fn state(step: u8, hint_level: u8) -> LearningState {
        LearningState { step, hint_level, ..LearningState::initial() }
    }

    #[test]
    fn every_combination_is_a_safe_question() {
        for language in [Language::Japanese, Language::English] {
            for tone in [Tone::Neutral, Tone::Supportive, Tone::Energetic] {
                for step in 0..=5 {
                    for hint in 0..=3 {
                        for problem in [ADD_PROBLEM, SUB_PROBLEM, BARE_PROBLEM] {
                            let s = LearningState { tone, ..state(step, hint) };
                            let q = build_question(language, &s, problem, "");
                            assert!(
                                !is_unsafe_phrasing(&q),
                                "{language:?} step {step} hint {hint} {problem:?}: {q}"
                            );
                            assert!(!q.contains('{'), "uninterpolated: {q}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn rows_exist_in_both_languages() {
        for t in QUESTIONS.iter().chain([&NEXT_PROBLEM, &TRY_AGAIN]) {
            assert!(!t.ja.is_empty() && !t.en.is_empty(), "{t:?}");
            assert_eq!(t.ja.contains("{a}"), t.en.contains("{a}"), "{t:?}");
            assert_eq!(t.needs_operands, t.en.contains("{a}"), "{t:?}");
        }
    }

    #[test]
    fn each_step_has_a_catch_all_row() {
        for step in 1..=FINAL_STEP {
            assert!(QUESTIONS
                .iter()
                .any(|t| t.step == step && matches!((t.hint, t.op), (AnyHint, AnyOp)) && !t.needs_operands));
        }
    }

    #[test]
    fn step_two_after_success_asks_for_numbers() {
        let q = build_question(Language::Japanese, &state(2, 0), ADD_PROBLEM, "たす");
        assert_eq!(q, "問題(もんだい)に出(で)てくる数(かず)は何(なん)と何(なに)かな？");
    }

    #[test]
    fn hint_one_names_operands_and_operation() {
        let q = build_question(Language::English, &state(2, 1), ADD_PROBLEM, "");
        assert_eq!(q, "I see 3 and 5. Can you say them?");
        let q = build_question(Language::Japanese, &state(2, 1), ADD_PROBLEM, "");
        assert_eq!(q, "3と5が出(で)てくるよ。言(い)える？");

        let q = build_question(Language::English, &state(1, 1), SUB_PROBLEM, "");
        assert!(q.contains("subtraction"), "{q}");
        let q = build_question(Language::English, &state(3, 1), ADD_PROBLEM, "");
        assert_eq!(q, "Try adding the two numbers. What do you get?");
    }

    #[test]
    fn hint_one_without_operands_uses_catch_all() {
        let q = build_question(Language::English, &state(2, 1), BARE_PROBLEM, "");
        assert_eq!(q, "Which two numbers should we use?");
        let q = build_question(Language::English, &state(1, 1), BARE_PROBLEM, "");
        assert_eq!(q, "Look for words like \"total\" or \"remaining\". Which operation fits?");
    }

    #[test]
    fn highest_hint_is_operation_agnostic() {
        let add = build_question(Language::English, &state(3, 2), ADD_PROBLEM, "");
        let sub = build_question(Language::English, &state(3, 2), SUB_PROBLEM, "");
        assert_eq!(add, sub);
        assert_eq!(build_question(Language::English, &state(3, 7), ADD_PROBLEM, ""), add);
    }

    #[test]
    fn tone_prefix_is_prepended() {
        let s = LearningState { tone: Tone::Energetic, ..state(4, 0) };
        assert_eq!(
            build_question(Language::English, &s, ADD_PROBLEM, ""),
            "Nice! Can you explain why your number makes sense?"
        );
        let s = LearningState { tone: Tone::Supportive, ..state(4, 0) };
        assert!(build_question(Language::Japanese, &s, ADD_PROBLEM, "").starts_with("だいじょうぶ！"));
    }

    #[test]
    fn completed_session_follows_current_message() {
        let done = LearningState { completed: true, ..state(4, 0) };
        assert_eq!(
            build_question(Language::Japanese, &done, ADD_PROBLEM, "はい"),
            "次(つぎ)の問題(もんだい)に進(すす)む？"
        );
        assert_eq!(
            build_question(Language::Japanese, &done, ADD_PROBLEM, "やめとく"),
            "もう一度(いちど)やってみる？"
        );
        assert_eq!(
            build_question(Language::English, &done, ADD_PROBLEM, "Yes please"),
            "Ready for the next problem?"
        );
    }

    #[test]
    fn completed_session_needs_a_clear_yes() {
        let done = LearningState { completed: true, ..state(4, 0) };
        for message in ["no, I need to look again", "not sure", "my eyes hurt", "ううん"] {
            assert_eq!(
                build_question(Language::English, &done, ADD_PROBLEM, message),
                "Want to try this one again?",
                "{message}"
            );
        }
        assert_eq!(
            build_question(Language::English, &done, ADD_PROBLEM, "OK, next one!"),
            "Ready for the next problem?"
        );
    }
}
