//! Gate between the phrasing service and the learner.
//!
//! A restyled sentence is only shown when it still ends in a question and
//! gives nothing away. Anything else falls back to the deterministic core
//! question.

use crate::lexicon::{any_pack, contains_fragment, Language, PACKS};
use crate::state::Tone;

pub fn is_unsafe_phrasing(text: &str) -> bool {
    let t = text.trim();
    if t.is_empty() {
        return true;
    }
    if !t.ends_with(['?', '？']) {
        return true;
    }
    if t.contains(['=', '＝']) {
        return true;
    }
    PACKS.iter().any(|p| contains_fragment(t, p.answer_words))
}

pub fn is_emotional_message(message: &str) -> bool {
    any_pack(message, |p| p.distress_cues)
}

pub fn empathy_line(language: Language) -> &'static str {
    language.pack().empathy_line
}

/// Trimmed candidate when it passes the gate.
pub fn accept_restyled(candidate: &str) -> Option<String> {
    if is_unsafe_phrasing(candidate) {
        None
    } else {
        Some(candidate.trim().to_string())
    }
}

/// Empathy line plus core question, trailing period dropped and a question
/// mark guaranteed.
pub fn fallback_phrasing(language: Language, empathy: &str, core_question: &str) -> String {
    let joined = format!("{empathy}{core_question}");
    let mut text = joined
        .trim()
        .trim_end_matches(['。', '.'])
        .trim()
        .to_string();
    if !text.ends_with(['?', '？']) {
        text.push(language.pack().question_mark);
    }
    text
}

pub fn build_style_prompt(
    language: Language,
    core_question: &str,
    empathy: &str,
    tone: Tone,
) -> String {
    let tone = tone.as_str();
    match language {
        Language::English => format!(
            "Rewrite the message to be gentle, warm, and child-friendly. Keep the meaning.\n\
             - End with a question mark.\n\
             - Do NOT add equations or final answers.\n\
             - Keep it short (<= 120 chars).\n\
             - If an empathy line is provided, include it at the start.\n\n\
             Empathy: {empathy}\n\
             Core: {core_question}\n\
             Tone: {tone}\n\n\
             Output only the rewritten message."
        ),
        Language::Japanese => format!(
            "次の文を、子(こ)ども向(む)けにやさしく、少(すこ)し自由(じゆう)に言(い)い換(か)えてください。\n\
             - 意味(いみ)は変(か)えない。\n\
             - 文末(ぶんまつ)は必(かなら)ず「？」で終(お)える。\n\
             - 計算式(けいさんしき)や答(こた)えは書(か)かない。\n\
             - 短(みじか)め（120字以内）。\n\
             - 共感文(きょうかんぶん)があれば先頭(せんとう)に入(い)れる。\n\n\
             共感: {empathy}\n\
             核(かく): {core_question}\n\
             トーン: {tone}\n\n\
             言(い)い換(か)え文だけを書(か)いてください。"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_non_questions() {
        assert!(is_unsafe_phrasing(""));
        assert!(is_unsafe_phrasing("   \n"));
        assert!(is_unsafe_phrasing("Let's count together."));
        assert!(!is_unsafe_phrasing("Can you count them?  "));
        assert!(!is_unsafe_phrasing("いくつかな？"));
    }

    #[test]
    fn rejects_equations_and_answer_words() {
        assert!(is_unsafe_phrasing("Is 3 + 5 = 8?"));
        assert!(is_unsafe_phrasing("3＋5＝？"));
        assert!(is_unsafe_phrasing("The answer is 8."));
        assert!(is_unsafe_phrasing("What is the Answer?"));
        assert!(is_unsafe_phrasing("Did you get the same result?"));
        assert!(is_unsafe_phrasing("答えは8かな？"));
        assert!(is_unsafe_phrasing("結果はどうなる？"));
    }

    #[test]
    fn restyled_text_is_trimmed_when_accepted() {
        assert_eq!(
            accept_restyled("  What numbers can you spot?\n").as_deref(),
            Some("What numbers can you spot?")
        );
        assert_eq!(accept_restyled("The answer is 8."), None);
    }

    #[test]
    fn fallback_always_ends_in_a_question() {
        assert_eq!(
            fallback_phrasing(Language::Japanese, "そうなんだね。", "数(かず)を言(い)ってみよう。"),
            "そうなんだね。数(かず)を言(い)ってみよう？"
        );
        assert_eq!(
            fallback_phrasing(Language::English, "", "Say the two numbers."),
            "Say the two numbers?"
        );
        assert_eq!(
            fallback_phrasing(Language::English, "I hear you. ", "Which is it?"),
            "I hear you. Which is it?"
        );
    }

    #[test]
    fn detects_distress() {
        assert!(is_emotional_message("さんすう きらい"));
        assert!(is_emotional_message("もう わからない"));
        assert!(is_emotional_message("This is too hard"));
        assert!(is_emotional_message("I don't get it"));
        assert!(!is_emotional_message("たす"));
        assert!(!is_emotional_message("8"));
    }

    #[test]
    fn style_prompt_carries_core_and_empathy() {
        let prompt = build_style_prompt(
            Language::English,
            "Which two numbers should we use?",
            "I hear you. ",
            Tone::Supportive,
        );
        assert!(prompt.contains("Core: Which two numbers should we use?"));
        assert!(prompt.contains("Empathy: I hear you."));
        assert!(prompt.contains("Tone: supportive"));

        let prompt = build_style_prompt(Language::Japanese, "いくつ？", "", Tone::Neutral);
        assert!(prompt.contains("核(かく): いくつ？"));
    }
}
