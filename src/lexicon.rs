//! Keyword tables and fixed phrases, one pack per supported language.
//!
//! Detection (operations, reasoning, distress, affirmative replies) checks every
//! pack, since learners mix scripts freely. Latin entries match whole words, so
//! "all" does not fire inside "really"; multi-word entries match across any run
//! of whitespace. Other entries match anywhere, whitespace ignored. Output phrases (tone prefixes,
//! empathy line, question mark) come from the pack of the requested language.
//! Adding a language means adding a pack here and a column to the question
//! table in [`crate::question`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static LATIN_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Latin}+(?:['’]\p{Latin}+)*").expect("latin word pattern"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Japanese,
    English,
}

impl Language {
    /// `"en"` selects English; anything else, including no code at all, is Japanese.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some(c) if c.eq_ignore_ascii_case("en") => Language::English,
            _ => Language::Japanese,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::Japanese => "ja",
            Language::English => "en",
        }
    }

    pub fn pack(self) -> &'static LanguagePack {
        match self {
            Language::Japanese => &JAPANESE,
            Language::English => &ENGLISH,
        }
    }
}

pub struct LanguagePack {
    /// Problem-text cues for addition, matched before `sub_keywords`.
    pub add_keywords: &'static [&'static str],
    pub sub_keywords: &'static [&'static str],
    /// Short reply stems naming an operation directly.
    pub add_stems: &'static [&'static str],
    pub sub_stems: &'static [&'static str],
    /// Weaker reply cues: "all of them" implies addition, "what's left" subtraction.
    pub all_stems: &'static [&'static str],
    pub remaining_stems: &'static [&'static str],
    pub reasoning_cues: &'static [&'static str],
    pub affirmative_cues: &'static [&'static str],
    /// Overrides an affirmative cue in the same reply ("no, not yet").
    pub negative_cues: &'static [&'static str],
    pub distress_cues: &'static [&'static str],
    pub answer_words: &'static [&'static str],
    pub supportive_prefix: &'static str,
    pub energetic_prefix: &'static str,
    pub empathy_line: &'static str,
    pub question_mark: char,
}

pub static JAPANESE: LanguagePack = LanguagePack {
    add_keywords: &[
        "あわせて", "合わせて", "たす", "足し", "足す", "合計", "ぜんぶ", "全部",
    ],
    sub_keywords: &["のこり", "残り", "ひく", "引き", "引く", "差"],
    add_stems: &["足し", "足す", "たす"],
    sub_stems: &["引き", "引く", "ひく"],
    all_stems: &["ぜんぶ", "全部"],
    remaining_stems: &["のこり", "残り"],
    reasoning_cues: &["だから", "ので", "たす", "足し", "足す", "引き", "引く", "ひく"],
    affirmative_cues: &["はい", "うん", "次", "すす", "進"],
    negative_cues: &["ううん", "いいえ", "やめ", "まだ"],
    distress_cues: &[
        "きらい", "いや", "むずかし", "わから", "できない", "つかれ", "こわい",
        "おもしろくない", "やだ",
    ],
    answer_words: &["答え", "解答", "結果"],
    supportive_prefix: "だいじょうぶ！",
    energetic_prefix: "いいね！",
    empathy_line: "そうなんだね。",
    question_mark: '？',
};

pub static ENGLISH: LanguagePack = LanguagePack {
    add_keywords: &[
        "total", "sum", "add", "plus", "altogether", "in all", "together", "combined",
    ],
    sub_keywords: &[
        "remaining", "remain", "left", "difference", "minus", "subtract", "take away",
    ],
    add_stems: &["add", "adding", "addition", "plus", "sum"],
    sub_stems: &["subtract", "subtracting", "subtraction", "minus", "take away"],
    all_stems: &["total", "together", "altogether", "in all"],
    remaining_stems: &["left", "remain", "remains", "remaining", "difference"],
    reasoning_cues: &[
        "because", "since", "therefore", "add", "plus", "subtract", "minus", "take away",
    ],
    affirmative_cues: &["yes", "yeah", "yep", "sure", "ok", "okay", "next"],
    negative_cues: &["no", "not", "nope", "don't", "dont", "stop"],
    distress_cues: &[
        "hate", "too hard", "difficult", "don't get", "dont get", "don't know", "dont know",
        "can't", "cannot", "tired", "scared", "boring",
    ],
    answer_words: &["answer", "solution", "result"],
    supportive_prefix: "You're doing great. ",
    energetic_prefix: "Nice! ",
    empathy_line: "I hear you. ",
    question_mark: '?',
};

pub static PACKS: [&LanguagePack; 2] = [&JAPANESE, &ENGLISH];

/// Case-insensitive keyword test: whole words for Latin entries, substrings
/// with whitespace removed for everything else.
pub fn contains_any(text: &str, words: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    let tokens: Vec<String> = LATIN_WORD
        .find_iter(&lowered)
        .map(|m| m.as_str().replace('’', "'"))
        .collect();
    let squashed = compact(&lowered);
    words.iter().any(|w| {
        if w.is_ascii() {
            has_phrase(&tokens, w)
        } else {
            squashed.contains(w)
        }
    })
}

/// Substring test over lowercased text with whitespace removed, for any
/// script. Catches "answers" and "answer's" where [`contains_any`] would not.
pub fn contains_fragment(text: &str, words: &[&str]) -> bool {
    let squashed = compact(&text.to_lowercase());
    words.iter().any(|w| squashed.contains(&compact(w)))
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn has_phrase(tokens: &[String], phrase: &str) -> bool {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    !words.is_empty()
        && tokens
            .windows(words.len())
            .any(|window| window.iter().zip(&words).all(|(t, w)| t.as_str() == *w))
}

/// True when any pack's table, picked by `table`, matches `text`.
pub fn any_pack(text: &str, table: impl Fn(&LanguagePack) -> &'static [&'static str]) -> bool {
    PACKS.iter().any(|pack| contains_any(text, table(pack)))
}
