//! Canonical forms for learner messages and problem text.

fn fold_char(ch: char) -> char {
    match ch {
        '０'..='９' => char::from_u32(ch as u32 - 0xFEE0).unwrap_or(ch),
        '＋' => '+',
        '－' | '−' => '-',
        _ => ch,
    }
}

/// Folds full-width digits and sign variants to ASCII and drops every
/// whitespace character. Idempotent.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|ch| !ch.is_whitespace())
        .map(fold_char)
        .collect()
}

/// Full-width digits to ASCII, nothing else. Problem text keeps its spacing
/// so neighbouring numbers are not glued together.
pub fn fold_digits(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '０'..='９' => fold_char(ch),
            _ => ch,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_full_width_digits_and_signs() {
        assert_eq!(normalize("３＋５"), "3+5");
        assert_eq!(normalize("８－２"), "8-2");
        assert_eq!(normalize("８−２"), "8-2");
    }

    #[test]
    fn strips_all_whitespace() {
        let out = normalize(" 3 と\t5\n　です ");
        assert_eq!(out, "3と5です");
        assert!(!out.chars().any(char::is_whitespace));
    }

    #[test]
    fn is_idempotent() {
        for input in ["", "  ", "３ と ５", "a + b − c", "あわせて 3 つ", "1.5 ＋ ２"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn fold_digits_keeps_spacing_and_signs() {
        assert_eq!(fold_digits("１０ － ３"), "10 － 3");
    }
}
