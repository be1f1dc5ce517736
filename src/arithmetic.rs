//! Operands, operation and ground truth for two-operand addition/subtraction
//! word problems.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::lexicon::any_pack;
use crate::normalize::{fold_digits, normalize};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?[0-9]+(?:\.[0-9]+)?").expect("number pattern"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Sub,
    Unknown,
}

/// Every numeric token, left to right, duplicates kept.
pub fn extract_numbers(text: &str) -> Vec<f64> {
    let text = fold_digits(text);
    NUMBER
        .find_iter(&text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .collect()
}

/// Operation named by the problem text. Addition cues win when both kinds appear.
pub fn detect_operation(text: &str) -> Operation {
    if any_pack(text, |p| p.add_keywords) {
        Operation::Add
    } else if any_pack(text, |p| p.sub_keywords) {
        Operation::Sub
    } else {
        Operation::Unknown
    }
}

/// Operation named by a short learner reply such as "たす", "+" or "minus".
pub fn detect_operation_from_message(message: &str) -> Operation {
    let t = normalize(message);
    if t.contains('+') || any_pack(message, |p| p.add_stems) {
        Operation::Add
    } else if t.contains('-') || any_pack(message, |p| p.sub_stems) {
        Operation::Sub
    } else if any_pack(message, |p| p.all_stems) {
        Operation::Add
    } else if any_pack(message, |p| p.remaining_stems) {
        Operation::Sub
    } else {
        Operation::Unknown
    }
}

/// Sum of all numbers for addition, first minus second for subtraction.
/// `None` when fewer than two numbers are present or the operation is unclear.
pub fn compute_correct_answer(problem_text: &str) -> Option<f64> {
    let numbers = extract_numbers(problem_text);
    if numbers.len() < 2 {
        return None;
    }
    match detect_operation(problem_text) {
        Operation::Add => Some(numbers.iter().sum()),
        Operation::Sub => Some(numbers[0] - numbers[1]),
        Operation::Unknown => None,
    }
}

pub fn extract_first_number_from_message(message: &str) -> Option<f64> {
    extract_numbers(message).into_iter().next()
}
