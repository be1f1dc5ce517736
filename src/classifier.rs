//! Grades a learner reply against the step the session is on.

use crate::arithmetic::{
    compute_correct_answer, detect_operation_from_message, extract_first_number_from_message,
    extract_numbers, Operation,
};
use crate::lexicon::any_pack;
use crate::normalize::normalize;
use crate::state::{Evaluation, LearningState, MistakeType};

const TOLERANCE: f64 = 1e-9;

pub fn evaluate_step(state: &LearningState, problem_text: &str, message: &str) -> Evaluation {
    let msg = normalize(message);
    match state.step {
        1 => names_operation(message),
        2 => names_operands(problem_text, &msg),
        3 => grades_computation(problem_text, &msg),
        4 => explains_reasoning(message),
        _ => Evaluation::Failure(MistakeType::Unknown),
    }
}

fn names_operation(message: &str) -> Evaluation {
    if detect_operation_from_message(message) != Operation::Unknown {
        Evaluation::Success
    } else {
        Evaluation::Failure(MistakeType::Misunderstanding)
    }
}

fn names_operands(problem_text: &str, msg: &str) -> Evaluation {
    let numbers = extract_numbers(problem_text);
    if let [a, b, ..] = numbers.as_slice() {
        if msg.contains(&a.to_string()) && msg.contains(&b.to_string()) {
            return Evaluation::Success;
        }
    }
    Evaluation::Failure(MistakeType::Misunderstanding)
}

fn grades_computation(problem_text: &str, msg: &str) -> Evaluation {
    let Some(answer) = extract_first_number_from_message(msg) else {
        return Evaluation::Failure(MistakeType::Misunderstanding);
    };
    match compute_correct_answer(problem_text) {
        Some(correct) if (answer - correct).abs() < TOLERANCE => Evaluation::Success,
        Some(_) => Evaluation::Failure(MistakeType::CalculationError),
        // Nothing to grade against: any number passes.
        None => Evaluation::Success,
    }
}

fn explains_reasoning(message: &str) -> Evaluation {
    if any_pack(message, |p| p.reasoning_cues) {
        Evaluation::Success
    } else {
        Evaluation::Failure(MistakeType::Misunderstanding)
    }
}
