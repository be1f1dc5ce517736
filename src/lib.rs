pub mod arithmetic;
pub mod classifier;
pub mod config;
pub mod error;
pub mod gemini;
pub mod lexicon;
pub mod normalize;
pub mod question;
pub mod safety;
pub mod server;
pub mod state;
pub mod tutor;
pub mod vision;
pub mod worksheet;

pub use lexicon::Language;
pub use state::{LearningState, MistakeType, Tone};
pub use tutor::{Phraser, TurnReply, Tutor};

/// Worksheet text → `{problems: [{number, question}]}`. `{text}` is replaced
/// with the raw OCR text.
pub const STRUCTURE_PROMPT: &str = concat!(
    "以下の算数の問題テキストをJSON形式に整理してください:\n\n",
    "{text}\n\n",
    "形式: ",
    stringify!({
        "problems": [
            {
                "number": "problem number as printed on the sheet",
                "question": "the full question text, unchanged"
            }
        ]
    }),
    "\n\nJSONだけを出力してください。"
);
