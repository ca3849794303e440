//! Edit Agent — natural-language commands applied one section at a time,
//! with snapshot history for undo.

pub mod editor;
pub mod handlers;
pub mod history;
pub mod prompts;

pub use editor::{suggest_improvements, EditOutcome, EditSession, UndoOutcome};
