//! Résumé intake — normalization of raw records, AI structuring of extracted
//! text, and AI content generation from manual entry.

pub mod handlers;
pub mod normalize;
pub mod prompts;
pub mod structuring;
