//! Language detection for decoded literal content
//!
//! - Language metadata (display names, fence tags, scratch extensions)
//! - Content-based detection backed by tree-sitter grammars
//!
//! Detection is decoration only: the codec never depends on it.

mod detect;
mod languages;

pub use detect::{HeuristicDetector, LanguageDetector, NoDetection};
pub use languages::LanguageId;
