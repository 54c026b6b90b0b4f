//! The two matching stages of the intent router
//!
//! Lexical matching is deterministic substring search over the taxonomy;
//! semantic matching is the embedding-similarity fallback used only when
//! the lexical stage finds nothing.

pub mod lexical;
pub mod semantic;

pub use lexical::{LexicalMatch, LexicalMatcher};
pub use semantic::{SemanticMatch, SemanticMatcher};
