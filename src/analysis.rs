//! Text analysis for incoming utterances.
//!
//! The analysis pipeline follows the classic search-engine layout:
//!
//! ```text
//! Raw Text → Char Filters → Tokenizer → Token Filters → Tokens
//! ```
//!
//! [`Normalizer`] wires the default pipeline used by the engine (punctuation
//! stripping, Unicode word segmentation, lowercasing) and never fails.

pub mod analyzer;
pub mod char_filter;
pub mod normalizer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use normalizer::{NormalizedUtterance, Normalizer};
