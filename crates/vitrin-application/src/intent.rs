//! Deterministic confirmation shortcuts.
//!
//! When the draft is ready to optimize, a handful of fixed phrases mean
//! "go" and must not cost an intent-resolver round trip. Matching is
//! case-insensitive on the trimmed input.

/// The canonical confirmation keyword set.
pub const CONFIRMATION_KEYWORDS: [&str; 5] =
    ["yes", "proceed", "run optimization", "ai optimize now", "optimize"];

/// True when `input` is one of the confirmation keywords.
pub fn is_confirmation(input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    CONFIRMATION_KEYWORDS
        .iter()
        .any(|keyword| *keyword == normalized)
}
