//! Mood-tag decoration shown alongside the active review slide.
//!
//! Stateless by design: every transition draws uniformly from the fixed tag
//! set with no anti-repeat memory.

use rand::Rng;

/// Fixed set of positive mood tags for the reviews gallery overlay.
pub const MOOD_TAGS: [&str; 12] = [
    "😊", "🌟", "👍", "💫", "✨", "🎉", "❤️", "😍", "🤩", "👏", "🎊", "💖",
];

/// Uniform pick from the tag set, independent across calls.
pub fn random_mood() -> &'static str {
    pick(&mut rand::rng())
}

pub(crate) fn pick<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    MOOD_TAGS[rng.random_range(0..MOOD_TAGS.len())]
}
