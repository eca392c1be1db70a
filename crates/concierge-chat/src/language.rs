//! Working-language detection for inbound text.
//!
//! A cheap heuristic, not real language identification: letters that exist
//! only in the secondary alphabet win outright, then a fixed keyword list is
//! matched as lowercase substrings, otherwise the primary locale applies.

use concierge_core::types::Locale;

/// Letters present in the Kyrgyz Cyrillic alphabet but not in Russian.
const SECONDARY_LETTERS: &[char] = &['ң', 'ө', 'ү'];

/// Common Kyrgyz words and course names as users type them.
const SECONDARY_KEYWORDS: &[&str] = &[
    "ооба",
    "жок",
    "салам",
    "жазылайын",
    "катталуу",
    "тиркеме",
    "кабыл алуу",
    "кантип",
    "эмне",
    "ким",
    "бекенд",
    "фронтенд",
    "графолог",
    "мобилография",
    "орт",
    "программист",
    "баасы",
    "узактыгы",
    "графиги",
    "саламатсызбы",
];

/// Classify `text` into a working locale. Pure and deterministic.
pub fn classify(text: &str) -> Locale {
    let lower = text.to_lowercase();

    if lower.chars().any(|c| SECONDARY_LETTERS.contains(&c)) {
        return Locale::Kyrgyz;
    }

    if SECONDARY_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return Locale::Kyrgyz;
    }

    Locale::PRIMARY
}
