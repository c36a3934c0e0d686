//! Output-language matching.
//!
//! Agents that write user-facing copy answer in the language of the source
//! text. Detection is a plain character count: if more than 30% of the
//! non-whitespace characters fall in the Arabic Unicode blocks, the prompt
//! asks for Arabic; otherwise it asks for English.

use serde::{Deserialize, Serialize};

/// Languages an agent can be instructed to write in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Arabic,
}

/// Arabic, Arabic Supplement, Arabic Extended-A, and Presentation Forms A/B.
const ARABIC_RANGES: [(u32, u32); 5] = [
    (0x0600, 0x06FF),
    (0x0750, 0x077F),
    (0x08A0, 0x08FF),
    (0xFB50, 0xFDFF),
    (0xFE70, 0xFEFF),
];

pub const ENGLISH_INSTRUCTION: &str =
    "LANGUAGE: Write every text field in English, matching the tone of the source text.";

pub const ARABIC_INSTRUCTION: &str = "LANGUAGE: The source text is in Arabic. Write every text field in Arabic, \
matching the dialect and tone of the source text. Hashtags may stay in Latin script when they are established platform tags.";

pub fn is_arabic_char(c: char) -> bool {
    let code = c as u32;
    ARABIC_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&code))
}

/// Share of non-whitespace characters that are Arabic, in `0.0..=1.0`.
///
/// Returns 0.0 for empty or all-whitespace text.
pub fn arabic_ratio(text: &str) -> f64 {
    let (arabic, total) = count(text);
    if total == 0 {
        return 0.0;
    }
    arabic as f64 / total as f64
}

/// Arabic when the Arabic share is strictly above 30%, English otherwise.
pub fn detect_language(text: &str) -> Language {
    let (arabic, total) = count(text);
    // Integer form of arabic / total > 0.30, exact at the boundary.
    if arabic * 10 > total * 3 {
        Language::Arabic
    } else {
        Language::English
    }
}

fn count(text: &str) -> (usize, usize) {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .fold((0, 0), |(arabic, total), c| {
            (arabic + usize::from(is_arabic_char(c)), total + 1)
        })
}

impl Language {
    /// The prompt line that tells the model which language to write in.
    pub fn instruction(self) -> &'static str {
        match self {
            Language::English => ENGLISH_INSTRUCTION,
            Language::Arabic => ARABIC_INSTRUCTION,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_text() {
        assert_eq!(detect_language("Check this out!"), Language::English);
        assert_eq!(arabic_ratio("Check this out!"), 0.0);
    }

    #[test]
    fn test_arabic_text() {
        let text = "تحقق من هذا المنتج الرائع";
        assert_eq!(detect_language(text), Language::Arabic);
        assert_eq!(arabic_ratio(text), 1.0);
    }

    #[test]
    fn test_mostly_latin_with_some_arabic_is_english() {
        // 13 Latin + 4 Arabic non-whitespace characters: ~23.5%
        assert_eq!(detect_language("Check this out! رائع"), Language::English);
    }

    #[test]
    fn test_exactly_thirty_percent_is_english() {
        // 7 Latin + 3 Arabic = 30%, not strictly above
        assert_eq!(detect_language("abcdefg رائ"), Language::English);
        // 7 Latin + 4 Arabic = ~36%
        assert_eq!(detect_language("abcdefg رائع"), Language::Arabic);
    }

    #[test]
    fn test_whitespace_does_not_count() {
        assert_eq!(detect_language("رائع          \n\n\t   abc"), Language::Arabic);
    }

    #[test]
    fn test_empty_text_is_english() {
        assert_eq!(detect_language(""), Language::English);
        assert_eq!(detect_language("   \n"), Language::English);
        assert_eq!(arabic_ratio(""), 0.0);
    }

    #[test]
    fn test_presentation_forms_count_as_arabic() {
        // U+FEFB ARABIC LIGATURE LAM WITH ALEF ISOLATED FORM
        assert!(is_arabic_char('\u{FEFB}'));
        // U+FB50 ARABIC LETTER ALEF WASLA ISOLATED FORM
        assert!(is_arabic_char('\u{FB50}'));
        assert!(!is_arabic_char('\u{FE6F}'));
    }

    #[test]
    fn test_instructions_differ() {
        assert_ne!(Language::Arabic.instruction(), Language::English.instruction());
        assert!(Language::Arabic.instruction().contains("Arabic"));
    }
}
