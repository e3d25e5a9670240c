//! Locale detection from the script of the narration text
//!
//! Only the opening characters are inspected; headlines and summaries in
//! the feed are single-language.

/// Number of leading characters inspected
pub const DETECTION_WINDOW: usize = 50;

/// Unicode block -> synthesizer locale
const SCRIPT_LOCALES: &[(char, char, &str)] = &[
    ('\u{0900}', '\u{097F}', "hi-IN"), // Devanagari
    ('\u{0980}', '\u{09FF}', "bn-IN"), // Bengali
    ('\u{0B80}', '\u{0BFF}', "ta-IN"), // Tamil
    ('\u{0600}', '\u{06FF}', "ar-SA"), // Arabic
    ('\u{0590}', '\u{05FF}', "he-IL"), // Hebrew
    ('\u{0400}', '\u{04FF}', "ru-RU"), // Cyrillic
    ('\u{0370}', '\u{03FF}', "el-GR"), // Greek
    ('\u{AC00}', '\u{D7AF}', "ko-KR"), // Hangul syllables
    ('\u{3040}', '\u{30FF}', "ja-JP"), // Hiragana + Katakana
    ('\u{4E00}', '\u{9FFF}', "zh-CN"), // CJK unified ideographs
];

const KANA_LOCALE: &str = "ja-JP";
const HAN_LOCALE: &str = "zh-CN";

fn locale_of(c: char) -> Option<&'static str> {
    SCRIPT_LOCALES
        .iter()
        .find(|(start, end, _)| (*start..=*end).contains(&c))
        .map(|(_, _, locale)| *locale)
}

/// Locale for the first non-Latin script found, or `None` for default text
///
/// Japanese mixes kana with Han characters, so any kana in the window wins
/// over an earlier Han match.
pub fn detect_locale(text: &str) -> Option<&'static str> {
    let mut first = None;

    for c in text.chars().take(DETECTION_WINDOW) {
        let Some(locale) = locale_of(c) else {
            continue;
        };
        if locale == KANA_LOCALE {
            return Some(KANA_LOCALE);
        }
        if first.is_none() {
            first = Some(locale);
        }
        if locale != HAN_LOCALE {
            break;
        }
    }

    first
}
