//! Script-aware tokenization
//!
//! Progress and overlap metrics compare token counts, so the tokenizer decides
//! what a "word" is for a language. Space-delimited scripts split on
//! whitespace; CJK scripts, which do not delimit words with spaces, are
//! compared character by character.

use icu_locale::{LanguageIdentifier, LocaleExpander};

/// Scripts tokenized at character granularity
const CJK_SCRIPTS: &[&str] = &[
    "Bopo", "Hang", "Hani", "Hans", "Hant", "Hira", "Jpan", "Kana", "Kore", "Yiii",
];

/// Check whether a language is written in a CJK script
///
/// The likely script is resolved through ICU likely-subtag data, so `zh`,
/// `zh-TW`, `ja`, `ko` and `yue` are all CJK while `zh-Latn` is not.
/// Tags that cannot be parsed are treated as non-CJK.
pub fn is_cjk_language(language: &str) -> bool {
    let normalized = language.trim().replace('_', "-");
    let Ok(mut langid) = normalized.parse::<LanguageIdentifier>() else {
        return false;
    };
    LocaleExpander::new_common().maximize(&mut langid);
    langid
        .script
        .map(|script| CJK_SCRIPTS.contains(&script.as_str()))
        .unwrap_or(false)
}

/// Split text into comparable tokens
///
/// Never fails: empty or whitespace-only input yields no tokens.
///
/// ```ignore
/// assert_eq!(tokenize("The cat  sat", "en"), vec!["The", "cat", "sat"]);
/// assert_eq!(tokenize("猫が座った", "ja").len(), 5);
/// ```
pub fn tokenize<'a>(text: &'a str, language: &str) -> Vec<&'a str> {
    if is_cjk_language(language) {
        text.char_indices()
            .filter(|(_, c)| !c.is_whitespace())
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect()
    } else {
        text.split_whitespace().collect()
    }
}

pub fn token_count(text: &str, language: &str) -> usize {
    tokenize(text, language).len()
}
