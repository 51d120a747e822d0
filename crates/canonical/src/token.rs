use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

/// Returns true for characters that belong inside a token.
///
/// Any Unicode letter (`L*`) or number (`N*`) qualifies. Underscore,
/// punctuation, symbols, marks and whitespace all act as separators.
#[inline]
pub fn is_token_char(ch: char) -> bool {
    matches!(
        ch.general_category_group(),
        GeneralCategoryGroup::Letter | GeneralCategoryGroup::Number
    )
}

/// Splits `text` into lowercase tokens.
///
/// The whole text is lowercased first, then maximal runs of token characters
/// are returned left to right. Empty input yields an empty vector.
pub fn tokenize(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let lowered = text.to_lowercase();
    lowered
        .split(|ch: char| !is_token_char(ch))
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}
