//! Reaction marker validation.

use unicode_segmentation::UnicodeSegmentation;

use crate::error::CoreError;

/// Check that `rune` is exactly one extended grapheme cluster.
///
/// Multi-codepoint emoji (skin tones, ZWJ sequences, flags) count as one.
pub fn validate_rune(rune: &str) -> Result<(), CoreError> {
    match rune.graphemes(true).count() {
        1 => Ok(()),
        0 => Err(CoreError::Validation("reaction is empty".into())),
        n => Err(CoreError::Validation(format!(
            "reaction must be a single grapheme, got {}",
            n
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_graphemes_are_accepted() {
        for rune in ["a", "👍", "👍🏽", "👩‍👩‍👧", "🇳🇿", "é"] {
            assert!(validate_rune(rune).is_ok(), "{:?}", rune);
        }
    }

    #[test]
    fn multiple_graphemes_are_rejected() {
        let err = validate_rune("👍👍").unwrap_err();
        assert_eq!(
            err,
            CoreError::Validation("reaction must be a single grapheme, got 2".into())
        );
        assert!(validate_rune("ok").is_err());
    }

    #[test]
    fn empty_is_rejected() {
        assert!(matches!(validate_rune(""), Err(CoreError::Validation(_))));
    }
}
