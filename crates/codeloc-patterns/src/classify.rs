/// ASCII punctuation admitted by the allow-set, shared with the chunker so
/// the two tests can never disagree.
pub(crate) const ASCII_PUNCT: &str = r##",.?!;:'"(){}[]/\@#$%^&*+=<>_`~|-"##;

/// Non-ASCII characters admitted as technical: the micro sign, circled
/// digits, a handful of symbol/emoji glyphs used in diagnostics, control
/// pictures and box-drawing characters used in ASCII diagrams.
pub(crate) const EXTRA_ALLOWED: &[char] = &[
    '\u{00B5}', // µ
    '①', '②', '③', '😊', '®', '©', '❤', '\u{FE0F}', '␍', '␊', '│', '└', '├', '─',
];

/// Whether a single character belongs to the English/technical allow-set.
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_whitespace()
        || ASCII_PUNCT.contains(c)
        || EXTRA_ALLOWED.contains(&c)
}

/// Strict whitelist membership test over the whole string: empty text is
/// technical, and one character outside the allow-set makes the whole text
/// non-English. No partial-credit scoring.
pub fn is_english_or_technical(text: &str) -> bool {
    text.chars().all(is_allowed_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_plain_ascii_are_technical() {
        assert!(is_english_or_technical(""));
        assert!(is_english_or_technical("fn main() { println!(\"hi\"); }"));
        assert!(is_english_or_technical("TODO: fix the 3rd case @ 50%"));
    }

    #[test]
    fn allowed_extras_are_technical() {
        assert!(is_english_or_technical("latency 3µs"));
        assert!(is_english_or_technical("① first ② second"));
        assert!(is_english_or_technical("├── src\n│   └── lib.rs"));
        assert!(is_english_or_technical("❤️ 😊 © ®"));
    }

    #[test]
    fn one_outside_char_flips_the_result() {
        assert!(is_english_or_technical("hello world"));
        assert!(!is_english_or_technical("hello 世界"));
        assert!(!is_english_or_technical("всё"));
        // full-width punctuation is outside the allow-set until normalized
        assert!(!is_english_or_technical("done！"));
    }
}
