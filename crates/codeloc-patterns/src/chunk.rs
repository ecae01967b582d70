use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::classify::{ASCII_PUNCT, EXTRA_ALLOWED};

/// Character-class body matching the allow-set, built from the same
/// constants the classifier uses.
fn allow_class_body() -> String {
    let mut class = String::from(r"A-Za-z0-9\s");
    for c in ASCII_PUNCT.chars() {
        match c {
            '\\' | '[' | ']' | '^' | '-' => {
                class.push('\\');
                class.push(c);
            }
            _ => class.push(c),
        }
    }
    for c in EXTRA_ALLOWED {
        class.push(*c);
    }
    class
}

fn chunk_regex() -> &'static Regex {
    static CHUNK: OnceLock<Regex> = OnceLock::new();
    CHUNK.get_or_init(|| {
        // A minimal run of disallowed characters, widened through adjacent
        // word characters until both ends sit on a word boundary.
        let pattern = format!(r"\b[\w]*?[^{0}]+[\w]*?\b", allow_class_body());
        Regex::new(&pattern).expect("chunk pattern must compile")
    })
}

/// Split `text` on implicit word boundaries and return the minimal
/// contiguous substrings that fail the allow-set test, each expanded to
/// include immediately adjacent word characters. Returned as a set:
/// repeated fragments on one line are translated once.
pub fn find_non_english_chunks(text: &str) -> BTreeSet<String> {
    chunk_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(text: &str) -> Vec<String> {
        find_non_english_chunks(text).into_iter().collect()
    }

    #[test]
    fn pure_english_yields_no_chunks() {
        assert!(chunks("just an ordinary comment").is_empty());
        assert!(chunks("x = y + 1; // done").is_empty());
    }

    #[test]
    fn isolates_foreign_runs_from_surrounding_code() {
        assert_eq!(chunks("let total = 0; // 总数"), vec!["总数"]);
        assert_eq!(chunks("前缀 middle 后缀"), vec!["前缀", "后缀"]);
    }

    #[test]
    fn expands_through_adjacent_word_characters() {
        // identifier glued to CJK text is carried into the chunk
        assert_eq!(chunks("count变量 is here"), vec!["count变量"]);
    }

    #[test]
    fn deduplicates_repeated_fragments() {
        assert_eq!(chunks("错误 before 错误 after"), vec!["错误"]);
    }

    #[test]
    fn deterministic_across_runs() {
        let input = "alpha 一二三 beta 四五六 gamma";
        assert_eq!(find_non_english_chunks(input), find_non_english_chunks(input));
    }
}
