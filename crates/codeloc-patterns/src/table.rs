use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

// Region patterns. Each captures the inner text in group 1 and is matched
// against a single line, so `$` anchors at end of line.
const SQL_COMMENT: &str = r"--(.*?)$";
const SLASH_COMMENT: &str = r"/[/]+(.*?)$";
const HASH_COMMENT: &str = r"[#]+(.*?)$";
const BLOCK_COMMENT: &str = r"/\*(.*?)\*/";
const BLOCK_COMMENT_CONT: &str = r"^[\s]*[*](.*?)$";
const SINGLE_QUOTED: &str = r"'(.*?)'";
const DOUBLE_QUOTED: &str = r#""(.*?)""#;
const TICK_QUOTED: &str = r"`(.*?)`";
const SINGLE_DOCSTRING: &str = r"'''(.*?)'''";
const DOUBLE_DOCSTRING: &str = r#""""(.*?)""""#;

/// Classification categories, in the fixed global priority order: comment
/// patterns are always tried before string-literal patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternCategory {
    Comment,
    StringLiteral,
}

/// Ordered region patterns for one code-like file type.
#[derive(Debug, Clone)]
pub struct CodePatterns {
    pub comments: Vec<Regex>,
    pub strings: Vec<Regex>,
}

impl CodePatterns {
    fn new(comments: &[&str], strings: &[&str]) -> Self {
        CodePatterns {
            comments: comments.iter().map(|p| compile(p)).collect(),
            strings: strings.iter().map(|p| compile(p)).collect(),
        }
    }

    /// Categories with their patterns, in priority order.
    pub fn categories(&self) -> [(PatternCategory, &[Regex]); 2] {
        [
            (PatternCategory::Comment, self.comments.as_slice()),
            (PatternCategory::StringLiteral, self.strings.as_slice()),
        ]
    }
}

/// How a file extension is scanned.
#[derive(Debug, Clone)]
pub enum TableEntry {
    /// Structured region patterns plus the whole-line fallback.
    Code(CodePatterns),
    /// Line-by-line with table-cell splitting and link-title handling.
    Markdown,
    /// Every line classified as a whole.
    PlainText,
}

/// Immutable registry of classification patterns keyed by file extension
/// (without the leading dot). Built once at startup from the built-in
/// entries; extensible with user entries, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct PatternTable {
    entries: HashMap<String, TableEntry>,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}

/// Fallback pattern applied to whatever is left of a line after all
/// structured patterns have claimed their spans.
pub fn whole_line() -> &'static Regex {
    static WHOLE_LINE: OnceLock<Regex> = OnceLock::new();
    WHOLE_LINE.get_or_init(|| compile(r"^(.*)$"))
}

impl PatternTable {
    /// The built-in registry covering the supported source syntaxes.
    pub fn builtin() -> Self {
        let c_like = || {
            CodePatterns::new(
                &[SLASH_COMMENT, BLOCK_COMMENT, BLOCK_COMMENT_CONT],
                &[DOUBLE_QUOTED],
            )
        };
        let script_like = || {
            CodePatterns::new(
                &[SLASH_COMMENT],
                &[SINGLE_QUOTED, DOUBLE_QUOTED, TICK_QUOTED],
            )
        };

        let mut entries: HashMap<String, TableEntry> = HashMap::new();
        let mut code = |ext: &str, patterns: CodePatterns| {
            entries.insert(ext.to_string(), TableEntry::Code(patterns));
        };

        code(
            "sql",
            CodePatterns::new(
                &[SQL_COMMENT, BLOCK_COMMENT, BLOCK_COMMENT_CONT],
                &[SINGLE_QUOTED],
            ),
        );
        code("json", CodePatterns::new(&[], &[DOUBLE_QUOTED]));
        for ext in ["yaml", "yml"] {
            code(
                ext,
                CodePatterns::new(&[HASH_COMMENT], &[SINGLE_QUOTED, DOUBLE_QUOTED]),
            );
        }
        for ext in ["ts", "tsx", "js"] {
            code(ext, script_like());
        }
        code("css", CodePatterns::new(&[], &[]));
        for ext in ["go", "java", "proto"] {
            code(ext, CodePatterns::new(&[SLASH_COMMENT], &[DOUBLE_QUOTED]));
        }
        for ext in ["rs", "h", "hpp", "c", "cpp"] {
            code(ext, c_like());
        }
        code(
            "py",
            CodePatterns::new(
                &[HASH_COMMENT, SINGLE_DOCSTRING, DOUBLE_DOCSTRING],
                &[SINGLE_QUOTED, DOUBLE_QUOTED],
            ),
        );

        entries.insert("md".to_string(), TableEntry::Markdown);
        for ext in ["txt", "text"] {
            entries.insert(ext.to_string(), TableEntry::PlainText);
        }

        PatternTable { entries }
    }

    /// Add or override one extension's entry. Consumes and returns the
    /// table so user overrides compose at startup.
    pub fn with_entry(mut self, extension: &str, entry: TableEntry) -> Self {
        self.entries.insert(extension.to_string(), entry);
        self
    }

    pub fn entry(&self, extension: &str) -> Option<&TableEntry> {
        self.entries.get(extension)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
