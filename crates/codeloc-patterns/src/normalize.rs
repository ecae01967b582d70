/// Substitution table for typographic and full-width punctuation variants.
/// Keys never appear in any value, which is what makes `normalize`
/// idempotent and order-independent.
const REPLACEMENTS: &[(&str, &str)] = &[
    ("，", ","),        // full-width comma
    ("：", ":"),        // full-width colon
    ("；", ";"),        // full-width semicolon
    ("。", "."),        // ideographic full stop
    ("！", "!"),        // full-width exclamation mark
    ("？", "?"),        // full-width question mark
    ("（", "("),        // full-width left parenthesis
    ("）", ")"),        // full-width right parenthesis
    ("【", "["),        // left black lenticular bracket
    ("】", "]"),        // right black lenticular bracket
    ("《", "<"),        // left double angle bracket
    ("》", ">"),        // right double angle bracket
    ("“", "\""),       // left double quotation mark
    ("”", "\""),       // right double quotation mark
    ("‘", "'"),        // left single quotation mark
    ("’", "'"),        // right single quotation mark
    ("－", "-"),        // full-width hyphen-minus
    ("—", "-"),        // em dash
    ("–", "-"),        // en dash
    ("、", ","),        // ideographic comma
    ("\u{200B}", ""),   // zero-width space
    ("\u{03BC}", "\u{00B5}"), // Greek mu -> micro sign
    ("\u{00A0}", " "),  // no-break space
];

/// Map typographic punctuation variants to their ASCII equivalents.
/// Pure and idempotent; applied before classification and before chunk
/// extraction so that lines differing from their intended ASCII form only
/// in punctuation are recognized as already English.
pub fn normalize(text: &str) -> String {
    let mut out = text.to_string();
    for (from, to) in REPLACEMENTS {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }
    out
}
