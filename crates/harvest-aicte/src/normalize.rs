//! Display-form normalization of free text scraped from the source.
//!
//! The source mixes all-caps, sentence case and stray punctuation spacing.
//! [`normalize_text`] rebuilds title casing and comma spacing:
//!
//! `"  DR. B.R. AMBEDKAR INSTITUTE OF   TECHNOLOGY , SOMEWHERE,  "`
//! → `"Dr. B.R. Ambedkar Institute of Technology, Somewhere"`
//!
//! Every step is total; nothing here can fail.

/// Words kept lower-case inside a title (never as the first word).
/// Single letters are excluded so initials survive.
const MINOR_WORDS: &[&str] = &[
    "an", "and", "as", "but", "by", "for", "in", "of", "on", "or", "the", "to", "via", "vs",
];

/// `None` passes through; otherwise see [`normalize_text`].
pub fn normalize(raw: Option<&str>) -> Option<String> {
    raw.map(normalize_text)
}

/// Normalize one string. The step order matters.
pub fn normalize_text(raw: &str) -> String {
    let text = if is_all_caps(raw) {
        raw.to_lowercase()
    } else {
        raw.to_string()
    };
    let text = collapse_line_breaks(&text);
    let text = tighten_commas(&text);
    let text = space_after_commas(&text);
    let text = capitalize_tokens(&text);
    let text = titlecase(&text);
    let text = capitalize_after_periods(&text);
    strip_trailing_comma(text)
}

/// All-caps text carries no casing information worth keeping.
fn is_all_caps(s: &str) -> bool {
    s.chars().any(char::is_uppercase) && !s.chars().any(char::is_lowercase)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Each run of `\r`/`\n` becomes one space.
fn collapse_line_breaks(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_break = false;
    for c in s.chars() {
        if c == '\n' || c == '\r' {
            if !in_break {
                out.push(' ');
            }
            in_break = true;
        } else {
            out.push(c);
            in_break = false;
        }
    }
    out
}

/// `"a , b"` → `"a, b"`
fn tighten_commas(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == ',' {
            let kept = out.trim_end().len();
            out.truncate(kept);
        }
        out.push(c);
    }
    out
}

/// `"a,b"` → `"a, b"`, `"a,(b)"` → `"a, (b)"`
fn space_after_commas(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == ',' && chars.peek().is_some_and(|&n| is_word_char(n) || n == '(') {
            out.push(' ');
        }
    }
    out
}

/// Upper-case the first character of `word`, leave the rest.
fn upcase_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Upper-case the first character of every space-delimited token.
fn capitalize_tokens(s: &str) -> String {
    s.split(' ').map(upcase_first).collect::<Vec<_>>().join(" ")
}

/// Upper-case every letter that starts a word: `(autonomous)` → `(Autonomous)`,
/// `civil/mechanical` → `Civil/Mechanical`. An apostrophe does not start a
/// word, so `joseph's` keeps its `s`.
fn capitalize_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev: Option<char> = None;
    for c in word.chars() {
        let at_boundary = match prev {
            None => true,
            Some(p) => !is_word_char(p) && p != '\'' && p != '\u{2019}',
        };
        if at_boundary && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

fn is_minor(word: &str) -> bool {
    let bare = word.trim_end_matches(|c: char| !c.is_alphanumeric());
    MINOR_WORDS.contains(&bare.to_lowercase().as_str())
}

/// Title-case words, keep minor words lower-case, collapse whitespace, trim.
fn titlecase(s: &str) -> String {
    s.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            if i > 0 && is_minor(word) {
                word.to_lowercase()
            } else {
                capitalize_word(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"B.r."` → `"B.R."`
fn capitalize_after_periods(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut after_period = false;
    for c in s.chars() {
        if after_period {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        after_period = c == '.';
    }
    out
}

fn strip_trailing_comma(mut s: String) -> String {
    if s.ends_with(',') {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "  DR. B.R. AMBEDKAR INSTITUTE OF   TECHNOLOGY , SOMEWHERE,  ",
        "GOVT. POLYTECHNIC,MADURAI",
        "SRI VENKATESWARA COLLEGE OF ENGINEERING (AUTONOMOUS)",
        "St. Joseph's College of Engineering",
        "NEAR BUS STAND\r\nPANAJI",
        "plot no. 5,(opp. market) pune",
        "IIT",
        "A.B",
        "X ,(Y)",
        "PRIVATE-SELF FINANCING",
        "CIVIL/MECHANICAL ENGG.",
        "",
        "   ",
        ",",
    ];

    #[test]
    fn reference_example() {
        assert_eq!(
            normalize_text("  DR. B.R. AMBEDKAR INSTITUTE OF   TECHNOLOGY , SOMEWHERE,  "),
            "Dr. B.R. Ambedkar Institute of Technology, Somewhere"
        );
    }

    #[test]
    fn none_passes_through() {
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some("GOA")), Some("Goa".to_string()));
    }

    #[test]
    fn idempotent() {
        for s in SAMPLES {
            let once = normalize_text(s);
            assert_eq!(normalize_text(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn comma_spacing() {
        assert_eq!(normalize_text("GOVT. POLYTECHNIC,MADURAI"), "Govt. Polytechnic, Madurai");
        assert_eq!(normalize_text("X ,(Y)"), "X, (Y)");
        assert_eq!(normalize_text("a ,  b"), "A, B");
    }

    #[test]
    fn parenthesized_words_capitalized() {
        assert_eq!(
            normalize_text("SRI VENKATESWARA COLLEGE OF ENGINEERING (AUTONOMOUS)"),
            "Sri Venkateswara College of Engineering (Autonomous)"
        );
    }

    #[test]
    fn hyphen_and_slash_start_words() {
        assert_eq!(normalize_text("PRIVATE-SELF FINANCING"), "Private-Self Financing");
        assert_eq!(normalize_text("CIVIL/MECHANICAL"), "Civil/Mechanical");
        assert_eq!(normalize_text("ST. JOSEPH'S COLLEGE"), "St. Joseph's College");
        assert_eq!(normalize_text("5TH CROSS ROAD"), "5th Cross Road");
    }

    #[test]
    fn mixed_case_kept() {
        assert_eq!(
            normalize_text("McGill Institute of Technology"),
            "McGill Institute of Technology"
        );
    }

    #[test]
    fn minor_word_first_is_capitalized() {
        assert_eq!(normalize_text("THE OXFORD COLLEGE"), "The Oxford College");
    }

    #[test]
    fn single_letter_initials_survive() {
        assert_eq!(normalize_text("DR A KUMAR COLLEGE"), "Dr A Kumar College");
    }

    #[test]
    fn line_breaks_become_spaces() {
        assert_eq!(normalize_text("NEAR BUS STAND\r\nPANAJI"), "Near Bus Stand Panaji");
        assert_eq!(normalize_text("one\n\ntwo"), "One Two");
    }

    #[test]
    fn initials_restored_after_periods() {
        assert_eq!(normalize_text("A.P.J. ABDUL KALAM"), "A.P.J. Abdul Kalam");
    }

    #[test]
    fn single_trailing_comma_stripped() {
        assert_eq!(normalize_text("SOMEWHERE,"), "Somewhere");
        assert_eq!(normalize_text("SOMEWHERE , "), "Somewhere");
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("   "), "");
        assert_eq!(normalize_text(","), "");
        assert_eq!(normalize_text("123"), "123");
    }
}
