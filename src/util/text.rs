use std::borrow::Cow;

/// Character budget for titles and summaries written to the snapshot.
pub const TEXT_BUDGET: usize = 500;

/// Ellipsis appended when text is cut
const ELLIPSIS: &str = "...";
const ELLIPSIS_LEN: usize = 3;

/// Collapses every run of whitespace (and stray control characters) into a
/// single space and trims both ends.
///
/// # Examples
///
/// ```
/// use franchise_feeds::util::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  Grand \n\t opening  "), "Grand opening");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s
        .split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|w| !w.is_empty())
    {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Truncates a string to at most `max_chars` characters.
///
/// When truncation is needed the result ends with "..." and the ellipsis
/// counts toward the budget, so the output never exceeds `max_chars`.
/// Budgets too small to hold a character plus the ellipsis are cut without it.
///
/// # Examples
///
/// ```
/// use franchise_feeds::util::truncate_chars;
///
/// assert_eq!(truncate_chars("Short", 10), "Short");
/// assert_eq!(truncate_chars("Hello World", 8), "Hello...");
/// ```
pub fn truncate_chars(s: &str, max_chars: usize) -> Cow<'_, str> {
    // Byte index of the (max_chars + 1)-th char, if the string is that long
    let Some((overflow_at, _)) = s.char_indices().nth(max_chars) else {
        return Cow::Borrowed(s);
    };

    if max_chars <= ELLIPSIS_LEN {
        return Cow::Owned(s[..overflow_at].to_string());
    }

    let keep = max_chars - ELLIPSIS_LEN;
    let cut = s.char_indices().nth(keep).map(|(i, _)| i).unwrap_or(s.len());
    Cow::Owned(format!("{}{}", s[..cut].trim_end(), ELLIPSIS))
}

/// Removes markup tags and decodes the handful of entities that feed
/// descriptions commonly carry.
///
/// Returns `Cow::Borrowed` when the text contains neither `<` nor `&`.
pub fn strip_tags(s: &str) -> Cow<'_, str> {
    if !s.contains('<') && !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            // A bare "<" (as in "fees < $50K") is text, not markup
            '<' if !in_tag && chars.peek().is_some_and(opens_tag) => in_tag = true,
            // Tags separate words: "<p>one</p><p>two</p>" must not become "onetwo"
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    if !out.contains('&') {
        return Cow::Owned(out);
    }

    const ENTITIES: [(&str, &str); 8] = [
        ("&nbsp;", " "),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&#039;", "'"),
        ("&apos;", "'"),
        // Must come last so "&amp;lt;" decodes to "&lt;" rather than "<"
        ("&amp;", "&"),
    ];
    let decoded = ENTITIES
        .iter()
        .fold(out, |acc, (entity, plain)| acc.replace(entity, plain));
    Cow::Owned(decoded)
}

fn opens_tag(next: &char) -> bool {
    next.is_ascii_alphabetic() || *next == '/' || *next == '!'
}

/// Full cleanup applied to feed text before it reaches the snapshot:
/// markup removal, whitespace collapse, then the [`TEXT_BUDGET`] cap.
pub fn clean_text(s: &str) -> String {
    let collapsed = collapse_whitespace(&strip_tags(s));
    truncate_chars(&collapsed, TEXT_BUDGET).into_owned()
}
