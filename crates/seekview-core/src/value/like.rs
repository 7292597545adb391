/// Match `text` against a SQL `LIKE` pattern (`%` any run, `_` one char).
///
/// No escape character is recognized.
pub(crate) fn like_matches(text: &str, pattern: &str, case_insensitive: bool) -> bool {
    let (text, pattern): (Vec<char>, Vec<char>) = if case_insensitive {
        (
            text.chars().flat_map(char::to_lowercase).collect(),
            pattern.chars().flat_map(char::to_lowercase).collect(),
        )
    } else {
        (text.chars().collect(), pattern.chars().collect())
    };

    // Iterative wildcard match with single backtrack point on the last `%`.
    let (mut t, mut p) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut star_t = 0usize;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            star = Some(p);
            star_t = t;
            p += 1;
        } else if let Some(star_p) = star {
            p = star_p + 1;
            star_t += 1;
            t = star_t;
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '%' {
        p += 1;
    }

    p == pattern.len()
}
