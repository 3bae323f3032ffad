//! Title and author cleanup applied before metadata is used in paths or rows.

/// Characters deleted from titles before they are used in file names.
pub const FORBIDDEN_TITLE_CHARS: [char; 9] = ['?', '!', ',', ':', ';', '&', '/', '.', '\t'];

/// Delete every forbidden character from a raw title. Deletion, not
/// substitution: `"Intro: AI"` becomes `"Intro AI"`. Idempotent.
pub fn normalize_title(raw: &str) -> String {
    raw.chars()
        .filter(|c| !FORBIDDEN_TITLE_CHARS.contains(c))
        .collect()
}

/// Normalize a whole collection of titles, preserving order and length.
/// Distinct titles may collide after deletion; the download step
/// disambiguates colliding paths, so collisions are allowed here.
pub fn normalize_titles(raw: Vec<String>) -> Vec<String> {
    raw.into_iter().map(|t| normalize_title(&t)).collect()
}

/// Strip whitespace artifacts from an author name: non-breaking spaces
/// become plain spaces, surrounding whitespace is trimmed.
pub fn clean_author(raw: &str) -> String {
    raw.replace('\u{a0}', " ").trim().to_string()
}
