/// Clean HTML content using the ammonia library.
///
/// Sheet cells are authored by hand and may contain markup. Safe tags
/// (like <b>, <p>) are kept, while dangerous tags (like <script>, <iframe>)
/// and malicious attributes (like onclick) are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Splits a multi-line cell into trimmed, non-empty, sanitized paragraphs.
pub fn paragraphs(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(clean_html)
        .filter(|p| !p.trim().is_empty())
        .collect()
}
