use ammonia;

/// Clean user-submitted review content using the ammonia library.
///
/// Whitelist-based: safe inline tags (like <b>, <p>) survive, while dangerous
/// tags (like <script>, <iframe>) and attributes (like onclick) are stripped.
/// The result is trimmed so that markup-only input collapses to an empty string.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input).trim().to_string()
}
