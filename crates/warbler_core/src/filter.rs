//! Spam heuristics for incoming content.

/// Rejects text that is symbol-heavy enough to be spam.
///
/// Allows at most one `#`, two `@`, one `$`, and three of them combined.
///
/// # Examples
///
/// ```
/// use warbler_core::is_valid_post;
///
/// assert!(is_valid_post("hi @a @b #rust"));
/// assert!(!is_valid_post("hi @a @b #rust $5"));
/// ```
pub fn is_valid_post(text: &str) -> bool {
    let hashtags = text.matches('#').count();
    let ats = text.matches('@').count();
    let dollars = text.matches('$').count();
    let total = hashtags + ats + dollars;

    hashtags <= 1 && ats <= 2 && dollars <= 1 && total <= 3
}
