/// Portion of a file name before its first `'.'`.
///
/// `"abc.def.pdf"` yields `"abc"`; a name without a dot is its own stem.
pub fn stem(name: &str) -> &str {
    match name.find('.') {
        Some(i) => &name[..i],
        None => name,
    }
}

/// Stem of an optional cell; `None` stays `None`.
pub fn stem_of(name: Option<&str>) -> Option<&str> {
    name.map(stem)
}
