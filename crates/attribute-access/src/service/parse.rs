//! Attribute list parsing.
//!
//! A request names one or more attributes separated by `;`. There is no
//! escaping, so an attribute name can never contain the separator.

/// Separator between attribute names in a request.
pub const ATTRIBUTE_SEPARATOR: char = ';';

/// Split an attribute request into names.
///
/// Without a separator the whole input is a single name, even when empty.
/// With one, every piece is kept as-is, empty pieces included.
pub fn parse_attributes(attrs: &str) -> Vec<&str> {
    if attrs.contains(ATTRIBUTE_SEPARATOR) {
        attrs.split(ATTRIBUTE_SEPARATOR).collect()
    } else {
        vec![attrs]
    }
}
