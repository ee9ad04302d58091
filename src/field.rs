use std::fmt;

/// One entry of an extracted metadata field list.
///
/// Contiguous `Text` entries belong to the same sub-record (one maintainer,
/// one USE flag, one upstream block); a `Separator` marks the boundary
/// between two sub-records and renders as a blank line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    /// Boundary between two sub-records.
    Separator,
    /// A text value, possibly empty when the source element had no text.
    Text(String),
}

impl Field {
    /// Build a `Text` field from anything string-like.
    pub fn text(s: impl Into<String>) -> Self {
        Field::Text(s.into())
    }

    /// Returns `true` for [`Field::Separator`].
    pub fn is_separator(&self) -> bool {
        matches!(self, Field::Separator)
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::Text(s.to_string())
    }
}

impl From<String> for Field {
    fn from(s: String) -> Self {
        Field::Text(s)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Field::Separator => Ok(()),
            Field::Text(t) => write!(f, "{t}"),
        }
    }
}

/// Append the group of the `index`-th element to `fields`, preceded by a
/// separator for every element but the first, empty groups included.
pub(crate) fn push_group(fields: &mut Vec<Field>, index: usize, group: Vec<Field>) {
    if index > 0 {
        fields.push(Field::Separator);
    }
    fields.extend(group);
}
