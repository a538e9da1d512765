//! Dotted-path parsing and rendering.
//!
//! A path is a sequence of `.`-delimited segments. Besides plain keys and
//! numeric indices, a segment may carry an embedded ID (`blocks[2]`
//! addresses the element of the `blocks` list whose `id` field is `2`),
//! and the final segment of an update target may be the append operator
//! `$`.

use crate::error::TraverseError;

/// Delimiter between path segments. Example of a valid path: `meta.blocks[2].title`.
pub const PATH_DELIMITER: &str = ".";

/// Operator in an update path that appends a new element to a list.
pub const APPEND_OPERATOR: &str = "$";

/// One dot-delimited unit of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A plain map key or, if all digits, a list index.
    Plain(String),
    /// An embedded-ID segment such as `blocks[2]`. An empty `container`
    /// (bare `[2]`) addresses the current list directly.
    Embedded { container: String, id: i64 },
    /// The `$` marker, valid only as the final segment of an update target.
    Append,
}

impl Segment {
    pub fn plain(name: impl Into<String>) -> Self {
        Segment::Plain(name.into())
    }

    /// Numeric list index, if this is an all-digit plain segment.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Plain(name) => name.parse().ok(),
            _ => None,
        }
    }
}

/// Parse one segment.
///
/// A lone `[` or `]` degrades to a plain segment; content after a closing
/// bracket is a hard error. Bracket content that does not parse as an
/// integer yields ID `0`.
///
/// # Example
///
/// ```
/// use treepath::{parse_segment, Segment};
///
/// assert_eq!(parse_segment("title").unwrap(), Segment::plain("title"));
/// assert_eq!(
///     parse_segment("blocks[2]").unwrap(),
///     Segment::Embedded { container: "blocks".to_string(), id: 2 },
/// );
/// assert!(parse_segment("blocks[2]x").is_err());
/// ```
pub fn parse_segment(text: &str) -> Result<Segment, TraverseError> {
    if text == APPEND_OPERATOR {
        return Ok(Segment::Append);
    }
    let open = match text.find('[') {
        Some(open) => open,
        None => return Ok(Segment::Plain(text.to_string())),
    };
    let close = match text[open..].find(']') {
        Some(offset) => open + offset,
        None => return Ok(Segment::Plain(text.to_string())),
    };
    if close != text.len() - 1 {
        return Err(TraverseError::MalformedSegment {
            segment: text.to_string(),
            trailing: text[close + 1..].to_string(),
        });
    }
    let id = text[open + 1..close].parse::<i64>().unwrap_or(0);
    Ok(Segment::Embedded {
        container: text[..open].to_string(),
        id,
    })
}

/// Parse a dotted path into segments. The empty string denotes the root
/// and yields no segments.
pub fn parse_path(path: &str) -> Result<Vec<Segment>, TraverseError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    path.split(PATH_DELIMITER).map(parse_segment).collect()
}

/// Render one segment back to its path form.
pub fn render_segment(segment: &Segment) -> String {
    match segment {
        Segment::Plain(name) => name.clone(),
        Segment::Embedded { container, id } => format!("{container}[{id}]"),
        Segment::Append => APPEND_OPERATOR.to_string(),
    }
}

/// Inverse of [`parse_path`]: join segments with the delimiter.
pub fn render_path(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(render_segment)
        .collect::<Vec<_>>()
        .join(PATH_DELIMITER)
}
