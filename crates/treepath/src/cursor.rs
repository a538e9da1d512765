//! Tree traversal with embedded-ID resolution.
//!
//! [`resolve`] and [`resolve_mut`] walk a segment sequence against a tree
//! and return a borrow of the node reached. Traversal never creates
//! missing nodes; that is `create_path`'s job.

use serde_json::Value;

use crate::error::TraverseError;
use crate::ids::ID_KEY;
use crate::path::{render_path, render_segment, Segment};

/// Whether `value` is a map or a list.
pub(crate) fn is_container(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

/// Whether `value` behaves associatively: a map with at least one
/// non-numeric key. List-style inserts are disallowed on such containers.
pub fn is_associative(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.keys().any(|key| key.parse::<usize>().is_err()),
        _ => false,
    }
}

/// Position of the first element of `elements` whose `id` field equals `id`.
///
/// Elements without an `id` field are skipped, they never match.
pub fn find_id_position(elements: &[Value], id: i64) -> Option<usize> {
    elements
        .iter()
        .position(|element| element.get(ID_KEY).and_then(Value::as_i64) == Some(id))
}

fn available_keys(value: &Value) -> String {
    match value {
        Value::Object(map) => map.keys().cloned().collect::<Vec<_>>().join(", "),
        Value::Array(items) => (0..items.len())
            .map(|index| index.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

fn not_accessible(segment: &Segment, segments: &[Segment], available: String) -> TraverseError {
    TraverseError::PathNotFound {
        reason: format!(
            "node is not accessible: \"{}\" (full path: \"{}\", available in current node: {})",
            render_segment(segment),
            render_path(segments),
            available,
        ),
    }
}

fn id_not_found(container: &str, id: i64, segments: &[Segment]) -> TraverseError {
    TraverseError::PathNotFound {
        reason: format!(
            "could not find ID {id} in \"{container}\" (full path: \"{}\")",
            render_path(segments),
        ),
    }
}

fn not_a_list(container: &str) -> TraverseError {
    TraverseError::NotAContainer {
        reason: format!("wanted to find an ID in a list but node \"{container}\" is not a list"),
    }
}

/// Walk `tree` along `segments` and return the node reached.
///
/// With `require_container` set, every step (and the final node) must be a
/// map or list; anything else fails with `NotAContainer`. A null value
/// reached before the last segment fails with `PathNotFound`. An empty
/// segment sequence resolves to the root.
pub fn resolve<'a>(
    tree: &'a Value,
    segments: &[Segment],
    require_container: bool,
) -> Result<&'a Value, TraverseError> {
    if segments.is_empty() {
        if require_container && !is_container(tree) {
            return Err(TraverseError::NotAContainer {
                reason: "the tree root is not a map or list".to_string(),
            });
        }
        return Ok(tree);
    }

    let mut current = tree;
    let last = segments.len() - 1;

    for (step, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Embedded { container, id } => {
                let elements = if container.is_empty() {
                    current
                } else {
                    match current.get(container.as_str()) {
                        Some(value) => value,
                        None => return Err(not_a_list(container)),
                    }
                };
                let Value::Array(items) = elements else {
                    return Err(not_a_list(container));
                };
                let position = find_id_position(items, *id)
                    .ok_or_else(|| id_not_found(container, *id, segments))?;
                current = &items[position];
            }
            Segment::Plain(name) => {
                current = match current {
                    Value::Object(map) => map
                        .get(name)
                        .ok_or_else(|| not_accessible(segment, segments, available_keys(current)))?,
                    Value::Array(items) => name
                        .parse::<usize>()
                        .ok()
                        .and_then(|index| items.get(index))
                        .ok_or_else(|| not_accessible(segment, segments, available_keys(current)))?,
                    _ => return Err(not_accessible(segment, segments, String::new())),
                };
            }
            Segment::Append => {
                return Err(TraverseError::PathNotFound {
                    reason: format!(
                        "the append operator is only valid as the final segment of an update target (full path: \"{}\")",
                        render_path(segments),
                    ),
                });
            }
        }

        if current.is_null() && step < last {
            return Err(TraverseError::PathNotFound {
                reason: format!(
                    "null encountered before path end (last accessed node: \"{}\")",
                    render_segment(segment),
                ),
            });
        }
        if require_container && !is_container(current) {
            return Err(TraverseError::NotAContainer {
                reason: format!(
                    "traversed into a non-container value after accessing node \"{}\"",
                    render_segment(segment),
                ),
            });
        }
    }

    Ok(current)
}

/// Mutable counterpart of [`resolve`]; the returned borrow aliases the
/// node inside the caller's tree, so all mutation happens in place.
pub fn resolve_mut<'a>(
    tree: &'a mut Value,
    segments: &[Segment],
    require_container: bool,
) -> Result<&'a mut Value, TraverseError> {
    if segments.is_empty() {
        if require_container && !is_container(tree) {
            return Err(TraverseError::NotAContainer {
                reason: "the tree root is not a map or list".to_string(),
            });
        }
        return Ok(tree);
    }

    let mut current = tree;
    let last = segments.len() - 1;

    for (step, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Embedded { container, id } => {
                let elements = if container.is_empty() {
                    current
                } else {
                    let is_list = matches!(
                        current.get(container.as_str()),
                        Some(Value::Array(_))
                    );
                    match current {
                        Value::Object(map) if is_list => &mut map[container.as_str()],
                        _ => return Err(not_a_list(container)),
                    }
                };
                let Value::Array(items) = elements else {
                    return Err(not_a_list(container));
                };
                let position = find_id_position(items, *id)
                    .ok_or_else(|| id_not_found(container, *id, segments))?;
                current = &mut items[position];
            }
            Segment::Plain(name) => {
                current = match current {
                    Value::Object(map) => {
                        if !map.contains_key(name) {
                            let available = map.keys().cloned().collect::<Vec<_>>().join(", ");
                            return Err(not_accessible(segment, segments, available));
                        }
                        &mut map[name.as_str()]
                    }
                    Value::Array(items) => {
                        let index = name.parse::<usize>().ok().filter(|index| *index < items.len());
                        match index {
                            Some(index) => &mut items[index],
                            None => {
                                let available = (0..items.len())
                                    .map(|index| index.to_string())
                                    .collect::<Vec<_>>()
                                    .join(", ");
                                return Err(not_accessible(segment, segments, available));
                            }
                        }
                    }
                    _ => return Err(not_accessible(segment, segments, String::new())),
                };
            }
            Segment::Append => {
                return Err(TraverseError::PathNotFound {
                    reason: format!(
                        "the append operator is only valid as the final segment of an update target (full path: \"{}\")",
                        render_path(segments),
                    ),
                });
            }
        }

        if current.is_null() && step < last {
            return Err(TraverseError::PathNotFound {
                reason: format!(
                    "null encountered before path end (last accessed node: \"{}\")",
                    render_segment(segment),
                ),
            });
        }
        if require_container && !is_container(current) {
            return Err(TraverseError::NotAContainer {
                reason: format!(
                    "traversed into a non-container value after accessing node \"{}\"",
                    render_segment(segment),
                ),
            });
        }
    }

    Ok(current)
}
