//! The public path-engine operations.
//!
//! Every operation parses its path, locates the relevant node with the
//! cursor and mutates the caller's tree in place. Mutating operations
//! return an [`Update`] carrying the canonical path of the change.

use std::cmp::Ordering;

use serde_json::{json, Map, Value};

use crate::cursor::{find_id_position, is_associative, is_container, resolve, resolve_mut};
use crate::error::TraverseError;
use crate::ids::{self, IdStrategy, ID_KEY};
use crate::path::{parse_path, render_path, render_segment, Segment, PATH_DELIMITER};

/// Field matched by [`find_types_in_data`].
const TYPE_KEY: &str = "type";

/// Outcome of a mutating operation.
///
/// The tree itself is updated in place through the `&mut Value` handed to
/// the operation. `path` is the canonical path of the change: when the
/// inserted value is a map carrying an `id` field, the final segment is
/// rendered as `container[id]`, otherwise as the literal index or key.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub path: String,
    pub insert: Value,
}

/// A map whose `type` field matched a [`find_types_in_data`] query.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMatch {
    /// The `id` field of the matching map, null when it has none.
    pub id: Value,
    /// Dotted path from the search root to the matching map.
    pub path: String,
}

/// Resolve `path` and return the node it addresses. Pure read.
///
/// With `require_container` set, a path ending in (or passing through) a
/// scalar fails with `NotAContainer`.
pub fn traverse<'a>(
    tree: &'a Value,
    path: &str,
    require_container: bool,
) -> Result<&'a Value, TraverseError> {
    let segments = parse_path(path)?;
    resolve(tree, &segments, require_container)
}

/// Mutable counterpart of [`traverse`].
pub fn traverse_mut<'a>(
    tree: &'a mut Value,
    path: &str,
    require_container: bool,
) -> Result<&'a mut Value, TraverseError> {
    let segments = parse_path(path)?;
    resolve_mut(tree, &segments, require_container)
}

/// Whether any value, container or scalar, exists at `path`.
pub fn has_path(tree: &Value, path: &str) -> bool {
    traverse(tree, path, false).is_ok()
}

/// Write target of an update, after the tail segment has been normalized.
enum Target {
    Key(String),
    Index(usize),
    Push,
}

/// Write `insert` at `path` with default options: auto-IDs on, stored
/// strategy. See [`update_with`].
pub fn update(tree: &mut Value, path: &str, insert: Value) -> Result<Update, TraverseError> {
    update_with(tree, path, insert, true, IdStrategy::Stored)
}

/// Write `insert` at `path`.
///
/// The tail segment decides the write mode:
///
/// - `$` or a numeric index: list insert. Appends (or sets the index) on
///   the parent list; fails `InvalidInsert` when the parent is
///   associative. With `auto_ids`, a map insert whose `id` is null or `0`
///   gets a fresh ID from `id_strategy` first.
/// - an embedded ID (`blocks[5]`): collapses to the positional index of
///   the matching element, then behaves like a numeric index.
/// - a plain key: overwrite only; a missing key fails `KeyNotFound`
///   (use [`create_path`] first).
pub fn update_with(
    tree: &mut Value,
    path: &str,
    mut insert: Value,
    auto_ids: bool,
    id_strategy: IdStrategy,
) -> Result<Update, TraverseError> {
    let mut segments = parse_path(path)?;
    let tail = segments.pop().ok_or_else(|| TraverseError::InvalidPath {
        reason: "cannot update the tree root itself".to_string(),
    })?;

    // By-ID addressing collapses to by-index addressing before mutation.
    let target = match tail {
        Segment::Embedded { container, id } => {
            if !container.is_empty() {
                segments.push(Segment::Plain(container));
            }
            let elements = resolve(tree, &segments, true)?;
            let Value::Array(items) = elements else {
                return Err(TraverseError::NotAContainer {
                    reason: format!(
                        "cannot look up ID {id} in a non-list at \"{}\"",
                        render_path(&segments),
                    ),
                });
            };
            let position = find_id_position(items, id).ok_or_else(|| TraverseError::PathNotFound {
                reason: format!(
                    "the ID {id} could not be found inside \"{}\"",
                    render_path(&segments),
                ),
            })?;
            Target::Index(position)
        }
        Segment::Append => Target::Push,
        Segment::Plain(name) => match name.parse::<usize>() {
            Ok(index) => Target::Index(index),
            Err(_) => Target::Key(name),
        },
    };

    if matches!(target, Target::Index(_) | Target::Push) {
        let dynamic_next = {
            let sub_node = resolve(tree, &segments, true)?;
            if is_associative(sub_node) {
                return Err(TraverseError::InvalidInsert {
                    path: render_path(&segments),
                });
            }
            ids::max_id_of(sub_node) + 1
        };
        if auto_ids && ids::needs_allocation(&insert) {
            let next = match id_strategy {
                // the _ids table needs a map root; fall back to the
                // dynamic computation on a list root
                IdStrategy::Stored if tree.is_object() => ids::incremented_id(&segments, tree)?,
                IdStrategy::Stored | IdStrategy::Dynamic => dynamic_next,
            };
            if let Some(map) = insert.as_object_mut() {
                map.insert(ID_KEY.to_string(), json!(next));
            }
        }
    }

    let sub_node = resolve_mut(tree, &segments, true)?;
    if matches!(target, Target::Index(_) | Target::Push) {
        // an empty map has never been written to; it becomes a list on
        // first list-style insert
        if sub_node.as_object().is_some_and(|map| map.is_empty()) {
            *sub_node = Value::Array(Vec::new());
        }
    }

    let rendered_target = match (&target, &mut *sub_node) {
        (Target::Push, Value::Array(items)) => {
            items.push(insert.clone());
            (items.len() - 1).to_string()
        }
        (Target::Index(index), Value::Array(items)) => {
            match index.cmp(&items.len()) {
                Ordering::Less => items[*index] = insert.clone(),
                Ordering::Equal => items.push(insert.clone()),
                Ordering::Greater => {
                    let available = (0..items.len())
                        .map(|index| index.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(TraverseError::KeyNotFound {
                        key: index.to_string(),
                        available,
                    });
                }
            }
            index.to_string()
        }
        // a numeric-keyed map is a positional container that happens to be
        // stored associatively
        (Target::Push, Value::Object(map)) => {
            let index = map.len();
            map.insert(index.to_string(), insert.clone());
            index.to_string()
        }
        (Target::Index(index), Value::Object(map)) => {
            map.insert(index.to_string(), insert.clone());
            index.to_string()
        }
        (Target::Key(key), Value::Object(map)) => {
            if !map.contains_key(key) {
                let available = map.keys().cloned().collect::<Vec<_>>().join(", ");
                return Err(TraverseError::KeyNotFound {
                    key: key.clone(),
                    available,
                });
            }
            map.insert(key.clone(), insert.clone());
            key.clone()
        }
        (Target::Key(key), Value::Array(items)) => {
            let available = (0..items.len())
                .map(|index| index.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(TraverseError::KeyNotFound {
                key: key.clone(),
                available,
            });
        }
        _ => {
            return Err(TraverseError::NotAContainer {
                reason: format!("the node at \"{}\" is not a container", render_path(&segments)),
            });
        }
    };

    let base = render_path(&segments);
    let canonical = match insert.as_object().and_then(|map| map.get(ID_KEY)) {
        Some(id) => format!("{base}[{}]", render_id(id)),
        None if base.is_empty() => rendered_target,
        None => format!("{base}{PATH_DELIMITER}{rendered_target}"),
    };

    Ok(Update {
        path: canonical,
        insert,
    })
}

fn render_id(id: &Value) -> String {
    match id {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Set the node at `path` to null.
///
/// When the nulled node is a map carrying an `id` field, the element is
/// dropped from its parent container entirely and the remaining elements
/// are re-packed, together with any other null holes. Anything else leaves
/// a null placeholder behind ([`has_path`] stays true).
pub fn remove(tree: &mut Value, path: &str) -> Result<Update, TraverseError> {
    let mut segments = parse_path(path)?;

    let value = resolve_mut(tree, &segments, false)?;
    let drop_entirely = value.as_object().is_some_and(|map| map.contains_key(ID_KEY));
    *value = Value::Null;

    if drop_entirely {
        // compaction runs on the removed element's parent container
        match segments.pop() {
            Some(Segment::Embedded { container, .. }) if !container.is_empty() => {
                segments.push(Segment::Plain(container));
            }
            _ => {}
        }
        let parent = resolve_mut(tree, &segments, true)?;
        compact(parent);
    }

    Ok(Update {
        path: path.to_string(),
        insert: Value::Null,
    })
}

/// Drop null holes and re-pack positional indices.
fn compact(container: &mut Value) {
    match container {
        Value::Array(items) => items.retain(|value| !value.is_null()),
        Value::Object(map) => {
            map.retain(|_, value| !value.is_null());
            let positional = !map.is_empty() && map.keys().all(|key| key.parse::<usize>().is_ok());
            if positional {
                let items = std::mem::take(map).into_iter().map(|(_, value)| value).collect();
                *container = Value::Array(items);
            }
        }
        _ => {}
    }
}

/// Delete the key or index at `path` entirely from its parent container —
/// no null placeholder is left behind. A list is re-indexed after the
/// removal.
pub fn remove_completely(tree: &mut Value, path: &str) -> Result<Update, TraverseError> {
    let mut segments = parse_path(path)?;
    let tail = segments.pop().ok_or_else(|| TraverseError::InvalidPath {
        reason: "cannot remove the tree root itself".to_string(),
    })?;
    let parent = resolve_mut(tree, &segments, true)?;

    match tail {
        Segment::Embedded { container, id } => {
            let elements = if container.is_empty() {
                parent
            } else {
                let is_list = matches!(parent.get(container.as_str()), Some(Value::Array(_)));
                match parent {
                    Value::Object(map) if is_list => &mut map[container.as_str()],
                    _ => {
                        return Err(TraverseError::NotAContainer {
                            reason: format!(
                                "wanted to find an ID in a list but node \"{container}\" is not a list"
                            ),
                        });
                    }
                }
            };
            let Value::Array(items) = elements else {
                return Err(TraverseError::NotAContainer {
                    reason: format!(
                        "wanted to find an ID in a list but node \"{container}\" is not a list"
                    ),
                });
            };
            let position = find_id_position(items, id).ok_or_else(|| TraverseError::PathNotFound {
                reason: format!(
                    "the ID {id} could not be found inside \"{}\"",
                    render_path(&segments),
                ),
            })?;
            items.remove(position);
        }
        Segment::Plain(name) => match parent {
            Value::Object(map) => {
                if map.remove(name.as_str()).is_none() {
                    let available = map.keys().cloned().collect::<Vec<_>>().join(", ");
                    return Err(TraverseError::KeyNotFound {
                        key: name,
                        available,
                    });
                }
            }
            Value::Array(items) => {
                let index = name
                    .parse::<usize>()
                    .ok()
                    .filter(|index| *index < items.len())
                    .ok_or_else(|| TraverseError::KeyNotFound {
                        key: name.clone(),
                        available: (0..items.len())
                            .map(|index| index.to_string())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })?;
                items.remove(index);
            }
            _ => {
                return Err(TraverseError::NotAContainer {
                    reason: format!(
                        "the parent of \"{}\" is not a container",
                        render_segment(&Segment::Plain(name)),
                    ),
                });
            }
        },
        Segment::Append => {
            return Err(TraverseError::InvalidPath {
                reason: "the append operator cannot be a removal target".to_string(),
            });
        }
    }

    Ok(Update {
        path: path.to_string(),
        insert: Value::Null,
    })
}

/// Idempotently ensure every segment of `path` exists.
///
/// Plain segments are created as empty maps (null for the final segment);
/// embedded-ID segments find or append an `{"id": <id>}` element, creating
/// the container list when absent. Existing non-null values are never
/// overwritten. Running through a scalar fails `InvalidPath`.
pub fn create_path(tree: &mut Value, path: &str) -> Result<Update, TraverseError> {
    let segments = parse_path(path)?;
    let result = Update {
        path: path.to_string(),
        insert: Value::Null,
    };
    if segments.is_empty() {
        return Ok(result);
    }

    let mut current = tree;
    let last = segments.len() - 1;

    for (step, segment) in segments.iter().enumerate() {
        let is_last = step == last;
        if !is_container(current) {
            return Err(TraverseError::InvalidPath {
                reason: format!(
                    "creating path \"{path}\" is not possible because it runs through a non-container value at node \"{}\"",
                    render_segment(segment),
                ),
            });
        }

        match segment {
            Segment::Embedded { container, id } => {
                let children = if container.is_empty() {
                    current
                } else {
                    let Value::Object(map) = current else {
                        return Err(TraverseError::InvalidPath {
                            reason: format!(
                                "cannot create list \"{container}\" inside a non-map value (path: \"{path}\")"
                            ),
                        });
                    };
                    map.entry(container.as_str())
                        .or_insert_with(|| Value::Array(Vec::new()))
                };
                // a null or untouched-empty-map slot becomes the container list
                if children.is_null() || children.as_object().is_some_and(|map| map.is_empty()) {
                    *children = Value::Array(Vec::new());
                }
                let Value::Array(items) = children else {
                    return Err(TraverseError::InvalidPath {
                        reason: format!(
                            "cannot create an element with ID {id}: \"{container}\" is not a list (path: \"{path}\")"
                        ),
                    });
                };
                let position = match find_id_position(items, *id) {
                    Some(position) => position,
                    None => {
                        let mut element = Map::new();
                        element.insert(ID_KEY.to_string(), json!(id));
                        items.push(Value::Object(element));
                        items.len() - 1
                    }
                };
                current = &mut items[position];
            }
            Segment::Plain(name) => {
                current = match current {
                    Value::Object(map) => {
                        let slot = map.entry(name.as_str()).or_insert(Value::Null);
                        if slot.is_null() && !is_last {
                            *slot = Value::Object(Map::new());
                        }
                        slot
                    }
                    Value::Array(items) => {
                        let index = name.parse::<usize>().ok().ok_or_else(|| {
                            TraverseError::InvalidPath {
                                reason: format!(
                                    "cannot create key \"{name}\" inside a list (path: \"{path}\")"
                                ),
                            }
                        })?;
                        if index > items.len() {
                            return Err(TraverseError::InvalidPath {
                                reason: format!(
                                    "cannot create index {index} past the end of a list of {} (path: \"{path}\")",
                                    items.len(),
                                ),
                            });
                        }
                        if index == items.len() {
                            items.push(if is_last { Value::Null } else { Value::Object(Map::new()) });
                        } else if items[index].is_null() && !is_last {
                            items[index] = Value::Object(Map::new());
                        }
                        &mut items[index]
                    }
                    _ => {
                        return Err(TraverseError::InvalidPath {
                            reason: format!(
                                "creating path \"{path}\" is not possible at node \"{name}\""
                            ),
                        });
                    }
                };
            }
            Segment::Append => {
                return Err(TraverseError::InvalidPath {
                    reason: format!(
                        "the append operator cannot be part of a created path (path: \"{path}\")"
                    ),
                });
            }
        }
    }

    Ok(result)
}

/// Duplicate the element addressed by an embedded-ID path.
///
/// The clone's `id` is cleared and the copy is appended through [`update`]
/// with a synthesized `container.$` path, so the normal auto-ID allocation
/// applies. Fails `InvalidPath` when the path's tail carries no embedded
/// ID.
pub fn duplicate_by_path(tree: &mut Value, path: &str) -> Result<Update, TraverseError> {
    let segments = parse_path(path)?;
    let Some(Segment::Embedded { container, .. }) = segments.last().cloned() else {
        return Err(TraverseError::InvalidPath {
            reason: format!("no embedded ID found in path: \"{path}\""),
        });
    };

    let mut duplicate = resolve(tree, &segments, true)?.clone();
    if let Some(map) = duplicate.as_object_mut() {
        map.insert(ID_KEY.to_string(), Value::Null);
    }

    let mut insert_segments = segments[..segments.len() - 1].to_vec();
    if !container.is_empty() {
        insert_segments.push(Segment::Plain(container));
    }
    insert_segments.push(Segment::Append);

    update(tree, &render_path(&insert_segments), duplicate)
}

/// Collect every map in `tree` whose `type` field equals `type_name`, in
/// pre-order, with the dotted path from the search root. Recursion is
/// bounded by `max_depth` segments.
pub fn find_types_in_data(tree: &Value, type_name: &str, max_depth: usize) -> Vec<TypeMatch> {
    let mut matches = Vec::new();
    let mut visited = Vec::new();
    collect_types(tree, type_name, max_depth, &mut visited, &mut matches);
    matches
}

fn collect_types(
    node: &Value,
    type_name: &str,
    max_depth: usize,
    visited: &mut Vec<String>,
    matches: &mut Vec<TypeMatch>,
) {
    if visited.len() >= max_depth {
        return;
    }
    if node.get(TYPE_KEY).and_then(Value::as_str) == Some(type_name) {
        matches.push(TypeMatch {
            id: node.get(ID_KEY).cloned().unwrap_or(Value::Null),
            path: visited.join(PATH_DELIMITER),
        });
    }
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                if is_container(child) {
                    visited.push(key.clone());
                    collect_types(child, type_name, max_depth, visited, matches);
                    visited.pop();
                }
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                if is_container(child) {
                    visited.push(index.to_string());
                    collect_types(child, type_name, max_depth, visited, matches);
                    visited.pop();
                }
            }
        }
        _ => {}
    }
}

/// Resolve `path` to a list and return the `id` field of each element,
/// optionally keeping only elements whose `filter_key` field equals
/// `filter_value`. Elements without an `id` field are skipped.
pub fn nested_ids(
    tree: &Value,
    path: &str,
    filter_key: Option<&str>,
    filter_value: Option<&Value>,
) -> Result<Vec<Value>, TraverseError> {
    let elements = traverse(tree, path, true)?;
    let Value::Array(items) = elements else {
        return Err(TraverseError::NotAContainer {
            reason: format!("expected a list at \"{path}\""),
        });
    };
    Ok(items
        .iter()
        .filter(|element| match filter_key {
            Some(key) => {
                element.get(key).unwrap_or(&Value::Null)
                    == filter_value.unwrap_or(&Value::Null)
            }
            None => true,
        })
        .filter_map(|element| element.get(ID_KEY).cloned())
        .collect())
}
