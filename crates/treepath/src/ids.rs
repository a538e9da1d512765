//! Identifier allocation for inserted list elements.
//!
//! Elements inserted with an `id` field of null or `0` get a fresh ID.
//! Two strategies exist: a per-path counter persisted in the tree's own
//! `_ids` table, or a stateless `max + 1` computed from the target list.

use serde_json::{json, Map, Value};

use crate::error::TraverseError;
use crate::path::{render_path, Segment};

/// Field that identifies an element inside a list.
pub const ID_KEY: &str = "id";

/// Reserved root key holding the last issued ID per list path. Created
/// lazily, never pruned; it travels with the tree's own data.
pub const IDS_TABLE_KEY: &str = "_ids";

/// How `update` assigns identifiers to inserted elements whose `id` field
/// is null or `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// Keep a per-path counter in the `_ids` table at the tree root.
    #[default]
    Stored,
    /// Recompute `max(id) + 1` from the target list on every call, with no
    /// side effect on the tree. Use this when IDs must not be persisted
    /// alongside the data (e.g. database-assigned IDs).
    Dynamic,
}

/// Increment and return the stored counter for the list at `segments`.
///
/// The counter lives at `tree["_ids"][<rendered path>]`, starts at `0` and
/// is created on first use. Mutates the tree.
pub fn incremented_id(segments: &[Segment], tree: &mut Value) -> Result<i64, TraverseError> {
    let Value::Object(root) = tree else {
        return Err(TraverseError::InvalidPath {
            reason: "stored ID allocation requires a map at the tree root".to_string(),
        });
    };
    let table = root
        .entry(IDS_TABLE_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(table) = table else {
        return Err(TraverseError::InvalidPath {
            reason: format!("the reserved \"{IDS_TABLE_KEY}\" entry is not a map"),
        });
    };
    let key = render_path(segments);
    let next = table.get(&key).and_then(Value::as_i64).unwrap_or(0) + 1;
    table.insert(key, json!(next));
    Ok(next)
}

/// Highest `id` field carried by any element of `elements`; `0` when none
/// carry one.
pub fn max_id(elements: &[Value]) -> i64 {
    elements.iter().fold(0, |max, element| {
        max.max(element.get(ID_KEY).and_then(Value::as_i64).unwrap_or(0))
    })
}

/// [`max_id`] over any container shape: list elements or map values.
pub(crate) fn max_id_of(container: &Value) -> i64 {
    match container {
        Value::Array(items) => max_id(items),
        Value::Object(map) => map.values().fold(0, |max, element| {
            max.max(element.get(ID_KEY).and_then(Value::as_i64).unwrap_or(0))
        }),
        _ => 0,
    }
}

/// Whether `insert` asks for a fresh ID: a map with an `id` field that is
/// null or `0`. Any other ID value is taken verbatim.
pub(crate) fn needs_allocation(insert: &Value) -> bool {
    match insert.get(ID_KEY) {
        Some(Value::Null) => true,
        Some(id) => id.as_i64() == Some(0),
        None => false,
    }
}
