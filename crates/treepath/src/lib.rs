//! Path-addressed accessor/mutator engine for dynamically shaped JSON
//! trees.
//!
//! Paths are dotted (`meta.blocks[2].title`) with an embedded-ID
//! extension: `blocks[2]` addresses the element of the `blocks` list whose
//! `id` field equals `2`, not the element at position 2. The `$` operator
//! appends to a list, and elements inserted with a null or zero `id` get a
//! fresh auto-incremented one.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use treepath::{traverse, update};
//!
//! let mut doc = json!({"blocks": []});
//! let up = update(&mut doc, "blocks.$", json!({"id": null, "content": "asd"})).unwrap();
//!
//! // the canonical path addresses the new element by its assigned ID
//! assert_eq!(up.path, "blocks[1]");
//! assert_eq!(
//!     traverse(&doc, "blocks[1]", false).unwrap(),
//!     &json!({"id": 1, "content": "asd"})
//! );
//! ```
//!
//! The engine never retains the tree between calls: every operation takes
//! `&mut serde_json::Value`, mutates it in place and returns an
//! [`Update`] with the canonical path of the change. When the tree lives
//! inside a host object, the [`link`] module pushes updated trees back
//! into the owner after each successful mutation.

pub mod cursor;
pub mod engine;
pub mod error;
pub mod ids;
pub mod link;
pub mod path;

pub use cursor::{find_id_position, is_associative, resolve, resolve_mut};
pub use engine::{
    create_path, duplicate_by_path, find_types_in_data, has_path, nested_ids, remove,
    remove_completely, traverse, traverse_mut, update, update_with, TypeMatch, Update,
};
pub use error::TraverseError;
pub use ids::{incremented_id, max_id, IdStrategy, IDS_TABLE_KEY, ID_KEY};
pub use link::{DataLink, HostLink, ValueLink};
pub use path::{
    parse_path, parse_segment, render_path, render_segment, Segment, APPEND_OPERATOR,
    PATH_DELIMITER,
};
