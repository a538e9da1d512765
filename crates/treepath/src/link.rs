//! Write-back links.
//!
//! A link glues a tree to its owner: after every successful mutating
//! operation the updated tree is pushed back into the owner's canonical
//! storage. A plain tree needs no link at all — the engine mutates it in
//! place — so links only matter when the tree lives inside a host object.

use serde_json::Value;

use crate::engine::Update;
use crate::error::TraverseError;

/// Storage contract between the engine and a tree owner.
pub trait DataLink {
    /// Current tree held by the link.
    fn read(&self) -> Value;

    /// Store `tree` after a successful mutation, together with the
    /// canonical `path` of the change and the value written there.
    fn write(&mut self, tree: Value, path: &str, insert: &Value);
}

/// Pass-through link over an owned tree.
///
/// `write` replaces the tree and records the last update's path and
/// inserted value, nothing more.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueLink {
    pub data: Value,
    pub path: String,
    pub insert: Value,
}

impl ValueLink {
    pub fn new(data: Value) -> Self {
        ValueLink {
            data,
            path: String::new(),
            insert: Value::Null,
        }
    }

    /// Dissolve the link and hand the tree back.
    pub fn into_data(self) -> Value {
        self.data
    }
}

impl DataLink for ValueLink {
    fn read(&self) -> Value {
        self.data.clone()
    }

    fn write(&mut self, tree: Value, path: &str, insert: &Value) {
        self.data = tree;
        self.path = path.to_string();
        self.insert = insert.clone();
    }
}

/// Link backed by a host object: every write also invokes the host's
/// setter with the updated tree.
pub struct HostLink<F: FnMut(&Value)> {
    data: Value,
    setter: F,
}

impl<F: FnMut(&Value)> HostLink<F> {
    pub fn new(data: Value, setter: F) -> Self {
        HostLink { data, setter }
    }

    pub fn data(&self) -> &Value {
        &self.data
    }
}

impl<F: FnMut(&Value)> DataLink for HostLink<F> {
    fn read(&self) -> Value {
        self.data.clone()
    }

    fn write(&mut self, tree: Value, _path: &str, _insert: &Value) {
        self.data = tree;
        (self.setter)(&self.data);
    }
}

/// Run one mutating operation against a link: read the tree out, apply
/// `op` to a private copy and write the result back only on success. A
/// failed operation leaves the link untouched.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use treepath::{link, update, ValueLink};
///
/// let mut target = ValueLink::new(json!({"name": "old"}));
/// link::apply(&mut target, |tree| update(tree, "name", json!("new"))).unwrap();
/// assert_eq!(target.data, json!({"name": "new"}));
/// ```
pub fn apply<L, F>(link: &mut L, op: F) -> Result<Update, TraverseError>
where
    L: DataLink + ?Sized,
    F: FnOnce(&mut Value) -> Result<Update, TraverseError>,
{
    let mut tree = link.read();
    let update = op(&mut tree)?;
    link.write(tree, &update.path, &update.insert);
    Ok(update)
}
