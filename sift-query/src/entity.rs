//! Attribute access for records handled by the reference collaborators.

use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

use crate::value::Value;

/// A record whose attributes can be read by name.
///
/// Used to build cursors from boundary entities and to evaluate
/// restrictions in [`MemoryEngine`](crate::memory::MemoryEngine).
/// Missing attributes read as `None` and are treated as null.
pub trait Entity {
    /// The value of the named attribute.
    fn attribute(&self, name: &str) -> Option<Value>;
}

impl<E: Entity + ?Sized> Entity for &E {
    fn attribute(&self, name: &str) -> Option<Value> {
        (**self).attribute(name)
    }
}

impl Entity for IndexMap<String, Value> {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Entity for HashMap<String, Value> {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Entity for BTreeMap<String, Value> {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}
