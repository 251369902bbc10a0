use std::collections::HashMap;
use tdm_types::PropertyHandle;

/// One row of a property table: where a handle sits in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    /// Handle of the enclosing node.
    pub parent: PropertyHandle,
    /// Context tag of this property inside the parent's structure.
    pub tag: u32,
}

impl PropertyInfo {
    /// Const constructor so generated tables can be `static`.
    pub const fn new(parent: u32, tag: u32) -> Self {
        Self {
            parent: PropertyHandle::new(parent),
            tag,
        }
    }
}

/// A trait's property tree in table form.
///
/// Entry `i` describes handle `i + 2`. A `(parent, tag) → handle` index is
/// built at construction so decoding does not scan the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTable {
    entries: Vec<PropertyInfo>,
    by_parent_tag: HashMap<(PropertyHandle, u32), PropertyHandle>,
}

impl PropertyTable {
    /// Indexes `entries`. Duplicate `(parent, tag)` pairs keep the first
    /// occurrence; [`SchemaBuilder`](crate::SchemaBuilder) rejects them.
    pub fn new(entries: Vec<PropertyInfo>) -> Self {
        let mut by_parent_tag = HashMap::with_capacity(entries.len());
        for (index, info) in entries.iter().enumerate() {
            by_parent_tag
                .entry((info.parent, info.tag))
                .or_insert_with(|| PropertyHandle::from_property_index(index));
        }
        Self {
            entries,
            by_parent_tag,
        }
    }

    /// Number of properties (excluding the root).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest valid handle (the root when the table is empty).
    pub fn last_handle(&self) -> PropertyHandle {
        PropertyHandle::new(self.entries.len() as u32 + 1)
    }

    /// Whether `handle` names the root or a property of this table.
    pub fn contains(&self, handle: PropertyHandle) -> bool {
        handle.is_root() || self.get(handle).is_some()
    }

    /// The row for `handle`; `None` for root, null and out-of-range handles.
    pub fn get(&self, handle: PropertyHandle) -> Option<&PropertyInfo> {
        self.entries.get(handle.property_index()?)
    }

    /// Reverse lookup used when decoding.
    pub fn handle_for(&self, parent: PropertyHandle, tag: u32) -> Option<PropertyHandle> {
        self.by_parent_tag.get(&(parent, tag)).copied()
    }

    /// Rows paired with the handles they describe.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyHandle, &PropertyInfo)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, info)| (PropertyHandle::from_property_index(i), info))
    }

    pub fn entries(&self) -> &[PropertyInfo] {
        &self.entries
    }
}
