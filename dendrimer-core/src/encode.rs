//! Encoding an object tree into a generic document value.

use crate::node::{Monomer, NAME_KEY};
use crate::value::{Value, ValueMap, fold};

/// How deep below the root to encode children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Follow children all the way down.
    Unlimited,
    /// Encode at most this many child levels; `Max(0)` encodes
    /// attributes only.
    Max(u32),
}

impl Depth {
    /// Returns the budget for the next level down, or `None` when the
    /// budget is spent.
    fn descend(self) -> Option<Depth> {
        match self {
            Depth::Unlimited => Some(Depth::Unlimited),
            Depth::Max(0) => None,
            Depth::Max(n) => Some(Depth::Max(n - 1)),
        }
    }
}

/// Options for [`encode`].
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    pub depth: Depth,
    /// Include attributes that are readable but not writable.
    pub include_read_only: bool,
    /// Include the reserved display-name attribute.
    pub include_name: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            depth: Depth::Unlimited,
            include_read_only: true,
            include_name: false,
        }
    }
}

/// Encodes a node and its descendants into a [`Value::Map`].
///
/// Attributes fold in declaration order followed by the dynamic mapping;
/// children fold in child order under their display name, falling back to
/// their type tag when the name is empty. Repeated keys collapse into
/// lists per [`fold`]. Pure; never fails.
pub fn encode(node: &dyn Monomer, options: &EncodeOptions) -> Value {
    let mut map = ValueMap::new();

    if options.include_name {
        fold(&mut map, NAME_KEY, Value::from(node.name()));
    }

    for spec in node.attributes() {
        if !spec.readable || (!options.include_read_only && !spec.writable) {
            continue;
        }
        if spec.name == NAME_KEY {
            // Reserved for the display name, handled above.
            continue;
        }
        if let Some(value) = node.get(&spec.name) {
            fold(&mut map, &spec.name, Value::Scalar(value));
        }
    }

    for (name, value) in node.dynamic_attributes() {
        fold(&mut map, name, Value::Scalar(value.clone()));
    }

    if let Some(child_depth) = options.depth.descend() {
        let child_options = EncodeOptions {
            depth: child_depth,
            ..options.clone()
        };
        for child in node.children() {
            let key = if child.name().is_empty() {
                child.type_tag()
            } else {
                child.name()
            };
            fold(&mut map, key, encode(child.as_ref(), &child_options));
        }
    }

    Value::Map(map)
}

/// Encodes a sequence of nodes into a [`Value::List`] of maps.
pub fn encode_list(nodes: &[Box<dyn Monomer>], options: &EncodeOptions) -> Value {
    Value::List(
        nodes
            .iter()
            .map(|node| encode(node.as_ref(), options))
            .collect(),
    )
}
