//! Reconciling a generic document back into an existing object tree.
//!
//! Reconciliation is additive and overwriting, never subtractive: children
//! and attributes present on the tree but absent from the document are left
//! exactly as they were. Data-shape problems never abort a call; the
//! offending entry is dropped, recorded in the [`Report`], and processing
//! continues. Recursion depth equals document depth — callers feeding
//! externally supplied documents should bound their depth at the ingest
//! layer, the algorithm itself enforces no cap.

use log::debug;

use crate::factory::{Factory, FactoryError};
use crate::node::{AttrError, Monomer, NAME_KEY};
use crate::value::{Scalar, Value, ValueMap};

/// Why a document entry was dropped instead of applied.
#[derive(Debug, thiserror::Error)]
pub enum DropReason {
    #[error(transparent)]
    NoCreator(#[from] FactoryError),
    #[error(transparent)]
    Attribute(#[from] AttrError),
    #[error("unsupported document shape")]
    UnsupportedShape,
}

/// One dropped entry: where in the document it sat and why it was skipped.
#[derive(Debug)]
pub struct Dropped {
    /// Dotted key path from the document root, list elements as `key[i]`.
    pub path: String,
    pub reason: DropReason,
}

/// Outcome of a reconcile call.
///
/// Reconciliation mutates the tree in place; the report only carries the
/// diagnostic list of entries that could not be applied.
#[derive(Debug, Default)]
pub struct Report {
    pub dropped: Vec<Dropped>,
}

impl Report {
    /// True when every document entry was applied.
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }

    fn record(&mut self, path: &str, reason: impl Into<DropReason>) {
        let reason = reason.into();
        debug!("dropped entry at `{}`: {}", path, reason);
        self.dropped.push(Dropped {
            path: path.to_string(),
            reason,
        });
    }
}

/// Reconciles a document into an existing tree, mutating `node` and its
/// descendants.
///
/// Entries are processed in document order. Map entries update or create
/// children (matching existing children by type tag, preferring a display
/// name match), list entries distribute over repeated children, scalar
/// entries write attributes. Anything on the node the document does not
/// mention is untouched; the factory is consulted only when no existing
/// child matches.
pub fn reconcile(node: &mut dyn Monomer, value: &Value, factory: &Factory) -> Report {
    let mut report = Report::default();
    match value {
        Value::Map(map) => reconcile_map(node, map, factory, "", &mut report),
        _ => report.record("", DropReason::UnsupportedShape),
    }
    report
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn reconcile_map(
    node: &mut dyn Monomer,
    map: &ValueMap,
    factory: &Factory,
    path: &str,
    report: &mut Report,
) {
    for (key, entry) in map {
        let entry_path = join(path, key);
        match entry {
            Value::Map(child_data) => {
                reconcile_child_entry(node, key, child_data, factory, &entry_path, report);
            }
            Value::List(items) => {
                reconcile_list_entry(node, key, items, factory, &entry_path, report);
            }
            Value::Scalar(scalar) => {
                write_attribute(node, key, scalar.clone(), &entry_path, report);
            }
        }
    }
}

/// Writes one attribute, routing the reserved `name` key to the display
/// name.
fn write_attribute(
    node: &mut dyn Monomer,
    key: &str,
    value: Scalar,
    path: &str,
    report: &mut Report,
) {
    if key == NAME_KEY {
        match &value {
            Scalar::Text(name) => node.set_name(name),
            Scalar::Null => node.set_name(""),
            other => node.set_name(&other.to_string()),
        }
        return;
    }
    if let Err(err) = node.set(key, value) {
        report.record(path, err);
    }
}

/// Case 1: a lone map entry describes a single child under `key`.
fn reconcile_child_entry(
    node: &mut dyn Monomer,
    key: &str,
    child_data: &ValueMap,
    factory: &Factory,
    path: &str,
    report: &mut Report,
) {
    let declared = declared_name(child_data);

    // Prefer a display-name match among same-tag children, then fall back
    // to the first child with the right type tag.
    let mut index = declared.and_then(|name| {
        node.children()
            .iter()
            .position(|c| c.type_tag() == key && c.name() == name)
    });
    if index.is_none() {
        index = node.children().iter().position(|c| c.type_tag() == key);
    }

    match index {
        Some(i) => {
            reconcile_map(node.children_mut()[i].as_mut(), child_data, factory, path, report);
        }
        None => create_child(node, key, child_data, factory, path, report),
    }
}

/// Case 2: a list entry distributes maps over repeated same-tag children
/// and writes scalars as attribute values under the same key.
fn reconcile_list_entry(
    node: &mut dyn Monomer,
    key: &str,
    items: &[Value],
    factory: &Factory,
    path: &str,
    report: &mut Report,
) {
    // Partition the existing same-tag children into a named pool and an
    // unnamed pool; both keep child order. Consumption is greedy: each
    // pool entry is used at most once.
    let mut named: Vec<usize> = Vec::new();
    let mut unnamed: Vec<usize> = Vec::new();
    for (i, child) in node.children().iter().enumerate() {
        if child.type_tag() == key {
            if child.name().is_empty() {
                unnamed.push(i);
            } else {
                named.push(i);
            }
        }
    }

    for (j, element) in items.iter().enumerate() {
        let elem_path = format!("{}[{}]", path, j);
        match element {
            Value::Map(child_data) => {
                let mut chosen = None;
                if let Some(name) = declared_name(child_data) {
                    if let Some(pos) = named
                        .iter()
                        .position(|&i| node.children()[i].name() == name)
                    {
                        chosen = Some(named.remove(pos));
                    }
                }
                if chosen.is_none() && !unnamed.is_empty() {
                    chosen = Some(unnamed.remove(0));
                }
                match chosen {
                    Some(i) => reconcile_map(
                        node.children_mut()[i].as_mut(),
                        child_data,
                        factory,
                        &elem_path,
                        report,
                    ),
                    // Creation appends past every pooled index, so the
                    // pools stay valid.
                    None => create_child(node, key, child_data, factory, &elem_path, report),
                }
            }
            Value::Scalar(scalar) => {
                // Attribute value sharing the key with children; last
                // write wins.
                write_attribute(node, key, scalar.clone(), &elem_path, report);
            }
            Value::List(_) => report.record(&elem_path, DropReason::UnsupportedShape),
        }
    }
}

/// Last resort for an unmatched map entry: build the child through the
/// factory, name it after the entry key, attach, recurse.
fn create_child(
    node: &mut dyn Monomer,
    key: &str,
    child_data: &ValueMap,
    factory: &Factory,
    path: &str,
    report: &mut Report,
) {
    match factory.create(key) {
        Ok(mut child) => {
            debug!("created `{}` child at `{}`", key, path);
            child.set_name(key);
            reconcile_map(child.as_mut(), child_data, factory, path, report);
            node.attach(child);
        }
        Err(err) => report.record(path, err),
    }
}

fn declared_name(map: &ValueMap) -> Option<&str> {
    map.get(NAME_KEY)?.as_scalar()?.as_text()
}

/// Reconciles a list document into an ordered sequence of root nodes.
///
/// Map elements update `nodes` positionally; past the end of the sequence,
/// new nodes are created under `creator_key` (or the type tag of the first
/// existing node) and appended. When nothing can be created the remaining
/// elements are given up on, since positions would no longer line up.
/// Non-map elements are skipped.
pub fn reconcile_list(
    nodes: &mut Vec<Box<dyn Monomer>>,
    data: &Value,
    factory: &Factory,
    creator_key: Option<&str>,
) -> Report {
    let mut report = Report::default();
    let Some(items) = data.as_list() else {
        report.record("", DropReason::UnsupportedShape);
        return report;
    };

    let mut next = 0usize;
    for (j, element) in items.iter().enumerate() {
        let Value::Map(map) = element else { continue };
        let path = format!("[{}]", j);

        if next < nodes.len() {
            reconcile_map(nodes[next].as_mut(), map, factory, &path, &mut report);
        } else {
            let key = creator_key
                .map(str::to_string)
                .or_else(|| nodes.first().map(|n| n.type_tag().to_string()));
            let created = key.and_then(|k| match factory.create(&k) {
                Ok(node) => Some(node),
                Err(err) => {
                    report.record(&path, err);
                    None
                }
            });
            match created {
                Some(mut node) => {
                    reconcile_map(node.as_mut(), map, factory, &path, &mut report);
                    nodes.push(node);
                }
                None => {
                    if creator_key.is_none() && nodes.is_empty() {
                        report.record(&path, DropReason::UnsupportedShape);
                    }
                    return report;
                }
            }
        }
        next += 1;
    }
    report
}
