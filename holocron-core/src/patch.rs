//! Structural diff between two JSON documents, expressed as JSON Patch
//! (RFC 6902) operations, and replay of those operations.
//!
//! The diff walks both documents field by field. Keys of the original are
//! visited last-to-first so that array removals run from the highest index
//! down; additions follow in ascending order. Replaying the produced patch
//! against the original therefore yields the new document.

use crate::error::PatchError;
use crate::record::UserRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Add,
    Remove,
    Replace,
}

/// One field-level edit: `{ "op": ..., "path": ..., "value": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
}

impl PatchOp {
    pub fn kind(&self) -> OpKind {
        match self {
            PatchOp::Add { .. } => OpKind::Add,
            PatchOp::Remove { .. } => OpKind::Remove,
            PatchOp::Replace { .. } => OpKind::Replace,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            PatchOp::Add { path, .. } | PatchOp::Remove { path } | PatchOp::Replace { path, .. } => {
                path
            }
        }
    }

    /// The value carried by the operation; `None` for removals.
    pub fn value(&self) -> Option<&Value> {
        match self {
            PatchOp::Add { value, .. } | PatchOp::Replace { value, .. } => Some(value),
            PatchOp::Remove { .. } => None,
        }
    }
}

/// Ordered list of edit operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch(Vec<PatchOp>);

impl Patch {
    pub fn new(ops: Vec<PatchOp>) -> Self {
        Self(ops)
    }

    pub fn ops(&self) -> &[PatchOp] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatchOp> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a PatchOp;
    type IntoIter = std::slice::Iter<'a, PatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<PatchOp>> for Patch {
    fn from(ops: Vec<PatchOp>) -> Self {
        Self(ops)
    }
}

// ============================================================================
// DIFF
// ============================================================================

/// Compute the operations that transform `original` into `new`.
pub fn diff(original: &Value, new: &Value) -> Patch {
    let mut ops = Vec::new();
    compare(original, new, String::new(), &mut ops);
    Patch(ops)
}

/// Diff two record snapshots.
pub fn diff_records(original: &UserRecord, new: &UserRecord) -> Patch {
    diff(&original.to_value(), &new.to_value())
}

fn compare(old: &Value, new: &Value, path: String, ops: &mut Vec<PatchOp>) {
    match (old, new) {
        (Value::Object(old), Value::Object(new)) => generate_object(old, new, &path, ops),
        (Value::Array(old), Value::Array(new)) => generate_array(old, new, &path, ops),
        _ if old != new => ops.push(PatchOp::Replace {
            path,
            value: new.clone(),
        }),
        _ => {}
    }
}

fn generate_object(
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    path: &str,
    ops: &mut Vec<PatchOp>,
) {
    let mut deleted = false;
    for (key, old_value) in old.iter().rev() {
        let child = push_token(path, key);
        match new.get(key) {
            Some(new_value) => compare(old_value, new_value, child, ops),
            None => {
                ops.push(PatchOp::Remove { path: child });
                deleted = true;
            }
        }
    }

    if !deleted && new.len() == old.len() {
        return;
    }

    for (key, new_value) in new {
        if !old.contains_key(key) {
            ops.push(PatchOp::Add {
                path: push_token(path, key),
                value: new_value.clone(),
            });
        }
    }
}

fn generate_array(old: &[Value], new: &[Value], path: &str, ops: &mut Vec<PatchOp>) {
    for index in (0..old.len()).rev() {
        let child = format!("{}/{}", path, index);
        match new.get(index) {
            Some(new_value) => compare(&old[index], new_value, child, ops),
            None => ops.push(PatchOp::Remove { path: child }),
        }
    }

    for (index, new_value) in new.iter().enumerate().skip(old.len()) {
        ops.push(PatchOp::Add {
            path: format!("{}/{}", path, index),
            value: new_value.clone(),
        });
    }
}

fn push_token(path: &str, key: &str) -> String {
    format!("{}/{}", path, escape_token(key))
}

fn escape_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

// ============================================================================
// REPLAY
// ============================================================================

/// Apply `patch` to `doc` in order. Stops at the first failing operation;
/// operations before it stay applied.
pub fn apply_patch(doc: &mut Value, patch: &Patch) -> Result<(), PatchError> {
    for op in patch {
        apply_op(doc, op)?;
    }
    Ok(())
}

fn apply_op(doc: &mut Value, op: &PatchOp) -> Result<(), PatchError> {
    let path = op.path();
    if path.is_empty() {
        return match op {
            PatchOp::Add { value, .. } | PatchOp::Replace { value, .. } => {
                *doc = value.clone();
                Ok(())
            }
            PatchOp::Remove { .. } => Err(PatchError::RemoveRoot),
        };
    }

    let (parent_path, token) = path
        .rsplit_once('/')
        .filter(|_| path.starts_with('/'))
        .ok_or_else(|| PatchError::InvalidPointer {
            path: path.to_string(),
        })?;
    let parent = doc
        .pointer_mut(parent_path)
        .ok_or_else(|| PatchError::MissingTarget {
            path: path.to_string(),
        })?;

    match parent {
        Value::Object(map) => apply_to_object(map, &unescape_token(token), op),
        Value::Array(items) => apply_to_array(items, token, op),
        _ => Err(PatchError::NotAContainer {
            path: path.to_string(),
        }),
    }
}

fn apply_to_object(
    map: &mut Map<String, Value>,
    key: &str,
    op: &PatchOp,
) -> Result<(), PatchError> {
    let missing = || PatchError::MissingTarget {
        path: op.path().to_string(),
    };
    match op {
        PatchOp::Add { value, .. } => {
            map.insert(key.to_string(), value.clone());
        }
        PatchOp::Replace { value, .. } => {
            let slot = map.get_mut(key).ok_or_else(missing)?;
            *slot = value.clone();
        }
        PatchOp::Remove { .. } => {
            map.remove(key).ok_or_else(missing)?;
        }
    }
    Ok(())
}

fn apply_to_array(items: &mut Vec<Value>, token: &str, op: &PatchOp) -> Result<(), PatchError> {
    let len = items.len();
    if token == "-" {
        return match op {
            PatchOp::Add { value, .. } => {
                items.push(value.clone());
                Ok(())
            }
            _ => Err(PatchError::MissingTarget {
                path: op.path().to_string(),
            }),
        };
    }

    let index: usize = token.parse().map_err(|_| PatchError::InvalidPointer {
        path: op.path().to_string(),
    })?;
    let out_of_range = || PatchError::IndexOutOfRange {
        path: op.path().to_string(),
        index,
        len,
    };

    match op {
        PatchOp::Add { value, .. } => {
            if index > len {
                return Err(out_of_range());
            }
            items.insert(index, value.clone());
        }
        PatchOp::Replace { value, .. } => {
            let slot = items.get_mut(index).ok_or_else(out_of_range)?;
            *slot = value.clone();
        }
        PatchOp::Remove { .. } => {
            if index >= len {
                return Err(out_of_range());
            }
            items.remove(index);
        }
    }
    Ok(())
}
