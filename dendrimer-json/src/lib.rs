//! JSON codec and file persistence for dendrimer documents.
//!
//! Converts the generic [`Value`] document to and from JSON text — the
//! persisted layout *is* the document, with no envelope or version field —
//! and composes the codec with encode/reconcile for whole-tree save and
//! load. Map entries keep their insertion order on the way out and their
//! document order on the way in.

use std::path::Path;

use log::debug;

use dendrimer_core::{
    EncodeOptions, Factory, Monomer, Report, Scalar, Value, ValueMap, encode, reconcile,
};

/// Error at the codec or file boundary.
///
/// Unlike data-shape problems inside reconciliation, these abort the whole
/// call.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("top-level json value is not an object")]
    NotADocument,
}

/// Converts a document value to a JSON value.
///
/// Non-finite floats have no JSON representation and become null.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Scalar(scalar) => scalar_to_json(scalar),
        Value::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(key, entry)| (key.clone(), to_json(entry)))
                .collect(),
        ),
        Value::List(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
    }
}

fn scalar_to_json(scalar: &Scalar) -> serde_json::Value {
    match scalar {
        Scalar::Null => serde_json::Value::Null,
        Scalar::Bool(b) => serde_json::Value::Bool(*b),
        Scalar::Int(i) => serde_json::Value::Number((*i).into()),
        Scalar::Float(x) => serde_json::Number::from_f64(*x)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Scalar::Text(s) => serde_json::Value::String(s.clone()),
    }
}

/// Converts a JSON value to a document value.
///
/// Numbers become `Int` when exactly representable as `i64`, `Float`
/// otherwise.
pub fn from_json(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Scalar(Scalar::Null),
        serde_json::Value::Bool(b) => Value::Scalar(Scalar::Bool(*b)),
        serde_json::Value::Number(n) => Value::Scalar(match n.as_i64() {
            Some(i) => Scalar::Int(i),
            None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
        }),
        serde_json::Value::String(s) => Value::Scalar(Scalar::Text(s.clone())),
        serde_json::Value::Array(items) => Value::List(items.iter().map(from_json).collect()),
        serde_json::Value::Object(map) => Value::Map(
            map.iter()
                .map(|(key, entry)| (key.clone(), from_json(entry)))
                .collect::<ValueMap>(),
        ),
    }
}

/// Renders a document as compact JSON text.
pub fn to_string(value: &Value) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&to_json(value))?)
}

/// Renders a document as indented JSON text.
pub fn to_string_pretty(value: &Value) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(&to_json(value))?)
}

/// Parses JSON text into a document.
pub fn from_str(text: &str) -> Result<Value, CodecError> {
    Ok(from_json(&serde_json::from_str(text)?))
}

/// Encodes a tree and writes it to `path` as indented JSON.
pub fn save_json(
    node: &dyn Monomer,
    path: impl AsRef<Path>,
    options: &EncodeOptions,
) -> Result<(), CodecError> {
    let path = path.as_ref();
    let text = to_string_pretty(&encode(node, options))?;
    std::fs::write(path, text)?;
    debug!("saved `{}` tree to {}", node.type_tag(), path.display());
    Ok(())
}

/// Reads JSON from `path` and reconciles it into an existing tree.
///
/// I/O and parse failures abort the call; entries the reconciler could not
/// apply are reported in the returned [`Report`], not as errors.
pub fn load_json(
    node: &mut dyn Monomer,
    path: impl AsRef<Path>,
    factory: &Factory,
) -> Result<Report, CodecError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let document = from_str(&text)?;
    if document.as_map().is_none() {
        return Err(CodecError::NotADocument);
    }
    debug!("loading `{}` tree from {}", node.type_tag(), path.display());
    Ok(reconcile(node, &document, factory))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Value {
        from_str(text).unwrap()
    }

    #[test]
    fn scalars_round_trip() {
        let text = r#"{"b":true,"i":-3,"f":0.5,"s":"hi","n":null}"#;
        let value = doc(text);
        let map = value.as_map().unwrap();

        assert_eq!(map.get("b"), Some(&Value::from(true)));
        assert_eq!(map.get("i"), Some(&Value::from(-3i64)));
        assert_eq!(map.get("f"), Some(&Value::from(0.5f64)));
        assert_eq!(map.get("s"), Some(&Value::from("hi")));
        assert_eq!(map.get("n"), Some(&Value::Scalar(Scalar::Null)));

        assert_eq!(to_string(&value).unwrap(), text);
    }

    #[test]
    fn key_order_is_preserved() {
        let value = doc(r#"{"z":1,"a":2,"m":3}"#);
        let keys: Vec<_> = value.as_map().unwrap().keys().cloned().collect();

        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(to_string(&value).unwrap(), r#"{"z":1,"a":2,"m":3}"#);
    }

    #[test]
    fn integral_numbers_become_ints_others_floats() {
        let value = doc(r#"{"i":7,"big":1e300}"#);
        let map = value.as_map().unwrap();

        assert_eq!(map.get("i"), Some(&Value::from(7i64)));
        assert!(matches!(
            map.get("big"),
            Some(Value::Scalar(Scalar::Float(_)))
        ));
    }

    #[test]
    fn nested_maps_and_lists_convert_structurally() {
        let value = doc(r#"{"B":[{"v":1},{"v":2}],"C":{"v":3}}"#);
        let map = value.as_map().unwrap();

        let b = map.get("B").unwrap().as_list().unwrap();
        assert_eq!(b.len(), 2);
        assert!(b[0].as_map().is_some());
        assert!(map.get("C").unwrap().as_map().is_some());
    }

    #[test]
    fn non_finite_float_serializes_as_null() {
        let value = Value::from(f64::INFINITY);
        assert_eq!(to_string(&value).unwrap(), "null");
    }

    #[test]
    fn parse_error_is_reported() {
        assert!(matches!(from_str("{not json"), Err(CodecError::Parse(_))));
    }
}
