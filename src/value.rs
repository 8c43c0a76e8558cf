//! A tagged runtime value plus the handful of nested-shape normalizers
//! the Dremel shredder and the Thrift writer both need.
//!
//! parquet2 never needed this: it writes from pre-typed Arrow arrays.
//! This crate writes from row-shaped user data, so callers hand us a
//! `Value` tree per column and we do the dynamic dispatch parquet2's
//! auto-detect and Thrift encoders do on JS values.

use std::collections::BTreeMap;

/// A single logical value, or one of the nested shapes a schema path
/// may need to traverse (list, map, struct).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    /// UTF-8 text (BYTE_ARRAY + UTF8).
    Str(String),
    /// Opaque binary (BYTE_ARRAY, or FIXED_LEN_BYTE_ARRAY once unconverted).
    Bytes(Vec<u8>),
    /// Milliseconds since the Unix epoch.
    Date(i64),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Struct(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_struct(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Struct(m) => Some(m),
            _ => None,
        }
    }
}

/// The four concrete shapes MAP input is allowed to arrive in, per
/// spec.md §9 "Unusual runtime shapes": an ordered key-value
/// container (`Value::Map`), an array of `(key, value)` pairs, an
/// array of `{key, value}` structs, or a plain key->value struct.
///
/// `normalize` folds all four into the canonical `[(key, value), ..]`
/// shape the Dremel shredder's MAP handling expects.
pub fn normalize_map_input(v: &Value) -> crate::error::Result<Vec<(Value, Value)>> {
    match v {
        Value::Map(pairs) => Ok(pairs.clone()),
        Value::List(items) => items
            .iter()
            .map(|item| match item {
                // array of [key, value] pairs
                Value::List(pair) if pair.len() == 2 => Ok((pair[0].clone(), pair[1].clone())),
                // array of {key, value} records
                Value::Struct(s) => {
                    let key = s.get("key").cloned().ok_or_else(|| {
                        general_err!("map entry is missing a `key` field")
                    })?;
                    let value = s.get("value").cloned().unwrap_or(Value::Null);
                    Ok((key, value))
                }
                _ => Err(general_err!(
                    "map entry must be a [key, value] pair or {{key, value}} record"
                )),
            })
            .collect(),
        Value::Struct(fields) => Ok(fields
            .iter()
            .map(|(k, v)| (Value::Str(k.clone()), v.clone()))
            .collect()),
        Value::Null => Ok(vec![]),
        _ => Err(general_err!(
            "expected a map-like value (Map, array of pairs, array of records, or a record)"
        )),
    }
}
