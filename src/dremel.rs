//! The Dremel shredder (spec.md §4.6): walks a schema path and a
//! column's row-shaped values together, emitting one
//! `(value?, definition_level, repetition_level)` triple per leaf
//! occurrence. parquet2 never needs this — it writes from Arrow
//! arrays that already carry validity bitmaps and offsets per level;
//! this crate accepts row-shaped [`Value`] trees instead, so shredding
//! has to be built from spec.md's recursive description directly.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::schema::{Repetition, SchemaNode};
use crate::thrift::metadata::ConvertedType;
use crate::value::{normalize_map_input, Value};

/// One column's flattened leaf values plus their levels. `values`
/// holds only the non-null occurrences; `num_nulls` plus the gaps in
/// `definition_levels` (entries `< max_def_level`) account for the
/// rest.
#[derive(Debug, Clone, Default)]
pub struct ShreddedColumn {
    pub values: Vec<Value>,
    pub definition_levels: Vec<i16>,
    pub repetition_levels: Vec<i16>,
    pub num_nulls: usize,
}

/// Shreds `values` (one entry per top-level row) against `path`, the
/// chain of schema nodes from the root field down to the leaf
/// (see [`crate::schema::SchemaDescriptor::node_path_for`]).
pub fn shred(path: &[&SchemaNode], values: &[Value]) -> Result<ShreddedColumn> {
    let mut out = ShreddedColumn::default();
    for v in values {
        shred_node(path, 0, v, 0, 0, false, &mut out)?;
    }
    Ok(out)
}

fn shred_node(
    path: &[&SchemaNode],
    idx: usize,
    v: &Value,
    d: i16,
    r: i16,
    allow_null: bool,
    out: &mut ShreddedColumn,
) -> Result<()> {
    let node = path[idx];

    if idx == path.len() - 1 {
        return shred_leaf(node, v, d, r, allow_null, out);
    }

    match node {
        SchemaNode::Group(g) if g.repetition == Repetition::Repeated => {
            shred_repeated(path, idx, v, d, r, out)
        }
        SchemaNode::Group(g) if g.repetition == Repetition::Optional => {
            if v.is_null() {
                shred_node(path, idx + 1, &Value::Null, d, r, true, out)
            } else {
                let child_value = extract_into_child(node, path[idx + 1], v)?;
                shred_node(path, idx + 1, &child_value, d + 1, r, false, out)
            }
        }
        SchemaNode::Group(_) => {
            // REQUIRED.
            if v.is_null() {
                if !allow_null {
                    return Err(general_err!(
                        "required value missing at `{}`",
                        node.name()
                    ));
                }
                shred_node(path, idx + 1, &Value::Null, d, r, allow_null, out)
            } else {
                let child_value = extract_into_child(node, path[idx + 1], v)?;
                shred_node(path, idx + 1, &child_value, d, r, false, out)
            }
        }
        SchemaNode::Primitive(_) => unreachable!("a primitive cannot have a child in the path"),
    }
}

fn shred_leaf(node: &SchemaNode, v: &Value, d: i16, r: i16, allow_null: bool, out: &mut ShreddedColumn) -> Result<()> {
    if v.is_null() {
        if node.repetition() == Repetition::Required && !allow_null {
            return Err(general_err!("required value missing at `{}`", node.name()));
        }
        out.definition_levels.push(d);
        out.repetition_levels.push(r);
        out.num_nulls += 1;
    } else {
        let def = if node.repetition() == Repetition::Required { d } else { d + 1 };
        out.definition_levels.push(def);
        out.repetition_levels.push(r);
        out.values.push(v.clone());
    }
    Ok(())
}

fn shred_repeated(path: &[&SchemaNode], idx: usize, v: &Value, d: i16, r: i16, out: &mut ShreddedColumn) -> Result<()> {
    let items = match v {
        Value::Null => None,
        Value::List(items) if items.is_empty() => None,
        Value::List(items) => Some(items),
        other => {
            return Err(general_err!(
                "expected a list at `{}`, got {:?}",
                path[idx].name(),
                other
            ))
        }
    };

    match items {
        None => shred_node(path, idx + 1, &Value::Null, d, r, true, out),
        Some(items) => {
            for (i, item) in items.iter().enumerate() {
                let r_i = if i == 0 { r } else { r + 1 };
                let child_value = extract_into_child(path[idx], path[idx + 1], item)?;
                shred_node(path, idx + 1, &child_value, d + 1, r_i, false, out)?;
            }
            Ok(())
        }
    }
}

/// Resolves the value a child node sees, given its parent and the
/// parent's own value (spec.md §4.6 "Child-value extraction").
fn extract_into_child(parent: &SchemaNode, child: &SchemaNode, v: &Value) -> Result<Value> {
    match parent {
        SchemaNode::Group(g) if g.converted_type == Some(ConvertedType::List) => Ok(v.clone()),
        SchemaNode::Group(g) if g.converted_type == Some(ConvertedType::Map) => {
            let pairs = normalize_map_input(v)?;
            let items = pairs
                .into_iter()
                .map(|(k, val)| {
                    let mut s = BTreeMap::new();
                    s.insert("key".to_string(), k);
                    s.insert("value".to_string(), val);
                    Value::Struct(s)
                })
                .collect();
            Ok(Value::List(items))
        }
        SchemaNode::Group(g) if g.name == "list" => Ok(v.clone()),
        SchemaNode::Group(g) if g.name == "key_value" => struct_field(v, child.name()),
        SchemaNode::Group(_) => struct_field(v, child.name()),
        SchemaNode::Primitive(_) => unreachable!("a primitive cannot be a parent"),
    }
}

fn struct_field(v: &Value, name: &str) -> Result<Value> {
    match v {
        Value::Struct(fields) => Ok(fields.get(name).cloned().unwrap_or(Value::Null)),
        other => Err(general_err!(
            "expected a record with field `{}`, got {:?}",
            name,
            other
        )),
    }
}
