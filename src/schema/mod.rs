//! The logical schema tree (spec.md §3, §4.5): a preorder-linearized
//! set of [`SchemaNode`]s, auto-detected from column values or
//! supplied by the caller, flattened into [`ColumnDescriptor`] leaves
//! the way parquet2's `SchemaDescriptor::new` walks `ParquetType`
//! (`metadata/schema_descriptor.rs`), generalized here to build the
//! tree itself rather than only describe one handed to it.

pub mod types;

use crate::error::Result;
use crate::thrift::metadata::{ConvertedType, FieldRepetitionType, SchemaElement};
use crate::value::Value;
use types::PhysicalType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetition {
    Required,
    Optional,
    Repeated,
}

impl Repetition {
    fn to_thrift(self) -> FieldRepetitionType {
        match self {
            Repetition::Required => FieldRepetitionType::Required,
            Repetition::Optional => FieldRepetitionType::Optional,
            Repetition::Repeated => FieldRepetitionType::Repeated,
        }
    }
}

/// A leaf node: one that carries a primitive on-disk type.
#[derive(Debug, Clone)]
pub struct PrimitiveNode {
    pub name: String,
    pub repetition: Repetition,
    pub physical_type: PhysicalType,
    pub converted_type: Option<ConvertedType>,
    pub scale: Option<i32>,
    pub precision: Option<i32>,
}

impl PrimitiveNode {
    pub fn new(name: &str, repetition: Repetition, physical_type: PhysicalType) -> Self {
        Self {
            name: name.to_string(),
            repetition,
            physical_type,
            converted_type: None,
            scale: None,
            precision: None,
        }
    }

    pub fn with_converted_type(mut self, converted_type: ConvertedType) -> Self {
        self.converted_type = Some(converted_type);
        self
    }

    pub fn with_decimal(mut self, precision: i32, scale: i32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self.converted_type = Some(ConvertedType::Decimal);
        self
    }
}

/// An internal node: a struct, or a LIST/MAP wrapper (spec.md §3
/// "LIST pattern"/"MAP pattern"). Wrappers are built via
/// [`SchemaNode::list`]/[`SchemaNode::map`] so callers never hand-rig
/// the `list.element`/`key_value.key,value` shape themselves.
#[derive(Debug, Clone)]
pub struct GroupNode {
    pub name: String,
    pub repetition: Repetition,
    pub converted_type: Option<ConvertedType>,
    pub children: Vec<SchemaNode>,
}

#[derive(Debug, Clone)]
pub enum SchemaNode {
    Primitive(PrimitiveNode),
    Group(GroupNode),
}

impl SchemaNode {
    pub fn name(&self) -> &str {
        match self {
            SchemaNode::Primitive(p) => &p.name,
            SchemaNode::Group(g) => &g.name,
        }
    }

    pub fn repetition(&self) -> Repetition {
        match self {
            SchemaNode::Primitive(p) => p.repetition,
            SchemaNode::Group(g) => g.repetition,
        }
    }

    /// `<field>.converted_type = LIST` -> single `REPEATED` child
    /// `list` -> single child `element`.
    pub fn list(name: &str, repetition: Repetition, element: SchemaNode) -> Self {
        let mut element = element;
        rename(&mut element, "element");
        let list_wrapper = GroupNode {
            name: "list".to_string(),
            repetition: Repetition::Repeated,
            converted_type: None,
            children: vec![element],
        };
        SchemaNode::Group(GroupNode {
            name: name.to_string(),
            repetition,
            converted_type: Some(ConvertedType::List),
            children: vec![SchemaNode::Group(list_wrapper)],
        })
    }

    /// `<field>.converted_type = MAP` -> single `REPEATED` child
    /// `key_value` -> two children `key` (required), `value`.
    pub fn map(name: &str, repetition: Repetition, mut key: SchemaNode, value: SchemaNode) -> Self {
        rename(&mut key, "key");
        let mut value = value;
        rename(&mut value, "value");
        let key_value = GroupNode {
            name: "key_value".to_string(),
            repetition: Repetition::Repeated,
            converted_type: None,
            children: vec![key, value],
        };
        SchemaNode::Group(GroupNode {
            name: name.to_string(),
            repetition,
            converted_type: Some(ConvertedType::Map),
            children: vec![SchemaNode::Group(key_value)],
        })
    }

    pub fn struct_(name: &str, repetition: Repetition, children: Vec<SchemaNode>) -> Self {
        SchemaNode::Group(GroupNode {
            name: name.to_string(),
            repetition,
            converted_type: None,
            children,
        })
    }

    fn to_thrift_elements(&self, out: &mut Vec<SchemaElement>) {
        match self {
            SchemaNode::Primitive(p) => out.push(SchemaElement {
                type_: Some(p.physical_type.to_thrift()),
                type_length: p.physical_type.type_length(),
                repetition_type: Some(p.repetition.to_thrift()),
                name: p.name.clone(),
                num_children: None,
                converted_type: p.converted_type,
                scale: p.scale,
                precision: p.precision,
                field_id: None,
                logical_type: None,
            }),
            SchemaNode::Group(g) => {
                out.push(SchemaElement {
                    type_: None,
                    type_length: None,
                    repetition_type: Some(g.repetition.to_thrift()),
                    name: g.name.clone(),
                    num_children: Some(g.children.len() as i32),
                    converted_type: g.converted_type,
                    scale: None,
                    precision: None,
                    field_id: None,
                    logical_type: None,
                });
                for child in &g.children {
                    child.to_thrift_elements(out);
                }
            }
        }
    }
}

fn rename(node: &mut SchemaNode, name: &str) {
    match node {
        SchemaNode::Primitive(p) => p.name = name.to_string(),
        SchemaNode::Group(g) => g.name = name.to_string(),
    }
}

/// A leaf column's position and levels within the tree, the way
/// parquet2's `ColumnDescriptor` describes one primitive column
/// reached by `path`.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub path: Vec<String>,
    pub max_def_level: i16,
    pub max_rep_level: i16,
    pub physical_type: PhysicalType,
    pub converted_type: Option<ConvertedType>,
    /// Index into `SchemaDescriptor::roots` this leaf descends from.
    pub root_index: usize,
}

impl ColumnDescriptor {
    pub fn name(&self) -> &str {
        self.path.last().map(|s| s.as_str()).unwrap_or("")
    }
}

/// The full schema: top-level (root) fields plus every leaf reachable
/// from them, flattened in DFS order.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    pub roots: Vec<SchemaNode>,
    pub leaves: Vec<ColumnDescriptor>,
}

impl SchemaDescriptor {
    pub fn new(roots: Vec<SchemaNode>) -> Self {
        let mut leaves = Vec::new();
        for (root_index, root) in roots.iter().enumerate() {
            let mut path = Vec::new();
            build_tree(root, 0, 0, root_index, &mut path, &mut leaves);
        }
        Self { roots, leaves }
    }

    /// Leaves reachable from the root field named `name`, in schema
    /// order. The row-group writer calls the column writer once per
    /// entry here.
    pub fn leaves_for_root(&self, name: &str) -> Vec<&ColumnDescriptor> {
        self.leaves.iter().filter(|l| l.path[0] == name).collect()
    }

    pub fn root(&self, name: &str) -> Option<&SchemaNode> {
        self.roots.iter().find(|r| r.name() == name)
    }

    /// The chain of schema nodes from the root field down to `leaf`,
    /// resolved by name. The Dremel shredder walks this chain one
    /// level per recursive call.
    pub fn node_path_for<'a>(&'a self, leaf: &ColumnDescriptor) -> Vec<&'a SchemaNode> {
        let root = &self.roots[leaf.root_index];
        let mut chain = vec![root];
        let mut current = root;
        for name in &leaf.path[1..] {
            let next = match current {
                SchemaNode::Group(g) => g
                    .children
                    .iter()
                    .find(|c| c.name() == name)
                    .expect("column path must resolve against its schema tree"),
                SchemaNode::Primitive(_) => unreachable!("primitive nodes have no children"),
            };
            chain.push(next);
            current = next;
        }
        chain
    }

    pub fn to_thrift_elements(&self, name: &str) -> Vec<SchemaElement> {
        let mut out = vec![SchemaElement {
            type_: None,
            type_length: None,
            repetition_type: None,
            name: name.to_string(),
            num_children: Some(self.roots.len() as i32),
            converted_type: None,
            scale: None,
            precision: None,
            field_id: None,
            logical_type: None,
        }];
        for root in &self.roots {
            root.to_thrift_elements(&mut out);
        }
        out
    }
}

fn build_tree(
    node: &SchemaNode,
    mut max_rep_level: i16,
    mut max_def_level: i16,
    root_index: usize,
    path: &mut Vec<String>,
    leaves: &mut Vec<ColumnDescriptor>,
) {
    path.push(node.name().to_string());
    match node.repetition() {
        Repetition::Optional => max_def_level += 1,
        Repetition::Repeated => {
            max_def_level += 1;
            max_rep_level += 1;
        }
        Repetition::Required => {}
    }

    match node {
        SchemaNode::Primitive(p) => {
            leaves.push(ColumnDescriptor {
                path: path.clone(),
                max_def_level,
                max_rep_level,
                physical_type: p.physical_type,
                converted_type: p.converted_type,
                root_index,
            });
        }
        SchemaNode::Group(g) => {
            for child in &g.children {
                build_tree(child, max_rep_level, max_def_level, root_index, path, leaves);
            }
        }
    }
    path.pop();
}

/// A caller hint for one column: force its physical type, or force
/// nullability, or supply a full replacement node. Supplying both
/// `type_hint` and `override_node` is a `SchemaConflict` (spec.md §4.5).
/// `FIXED_LEN_BYTE_ARRAY` carries its length inline in `type_hint`
/// (`PhysicalType::FixedLenByteArray(n)`), so no separate length field
/// is needed here.
#[derive(Debug, Clone, Default)]
pub struct ColumnOverride {
    pub type_hint: Option<PhysicalType>,
    pub nullable: Option<bool>,
    pub override_node: Option<SchemaNode>,
}

/// Auto-detects one top-level column's schema node from its values,
/// applying `override_` if given (spec.md §4.5).
pub fn column_schema_from_values(
    name: &str,
    values: &[Value],
    override_: Option<&ColumnOverride>,
) -> Result<SchemaNode> {
    if let Some(o) = override_ {
        if let Some(node) = &o.override_node {
            if o.type_hint.is_some() {
                return Err(general_err!(
                    "column `{}` has both an override schema node and a type hint",
                    name
                ));
            }
            let mut node = node.clone();
            rename(&mut node, name);
            return Ok(node);
        }
    }

    let has_null = values.iter().any(Value::is_null);
    let mut detected: Option<PhysicalType> = None;
    let mut converted: Option<ConvertedType> = None;

    for v in values {
        let (vt, vc) = match v {
            Value::Null => continue,
            Value::Bool(_) => (PhysicalType::Boolean, None),
            Value::I32(_) => (PhysicalType::Int32, None),
            Value::I64(_) => (PhysicalType::Int64, None),
            Value::F32(_) => (PhysicalType::Float, None),
            Value::F64(_) => (PhysicalType::Double, None),
            Value::Str(_) => (PhysicalType::ByteArray, Some(ConvertedType::Utf8)),
            Value::Bytes(_) => (PhysicalType::ByteArray, None),
            Value::Date(_) => (PhysicalType::Int64, Some(ConvertedType::TimestampMillis)),
            Value::List(_) | Value::Map(_) | Value::Struct(_) => {
                return Err(general_err!(
                    "column `{}` has nested values but no explicit schema override was given",
                    name
                ));
            }
        };

        match detected {
            None => {
                detected = Some(vt);
                converted = vc;
            }
            Some(PhysicalType::Int32) if vt == PhysicalType::Float || vt == PhysicalType::Double => {
                detected = Some(PhysicalType::Double);
                converted = None;
            }
            Some(PhysicalType::Float) | Some(PhysicalType::Double) if vt == PhysicalType::Int32 => {
                // keep the wider floating type already detected
            }
            Some(current) if current == vt => {
                if converted != vc {
                    return Err(general_err!("column `{}` has inconsistent value shapes", name));
                }
            }
            Some(current) => {
                return Err(general_err!(
                    "column `{}` mixes incompatible value types {:?} and {:?}",
                    name,
                    current,
                    vt
                ));
            }
        }
    }

    let physical_type = if let Some(o) = override_ {
        o.type_hint.unwrap_or_else(|| detected.unwrap_or(PhysicalType::ByteArray))
    } else {
        detected.unwrap_or(PhysicalType::ByteArray)
    };

    let nullable = override_
        .and_then(|o| o.nullable)
        .unwrap_or(has_null || detected.is_none());

    let repetition = if nullable { Repetition::Optional } else { Repetition::Required };

    let mut node = PrimitiveNode::new(name, repetition, physical_type);
    if detected.is_some() {
        node.converted_type = converted;
    }

    Ok(SchemaNode::Primitive(node))
}

/// `count(REPEATED on path)` (spec.md §4.5).
pub fn max_repetition(path: &[Repetition]) -> i16 {
    path.iter().filter(|r| **r == Repetition::Repeated).count() as i16
}

/// `count(non-REQUIRED in path[1..])` (spec.md §4.5).
pub fn max_definition(path: &[Repetition]) -> i16 {
    path.iter().skip(1).filter(|r| **r != Repetition::Required).count() as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_int32_values_are_required() {
        let node = column_schema_from_values("x", &[Value::I32(1), Value::I32(2)], None).unwrap();
        match node {
            SchemaNode::Primitive(p) => {
                assert_eq!(p.physical_type, PhysicalType::Int32);
                assert_eq!(p.repetition, Repetition::Required);
            }
            _ => panic!("expected primitive"),
        }
    }

    #[test]
    fn null_present_makes_column_optional() {
        let node = column_schema_from_values("x", &[Value::I32(1), Value::Null], None).unwrap();
        match node {
            SchemaNode::Primitive(p) => assert_eq!(p.repetition, Repetition::Optional),
            _ => panic!("expected primitive"),
        }
    }

    #[test]
    fn int_and_double_widen_to_double() {
        let node = column_schema_from_values("x", &[Value::I32(1), Value::F64(2.5)], None).unwrap();
        match node {
            SchemaNode::Primitive(p) => assert_eq!(p.physical_type, PhysicalType::Double),
            _ => panic!("expected primitive"),
        }
    }

    #[test]
    fn bool_and_string_mix_is_rejected() {
        let result = column_schema_from_values("x", &[Value::Bool(true), Value::Str("a".into())], None);
        assert!(result.is_err());
    }

    #[test]
    fn all_null_column_falls_back_to_optional_byte_array() {
        let node = column_schema_from_values("x", &[Value::Null, Value::Null], None).unwrap();
        match node {
            SchemaNode::Primitive(p) => {
                assert_eq!(p.physical_type, PhysicalType::ByteArray);
                assert_eq!(p.repetition, Repetition::Optional);
            }
            _ => panic!("expected primitive"),
        }
    }

    #[test]
    fn strings_get_utf8_converted_type() {
        let node = column_schema_from_values("x", &[Value::Str("a".into())], None).unwrap();
        match node {
            SchemaNode::Primitive(p) => assert_eq!(p.converted_type, Some(ConvertedType::Utf8)),
            _ => panic!("expected primitive"),
        }
    }

    #[test]
    fn type_hint_and_override_node_conflict() {
        let over = ColumnOverride {
            type_hint: Some(PhysicalType::Int32),
            override_node: Some(SchemaNode::Primitive(PrimitiveNode::new(
                "x",
                Repetition::Required,
                PhysicalType::Int64,
            ))),
            nullable: None,
        };
        let result = column_schema_from_values("x", &[Value::I32(1)], Some(&over));
        assert!(result.is_err());
    }

    #[test]
    fn list_wrapper_has_expected_shape() {
        let element = SchemaNode::Primitive(PrimitiveNode::new("x", Repetition::Optional, PhysicalType::Int32));
        let list = SchemaNode::list("values", Repetition::Optional, element);
        let descriptor = SchemaDescriptor::new(vec![list]);
        assert_eq!(descriptor.leaves.len(), 1);
        let leaf = &descriptor.leaves[0];
        assert_eq!(leaf.path, vec!["values", "list", "element"]);
        // values(OPTIONAL) + list(REPEATED) + element(OPTIONAL) => def=3, rep=1
        assert_eq!(leaf.max_def_level, 3);
        assert_eq!(leaf.max_rep_level, 1);
    }

    #[test]
    fn map_wrapper_has_expected_shape() {
        let key = SchemaNode::Primitive(PrimitiveNode::new("key", Repetition::Required, PhysicalType::ByteArray));
        let value = SchemaNode::Primitive(PrimitiveNode::new("value", Repetition::Optional, PhysicalType::Int32));
        let map = SchemaNode::map("m", Repetition::Optional, key, value);
        let descriptor = SchemaDescriptor::new(vec![map]);
        assert_eq!(descriptor.leaves.len(), 2);
        assert_eq!(descriptor.leaves[0].path, vec!["m", "key_value", "key"]);
        assert_eq!(descriptor.leaves[1].path, vec!["m", "key_value", "value"]);
    }

    #[test]
    fn max_repetition_and_definition_helpers() {
        let path = [Repetition::Optional, Repetition::Repeated, Repetition::Required];
        assert_eq!(max_repetition(&path), 1);
        assert_eq!(max_definition(&path), 1); // skips path[0]
    }
}
