//! spec.md §8 "MAP round-trip": rows with struct values, some empty
//! or missing — `[{a:{count:1},b:{count:2}}, {}, {c:{count:null}}]`.

use std::collections::BTreeMap;

use parquet_writer::byte_sink::MemSink;
use parquet_writer::column_writer::{write_column, ColumnOptions};
use parquet_writer::schema::types::PhysicalType;
use parquet_writer::schema::{PrimitiveNode, Repetition, SchemaDescriptor, SchemaNode};
use parquet_writer::value::Value;

fn entry(count: Option<i32>) -> Value {
    let mut fields = BTreeMap::new();
    fields.insert("count".to_string(), count.map(Value::I32).unwrap_or(Value::Null));
    Value::Struct(fields)
}

#[test]
fn sparse_map_rows_keep_empty_vs_missing_vs_null_value_distinct() {
    let key = SchemaNode::Primitive(PrimitiveNode::new("key", Repetition::Required, PhysicalType::ByteArray));
    let count_field = SchemaNode::Primitive(PrimitiveNode::new("count", Repetition::Optional, PhysicalType::Int32));
    let value = SchemaNode::struct_("value", Repetition::Optional, vec![count_field]);
    let map = SchemaNode::map("tags", Repetition::Optional, key, value);
    let schema = SchemaDescriptor::new(vec![map]);

    let count_leaf = schema
        .leaves
        .iter()
        .find(|l| l.path.last().map(|s| s.as_str()) == Some("count"))
        .unwrap();
    let path = schema.node_path_for(count_leaf);

    let mut row1 = BTreeMap::new();
    row1.insert("a".to_string(), entry(Some(1)));
    row1.insert("b".to_string(), entry(Some(2)));

    let mut row3 = BTreeMap::new();
    row3.insert("c".to_string(), entry(None));

    let rows = vec![
        Value::Struct(row1),
        Value::Struct(BTreeMap::new()), // empty map
        Value::Struct(row3),
    ];

    let mut sink = MemSink::new();
    let result = write_column(&mut sink, count_leaf, &path, &rows, &ColumnOptions::default()).unwrap();

    // {a:1, b:2} contribute 2 non-null entries, the empty map and the
    // null-valued `c` entry each contribute one null slot.
    assert_eq!(result.meta_data.num_values, 4);
    let stats = result.meta_data.statistics.unwrap();
    assert_eq!(stats.null_count, Some(2));
    assert_eq!(stats.min_value, Some(1i32.to_le_bytes().to_vec()));
    assert_eq!(stats.max_value, Some(2i32.to_le_bytes().to_vec()));
}
