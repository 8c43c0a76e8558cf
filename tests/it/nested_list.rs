//! spec.md §8 "Nested LIST of optional INT32": `[[1,2], null, [], [3,null,4],
//! [null]]` must keep empty-list, missing-list and list-containing-null
//! distinct all the way through to the written column (the Dremel unit
//! tests in `dremel.rs` already pin the level arrays this produces; this
//! test checks the same rows survive a real `write_column` call).

use parquet_writer::byte_sink::MemSink;
use parquet_writer::column_writer::{write_column, ColumnOptions};
use parquet_writer::schema::types::PhysicalType;
use parquet_writer::schema::{PrimitiveNode, Repetition, SchemaDescriptor, SchemaNode};
use parquet_writer::value::Value;

#[test]
fn list_of_optional_int32_round_trips_through_write_column() {
    let element = SchemaNode::Primitive(PrimitiveNode::new("element", Repetition::Optional, PhysicalType::Int32));
    let list = SchemaNode::list("values", Repetition::Optional, element);
    let schema = SchemaDescriptor::new(vec![list]);
    let descriptor = &schema.leaves[0];
    let path = schema.node_path_for(descriptor);

    let rows = vec![
        Value::List(vec![Value::I32(1), Value::I32(2)]),
        Value::Null,
        Value::List(vec![]),
        Value::List(vec![Value::I32(3), Value::Null, Value::I32(4)]),
        Value::List(vec![Value::Null]),
    ];

    let mut sink = MemSink::new();
    let result = write_column(&mut sink, descriptor, &path, &rows, &ColumnOptions::default()).unwrap();

    // 8 leaf occurrences total (2 + 0 + 0 + 3 + 1 "slots"), 4 of them non-null.
    assert_eq!(result.meta_data.num_values, 8);
    let stats = result.meta_data.statistics.unwrap();
    assert_eq!(stats.min_value, Some(1i32.to_le_bytes().to_vec()));
    assert_eq!(stats.max_value, Some(4i32.to_le_bytes().to_vec()));
    // null row, empty list, and the two null elements inside [3,null,4]/[null]
    assert_eq!(stats.null_count, Some(4));
}
