//! spec.md §8 "Sparse booleans": 10 000 values, all null but four,
//! must still produce a tiny file (the levels/value bodies compress
//! away almost entirely).

use parquet_writer::column_writer::{write_column, ColumnOptions};
use parquet_writer::byte_sink::MemSink;
use parquet_writer::schema::types::PhysicalType;
use parquet_writer::schema::{PrimitiveNode, Repetition, SchemaDescriptor, SchemaNode};
use parquet_writer::value::Value;

#[test]
fn ten_thousand_mostly_null_booleans_stay_under_200_bytes() {
    let root = SchemaNode::Primitive(PrimitiveNode::new("flag", Repetition::Optional, PhysicalType::Boolean));
    let schema = SchemaDescriptor::new(vec![root]);
    let descriptor = &schema.leaves[0];
    let path = schema.node_path_for(descriptor);

    let mut values = vec![Value::Null; 10_000];
    values[10] = Value::Bool(true);
    values[2_000] = Value::Bool(false);
    values[5_000] = Value::Bool(true);
    values[9_999] = Value::Bool(false);

    let mut sink = MemSink::new();
    let result = write_column(&mut sink, descriptor, &path, &values, &ColumnOptions::default()).unwrap();

    assert_eq!(result.meta_data.num_values, 10_000);
    assert!(
        result.meta_data.total_compressed_size <= 200,
        "expected <= 200 bytes, got {}",
        result.meta_data.total_compressed_size
    );
}
