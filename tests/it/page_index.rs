//! spec.md §8 "Multi-page with column+offset index": a column split
//! across several pages must produce a `ColumnIndex`/`OffsetIndex`
//! with exact per-page min/max/first_row_index and an ASCENDING
//! `boundary_order`.
//!
//! INT32 costs 4 estimated bytes/row (`estimated_value_bytes`), so a
//! 40-byte page budget holds exactly 10 rows before the 11th pushes it
//! over — chosen so the page boundaries are exact without depending on
//! any paging constant beyond the one this crate actually implements.

use parquet_writer::byte_sink::MemSink;
use parquet_writer::column_writer::{write_column, ColumnOptions};
use parquet_writer::schema::types::PhysicalType;
use parquet_writer::schema::{PrimitiveNode, Repetition, SchemaDescriptor, SchemaNode};
use parquet_writer::thrift::metadata::BoundaryOrder;
use parquet_writer::value::Value;

#[test]
fn ascending_int32_column_splits_into_exact_pages_with_an_index() {
    let root = SchemaNode::Primitive(PrimitiveNode::new("n", Repetition::Required, PhysicalType::Int32));
    let schema = SchemaDescriptor::new(vec![root]);
    let descriptor = &schema.leaves[0];
    let path = schema.node_path_for(descriptor);

    let values: Vec<Value> = (0..100).map(Value::I32).collect();
    let options = ColumnOptions {
        data_page_size_limit: 40,
        ..ColumnOptions::default()
    };

    let mut sink = MemSink::new();
    let result = write_column(&mut sink, descriptor, &path, &values, &options).unwrap();

    assert_eq!(result.page_index.len(), 10);

    let column_index = result.page_index.build_column_index(PhysicalType::Int32, None).unwrap();
    assert_eq!(column_index.boundary_order, BoundaryOrder::Ascending);
    assert_eq!(column_index.min_values[0], 0i32.to_le_bytes().to_vec());
    assert_eq!(column_index.max_values[0], 9i32.to_le_bytes().to_vec());
    assert_eq!(column_index.min_values[9], 90i32.to_le_bytes().to_vec());
    assert_eq!(column_index.max_values[9], 99i32.to_le_bytes().to_vec());
    assert!(column_index.null_pages.iter().all(|&n| !n));

    let offset_index = result.page_index.build_offset_index();
    let first_rows: Vec<i64> = offset_index.page_locations.iter().map(|p| p.first_row_index).collect();
    assert_eq!(first_rows, (0..10).map(|i| i * 10).collect::<Vec<i64>>());
}
