//! spec.md §8 "Low-cardinality strings": 100 000 rows alternating
//! `'aaaa'`/`'bbbb'` in halves must pick RLE_DICTIONARY (spec.md §8
//! testable property 5: `len/distinct > 2`).

use parquet_writer::byte_sink::MemSink;
use parquet_writer::column_writer::{write_column, ColumnOptions};
use parquet_writer::encoding::Encoding;
use parquet_writer::schema::types::PhysicalType;
use parquet_writer::schema::{PrimitiveNode, Repetition, SchemaDescriptor, SchemaNode};
use parquet_writer::thrift::metadata::ConvertedType;
use parquet_writer::value::Value;

#[test]
fn alternating_strings_use_dictionary_encoding() {
    let root = SchemaNode::Primitive(
        PrimitiveNode::new("tag", Repetition::Required, PhysicalType::ByteArray)
            .with_converted_type(ConvertedType::Utf8),
    );
    let schema = SchemaDescriptor::new(vec![root]);
    let descriptor = &schema.leaves[0];
    let path = schema.node_path_for(descriptor);

    let mut values = Vec::with_capacity(100_000);
    values.extend(std::iter::repeat(Value::Str("aaaa".to_string())).take(50_000));
    values.extend(std::iter::repeat(Value::Str("bbbb".to_string())).take(50_000));

    let mut sink = MemSink::new();
    let result = write_column(&mut sink, descriptor, &path, &values, &ColumnOptions::default()).unwrap();

    assert!(result.meta_data.encodings.contains(&Encoding::RleDictionary.to_thrift()));
    assert_eq!(result.meta_data.num_values, 100_000);
}
