//! spec.md §8 "Basic round-trip": one column per primitive type,
//! written through the full [`ParquetWriter`] path, checking the
//! file-level invariants a reader depends on (PAR1 framing, offset
//! exactness) since this crate has no reader to assert the round-trip
//! values back.

use parquet_writer::byte_sink::MemSink;
use parquet_writer::schema::types::PhysicalType;
use parquet_writer::schema::{PrimitiveNode, Repetition, SchemaDescriptor, SchemaNode};
use parquet_writer::thrift::metadata::ConvertedType;
use parquet_writer::value::Value;
use parquet_writer::writer::{ParquetWriter, WriteOptions};

fn schema() -> SchemaDescriptor {
    SchemaDescriptor::new(vec![
        SchemaNode::Primitive(PrimitiveNode::new("bool", Repetition::Required, PhysicalType::Boolean)),
        SchemaNode::Primitive(PrimitiveNode::new("int", Repetition::Required, PhysicalType::Int32)),
        SchemaNode::Primitive(PrimitiveNode::new("bigint", Repetition::Required, PhysicalType::Int64)),
        SchemaNode::Primitive(PrimitiveNode::new("float", Repetition::Required, PhysicalType::Float)),
        SchemaNode::Primitive(PrimitiveNode::new("double", Repetition::Required, PhysicalType::Double)),
        SchemaNode::Primitive(
            PrimitiveNode::new("string", Repetition::Required, PhysicalType::ByteArray)
                .with_converted_type(ConvertedType::Utf8),
        ),
        SchemaNode::Primitive(PrimitiveNode::new("nullable", Repetition::Optional, PhysicalType::Boolean)),
    ])
}

#[test]
fn produces_a_well_framed_file() {
    let mut writer = ParquetWriter::new(MemSink::new(), schema(), WriteOptions::default()).unwrap();

    let mut columns = parquet_writer::row_group::ColumnValues::new();
    columns.insert(
        "bool".to_string(),
        vec![Value::Bool(true), Value::Bool(false), Value::Bool(true), Value::Bool(false)],
    );
    columns.insert(
        "int".to_string(),
        vec![Value::I32(0), Value::I32(127), Value::I32(0x7fff), Value::I32(0x7fffffff)],
    );
    columns.insert(
        "bigint".to_string(),
        vec![
            Value::I64(0),
            Value::I64(127),
            Value::I64(0x7fff),
            Value::I64(0x7fffffffffffffffu64 as i64),
        ],
    );
    columns.insert(
        "float".to_string(),
        vec![
            Value::F32(0.0),
            Value::F32(0.0001),
            Value::F32(123.456),
            Value::F32(1e38),
        ],
    );
    columns.insert(
        "double".to_string(),
        vec![
            Value::F64(0.0),
            Value::F64(0.0001),
            Value::F64(123.456),
            Value::F64(1e100),
        ],
    );
    columns.insert(
        "string".to_string(),
        vec![
            Value::Str("a".to_string()),
            Value::Str("b".to_string()),
            Value::Str("c".to_string()),
            Value::Str("d".to_string()),
        ],
    );
    columns.insert(
        "nullable".to_string(),
        vec![Value::Bool(true), Value::Bool(false), Value::Null, Value::Null],
    );

    writer.write(&columns, 4).unwrap();
    let sink = writer.finish().unwrap();
    let bytes = sink.into_vec();

    assert_eq!(&bytes[0..4], b"PAR1");
    assert_eq!(&bytes[bytes.len() - 4..], b"PAR1");
    let metadata_len = u32::from_le_bytes(bytes[bytes.len() - 8..bytes.len() - 4].try_into().unwrap());
    assert!((metadata_len as usize) < bytes.len());
}
