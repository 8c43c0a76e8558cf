//! Writes one row group: every column chunk back to back, then folds
//! their metadata into a `RowGroup` (spec.md §4.8 "Parquet writer
//! algorithm", steps covering one row group). Grounded on parquet2's
//! `write/row_group.rs` `write_row_group` (the synchronous half only —
//! its `_async` twin is this crate's non-goal, spec.md §5).

use std::collections::BTreeMap;

use crate::byte_sink::ByteSink;
use crate::column_writer::{write_column, ColumnChunkResult, ColumnOptions};
use crate::error::Result;
use crate::schema::{ColumnDescriptor, SchemaDescriptor, SchemaNode};
use crate::thrift::metadata::{ColumnChunk, RowGroup};
use crate::value::Value;

/// One root field's worth of row-shaped values, keyed by field name
/// (the unit `parquetWriteFile`/`parquetWriteBuffer` group rows into
/// per spec.md §3 "Ownership/Lifecycle").
pub type ColumnValues = BTreeMap<String, Vec<Value>>;

/// parquet2's `calc_column_file_offset`: a chunk's `file_offset`
/// points at its dictionary page if it has one, else its first data
/// page.
fn calc_column_file_offset(meta_data: &crate::thrift::metadata::ColumnMetaData) -> i64 {
    meta_data
        .dictionary_page_offset
        .filter(|&x| x > 0)
        .unwrap_or(meta_data.data_page_offset)
}

/// Writes every column chunk in `schema` against `columns`, in schema
/// order, returning the row group's Thrift metadata plus every
/// column's page-index builder (rendered later, once every row group
/// in the file has been written — spec.md §6 places the page index
/// after all row groups and before the footer).
pub fn write_row_group<S: ByteSink + ?Sized>(
    sink: &mut S,
    schema: &SchemaDescriptor,
    root_names: &[String],
    columns: &ColumnValues,
    num_rows: usize,
    options: &ColumnOptions,
) -> Result<(RowGroup, Vec<(ColumnDescriptor, ColumnChunkResult)>)> {
    let mut chunks = Vec::new();
    let mut results = Vec::new();

    for name in root_names {
        let values = columns
            .get(name)
            .ok_or_else(|| general_err!("no values were supplied for column `{}`", name))?;
        if values.len() != num_rows {
            return Err(general_err!(
                "column `{}` has {} rows but the row group has {}",
                name,
                values.len(),
                num_rows
            ));
        }

        for descriptor in schema.leaves_for_root(name) {
            let path = schema.node_path_for(descriptor);
            // Every leaf under this root — including nested LIST/MAP/struct
            // children — shreds from the same per-row value; `shred` walks
            // the group nodes in `path` itself.
            let result = write_column(sink, descriptor, &path, values, options)?;

            let file_offset = calc_column_file_offset(&result.meta_data);
            chunks.push(ColumnChunk {
                file_offset,
                meta_data: result.meta_data.clone(),
                offset_index_offset: None,
                offset_index_length: None,
                column_index_offset: None,
                column_index_length: None,
            });
            results.push((descriptor.clone(), result));
        }
    }

    let total_byte_size = chunks.iter().map(|c| c.meta_data.total_compressed_size).sum();

    let row_group = RowGroup {
        columns: chunks,
        total_byte_size,
        num_rows: num_rows as i64,
        file_offset: None,
        total_compressed_size: None,
        ordinal: None,
    };

    Ok((row_group, results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_sink::MemSink;
    use crate::schema::types::PhysicalType;
    use crate::schema::{PrimitiveNode, Repetition};

    #[test]
    fn writes_one_chunk_per_leaf_column() {
        let a = SchemaNode::Primitive(PrimitiveNode::new("a", Repetition::Required, PhysicalType::Int32));
        let b = SchemaNode::Primitive(PrimitiveNode::new("b", Repetition::Optional, PhysicalType::ByteArray));
        let schema = SchemaDescriptor::new(vec![a, b]);

        let mut columns = ColumnValues::new();
        columns.insert("a".to_string(), vec![Value::I32(1), Value::I32(2)]);
        columns.insert(
            "b".to_string(),
            vec![Value::Str("x".into()), Value::Null],
        );

        let mut sink = MemSink::new();
        let (row_group, results) = write_row_group(
            &mut sink,
            &schema,
            &["a".to_string(), "b".to_string()],
            &columns,
            2,
            &ColumnOptions::default(),
        )
        .unwrap();

        assert_eq!(row_group.columns.len(), 2);
        assert_eq!(row_group.num_rows, 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn mismatched_row_count_is_an_error() {
        let a = SchemaNode::Primitive(PrimitiveNode::new("a", Repetition::Required, PhysicalType::Int32));
        let schema = SchemaDescriptor::new(vec![a]);
        let mut columns = ColumnValues::new();
        columns.insert("a".to_string(), vec![Value::I32(1)]);

        let mut sink = MemSink::new();
        let result = write_row_group(&mut sink, &schema, &["a".to_string()], &columns, 5, &ColumnOptions::default());
        assert!(result.is_err());
    }
}
